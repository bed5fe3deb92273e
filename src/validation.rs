//! Format checks for merchant and order inputs.
//!
//! The [`Validator`] trait is the seam the [`OrderBuilder`](crate::builder::OrderBuilder)
//! validates through. [`FormatValidator`] is the default implementation; hosts with
//! stricter rules can supply their own.
//!
//! A check returns `Ok(())` when the value is acceptable and a [`ValidationError`]
//! carrying the field's [`ErrorCode`] when it is not.

use std::{fmt::Display, sync::LazyLock};

use regex::Regex;
use url::Url;

use crate::errors::{ErrorCode, ValidationError};

/// Every input the validator knows how to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    MerchantId,
    AccessToken,
    EncryptionKey,
    OrderId,
    Purpose,
    SuccessUrl,
    FailureUrl,
    Email,
    Phone,
    PostalCode,
}

impl Field {
    pub fn code(self) -> ErrorCode {
        match self {
            Field::MerchantId => ErrorCode::InvalidMerchantId,
            Field::AccessToken => ErrorCode::InvalidAccessToken,
            Field::EncryptionKey => ErrorCode::InvalidEncryptionKey,
            Field::OrderId => ErrorCode::InvalidOrderId,
            Field::Purpose => ErrorCode::InvalidPurpose,
            Field::SuccessUrl => ErrorCode::InvalidSuccessUrl,
            Field::FailureUrl => ErrorCode::InvalidFailureUrl,
            Field::Email => ErrorCode::InvalidEmail,
            Field::Phone => ErrorCode::InvalidPhone,
            Field::PostalCode => ErrorCode::InvalidPostalCode,
        }
    }

    /// Builds the rejection for this field.
    pub fn reject(self, reason: impl Display) -> ValidationError {
        let code = self.code();
        ValidationError::new(code, format!("{}: {reason}", code.message()))
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::MerchantId => "merchant_id",
            Field::AccessToken => "access_token",
            Field::EncryptionKey => "encryption_key",
            Field::OrderId => "order_id",
            Field::Purpose => "purpose",
            Field::SuccessUrl => "success_url",
            Field::FailureUrl => "failure_url",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::PostalCode => "postal_code",
        };
        write!(f, "{name}")
    }
}

/// Checks a single input value against the format rules for its field.
pub trait Validator {
    fn check(&self, field: Field, value: &str) -> Result<(), ValidationError>;
}

impl<V: Validator + ?Sized> Validator for &V {
    fn check(&self, field: Field, value: &str) -> Result<(), ValidationError> {
        (**self).check(field, value)
    }
}

impl<V: Validator + ?Sized> Validator for Box<V> {
    fn check(&self, field: Field, value: &str) -> Result<(), ValidationError> {
        (**self).check(field, value)
    }
}

/// Default format rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatValidator;

impl Validator for FormatValidator {
    fn check(&self, field: Field, value: &str) -> Result<(), ValidationError> {
        let outcome = match field {
            Field::MerchantId => validate_merchant_id(value),
            Field::AccessToken => validate_access_token(value),
            Field::EncryptionKey => validate_encryption_key(value),
            Field::OrderId => validate_order_number(value),
            Field::Purpose => validate_purpose(value),
            Field::SuccessUrl | Field::FailureUrl => validate_url(value),
            Field::Email => validate_email(value),
            Field::Phone => validate_phone(value),
            Field::PostalCode => validate_postal_code(value),
        };
        outcome.map_err(|reason| field.reject(reason))
    }
}

const MAX_IDENTIFIER_LENGTH: usize = 255;
const MAX_MERCHANT_ID_LENGTH: usize = 64;
const MAX_ORDER_NUMBER_LENGTH: usize = 30;
const EMAIL_MAX_LENGTH: usize = 319;

type Check = Result<(), &'static str>;

fn require_present(value: &str, max_length: usize) -> Check {
    if value.is_empty() {
        return Err("value is empty");
    }
    if value.chars().count() > max_length {
        return Err("value is too long");
    }
    Ok(())
}

fn validate_merchant_id(value: &str) -> Check {
    require_present(value, MAX_MERCHANT_ID_LENGTH)?;
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("only ASCII letters and digits are allowed");
    }
    Ok(())
}

fn validate_access_token(value: &str) -> Check {
    require_present(value, MAX_IDENTIFIER_LENGTH)?;
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("only ASCII letters, digits, '-' and '_' are allowed");
    }
    Ok(())
}

fn validate_encryption_key(value: &str) -> Check {
    require_present(value, MAX_IDENTIFIER_LENGTH)?;
    if !value.chars().all(|c| c.is_ascii_graphic()) {
        return Err("only printable ASCII without whitespace is allowed");
    }
    Ok(())
}

fn validate_order_number(value: &str) -> Check {
    require_present(value, MAX_ORDER_NUMBER_LENGTH)?;
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/'))
    {
        return Err("only ASCII letters, digits, '-', '_' and '/' are allowed");
    }
    Ok(())
}

fn validate_purpose(value: &str) -> Check {
    if value.trim().is_empty() {
        return Err("value is empty");
    }
    require_present(value, MAX_IDENTIFIER_LENGTH)?;
    if value.chars().any(char::is_control) {
        return Err("control characters are not allowed");
    }
    Ok(())
}

fn validate_url(value: &str) -> Check {
    let url = Url::parse(value).map_err(|_| "not an absolute URL")?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err("scheme must be http or https");
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err("URL has no host");
    }
    Ok(())
}

fn matches_pattern(pattern: &LazyLock<Option<Regex>>, value: &str) -> Check {
    match pattern.as_ref() {
        Some(regex) if regex.is_match(value) => Ok(()),
        Some(_) => Err("invalid format"),
        None => Err("invalid regex expression"),
    }
}

fn validate_email(value: &str) -> Check {
    static EMAIL_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| {
        Regex::new(
            r"^(?i)[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)+$",
        )
        .ok()
    });

    require_present(value, EMAIL_MAX_LENGTH)?;
    matches_pattern(&EMAIL_REGEX, value)
}

fn validate_phone(value: &str) -> Check {
    static PHONE_REGEX: LazyLock<Option<Regex>> =
        LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{5,18}[0-9]$").ok());

    matches_pattern(&PHONE_REGEX, value)
}

fn validate_postal_code(value: &str) -> Check {
    static POSTAL_CODE_REGEX: LazyLock<Option<Regex>> =
        LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{1,8}[A-Za-z0-9]$").ok());

    matches_pattern(&POSTAL_CODE_REGEX, value)
}
