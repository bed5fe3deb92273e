//! Error types for building and encrypting checkout requests.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Numeric error codes reported alongside every validation failure.
///
/// Callers should branch on the code, not on the message text. The numeric
/// values are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum ErrorCode {
    InvalidMerchantId,
    InvalidAccessToken,
    InvalidEncryptionKey,
    InvalidOrderId,
    InvalidPurpose,
    /// Reserved. The amount is passed through to the gateway unchecked.
    InvalidAmount,
    InvalidSuccessUrl,
    InvalidFailureUrl,
    InvalidEmail,
    InvalidPhone,
    InvalidPostalCode,
    /// One or more required stages were not completed before submission.
    IncompleteSubmission,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 12] = [
        ErrorCode::InvalidMerchantId,
        ErrorCode::InvalidAccessToken,
        ErrorCode::InvalidEncryptionKey,
        ErrorCode::InvalidOrderId,
        ErrorCode::InvalidPurpose,
        ErrorCode::InvalidAmount,
        ErrorCode::InvalidSuccessUrl,
        ErrorCode::InvalidFailureUrl,
        ErrorCode::InvalidEmail,
        ErrorCode::InvalidPhone,
        ErrorCode::InvalidPostalCode,
        ErrorCode::IncompleteSubmission,
    ];

    pub fn as_u16(self) -> u16 {
        match self {
            ErrorCode::InvalidMerchantId => 1001,
            ErrorCode::InvalidAccessToken => 1002,
            ErrorCode::InvalidEncryptionKey => 1003,
            ErrorCode::InvalidOrderId => 1004,
            ErrorCode::InvalidPurpose => 1005,
            ErrorCode::InvalidAmount => 1006,
            ErrorCode::InvalidSuccessUrl => 1007,
            ErrorCode::InvalidFailureUrl => 1008,
            ErrorCode::InvalidEmail => 1009,
            ErrorCode::InvalidPhone => 1010,
            ErrorCode::InvalidPostalCode => 1011,
            ErrorCode::IncompleteSubmission => 1012,
        }
    }

    /// The default human-readable message for this code.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::InvalidMerchantId => "Invalid merchant id",
            ErrorCode::InvalidAccessToken => "Invalid access token",
            ErrorCode::InvalidEncryptionKey => "Invalid encryption key",
            ErrorCode::InvalidOrderId => "Invalid order id",
            ErrorCode::InvalidPurpose => "Invalid purpose",
            ErrorCode::InvalidAmount => "Invalid amount",
            ErrorCode::InvalidSuccessUrl => "Invalid success url",
            ErrorCode::InvalidFailureUrl => "Invalid failure url",
            ErrorCode::InvalidEmail => "Invalid customer email",
            ErrorCode::InvalidPhone => "Invalid customer phone number",
            ErrorCode::InvalidPostalCode => "Invalid postal code",
            ErrorCode::IncompleteSubmission => {
                "Invalid data provided, all required details must be set before submission"
            }
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(value: ErrorCode) -> Self {
        value.as_u16()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        ErrorCode::ALL
            .into_iter()
            .find(|code| code.as_u16() == value)
            .ok_or_else(|| format!("Unknown error code {value}"))
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// A rejected input, carrying a message and a code from [`ErrorCode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct ValidationError {
    pub code: ErrorCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ErrorCode> for ValidationError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code, code.message())
    }
}

/// Error types for checkout request operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An input was rejected, or the request was submitted before every stage completed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Errors raised by the AES-256-CBC cipher.
    #[error("Cipher error: {0}")]
    Cipher(#[from] openssl::error::ErrorStack),

    /// The envelope MAC did not match its contents.
    #[error("MAC verification failed")]
    MacMismatch,

    /// The envelope decoded but its contents are not well formed.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// JSON serialization/deserialization errors.
    #[error("Serde JSON error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Base64 encoding/decoding errors.
    #[error("Base64 decode error: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),

    /// Hex decoding errors.
    #[error("Hex decode error: {0}")]
    HexDecodeError(#[from] hex::FromHexError),

    /// The injected form renderer failed.
    #[error("Render error: {0}")]
    Render(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// UTF-8 decoding errors.
    #[error("UTF-8 decode error: {0}")]
    Utf8DecodeError(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// The validation code, if this is a validation failure.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::Validation(err) => Some(err.code),
            _ => None,
        }
    }
}

impl From<ErrorCode> for Error {
    fn from(code: ErrorCode) -> Self {
        Error::Validation(code.into())
    }
}

/// A specialized `Result` type for checkout request operations.
pub type Result<T> = std::result::Result<T, Error>;
