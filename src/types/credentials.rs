//! Merchant identity and gateway environment.

use std::{fmt::Display, str::FromStr};

use bon::Builder;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Gateway checkout endpoint for live payments.
pub const GATEWAY_URL_PRODUCTION: &str = "https://checkout.paykun.com/payment";

/// Gateway checkout endpoint for test payments.
pub const GATEWAY_URL_SANDBOX: &str = "https://sandbox.paykun.com/payment";

/// Which gateway the checkout form is posted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Sandbox,
    #[default]
    #[serde(alias = "live")]
    Production,
}

impl Environment {
    /// Maps the gateway's `isLive` flag.
    pub fn from_live(is_live: bool) -> Self {
        if is_live {
            Environment::Production
        } else {
            Environment::Sandbox
        }
    }

    pub fn is_live(self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn gateway_url(self) -> &'static str {
        match self {
            Environment::Sandbox => GATEWAY_URL_SANDBOX,
            Environment::Production => GATEWAY_URL_PRODUCTION,
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Sandbox => write!(f, "sandbox"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "dev" | "test" => Ok(Environment::Sandbox),
            "production" | "prod" | "live" => Ok(Environment::Production),
            other => Err(format!(
                "Unsupported environment {other:?}; expected \"sandbox\" or \"production\""
            )),
        }
    }
}

/// Merchant credentials issued by the gateway.
///
/// The access token and encryption key are held as [`SecretString`]s and are
/// redacted from `Debug` output.
#[derive(Builder, Debug, Clone)]
pub struct MerchantCredentials {
    /// Merchant id shown in the gateway dashboard.
    #[builder(into)]
    pub merchant_id: String,
    /// Access token sent in clear alongside the encrypted request.
    #[builder(with = |token: impl Into<String>| SecretString::new(token.into()))]
    pub access_token: SecretString,
    /// Symmetric key used to encrypt the request.
    #[builder(with = |key: impl Into<String>| SecretString::new(key.into()))]
    pub encryption_key: SecretString,
    #[builder(default)]
    pub environment: Environment,
}
