//! Fields for the auto-submitting checkout form.
//!
//! The library stops at [`FormPayload`]. Turning it into markup is left to a
//! [`FormRenderer`], or to the host's own template.

use serde::{Deserialize, Serialize};

use crate::{crypto::EncodedPayload, types::Environment};

/// Title shown on the intermediate page while the form submits itself.
pub const PAGE_TITLE: &str = "Processing Payment...";

/// Everything an auto-submitting form needs to post a request to the gateway.
///
/// Serializes with the field names gateway templates use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPayload {
    pub encrypted_request: EncodedPayload,
    pub merchant_id: String,
    pub access_token: String,
    pub gateway_url: String,
    #[serde(rename = "pageTitle")]
    pub page_title: String,
}

impl FormPayload {
    /// Wraps an encrypted request with merchant and environment details.
    pub fn assemble(
        encrypted_request: EncodedPayload,
        merchant_id: impl Into<String>,
        access_token: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            encrypted_request,
            merchant_id: merchant_id.into(),
            access_token: access_token.into(),
            gateway_url: environment.gateway_url().to_string(),
            page_title: PAGE_TITLE.to_string(),
        }
    }

    /// The hidden inputs to post, as `(name, value)` pairs.
    pub fn fields(&self) -> [(&'static str, &str); 3] {
        [
            ("encrypted_request", self.encrypted_request.as_str()),
            ("merchant_id", self.merchant_id.as_str()),
            ("access_token", self.access_token.as_str()),
        ]
    }
}

/// Renders a [`FormPayload`] into markup using a named template.
pub trait FormRenderer {
    type Error: std::error::Error;

    fn render(&self, template: &str, payload: &FormPayload) -> Result<String, Self::Error>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{GATEWAY_URL_PRODUCTION, GATEWAY_URL_SANDBOX};

    fn encrypted() -> EncodedPayload {
        EncodedPayload("ZW5j".to_string())
    }

    #[test]
    fn selects_gateway_by_environment() {
        let sandbox = FormPayload::assemble(encrypted(), "M1", "TOK1", Environment::Sandbox);
        assert_eq!(sandbox.gateway_url, GATEWAY_URL_SANDBOX);

        let live = FormPayload::assemble(encrypted(), "M1", "TOK1", Environment::Production);
        assert_eq!(live.gateway_url, GATEWAY_URL_PRODUCTION);
        assert_eq!(live.page_title, PAGE_TITLE);
    }

    #[test]
    fn serializes_with_template_names() {
        let payload = FormPayload::assemble(encrypted(), "M1", "TOK1", Environment::Sandbox);

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "encrypted_request": "ZW5j",
                "merchant_id": "M1",
                "access_token": "TOK1",
                "gateway_url": "https://sandbox.paykun.com/payment",
                "pageTitle": "Processing Payment..."
            })
        );
    }

    #[test]
    fn hidden_fields_in_post_order() {
        let payload = FormPayload::assemble(encrypted(), "M1", "TOK1", Environment::Sandbox);
        assert_eq!(
            payload.fields(),
            [
                ("encrypted_request", "ZW5j"),
                ("merchant_id", "M1"),
                ("access_token", "TOK1"),
            ]
        );
    }
}
