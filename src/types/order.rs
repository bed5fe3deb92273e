use bon::Builder;
use serde::{Deserialize, Serialize};

/// Currency used when an order does not name one.
pub const DEFAULT_CURRENCY: &str = "INR";

/// What is being paid for, and where the gateway sends the customer afterwards.
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    /// Merchant-side order number.
    #[builder(into)]
    pub order_id: String,
    /// Description of the purchase, sent as the product name.
    #[builder(into)]
    pub purpose: String,
    /// Amount as a decimal string. Not validated; the gateway checks it.
    #[builder(into)]
    pub amount: String,
    #[builder(into)]
    pub success_url: String,
    #[builder(into)]
    pub failure_url: String,
    /// Three-letter currency code.
    #[builder(into, default = String::from(DEFAULT_CURRENCY))]
    pub currency: String,
}
