use bon::Builder;
use serde::{Deserialize, Serialize};

/// The paying customer.
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub email: String,
    #[builder(into)]
    pub phone: String,
}

/// A postal address, used for both shipping and billing.
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[builder(into)]
    pub country: String,
    #[builder(into)]
    pub state: String,
    #[builder(into)]
    pub city: String,
    #[builder(into)]
    pub postal_code: String,
    /// Street address.
    #[builder(into)]
    pub address_line: String,
}
