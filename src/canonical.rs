//! Canonical form of a checkout request.
//!
//! The gateway expects every populated field as `key::value`, joined with `;`,
//! sorted by key. Empty values are left out entirely. Values are not escaped, so a
//! value containing `::` or `;` will be misread by the gateway.

use std::{collections::BTreeMap, fmt::Display};

use crate::types::{Address, CustomFields, CustomerInfo, OrderDetails};

/// Separator between a key and its value.
pub const KEY_VALUE_SEPARATOR: &str = "::";

/// Terminator appended after each entry. The last one is trimmed.
pub const ENTRY_TERMINATOR: char = ';';

/// Returns `true` for values the gateway treats as absent: the empty string and `"0"`.
///
/// Whitespace-only values are kept.
pub fn is_empty_value(value: &str) -> bool {
    value.is_empty() || value == "0"
}

/// Named field values that make up a checkout request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFields<'a>(BTreeMap<&'static str, &'a str>);

impl<'a> RequestFields<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value under the same key.
    pub fn insert(&mut self, key: &'static str, value: &'a str) -> &mut Self {
        self.0.insert(key, value);
        self
    }

    /// Collects every field of a complete order.
    pub fn from_order(
        order: &'a OrderDetails,
        customer: &'a CustomerInfo,
        shipping: &'a Address,
        billing: &'a Address,
        custom_fields: &'a CustomFields,
    ) -> Self {
        let mut fields = Self::new();
        fields
            .insert("order_no", &order.order_id)
            .insert("product_name", &order.purpose)
            .insert("amount", &order.amount)
            .insert("success_url", &order.success_url)
            .insert("failure_url", &order.failure_url)
            .insert("customer_name", &customer.name)
            .insert("customer_email", &customer.email)
            .insert("customer_phone", &customer.phone)
            .insert("shipping_address", &shipping.address_line)
            .insert("shipping_city", &shipping.city)
            .insert("shipping_state", &shipping.state)
            .insert("shipping_country", &shipping.country)
            .insert("shipping_zip", &shipping.postal_code)
            .insert("billing_address", &billing.address_line)
            .insert("billing_city", &billing.city)
            .insert("billing_state", &billing.state)
            .insert("billing_country", &billing.country)
            .insert("billing_zip", &billing.postal_code);
        for (key, value) in custom_fields.values() {
            fields.insert(key, value);
        }
        fields.insert("currency", &order.currency);
        fields
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Filters, sorts and joins the fields.
    pub fn canonicalize(&self) -> CanonicalPayload {
        let mut joined = String::new();
        for (key, value) in self.0.iter().filter(|(_, v)| !is_empty_value(v)) {
            joined.push_str(key);
            joined.push_str(KEY_VALUE_SEPARATOR);
            joined.push_str(value);
            joined.push(ENTRY_TERMINATOR);
        }
        // Only the final terminator is trimmed.
        joined.pop();
        CanonicalPayload(joined)
    }
}

/// The deterministic string that gets encrypted and sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPayload(String);

impl CanonicalPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Keys present in the payload, in order.
    ///
    /// Splits on the separators, so a value containing `;` or `::` can produce spurious keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0
            .split(ENTRY_TERMINATOR)
            .filter_map(|entry| entry.split_once(KEY_VALUE_SEPARATOR).map(|(key, _)| key))
    }
}

impl AsRef<str> for CanonicalPayload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CanonicalPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
