//! Merchant-defined pass-through fields (`udf_1` to `udf_5`).

use serde::{Deserialize, Serialize};

/// Number of custom field slots the gateway accepts.
pub const CUSTOM_FIELD_COUNT: usize = 5;

/// Up to five optional merchant-defined fields.
///
/// Unset slots are sent as empty strings, which canonicalization then drops.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udf_1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udf_2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udf_3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udf_4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udf_5: Option<String>,
}

impl CustomFields {
    /// Field names in slot order.
    pub const KEYS: [&'static str; CUSTOM_FIELD_COUNT] =
        ["udf_1", "udf_2", "udf_3", "udf_4", "udf_5"];

    fn slot_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "udf_1" => Some(&mut self.udf_1),
            "udf_2" => Some(&mut self.udf_2),
            "udf_3" => Some(&mut self.udf_3),
            "udf_4" => Some(&mut self.udf_4),
            "udf_5" => Some(&mut self.udf_5),
            _ => None,
        }
    }

    /// Stores every `udf_N` entry found in `fields`.
    ///
    /// Slots missing from `fields` keep their previous value, and keys other
    /// than `udf_1`..`udf_5` are ignored.
    pub fn merge<I, K, V>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in fields {
            if let Some(slot) = self.slot_mut(key.as_ref()) {
                *slot = Some(value.into());
            }
        }
    }

    /// Each slot's value, with unset slots as empty strings.
    pub fn values(&self) -> [(&'static str, &str); CUSTOM_FIELD_COUNT] {
        let slots = [&self.udf_1, &self.udf_2, &self.udf_3, &self.udf_4, &self.udf_5];
        std::array::from_fn(|i| (Self::KEYS[i], slots[i].as_deref().unwrap_or_default()))
    }
}
