//! Preference values

use serde::{Deserialize, Serialize};

/// A single preference entry.
///
/// Serialized untagged so preference files stay plain JSON
/// (`{"nightly_reminders": true, "default_importance": 2}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl PreferenceValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for PreferenceValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PreferenceValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for PreferenceValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn untagged_json_round_trips_each_variant() {
        let json = r#"{"flag":true,"count":3,"name":"inbox"}"#;
        let parsed: BTreeMap<String, PreferenceValue> =
            serde_json::from_str(json).expect("valid json");

        assert_eq!(parsed["flag"], PreferenceValue::Bool(true));
        assert_eq!(parsed["count"], PreferenceValue::Int(3));
        assert_eq!(parsed["name"].as_text(), Some("inbox"));
    }
}
