//! String-keyed configuration consumed by listeners.
//!
//! Listeners only need `get(key, default)`. Anything that can answer that
//! (an ordered map, a hash map, a properties file loaded elsewhere) can
//! configure a [`crate::RedactionFilter`].

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    hash::BuildHasher,
};

use serde::Deserialize;

use crate::error::ConfigurationError;

/// Key holding the fields to mask.
pub const PROTECT_KEY: &str = "protect";
/// Key holding the fields to wipe.
pub const WIPE_KEY: &str = "wipe";
/// Key selecting the mask policy (`full` or `truncate`).
pub const MASK_KEY: &str = "mask";
/// Key overriding the masking character.
pub const MASK_CHAR_KEY: &str = "mask-char";

/// A source of string configuration values.
pub trait Configuration {
    /// Returns the value for `key`, or `default` when the key is absent.
    fn get(&self, key: &str, default: &str) -> String;
}

/// Ordered in-memory configuration.
///
/// Deserializes from a flat JSON object of string values:
///
/// ```rust
/// use protected_log::{Configuration, SimpleConfiguration};
///
/// let cfg = SimpleConfiguration::from_json(r#"{ "protect": "2 35", "wipe": "48" }"#).unwrap();
/// assert_eq!(cfg.get("protect", ""), "2 35");
/// assert_eq!(cfg.get("mask", "full"), "full");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SimpleConfiguration {
    properties: BTreeMap<String, String>,
}

impl SimpleConfiguration {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a flat JSON object of string properties.
    pub fn from_json(text: &str) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Sets `key` and returns the configuration.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.put(key, value);
        self
    }

    /// Sets `key` in place, replacing any previous value.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }
}

impl Configuration for SimpleConfiguration {
    fn get(&self, key: &str, default: &str) -> String {
        self.properties.get(key).map_or_else(|| default.to_owned(), Clone::clone)
    }
}

impl Configuration for BTreeMap<String, String> {
    fn get(&self, key: &str, default: &str) -> String {
        BTreeMap::get(self, key).map_or_else(|| default.to_owned(), Clone::clone)
    }
}

impl<S: BuildHasher> Configuration for HashMap<String, String, S> {
    fn get(&self, key: &str, default: &str) -> String {
        HashMap::get(self, key).map_or_else(|| default.to_owned(), Clone::clone)
    }
}

/// Parses a whitespace-separated list of field numbers.
///
/// Duplicates collapse and the result iterates in ascending order. `key` is
/// only used to label errors.
pub fn parse_field_list(key: &str, text: &str) -> Result<BTreeSet<u32>, ConfigurationError> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<u32>()
                .map_err(|source| ConfigurationError::InvalidField {
                    key: key.to_owned(),
                    token: token.to_owned(),
                    source,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{parse_field_list, Configuration, SimpleConfiguration};
    use crate::error::ConfigurationError;

    #[test]
    fn empty_list_parses_to_empty_set() {
        assert!(parse_field_list("protect", "").unwrap().is_empty());
        assert!(parse_field_list("protect", "  \t \n").unwrap().is_empty());
    }

    #[test]
    fn list_tolerates_mixed_whitespace_and_duplicates() {
        let fields = parse_field_list("protect", " 35\t2 \n 48 2 ").unwrap();
        assert_eq!(fields.into_iter().collect::<Vec<_>>(), vec![2, 35, 48]);
    }

    #[test]
    fn non_integer_token_is_rejected() {
        let err = parse_field_list("wipe", "2 abc 35").unwrap_err();
        match err {
            ConfigurationError::InvalidField { key, token, .. } => {
                assert_eq!(key, "wipe");
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn negative_field_is_rejected() {
        assert!(parse_field_list("protect", "-2").is_err());
    }

    #[test]
    fn missing_key_falls_back_to_default() {
        let cfg = SimpleConfiguration::new().with("protect", "2");
        assert_eq!(cfg.get("protect", ""), "2");
        assert_eq!(cfg.get("wipe", ""), "");
    }

    #[test]
    fn json_document_loads_properties() {
        let cfg = SimpleConfiguration::from_json(r#"{"protect":"2 35","wipe":"48"}"#).unwrap();
        assert_eq!(cfg.get("wipe", ""), "48");
    }

    #[test]
    fn json_with_non_string_values_is_rejected() {
        let err = SimpleConfiguration::from_json(r#"{"protect":[2,35]}"#).unwrap_err();
        assert!(matches!(err, ConfigurationError::Json(_)));
    }

    #[test]
    fn hash_map_is_a_configuration() {
        let mut map = HashMap::new();
        map.insert("wipe".to_owned(), "52".to_owned());
        assert_eq!(Configuration::get(&map, "wipe", ""), "52");
        assert_eq!(Configuration::get(&map, "protect", "x"), "x");
    }
}
