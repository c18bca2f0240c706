//! Error types raised while configuring the filter or touching message fields.
//!
//! The two families have different propagation rules:
//!
//! - [`ConfigurationError`] is returned from setup and keeps a filter from
//!   becoming operational.
//! - [`MessageFormatError`] is raised by a [`crate::FinancialMessage`] during a
//!   field read or write. The filter never lets it escape `process`; it is
//!   recorded on the event instead.

use std::num::ParseIntError;

use thiserror::Error;

/// Errors detected while reading the filter configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A token in a field list is not a non-negative integer.
    #[error("invalid field number {token:?} in `{key}`: {source}")]
    InvalidField {
        /// Configuration key the list was read from.
        key: String,
        /// The offending token.
        token: String,
        /// Underlying parse failure.
        #[source]
        source: ParseIntError,
    },

    /// The `mask` key names a policy this crate does not provide.
    #[error("unknown mask policy {value:?} (expected `full` or `truncate`)")]
    UnknownMaskPolicy {
        /// The configured value.
        value: String,
    },

    /// The `mask-char` key is not exactly one character, or is a track separator.
    #[error("mask character must be a single character other than `=` or `^`, got {value:?}")]
    InvalidMaskChar {
        /// The configured value.
        value: String,
    },

    /// A JSON configuration document could not be parsed.
    #[error("malformed configuration document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a financial message while reading or writing a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageFormatError {
    /// The message type cannot address this field number.
    #[error("field {field} is out of range (max {max})")]
    FieldOutOfRange {
        /// Requested field number.
        field: u32,
        /// Highest field number the message supports.
        max: u32,
    },

    /// The field's value could not be decoded or encoded.
    #[error("field {field}: {reason}")]
    Encoding {
        /// Field number involved.
        field: u32,
        /// Description supplied by the message implementation.
        reason: String,
    },
}

impl MessageFormatError {
    /// Returns the field number the error refers to.
    pub fn field(&self) -> u32 {
        match self {
            Self::FieldOutOfRange { field, .. } | Self::Encoding { field, .. } => *field,
        }
    }
}
