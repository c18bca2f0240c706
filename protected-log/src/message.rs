//! Structured financial messages as seen by the filter.
//!
//! The filter only needs keyed field access and a deep clone, so the
//! abstraction is the [`FinancialMessage`] trait. [`IsoMessage`] is a plain
//! ISO 8583-style implementation backed by an ordered map.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::error::MessageFormatError;

/// Highest field number addressable with a tertiary bitmap.
pub const MAX_ISO_FIELD: u32 = 192;

/// A message made of numbered string fields.
///
/// Field operations may fail with a [`MessageFormatError`] when the
/// implementation cannot decode or encode a value.
pub trait FinancialMessage: fmt::Debug + Send + Sync {
    /// Returns `true` if `field` is present.
    fn has_field(&self, field: u32) -> bool;

    /// Reads `field` as a string.
    fn get_field(&self, field: u32) -> Result<String, MessageFormatError>;

    /// Writes `value` into `field`, creating it if necessary.
    fn set_field(&mut self, field: u32, value: String) -> Result<(), MessageFormatError>;

    /// Returns a deep copy that shares no mutable state with `self`.
    fn clone_message(&self) -> Box<dyn FinancialMessage>;

    /// Lists the fields currently present, in ascending order.
    fn field_numbers(&self) -> Vec<u32>;
}

/// An ISO 8583-style message: field 0 carries the MTI, fields up to
/// [`MAX_ISO_FIELD`] carry data elements.
///
/// Deserialization rejects field numbers above [`MAX_ISO_FIELD`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawIsoMessage")]
pub struct IsoMessage {
    fields: BTreeMap<u32, String>,
}

#[derive(Deserialize)]
struct RawIsoMessage {
    fields: BTreeMap<u32, String>,
}

impl TryFrom<RawIsoMessage> for IsoMessage {
    type Error = MessageFormatError;

    fn try_from(raw: RawIsoMessage) -> Result<Self, Self::Error> {
        raw.fields.keys().try_for_each(|field| Self::check_range(*field))?;
        Ok(Self { fields: raw.fields })
    }
}

impl IsoMessage {
    /// Creates a message with the given MTI in field 0.
    #[must_use]
    pub fn new(mti: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(0, mti.into());
        Self { fields }
    }

    /// Sets a field and returns the message.
    ///
    /// # Panics
    ///
    /// Panics if `field` exceeds [`MAX_ISO_FIELD`]; use
    /// [`FinancialMessage::set_field`] for fallible construction.
    #[must_use]
    pub fn with_field(mut self, field: u32, value: impl Into<String>) -> Self {
        assert!(field <= MAX_ISO_FIELD, "field {field} exceeds {MAX_ISO_FIELD}");
        self.fields.insert(field, value.into());
        self
    }

    /// Returns the message type indicator, if set.
    pub fn mti(&self) -> Option<&str> {
        self.fields.get(&0).map(String::as_str)
    }

    /// Borrows the value of `field`.
    pub fn field(&self, field: u32) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Removes `field`, returning its previous value.
    pub fn unset_field(&mut self, field: u32) -> Option<String> {
        self.fields.remove(&field)
    }

    /// Iterates over present fields in ascending order.
    pub fn fields(&self) -> impl Iterator<Item = (u32, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn check_range(field: u32) -> Result<(), MessageFormatError> {
        if field > MAX_ISO_FIELD {
            return Err(MessageFormatError::FieldOutOfRange {
                field,
                max: MAX_ISO_FIELD,
            });
        }
        Ok(())
    }
}

impl FinancialMessage for IsoMessage {
    fn has_field(&self, field: u32) -> bool {
        self.fields.contains_key(&field)
    }

    fn get_field(&self, field: u32) -> Result<String, MessageFormatError> {
        Self::check_range(field)?;
        Ok(self.fields.get(&field).cloned().unwrap_or_default())
    }

    fn set_field(&mut self, field: u32, value: String) -> Result<(), MessageFormatError> {
        Self::check_range(field)?;
        self.fields.insert(field, value);
        Ok(())
    }

    fn clone_message(&self) -> Box<dyn FinancialMessage> {
        Box::new(self.clone())
    }

    fn field_numbers(&self) -> Vec<u32> {
        self.fields.keys().copied().collect()
    }
}
