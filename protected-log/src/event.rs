//! Log events carried through a listener chain.

use std::{any::Any, error::Error, sync::Arc};

use crate::message::FinancialMessage;

/// Error recorded on an event by a listener.
pub type EventError = Box<dyn Error + Send + Sync>;

/// A single item of an event payload.
///
/// Messages are held behind an `Arc` so the producer can keep its own handle
/// after logging. Listeners that rewrite a message replace the `Arc` rather
/// than mutating through it.
#[derive(Clone, Debug)]
pub enum PayloadItem {
    /// A structured financial message.
    Message(Arc<dyn FinancialMessage>),
    /// Free-form text.
    Text(String),
    /// Anything else; listeners pass it through untouched.
    Other(Arc<dyn Any + Send + Sync>),
}

impl PayloadItem {
    /// Returns the message if this item is one.
    pub fn as_message(&self) -> Option<&dyn FinancialMessage> {
        match self {
            PayloadItem::Message(msg) => Some(msg.as_ref()),
            _ => None,
        }
    }
}

impl From<String> for PayloadItem {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for PayloadItem {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Arc<dyn FinancialMessage>> for PayloadItem {
    fn from(msg: Arc<dyn FinancialMessage>) -> Self {
        Self::Message(msg)
    }
}

/// An event produced by the logging subsystem.
///
/// The payload keeps insertion order. Errors recorded by listeners are kept
/// apart from the payload so sinks can report them separately.
#[derive(Debug, Default)]
pub struct LogEvent {
    realm: String,
    tag: String,
    payload: Vec<PayloadItem>,
    errors: Vec<EventError>,
}

impl LogEvent {
    /// Creates an empty event.
    #[must_use]
    pub fn new(realm: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            tag: tag.into(),
            payload: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// The component that produced the event.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Short label such as `send`, `receive` or `error`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Appends an owned message.
    pub fn add_message<M>(&mut self, msg: M) -> &mut Self
    where
        M: FinancialMessage + 'static,
    {
        self.push(PayloadItem::Message(Arc::new(msg)))
    }

    /// Appends free-form text.
    pub fn add_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(PayloadItem::Text(text.into()))
    }

    /// Appends an opaque item.
    pub fn add_other<T>(&mut self, item: T) -> &mut Self
    where
        T: Any + Send + Sync,
    {
        self.push(PayloadItem::Other(Arc::new(item)))
    }

    /// Appends a payload item.
    pub fn push(&mut self, item: impl Into<PayloadItem>) -> &mut Self {
        self.payload.push(item.into());
        self
    }

    pub fn payload(&self) -> &[PayloadItem] {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut [PayloadItem] {
        &mut self.payload
    }

    /// Iterates over the messages in the payload, skipping other items.
    pub fn messages(&self) -> impl Iterator<Item = &dyn FinancialMessage> {
        self.payload.iter().filter_map(PayloadItem::as_message)
    }

    /// Records an error against the event.
    pub fn add_error(&mut self, err: impl Into<EventError>) {
        self.errors.push(err.into());
    }

    pub fn errors(&self) -> &[EventError] {
        &self.errors
    }
}
