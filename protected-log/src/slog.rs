//! Adapters for emitting log events through `slog`.
//!
//! This module connects [`LogEvent`] with `slog` by providing a `slog::Value`
//! that serializes the event payload as structured JSON via `slog`'s
//! nested-value support, and a [`SlogListener`] that forwards events to a
//! `slog::Logger`.
//!
//! It is responsible for:
//! - Rendering the payload exactly as it stands when the event reaches it. Place
//!   [`crate::RedactionFilter`] ahead of [`SlogListener`] in the chain.
//! - Avoiding fallible logging APIs: unreadable fields are represented as
//!   placeholder strings rather than propagated as errors.
//!
//! It does not configure `slog` drains or decide what is sensitive.

use serde_json::{Map, Value as JsonValue};
use slog::{Key, Logger, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{
    event::{LogEvent, PayloadItem},
    listener::LogListener,
    message::FinancialMessage,
};

/// Placeholder emitted for a field whose value could not be read.
pub const UNREADABLE_FIELD: &str = "[UNREADABLE]";

/// Placeholder emitted for payload items that are neither messages nor text.
pub const OPAQUE_ITEM: &str = "<opaque>";

/// A `slog::Value` that emits an event payload as structured JSON.
///
/// The payload is captured as a `serde_json::Value` when constructed, so later
/// changes to the event do not affect what is logged.
#[derive(Clone, Debug)]
pub struct EventJson {
    value: JsonValue,
}

impl EventJson {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }

    /// Returns the captured JSON.
    pub fn as_json(&self) -> &JsonValue {
        &self.value
    }
}

impl SlogValue for EventJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Converts an event payload into a `slog::Value`.
///
/// ## Example
/// ```ignore
/// use protected_log::slog::IntoEventJson;
///
/// info!(logger, "event"; "payload" => event.payload_json());
/// ```
pub trait IntoEventJson {
    /// Captures the payload as structured JSON.
    fn payload_json(&self) -> EventJson;
}

impl IntoEventJson for LogEvent {
    fn payload_json(&self) -> EventJson {
        EventJson::new(JsonValue::Array(
            self.payload().iter().map(item_to_json).collect(),
        ))
    }
}

fn item_to_json(item: &PayloadItem) -> JsonValue {
    match item {
        PayloadItem::Message(msg) => message_to_json(&**msg),
        PayloadItem::Text(text) => JsonValue::String(text.clone()),
        PayloadItem::Other(_) => JsonValue::String(OPAQUE_ITEM.to_owned()),
    }
}

fn message_to_json(msg: &dyn FinancialMessage) -> JsonValue {
    let fields: Map<String, JsonValue> = msg
        .field_numbers()
        .into_iter()
        .map(|field| {
            let value = msg
                .get_field(field)
                .unwrap_or_else(|_| UNREADABLE_FIELD.to_owned());
            (field.to_string(), JsonValue::String(value))
        })
        .collect();

    let mut object = Map::new();
    object.insert("fields".to_owned(), JsonValue::Object(fields));
    JsonValue::Object(object)
}

/// Forwards every event to a `slog::Logger`.
///
/// Events with recorded errors are logged at warning level with the error
/// messages attached; all others at info level.
#[derive(Clone, Debug)]
pub struct SlogListener {
    logger: Logger,
}

impl SlogListener {
    #[must_use]
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl LogListener for SlogListener {
    fn log(&self, event: LogEvent) -> Option<LogEvent> {
        let payload = event.payload_json();
        if event.errors().is_empty() {
            slog::info!(self.logger, "{}", event.tag();
                "realm" => event.realm(),
                "payload" => payload
            );
        } else {
            let errors: Vec<String> = event.errors().iter().map(ToString::to_string).collect();
            slog::warn!(self.logger, "{}", event.tag();
                "realm" => event.realm(),
                "payload" => payload,
                "errors" => errors.join("; ")
            );
        }
        Some(event)
    }
}
