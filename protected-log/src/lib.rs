//! Field-level redaction of financial messages in log events.
//!
//! Transaction logs routinely capture ISO 8583-style messages carrying card
//! numbers, track data and PIN blocks. This crate rewrites those fields before
//! an event reaches any listener that persists it.
//!
//! It separates:
//! - **Selection**: which field numbers are sensitive ([`FieldSelector`], read
//!   from the `protect` and `wipe` configuration keys).
//! - **Policy**: how a protected value is obfuscated ([`MaskPolicy`]).
//!
//! Key rules:
//! - Messages are redacted on a deep clone; the producer's copy is never touched.
//! - `protect` fields are masked, `wipe` fields become [`WIPED_PLACEHOLDER`].
//!   A field listed in both is wiped.
//! - Fields not listed pass through unchanged. Listed fields that are absent
//!   are not created.
//! - A field error is recorded on the event and the rest of the event is
//!   still redacted.
//!
//! What this crate does:
//! - defines the message, event and listener abstractions the filter needs
//! - provides [`RedactionFilter`] and the built-in mask policies
//! - provides a `slog` adapter behind the `slog` feature
//!
//! What it does not do:
//! - pack or unpack messages
//! - write log files or manage sinks

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

// Module declarations
mod config;
mod error;
mod event;
mod filter;
mod listener;
mod message;
mod policy;
#[cfg(feature = "slog")]
pub mod slog;

// Re-exports
pub use config::{
    parse_field_list, Configuration, SimpleConfiguration, MASK_CHAR_KEY, MASK_KEY, PROTECT_KEY,
    WIPE_KEY,
};
pub use error::{ConfigurationError, MessageFormatError};
pub use event::{EventError, LogEvent, PayloadItem};
pub use filter::{FieldSelector, RedactionFilter};
pub use listener::{ListenerChain, LogListener};
pub use message::{FinancialMessage, IsoMessage, MAX_ISO_FIELD};
pub use policy::{
    is_track_separator, KeepConfig, MaskPolicy, TextMaskPolicy, DEFAULT_MASK_CHAR,
    WIPED_PLACEHOLDER,
};
