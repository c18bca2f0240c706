//! Listener chain that carries events from producers to sinks.
//!
//! Listeners run in registration order and each sees the event as left by the
//! previous one. A listener that rewrites events (such as
//! [`crate::RedactionFilter`]) must come before the listeners that persist
//! them.

use std::{fmt, sync::Arc};

use crate::event::LogEvent;

/// Receives log events.
pub trait LogListener: Send + Sync {
    /// Handles `event` and passes it on.
    ///
    /// Returning `None` stops the chain; later listeners do not see the event.
    fn log(&self, event: LogEvent) -> Option<LogEvent>;
}

/// An ordered list of listeners.
#[derive(Clone, Default)]
pub struct ListenerChain {
    listeners: Vec<Arc<dyn LogListener>>,
}

impl ListenerChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener and returns the chain.
    #[must_use]
    pub fn with_listener<L>(mut self, listener: L) -> Self
    where
        L: LogListener + 'static,
    {
        self.add_listener(Arc::new(listener));
        self
    }

    /// Appends a shared listener.
    pub fn add_listener(&mut self, listener: Arc<dyn LogListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Runs `event` through every listener in order.
    ///
    /// Returns the event as left by the last listener, or `None` if one of
    /// them dropped it.
    pub fn dispatch(&self, event: LogEvent) -> Option<LogEvent> {
        self.listeners
            .iter()
            .try_fold(event, |event, listener| listener.log(event))
    }
}

impl fmt::Debug for ListenerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerChain")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
