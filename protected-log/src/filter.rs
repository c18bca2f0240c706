//! The redaction filter: masks and wipes selected message fields before an
//! event reaches persisting listeners.
//!
//! For every message in the payload the filter works on a deep clone:
//!
//! 1. each `protect` field present on the clone is replaced by its masked form;
//! 2. each `wipe` field present on the clone is replaced by [`WIPED_PLACEHOLDER`].
//!
//! The wipe pass runs second, so a field listed in both ends up wiped. The
//! clone then takes the original's slot in the payload. Field errors are
//! recorded on the event one per failing field and never abort the pass.

use std::{
    collections::BTreeSet,
    fmt,
    sync::{Arc, Mutex},
};

use crate::{
    config::{parse_field_list, Configuration, PROTECT_KEY, WIPE_KEY},
    error::{ConfigurationError, MessageFormatError},
    event::{LogEvent, PayloadItem},
    listener::LogListener,
    message::FinancialMessage,
    policy::{MaskPolicy, TextMaskPolicy, WIPED_PLACEHOLDER},
};

/// The fields a filter masks and wipes.
///
/// Both sets are fixed once built. A field may appear in both.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSelector {
    protect: BTreeSet<u32>,
    wipe: BTreeSet<u32>,
}

impl FieldSelector {
    /// Builds a selector from explicit field lists.
    #[must_use]
    pub fn new(
        protect: impl IntoIterator<Item = u32>,
        wipe: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            protect: protect.into_iter().collect(),
            wipe: wipe.into_iter().collect(),
        }
    }

    /// Reads the `protect` and `wipe` keys; both default to empty.
    pub fn from_configuration(cfg: &dyn Configuration) -> Result<Self, ConfigurationError> {
        Ok(Self {
            protect: parse_field_list(PROTECT_KEY, &cfg.get(PROTECT_KEY, ""))?,
            wipe: parse_field_list(WIPE_KEY, &cfg.get(WIPE_KEY, ""))?,
        })
    }

    pub fn protect(&self) -> &BTreeSet<u32> {
        &self.protect
    }

    pub fn wipe(&self) -> &BTreeSet<u32> {
        &self.wipe
    }

    /// Returns `true` if the selector redacts nothing.
    pub fn is_empty(&self) -> bool {
        self.protect.is_empty() && self.wipe.is_empty()
    }
}

/// Rewrites sensitive message fields in log events.
///
/// The filter holds no mutable state while processing, so one instance can
/// serve any number of threads. It must be registered ahead of listeners that
/// persist events; listeners registered before it see cleartext.
///
/// ```rust
/// use protected_log::{IsoMessage, LogEvent, RedactionFilter, SimpleConfiguration};
///
/// let cfg = SimpleConfiguration::new().with("protect", "2").with("wipe", "35");
/// let filter = RedactionFilter::from_configuration(&cfg).unwrap();
///
/// let mut event = LogEvent::new("channel", "send");
/// event.add_message(
///     IsoMessage::new("0200")
///         .with_field(2, "4111111111111111")
///         .with_field(35, "4111111111111111=2512101"),
/// );
/// filter.process(&mut event);
///
/// let msg = event.messages().next().unwrap();
/// assert_eq!(msg.get_field(2).unwrap(), "________________");
/// assert_eq!(msg.get_field(35).unwrap(), "[WIPED]");
/// ```
#[derive(Clone)]
pub struct RedactionFilter {
    selector: FieldSelector,
    policy: Arc<dyn MaskPolicy>,
}

impl RedactionFilter {
    /// Creates a filter that redacts nothing until configured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            selector: FieldSelector::default(),
            policy: Arc::new(TextMaskPolicy::default()),
        }
    }

    /// Creates a filter from `protect`, `wipe`, `mask` and `mask-char`.
    pub fn from_configuration(cfg: &dyn Configuration) -> Result<Self, ConfigurationError> {
        let mut filter = Self::new();
        filter.set_configuration(cfg)?;
        Ok(filter)
    }

    /// Replaces the field selector and mask policy.
    ///
    /// Nothing from the previous configuration is merged. On error the filter
    /// keeps its previous state.
    pub fn set_configuration(&mut self, cfg: &dyn Configuration) -> Result<(), ConfigurationError> {
        let selector = FieldSelector::from_configuration(cfg)?;
        let policy = TextMaskPolicy::from_configuration(cfg)?;
        self.selector = selector;
        self.policy = Arc::new(policy);
        Ok(())
    }

    /// Uses an explicit field selector.
    #[must_use]
    pub fn with_selector(mut self, selector: FieldSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Uses a custom mask policy.
    #[must_use]
    pub fn with_policy<P>(mut self, policy: P) -> Self
    where
        P: MaskPolicy + 'static,
    {
        self.policy = Arc::new(policy);
        self
    }

    pub fn selector(&self) -> &FieldSelector {
        &self.selector
    }

    /// Returns a redacted deep clone of `msg` and the field errors hit on the way.
    ///
    /// `msg` itself is never modified. A failing field keeps whatever value the
    /// clone held when the failure happened.
    pub fn redact_message(
        &self,
        msg: &dyn FinancialMessage,
    ) -> (Box<dyn FinancialMessage>, Vec<MessageFormatError>) {
        let mut clone = msg.clone_message();
        let mut errors = Vec::new();

        for &field in &self.selector.protect {
            if !clone.has_field(field) {
                continue;
            }
            let masked = clone
                .get_field(field)
                .and_then(|value| clone.set_field(field, self.policy.mask(&value)));
            if let Err(err) = masked {
                errors.push(err);
            }
        }

        for &field in &self.selector.wipe {
            if !clone.has_field(field) {
                continue;
            }
            if let Err(err) = clone.set_field(field, WIPED_PLACEHOLDER.to_owned()) {
                errors.push(err);
            }
        }

        (clone, errors)
    }

    /// Redacts every message in `event` in place and returns the same event.
    ///
    /// Non-message items keep their position and value. Field errors are
    /// appended to the event's error list; this method never fails.
    pub fn process<'a>(&self, event: &'a mut LogEvent) -> &'a mut LogEvent {
        let mut errors = Vec::new();
        for item in event.payload_mut() {
            if let PayloadItem::Message(msg) = item {
                let (redacted, field_errors) = self.redact_message(&**msg);
                *msg = Arc::from(redacted);
                errors.extend(field_errors);
            }
        }
        for err in errors {
            event.add_error(err);
        }
        event
    }

    /// Processes an event shared between threads.
    ///
    /// The lock is held for the whole pass, so payload replacement is atomic
    /// with respect to other holders of the same event. A poisoned lock is
    /// recovered.
    pub fn process_shared(&self, event: &Mutex<LogEvent>) {
        let mut guard = event
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.process(&mut guard);
    }
}

impl Default for RedactionFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RedactionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactionFilter")
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

impl LogListener for RedactionFilter {
    fn log(&self, mut event: LogEvent) -> Option<LogEvent> {
        self.process(&mut event);
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{FieldSelector, RedactionFilter};
    use crate::{
        config::SimpleConfiguration,
        error::ConfigurationError,
        event::LogEvent,
        message::{FinancialMessage, IsoMessage},
        policy::{TextMaskPolicy, WIPED_PLACEHOLDER},
    };

    fn configured(protect: &str, wipe: &str) -> RedactionFilter {
        let cfg = SimpleConfiguration::new()
            .with("protect", protect)
            .with("wipe", wipe);
        RedactionFilter::from_configuration(&cfg).unwrap()
    }

    #[test]
    fn unconfigured_filter_redacts_nothing() {
        let filter = RedactionFilter::new();
        assert!(filter.selector().is_empty());

        let msg = IsoMessage::new("0200").with_field(2, "4111111111111111");
        let (redacted, errors) = filter.redact_message(&msg);
        assert!(errors.is_empty());
        assert_eq!(redacted.get_field(2).unwrap(), "4111111111111111");
    }

    #[test]
    fn wipe_wins_over_protect() {
        let filter = configured("2", "2");
        let msg = IsoMessage::new("0200").with_field(2, "4111111111111111");
        let (redacted, _) = filter.redact_message(&msg);
        assert_eq!(redacted.get_field(2).unwrap(), WIPED_PLACEHOLDER);
    }

    #[test]
    fn absent_fields_are_not_created() {
        let filter = configured("2 99", "35");
        let msg = IsoMessage::new("0800").with_field(70, "301");
        let (redacted, errors) = filter.redact_message(&msg);
        assert!(errors.is_empty());
        assert_eq!(redacted.field_numbers(), vec![0, 70]);
    }

    #[test]
    fn reconfiguration_replaces_both_sets() {
        let mut filter = configured("2 14", "35");
        let cfg = SimpleConfiguration::new().with("protect", "48");
        filter.set_configuration(&cfg).unwrap();

        assert_eq!(filter.selector(), &FieldSelector::new([48], []));
    }

    #[test]
    fn failed_reconfiguration_keeps_previous_state() {
        let mut filter = configured("2", "35");
        let cfg = SimpleConfiguration::new().with("protect", "2 x");
        let err = filter.set_configuration(&cfg).unwrap_err();

        assert!(matches!(err, ConfigurationError::InvalidField { .. }));
        assert_eq!(filter.selector(), &FieldSelector::new([2], [35]));
    }

    #[test]
    fn invalid_list_blocks_construction() {
        let cfg = SimpleConfiguration::new().with("wipe", "35 fifty");
        assert!(RedactionFilter::from_configuration(&cfg).is_err());
    }

    #[test]
    fn custom_policy_is_used_for_protected_fields() {
        let filter = RedactionFilter::new()
            .with_selector(FieldSelector::new([2], []))
            .with_policy(TextMaskPolicy::truncate());
        let msg = IsoMessage::new("0200").with_field(2, "4111111111111111");
        let (redacted, _) = filter.redact_message(&msg);
        assert_eq!(redacted.get_field(2).unwrap(), "411111______1111");
    }

    #[test]
    fn process_returns_the_same_event() {
        let filter = configured("2", "");
        let mut event = LogEvent::new("channel", "send");
        event.add_message(IsoMessage::new("0200").with_field(2, "4111111111111111"));

        let before: *const LogEvent = &event;
        let after: *const LogEvent = filter.process(&mut event);
        assert_eq!(before, after);
    }

    #[test]
    fn producer_handle_is_untouched() {
        let filter = configured("2", "");
        let original: Arc<dyn FinancialMessage> =
            Arc::new(IsoMessage::new("0200").with_field(2, "4111111111111111"));

        let mut event = LogEvent::new("channel", "send");
        event.push(Arc::clone(&original));
        filter.process(&mut event);

        assert_eq!(original.get_field(2).unwrap(), "4111111111111111");
        let logged = event.messages().next().unwrap();
        assert_eq!(logged.get_field(2).unwrap(), "________________");
    }

    #[test]
    fn debug_output_omits_policy() {
        let filter = configured("2", "35");
        let text = format!("{filter:?}");
        assert!(text.starts_with("RedactionFilter"));
        assert!(text.contains("35"));
    }
}
