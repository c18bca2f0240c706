//! Masking policies for field values.
//!
//! Policies are pure string transformations. They do not decide which fields
//! are sensitive; that is the job of [`crate::FieldSelector`].
//!
//! Every policy shipped here keeps the character count of its input and is
//! deterministic. Masking is idempotent: a value whose masked positions already
//! hold the mask character comes back unchanged. For truncation that includes
//! inputs such as `123456_8901`, whose hidden middle was never clear text, so
//! "the output differs from the input" is only guaranteed when some masked
//! position holds something other than the mask character.

use crate::{config::Configuration, error::ConfigurationError};

/// Sentinel written over wiped fields.
pub const WIPED_PLACEHOLDER: &str = "[WIPED]";

/// Character used by the built-in policies unless overridden.
pub const DEFAULT_MASK_CHAR: char = '_';

/// Track 2 separator between the PAN and the discretionary data.
const TRACK2_SEPARATOR: char = '=';

/// Track 1 separator between the PAN and the cardholder name.
const TRACK1_SEPARATOR: char = '^';

/// Returns `true` if `c` ends the card number in track data.
///
/// Separators cannot be used as mask characters: a masked card number would
/// then be split differently on the next pass.
#[must_use]
pub fn is_track_separator(c: char) -> bool {
    c == TRACK2_SEPARATOR || c == TRACK1_SEPARATOR
}

/// Turns a sensitive value into a non-reversible obfuscated form.
///
/// Implementations must be deterministic and must not let the original content
/// be recovered from the output. They are shared across threads by the filter.
pub trait MaskPolicy: Send + Sync {
    /// Masks `value`.
    fn mask(&self, value: &str) -> String;
}

impl<F> MaskPolicy for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn mask(&self, value: &str) -> String {
        self(value)
    }
}

/// Keeps a leading and trailing span of the card number visible.
///
/// Use [`KeepConfig::pan`] for the usual first-six/last-four truncation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeepConfig {
    /// Number of leading characters to keep visible.
    visible_prefix: usize,
    /// Number of trailing characters to keep visible.
    visible_suffix: usize,
    /// Symbol used to mask the middle.
    mask_char: char,
}

impl KeepConfig {
    /// Keeps the first six and last four characters of the card number.
    #[must_use]
    pub fn pan() -> Self {
        Self::both(6, 4)
    }

    /// Keeps `visible_prefix` leading and `visible_suffix` trailing characters.
    #[must_use]
    pub fn both(visible_prefix: usize, visible_suffix: usize) -> Self {
        Self {
            visible_prefix,
            visible_suffix,
            mask_char: DEFAULT_MASK_CHAR,
        }
    }

    /// Uses a specific masking character.
    ///
    /// Track separators (`=` and `^`) are ignored and the current character is
    /// kept; see [`is_track_separator`].
    #[must_use]
    pub fn with_mask_char(mut self, mask_char: char) -> Self {
        self.set_mask_char(mask_char);
        self
    }

    fn set_mask_char(&mut self, mask_char: char) {
        if !is_track_separator(mask_char) {
            self.mask_char = mask_char;
        }
    }

    /// Applies the truncation to `value`.
    ///
    /// Only the text before the first `=` or `^` is treated as the card
    /// number. That separator stays visible and everything after it is masked.
    /// When the visible spans would cover the whole card number nothing is kept.
    fn apply_to(&self, value: &str) -> String {
        let (pan, rest) = match value.char_indices().find(|(_, c)| is_track_separator(*c)) {
            Some((at, separator)) => {
                let rest = &value[at + separator.len_utf8()..];
                (&value[..at], Some((separator, rest)))
            }
            None => (value, None),
        };

        let mut chars: Vec<char> = pan.chars().collect();
        let total = chars.len();
        if self.visible_prefix.saturating_add(self.visible_suffix) >= total {
            chars.fill(self.mask_char);
        } else {
            chars[self.visible_prefix..total - self.visible_suffix].fill(self.mask_char);
        }

        let mut out: String = chars.into_iter().collect();
        if let Some((separator, rest)) = rest {
            out.push(separator);
            out.extend(rest.chars().map(|_| self.mask_char));
        }
        out
    }
}

impl Default for KeepConfig {
    fn default() -> Self {
        Self::pan()
    }
}

/// A masking strategy for field values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextMaskPolicy {
    /// Replace every character with the mask character.
    Full {
        /// Symbol written in place of each character.
        mask_char: char,
    },
    /// PCI-style truncation: keep configured leading and trailing spans.
    Truncate(KeepConfig),
}

impl TextMaskPolicy {
    /// Constructs [`TextMaskPolicy::Full`] with [`DEFAULT_MASK_CHAR`].
    #[must_use]
    pub fn full() -> Self {
        Self::Full {
            mask_char: DEFAULT_MASK_CHAR,
        }
    }

    /// Constructs [`TextMaskPolicy::Truncate`] with the first-six/last-four layout.
    #[must_use]
    pub fn truncate() -> Self {
        Self::Truncate(KeepConfig::pan())
    }

    /// Constructs [`TextMaskPolicy::Truncate`] from an explicit configuration.
    #[must_use]
    pub fn truncate_with(config: KeepConfig) -> Self {
        Self::Truncate(config)
    }

    /// Overrides the masking character.
    ///
    /// Track separators are ignored, as in [`KeepConfig::with_mask_char`].
    #[must_use]
    pub fn with_mask_char(mut self, mask_char: char) -> Self {
        if is_track_separator(mask_char) {
            return self;
        }
        match &mut self {
            TextMaskPolicy::Full { mask_char: current } => *current = mask_char,
            TextMaskPolicy::Truncate(config) => config.set_mask_char(mask_char),
        }
        self
    }

    /// Builds a policy from the `mask` and `mask-char` keys.
    ///
    /// A `mask-char` that is not exactly one character, or that is a track
    /// separator, is rejected.
    pub fn from_configuration(cfg: &dyn Configuration) -> Result<Self, ConfigurationError> {
        let name = cfg.get(crate::config::MASK_KEY, "full");
        let policy = match name.trim() {
            "" | "full" => Self::full(),
            "truncate" => Self::truncate(),
            other => {
                return Err(ConfigurationError::UnknownMaskPolicy {
                    value: other.to_owned(),
                })
            }
        };

        let raw = cfg.get(crate::config::MASK_CHAR_KEY, "");
        if raw.is_empty() {
            return Ok(policy);
        }
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(mask_char), None) if !is_track_separator(mask_char) => {
                Ok(policy.with_mask_char(mask_char))
            }
            _ => Err(ConfigurationError::InvalidMaskChar { value: raw }),
        }
    }

    /// Applies the policy to `value`.
    ///
    /// The output always has the same number of characters as the input.
    #[must_use]
    pub fn apply_to(&self, value: &str) -> String {
        match self {
            TextMaskPolicy::Full { mask_char } => value.chars().map(|_| *mask_char).collect(),
            TextMaskPolicy::Truncate(config) => config.apply_to(value),
        }
    }
}

impl Default for TextMaskPolicy {
    fn default() -> Self {
        Self::full()
    }
}

impl MaskPolicy for TextMaskPolicy {
    fn mask(&self, value: &str) -> String {
        self.apply_to(value)
    }
}
