use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Categories enabled when a request does not say otherwise.
pub const DEFAULT_ENABLED_CATEGORIES: &[&str] = &["profanity_curse", "blasphemy_religious"];

/// Seconds of silence added on each side of a matched word.
pub const DEFAULT_WORD_PADDING: f64 = 0.25;

/// Minimum per-word confidence for a match to count.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.75;

/// Per-request knobs for profanity detection.
///
/// This struct represents *library-level configuration*, not CLI flags directly. Frontends
/// (the CLI, an HTTP layer, tests) build it programmatically or from JSON; missing JSON keys
/// keep their defaults, so `{"word_padding": 0.5}` only overrides the padding.
///
/// The confidence gate is a tunable: set `confidence_threshold` to `0.0` to accept every word
/// regardless of how sure the transcriber was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Lexicon category ids to match against. Unknown ids are ignored.
    pub enabled_categories: Vec<String>,

    /// Seconds added before and after each matched word. Must be finite and `>= 0`.
    pub word_padding: f64,

    /// Words below this confidence are not muted. Must be within `[0, 1]`.
    pub confidence_threshold: f32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            enabled_categories: DEFAULT_ENABLED_CATEGORIES
                .iter()
                .map(|c| (*c).to_owned())
                .collect(),
            word_padding: DEFAULT_WORD_PADDING,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl FilterSettings {
    /// Parse settings from JSON, filling missing keys with defaults, and validate them.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Like [`FilterSettings::from_json_str`], reading from any `Read`.
    pub fn from_json_reader<R: Read>(r: R) -> Result<Self> {
        let settings: Self = serde_json::from_reader(r)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Replace the enabled categories.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_word_padding(mut self, seconds: f64) -> Self {
        self.word_padding = seconds;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Reject settings the detector cannot honor.
    pub fn validate(&self) -> Result<()> {
        if !self.word_padding.is_finite() || self.word_padding < 0.0 {
            return Err(Error::InvalidSettings(format!(
                "word_padding must be a finite number >= 0, got {}",
                self.word_padding
            )));
        }

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::InvalidSettings(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }

        Ok(())
    }
}
