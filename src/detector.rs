//! Word-level profanity detection.
//!
//! Detection works on the transcriber's own word segmentation: each word is normalized and
//! compared for exact equality against the active phrase set. Token boundaries therefore come
//! for free, and a word like "classic" can never trip the entry "ass".

use serde::Serialize;
use tracing::debug;

use crate::lexicon::Lexicon;
use crate::normalize::normalize;
use crate::settings::FilterSettings;
use crate::transcript::Transcript;

/// Shortest interval we will ever mute, in seconds.
///
/// This is one unit of the filter expression's 3-decimal precision. Zero-padding settings can
/// produce `start == end` for words whisper reports as instantaneous; those get widened to
/// this length so downstream intervals are never empty.
pub const MIN_INTERVAL_SECONDS: f64 = 0.001;

/// One matched word, padded, before merging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub start_seconds: f64,
    pub end_seconds: f64,

    /// The word as transcribed.
    pub source_text: String,

    /// The normalized form that matched the lexicon.
    pub matched_word: String,

    /// Unpadded start of the word.
    pub origin_seconds: f64,

    pub confidence: f32,

    pub category: Option<String>,
}

/// Find every lexicon match in `transcript`, in transcript order.
///
/// A word matches when its normalized text is in the active set for `settings` and its
/// confidence is at least `settings.confidence_threshold`. Segments without word timing
/// contribute nothing.
pub fn detect(
    transcript: &Transcript,
    lexicon: &Lexicon,
    settings: &FilterSettings,
) -> Vec<Candidate> {
    let active_words = lexicon.active_words(settings);
    if active_words.is_empty() {
        debug!("no active words for the enabled categories");
        return Vec::new();
    }

    let padding = settings.word_padding;
    let mut candidates = Vec::new();

    for word in transcript.words() {
        let matched = normalize(&word.text);
        if !active_words.contains(&matched) {
            continue;
        }

        if word.confidence < settings.confidence_threshold {
            debug!(
                word = %matched,
                confidence = word.confidence,
                threshold = settings.confidence_threshold,
                "match below confidence threshold"
            );
            continue;
        }

        let start_seconds = (word.start_seconds - padding).max(0.0);
        let mut end_seconds = word.end_seconds + padding;
        if end_seconds <= start_seconds {
            end_seconds = start_seconds + MIN_INTERVAL_SECONDS;
        }

        let category = lexicon.category_of(&matched).map(str::to_owned);

        candidates.push(Candidate {
            start_seconds,
            end_seconds,
            source_text: word.text.clone(),
            matched_word: matched,
            origin_seconds: word.start_seconds,
            confidence: word.confidence,
            category,
        });
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptWord;

    fn word(text: &str, start: f64, end: f64, confidence: f32) -> TranscriptWord {
        TranscriptWord {
            text: text.to_owned(),
            start_seconds: start,
            end_seconds: end,
            confidence,
        }
    }

    fn run(words: Vec<TranscriptWord>, settings: &FilterSettings) -> Vec<Candidate> {
        detect(&Transcript::from_words(words), &Lexicon::builtin(), settings)
    }

    #[test]
    fn punctuated_word_matches() {
        let found = run(vec![word(" Ass.", 1.0, 1.2, 0.9)], &FilterSettings::default());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].matched_word, "ass");
        assert_eq!(found[0].source_text, " Ass.");
        assert_eq!(found[0].category.as_deref(), Some("profanity_curse"));
    }

    #[test]
    fn no_substring_matches() {
        let found = run(
            vec![
                word("classic", 1.0, 1.4, 0.99),
                word("hello", 1.5, 1.8, 0.99),
                word("shitake", 2.0, 2.4, 0.99),
            ],
            &FilterSettings::default(),
        );
        assert!(found.is_empty());
    }

    #[test]
    fn confidence_gate_filters_uncertain_words() {
        let settings = FilterSettings::default().with_confidence_threshold(0.75);

        assert!(run(vec![word("damn", 1.0, 1.2, 0.5)], &settings).is_empty());
        assert_eq!(run(vec![word("damn", 1.0, 1.2, 0.9)], &settings).len(), 1);
    }

    #[test]
    fn confidence_equal_to_threshold_passes() {
        let settings = FilterSettings::default().with_confidence_threshold(0.75);
        assert_eq!(run(vec![word("damn", 1.0, 1.2, 0.75)], &settings).len(), 1);
    }

    #[test]
    fn zero_threshold_disables_the_gate() {
        let settings = FilterSettings::default().with_confidence_threshold(0.0);
        assert_eq!(run(vec![word("damn", 1.0, 1.2, 0.01)], &settings).len(), 1);
    }

    #[test]
    fn padding_is_applied_and_clamped_at_zero() {
        let found = run(
            vec![word("shit", 0.1, 0.4, 0.95), word("fuck", 5.0, 5.3, 0.95)],
            &FilterSettings::default(),
        );

        assert_eq!(found[0].start_seconds, 0.0);
        assert!((found[0].end_seconds - 0.65).abs() < 1e-9);
        assert!((found[1].start_seconds - 4.75).abs() < 1e-9);
        assert!((found[1].end_seconds - 5.55).abs() < 1e-9);
        assert_eq!(found[1].origin_seconds, 5.0);
    }

    #[test]
    fn instantaneous_word_without_padding_is_widened() {
        let settings = FilterSettings::default().with_word_padding(0.0);
        let found = run(vec![word("hell", 3.0, 3.0, 0.9)], &settings);

        assert_eq!(found.len(), 1);
        assert!(found[0].end_seconds > found[0].start_seconds);
        assert!((found[0].end_seconds - (3.0 + MIN_INTERVAL_SECONDS)).abs() < 1e-12);
    }

    #[test]
    fn disabled_categories_do_not_match() {
        let settings = FilterSettings::default().with_categories(["mild_language"]);
        assert!(run(vec![word("shit", 1.0, 1.2, 0.99)], &settings).is_empty());
        assert_eq!(run(vec![word("Darn!", 1.0, 1.2, 0.99)], &settings).len(), 1);
    }

    #[test]
    fn segments_without_words_yield_nothing() -> anyhow::Result<()> {
        let transcript: Transcript = serde_json::from_str(
            r#"{"segments": [{"start": 0.0, "end": 2.0, "text": "oh shit"}]}"#,
        )?;
        let found = detect(&transcript, &Lexicon::builtin(), &FilterSettings::default());
        assert!(found.is_empty());
        Ok(())
    }

    #[test]
    fn output_follows_transcript_order() {
        let found = run(
            vec![word("damn", 9.0, 9.2, 0.9), word("hell", 2.0, 2.2, 0.9)],
            &FilterSettings::default(),
        );
        let matched: Vec<&str> = found.iter().map(|c| c.matched_word.as_str()).collect();
        assert_eq!(matched, vec!["damn", "hell"]);
    }
}
