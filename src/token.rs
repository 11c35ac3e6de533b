use serde::Serialize;

use crate::transcript::TranscriptWord;

/// A single token produced by an ASR backend.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Token {
    /// Start time in seconds (whisper returns centiseconds).
    pub start_seconds: f32,
    /// End time in seconds (whisper returns centiseconds).
    pub end_seconds: f32,
    /// Token text. Whisper marks the start of a new word with a leading space.
    pub text: String,
    /// Probability assigned to this token.
    pub probability: f32,
}

pub(crate) fn centiseconds_to_seconds(value: i64) -> f32 {
    if value < 0 { 0.0 } else { value as f32 / 100.0 }
}

/// Whisper control tokens such as `[_BEG_]`, `[_TT_150]` or `<|endoftext|>`.
fn is_control_token(text: &str) -> bool {
    (text.starts_with("[_") && text.ends_with(']'))
        || (text.starts_with("<|") && text.ends_with("|>"))
}

/// Group sub-word tokens into words.
///
/// A token whose text begins with whitespace starts a new word; any other token continues the
/// current one (`" fuck"` + `"ing"` + `","` becomes `"fucking,"`). A word spans from its first
/// token's start to its last token's end, and its confidence is the mean token probability.
/// Control tokens are skipped and words that are only whitespace are dropped.
pub fn words_from_tokens(tokens: &[Token]) -> Vec<TranscriptWord> {
    let mut words = Vec::new();
    let mut current: Option<WordBuilder> = None;

    for token in tokens {
        if token.text.is_empty() || is_control_token(&token.text) {
            continue;
        }

        let starts_word = token.text.starts_with(char::is_whitespace);
        match current.as_mut() {
            Some(word) if !starts_word => word.push(token),
            _ => {
                if let Some(done) = current.take().and_then(WordBuilder::finish) {
                    words.push(done);
                }
                current = Some(WordBuilder::new(token));
            }
        }
    }

    if let Some(done) = current.and_then(WordBuilder::finish) {
        words.push(done);
    }

    words
}

struct WordBuilder {
    text: String,
    start_seconds: f32,
    end_seconds: f32,
    probability_sum: f32,
    tokens: u32,
}

impl WordBuilder {
    fn new(token: &Token) -> Self {
        Self {
            text: token.text.clone(),
            start_seconds: token.start_seconds,
            end_seconds: token.end_seconds,
            probability_sum: token.probability,
            tokens: 1,
        }
    }

    fn push(&mut self, token: &Token) {
        self.text.push_str(&token.text);
        self.end_seconds = self.end_seconds.max(token.end_seconds);
        self.probability_sum += token.probability;
        self.tokens += 1;
    }

    fn finish(self) -> Option<TranscriptWord> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }

        Some(TranscriptWord {
            text: text.to_owned(),
            start_seconds: f64::from(self.start_seconds),
            end_seconds: f64::from(self.end_seconds),
            confidence: self.probability_sum / self.tokens as f32,
        })
    }
}
