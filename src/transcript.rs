use serde::{Deserialize, Serialize};

/// A single transcribed word with its timing.
///
/// The serde aliases accept the field names Whisper's JSON output uses (`word`, `start`, `end`,
/// `probability`), so transcripts produced elsewhere can be fed straight into the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptWord {
    /// Word text exactly as transcribed (punctuation and casing intact).
    #[serde(alias = "word")]
    pub text: String,

    #[serde(alias = "start")]
    pub start_seconds: f64,

    #[serde(alias = "end")]
    pub end_seconds: f64,

    /// Transcriber confidence in `[0, 1]`. Missing values are treated as fully confident.
    #[serde(alias = "probability", default = "full_confidence")]
    pub confidence: f32,
}

fn full_confidence() -> f32 {
    1.0
}

/// A transcript segment. `words` is empty when only segment-level timing is available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    #[serde(alias = "start")]
    pub start_seconds: f64,

    #[serde(alias = "end")]
    pub end_seconds: f64,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub words: Vec<TranscriptWord>,
}

/// Ordered output of one transcription call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self { segments }
    }

    /// Build a single-segment transcript from bare words. Handy for tests and tools that only
    /// have word-level data.
    pub fn from_words(words: Vec<TranscriptWord>) -> Self {
        let start_seconds = words.first().map_or(0.0, |w| w.start_seconds);
        let end_seconds = words.last().map_or(0.0, |w| w.end_seconds);
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            segments: vec![TranscriptSegment {
                start_seconds,
                end_seconds,
                text,
                words,
            }],
        }
    }

    /// Every word, in transcript order.
    pub fn words(&self) -> impl Iterator<Item = &TranscriptWord> {
        self.segments.iter().flat_map(|s| s.words.iter())
    }

    /// True when no segment carries word-level timing.
    pub fn lacks_word_timing(&self) -> bool {
        self.segments.iter().all(|s| s.words.is_empty())
    }
}
