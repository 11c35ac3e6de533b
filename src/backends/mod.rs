/// Replays transcripts saved as JSON.
pub mod json;

/// Built-in Whisper transcriber.
#[cfg(feature = "whisper")]
pub mod whisper;
