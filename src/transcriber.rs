use std::path::Path;
use std::sync::Arc;

use crate::Result;
use crate::transcript::Transcript;

/// Pluggable speech-to-text collaborator used by [`crate::Pipeline`].
///
/// A transcriber turns a 16 kHz mono PCM WAV into an ordered transcript with word-level
/// timestamps and per-word confidence. Implementations that can only produce segment-level
/// timing may return segments with empty `words`; detection then finds nothing.
///
/// Implementations must be safe to call from several pipeline runs at once. Expensive state
/// (a loaded model) should be created once and shared, see [`crate::model::SharedModel`].
/// Failures should be reported as [`crate::Error::Transcription`].
pub trait Transcriber {
    fn transcribe(&self, audio: &Path) -> Result<Transcript>;
}

impl<T: Transcriber + ?Sized> Transcriber for &T {
    fn transcribe(&self, audio: &Path) -> Result<Transcript> {
        (**self).transcribe(audio)
    }
}

impl<T: Transcriber + ?Sized> Transcriber for Box<T> {
    fn transcribe(&self, audio: &Path) -> Result<Transcript> {
        (**self).transcribe(audio)
    }
}

impl<T: Transcriber + ?Sized> Transcriber for Arc<T> {
    fn transcribe(&self, audio: &Path) -> Result<Transcript> {
        (**self).transcribe(audio)
    }
}
