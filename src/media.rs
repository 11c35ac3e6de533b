use std::path::{Path, PathBuf};

use crate::Result;

/// Audio pulled out of a video, ready for transcription.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedAudio {
    /// 16 kHz mono PCM WAV.
    pub path: PathBuf,

    /// Length of the audio track in seconds. Mute intervals are clamped to this.
    pub duration_seconds: f64,
}

/// The media transcoder collaborator used by [`crate::Pipeline`].
///
/// Implementations are expected to be blocking. Failures should carry the tool's diagnostics:
/// extraction problems as [`crate::Error::Extraction`], filter/re-encode problems as
/// [`crate::Error::Transcode`].
pub trait MediaTool {
    /// Demux the audio track of `video` into a 16 kHz mono PCM WAV at `audio_out`.
    fn extract_audio(&self, video: &Path, audio_out: &Path) -> Result<ExtractedAudio>;

    /// Write `out`: video stream copied verbatim, audio run through `filter_expr` and
    /// re-encoded.
    fn transcode(&self, video: &Path, filter_expr: &str, out: &Path) -> Result<()>;
}

impl<M: MediaTool + ?Sized> MediaTool for &M {
    fn extract_audio(&self, video: &Path, audio_out: &Path) -> Result<ExtractedAudio> {
        (**self).extract_audio(video, audio_out)
    }

    fn transcode(&self, video: &Path, filter_expr: &str, out: &Path) -> Result<()> {
        (**self).transcode(video, filter_expr, out)
    }
}

impl<M: MediaTool + ?Sized> MediaTool for Box<M> {
    fn extract_audio(&self, video: &Path, audio_out: &Path) -> Result<ExtractedAudio> {
        (**self).extract_audio(video, audio_out)
    }

    fn transcode(&self, video: &Path, filter_expr: &str, out: &Path) -> Result<()> {
        (**self).transcode(video, filter_expr, out)
    }
}
