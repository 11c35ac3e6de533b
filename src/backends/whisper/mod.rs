use std::path::{Path, PathBuf};

use anyhow::{Context, ensure};
use tracing::{debug, info, warn};
use whisper_rs::WhisperContext;

use crate::model::SharedModel;
use crate::opts::TranscribeOpts;
use crate::transcriber::Transcriber;
use crate::transcript::Transcript;
use crate::wav::get_samples_from_wav_path;
use crate::{Error, Result};

mod ctx;
mod logging;
mod segments;
mod token;

pub use logging::init_whisper_logging;

/// Built-in transcriber powered by `whisper-rs` / `whisper.cpp`.
///
/// The model is not touched until the first transcription. It is then loaded once under a
/// mutex and shared by every later call, including calls from other threads; each call gets
/// its own inference state.
pub struct WhisperTranscriber {
    model_path: PathBuf,
    opts: TranscribeOpts,
    model: SharedModel<WhisperContext>,
}

impl WhisperTranscriber {
    /// Create a transcriber for a whisper.cpp model file. The file is checked now, loaded later.
    pub fn new(model_path: impl Into<PathBuf>, opts: TranscribeOpts) -> Result<Self> {
        let model_path = model_path.into();
        if !model_path.is_file() {
            return Err(Error::Transcription(format!(
                "whisper model not found at '{}'",
                model_path.display()
            )));
        }

        // Whisper can be very chatty; keep it quiet by default.
        init_whisper_logging();

        Ok(Self {
            model_path,
            opts,
            model: SharedModel::new(),
        })
    }

    /// Load the model now instead of on first use.
    pub fn preload(&self) -> Result<()> {
        self.context().map(|_| ())
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn context(&self) -> Result<std::sync::Arc<WhisperContext>> {
        self.model
            .get_or_load(|| ctx::get_context(&self.model_path))
            .map_err(|err| Error::Transcription(format!("{err:#}")))
    }

    fn transcribe_inner(&self, audio: &Path) -> anyhow::Result<Transcript> {
        let ctx = self
            .context()
            .context("whisper model is unavailable")?;

        let (samples, _spec) = get_samples_from_wav_path(audio)?;
        ensure!(!samples.is_empty(), "audio file '{}' has no samples", audio.display());

        debug!(samples = samples.len(), "running whisper");
        let transcript = segments::transcribe_samples(&ctx, &self.opts, &samples)?;

        if transcript.lacks_word_timing() && !transcript.segments.is_empty() {
            warn!("whisper returned no word-level timing; nothing can be muted");
        }

        Ok(transcript)
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio: &Path) -> Result<Transcript> {
        let transcript = self
            .transcribe_inner(audio)
            .map_err(|err| Error::Transcription(format!("{err:#}")))?;

        info!(
            segments = transcript.segments.len(),
            words = transcript.words().count(),
            "transcribed audio"
        );
        Ok(transcript)
    }
}
