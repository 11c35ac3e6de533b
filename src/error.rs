use std::fmt;

use thiserror::Error;

use crate::pipeline::Stage;

/// Hush's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Hush's crate-wide error type.
///
/// Each pipeline step fails with its own variant so callers can tell a malformed upload apart
/// from a model failure without parsing messages. Subprocess diagnostics travel inside
/// [`ProcessFailure`] and are rendered as part of the error text.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// The transcoder could not demux/convert the input (likely malformed or unsupported).
    #[error("audio extraction failed: {0}")]
    Extraction(ProcessFailure),

    /// The speech-to-text collaborator failed (model load, corrupt audio, inference).
    #[error("transcription failed: {0}")]
    Transcription(String),

    /// Merged intervals violated the filter builder's preconditions.
    #[error("mute filter could not be built: {0}")]
    FilterBuild(String),

    /// The transcoder could not apply the mute filter or re-encode audio.
    #[error("transcode failed: {0}")]
    Transcode(ProcessFailure),

    /// A caller referenced a file or artifact id with no backing file.
    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("invalid filter settings: {0}")]
    InvalidSettings(String),

    #[error("invalid lexicon: {0}")]
    InvalidLexicon(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// The pipeline stage whose transition produced this error.
    ///
    /// Request-level problems (bad settings, missing source, an unusable work or output
    /// directory) belong to [`Stage::Uploaded`]; bare IO errors come from output placement.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Extraction(_) => Stage::AudioExtracted,
            Self::Transcription(_) => Stage::Transcribed,
            Self::FilterBuild(_) => Stage::FilterBuilt,
            Self::Transcode(_) => Stage::Transcoded,
            Self::Io(_) => Stage::Finalized,
            Self::ArtifactNotFound(_)
            | Self::InvalidSettings(_)
            | Self::InvalidLexicon(_)
            | Self::Message(_)
            | Self::Json(_) => Stage::Uploaded,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

/// Diagnostics captured from a failed external process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFailure {
    /// Short description of what was being attempted.
    pub message: String,
    /// Process exit code, when the process ran and exited normally.
    pub exit_code: Option<i32>,
    /// Captured stderr (trimmed). Empty when nothing was captured.
    pub stderr: String,
}

impl ProcessFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: None,
            stderr: String::new(),
        }
    }

    pub fn with_exit_code(mut self, exit_code: Option<i32>) -> Self {
        self.exit_code = exit_code;
        self
    }

    pub fn with_stderr(mut self, stderr: impl AsRef<str>) -> Self {
        self.stderr = stderr.as_ref().trim().to_owned();
        self
    }
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(code) = self.exit_code {
            write!(f, " (exit code {code})")?;
        }
        if !self.stderr.is_empty() {
            write!(f, ": {}", self.stderr)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProcessFailure {}
