use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::transcriber::Transcriber;
use crate::transcript::Transcript;
use crate::{Error, Result};

/// Transcriber that replays a transcript saved as JSON.
///
/// Useful for re-running detection with different settings without paying for inference again,
/// and for transcripts produced by other Whisper front ends (their JSON shape is accepted).
/// The audio handed to [`Transcriber::transcribe`] is ignored.
#[derive(Debug, Clone)]
pub struct JsonTranscriber {
    path: PathBuf,
}

impl JsonTranscriber {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Transcriber for JsonTranscriber {
    fn transcribe(&self, _audio: &Path) -> Result<Transcript> {
        let file = File::open(&self.path).map_err(|err| {
            Error::Transcription(format!(
                "failed to open transcript '{}': {err}",
                self.path.display()
            ))
        })?;

        let transcript: Transcript =
            serde_json::from_reader(BufReader::new(file)).map_err(|err| {
                Error::Transcription(format!(
                    "failed to parse transcript '{}': {err}",
                    self.path.display()
                ))
            })?;

        info!(
            path = %self.path.display(),
            segments = transcript.segments.len(),
            "loaded transcript"
        );
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_a_saved_transcript() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("transcript.json");
        std::fs::write(
            &path,
            r#"{"segments": [{"start": 0, "end": 1,
                "words": [{"word": "hi", "start": 0.1, "end": 0.4}]}]}"#,
        )?;

        let transcript = JsonTranscriber::new(&path).transcribe(Path::new("ignored.wav"))?;
        assert_eq!(transcript.words().count(), 1);
        Ok(())
    }

    #[test]
    fn missing_file_is_a_transcription_failure() {
        let err = JsonTranscriber::new("does/not/exist.json")
            .transcribe(Path::new("ignored.wav"))
            .unwrap_err();
        assert!(matches!(err, Error::Transcription(_)));
    }

    #[test]
    fn malformed_json_is_a_transcription_failure() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json")?;

        let err = JsonTranscriber::new(&path)
            .transcribe(Path::new("ignored.wav"))
            .unwrap_err();
        assert!(err.to_string().contains("failed to parse transcript"));
        Ok(())
    }
}
