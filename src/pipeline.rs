//! High-level API for muting profanity in a video.
//!
//! [`Pipeline`] is the single entry point. It owns the long-lived pieces (the shared lexicon,
//! the transcriber with its lazily loaded model, the media tool) and runs each request through
//! a fixed sequence of stages:
//!
//! `Uploaded → AudioExtracted → Transcribed → Detected → Merged → FilterBuilt → Transcoded →
//! Finalized`
//!
//! Any failing step ends the run with that step's error; nothing is retried. Runs are blocking
//! and independent of each other, so one `Pipeline` can serve several threads at once.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::detector::detect;
use crate::filter::{MuteFilter, build_mute_filter};
use crate::lexicon::Lexicon;
use crate::media::MediaTool;
use crate::merge::{MergedInterval, clamp_to_duration, merge};
use crate::settings::FilterSettings;
use crate::transcriber::Transcriber;
use crate::{Error, Result};

/// Prefix of every finalized artifact name.
pub const CLEAN_PREFIX: &str = "clean_";

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Uploaded,
    AudioExtracted,
    Transcribed,
    Detected,
    Merged,
    FilterBuilt,
    Transcoded,
    Finalized,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uploaded => "uploaded",
            Self::AudioExtracted => "audio_extracted",
            Self::Transcribed => "transcribed",
            Self::Detected => "detected",
            Self::Merged => "merged",
            Self::FilterBuilt => "filter_built",
            Self::Transcoded => "transcoded",
            Self::Finalized => "finalized",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Filesystem layout for pipeline runs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Parent of the per-run scratch directories (extracted audio, intermediate video).
    pub work_dir: PathBuf,

    /// Where finalized artifacts are placed and looked up by id.
    pub output_dir: PathBuf,

    /// Keep each run's scratch directory instead of deleting it when the run ends.
    pub keep_intermediates: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let dir = std::env::temp_dir().join("hush");
        Self {
            work_dir: dir.clone(),
            output_dir: dir,
            keep_intermediates: false,
        }
    }
}

impl PipelineConfig {
    pub fn new(work_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            output_dir: output_dir.into(),
            keep_intermediates: false,
        }
    }

    pub fn keep_intermediates(mut self, keep: bool) -> Self {
        self.keep_intermediates = keep;
        self
    }
}

/// What a successful run reports back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: String,

    /// Number of merged intervals that were muted.
    pub muted_count: usize,

    /// Number of individual word matches before merging.
    pub detected_words: usize,

    pub intervals: Vec<MergedInterval>,

    /// File name of the finalized artifact inside the output directory.
    pub output_artifact_id: String,

    pub output_path: PathBuf,

    pub message: String,
}

/// Sequences extraction, transcription, detection, merging, filtering, and transcoding.
pub struct Pipeline<T, M> {
    config: PipelineConfig,
    lexicon: Arc<Lexicon>,
    transcriber: T,
    media: M,
}

impl<T: Transcriber, M: MediaTool> Pipeline<T, M> {
    pub fn new(config: PipelineConfig, lexicon: Arc<Lexicon>, transcriber: T, media: M) -> Self {
        Self {
            config,
            lexicon,
            transcriber,
            media,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn transcriber(&self) -> &T {
        &self.transcriber
    }

    /// Produce a muted copy of `video` in the output directory.
    pub fn run(&self, video: &Path, settings: &FilterSettings) -> Result<PipelineReport> {
        let run_id = Uuid::new_v4().simple().to_string();
        let span = info_span!("pipeline_run", run_id = %run_id);
        let _enter = span.enter();

        let mut progress = Progress::new();
        match self.run_stages(&run_id, video, settings, &mut progress) {
            Ok(report) => Ok(report),
            Err(err) => {
                error!(
                    stage = %Stage::Failed,
                    failed_step = %err.stage(),
                    last_completed = %progress.stage,
                    error = %err,
                    "pipeline run failed"
                );
                Err(err)
            }
        }
    }

    fn run_stages(
        &self,
        run_id: &str,
        video: &Path,
        settings: &FilterSettings,
        progress: &mut Progress,
    ) -> Result<PipelineReport> {
        settings.validate()?;
        if !video.is_file() {
            return Err(Error::ArtifactNotFound(video.display().to_string()));
        }
        info!(stage = %progress.stage, source = %video.display(), "run started");

        prepare_dir(&self.config.work_dir, "work directory")?;
        prepare_dir(&self.config.output_dir, "output directory")?;
        let scratch = Scratch::create(
            &self.config.work_dir,
            run_id,
            self.config.keep_intermediates,
        )?;

        let audio_path = scratch.path().join(format!("audio_{run_id}.wav"));
        let audio = self.media.extract_audio(video, &audio_path)?;
        progress.advance(Stage::AudioExtracted);

        let transcript = self.transcriber.transcribe(&audio.path)?;
        progress.advance(Stage::Transcribed);

        let candidates = detect(&transcript, &self.lexicon, settings);
        debug!(candidates = candidates.len(), "detection finished");
        progress.advance(Stage::Detected);

        let intervals = clamp_to_duration(merge(&candidates), audio.duration_seconds);
        debug!(intervals = intervals.len(), "merge finished");
        progress.advance(Stage::Merged);

        let filter = build_mute_filter(&intervals)?;
        progress.advance(Stage::FilterBuilt);

        let source_name = video
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_owned());
        let artifact_id = format!("{CLEAN_PREFIX}{run_id}_{source_name}");
        let final_path = self.config.output_dir.join(&artifact_id);

        match &filter {
            MuteFilter::PassThrough => {
                info!("no intervals to mute; copying source unchanged");
                fs::copy(video, &final_path)?;
                progress.advance(Stage::Transcoded);
            }
            MuteFilter::Gate(expr) => {
                let ext = video
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "mp4".to_owned());
                let muted_path = scratch.path().join(format!("{CLEAN_PREFIX}{run_id}.{ext}"));

                self.media.transcode(video, expr, &muted_path)?;
                progress.advance(Stage::Transcoded);

                move_file(&muted_path, &final_path)?;
            }
        }
        progress.advance(Stage::Finalized);

        let muted_count = intervals.len();
        let message = if muted_count == 0 {
            "No profanity detected.".to_owned()
        } else {
            format!("Found and muted {muted_count} profanity instances.")
        };

        info!(
            muted_count,
            detected_words = candidates.len(),
            artifact = %artifact_id,
            "run finished"
        );

        Ok(PipelineReport {
            run_id: run_id.to_owned(),
            muted_count,
            detected_words: candidates.len(),
            intervals,
            output_artifact_id: artifact_id,
            output_path: final_path,
            message,
        })
    }

    /// Locate a finalized artifact by id.
    ///
    /// Ids are bare file names inside the output directory; anything that could escape it is
    /// treated as unknown.
    pub fn resolve_artifact(&self, artifact_id: &str) -> Result<PathBuf> {
        let not_found = || Error::ArtifactNotFound(artifact_id.to_owned());

        let is_plain_name = !artifact_id.is_empty()
            && artifact_id != "."
            && !artifact_id.contains("..")
            && !artifact_id.contains(['/', '\\']);
        if !is_plain_name {
            return Err(not_found());
        }

        let path = self.config.output_dir.join(artifact_id);
        if path.is_file() { Ok(path) } else { Err(not_found()) }
    }
}

/// Tracks the last completed stage and logs transitions.
struct Progress {
    stage: Stage,
}

impl Progress {
    fn new() -> Self {
        Self {
            stage: Stage::Uploaded,
        }
    }

    fn advance(&mut self, next: Stage) {
        self.stage = next;
        info!(stage = %next, "stage complete");
    }
}

/// Per-run scratch directory, removed when dropped unless asked to keep it.
///
/// Dropping happens on every exit path of a run, so failed runs clean up too.
struct Scratch {
    path: PathBuf,
    dir: Option<TempDir>,
    keep: bool,
}

impl Scratch {
    fn create(work_dir: &Path, run_id: &str, keep: bool) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("run_{run_id}_"))
            .tempdir_in(work_dir)
            .map_err(|err| {
                Error::msg(format!(
                    "failed to create scratch directory in '{}': {err}",
                    work_dir.display()
                ))
            })?;

        Ok(Self {
            path: dir.path().to_path_buf(),
            dir: Some(dir),
            keep,
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        if self.keep {
            let kept = dir.keep();
            info!(path = %kept.display(), "kept intermediate artifacts");
        } else if let Err(err) = dir.close() {
            warn!(path = %self.path.display(), error = %err, "failed to remove scratch directory");
        }
    }
}

/// Create `dir`; failure is a request-level error that names the path.
fn prepare_dir(dir: &Path, what: &str) -> Result<()> {
    fs::create_dir_all(dir).map_err(|err| {
        Error::msg(format!("failed to create {what} '{}': {err}", dir.display()))
    })
}

/// Rename, falling back to copy + delete when the paths are on different filesystems.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if let Err(err) = fs::rename(from, to) {
        debug!(
            from = %from.display(),
            to = %to.display(),
            error = %err,
            "rename failed, falling back to copy + delete"
        );
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(())
}
