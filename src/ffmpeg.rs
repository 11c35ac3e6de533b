//! ffmpeg command builder and blocking runner.
//!
//! Two invocations matter to the pipeline:
//! - audio extraction: `-vn -acodec pcm_s16le -ar 16000 -ac 1` into a WAV for the transcriber
//! - muting: `-af <gate expression> -c:v copy -c:a aac -avoid_negative_ts make_zero`
//!
//! The video stream is always copied bit-exact; only audio is re-encoded, because a gating
//! filter forces it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::ProcessFailure;
use crate::media::{ExtractedAudio, MediaTool};
use crate::wav::wav_duration_seconds;
use crate::{Error, Result};

/// Sample rate the transcriber expects.
pub const EXTRACT_SAMPLE_RATE: u32 = 16_000;

/// Builder for ffmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            log_level: "error".to_string(),
        }
    }

    /// Add an output argument (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Drop the video stream.
    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    /// Set audio filter.
    pub fn audio_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-af").output_arg(filter)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    pub fn audio_sample_rate(self, hz: u32) -> Self {
        self.output_arg("-ar").output_arg(hz.to_string())
    }

    pub fn audio_channels(self, channels: u16) -> Self {
        self.output_arg("-ac").output_arg(channels.to_string())
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    ///
    /// Paths are passed through as `OsString`s so non-UTF-8 file names survive.
    pub fn build_args(&self) -> Vec<OsString> {
        // Output paths are unique per run.
        let mut args: Vec<OsString> = vec!["-y".into()];

        args.push("-hide_banner".into());
        args.push("-nostdin".into());
        args.push("-v".into());
        args.push(self.log_level.clone().into());

        args.push("-i".into());
        args.push(self.input.clone().into_os_string());

        args.extend(self.output_args.iter().map(OsString::from));

        args.push(self.output.clone().into_os_string());

        args
    }
}

/// Command that converts `video`'s audio into 16 kHz mono 16-bit PCM.
pub fn extract_audio_command(video: &Path, audio_out: &Path) -> FfmpegCommand {
    FfmpegCommand::new(video, audio_out)
        .no_video()
        .output_args(["-acodec", "pcm_s16le"])
        .audio_sample_rate(EXTRACT_SAMPLE_RATE)
        .audio_channels(1)
}

/// Command that copies video and re-encodes audio through `filter_expr`.
pub fn mute_command(video: &Path, filter_expr: &str, out: &Path) -> FfmpegCommand {
    FfmpegCommand::new(video, out)
        .audio_filter(filter_expr)
        .video_codec("copy")
        .audio_codec("aac")
        .output_args(["-avoid_negative_ts", "make_zero"])
}

/// [`MediaTool`] backed by the `ffmpeg` executable.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: OsString,

    /// Value for ffmpeg's `-v`; only this much ends up in captured stderr.
    log_level: String,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new()
    }
}

impl Ffmpeg {
    /// Use `ffmpeg` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    /// Use a specific executable (name looked up on `PATH`, or a path).
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            log_level: "error".to_owned(),
        }
    }

    /// Override ffmpeg's `-v` level (`error` by default).
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// [`extract_audio_command`] at this runner's log level.
    pub fn extract_command(&self, video: &Path, audio_out: &Path) -> FfmpegCommand {
        extract_audio_command(video, audio_out).log_level(self.log_level.as_str())
    }

    /// [`mute_command`] at this runner's log level.
    pub fn mute_command(&self, video: &Path, filter_expr: &str, out: &Path) -> FfmpegCommand {
        mute_command(video, filter_expr, out).log_level(self.log_level.as_str())
    }

    /// Resolve the executable, failing early with a clear message if it is missing.
    pub fn locate(&self) -> std::result::Result<PathBuf, ProcessFailure> {
        which::which(&self.program).map_err(|err| {
            ProcessFailure::new(format!(
                "{} not found: {err}",
                self.program.to_string_lossy()
            ))
        })
    }

    /// Run a command to completion, capturing stderr for diagnostics.
    pub fn run(&self, cmd: &FfmpegCommand) -> std::result::Result<(), ProcessFailure> {
        let program = self.locate()?;
        let args = cmd.build_args();
        debug!(
            program = %program.display(),
            args = ?args,
            "running ffmpeg"
        );

        let output = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| {
                ProcessFailure::new(format!("failed to spawn {}: {err}", program.display()))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(ProcessFailure::new("ffmpeg exited unsuccessfully")
            .with_exit_code(output.status.code())
            .with_stderr(stderr))
    }
}

impl MediaTool for Ffmpeg {
    fn extract_audio(&self, video: &Path, audio_out: &Path) -> Result<ExtractedAudio> {
        self.run(&self.extract_command(video, audio_out))
            .map_err(Error::Extraction)?;

        let duration_seconds = wav_duration_seconds(audio_out).map_err(|err| {
            Error::Extraction(ProcessFailure::new(format!(
                "extracted audio is unreadable: {err:#}"
            )))
        })?;

        info!(
            path = %audio_out.display(),
            duration_seconds,
            "extracted audio"
        );

        Ok(ExtractedAudio {
            path: audio_out.to_path_buf(),
            duration_seconds,
        })
    }

    fn transcode(&self, video: &Path, filter_expr: &str, out: &Path) -> Result<()> {
        self.run(&self.mute_command(video, filter_expr, out))
            .map_err(Error::Transcode)?;
        info!(path = %out.display(), "transcoded muted output");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn extract_command_targets_mono_16k_pcm() {
        let args = strings(
            &extract_audio_command(Path::new("in.mp4"), Path::new("audio.wav")).build_args(),
        );

        assert_eq!(
            args,
            vec![
                "-y", "-hide_banner", "-nostdin", "-v", "error", "-i", "in.mp4", "-vn",
                "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1", "audio.wav",
            ]
        );
    }

    #[test]
    fn mute_command_copies_video_and_reencodes_audio() {
        let expr = "volume=0:enable='between(t,4.750,5.550)'";
        let args =
            strings(&mute_command(Path::new("in.mp4"), expr, Path::new("out.mp4")).build_args());

        let af = args.iter().position(|a| a == "-af").expect("missing -af");
        assert_eq!(args[af + 1], expr);

        let cv = args.iter().position(|a| a == "-c:v").expect("missing -c:v");
        assert_eq!(args[cv + 1], "copy");

        let ca = args.iter().position(|a| a == "-c:a").expect("missing -c:a");
        assert_eq!(args[ca + 1], "aac");

        assert!(args.windows(2).any(|w| w == ["-avoid_negative_ts", "make_zero"]));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn log_level_is_passed_before_the_input() {
        let args = strings(
            &Ffmpeg::new()
                .with_log_level("warning")
                .extract_command(Path::new("a.mp4"), Path::new("b.wav"))
                .build_args(),
        );

        let v = args.iter().position(|a| a == "-v").expect("missing -v");
        let i = args.iter().position(|a| a == "-i").expect("missing -i");
        assert_eq!(args[v + 1], "warning");
        assert!(v < i);
    }

    #[test]
    fn default_log_level_is_error() {
        let expr = "volume=0:enable='between(t,1.000,2.000)'";
        let args = strings(
            &Ffmpeg::new()
                .mute_command(Path::new("a.mp4"), expr, Path::new("b.mp4"))
                .build_args(),
        );
        assert!(args.windows(2).any(|w| w == ["-v", "error"]));
    }

    #[test]
    fn missing_binary_is_reported_with_its_name() {
        let ffmpeg = Ffmpeg::with_program("hush-definitely-not-ffmpeg");
        let err = ffmpeg
            .run(&FfmpegCommand::new("a.mp4", "b.mp4"))
            .unwrap_err();
        assert!(err.message.contains("hush-definitely-not-ffmpeg"));
    }

    #[test]
    fn missing_binary_surfaces_as_extraction_failure() {
        let ffmpeg = Ffmpeg::with_program("hush-definitely-not-ffmpeg");
        let err = ffmpeg
            .extract_audio(Path::new("in.mp4"), Path::new("audio.wav"))
            .unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
