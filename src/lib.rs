//! `hush` mutes spoken profanity in video files.
//!
//! Given a video, the crate extracts its audio, transcribes it with word-level timestamps,
//! matches words against a categorized lexicon, merges the hits into mute intervals, and asks
//! ffmpeg to silence exactly those intervals while copying the video stream untouched.
//!
//! This crate provides:
//! - The [`Pipeline`] orchestrator and its report
//! - Pure detection, merging, and filter-expression building
//! - Collaborator traits ([`Transcriber`], [`MediaTool`]) with Whisper and ffmpeg backends
//! - Audit encoders (JSON, VTT) for the muted intervals
//!
//! Everything is blocking; callers that need concurrency run independent pipelines on
//! separate threads.

mod error;
pub use error::{Error, ProcessFailure, Result};

// High-level API (most consumers should start here).
pub mod opts;
pub mod pipeline;
pub mod settings;

// Vocabulary and transcript model.
pub mod lexicon;
pub mod normalize;
pub mod token;
pub mod transcript;

// Pure stages.
pub mod detector;
pub mod filter;
pub mod merge;

// Collaborators and their backends.
pub mod backends;
pub mod ffmpeg;
pub mod media;
pub mod model;
pub mod transcriber;
pub mod wav;

// Output selection and audit encoders.
pub mod interval_encoder;
pub mod json_array_encoder;
pub mod output_type;
pub mod vtt_encoder;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub use backends::json::JsonTranscriber;
#[cfg(feature = "whisper")]
pub use backends::whisper::WhisperTranscriber;
pub use ffmpeg::Ffmpeg;
pub use lexicon::Lexicon;
pub use media::{ExtractedAudio, MediaTool};
pub use pipeline::{Pipeline, PipelineConfig, PipelineReport, Stage};
pub use settings::FilterSettings;
pub use transcriber::Transcriber;
pub use transcript::{Transcript, TranscriptSegment, TranscriptWord};
