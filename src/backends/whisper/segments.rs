use anyhow::{Context, Result};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperSegment, WhisperState};

use crate::opts::TranscribeOpts;
use crate::token::{centiseconds_to_seconds, words_from_tokens};
use crate::transcript::{Transcript, TranscriptSegment};

use super::token::tokens_from_segment;

/// Run whisper over a full 16 kHz mono buffer and collect word-timed segments.
pub(super) fn transcribe_samples(
    ctx: &WhisperContext,
    opts: &TranscribeOpts,
    samples: &[f32],
) -> Result<Transcript> {
    let state = run_whisper_full(ctx, opts, samples)?;

    let mut segments = Vec::new();
    for whisper_segment in state.as_iter() {
        segments.push(to_segment(whisper_segment)?);
    }

    Ok(Transcript::new(segments))
}

fn to_segment(segment: WhisperSegment) -> Result<TranscriptSegment> {
    let text = segment
        .to_str()
        .context("failed to get segment text")?
        .trim()
        .to_owned();

    let tokens = tokens_from_segment(&segment)?;
    let words = words_from_tokens(&tokens);

    Ok(TranscriptSegment {
        start_seconds: f64::from(centiseconds_to_seconds(segment.start_timestamp())),
        end_seconds: f64::from(centiseconds_to_seconds(segment.end_timestamp())),
        text,
        words,
    })
}

fn build_full_params(opts: &TranscribeOpts) -> FullParams<'_, '_> {
    let mut params = FullParams::new(SamplingStrategy::BeamSearch {
        beam_size: 5,
        patience: 1.0,
    });

    params.set_n_threads(num_cpus::get() as i32);
    params.set_translate(opts.enable_translate_to_english);
    params.set_language(opts.language.as_deref());
    params.set_no_context(true);
    params.set_single_segment(false);

    params.set_print_progress(false);
    params.set_print_special(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    // Word boundaries come from token timing; without it every word would carry its segment's
    // bounds and mutes would swallow whole sentences.
    params.set_token_timestamps(true);

    params
}

fn run_whisper_full(
    ctx: &WhisperContext,
    opts: &TranscribeOpts,
    samples: &[f32],
) -> Result<WhisperState> {
    let params = build_full_params(opts);

    let mut state = ctx
        .create_state()
        .context("failed to create whisper state")?;

    state
        .full(params, samples)
        .context("failed to run whisper full()")?;

    Ok(state)
}
