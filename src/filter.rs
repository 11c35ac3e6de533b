//! Translate merged intervals into an ffmpeg audio filter.
//!
//! Each interval becomes a `volume=0` clause gated on the stream timestamp, for example
//! `volume=0:enable='between(t,4.750,5.550)'`. Clauses are chained with `,` into a single
//! `-af` expression. Times are printed with exactly three decimals, which ffmpeg's expression
//! grammar accepts and which never falls back to exponent notation.

use crate::merge::MergedInterval;
use crate::{Error, Result};

/// What the transcoder should do with the audio stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuteFilter {
    /// Nothing to mute; copy the source unchanged.
    PassThrough,

    /// Apply this `-af` expression and re-encode audio.
    Gate(String),
}

impl MuteFilter {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Self::PassThrough)
    }

    /// The filter expression, if any.
    pub fn expression(&self) -> Option<&str> {
        match self {
            Self::PassThrough => None,
            Self::Gate(expr) => Some(expr),
        }
    }
}

/// Build the mute filter for an ordered, disjoint interval set.
///
/// The merger already guarantees the preconditions checked here; a failure means an
/// invariant was broken upstream and surfaces as [`Error::FilterBuild`].
pub fn build_mute_filter(intervals: &[MergedInterval]) -> Result<MuteFilter> {
    if intervals.is_empty() {
        return Ok(MuteFilter::PassThrough);
    }

    let mut clauses = Vec::with_capacity(intervals.len());
    let mut prev_end: Option<f64> = None;

    for (idx, interval) in intervals.iter().enumerate() {
        check_interval(idx, interval)?;

        if let Some(prev_end) = prev_end {
            if interval.start_seconds <= prev_end {
                return Err(Error::FilterBuild(format!(
                    "interval {idx} starts at {:.3}s, not after the previous end {prev_end:.3}s",
                    interval.start_seconds
                )));
            }
        }
        prev_end = Some(interval.end_seconds);

        clauses.push(gate_clause(interval));
    }

    Ok(MuteFilter::Gate(clauses.join(",")))
}

fn check_interval(idx: usize, interval: &MergedInterval) -> Result<()> {
    let (start, end) = (interval.start_seconds, interval.end_seconds);

    if !start.is_finite() || !end.is_finite() {
        return Err(Error::FilterBuild(format!(
            "interval {idx} has non-finite bounds ({start}, {end})"
        )));
    }
    if start < 0.0 {
        return Err(Error::FilterBuild(format!(
            "interval {idx} starts before zero ({start})"
        )));
    }
    if start >= end {
        return Err(Error::FilterBuild(format!(
            "interval {idx} is empty or reversed ({start:.3}s..{end:.3}s)"
        )));
    }

    Ok(())
}

fn gate_clause(interval: &MergedInterval) -> String {
    format!(
        "volume=0:enable='between(t,{:.3},{:.3})'",
        interval.start_seconds, interval.end_seconds
    )
}
