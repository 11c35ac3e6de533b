//! Coalesce padded candidates into disjoint mute intervals with a pure left-to-right fold.

use serde::{Deserialize, Serialize};

use crate::detector::Candidate;

/// Candidates starting within this many seconds of the open interval's end are folded into it.
pub const MERGE_GAP_SECONDS: f64 = 0.2;

/// A finalized, disjoint time range to mute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedInterval {
    pub start_seconds: f64,
    pub end_seconds: f64,

    /// Source texts of every constituent candidate, joined with `" + "`.
    pub label: String,
}

impl MergedInterval {
    fn from_candidate(c: &Candidate) -> Self {
        Self {
            start_seconds: c.start_seconds,
            end_seconds: c.end_seconds,
            label: c.source_text.clone(),
        }
    }

    /// Whether `candidate` is close enough to be absorbed into this interval.
    fn absorbs(&self, candidate: &Candidate) -> bool {
        candidate.start_seconds <= self.end_seconds + MERGE_GAP_SECONDS
    }

    fn extended_by(&self, candidate: &Candidate) -> Self {
        Self {
            start_seconds: self.start_seconds,
            end_seconds: self.end_seconds.max(candidate.end_seconds),
            label: format!("{} + {}", self.label, candidate.source_text),
        }
    }

    /// True when `[start, end]` lies entirely inside this interval.
    pub fn contains_range(&self, start: f64, end: f64) -> bool {
        self.start_seconds <= start && end <= self.end_seconds
    }
}

/// Coalesce candidates into the minimal ordered set of disjoint intervals.
///
/// Candidates are stably sorted by start time, then swept left to right: each one either
/// extends the last interval (when it starts within [`MERGE_GAP_SECONDS`] of its end) or opens
/// a new one. In the result, every interval starts more than `MERGE_GAP_SECONDS` after the
/// previous one ends.
pub fn merge(candidates: &[Candidate]) -> Vec<MergedInterval> {
    let mut sorted: Vec<&Candidate> = candidates.iter().collect();
    sorted.sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));

    sorted
        .into_iter()
        .fold(Vec::with_capacity(candidates.len()), |mut merged, c| {
            match merged.last() {
                Some(open) if open.absorbs(c) => {
                    let extended = open.extended_by(c);
                    let last = merged.len() - 1;
                    merged[last] = extended;
                }
                _ => merged.push(MergedInterval::from_candidate(c)),
            }
            merged
        })
}

/// Keep intervals inside `[0, duration_seconds]`.
///
/// Ends past the media duration are clipped; intervals that start at or after it are dropped,
/// since they would be empty once clipped. Padding can push the last word's interval past the
/// end of the audio, which is what this guards.
pub fn clamp_to_duration(
    intervals: Vec<MergedInterval>,
    duration_seconds: f64,
) -> Vec<MergedInterval> {
    intervals
        .into_iter()
        .filter(|i| i.start_seconds < duration_seconds)
        .map(|mut i| {
            i.start_seconds = i.start_seconds.max(0.0);
            i.end_seconds = i.end_seconds.min(duration_seconds);
            i
        })
        .collect()
}
