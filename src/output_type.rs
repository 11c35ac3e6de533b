/// Formats for the muted-interval audit listing.
///
/// Each variant maps to a concrete [`crate::interval_encoder::IntervalEncoder`]. With the `cli`
/// feature the enum doubles as a `clap` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// A JSON array of `{start_seconds, end_seconds, label}` objects.
    Json,

    /// A WebVTT cue per muted interval, for overlaying on the player.
    Vtt,
}
