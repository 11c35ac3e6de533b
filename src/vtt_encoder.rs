use std::io::Write;

use crate::Result;
use crate::interval_encoder::IntervalEncoder;
use crate::merge::MergedInterval;

/// An `IntervalEncoder` that writes one WebVTT cue per muted interval.
///
/// Players can load the result as a text track to show where audio was silenced. Cue text is
/// `[muted] <label>`.
pub struct VttEncoder<W: Write> {
    w: W,

    /// Whether the `WEBVTT` header has been written.
    started: bool,

    closed: bool,

    /// 1-based cue identifier for the next interval.
    next_cue: usize,
}

impl<W: Write> VttEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            closed: false,
            next_cue: 1,
        }
    }

    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            // WebVTT files begin with a mandatory header line followed by a blank line.
            self.w.write_all(b"WEBVTT\n\n")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> IntervalEncoder for VttEncoder<W> {
    fn write_interval(&mut self, interval: &MergedInterval) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write interval: encoder is already closed",
            ));
        }

        self.start_if_needed()?;

        let start = format_timestamp_vtt(interval.start_seconds);
        let end = format_timestamp_vtt(interval.end_seconds);

        writeln!(&mut self.w, "mute-{}", self.next_cue)?;
        writeln!(&mut self.w, "{start} --> {end}")?;
        // A blank line would terminate the cue early.
        writeln!(&mut self.w, "[muted] {}", interval.label.replace('\n', " "))?;
        writeln!(&mut self.w)?;

        self.next_cue += 1;
        Ok(())
    }

    /// Always leaves a valid WebVTT file behind, even when nothing was muted.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

/// Format seconds into a WebVTT timestamp (`HH:MM:SS.mmm`), rounded to the nearest
/// millisecond.
fn format_timestamp_vtt(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(start: f64, end: f64, label: &str) -> MergedInterval {
        MergedInterval {
            start_seconds: start,
            end_seconds: end,
            label: label.to_owned(),
        }
    }

    #[test]
    fn close_without_intervals_emits_bare_header() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "WEBVTT\n\n");
        Ok(())
    }

    #[test]
    fn writes_numbered_cues() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);

        enc.write_interval(&interval(4.75, 5.95, "shit + damn"))?;
        enc.write_interval(&interval(3661.2, 3662.0, "hell"))?;
        enc.close()?;

        let s = std::str::from_utf8(&out)?;
        assert!(s.starts_with("WEBVTT\n\n"));
        assert!(s.contains("mute-1\n00:00:04.750 --> 00:00:05.950\n[muted] shit + damn\n\n"));
        assert!(s.contains("mute-2\n01:01:01.200 --> 01:01:02.000\n[muted] hell\n\n"));
        assert_eq!(s.matches("WEBVTT").count(), 1);
        Ok(())
    }

    #[test]
    fn format_timestamp_rounds_to_nearest_millisecond() {
        assert_eq!(format_timestamp_vtt(0.0004), "00:00:00.000");
        assert_eq!(format_timestamp_vtt(1.9996), "00:00:02.000");
        assert_eq!(format_timestamp_vtt(-0.5), "00:00:00.000");
    }

    #[test]
    fn write_after_close_errors() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.close()?;
        let err = enc.write_interval(&interval(0.0, 1.0, "nope")).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
