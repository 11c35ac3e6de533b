use std::io::Write;

use crate::Result;
use crate::interval_encoder::IntervalEncoder;
use crate::merge::MergedInterval;

/// An `IntervalEncoder` that writes intervals as a single JSON array.
///
/// Example output:
/// ```json
/// [{"start_seconds":4.75,"end_seconds":5.95,"label":"shit + damn"}]
/// ```
pub struct JsonArrayEncoder<W: Write> {
    w: W,

    /// Whether the opening `[` has been written.
    started: bool,

    /// Whether the next element is the first (no leading comma).
    first: bool,

    closed: bool,
}

impl<W: Write> JsonArrayEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            first: true,
            closed: false,
        }
    }

    /// The opening bracket is deferred so an encoder that is never written to still closes
    /// into a valid `[]`.
    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(b"[")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> IntervalEncoder for JsonArrayEncoder<W> {
    fn write_interval(&mut self, interval: &MergedInterval) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write interval: encoder is already closed",
            ));
        }

        self.start_if_needed()?;

        if !self.first {
            self.w.write_all(b",")?;
        }
        self.first = false;

        serde_json::to_writer(&mut self.w, interval)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.write_all(b"]")?;
        self.w.flush()?;

        self.closed = true;
        Ok(())
    }
}
