use crate::Result;
use crate::merge::MergedInterval;

/// Streams merged mute intervals into an audit format.
///
/// Callers write every interval in order, then call `close` exactly once they are done.
/// `close` must be idempotent.
pub trait IntervalEncoder {
    fn write_interval(&mut self, interval: &MergedInterval) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// Write all `intervals` and close the encoder.
pub fn encode_all(encoder: &mut dyn IntervalEncoder, intervals: &[MergedInterval]) -> Result<()> {
    for interval in intervals {
        encoder.write_interval(interval)?;
    }
    encoder.close()
}
