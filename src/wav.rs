use std::io::{Read, Seek};
use std::path::Path;

use anyhow::{Context, Result, ensure};
use hound::{WavReader, WavSpec};

use crate::ffmpeg::EXTRACT_SAMPLE_RATE;

/// Load WAV audio from a reader and return normalized audio samples.
///
/// What we return:
/// - A `Vec<f32>` containing mono audio samples normalized to `[-1.0, 1.0]`
/// - The associated `WavSpec` so callers still have access to metadata
///
/// Format requirements (what the extraction step produces):
/// - Mono (1 channel)
/// - 16 kHz
/// - 16-bit integer PCM
pub fn get_samples_from_wav_reader<R>(reader: R) -> Result<(Vec<f32>, WavSpec)>
where
    R: Read + Seek,
{
    let reader = WavReader::new(reader).context("failed to read WAV data from reader")?;
    let spec = reader.spec();

    ensure!(
        spec.channels == 1,
        "expected mono WAV (1 channel), got {} channels",
        spec.channels
    );
    ensure!(
        spec.sample_rate == EXTRACT_SAMPLE_RATE,
        "expected {} Hz sample rate, got {} Hz",
        EXTRACT_SAMPLE_RATE,
        spec.sample_rate
    );
    ensure!(
        spec.sample_format == hound::SampleFormat::Int && spec.bits_per_sample == 16,
        "expected 16-bit integer PCM, got {} bits ({:?})",
        spec.bits_per_sample,
        spec.sample_format
    );

    // Whisper expects f32 in [-1.0, 1.0].
    let samples = reader
        .into_samples::<i16>()
        .map(|s| s.map(|pcm| pcm as f32 / i16::MAX as f32))
        .collect::<std::result::Result<Vec<f32>, _>>()
        .context("failed to decode WAV samples")?;

    Ok((samples, spec))
}

/// Open a WAV file and load it with [`get_samples_from_wav_reader`].
pub fn get_samples_from_wav_path(path: &Path) -> Result<(Vec<f32>, WavSpec)> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open WAV file '{}'", path.display()))?;
    get_samples_from_wav_reader(std::io::BufReader::new(file))
}

/// Duration of a WAV file in seconds, read from its header.
pub fn wav_duration_seconds(path: &Path) -> Result<f64> {
    let reader = WavReader::open(path)
        .with_context(|| format!("failed to open WAV file '{}'", path.display()))?;
    let spec = reader.spec();
    ensure!(spec.sample_rate > 0, "WAV header reports a zero sample rate");

    Ok(f64::from(reader.duration()) / f64::from(spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavWriter};
    use std::io::Cursor;

    fn wav_bytes(channels: u16, sample_rate: u32, frames: usize) -> anyhow::Result<Vec<u8>> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec)?;
            for i in 0..frames * channels as usize {
                writer.write_sample(if i % 2 == 0 { i16::MAX } else { 0 })?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }

    #[test]
    fn reads_normalized_mono_samples() -> anyhow::Result<()> {
        let bytes = wav_bytes(1, EXTRACT_SAMPLE_RATE, 4)?;
        let (samples, spec) = get_samples_from_wav_reader(Cursor::new(bytes))?;

        assert_eq!(spec.channels, 1);
        assert_eq!(samples, vec![1.0, 0.0, 1.0, 0.0]);
        Ok(())
    }

    #[test]
    fn rejects_stereo() -> anyhow::Result<()> {
        let bytes = wav_bytes(2, EXTRACT_SAMPLE_RATE, 4)?;
        let err = get_samples_from_wav_reader(Cursor::new(bytes)).unwrap_err();
        assert!(err.to_string().contains("expected mono"));
        Ok(())
    }

    #[test]
    fn rejects_other_sample_rates() -> anyhow::Result<()> {
        let bytes = wav_bytes(1, 44_100, 4)?;
        let err = get_samples_from_wav_reader(Cursor::new(bytes)).unwrap_err();
        assert!(err.to_string().contains("44100 Hz"));
        Ok(())
    }

    #[test]
    fn duration_comes_from_the_header() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("audio.wav");
        std::fs::write(&path, wav_bytes(1, EXTRACT_SAMPLE_RATE, 24_000)?)?;

        let duration = wav_duration_seconds(&path)?;
        assert!((duration - 1.5).abs() < 1e-9);
        Ok(())
    }
}
