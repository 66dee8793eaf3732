//! WAV encoding for the canonical mono PCM container.
//!
//! Everything downstream of capture (the recognizer hand-off, the saved
//! preview file) works with a single-channel 32-bit float WAV.  This module
//! produces that container from raw samples via `hound`.

use std::io::Cursor;

use thiserror::Error;

// ---------------------------------------------------------------------------
// WavError
// ---------------------------------------------------------------------------

/// Errors produced while writing the WAV container.
#[derive(Debug, Error)]
pub enum WavError {
    #[error("cannot encode WAV with a sample rate of 0 Hz")]
    ZeroSampleRate,

    #[error("WAV write failed: {0}")]
    Write(#[from] hound::Error),
}

// ---------------------------------------------------------------------------
// encode_mono_wav
// ---------------------------------------------------------------------------

/// Encode mono f32 PCM samples as an in-memory WAV file.
///
/// # Example
///
/// ```
/// use speakback::audio::encode_mono_wav;
///
/// let wav = encode_mono_wav(&[0.0_f32; 160], 16_000).unwrap();
/// assert_eq!(&wav[0..4], b"RIFF");
/// assert_eq!(&wav[8..12], b"WAVE");
/// ```
pub fn encode_mono_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, WavError> {
    if sample_rate == 0 {
        return Err(WavError::ZeroSampleRate);
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_riff_wave_header() {
        let wav = encode_mono_wav(&[0.1_f32, -0.1], 44_100).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
    }

    #[test]
    fn empty_samples_still_produce_valid_container() {
        let wav = encode_mono_wav(&[], 16_000).unwrap();
        assert!(wav.len() >= 44, "header-only WAV expected, got {} bytes", wav.len());
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let err = encode_mono_wav(&[0.0_f32], 0).unwrap_err();
        assert!(matches!(err, WavError::ZeroSampleRate));
    }

    #[test]
    fn round_trips_through_hound_reader() {
        let samples = vec![0.25_f32, -0.25, 0.5, -0.5];
        let wav = encode_mono_wav(&samples, 16_000).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 16_000);

        let decoded: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }
}
