//! Raw audio frames and mono downmixing.
//!
//! An [`AudioFrame`] is one buffer of interleaved PCM as delivered by a
//! streaming source.  Frames from a multi-channel device are downmixed to
//! mono by [`downmix_to_mono`] (average across channels) before they are
//! concatenated into a capture attempt.

// ---------------------------------------------------------------------------
// AudioFrame
// ---------------------------------------------------------------------------

/// A single buffer of raw audio from a streaming source.
///
/// Samples are interleaved `f32` in the range `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Interleaved PCM samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate of this frame in Hz (e.g. 44100, 48000, 16000).
    pub sample_rate: u32,
    /// Number of interleaved channels (1 = mono, 2 = stereo, …).
    pub channels: u16,
}

impl AudioFrame {
    /// This frame's samples downmixed to mono.
    ///
    /// Returns the samples unchanged (owned) when the frame is already mono.
    pub fn to_mono(&self) -> Vec<f32> {
        downmix_to_mono(&self.samples, self.channels)
    }
}

// ---------------------------------------------------------------------------
// downmix_to_mono
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging all
/// channels.
///
/// The output length is `samples.len() / channels`.
///
/// * If `channels == 1` the input is returned as an owned `Vec` unchanged.
/// * If `channels == 0` an empty vector is returned.
///
/// # Example
///
/// ```
/// use speakback::audio::downmix_to_mono;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, -0.2]; // L R L R
/// let mono = downmix_to_mono(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[0] - 0.0).abs() < 1e-6);
/// assert!((mono[1] - 0.0).abs() < 1e-6);
/// ```
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_already_mono() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(downmix_to_mono(&input, 1), input);
    }

    #[test]
    fn downmix_two_channel_averages() {
        let input = vec![1.0_f32, -1.0, 0.5, 0.5];
        let out = downmix_to_mono(&input, 2);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn downmix_four_channel() {
        let input = vec![0.4_f32; 4];
        let out = downmix_to_mono(&input, 4);
        assert_eq!(out.len(), 1);
        assert!((out[0] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn downmix_zero_channels_is_empty() {
        assert!(downmix_to_mono(&[1.0_f32, 2.0], 0).is_empty());
    }

    #[test]
    fn frame_to_mono_uses_channel_count() {
        let frame = AudioFrame {
            samples: vec![0.2_f32, 0.4],
            sample_rate: 48_000,
            channels: 2,
        };
        let mono = frame.to_mono();
        assert_eq!(mono.len(), 1);
        assert!((mono[0] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn audio_frame_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<AudioFrame>();
    }
}
