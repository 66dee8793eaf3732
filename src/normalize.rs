//! Audio normalization — arbitrary container/codec bytes to canonical
//! mono PCM.
//!
//! [`AudioNormalizer`] is the seam the capture session talks to.  The
//! production implementation, [`SymphoniaNormalizer`], probes the byte
//! stream with `symphonia` (the upload hint is advisory — probing decides),
//! decodes every packet, and downmixes to mono.  The sample rate of the
//! decoded stream is preserved; resampling is left to the recognizer,
//! which accepts the rate as a parameter.
//!
//! [`MockNormalizer`] (test-only) returns a pre-configured response, in
//! the same spirit as the other collaborator mocks.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as ProbeError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use crate::audio::downmix_to_mono;

// ---------------------------------------------------------------------------
// ContainerHint
// ---------------------------------------------------------------------------

/// Allow-listed upload container hints.
///
/// The hint only steers format probing; actual parsing may still reject
/// the bytes regardless of what the uploader claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerHint {
    Wav,
    Mp3,
    M4a,
    Webm,
    Ogg,
}

impl ContainerHint {
    /// Every accepted hint, in UI display order.
    pub const ALL: [ContainerHint; 5] = [
        ContainerHint::Wav,
        ContainerHint::Mp3,
        ContainerHint::M4a,
        ContainerHint::Webm,
        ContainerHint::Ogg,
    ];

    /// The file extension this hint corresponds to.
    pub fn extension(self) -> &'static str {
        match self {
            ContainerHint::Wav => "wav",
            ContainerHint::Mp3 => "mp3",
            ContainerHint::M4a => "m4a",
            ContainerHint::Webm => "webm",
            ContainerHint::Ogg => "ogg",
        }
    }

    /// Parse a file extension (case-insensitive).  Returns `None` for
    /// anything outside the allow-list.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|h| h.extension() == ext)
    }
}

impl std::fmt::Display for ContainerHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

// ---------------------------------------------------------------------------
// PcmAudio
// ---------------------------------------------------------------------------

/// Canonical decoded audio: mono f32 PCM at a known sample rate.
#[derive(Debug, Clone)]
pub struct PcmAudio {
    /// Mono samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl PcmAudio {
    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

// ---------------------------------------------------------------------------
// NormalizeError
// ---------------------------------------------------------------------------

/// Why normalization rejected the input bytes.
#[derive(Debug, Clone, Error)]
pub enum NormalizeError {
    /// The container/codec is not one the normalizer can parse.
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// The bytes claim a parsable container but are damaged or contain no
    /// decodable audio.
    #[error("corrupt audio input: {0}")]
    CorruptInput(String),
}

// ---------------------------------------------------------------------------
// AudioNormalizer trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for audio normalization.
///
/// # Contract
///
/// - `raw` holds a complete audio file (any allow-listed container).
/// - `hint` is advisory; implementations may ignore it or reject the
///   bytes despite it.
/// - On success the result is mono PCM at the source's sample rate.
pub trait AudioNormalizer: Send + Sync {
    fn normalize(
        &self,
        raw: &[u8],
        hint: Option<ContainerHint>,
    ) -> Result<PcmAudio, NormalizeError>;
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AudioNormalizer>) {}
};

// ---------------------------------------------------------------------------
// SymphoniaNormalizer
// ---------------------------------------------------------------------------

/// Production normalizer built on `symphonia`.
#[derive(Debug, Default)]
pub struct SymphoniaNormalizer;

impl SymphoniaNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl AudioNormalizer for SymphoniaNormalizer {
    fn normalize(
        &self,
        raw: &[u8],
        hint: Option<ContainerHint>,
    ) -> Result<PcmAudio, NormalizeError> {
        if raw.is_empty() {
            return Err(NormalizeError::CorruptInput("empty input".into()));
        }

        let mss = MediaSourceStream::new(
            Box::new(Cursor::new(raw.to_vec())),
            Default::default(),
        );

        let mut probe_hint = Hint::new();
        if let Some(h) = hint {
            probe_hint.with_extension(h.extension());
        }

        let probed = symphonia::default::get_probe()
            .format(
                &probe_hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| match e {
                ProbeError::Unsupported(what) => {
                    NormalizeError::UnsupportedFormat(what.to_string())
                }
                other => NormalizeError::CorruptInput(other.to_string()),
            })?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| {
                NormalizeError::UnsupportedFormat("no decodable audio track".into())
            })?;
        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| NormalizeError::UnsupportedFormat(e.to_string()))?;

        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                // End of stream.
                Err(ProbeError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break
                }
                Err(ProbeError::ResetRequired) => break,
                Err(e) => return Err(NormalizeError::CorruptInput(e.to_string())),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    sample_rate = spec.rate;
                    let channels = spec.channels.count() as u16;

                    let mut buf =
                        SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buf.copy_interleaved_ref(decoded);
                    samples.extend(downmix_to_mono(buf.samples(), channels));
                }
                // A damaged packet is skipped; the stream may still yield
                // usable audio afterwards.
                Err(ProbeError::DecodeError(e)) => {
                    log::warn!("skipping undecodable packet: {e}");
                }
                Err(e) => return Err(NormalizeError::CorruptInput(e.to_string())),
            }
        }

        if samples.is_empty() || sample_rate == 0 {
            return Err(NormalizeError::CorruptInput(
                "no audio samples decoded".into(),
            ));
        }

        Ok(PcmAudio {
            samples,
            sample_rate,
        })
    }
}

// ---------------------------------------------------------------------------
// MockNormalizer  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response and records
/// whether it was called.
#[cfg(test)]
pub struct MockNormalizer {
    response: Result<PcmAudio, NormalizeError>,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockNormalizer {
    /// Mock that always succeeds with one second of silence at 16 kHz.
    pub fn ok_silence() -> Self {
        Self {
            response: Ok(PcmAudio {
                samples: vec![0.0; 16_000],
                sample_rate: 16_000,
            }),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Mock that always returns `Err(error)`.
    pub fn err(error: NormalizeError) -> Self {
        Self {
            response: Err(error),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl AudioNormalizer for MockNormalizer {
    fn normalize(
        &self,
        _raw: &[u8],
        _hint: Option<ContainerHint>,
    ) -> Result<PcmAudio, NormalizeError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
