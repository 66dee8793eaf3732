//! Audio building blocks — frames, mono downmix, WAV encoding, and the
//! streaming-source abstraction with its cpal implementation.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioFrame (mpsc) → StreamHandle::poll
//!           → downmix_to_mono → concatenate → encode_mono_wav
//! ```

pub mod frame;
pub mod mic;
pub mod stream;
pub mod wav;

pub use frame::{downmix_to_mono, AudioFrame};
pub use mic::{MicHandle, MicSource};
pub use stream::{StreamHandle, StreamInitError, StreamSource};
pub use wav::{encode_mono_wav, WavError};
