//! Speakback — a desktop capture / transcribe / speak loop.
//!
//! The app records (or accepts an uploaded) audio clip, sends it to a
//! cloud recognizer, shows the transcript, and can speak any text back
//! through a cloud synthesizer and the local output device.
//!
//! # Module map
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`lang`] | closed set of synthesis languages and code normalization |
//! | [`audio`] | frames, WAV encoding, the streaming-source seam, cpal mic |
//! | [`normalize`] | container decoding to canonical mono PCM (symphonia) |
//! | [`scratch`] | scoped temp files for the recognizer hand-off |
//! | [`transcribe`] | recognition seam + HTTP implementation |
//! | [`synth`] | synthesis seam + HTTP implementation |
//! | [`capture`] | per-attempt state machine and the capture session |
//! | [`feedback`] | the single synthesis-text slot and its copy gate |
//! | [`playback`] | rodio playback on a dedicated thread |
//! | [`workflow`] | command-driven runner tying the above together |
//! | [`config`] | settings persistence and platform paths |
//! | [`app`] | the egui window |

pub mod app;
pub mod audio;
pub mod capture;
pub mod config;
pub mod feedback;
pub mod lang;
pub mod normalize;
pub mod playback;
pub mod scratch;
pub mod synth;
pub mod transcribe;
pub mod workflow;
