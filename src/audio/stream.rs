//! Streaming-source abstraction for live audio capture.
//!
//! A [`StreamSource`] either opens successfully — yielding a
//! [`StreamHandle`] that is polled for [`AudioFrame`]s — or fails with a
//! typed [`StreamInitError`].  Initialization failure is data, not a
//! panic: the capture session maps it to a device-unavailable attempt and
//! the upload path stays usable.
//!
//! The production implementation is [`MicSource`](crate::audio::MicSource)
//! (cpal).  Tests substitute scripted sources that need no hardware.

use std::time::Duration;

use thiserror::Error;

use crate::audio::frame::AudioFrame;

// ---------------------------------------------------------------------------
// StreamInitError
// ---------------------------------------------------------------------------

/// Why a streaming source failed to open.
///
/// All variants are recoverable from the session's point of view: the
/// attempt terminates as device-unavailable and a new attempt may use the
/// upload path instead.
#[derive(Debug, Error)]
pub enum StreamInitError {
    /// No input device is present on the default audio host.
    #[error("no input device found on the default audio host")]
    NoDevice,

    /// The device refused to report a default stream configuration.
    #[error("failed to query default input config: {0}")]
    DefaultConfig(String),

    /// The platform rejected the stream configuration.
    #[error("failed to build input stream: {0}")]
    BuildStream(String),

    /// The stream was built but could not be started.
    #[error("failed to start audio stream: {0}")]
    PlayStream(String),
}

// ---------------------------------------------------------------------------
// StreamSource / StreamHandle
// ---------------------------------------------------------------------------

/// A source of live audio streams.
///
/// `Send + Sync` so a source can be handed to the blocking capture task;
/// the handle it opens is used entirely on that task's thread and carries
/// no `Send` bound (cpal streams are not `Send` on every platform).
pub trait StreamSource: Send + Sync {
    /// Open the stream, or report why it cannot be opened.
    fn open(&self) -> Result<Box<dyn StreamHandle>, StreamInitError>;
}

/// An open, live audio stream.
pub trait StreamHandle {
    /// Wait up to `timeout` for frames and return everything that has
    /// arrived, in arrival order.  An empty vector means the timeout
    /// elapsed without audio.
    fn poll(&mut self, timeout: Duration) -> Vec<AudioFrame>;

    /// Whether the underlying stream is still delivering audio.
    fn is_active(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
