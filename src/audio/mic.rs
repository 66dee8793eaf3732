//! Microphone streaming source built on `cpal`.
//!
//! [`MicSource::open`] wraps the cpal host/device/stream lifecycle and
//! returns a [`MicHandle`] whose [`poll`](crate::audio::StreamHandle::poll)
//! drains frames pushed by the cpal callback over an mpsc channel.  The
//! handle is a RAII guard — dropping it stops the underlying stream.

use std::sync::mpsc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio::frame::AudioFrame;
use crate::audio::stream::{StreamHandle, StreamInitError, StreamSource};

// ---------------------------------------------------------------------------
// MicSource
// ---------------------------------------------------------------------------

/// Streaming source backed by the system default input device.
///
/// Construction is free of side effects; all device interaction happens in
/// [`open`](StreamSource::open) so that a missing or denied microphone is
/// reported as a [`StreamInitError`] at capture time rather than at
/// startup.
#[derive(Debug, Default)]
pub struct MicSource;

impl MicSource {
    pub fn new() -> Self {
        Self
    }
}

impl StreamSource for MicSource {
    fn open(&self) -> Result<Box<dyn StreamHandle>, StreamInitError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(StreamInitError::NoDevice)?;

        let supported = device
            .default_input_config()
            .map_err(|e| StreamInitError::DefaultConfig(e.to_string()))?;

        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        let (tx, rx) = mpsc::channel::<AudioFrame>();

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let frame = AudioFrame {
                        samples: data.to_vec(),
                        sample_rate,
                        channels,
                    };
                    // Ignore send errors; the receiver may have been dropped.
                    let _ = tx.send(frame);
                },
                |err: cpal::StreamError| {
                    log::error!("cpal stream error: {err}");
                },
                None,
            )
            .map_err(|e| StreamInitError::BuildStream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| StreamInitError::PlayStream(e.to_string()))?;

        log::debug!("microphone stream opened ({sample_rate} Hz, {channels} ch)");

        Ok(Box::new(MicHandle {
            _stream: stream,
            rx,
            active: true,
        }))
    }
}

// ---------------------------------------------------------------------------
// MicHandle
// ---------------------------------------------------------------------------

/// Live microphone stream.  Dropping it stops the cpal stream.
pub struct MicHandle {
    _stream: cpal::Stream,
    rx: mpsc::Receiver<AudioFrame>,
    active: bool,
}

impl StreamHandle for MicHandle {
    /// Block up to `timeout` for the first frame, then drain everything
    /// else that is already queued so a slow poll loop cannot fall behind
    /// the audio callback.
    fn poll(&mut self, timeout: Duration) -> Vec<AudioFrame> {
        let mut frames = Vec::new();

        match self.rx.recv_timeout(timeout) {
            Ok(frame) => frames.push(frame),
            Err(mpsc::RecvTimeoutError::Timeout) => return frames,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                self.active = false;
                return frames;
            }
        }

        while let Ok(frame) = self.rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
