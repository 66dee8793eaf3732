//! One acquisition cycle and its state machine.
//!
//! A [`CaptureAttempt`] is created when the user initiates capture and is
//! discarded after it produces a transcript or terminally fails.  The
//! state machine is:
//!
//! ```text
//! Idle ──begin──▶ Capturing ──▶ Captured ──▶ Normalizing ──▶ Transcribing ──▶ ResultOk
//!                     │                          │                │──▶ ResultUnintelligible
//!                     │──▶ Empty                 │──▶ NormalizeFailed
//!                     │──▶ DeviceUnavailable     │                └──▶ ResultServiceError
//! ```
//!
//! `Empty`, `DeviceUnavailable`, `NormalizeFailed` and the three `Result*`
//! states are terminal; a finished attempt is never resumed — a new one
//! starts from `Idle`.

use std::time::Instant;

use crate::normalize::ContainerHint;

// ---------------------------------------------------------------------------
// CaptureSource
// ---------------------------------------------------------------------------

/// How the audio entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    /// Live microphone stream, polled frame by frame.
    Stream,
    /// A complete file supplied by the user.
    Upload,
}

impl std::fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureSource::Stream => f.write_str("stream"),
            CaptureSource::Upload => f.write_str("upload"),
        }
    }
}

// ---------------------------------------------------------------------------
// AttemptState
// ---------------------------------------------------------------------------

/// States of a single capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// Created, nothing has happened yet.
    Idle,
    /// Audio is being acquired (polling frames, or validating an upload).
    Capturing,
    /// Raw bytes are in hand and ready to finalize.
    Captured,
    /// Acquisition finished with zero audio.  Terminal.
    Empty,
    /// The streaming source could not be opened.  Terminal; the upload
    /// path remains usable for the next attempt.
    DeviceUnavailable,
    /// The normalizer is converting the raw bytes.
    Normalizing,
    /// The normalizer rejected the bytes.  Terminal.
    NormalizeFailed,
    /// The recognizer is processing the canonical audio.
    Transcribing,
    /// Recognition produced genuine text.  Terminal.
    ResultOk,
    /// Recognition could not make out speech.  Terminal.
    ResultUnintelligible,
    /// The recognition service failed.  Terminal.
    ResultServiceError,
}

impl AttemptState {
    /// Whether the attempt has finished and may not be resumed.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AttemptState::Empty
                | AttemptState::DeviceUnavailable
                | AttemptState::NormalizeFailed
                | AttemptState::ResultOk
                | AttemptState::ResultUnintelligible
                | AttemptState::ResultServiceError
        )
    }

    /// Whether moving from `self` to `next` is a legal step of the machine.
    pub fn can_transition(self, next: AttemptState) -> bool {
        use AttemptState::*;
        matches!(
            (self, next),
            (Idle, Capturing)
                | (Capturing, Captured)
                | (Capturing, Empty)
                | (Capturing, DeviceUnavailable)
                | (Captured, Normalizing)
                | (Normalizing, NormalizeFailed)
                | (Normalizing, Transcribing)
                | (Transcribing, ResultOk)
                | (Transcribing, ResultUnintelligible)
                | (Transcribing, ResultServiceError)
        )
    }

    /// Short human-readable label for status display.
    pub fn label(self) -> &'static str {
        match self {
            AttemptState::Idle => "Idle",
            AttemptState::Capturing => "Capturing",
            AttemptState::Captured => "Captured",
            AttemptState::Empty => "No audio",
            AttemptState::DeviceUnavailable => "Device unavailable",
            AttemptState::Normalizing => "Converting",
            AttemptState::NormalizeFailed => "Conversion failed",
            AttemptState::Transcribing => "Transcribing",
            AttemptState::ResultOk => "Transcribed",
            AttemptState::ResultUnintelligible => "Unintelligible",
            AttemptState::ResultServiceError => "Service error",
        }
    }
}

// ---------------------------------------------------------------------------
// CaptureAttempt
// ---------------------------------------------------------------------------

/// One acquisition cycle.  Mutated only by the capture session.
#[derive(Debug)]
pub struct CaptureAttempt {
    /// Which path the audio came in through.
    pub source: CaptureSource,
    /// Raw audio bytes (a complete container).  Empty until captured.
    pub raw: Vec<u8>,
    /// Advisory container hint for the normalizer.
    pub hint: Option<ContainerHint>,
    /// When polling started (stream path only).
    pub started_at: Option<Instant>,
    /// When polling finished (stream path only).
    pub ended_at: Option<Instant>,
    state: AttemptState,
}

impl CaptureAttempt {
    /// A fresh attempt in `Idle`.
    pub fn new(source: CaptureSource) -> Self {
        Self {
            source,
            raw: Vec::new(),
            hint: None,
            started_at: None,
            ended_at: None,
            state: AttemptState::Idle,
        }
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Step the machine.  Illegal steps (including any step out of a
    /// terminal state) are a logic error in the session.
    pub(crate) fn transition(&mut self, next: AttemptState) {
        debug_assert!(
            self.state.can_transition(next),
            "illegal attempt transition {:?} -> {next:?}",
            self.state
        );
        self.state = next;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
