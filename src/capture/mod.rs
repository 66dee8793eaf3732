//! Capture — acquisition attempts, the per-attempt state machine, and the
//! session that drives audio through normalization and recognition.
//!
//! # Flow
//!
//! ```text
//! stream_capture / accept_upload
//!        │
//!        ▼
//! CaptureAttempt (Idle → Capturing → Captured | Empty | DeviceUnavailable)
//!        │ Captured
//!        ▼
//! CaptureSession::finalize  (Normalizing → Transcribing → Result*)
//!        │
//!        ▼
//! Transcript { text, succeeded, source }
//! ```

pub mod attempt;
pub mod clock;
pub mod session;

pub use attempt::{AttemptState, CaptureAttempt, CaptureSource};
pub use clock::{Clock, SystemClock};
pub use session::{
    CaptureSession, SessionError, Transcript, MAX_CAPTURE, MIN_CAPTURE, POLL_TIMEOUT,
};
