//! Workflow — the command-driven loop that turns UI actions into capture,
//! transcription, and synthesis work.
//!
//! # Architecture
//!
//! ```text
//! WorkflowCommand (mpsc)                WorkflowResult (mpsc)
//!        │                                     ▲
//!        ▼                                     │
//! WorkflowRunner::run()  ← async tokio task ───┘
//!        │
//!        ├─ Speak { text, language }
//!        │     └─ Synthesizer::synthesize → save speech.mp3 → SpeechPlayer
//!        │
//!        ├─ RecordStream { duration_secs }
//!        │     └─ block_in_place(CaptureSession::stream_capture)
//!        │           └─ finalize → Transcript
//!        │
//!        └─ TranscribeFile { path }
//!              └─ read file → CaptureSession::accept_upload
//!                    └─ finalize → Transcript
//! ```
//!
//! The UI sends commands and polls results with `try_recv` every frame; it
//! never blocks on the runner.

pub mod runner;
pub mod state;

use std::path::PathBuf;

use crate::capture::Transcript;
use crate::lang::Language;

// ---------------------------------------------------------------------------
// WorkflowCommand
// ---------------------------------------------------------------------------

/// Actions the UI can request from the runner.
#[derive(Debug, Clone)]
pub enum WorkflowCommand {
    /// Synthesize and play `text` in `language`.
    Speak { text: String, language: Language },

    /// Record from the default input device for `duration_secs` seconds,
    /// then transcribe the recording.
    RecordStream { duration_secs: u32 },

    /// Read an audio file from disk and transcribe it.
    TranscribeFile { path: PathBuf },
}

// ---------------------------------------------------------------------------
// WorkflowResult
// ---------------------------------------------------------------------------

/// Progress and outcome events sent back to the UI.
#[derive(Debug, Clone)]
pub enum WorkflowResult {
    /// Recording has begun and will run for `duration_secs` seconds.
    CaptureStarted { duration_secs: u32 },

    /// Acquisition ended without producing audio to transcribe.
    CaptureFailed { message: String },

    /// Audio was captured; normalization and recognition are running.
    Transcribing,

    /// Recognition finished.  The transcript may carry sentinel text when
    /// `transcript.succeeded` is false.
    TranscriptReady { transcript: Transcript },

    /// Synthesis has begun.
    SynthesisStarted,

    /// Synthesized speech is playing; `saved_to` is where the audio file
    /// was written, when saving succeeded.
    SpeechReady { saved_to: Option<PathBuf> },

    /// A non-fatal problem the user should see (e.g. empty synthesis text).
    Warning { message: String },

    /// The requested action failed.
    Error { message: String },
}

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::WorkflowRunner;
pub use state::WorkflowState;
