//! Workflow phase tracking for the UI.
//!
//! [`WorkflowState`] mirrors what the runner is currently doing so the UI
//! can disable the controls that must not fire while work is in flight.
//! It is deliberately coarser than the per-attempt state machine in
//! [`crate::capture::AttemptState`] — the attempt tracks one recording's
//! life, this tracks what the app as a whole is busy with.

// ---------------------------------------------------------------------------
// WorkflowState
// ---------------------------------------------------------------------------

/// Phases of the capture/transcribe/speak workflow.
///
/// ```text
/// Idle ──record / upload──▶ Capturing ──▶ Transcribing ──▶ Idle
///      ──speak────────────▶ Synthesizing ──▶ Idle
/// any phase ──failure──▶ Error ──next action──▶ (Capturing | Synthesizing)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// Nothing in flight; all controls enabled.
    Idle,

    /// Microphone is being polled or an upload is being read.
    Capturing,

    /// Captured audio is being normalized and sent for recognition.
    Transcribing,

    /// Text is being converted to speech.
    Synthesizing,

    /// The last action failed.  Cleared by starting the next action.
    Error,
}

impl WorkflowState {
    /// Returns `true` while work is in flight.
    ///
    /// The UI uses this to disable the Speak / Record / Transcribe buttons.
    ///
    /// ```
    /// use speakback::workflow::WorkflowState;
    ///
    /// assert!(!WorkflowState::Idle.is_busy());
    /// assert!(WorkflowState::Capturing.is_busy());
    /// assert!(WorkflowState::Transcribing.is_busy());
    /// assert!(WorkflowState::Synthesizing.is_busy());
    /// assert!(!WorkflowState::Error.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            WorkflowState::Capturing | WorkflowState::Transcribing | WorkflowState::Synthesizing
        )
    }

    /// A short human-readable label for the status line.
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "Idle",
            WorkflowState::Capturing => "Recording",
            WorkflowState::Transcribing => "Transcribing",
            WorkflowState::Synthesizing => "Speaking",
            WorkflowState::Error => "Error",
        }
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        WorkflowState::Idle
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- is_busy ---

    #[test]
    fn idle_is_not_busy() {
        assert!(!WorkflowState::Idle.is_busy());
    }

    #[test]
    fn capturing_is_busy() {
        assert!(WorkflowState::Capturing.is_busy());
    }

    #[test]
    fn transcribing_is_busy() {
        assert!(WorkflowState::Transcribing.is_busy());
    }

    #[test]
    fn synthesizing_is_busy() {
        assert!(WorkflowState::Synthesizing.is_busy());
    }

    #[test]
    fn error_is_not_busy() {
        assert!(!WorkflowState::Error.is_busy());
    }

    // ---- label ---

    #[test]
    fn labels_are_stable() {
        assert_eq!(WorkflowState::Idle.label(), "Idle");
        assert_eq!(WorkflowState::Capturing.label(), "Recording");
        assert_eq!(WorkflowState::Transcribing.label(), "Transcribing");
        assert_eq!(WorkflowState::Synthesizing.label(), "Speaking");
        assert_eq!(WorkflowState::Error.label(), "Error");
    }

    // ---- Default ---

    #[test]
    fn default_is_idle() {
        assert_eq!(WorkflowState::default(), WorkflowState::Idle);
    }
}
