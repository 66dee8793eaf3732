//! The feedback channel — the single synthesis-text slot.
//!
//! [`FeedbackChannel`] owns the one piece of state that survives across
//! user interactions: the text the synthesizer will speak.  It is never
//! empty-by-accident (it defaults to a fixed greeting) and it changes in
//! exactly two ways: the user edits it directly, or the user explicitly
//! confirms copying a transcript into it.  Transcripts never flow in
//! automatically — that would silently clobber hand-edited text.
//!
//! Events are handled sequentially, so the slot has a single writer at a
//! time and needs no locking; it is owned state passed by reference, not a
//! module global.

use crate::capture::Transcript;

/// The synthesis text shown on first launch.
pub const DEFAULT_GREETING: &str = "Hi there, I'm your personal assistant.";

// ---------------------------------------------------------------------------
// CopyPolicy
// ---------------------------------------------------------------------------

/// Whether sentinel (non-genuine) transcript text may be copied into the
/// synthesis slot.
///
/// The default allows it — a user may want to speak or rework the sentinel
/// wording — but the UI labels such text as non-authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyPolicy {
    /// Copy any transcript, sentinel or genuine.
    #[default]
    AllowSentinel,
    /// Only copy transcripts with `succeeded == true`.
    RequireGenuine,
}

// ---------------------------------------------------------------------------
// CopyRejected
// ---------------------------------------------------------------------------

/// The policy refused to copy a sentinel transcript.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transcript is not genuine speech and the policy forbids copying it")]
pub struct CopyRejected;

// ---------------------------------------------------------------------------
// FeedbackChannel
// ---------------------------------------------------------------------------

/// Gate between transcription results and the synthesis input.
#[derive(Debug, Clone)]
pub struct FeedbackChannel {
    text: String,
    policy: CopyPolicy,
}

impl FeedbackChannel {
    /// A channel holding the default greeting under the given policy.
    pub fn new(policy: CopyPolicy) -> Self {
        Self {
            text: DEFAULT_GREETING.to_string(),
            policy,
        }
    }

    /// Copy `transcript.text` into the slot, replacing whatever is there.
    ///
    /// Requires explicit user confirmation upstream; this method only
    /// enforces the sentinel policy.  Idempotent — repeating the call with
    /// the same transcript leaves the slot unchanged.
    pub fn confirm_and_copy(&mut self, transcript: &Transcript) -> Result<(), CopyRejected> {
        if self.policy == CopyPolicy::RequireGenuine && !transcript.succeeded {
            return Err(CopyRejected);
        }
        self.text = transcript.text.clone();
        Ok(())
    }

    /// The current synthesis text.  Always defined.
    pub fn read(&self) -> &str {
        &self.text
    }

    /// Direct overwrite by user edit.  Emptiness is allowed here; it is
    /// checked only at synthesis time.
    pub fn edit(&mut self, new_text: impl Into<String>) {
        self.text = new_text.into();
    }
}

impl Default for FeedbackChannel {
    fn default() -> Self {
        Self::new(CopyPolicy::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
