//! Workflow runner — executes UI commands against the collaborators.
//!
//! [`WorkflowRunner`] owns the [`CaptureSession`], the synthesizer, the
//! playback handle, and the streaming source.  It receives
//! [`WorkflowCommand`]s over a `tokio::sync::mpsc` channel and reports
//! progress and outcomes as [`WorkflowResult`]s on a second channel that
//! the UI polls every frame.
//!
//! Streaming capture blocks its thread for the whole recording window, so
//! it runs under `tokio::task::block_in_place`; the runner therefore needs
//! a multi-threaded runtime.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::audio::StreamSource;
use crate::capture::{AttemptState, CaptureAttempt, CaptureSession, SystemClock};
use crate::config::AppPaths;
use crate::normalize::ContainerHint;
use crate::playback::SpeechPlayer;
use crate::synth::Synthesizer;

use super::{WorkflowCommand, WorkflowResult};

// ---------------------------------------------------------------------------
// WorkflowRunner
// ---------------------------------------------------------------------------

/// Drives the capture/transcribe/speak workflow.
///
/// Create with [`WorkflowRunner::new`], then call [`run`](Self::run) inside
/// a tokio task spawned from `main()`.
pub struct WorkflowRunner {
    session: CaptureSession,
    synthesizer: Arc<dyn Synthesizer>,
    player: SpeechPlayer,
    stream_source: Box<dyn StreamSource>,
    paths: AppPaths,
}

impl WorkflowRunner {
    pub fn new(
        session: CaptureSession,
        synthesizer: Arc<dyn Synthesizer>,
        player: SpeechPlayer,
        stream_source: Box<dyn StreamSource>,
        paths: AppPaths,
    ) -> Self {
        Self {
            session,
            synthesizer,
            player,
            stream_source,
            paths,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run the workflow until `command_rx` is closed.
    pub async fn run(
        mut self,
        mut command_rx: mpsc::Receiver<WorkflowCommand>,
        result_tx: mpsc::Sender<WorkflowResult>,
    ) {
        while let Some(command) = command_rx.recv().await {
            match command {
                WorkflowCommand::Speak { text, language } => {
                    self.handle_speak(&text, language.base_code(), &result_tx)
                        .await;
                }
                WorkflowCommand::RecordStream { duration_secs } => {
                    self.handle_record(duration_secs, &result_tx).await;
                }
                WorkflowCommand::TranscribeFile { path } => {
                    self.handle_file(&path, &result_tx).await;
                }
            }
        }

        log::info!("workflow: command channel closed, runner shutting down");
    }

    // -----------------------------------------------------------------------
    // Command handlers
    // -----------------------------------------------------------------------

    /// Synthesize `text` and play it.  Empty text (after trimming) is a
    /// user-visible warning, not a provider call.
    async fn handle_speak(&mut self, text: &str, lang: &str, tx: &mpsc::Sender<WorkflowResult>) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            send(
                tx,
                WorkflowResult::Warning {
                    message: "Please enter some text.".into(),
                },
            )
            .await;
            return;
        }

        send(tx, WorkflowResult::SynthesisStarted).await;
        log::debug!("workflow: synthesizing {} chars (lang={lang})", trimmed.len());

        match self.synthesizer.synthesize(trimmed, lang).await {
            Ok(bytes) => {
                let saved_to = self.save_artifact(&self.paths.speech_file, &bytes).await;
                self.player.play(bytes);
                send(tx, WorkflowResult::SpeechReady { saved_to }).await;
            }
            Err(e) => {
                send(
                    tx,
                    WorkflowResult::Error {
                        message: e.to_string(),
                    },
                )
                .await;
            }
        }
    }

    /// Record from the streaming source, then transcribe.
    async fn handle_record(&mut self, duration_secs: u32, tx: &mpsc::Sender<WorkflowResult>) {
        send(tx, WorkflowResult::CaptureStarted { duration_secs }).await;

        let duration = Duration::from_secs(u64::from(duration_secs));
        let attempt = {
            let session = &mut self.session;
            let source = self.stream_source.as_ref();
            tokio::task::block_in_place(|| session.stream_capture(source, duration, &SystemClock))
        };

        match attempt.state() {
            AttemptState::DeviceUnavailable => {
                send(
                    tx,
                    WorkflowResult::CaptureFailed {
                        message: "No input device is available; upload an audio file instead."
                            .into(),
                    },
                )
                .await;
            }
            AttemptState::Empty => {
                send(
                    tx,
                    WorkflowResult::CaptureFailed {
                        message: "No audio was captured; check the input device.".into(),
                    },
                )
                .await;
            }
            AttemptState::Captured => {
                // Keep a preview copy; the attempt's bytes are already WAV.
                let _ = self.save_artifact(&self.paths.capture_file, &attempt.raw).await;
                self.transcribe_attempt(attempt, tx).await;
            }
            other => {
                log::error!("workflow: unexpected capture state {other:?}");
                send(
                    tx,
                    WorkflowResult::CaptureFailed {
                        message: "Recording ended unexpectedly.".into(),
                    },
                )
                .await;
            }
        }
    }

    /// Read an uploaded file and transcribe it.
    async fn handle_file(&mut self, path: &Path, tx: &mpsc::Sender<WorkflowResult>) {
        let hint = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ContainerHint::from_extension);

        let Some(hint) = hint else {
            let allowed = ContainerHint::ALL
                .iter()
                .map(|h| h.extension())
                .collect::<Vec<_>>()
                .join(", ");
            send(
                tx,
                WorkflowResult::Error {
                    message: format!("unsupported file type; expected one of: {allowed}"),
                },
            )
            .await;
            return;
        };

        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) => {
                send(
                    tx,
                    WorkflowResult::Error {
                        message: format!("cannot read {}: {e}", path.display()),
                    },
                )
                .await;
                return;
            }
        };

        let attempt = self.session.accept_upload(raw, hint);
        match attempt.state() {
            AttemptState::Empty => {
                send(
                    tx,
                    WorkflowResult::CaptureFailed {
                        message: format!("{} contained no data", path.display()),
                    },
                )
                .await;
            }
            AttemptState::Captured => {
                self.transcribe_attempt(attempt, tx).await;
            }
            other => {
                log::error!("workflow: unexpected upload state {other:?}");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Run a captured attempt through normalization and recognition and
    /// report the outcome.
    async fn transcribe_attempt(
        &mut self,
        mut attempt: CaptureAttempt,
        tx: &mpsc::Sender<WorkflowResult>,
    ) {
        send(tx, WorkflowResult::Transcribing).await;

        match self.session.finalize(&mut attempt).await {
            Ok(transcript) => {
                send(tx, WorkflowResult::TranscriptReady { transcript }).await;
            }
            Err(e) => {
                send(
                    tx,
                    WorkflowResult::Error {
                        message: e.to_string(),
                    },
                )
                .await;
            }
        }
    }

    /// Write an audio artifact under the data directory.
    ///
    /// Saving is best-effort; failure is logged and playback continues
    /// without the on-disk copy.
    async fn save_artifact(&self, path: &Path, bytes: &[u8]) -> Option<PathBuf> {
        if let Err(e) = tokio::fs::create_dir_all(&self.paths.data_dir).await {
            log::warn!("cannot create {}: {e}", self.paths.data_dir.display());
            return None;
        }
        match tokio::fs::write(path, bytes).await {
            Ok(()) => Some(path.to_path_buf()),
            Err(e) => {
                log::warn!("cannot save {}: {e}", path.display());
                None
            }
        }
    }
}

async fn send(tx: &mpsc::Sender<WorkflowResult>, result: WorkflowResult) {
    if tx.send(result).await.is_err() {
        log::warn!("workflow: result channel closed, dropping event");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
