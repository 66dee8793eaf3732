//! Speakback desktop window — egui/eframe application.
//!
//! # Architecture
//!
//! [`SpeakbackApp`] is the top-level [`eframe::App`].  It owns the UI state
//! and two channel endpoints:
//!
//! * `command_tx` — sends [`WorkflowCommand`] to the workflow runner.
//! * `result_rx`  — receives [`WorkflowResult`] from the runner.
//!
//! The window has three sections, top to bottom:
//!
//! | Section | Contents |
//! |---------|----------|
//! | Speak | synthesis text box, language dropdown, Speak button |
//! | Capture | duration slider + Record button, upload path + Transcribe button |
//! | Transcript | last transcript (marked when not genuine speech), Use-transcript button |
//!
//! All channel interaction is non-blocking: results are drained with
//! `try_recv` every frame and commands go out with `try_send`.

use std::path::PathBuf;
use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::capture::Transcript;
use crate::config::AppConfig;
use crate::feedback::FeedbackChannel;
use crate::lang::Language;
use crate::workflow::{WorkflowCommand, WorkflowResult, WorkflowState};

/// Shown beneath transcript text that is a sentinel, not recognized speech.
const NOT_SPEECH_MARKER: &str = "(not recognized speech)";

// ---------------------------------------------------------------------------
// SpeakbackApp
// ---------------------------------------------------------------------------

/// eframe application — the capture / transcribe / speak window.
pub struct SpeakbackApp {
    // ── Synthesis state ──────────────────────────────────────────────────
    /// The one synthesis-text slot; survives across attempts.
    feedback: FeedbackChannel,
    /// Currently selected synthesis language.
    language: Language,

    // ── Capture state ────────────────────────────────────────────────────
    /// Record-duration slider position, in seconds.
    record_secs: u32,
    /// Path typed into the upload field.
    upload_path: String,

    // ── Workflow state ───────────────────────────────────────────────────
    /// What the runner is currently doing; gates the action buttons.
    workflow: WorkflowState,
    /// Most recent transcript, kept for display and the copy button.
    last_transcript: Option<Transcript>,
    /// One-line status / warning message under the sections.
    status: Option<String>,
    /// Where the last synthesized audio was saved, if it was.
    speech_saved_to: Option<PathBuf>,

    // ── Window tracking ──────────────────────────────────────────────────
    /// Last observed window position, persisted on exit.
    window_position: Option<(f32, f32)>,

    // ── Channels ─────────────────────────────────────────────────────────
    command_tx: mpsc::Sender<WorkflowCommand>,
    result_rx: mpsc::Receiver<WorkflowResult>,

    // ── Configuration ────────────────────────────────────────────────────
    config: AppConfig,
}

impl SpeakbackApp {
    /// Create a new [`SpeakbackApp`] from loaded configuration and the
    /// workflow channel endpoints.
    pub fn new(
        command_tx: mpsc::Sender<WorkflowCommand>,
        result_rx: mpsc::Receiver<WorkflowResult>,
        config: AppConfig,
    ) -> Self {
        Self {
            feedback: FeedbackChannel::default(),
            language: config.ui.language,
            record_secs: config.capture.default_record_secs,
            upload_path: String::new(),
            workflow: WorkflowState::Idle,
            last_transcript: None,
            status: None,
            speech_saved_to: None,
            window_position: config.ui.window_position,
            command_tx,
            result_rx,
            config,
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain all pending workflow results (non-blocking).
    fn poll_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            match result {
                WorkflowResult::CaptureStarted { duration_secs } => {
                    self.workflow = WorkflowState::Capturing;
                    self.status = Some(format!("Recording for {duration_secs} s..."));
                }
                WorkflowResult::CaptureFailed { message } => {
                    self.workflow = WorkflowState::Error;
                    self.status = Some(message);
                }
                WorkflowResult::Transcribing => {
                    self.workflow = WorkflowState::Transcribing;
                    self.status = Some("Transcribing...".into());
                }
                WorkflowResult::TranscriptReady { transcript } => {
                    self.workflow = WorkflowState::Idle;
                    self.status = None;
                    self.last_transcript = Some(transcript);
                }
                WorkflowResult::SynthesisStarted => {
                    self.workflow = WorkflowState::Synthesizing;
                    self.status = Some("Synthesizing...".into());
                }
                WorkflowResult::SpeechReady { saved_to } => {
                    self.workflow = WorkflowState::Idle;
                    self.status = None;
                    self.speech_saved_to = saved_to;
                }
                WorkflowResult::Warning { message } => {
                    self.workflow = WorkflowState::Idle;
                    self.status = Some(message);
                }
                WorkflowResult::Error { message } => {
                    self.workflow = WorkflowState::Error;
                    self.status = Some(message);
                }
            }
        }
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Send the current synthesis text and language to the runner.
    fn request_speak(&mut self) {
        let command = WorkflowCommand::Speak {
            text: self.feedback.read().to_string(),
            language: self.language,
        };
        if self.command_tx.try_send(command).is_err() {
            self.status = Some("The workflow is not responding.".into());
        }
    }

    /// Start a recording of the currently selected duration.
    fn request_record(&mut self) {
        let command = WorkflowCommand::RecordStream {
            duration_secs: self.record_secs,
        };
        if self.command_tx.try_send(command).is_err() {
            self.status = Some("The workflow is not responding.".into());
        }
    }

    /// Transcribe the file typed into the upload field.
    fn request_transcribe_file(&mut self) {
        let trimmed = self.upload_path.trim();
        if trimmed.is_empty() {
            self.status = Some("Enter the path of an audio file first.".into());
            return;
        }
        let command = WorkflowCommand::TranscribeFile {
            path: PathBuf::from(trimmed),
        };
        if self.command_tx.try_send(command).is_err() {
            self.status = Some("The workflow is not responding.".into());
        }
    }

    /// Copy the last transcript into the synthesis slot (explicit user
    /// confirmation — transcripts never flow in automatically).
    fn use_transcript(&mut self) {
        if let Some(transcript) = &self.last_transcript {
            match self.feedback.confirm_and_copy(transcript) {
                Ok(()) => self.status = None,
                Err(e) => self.status = Some(e.to_string()),
            }
        }
    }

    // ── Section renderers ────────────────────────────────────────────────

    fn draw_speak_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Speak");

        let mut text = self.feedback.read().to_string();
        let response = ui.add(
            egui::TextEdit::multiline(&mut text)
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            self.feedback.edit(text);
        }

        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Language")
                .selected_text(self.language.code())
                .show_ui(ui, |ui| {
                    for lang in Language::ALL {
                        ui.selectable_value(&mut self.language, lang, lang.code());
                    }
                });

            if ui
                .add_enabled(!self.workflow.is_busy(), egui::Button::new("Speak"))
                .clicked()
            {
                self.request_speak();
            }
        });

        if let Some(path) = &self.speech_saved_to {
            ui.label(
                egui::RichText::new(format!("Saved to {}", path.display()))
                    .color(egui::Color32::from_rgb(140, 140, 140))
                    .size(11.0),
            );
        }
    }

    fn draw_capture_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Capture");

        ui.horizontal(|ui| {
            ui.add(
                egui::Slider::new(
                    &mut self.record_secs,
                    self.config.capture.min_record_secs..=self.config.capture.max_record_secs,
                )
                .suffix(" s"),
            );
            if ui
                .add_enabled(!self.workflow.is_busy(), egui::Button::new("Record"))
                .clicked()
            {
                self.request_record();
            }
        });

        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.upload_path)
                    .hint_text("path to wav / mp3 / m4a / webm / ogg"),
            );
            if ui
                .add_enabled(!self.workflow.is_busy(), egui::Button::new("Transcribe"))
                .clicked()
            {
                self.request_transcribe_file();
            }
        });
    }

    fn draw_transcript_section(&mut self, ui: &mut egui::Ui) {
        let Some(transcript) = self.last_transcript.clone() else {
            return;
        };

        ui.heading("Transcript");
        ui.label(
            egui::RichText::new(transcript.text.as_str())
                .color(if transcript.succeeded {
                    egui::Color32::from_rgb(80, 200, 120)
                } else {
                    egui::Color32::from_rgb(255, 136, 68)
                })
                .size(13.0),
        );
        if !transcript.succeeded {
            ui.label(
                egui::RichText::new(NOT_SPEECH_MARKER)
                    .color(egui::Color32::from_rgb(140, 140, 140))
                    .size(11.0),
            );
        }
        ui.label(
            egui::RichText::new(format!("source: {}", transcript.source))
                .color(egui::Color32::from_rgb(140, 140, 140))
                .size(11.0),
        );

        if ui.button("Use transcript").clicked() {
            self.use_transcript();
        }
    }

    fn draw_status_line(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(self.workflow.label())
                    .color(state_color(self.workflow))
                    .size(12.0),
            );
            if let Some(status) = &self.status {
                ui.label(
                    egui::RichText::new(status.as_str())
                        .color(egui::Color32::from_rgb(180, 180, 180))
                        .size(12.0),
                );
            }
        });
    }
}

/// Accent colour for the status line.
fn state_color(state: WorkflowState) -> egui::Color32 {
    match state {
        WorkflowState::Idle => egui::Color32::from_rgb(100, 100, 100),
        WorkflowState::Capturing => egui::Color32::from_rgb(255, 68, 68),
        WorkflowState::Transcribing | WorkflowState::Synthesizing => {
            egui::Color32::from_rgb(68, 136, 255)
        }
        WorkflowState::Error => egui::Color32::from_rgb(255, 136, 68),
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for SpeakbackApp {
    /// Called every frame by eframe.  Polls the result channel, then
    /// renders the window.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_results();

        // Keep polling the channel while work is in flight.
        if self.workflow.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        if let Some(rect) = ctx.input(|i| i.viewport().outer_rect) {
            self.window_position = Some((rect.min.x, rect.min.y));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_speak_section(ui);
            ui.separator();
            self.draw_capture_section(ui);
            ui.separator();
            self.draw_transcript_section(ui);
            ui.separator();
            self.draw_status_line(ui);
        });
    }

    /// Persist window position and language selection on exit.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.config.ui.window_position = self.window_position;
        self.config.ui.language = self.language;
        if let Err(e) = self.config.save() {
            log::warn!("failed to save settings on exit: {e}");
        }
        log::info!("Speakback closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
