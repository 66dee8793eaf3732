//! Application entry point — Speakback.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create the tokio runtime (multi-thread, 2 workers — streaming
//!    capture blocks one of them for the recording window).
//! 4. Build the collaborators (normalizer, recognizer, synthesizer,
//!    playback, microphone source) from config.
//! 5. Create workflow channels (`command`, `result`).
//! 6. Spawn the workflow runner on the tokio runtime.
//! 7. Run [`eframe::run_native`] — blocks the main thread until the
//!    window is closed.

use std::sync::Arc;

use tokio::sync::mpsc;

use speakback::{
    app::SpeakbackApp,
    audio::MicSource,
    capture::CaptureSession,
    config::{AppConfig, AppPaths},
    normalize::SymphoniaNormalizer,
    playback::SpeechPlayer,
    synth::HttpSynthesizer,
    transcribe::HttpTranscriber,
    workflow::{WorkflowCommand, WorkflowResult, WorkflowRunner},
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let mut vp = egui::ViewportBuilder::default()
        .with_inner_size([420.0, 460.0])
        .with_min_inner_size([360.0, 380.0]);

    if let Some((x, y)) = config.ui.window_position {
        vp = vp.with_position(egui::pos2(x, y));
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Speakback starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Collaborators
    let session = CaptureSession::new(
        Arc::new(SymphoniaNormalizer::new()),
        Arc::new(HttpTranscriber::from_config(&config.recognize)),
    );
    let synthesizer = Arc::new(HttpSynthesizer::from_config(&config.synth));
    let player = SpeechPlayer::spawn();

    // 5. Channel setup
    let (command_tx, command_rx) = mpsc::channel::<WorkflowCommand>(16);
    let (result_tx, result_rx) = mpsc::channel::<WorkflowResult>(32);

    // 6. Workflow runner on the tokio runtime
    let runner = WorkflowRunner::new(
        session,
        synthesizer,
        player,
        Box::new(MicSource::new()),
        AppPaths::new(),
    );
    rt.spawn(runner.run(command_rx, result_tx));

    // 7. Build the egui app and run it (blocks until the window is closed)
    let app = SpeakbackApp::new(command_tx, result_rx, config.clone());
    let options = native_options(&config);

    eframe::run_native("Speakback", options, Box::new(move |_cc| Ok(Box::new(app))))
}
