//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across
//! threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::lang::Language;

// ---------------------------------------------------------------------------
// SynthConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-synthesis provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Base URL of a translate-TTS-compatible endpoint.
    pub base_url: String,
    /// Maximum seconds to wait for a synthesis response.
    pub timeout_secs: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            base_url: "https://translate.google.com".into(),
            timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// RecognizeConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-recognition provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizeConfig {
    /// Base URL of a speech-api-v2-compatible endpoint.
    pub base_url: String,
    /// API key — `None` sends the request without one (some deployments
    /// accept that, the public service does not).
    pub api_key: Option<String>,
    /// Recognition language tag sent to the provider (e.g. `"en-US"`).
    pub language: String,
    /// Maximum seconds to wait for a recognition response.
    pub timeout_secs: u64,
}

impl Default for RecognizeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://www.google.com/speech-api/v2".into(),
            api_key: None,
            language: "en-US".into(),
            timeout_secs: 15,
        }
    }
}

// ---------------------------------------------------------------------------
// CaptureConfig
// ---------------------------------------------------------------------------

/// Settings for microphone capture.
///
/// The min/max bounds mirror the hard limits enforced by the capture
/// session; the default is what the duration slider starts at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Record-duration slider position on startup, in seconds.
    pub default_record_secs: u32,
    /// Shortest selectable recording, in seconds.
    pub min_record_secs: u32,
    /// Longest selectable recording, in seconds.
    pub max_record_secs: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            default_record_secs: 5,
            min_record_secs: 1,
            max_record_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Window and selection state persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Last saved window position `(x, y)` in screen pixels.  `None` means
    /// let the OS / window manager pick a position on first launch.
    pub window_position: Option<(f32, f32)>,
    /// Last selected synthesis language.
    pub language: Language,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_position: None,
            language: Language::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use speakback::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Speech-synthesis provider settings.
    pub synth: SynthConfig,
    /// Speech-recognition provider settings.
    pub recognize: RecognizeConfig,
    /// Microphone capture settings.
    pub capture: CaptureConfig,
    /// UI state.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a
    /// missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
