//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\speakback\
//!   macOS:   ~/Library/Application Support/speakback/
//!   Linux:   ~/.config/speakback/
//!
//! Data dir (saved audio artifacts):
//!   Windows: %LOCALAPPDATA%\speakback\
//!   macOS:   ~/Library/Application Support/speakback/
//!   Linux:   ~/.local/share/speakback/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory for saved audio.
    pub data_dir: PathBuf,
    /// Last synthesized speech, kept so the user can re-listen.
    pub speech_file: PathBuf,
    /// Last captured/normalized recording, kept for preview and re-upload.
    pub capture_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "speakback";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let speech_file = data_dir.join("speech.mp3");
        let capture_file = data_dir.join("capture.wav");

        Self {
            config_dir,
            settings_file,
            data_dir,
            speech_file,
            capture_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths.data_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .speech_file
            .file_name()
            .is_some_and(|n| n == "speech.mp3"));
        assert!(paths
            .capture_file
            .file_name()
            .is_some_and(|n| n == "capture.wav"));
    }
}
