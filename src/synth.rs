//! Speech synthesis — text to encoded audio via a cloud provider.
//!
//! [`Synthesizer`] mirrors the other collaborator seams: async,
//! object-safe, classified failures.  [`HttpSynthesizer`] speaks the
//! translate-TTS wire format and returns MP3 bytes; connection details
//! come from [`SynthConfig`].
//!
//! Callers must pass a **base** language code (segment before the first
//! hyphen, see [`Language::base_code`](crate::lang::Language::base_code));
//! the provider does not understand regional variants.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SynthConfig;

// ---------------------------------------------------------------------------
// SynthesizeError
// ---------------------------------------------------------------------------

/// Classified synthesis failures.  None is retried automatically.
#[derive(Debug, Clone, Error)]
pub enum SynthesizeError {
    /// Network, quota, or provider fault; carries the provider detail.
    #[error("synthesis service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The provider rejected the language code.
    #[error("unsupported synthesis language: {0}")]
    UnsupportedLanguage(String),
}

impl From<reqwest::Error> for SynthesizeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SynthesizeError::ServiceUnavailable("request timed out".into())
        } else {
            SynthesizeError::ServiceUnavailable(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Synthesizer trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for speech synthesis.
///
/// # Contract
///
/// - `text` is non-empty after trimming (the trigger enforces this).
/// - `lang` is a base language code without regional suffix.
/// - On success the bytes are a complete encoded audio file (MP3 for the
///   HTTP implementation).
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, SynthesizeError>;
}

// ---------------------------------------------------------------------------
// HttpSynthesizer
// ---------------------------------------------------------------------------

/// Calls a translate-TTS-compatible endpoint and returns the MP3 bytes.
pub struct HttpSynthesizer {
    client: reqwest::Client,
    config: SynthConfig,
}

impl HttpSynthesizer {
    /// Build an `HttpSynthesizer` from application config.
    pub fn from_config(config: &SynthConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Synthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, SynthesizeError> {
        let url = format!("{}/translate_tts", self.config.base_url);
        let textlen = text.chars().count().to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", lang),
                ("q", text),
                ("total", "1"),
                ("idx", "0"),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND
            || status == reqwest::StatusCode::BAD_REQUEST
        {
            // The provider answers 400/404 for language codes it does not
            // serve.
            return Err(SynthesizeError::UnsupportedLanguage(lang.to_string()));
        }
        if !status.is_success() {
            return Err(SynthesizeError::ServiceUnavailable(format!(
                "HTTP {status}"
            )));
        }

        let bytes = response.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(SynthesizeError::ServiceUnavailable(
                "empty audio response".into(),
            ));
        }

        log::debug!("synthesized {} bytes of audio (lang={lang})", bytes.len());
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// MockSynthesizer  (test-only)
// ---------------------------------------------------------------------------

/// A test double that records every `(text, lang)` pair it was asked to
/// synthesize.
#[cfg(test)]
pub struct MockSynthesizer {
    response: Result<Vec<u8>, SynthesizeError>,
    pub calls: std::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl MockSynthesizer {
    pub fn ok(bytes: Vec<u8>) -> Self {
        Self {
            response: Ok(bytes),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn err(error: SynthesizeError) -> Self {
        Self {
            response: Err(error),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, SynthesizeError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), lang.to_string()));
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_builds_without_panic() {
        let _s = HttpSynthesizer::from_config(&SynthConfig::default());
    }

    #[test]
    fn synthesizer_is_object_safe() {
        let _s: Box<dyn Synthesizer> = Box::new(MockSynthesizer::ok(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn mock_records_text_and_lang() {
        let mock = MockSynthesizer::ok(vec![0xFF]);
        let bytes = mock.synthesize("hello", "en").await.unwrap();
        assert_eq!(bytes, vec![0xFF]);
        assert_eq!(
            mock.calls.lock().unwrap().as_slice(),
            &[("hello".to_string(), "en".to_string())]
        );
    }

    #[tokio::test]
    async fn mock_err_propagates() {
        let mock = MockSynthesizer::err(SynthesizeError::UnsupportedLanguage("xx".into()));
        let err = mock.synthesize("hi", "xx").await.unwrap_err();
        assert!(matches!(err, SynthesizeError::UnsupportedLanguage(_)));
    }

    #[test]
    fn error_display_carries_detail() {
        let e = SynthesizeError::ServiceUnavailable("HTTP 429 Too Many Requests".into());
        assert!(e.to_string().contains("429"));
    }
}
