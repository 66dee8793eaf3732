//! Speech recognition — canonical WAV to text via a cloud provider.
//!
//! [`Transcriber`] is the async seam the capture session finalizes
//! through.  [`HttpTranscriber`] posts the spooled WAV to a
//! speech-api-v2-style endpoint; all connection details come from
//! [`RecognizeConfig`], nothing is hardcoded.
//!
//! Failure is classified, never free-form: audio the service cannot make
//! out is [`TranscribeError::Unintelligible`], everything else (network,
//! quota, provider fault) is [`TranscribeError::ServiceUnavailable`] with
//! the provider detail.  The session turns both into sentinel transcripts
//! rather than application errors.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::RecognizeConfig;

/// Transcript text used in place of speech the service could not make out.
pub const UNINTELLIGIBLE_SENTINEL: &str = "(Could not understand audio)";

/// Transcript text used when the recognition service itself failed.
pub fn service_failure_text(detail: &str) -> String {
    format!("(Could not request results; {detail})")
}

// ---------------------------------------------------------------------------
// TranscribeError
// ---------------------------------------------------------------------------

/// Classified recognition failures.
#[derive(Debug, Clone, Error)]
pub enum TranscribeError {
    /// The service parsed the audio but could not recognize speech in it.
    #[error("could not understand audio")]
    Unintelligible,

    /// Network, quota, or provider fault; carries the provider detail.
    #[error("recognition service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<reqwest::Error> for TranscribeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranscribeError::ServiceUnavailable("request timed out".into())
        } else {
            TranscribeError::ServiceUnavailable(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Transcriber trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for speech recognition.
///
/// # Contract
///
/// - `wav_path` points at a mono f32 WAV spooled by the session; the file
///   is guaranteed to exist for the duration of the call and no longer.
/// - `sample_rate` is the WAV's rate in Hz, forwarded so the provider
///   does not have to sniff the container.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        wav_path: &Path,
        sample_rate: u32,
    ) -> Result<String, TranscribeError>;
}

// ---------------------------------------------------------------------------
// HttpTranscriber
// ---------------------------------------------------------------------------

/// Calls a speech-api-v2-compatible `/recognize` endpoint.
///
/// The response body is newline-separated JSON objects; the first object
/// carrying a non-empty `result[0].alternative[0].transcript` wins.  An
/// empty result set means the service heard nothing intelligible.
pub struct HttpTranscriber {
    client: reqwest::Client,
    config: RecognizeConfig,
}

impl HttpTranscriber {
    /// Build an `HttpTranscriber` from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; a default client is the last-resort fallback
    /// if the builder fails.
    pub fn from_config(config: &RecognizeConfig) -> Self {
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
impl Transcriber for HttpTranscriber {
    async fn transcribe(
        &self,
        wav_path: &Path,
        sample_rate: u32,
    ) -> Result<String, TranscribeError> {
        let body = tokio::fs::read(wav_path).await.map_err(|e| {
            TranscribeError::ServiceUnavailable(format!("cannot read audio: {e}"))
        })?;

        let url = format!("{}/recognize", self.config.base_url);

        let mut req = self
            .client
            .post(&url)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("audio/x-wav; rate={sample_rate}"),
            )
            .query(&[("client", "speakback"), ("lang", self.config.language.as_str())])
            .body(body);

        // Attach the key only when configured.
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.query(&[("key", key)]);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscribeError::ServiceUnavailable(format!(
                "HTTP {status}"
            )));
        }

        let text = response.text().await?;
        parse_transcript(&text)
    }
}

/// Parse a speech-api-v2 response body into a transcript.
///
/// The service replies with one JSON object per line; lines with an empty
/// `result` array are interim and skipped.
fn parse_transcript(body: &str) -> Result<String, TranscribeError> {
    let mut saw_valid_line = false;

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(_) => continue,
        };
        saw_valid_line = true;

        if let Some(transcript) = value["result"][0]["alternative"][0]["transcript"]
            .as_str()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            return Ok(transcript.to_string());
        }
    }

    if saw_valid_line {
        // The service answered but recognized nothing.
        Err(TranscribeError::Unintelligible)
    } else {
        Err(TranscribeError::ServiceUnavailable(
            "unexpected response body".into(),
        ))
    }
}

// ---------------------------------------------------------------------------
// MockTranscriber  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response and records how it
/// was called — including whether the spooled file existed at call time,
/// so scratch-release tests can distinguish "file was there during the
/// call" from "file leaked afterwards".
#[cfg(test)]
pub struct MockTranscriber {
    response: Result<String, TranscribeError>,
    pub calls: std::sync::atomic::AtomicUsize,
    pub last_path: std::sync::Mutex<Option<std::path::PathBuf>>,
    pub path_existed_during_call: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl MockTranscriber {
    pub fn ok(text: impl Into<String>) -> Self {
        Self::with_response(Ok(text.into()))
    }

    pub fn err(error: TranscribeError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<String, TranscribeError>) -> Self {
        Self {
            response,
            calls: std::sync::atomic::AtomicUsize::new(0),
            last_path: std::sync::Mutex::new(None),
            path_existed_during_call: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(
        &self,
        wav_path: &Path,
        _sample_rate: u32,
    ) -> Result<String, TranscribeError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.path_existed_during_call
            .store(wav_path.exists(), std::sync::atomic::Ordering::SeqCst);
        *self.last_path.lock().unwrap() = Some(wav_path.to_path_buf());
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- parse_transcript ----

    #[test]
    fn parses_final_result_line() {
        let body = concat!(
            "{\"result\":[]}\n",
            "{\"result\":[{\"alternative\":[{\"transcript\":\"hello world\",\"confidence\":0.9}],\"final\":true}],\"result_index\":0}\n",
        );
        assert_eq!(parse_transcript(body).unwrap(), "hello world");
    }

    #[test]
    fn empty_results_are_unintelligible() {
        let body = "{\"result\":[]}\n";
        assert!(matches!(
            parse_transcript(body).unwrap_err(),
            TranscribeError::Unintelligible
        ));
    }

    #[test]
    fn whitespace_only_transcript_is_unintelligible() {
        let body = "{\"result\":[{\"alternative\":[{\"transcript\":\"   \"}]}]}\n";
        assert!(matches!(
            parse_transcript(body).unwrap_err(),
            TranscribeError::Unintelligible
        ));
    }

    #[test]
    fn non_json_body_is_a_service_failure() {
        let err = parse_transcript("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, TranscribeError::ServiceUnavailable(_)));
    }

    // ---- sentinel text ----

    #[test]
    fn sentinel_matches_fixed_string() {
        assert_eq!(UNINTELLIGIBLE_SENTINEL, "(Could not understand audio)");
    }

    #[test]
    fn service_failure_text_carries_detail() {
        let text = service_failure_text("HTTP 503 Service Unavailable");
        assert_eq!(
            text,
            "(Could not request results; HTTP 503 Service Unavailable)"
        );
    }

    // ---- MockTranscriber ----

    #[tokio::test]
    async fn mock_records_path_and_existence() {
        let scratch = crate::scratch::ScratchFile::with_bytes(b"RIFF", ".wav").unwrap();
        let mock = MockTranscriber::ok("hi");

        let text = mock.transcribe(scratch.path(), 16_000).await.unwrap();
        assert_eq!(text, "hi");
        assert_eq!(mock.call_count(), 1);
        assert!(mock
            .path_existed_during_call
            .load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(
            mock.last_path.lock().unwrap().as_deref(),
            Some(scratch.path())
        );
    }

    #[test]
    fn transcriber_is_object_safe() {
        let _t: Box<dyn Transcriber> = Box::new(MockTranscriber::ok("x"));
    }
}
