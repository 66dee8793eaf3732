//! The capture session — how audio enters the system and becomes text.
//!
//! [`CaptureSession`] owns the two mutually exclusive acquisition paths
//! (streaming and upload) and drives a captured attempt through
//! normalization and recognition.  Failure at any stage terminates the
//! attempt in a classified state; nothing here crashes the app, and a
//! failed attempt never leaves stale results behind.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::audio::{encode_mono_wav, StreamSource, WavError};
use crate::capture::attempt::{AttemptState, CaptureAttempt, CaptureSource};
use crate::capture::clock::Clock;
use crate::normalize::{AudioNormalizer, ContainerHint, NormalizeError};
use crate::scratch::ScratchFile;
use crate::transcribe::{
    service_failure_text, TranscribeError, Transcriber, UNINTELLIGIBLE_SENTINEL,
};

/// Shortest allowed streaming capture.
pub const MIN_CAPTURE: Duration = Duration::from_secs(1);
/// Longest allowed streaming capture; bounds how long one event handler
/// may block.
pub const MAX_CAPTURE: Duration = Duration::from_secs(30);
/// Upper bound for a single poll of the streaming source.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// The outcome of one finalized attempt.  Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Recognized speech, or a sentinel when recognition failed.
    pub text: String,
    /// `true` only when `text` is genuine recognized speech.
    pub succeeded: bool,
    /// Which path produced the audio (display only).
    pub source: CaptureSource,
}

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Errors surfaced by [`CaptureSession::finalize`].
///
/// Recognition failures are *not* errors at this level — they become
/// sentinel [`Transcript`]s.  Only "no transcript exists at all" outcomes
/// land here.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The attempt never reached the captured state, so there is nothing
    /// to finalize.
    #[error("no audio captured for this attempt")]
    NothingCaptured,

    /// The normalizer rejected the raw bytes; no transcription was
    /// attempted.
    #[error("audio conversion failed: {0}")]
    Conversion(#[source] NormalizeError),

    /// The canonical WAV could not be produced.
    #[error("audio encoding failed: {0}")]
    Encode(#[source] WavError),

    /// Scratch storage for the recognizer hand-off could not be created.
    #[error("scratch storage failed: {0}")]
    Scratch(#[source] std::io::Error),
}

// ---------------------------------------------------------------------------
// CaptureSession
// ---------------------------------------------------------------------------

/// Owns the acquisition paths and the most recent transcript.
///
/// Starting a new attempt discards the previous transcript from the
/// session's point of view; the UI keeps its own copy for display until a
/// new one overwrites it.
pub struct CaptureSession {
    normalizer: Arc<dyn AudioNormalizer>,
    transcriber: Arc<dyn Transcriber>,
    last_transcript: Option<Transcript>,
}

impl CaptureSession {
    pub fn new(
        normalizer: Arc<dyn AudioNormalizer>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        Self {
            normalizer,
            transcriber,
            last_transcript: None,
        }
    }

    /// The transcript of the most recently finalized attempt, if any.
    pub fn last_transcript(&self) -> Option<&Transcript> {
        self.last_transcript.as_ref()
    }

    /// Acquire audio from a live stream for `duration` (clamped to
    /// [`MIN_CAPTURE`]..=[`MAX_CAPTURE`]).
    ///
    /// Blocks the calling thread for up to the clamped duration, polling
    /// the source at most [`POLL_TIMEOUT`] at a time against a deadline
    /// taken from `clock`.  Frames are downmixed to mono and concatenated
    /// in arrival order; the sample rate of the first frame is assumed for
    /// the whole attempt (frames at other rates are a known limitation and
    /// are not resampled).
    ///
    /// A source that fails to open terminates the attempt as
    /// device-unavailable; the session itself stays usable via upload.
    /// Zero received frames terminate it as empty.
    pub fn stream_capture(
        &mut self,
        source: &dyn StreamSource,
        duration: Duration,
        clock: &dyn Clock,
    ) -> CaptureAttempt {
        self.last_transcript = None;

        let duration = duration.clamp(MIN_CAPTURE, MAX_CAPTURE);
        let mut attempt = CaptureAttempt::new(CaptureSource::Stream);
        attempt.started_at = Some(clock.now());
        attempt.transition(AttemptState::Capturing);

        let mut handle = match source.open() {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("streaming capture unavailable: {e}");
                attempt.ended_at = Some(clock.now());
                attempt.transition(AttemptState::DeviceUnavailable);
                return attempt;
            }
        };

        let deadline = clock.now() + duration;
        let mut samples: Vec<f32> = Vec::new();
        let mut sample_rate: Option<u32> = None;

        while clock.now() < deadline {
            let remaining = deadline.saturating_duration_since(clock.now());
            let timeout = POLL_TIMEOUT.min(remaining);

            for frame in handle.poll(timeout) {
                if sample_rate.is_none() {
                    sample_rate = Some(frame.sample_rate);
                }
                samples.extend(frame.to_mono());
            }

            if !handle.is_active() {
                log::warn!("streaming source went inactive mid-capture");
                break;
            }
        }

        attempt.ended_at = Some(clock.now());

        if samples.is_empty() {
            attempt.transition(AttemptState::Empty);
            return attempt;
        }

        // sample_rate is Some whenever samples is non-empty.
        let rate = sample_rate.unwrap_or(48_000);
        match encode_mono_wav(&samples, rate) {
            Ok(wav) => {
                log::info!(
                    "captured {:.1}s of audio at {rate} Hz",
                    samples.len() as f64 / rate as f64
                );
                attempt.raw = wav;
                attempt.hint = Some(ContainerHint::Wav);
                attempt.transition(AttemptState::Captured);
            }
            Err(e) => {
                log::warn!("failed to encode captured audio: {e}");
                attempt.transition(AttemptState::Empty);
            }
        }
        attempt
    }

    /// Accept a complete uploaded file.
    ///
    /// The hint is advisory — the allow-list is enforced by
    /// [`ContainerHint`]'s closed set, but the normalizer may still reject
    /// the bytes.  Empty input terminates the attempt as empty.
    pub fn accept_upload(&mut self, raw: Vec<u8>, hint: ContainerHint) -> CaptureAttempt {
        self.last_transcript = None;

        let mut attempt = CaptureAttempt::new(CaptureSource::Upload);
        attempt.transition(AttemptState::Capturing);

        if raw.is_empty() {
            attempt.transition(AttemptState::Empty);
            return attempt;
        }

        attempt.raw = raw;
        attempt.hint = Some(hint);
        attempt.transition(AttemptState::Captured);
        attempt
    }

    /// Drive a captured attempt through normalization and recognition.
    ///
    /// Strictly sequential: the recognizer is never invoked when
    /// normalization fails.  The canonical WAV is spooled into scoped
    /// scratch storage that is released on every exit path.  Recognition
    /// failures produce sentinel transcripts with `succeeded == false`
    /// rather than errors.
    pub async fn finalize(
        &mut self,
        attempt: &mut CaptureAttempt,
    ) -> Result<Transcript, SessionError> {
        if attempt.state() != AttemptState::Captured {
            return Err(SessionError::NothingCaptured);
        }

        attempt.transition(AttemptState::Normalizing);

        let pcm = match self.normalizer.normalize(&attempt.raw, attempt.hint) {
            Ok(pcm) => pcm,
            Err(e) => {
                attempt.transition(AttemptState::NormalizeFailed);
                return Err(SessionError::Conversion(e));
            }
        };

        let wav = match encode_mono_wav(&pcm.samples, pcm.sample_rate) {
            Ok(wav) => wav,
            Err(e) => {
                attempt.transition(AttemptState::NormalizeFailed);
                return Err(SessionError::Encode(e));
            }
        };

        let scratch = match ScratchFile::with_bytes(&wav, ".wav") {
            Ok(scratch) => scratch,
            Err(e) => {
                attempt.transition(AttemptState::NormalizeFailed);
                return Err(SessionError::Scratch(e));
            }
        };

        attempt.transition(AttemptState::Transcribing);

        let transcript = match self
            .transcriber
            .transcribe(scratch.path(), pcm.sample_rate)
            .await
        {
            Ok(text) => {
                attempt.transition(AttemptState::ResultOk);
                Transcript {
                    text,
                    succeeded: true,
                    source: attempt.source,
                }
            }
            Err(TranscribeError::Unintelligible) => {
                attempt.transition(AttemptState::ResultUnintelligible);
                Transcript {
                    text: UNINTELLIGIBLE_SENTINEL.to_string(),
                    succeeded: false,
                    source: attempt.source,
                }
            }
            Err(TranscribeError::ServiceUnavailable(detail)) => {
                log::warn!("recognition service failure: {detail}");
                attempt.transition(AttemptState::ResultServiceError);
                Transcript {
                    text: service_failure_text(&detail),
                    succeeded: false,
                    source: attempt.source,
                }
            }
        };
        drop(scratch);

        self.last_transcript = Some(transcript.clone());
        Ok(transcript)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    use crate::audio::{AudioFrame, StreamHandle, StreamInitError};
    use crate::capture::clock::ManualClock;
    use crate::normalize::MockNormalizer;
    use crate::transcribe::MockTranscriber;

    // ---- scripted stream plumbing ----

    /// A source whose handle returns pre-scripted frame batches, one batch
    /// per poll, advancing a shared manual clock by the poll timeout to
    /// simulate blocking.
    struct ScriptedSource {
        batches: Mutex<Option<Vec<Vec<AudioFrame>>>>,
        clock: Arc<ManualClock>,
    }

    impl ScriptedSource {
        fn new(batches: Vec<Vec<AudioFrame>>, clock: Arc<ManualClock>) -> Self {
            Self {
                batches: Mutex::new(Some(batches)),
                clock,
            }
        }
    }

    impl StreamSource for ScriptedSource {
        fn open(&self) -> Result<Box<dyn StreamHandle>, StreamInitError> {
            let batches = self
                .batches
                .lock()
                .unwrap()
                .take()
                .expect("scripted source opened twice");
            Ok(Box::new(ScriptedHandle {
                batches,
                next: 0,
                clock: Arc::clone(&self.clock),
            }))
        }
    }

    struct ScriptedHandle {
        batches: Vec<Vec<AudioFrame>>,
        next: usize,
        clock: Arc<ManualClock>,
    }

    impl StreamHandle for ScriptedHandle {
        fn poll(&mut self, timeout: Duration) -> Vec<AudioFrame> {
            self.clock.advance(timeout);
            let batch = self.batches.get(self.next).cloned().unwrap_or_default();
            self.next += 1;
            batch
        }

        fn is_active(&self) -> bool {
            true
        }
    }

    /// A source that always fails to open, as a denied microphone would.
    struct DeniedSource;

    impl StreamSource for DeniedSource {
        fn open(&self) -> Result<Box<dyn StreamHandle>, StreamInitError> {
            Err(StreamInitError::BuildStream("permission denied".into()))
        }
    }

    fn mono_frame(value: f32, len: usize) -> AudioFrame {
        AudioFrame {
            samples: vec![value; len],
            sample_rate: 16_000,
            channels: 1,
        }
    }

    fn session_with(
        normalizer: MockNormalizer,
        transcriber: MockTranscriber,
    ) -> (CaptureSession, Arc<MockNormalizer>, Arc<MockTranscriber>) {
        let normalizer = Arc::new(normalizer);
        let transcriber = Arc::new(transcriber);
        let session = CaptureSession::new(
            Arc::clone(&normalizer) as Arc<dyn AudioNormalizer>,
            Arc::clone(&transcriber) as Arc<dyn Transcriber>,
        );
        (session, normalizer, transcriber)
    }

    // ---- streaming capture ----

    #[test]
    fn stream_capture_concatenates_frames_in_order() {
        let clock = Arc::new(ManualClock::new());
        let source = ScriptedSource::new(
            vec![
                vec![mono_frame(0.1, 8), mono_frame(0.2, 8)],
                vec![mono_frame(0.3, 8)],
            ],
            Arc::clone(&clock),
        );
        let (mut session, _, _) =
            session_with(MockNormalizer::ok_silence(), MockTranscriber::ok("x"));

        let attempt =
            session.stream_capture(&source, Duration::from_secs(3), clock.as_ref());

        assert_eq!(attempt.state(), AttemptState::Captured);
        assert_eq!(attempt.source, CaptureSource::Stream);
        assert_eq!(attempt.hint, Some(ContainerHint::Wav));
        assert!(attempt.started_at.is_some() && attempt.ended_at.is_some());

        // 24 mono samples captured, in arrival order.
        let mut reader =
            hound::WavReader::new(std::io::Cursor::new(attempt.raw.clone())).unwrap();
        let decoded: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded.len(), 24);
        assert!((decoded[0] - 0.1).abs() < 1e-6);
        assert!((decoded[8] - 0.2).abs() < 1e-6);
        assert!((decoded[16] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn stream_capture_downmixes_multichannel_frames() {
        let clock = Arc::new(ManualClock::new());
        let stereo = AudioFrame {
            samples: vec![0.4, 0.2, 0.4, 0.2],
            sample_rate: 48_000,
            channels: 2,
        };
        let source = ScriptedSource::new(vec![vec![stereo]], Arc::clone(&clock));
        let (mut session, _, _) =
            session_with(MockNormalizer::ok_silence(), MockTranscriber::ok("x"));

        let attempt =
            session.stream_capture(&source, Duration::from_secs(1), clock.as_ref());

        let mut reader =
            hound::WavReader::new(std::io::Cursor::new(attempt.raw.clone())).unwrap();
        assert_eq!(reader.spec().sample_rate, 48_000);
        let decoded: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded.len(), 2);
        for &s in &decoded {
            assert!((s - 0.3).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn stream_capture_with_zero_frames_is_empty_and_skips_normalizer() {
        let clock = Arc::new(ManualClock::new());
        let source = ScriptedSource::new(vec![], Arc::clone(&clock));
        let (mut session, normalizer, _) =
            session_with(MockNormalizer::ok_silence(), MockTranscriber::ok("x"));

        let mut attempt =
            session.stream_capture(&source, Duration::from_secs(5), clock.as_ref());

        assert_eq!(attempt.state(), AttemptState::Empty);
        assert!(attempt.state().is_terminal());

        // finalize refuses, and the normalizer is never consulted.
        let err = session.finalize(&mut attempt).await.unwrap_err();
        assert!(matches!(err, SessionError::NothingCaptured));
        assert_eq!(normalizer.call_count(), 0);
    }

    #[test]
    fn stream_capture_respects_deadline() {
        let clock = Arc::new(ManualClock::new());
        // More batches than a 2 s window allows at 1 s polls.
        let batches = (0..10).map(|_| vec![mono_frame(0.1, 4)]).collect();
        let source = ScriptedSource::new(batches, Arc::clone(&clock));
        let (mut session, _, _) =
            session_with(MockNormalizer::ok_silence(), MockTranscriber::ok("x"));

        let attempt =
            session.stream_capture(&source, Duration::from_secs(2), clock.as_ref());

        let started = attempt.started_at.unwrap();
        let ended = attempt.ended_at.unwrap();
        assert_eq!(ended.duration_since(started), Duration::from_secs(2));

        // Exactly two 1 s polls fit, so 8 samples were kept.
        let mut reader =
            hound::WavReader::new(std::io::Cursor::new(attempt.raw.clone())).unwrap();
        assert_eq!(reader.samples::<f32>().count(), 8);
    }

    #[test]
    fn stream_capture_clamps_duration_to_allowed_range() {
        let clock = Arc::new(ManualClock::new());
        let source = ScriptedSource::new(vec![], Arc::clone(&clock));
        let (mut session, _, _) =
            session_with(MockNormalizer::ok_silence(), MockTranscriber::ok("x"));

        let attempt =
            session.stream_capture(&source, Duration::from_secs(600), clock.as_ref());

        let elapsed = attempt
            .ended_at
            .unwrap()
            .duration_since(attempt.started_at.unwrap());
        assert_eq!(elapsed, MAX_CAPTURE);
    }

    #[tokio::test]
    async fn denied_device_terminates_attempt_but_not_session() {
        let (mut session, _, _) =
            session_with(MockNormalizer::ok_silence(), MockTranscriber::ok("later"));
        let clock = ManualClock::new();

        let attempt =
            session.stream_capture(&DeniedSource, Duration::from_secs(5), &clock);
        assert_eq!(attempt.state(), AttemptState::DeviceUnavailable);
        assert!(attempt.state().is_terminal());

        // The upload path remains usable within the same session.
        let wav = encode_mono_wav(&[0.1_f32; 32], 16_000).unwrap();
        let mut upload = session.accept_upload(wav, ContainerHint::Wav);
        assert_eq!(upload.state(), AttemptState::Captured);

        let transcript = session.finalize(&mut upload).await.unwrap();
        assert!(transcript.succeeded);
        assert_eq!(transcript.text, "later");
    }

    // ---- upload ----

    #[tokio::test]
    async fn empty_upload_is_empty_attempt() {
        let (mut session, normalizer, _) =
            session_with(MockNormalizer::ok_silence(), MockTranscriber::ok("x"));

        let mut attempt = session.accept_upload(Vec::new(), ContainerHint::Mp3);
        assert_eq!(attempt.state(), AttemptState::Empty);

        let err = session.finalize(&mut attempt).await.unwrap_err();
        assert!(matches!(err, SessionError::NothingCaptured));
        assert_eq!(normalizer.call_count(), 0);
    }

    #[test]
    fn upload_keeps_hint_and_bytes() {
        let (mut session, _, _) =
            session_with(MockNormalizer::ok_silence(), MockTranscriber::ok("x"));

        let attempt = session.accept_upload(vec![1, 2, 3], ContainerHint::Ogg);
        assert_eq!(attempt.state(), AttemptState::Captured);
        assert_eq!(attempt.source, CaptureSource::Upload);
        assert_eq!(attempt.hint, Some(ContainerHint::Ogg));
        assert_eq!(attempt.raw, vec![1, 2, 3]);
    }

    // ---- finalize ----

    #[tokio::test]
    async fn finalize_success_produces_genuine_transcript() {
        let (mut session, normalizer, transcriber) = session_with(
            MockNormalizer::ok_silence(),
            MockTranscriber::ok("hello there"),
        );

        let mut attempt = session.accept_upload(vec![0_u8; 64], ContainerHint::Wav);
        let transcript = session.finalize(&mut attempt).await.unwrap();

        assert_eq!(attempt.state(), AttemptState::ResultOk);
        assert!(transcript.succeeded);
        assert_eq!(transcript.text, "hello there");
        assert_eq!(normalizer.call_count(), 1);
        assert_eq!(transcriber.call_count(), 1);
        assert_eq!(session.last_transcript(), Some(&transcript));
    }

    #[tokio::test]
    async fn finalize_conversion_failure_never_reaches_transcriber() {
        let (mut session, _, transcriber) = session_with(
            MockNormalizer::err(NormalizeError::CorruptInput("bad RIFF".into())),
            MockTranscriber::ok("unreachable"),
        );

        let mut attempt = session.accept_upload(vec![0xDE, 0xAD], ContainerHint::Wav);
        let err = session.finalize(&mut attempt).await.unwrap_err();

        assert_eq!(attempt.state(), AttemptState::NormalizeFailed);
        assert!(matches!(err, SessionError::Conversion(_)));
        assert_eq!(transcriber.call_count(), 0);
        assert!(session.last_transcript().is_none());
    }

    #[tokio::test]
    async fn finalize_unintelligible_yields_sentinel_not_error() {
        let (mut session, _, _) = session_with(
            MockNormalizer::ok_silence(),
            MockTranscriber::err(TranscribeError::Unintelligible),
        );

        let mut attempt = session.accept_upload(vec![0_u8; 64], ContainerHint::Wav);
        let transcript = session.finalize(&mut attempt).await.unwrap();

        assert_eq!(attempt.state(), AttemptState::ResultUnintelligible);
        assert!(!transcript.succeeded);
        assert_eq!(transcript.text, UNINTELLIGIBLE_SENTINEL);
    }

    #[tokio::test]
    async fn finalize_service_failure_carries_provider_detail() {
        let (mut session, _, _) = session_with(
            MockNormalizer::ok_silence(),
            MockTranscriber::err(TranscribeError::ServiceUnavailable(
                "HTTP 503".into(),
            )),
        );

        let mut attempt = session.accept_upload(vec![0_u8; 64], ContainerHint::Wav);
        let transcript = session.finalize(&mut attempt).await.unwrap();

        assert_eq!(attempt.state(), AttemptState::ResultServiceError);
        assert!(!transcript.succeeded);
        assert_eq!(transcript.text, "(Could not request results; HTTP 503)");
    }

    #[tokio::test]
    async fn finalize_releases_scratch_even_when_transcriber_fails() {
        let (mut session, _, transcriber) = session_with(
            MockNormalizer::ok_silence(),
            MockTranscriber::err(TranscribeError::ServiceUnavailable("boom".into())),
        );

        let mut attempt = session.accept_upload(vec![0_u8; 64], ContainerHint::Wav);
        let _ = session.finalize(&mut attempt).await.unwrap();

        assert!(transcriber.path_existed_during_call.load(Ordering::SeqCst));
        let path = transcriber.last_path.lock().unwrap().clone().unwrap();
        assert!(!path.exists(), "scratch file leaked at {}", path.display());
    }

    #[tokio::test]
    async fn new_attempt_discards_previous_transcript() {
        let (mut session, _, _) =
            session_with(MockNormalizer::ok_silence(), MockTranscriber::ok("first"));

        let mut attempt = session.accept_upload(vec![0_u8; 64], ContainerHint::Wav);
        let _ = session.finalize(&mut attempt).await.unwrap();
        assert!(session.last_transcript().is_some());

        let _next = session.accept_upload(vec![0_u8; 64], ContainerHint::Wav);
        assert!(session.last_transcript().is_none());
    }

}
