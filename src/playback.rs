//! Playback of synthesized speech.
//!
//! rodio's `OutputStream` is not `Send`, so a dedicated thread owns the
//! output device and a [`SpeechPlayer`] hands it encoded audio over a
//! channel.  A machine without an output device degrades gracefully: the
//! thread logs once and swallows further play requests instead of taking
//! the app down.

use std::io::Cursor;
use std::sync::mpsc;

// ---------------------------------------------------------------------------
// SpeechPlayer
// ---------------------------------------------------------------------------

/// Handle to the playback thread.  Cheap to move; dropping it ends the
/// thread once the queue drains.
pub struct SpeechPlayer {
    tx: mpsc::Sender<Vec<u8>>,
}

impl SpeechPlayer {
    /// Spawn the playback thread and return its handle.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<Vec<u8>>();

        std::thread::Builder::new()
            .name("speech-playback".into())
            .spawn(move || playback_loop(rx))
            .expect("failed to spawn playback thread");

        Self { tx }
    }

    /// Queue one complete encoded audio file (MP3) for playback.
    ///
    /// Never blocks and never fails the caller; a missing output device
    /// was already reported by the playback thread.
    pub fn play(&self, encoded: Vec<u8>) {
        if self.tx.send(encoded).is_err() {
            log::warn!("playback thread is gone; dropping audio");
        }
    }
}

fn playback_loop(rx: mpsc::Receiver<Vec<u8>>) {
    let (stream, handle) = match rodio::OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            log::warn!("audio output unavailable, playback disabled: {e}");
            // Keep draining so senders never block or error.
            while rx.recv().is_ok() {}
            return;
        }
    };
    // Keeps the output device alive for the lifetime of the loop.
    let _stream = stream;

    while let Ok(bytes) = rx.recv() {
        let source = match rodio::Decoder::new(Cursor::new(bytes)) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("cannot decode synthesized audio: {e}");
                continue;
            }
        };

        match rodio::Sink::try_new(&handle) {
            Ok(sink) => {
                sink.append(source);
                sink.sleep_until_end();
            }
            Err(e) => log::warn!("cannot open playback sink: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_handle_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<SpeechPlayer>();
    }

    /// Playing garbage must never panic — at worst the thread logs a
    /// decode failure (or, on machines without audio, a device warning).
    #[test]
    fn playing_undecodable_bytes_does_not_panic() {
        let player = SpeechPlayer::spawn();
        player.play(vec![0x00, 0x01, 0x02]);
        player.play(Vec::new());
        // Give the thread a moment to process before the handle drops.
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
}
