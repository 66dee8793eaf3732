//! Scoped scratch files for collaborator hand-off.
//!
//! The recognizer consumes file-backed input, so the session spools the
//! canonical WAV into a [`ScratchFile`] for the duration of one finalize
//! call.  The file is removed when the value is dropped — on success, on
//! collaborator failure, and during unwinding alike.  Leaking scratch
//! files across repeated attempts is a correctness bug, so nothing here
//! exposes a way to keep the file alive past its scope.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// ScratchFile
// ---------------------------------------------------------------------------

/// A temporary file that exists exactly as long as the value does.
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    /// Create a scratch file containing `bytes`.
    ///
    /// `suffix` becomes the file extension (e.g. `".wav"`) so collaborators
    /// that sniff extensions see the right container hint.
    pub fn with_bytes(bytes: &[u8], suffix: &str) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("speakback-")
            .suffix(suffix)
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    /// Path of the scratch file, valid until this value is dropped.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contents_are_written_and_readable() {
        let scratch = ScratchFile::with_bytes(b"hello", ".wav").unwrap();
        let read = std::fs::read(scratch.path()).unwrap();
        assert_eq!(read, b"hello");
    }

    #[test]
    fn suffix_is_applied() {
        let scratch = ScratchFile::with_bytes(b"x", ".wav").unwrap();
        assert_eq!(
            scratch.path().extension().and_then(|e| e.to_str()),
            Some("wav")
        );
    }

    #[test]
    fn file_is_removed_on_drop() {
        let path = {
            let scratch = ScratchFile::with_bytes(b"bytes", ".wav").unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists(), "scratch file leaked at {}", path.display());
    }

    #[test]
    fn file_is_removed_when_a_scope_unwinds() {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        let mut leaked_path = None;
        let result = catch_unwind(AssertUnwindSafe(|| {
            let scratch = ScratchFile::with_bytes(b"bytes", ".wav").unwrap();
            leaked_path = Some(scratch.path().to_path_buf());
            panic!("simulated collaborator failure");
        }));

        assert!(result.is_err());
        let path = leaked_path.expect("path recorded before panic");
        assert!(!path.exists(), "scratch file leaked at {}", path.display());
    }
}
