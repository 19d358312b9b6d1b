//! Speech services
//!
//! Transcription of the user's recording and synthesis of the reply. Both are
//! HTTP services; audio is passed through as bytes without decoding.

mod stt;
mod tts;

use std::path::Path;

pub use stt::SpeechToText;
pub use tts::TextToSpeech;

use crate::Result;

/// File name prefix of synthesized replies
pub const REPLY_AUDIO_PREFIX: &str = "reply-";

/// MIME type for an audio file, chosen by extension
#[must_use]
pub fn audio_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a" | "mp4") => "audio/mp4",
        Some("ogg" | "oga" | "opus") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}

/// Delete synthesized replies from `dir`, returning how many were removed
///
/// Other files in the directory are left alone. A missing directory counts
/// as already clean.
///
/// # Errors
///
/// Returns error if the directory cannot be listed or a file cannot be removed
pub fn clear_audio(dir: &Path) -> Result<usize> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let is_reply = entry
            .file_name()
            .to_str()
            .is_some_and(|n| n.starts_with(REPLY_AUDIO_PREFIX));
        if is_reply && entry.file_type()?.is_file() {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
    }

    tracing::info!(dir = %dir.display(), removed, "cleared generated audio");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_audio_mime_type() {
        assert_eq!(audio_mime_type(Path::new("a.wav")), "audio/wav");
        assert_eq!(audio_mime_type(Path::new("dir/b.MP3")), "audio/mpeg");
        assert_eq!(audio_mime_type(Path::new("c.m4a")), "audio/mp4");
        assert_eq!(audio_mime_type(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_clear_audio_only_removes_replies() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("reply-1.mp3"), b"x").unwrap();
        std::fs::write(dir.path().join("reply-2.mp3"), b"y").unwrap();
        std::fs::write(dir.path().join("keep.wav"), b"z").unwrap();

        assert_eq!(clear_audio(dir.path()).unwrap(), 2);
        assert!(dir.path().join("keep.wav").exists());
        assert_eq!(clear_audio(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_clear_audio_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(clear_audio(&dir.path().join("absent")).unwrap(), 0);
    }
}
