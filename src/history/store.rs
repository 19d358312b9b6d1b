//! File-backed conversation store

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use super::{ConversationLog, Turn};
use crate::{Error, Result};

/// Summary of the stored conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStats {
    pub exchange_count: usize,
    pub message_count: usize,
    pub last_updated: Option<DateTime<Utc>>,
    /// Size of the document on disk, 0 when absent
    pub byte_size: u64,
}

/// Durable record of prior turns backed by one JSON file
///
/// A missing or corrupt document reads as an empty log. Appends rewrite the
/// whole document through a temp file in the same directory followed by a
/// rename, so readers never observe a torn write.
pub struct HistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Create a store backed by the document at `path`
    ///
    /// Nothing is touched on disk until the first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing document
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All prior turns in conversation order
    #[must_use]
    pub fn load(&self) -> Vec<Turn> {
        self.read_log().messages
    }

    /// Record one exchange (user turn, then assistant turn)
    ///
    /// # Errors
    ///
    /// Returns error if the document cannot be written
    pub fn append(&self, user: &str, assistant: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut log = self.read_log();
        log.push_exchange(user, assistant);
        self.write_log(&log)?;

        tracing::debug!(
            path = %self.path.display(),
            messages = log.messages.len(),
            "appended exchange to history"
        );
        Ok(())
    }

    /// Delete the backing document
    ///
    /// Returns `false` when there was nothing to delete.
    ///
    /// # Errors
    ///
    /// Returns error if the document exists but cannot be removed
    pub fn clear(&self) -> Result<bool> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "conversation history cleared");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no conversation history to clear");
                Ok(false)
            }
            Err(e) => Err(Error::History(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }

    /// Counts and size of the stored conversation
    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        let log = self.read_log();
        let message_count = log.messages.len();
        let byte_size = fs::metadata(&self.path).map_or(0, |m| m.len());

        HistoryStats {
            exchange_count: message_count / 2,
            message_count,
            last_updated: log.last_updated,
            byte_size,
        }
    }

    fn read_log(&self) -> ConversationLog {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return ConversationLog::default(),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to read history, starting empty"
                );
                return ConversationLog::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to parse history, starting empty"
                );
                ConversationLog::default()
            }
        }
    }

    fn write_log(&self, log: &ConversationLog) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(tmp.as_file_mut(), log)?;
        tmp.as_file_mut().write_all(b"\n")?;
        tmp.as_file().sync_all()?;

        tmp.persist(&self.path).map_err(|e| {
            Error::History(format!("failed to replace {}: {}", self.path.display(), e.error))
        })?;
        Ok(())
    }
}
