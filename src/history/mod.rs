//! Conversation history persisted as a single JSON document
//!
//! The document holds every prior turn in conversation order plus the time of
//! the last write:
//!
//! ```json
//! {
//!   "messages": [
//!     { "role": "user", "content": "hi" },
//!     { "role": "assistant", "content": "Hello. How are you feeling?" }
//!   ],
//!   "last_updated": "2026-01-01T12:00:00Z"
//! }
//! ```

mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use store::{HistoryStats, HistoryStore};

/// Speaker of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name of the role
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One role-tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// The persisted document: ordered turns plus last write time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationLog {
    #[serde(default)]
    pub messages: Vec<Turn>,

    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl ConversationLog {
    /// Append one exchange (user then assistant) and stamp the log
    pub fn push_exchange(&mut self, user: &str, assistant: &str) {
        self.messages.push(Turn::user(user));
        self.messages.push(Turn::assistant(assistant));
        self.last_updated = Some(Utc::now());
    }
}
