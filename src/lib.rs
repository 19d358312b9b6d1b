//! Companion - a voice chat buddy backed by a local LLM
//!
//! One run handles one recording:
//!
//! ```text
//! audio file ──► STT ──► transcript
//!                            │
//!          history ──► [persona, prior turns, transcript] ──► /api/chat (streamed)
//!             ▲                                                   │
//!             └──────────── (user, assistant) ◄── reply ◄─────────┘
//!                                                   │
//!                                                  TTS ──► reply-*.mp3
//! ```
//!
//! The [`history`] module keeps the conversation in a single JSON document and
//! the [`chat`] module folds the model's streamed fragments into one reply.

pub mod chat;
pub mod config;
pub mod error;
pub mod history;
pub mod persona;
pub mod pipeline;
pub mod voice;

pub use chat::{Fragment, OllamaClient, ReplyAccumulator};
pub use config::Config;
pub use error::{Error, Result};
pub use history::{ConversationLog, HistoryStats, HistoryStore, Role, Turn};
pub use pipeline::{Companion, Exchange};
pub use voice::{SpeechToText, TextToSpeech};
