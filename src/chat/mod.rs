//! Streaming chat with a local LLM endpoint
//!
//! The endpoint answers with newline-delimited JSON, one partial fragment per
//! line:
//!
//! ```text
//! {"message":{"role":"assistant","content":"Hel"},"done":false}
//! {"message":{"role":"assistant","content":"lo"},"done":false}
//! {"message":{"role":"assistant","content":""},"done":true}
//! ```
//!
//! [`ReplyAccumulator`] folds those fragments into one reply and stops at the
//! first fragment flagged `done`.

mod accumulator;
mod ollama;

pub use accumulator::{Fragment, LineBuffer, ReplyAccumulator, accumulate_lines, accumulate_stream};
pub use ollama::{ChatOptions, OllamaClient};
