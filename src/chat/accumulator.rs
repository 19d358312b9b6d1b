//! Fragment parsing and reply accumulation

use std::pin::pin;

use futures::{Stream, StreamExt};
use serde::Deserialize;

use crate::{Error, Result};

/// One line of a streamed chat response
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Fragment {
    #[serde(default)]
    message: Option<FragmentMessage>,

    /// Set on the last fragment of a reply
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct FragmentMessage {
    #[serde(default)]
    content: Option<String>,
}

impl Fragment {
    /// Parse one response line; `None` for blank or malformed lines
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match serde_json::from_str(line) {
            Ok(fragment) => Some(fragment),
            Err(e) => {
                tracing::debug!(error = %e, line, "skipping unparseable chat line");
                None
            }
        }
    }

    /// Text carried by this fragment, if any
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.message.as_ref()?.content.as_deref()
    }
}

/// Concatenates fragment text until a fragment is flagged done
#[derive(Debug, Default)]
pub struct ReplyAccumulator {
    text: String,
    fragments: usize,
    complete: bool,
}

impl ReplyAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one fragment in; returns `true` once the reply is complete
    ///
    /// Fragments arriving after completion are ignored.
    pub fn push_fragment(&mut self, fragment: &Fragment) -> bool {
        if self.complete {
            return true;
        }

        self.fragments += 1;
        if let Some(content) = fragment.content() {
            self.text.push_str(content);
        }
        self.complete = fragment.done;
        self.complete
    }

    /// Parse and fold one raw response line
    pub fn push_line(&mut self, line: &str) -> bool {
        match Fragment::parse(line) {
            Some(fragment) => self.push_fragment(&fragment),
            None => self.complete,
        }
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Text accumulated so far
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the accumulator and return the reply text
    ///
    /// A stream that ended without a done flag still yields its partial text.
    #[must_use]
    pub fn finish(self) -> String {
        if !self.complete {
            tracing::warn!(
                fragments = self.fragments,
                bytes = self.text.len(),
                "chat stream ended without a done flag, reply may be truncated"
            );
        }
        self.text
    }
}

/// Fold a sequence of response lines, pulling no further than the done line
pub fn accumulate_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut acc = ReplyAccumulator::new();
    for line in lines {
        if acc.push_line(line.as_ref()) {
            break;
        }
    }
    acc.finish()
}

/// Fold a stream of raw body chunks into one reply
///
/// Chunks may split lines anywhere; a final line without a trailing newline
/// is still used. The stream is dropped as soon as the reply is complete.
///
/// # Errors
///
/// Returns error if the stream yields an error before the reply completes
pub async fn accumulate_stream<S, B, E>(chunks: S) -> Result<String>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<Error>,
{
    let mut chunks = pin!(chunks);
    let mut lines = LineBuffer::new();
    let mut acc = ReplyAccumulator::new();

    while let Some(chunk) = chunks.next().await {
        lines.push(chunk.map_err(Into::into)?.as_ref());
        while let Some(line) = lines.next_line() {
            if acc.push_line(&line) {
                return Ok(acc.finish());
            }
        }
    }

    if let Some(rest) = lines.finish() {
        acc.push_line(&rest);
    }
    Ok(acc.finish())
}

/// Reassembles newline-terminated lines from arbitrary byte chunks
///
/// Each byte is scanned for a newline once, however the chunks are split.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
    /// Start of the first unconsumed line
    start: usize,
    /// Bytes before this offset hold no newline
    scanned: usize,
}

impl LineBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        if self.start > 0 {
            self.buf.drain(..self.start);
            self.scanned -= self.start;
            self.start = 0;
        }
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete line without its terminator
    pub fn next_line(&mut self) -> Option<String> {
        let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') else {
            self.scanned = self.buf.len();
            return None;
        };
        let end = self.scanned + offset;

        let mut line = &self.buf[self.start..end];
        if line.last() == Some(&b'\r') {
            line = &line[..line.len() - 1];
        }
        let line = String::from_utf8_lossy(line).into_owned();

        self.start = end + 1;
        self.scanned = self.start;
        Some(line)
    }

    /// Whatever is left after the last newline
    #[must_use]
    pub fn finish(self) -> Option<String> {
        let rest = &self.buf[self.start..];
        if rest.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(rest).into_owned())
        }
    }
}
