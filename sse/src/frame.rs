//! Line framing for `text/event-stream` bodies.
//!
//! The scanner is deliberately narrow: a frame is one `\n`-terminated line,
//! and only lines starting with `data: ` carry a message. `event:`, `id:`,
//! `retry:`, comments and blank-line event terminators are not interpreted.
//!
//! Splitting happens on raw bytes before decoding. `\n` never occurs inside a
//! multi-byte UTF-8 sequence, so a character split across two network chunks
//! is reassembled in the buffer before its line is decoded, and the output is
//! independent of how the body was chunked.

use bytes::BytesMut;
use log::*;

/// Prefix that marks a message-carrying line.
pub const DATA_PREFIX: &str = "data: ";

/// Incremental decoder turning body chunks into message payloads.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: BytesMut,
    /// Bytes at the front of `buffer` already known to contain no `\n`.
    scanned: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns the payload of every `data: ` line it completed,
    /// in stream order. The trailing incomplete line stays buffered.
    pub fn decode(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        let mut from = self.scanned;
        while let Some(offset) = self.buffer[from..].iter().position(|&b| b == b'\n') {
            let end = from + offset;
            let line_bytes = self.buffer.split_to(end + 1);
            let line = String::from_utf8_lossy(&line_bytes[..end]);

            match extract_payload(&line) {
                Some(payload) => payloads.push(payload.to_string()),
                None => trace!("Ignoring non-data line ({} bytes)", end),
            }
            from = 0;
        }
        self.scanned = self.buffer.len();

        payloads
    }

    /// Number of bytes waiting for a line terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// Returns the message payload carried by `line`, if it is a data line.
pub fn extract_payload(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX)
}
