//! Incremental splitter for line-oriented streaming bodies.
//!
//! Bytes are buffered until a newline arrives so that multi-byte UTF-8
//! sequences split across network chunks are decoded intact.

use tracing::warn;

/// Longest line kept; anything longer is dropped as noise
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Turns arbitrary byte chunks into complete lines
#[derive(Debug)]
pub struct LineDecoder {
    buffer: Vec<u8>,
    max_line: usize,
    /// Set while skipping the rest of an oversized line
    discarding: bool,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_line,
            discarding: false,
        }
    }

    /// Feed a chunk and return every line it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            if std::mem::take(&mut self.discarding) {
                continue;
            }
            if pos > self.max_line {
                warn!(bytes = pos, "Discarding oversized stream line");
                continue;
            }
            lines.push(decode_line(&raw[..pos]));
        }

        if self.buffer.len() > self.max_line {
            warn!(bytes = self.buffer.len(), "Discarding oversized stream line");
            self.buffer.clear();
            self.discarding = true;
        }
        lines
    }

    /// Return the unterminated tail once the body has ended
    pub fn finish(&mut self) -> Option<String> {
        if std::mem::take(&mut self.discarding) || self.buffer.is_empty() {
            self.buffer.clear();
            return None;
        }
        let raw = std::mem::take(&mut self.buffer);
        Some(decode_line(&raw))
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_complete_lines() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(b"one\ntwo\r\nthree");

        assert_eq!(lines, vec!["one", "two"]);
        assert_eq!(decoder.finish(), Some("three".to_string()));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_line_spanning_chunks() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"{\"type\":\"app").is_empty());
        let lines = decoder.push(b"end-text\"}\n");

        assert_eq!(lines, vec!["{\"type\":\"append-text\"}"]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let text = "你好\n".as_bytes();
        let mut decoder = LineDecoder::new();

        assert!(decoder.push(&text[..2]).is_empty());
        let lines = decoder.push(&text[2..]);

        assert_eq!(lines, vec!["你好"]);
    }

    #[test]
    fn test_oversized_line_dropped_across_chunks() {
        let mut decoder = LineDecoder::with_max_line(8);

        assert_eq!(decoder.push(b"ok\n0123456"), vec!["ok"]);
        assert!(decoder.push(b"789abcdef").is_empty());
        let lines = decoder.push(b"tail of long line\nnext\n");

        assert_eq!(lines, vec!["next"]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_oversized_complete_line_dropped() {
        let mut decoder = LineDecoder::with_max_line(4);
        assert_eq!(decoder.push(b"abcdefgh\nabc\n"), vec!["abc"]);
    }

    #[test]
    fn test_oversized_tail_not_returned() {
        let mut decoder = LineDecoder::with_max_line(4);
        assert!(decoder.push(b"abcdefgh").is_empty());
        assert_eq!(decoder.finish(), None);

        assert_eq!(decoder.push(b"abc\n"), vec!["abc"]);
    }

    #[test]
    fn test_empty_lines_preserved() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.push(b"a\n\nb\n"), vec!["a", "", "b"]);
    }
}
