//! Bounded capture of merged subprocess output.

use std::sync::Mutex;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

/// Bytes requested per read from a child pipe.
const PIPE_READ_BUFFER: usize = 16384;

pub(crate) const TRUNCATION_NOTICE: &str = "\n... (output truncated due to size limit)";

/// Merged stdout/stderr bytes in arrival order, capped at `max_bytes`.
///
/// Bytes past the cap are counted as dropped so the pipes keep draining.
#[derive(Debug)]
pub(crate) struct CapturedOutput {
    bytes: Vec<u8>,
    max_bytes: usize,
    truncated: bool,
}

impl CapturedOutput {
    pub(crate) fn new(max_bytes: usize) -> Self {
        Self {
            bytes: Vec::new(),
            max_bytes,
            truncated: false,
        }
    }

    pub(crate) fn push(&mut self, chunk: &[u8]) {
        let room = self.max_bytes.saturating_sub(self.bytes.len());
        if chunk.len() > room {
            self.truncated = true;
        }
        let take = chunk.len().min(room);
        self.bytes.extend_from_slice(&chunk[..take]);
    }

    #[cfg(test)]
    pub(crate) fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Decode as UTF-8 (lossy) and append the truncation notice when capped.
    pub(crate) fn into_text(self) -> String {
        let text = String::from_utf8_lossy(&self.bytes);
        if !self.truncated {
            return text.into_owned();
        }
        let mut out = truncate_bytes_utf8(&text, self.max_bytes).to_string();
        out.push_str(TRUNCATION_NOTICE);
        out
    }
}

/// Longest prefix of `s` that fits in `max_bytes` and ends on a char boundary.
fn truncate_bytes_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut cut = max_bytes;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    &s[..cut]
}

/// Append an error notice, separated from any captured output by a blank line.
pub(crate) fn append_notice(output: &mut String, notice: &str) {
    if !output.is_empty() {
        output.push_str("\n\n");
    }
    output.push_str(notice);
}

fn lock(capture: &Mutex<CapturedOutput>) -> std::sync::MutexGuard<'_, CapturedOutput> {
    capture.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Copy a child pipe into the shared capture until EOF.
pub(crate) async fn pump<R>(reader: Option<R>, capture: &Mutex<CapturedOutput>)
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return;
    };
    let mut buf = vec![0u8; PIPE_READ_BUFFER];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => lock(capture).push(&buf[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!("pipe read failed: {}", e);
                break;
            }
        }
    }
}

/// Snapshot the capture collected so far.
pub(crate) fn take(capture: Mutex<CapturedOutput>) -> CapturedOutput {
    capture
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_cap() {
        let mut out = CapturedOutput::new(16);
        out.push(b"hello ");
        out.push(b"world");
        assert!(!out.is_truncated());
        assert_eq!(out.into_text(), "hello world");
    }

    #[test]
    fn test_exactly_at_cap() {
        let mut out = CapturedOutput::new(5);
        out.push(b"abcde");
        assert!(!out.is_truncated());
        assert_eq!(out.into_text(), "abcde");
    }

    #[test]
    fn test_over_cap() {
        let mut out = CapturedOutput::new(4);
        out.push(b"abc");
        out.push(b"defgh");
        out.push(b"ijk");
        assert!(out.is_truncated());
        assert_eq!(out.into_text(), format!("abcd{}", TRUNCATION_NOTICE));
    }

    #[test]
    fn test_cut_on_char_boundary() {
        // "é" is two bytes; a cap of 3 splits the second one
        let mut out = CapturedOutput::new(3);
        out.push("éé".as_bytes());
        let text = out.into_text();
        assert!(text.starts_with('é'));
        assert!(text.ends_with(TRUNCATION_NOTICE));
        assert!(!text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut out = CapturedOutput::new(16);
        out.push(&[0xFF, 0xFE, b'o', b'k']);
        let text = out.into_text();
        assert!(text.contains('\u{FFFD}'));
        assert!(text.ends_with("ok"));
    }

    #[test]
    fn test_append_notice() {
        let mut empty = String::new();
        append_notice(&mut empty, "Error: boom");
        assert_eq!(empty, "Error: boom");

        let mut some = "partial".to_string();
        append_notice(&mut some, "Error: boom");
        assert_eq!(some, "partial\n\nError: boom");
    }
}
