//! Line-based codec for tokio.
//!
//! Frames the raw byte stream into newline-terminated lines. Decoded lines
//! have their CRLF/LF terminator stripped; encoded lines get a CRLF appended
//! so the framed writer always emits whole, terminated lines.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ClientError, Result};

/// Maximum accepted line length in bytes, terminator included.
///
/// Tag-bearing TMI lines routinely exceed the classic 512-byte IRC limit,
/// so the modern 8191-byte cap is used.
pub const MAX_LINE_LEN: usize = 8191;

/// Codec that frames newline-terminated lines.
///
/// An over-long line is discarded up to its terminator and reported once as
/// [`ClientError::LineTooLong`]; the codec then resumes on the next line.
pub struct LineCodec {
    /// Index of next byte to check for a newline.
    next_index: usize,
    /// Maximum line length.
    max_len: usize,
    /// Currently skipping an over-long line.
    discarding: bool,
}

impl LineCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    /// Create a codec with a custom line limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ClientError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        if self.discarding {
            match src.iter().position(|b| *b == b'\n') {
                Some(offset) => {
                    src.advance(offset + 1);
                    self.discarding = false;
                }
                None => {
                    src.clear();
                    return Ok(None);
                }
            }
        }

        // Look for a newline starting from where we left off.
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(ClientError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            let text =
                std::str::from_utf8(&line).map_err(|e| ClientError::InvalidUtf8 {
                    byte_pos: e.valid_up_to(),
                    details: e.to_string(),
                })?;

            Ok(Some(text.trim_end_matches(&['\r', '\n'][..]).to_string()))
        } else {
            // No complete line yet - remember where we stopped.
            self.next_index = src.len();

            if src.len() > self.max_len {
                let actual = src.len();
                src.clear();
                self.next_index = 0;
                self.discarding = true;
                return Err(ClientError::LineTooLong {
                    actual,
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ClientError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_complete_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :test\r\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("PING :test".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_lf_only_terminator() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :test\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("PING :test".to_string()));
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_decode_two_lines() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("first\r\nsecond\r\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("first".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("second".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_decode_too_long_then_recovers() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this line is way too long\nPING :x\n");

        let result = codec.decode(&mut buf);
        assert!(matches!(result, Err(ClientError::LineTooLong { .. })));

        // The next line decodes normally.
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :x".to_string()));
    }

    #[test]
    fn test_decode_too_long_partial_discards() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("aaaaaaaaaaaaaaaaaaaa");

        let result = codec.decode(&mut buf);
        assert!(matches!(result, Err(ClientError::LineTooLong { .. })));

        // Remainder of the over-long line is skipped through its terminator.
        let mut rest = BytesMut::from("aaaa\nPING :y\n");
        assert_eq!(codec.decode(&mut rest).unwrap(), Some("PING :y".to_string()));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"bad \xff\xfe line\r\n"[..]);

        let result = codec.decode(&mut buf);
        assert!(matches!(result, Err(ClientError::InvalidUtf8 { .. })));
        // The offending line was consumed.
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_appends_crlf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec.encode("PONG :test".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"PONG :test\r\n");
    }
}
