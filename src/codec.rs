//! TMI protocol codec for tokio.
//!
//! Wraps [`LineCodec`]: inbound lines are classified into [`ServerEvent`]s,
//! outbound [`Command`]s are serialized and CRLF-terminated.
//!
//! Decoding never fails on content. Undecodable lines (invalid UTF-8,
//! over-long) are dropped and reported as [`ServerEvent::Unrecognized`]
//! rather than as codec errors, because the framed reader latches any
//! decode error and would end the stream; only transport-level I/O errors
//! remain fatal.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::command::Command;
use crate::error::{ClientError, Result};
use crate::line::LineCodec;
use crate::parse::{parse_line, ServerEvent};

/// Tokio codec for the TMI wire format.
#[derive(Default)]
pub struct TmiCodec {
    inner: LineCodec,
}

impl TmiCodec {
    /// Create a new codec with the default line limit.
    pub fn new() -> Self {
        Self {
            inner: LineCodec::new(),
        }
    }
}

impl Decoder for TmiCodec {
    type Item = ServerEvent;
    type Error = ClientError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<ServerEvent>> {
        match self.inner.decode(src) {
            Ok(line) => Ok(line.map(|line| parse_line(&line))),
            Err(e) if e.is_recoverable_read() => {
                warn!(error = %e, "dropping undecodable line");
                Ok(Some(ServerEvent::Unrecognized))
            }
            Err(e) => Err(e),
        }
    }
}

impl Encoder<Command> for TmiCodec {
    type Error = ClientError;

    fn encode(&mut self, command: Command, dst: &mut BytesMut) -> Result<()> {
        let mut line = command.to_string();
        // A command serializes to exactly one wire line; caller-supplied
        // text with an embedded terminator is truncated at the first break.
        if let Some(pos) = line.find(&['\r', '\n'][..]) {
            line.truncate(pos);
        }
        self.inner.encode(line, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_classifies_line() {
        let mut codec = TmiCodec::new();
        let mut buf = BytesMut::from("PING :tmi.twitch.tv\r\n");

        let event = codec.decode(&mut buf).unwrap();
        assert_eq!(
            event,
            Some(ServerEvent::Ping {
                token: ":tmi.twitch.tv".to_string()
            })
        );
    }

    #[test]
    fn test_decode_incomplete_line_yields_none() {
        let mut codec = TmiCodec::new();
        let mut buf = BytesMut::from(":tmi.twitch.tv 001");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_decode_invalid_utf8_is_dropped_not_fatal() {
        let mut codec = TmiCodec::new();
        let mut buf = BytesMut::from(&b"bad \xff\xfe bytes\r\nPING :x\r\n"[..]);

        // The offending line decodes as a no-op event, not an error.
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(ServerEvent::Unrecognized)
        );
        // The stream stays usable.
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(ServerEvent::Ping {
                token: ":x".to_string()
            })
        );
    }

    #[test]
    fn test_decode_over_long_line_is_dropped_not_fatal() {
        let mut codec = TmiCodec::new();
        let mut long = vec![b'a'; crate::line::MAX_LINE_LEN + 10];
        long.extend_from_slice(b"\r\nPING :y\r\n");
        let mut buf = BytesMut::from(&long[..]);

        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(ServerEvent::Unrecognized)
        );
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(ServerEvent::Ping {
                token: ":y".to_string()
            })
        );
    }

    #[test]
    fn test_encode_terminates_command() {
        let mut codec = TmiCodec::new();
        let mut buf = BytesMut::new();

        codec
            .encode(Command::Join("shroud".to_string()), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"JOIN #shroud\r\n");
    }

    #[test]
    fn test_encode_truncates_embedded_terminator() {
        let mut codec = TmiCodec::new();
        let mut buf = BytesMut::new();

        codec
            .encode(
                Command::Privmsg("c".to_string(), "hi\r\nJOIN #evil".to_string()),
                &mut buf,
            )
            .unwrap();
        // One wire line only; the injected command never reaches the server.
        assert_eq!(&buf[..], b"PRIVMSG #c :hi\r\n");
    }
}
