//! Outbound wire commands.
//!
//! Each variant serializes to exactly one protocol line via [`Display`];
//! the codec appends the CRLF terminator.
//!
//! [`Display`]: std::fmt::Display

use std::fmt;

/// Capabilities requested when joining a channel: the command and tag
/// metadata streams that carry display names and badge flags.
pub const REQUESTED_CAPS: &str = "twitch.tv/commands twitch.tv/tags";

/// An outbound TMI command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `PASS <token>`. Must be sent before [`Command::Nick`].
    Pass(String),
    /// `NICK <username>`.
    Nick(String),
    /// `PONG <token>`, echoing a `PING` token verbatim.
    Pong(String),
    /// `CAP REQ :<capabilities>`.
    CapReq(String),
    /// `JOIN #<channel>`. The sigil is added during serialization.
    Join(String),
    /// `PRIVMSG #<channel> :<text>`.
    Privmsg(String, String),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Pass(token) => write!(f, "PASS {}", token),
            Command::Nick(username) => write!(f, "NICK {}", username),
            Command::Pong(token) => write!(f, "PONG {}", token),
            Command::CapReq(caps) => write!(f, "CAP REQ :{}", caps),
            Command::Join(channel) => write!(f, "JOIN #{}", channel),
            Command::Privmsg(channel, text) => write!(f, "PRIVMSG #{} :{}", channel, text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_credentials() {
        assert_eq!(
            Command::Pass("oauth:secret".to_string()).to_string(),
            "PASS oauth:secret"
        );
        assert_eq!(Command::Nick("mybot".to_string()).to_string(), "NICK mybot");
    }

    #[test]
    fn test_serialize_pong_echoes_token() {
        assert_eq!(
            Command::Pong(":tmi.twitch.tv".to_string()).to_string(),
            "PONG :tmi.twitch.tv"
        );
    }

    #[test]
    fn test_serialize_cap_req() {
        assert_eq!(
            Command::CapReq(REQUESTED_CAPS.to_string()).to_string(),
            "CAP REQ :twitch.tv/commands twitch.tv/tags"
        );
    }

    #[test]
    fn test_serialize_join_adds_sigil() {
        assert_eq!(
            Command::Join("shroud".to_string()).to_string(),
            "JOIN #shroud"
        );
    }

    #[test]
    fn test_serialize_privmsg() {
        assert_eq!(
            Command::Privmsg("shroud".to_string(), "hello world".to_string()).to_string(),
            "PRIVMSG #shroud :hello world"
        );
    }
}
