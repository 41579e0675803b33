//! Pure line parser for inbound TMI protocol lines.
//!
//! Maps one raw line (terminator already stripped) to a [`ServerEvent`].
//! The parser is stateless and total: malformed or unrelated lines yield
//! [`ServerEvent::Unrecognized`], never an error or a panic.
//!
//! TMI uses a fixed positional layout, so lines are split on single spaces
//! rather than run through a general tokenizer. Tab or doubled-space framing
//! is not tolerated and falls through to `Unrecognized`.

use crate::event::ChatMessage;

/// NOTICE bodies that signal a rejected login, compared case-insensitively.
const AUTH_FAILURE_NOTICES: [&str; 2] =
    ["login authentication failed", "improperly formatted auth"];

/// A single inbound line, classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    /// Server liveness probe. Must be answered with `PONG <token>` before
    /// further lines are processed.
    Ping {
        /// The probe token, echoed verbatim in the reply.
        token: String,
    },
    /// Numeric 001: the server accepted the credentials.
    Welcome,
    /// NOTICE carrying a known authentication-failure body.
    AuthFailure,
    /// A chat line (`PRIVMSG`).
    Chat(ChatMessage),
    /// Anything else. Has no effect on the session.
    Unrecognized,
}

/// Classify one protocol line.
///
/// # Examples
///
/// ```
/// use tmi_client::parse::{parse_line, ServerEvent};
///
/// let event = parse_line("PING :tmi.twitch.tv");
/// assert_eq!(event, ServerEvent::Ping { token: ":tmi.twitch.tv".to_string() });
/// ```
pub fn parse_line(line: &str) -> ServerEvent {
    let split: Vec<&str> = line.split(' ').collect();

    if line.starts_with("PING") {
        return match split.get(1) {
            Some(token) => ServerEvent::Ping {
                token: (*token).to_string(),
            },
            None => ServerEvent::Unrecognized,
        };
    }

    if split.get(1) == Some(&"001") {
        return ServerEvent::Welcome;
    }

    if split.len() > 3 && split[1] == "NOTICE" {
        return parse_notice(line);
    }

    if split.len() > 4 && split[2] == "PRIVMSG" {
        return parse_privmsg(line, &split);
    }

    ServerEvent::Unrecognized
}

/// Classify a NOTICE line by its trailing body.
///
/// The body is everything after the first `:` at or past index 1 (past the
/// leading `:` of the server prefix).
fn parse_notice(line: &str) -> ServerEvent {
    let Some((colon, _)) = line.match_indices(':').find(|(i, _)| *i >= 1) else {
        return ServerEvent::Unrecognized;
    };
    let body = &line[colon + 1..];

    if AUTH_FAILURE_NOTICES
        .iter()
        .any(|phrase| body.eq_ignore_ascii_case(phrase))
    {
        ServerEvent::AuthFailure
    } else {
        ServerEvent::Unrecognized
    }
}

/// Extract a [`ChatMessage`] from a tagged PRIVMSG line.
///
/// Layout: `@<tags> :<user>!<user>@<host> PRIVMSG #<channel> :<text>`.
/// Unknown tag keys are ignored; absent keys leave the field defaults.
fn parse_privmsg(line: &str, split: &[&str]) -> ServerEvent {
    let mut msg = ChatMessage::default();

    for pair in split[0].trim_start_matches('@').split(';') {
        let mut kv = pair.splitn(2, '=');
        let key = kv.next().unwrap_or("");
        let value = kv.next().unwrap_or("");
        match key {
            "display-name" => msg.sender = unescape_tag_value(value),
            "subscriber" => msg.is_subscriber = value == "1",
            "mod" => msg.is_moderator = value == "1",
            _ => {}
        }
    }

    msg.channel = split[3].strip_prefix('#').unwrap_or(split[3]).to_string();

    // The text is whatever follows the first ':' past the channel token.
    // Tokens were split on single spaces, so the byte offset of the trailer
    // is exact.
    let head_len: usize = split[..4].iter().map(|tok| tok.len() + 1).sum();
    let trailing = &line[head_len..];
    let Some(colon) = trailing.find(':') else {
        return ServerEvent::Unrecognized;
    };
    msg.message = trailing[colon + 1..].to_string();

    ServerEvent::Chat(msg)
}

/// Unescape a tag value from wire format.
///
/// Reverses the IRCv3 escaping TMI applies to tag values (`\s` for space,
/// `\:` for semicolon, and so on).
fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        let r = if c == '\\' {
            match iter.next() {
                Some(':') => ';',
                Some('s') => ' ',
                Some('\\') => '\\',
                Some('r') => '\r',
                Some('n') => '\n',
                Some(c) => c,
                None => break,
            }
        } else {
            c
        };
        unescaped.push(r);
    }
    unescaped
}
