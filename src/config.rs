//! Client configuration.

/// Default TMI endpoint host.
pub const DEFAULT_HOST: &str = "irc.chat.twitch.tv";

/// Default TMI endpoint port (plain TCP).
pub const DEFAULT_PORT: u16 = 6667;

/// Connection settings for a chat session.
///
/// Credentials are supplied once at construction and never change for the
/// lifetime of the session.
#[derive(Clone, Debug)]
pub struct Config {
    /// Twitch login name, sent as `NICK`.
    pub username: String,
    /// OAuth token (including the `oauth:` prefix), sent as `PASS`.
    pub token: String,
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Config {
    /// Create a configuration for the default TMI endpoint.
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    /// Override the server endpoint.
    #[must_use]
    pub fn with_server(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub(crate) fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
