//! Events fanned out to session subscribers.

/// A single chat message received from a joined channel.
///
/// Messages carry no identity beyond their fields; no deduplication is
/// performed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatMessage {
    /// Display name of the user who sent the message.
    ///
    /// Empty when the server omits the `display-name` tag.
    pub sender: String,
    /// The message text.
    pub message: String,
    /// Channel the message was sent to, without the `#` sigil.
    pub channel: String,
    /// Whether the sender is subscribed to the channel.
    pub is_subscriber: bool,
    /// Whether the sender is a moderator of the channel.
    pub is_moderator: bool,
}

/// Events delivered to subscribers of a [`Client`](crate::Client).
///
/// Subscribers receive events from the point of subscription onward.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Outcome of the connection attempt. Fired at most once per session:
    /// `success = true` once the server's welcome reply is observed,
    /// `success = false` when authentication is rejected or the transport
    /// fails before authenticating.
    Connection {
        /// Whether the session reached the authenticated state.
        success: bool,
    },
    /// An inbound chat line. Fired any number of times.
    Message(ChatMessage),
}
