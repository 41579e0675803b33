//! # tmi-client
//!
//! An async client for the Twitch Messaging Interface (TMI), the IRC-derived
//! chat protocol served at `irc.chat.twitch.tv`.
//!
//! ## Features
//!
//! - Single persistent connection with `PASS`/`NICK` authentication
//! - Ping/pong liveness handling inside the read loop
//! - Pure, stateless classification of inbound lines into typed events
//! - Channel joins and outbound messages gated on authentication
//! - Multi-subscriber event fan-out via a broadcast channel
//! - Cooperative cancellation, observed at line boundaries
//!
//! ## Quick Start
//!
//! ```no_run
//! use tmi_client::{Client, Config, Event};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> tmi_client::Result<()> {
//! let client = Client::new(Config::new("mybot", "oauth:token"));
//! let mut events = client.subscribe();
//! let cancel = CancellationToken::new();
//!
//! tokio::spawn({
//!     let client = client.clone();
//!     let cancel = cancel.clone();
//!     async move { client.run(cancel).await }
//! });
//!
//! client.join_channel("shroud").await?;
//! client.send_message("shroud", "Hello chat!").await?;
//!
//! while let Ok(event) = events.recv().await {
//!     match event {
//!         Event::Connection { success } => println!("connected: {success}"),
//!         Event::Message(msg) => println!("#{} <{}> {}", msg.channel, msg.sender, msg.message),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Scope
//!
//! Only the handful of commands TMI needs for chat are handled
//! (`PASS`/`NICK`/`PING`/`PONG`/`NOTICE`/`PRIVMSG`/`JOIN`/`CAP`). Rate
//! limiting, reconnection policy, and chat history are out of scope and
//! belong to the caller.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod client;
pub mod codec;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod line;
pub mod parse;

pub use self::client::{Client, ConnectionState};
pub use self::codec::TmiCodec;
pub use self::command::{Command, REQUESTED_CAPS};
pub use self::config::{Config, DEFAULT_HOST, DEFAULT_PORT};
pub use self::error::{ClientError, Result};
pub use self::event::{ChatMessage, Event};
pub use self::line::{LineCodec, MAX_LINE_LEN};
pub use self::parse::{parse_line, ServerEvent};
