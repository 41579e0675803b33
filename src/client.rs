//! Connection session: owns the transport, drives the read loop, and gates
//! outbound operations on authentication.
//!
//! One [`Client`] drives at most one session. [`Client::run`] performs the
//! credential handshake and then consumes inbound lines until cancellation,
//! EOF, a read error, or an authentication failure. [`Client::join_channel`]
//! and [`Client::send_message`] suspend until the server's welcome reply has
//! been observed; the readiness signal, once satisfied, satisfies all current
//! and future waiters and never resets.
//!
//! Concurrent callers of the gated operations have no ordering guarantee
//! relative to each other. Each individual operation is whole-line atomic:
//! all writes, including the loop's own PONG replies, go through a single
//! writer lock.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, watch, Mutex};
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::codec::TmiCodec;
use crate::command::{Command, REQUESTED_CAPS};
use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::event::Event;
use crate::parse::ServerEvent;

/// Capacity of the subscriber broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Lifecycle of a session.
///
/// Transitions are monotonic; `Authenticated` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// Initial state, no transport yet.
    #[default]
    Disconnected,
    /// Transport open, credentials sent, awaiting the numeric welcome.
    Connecting,
    /// Welcome (001) observed; channel and message commands may flow.
    Authenticated,
    /// Authentication rejected, or the transport died before the welcome.
    Failed,
}

type BoxedWriter = FramedWrite<Box<dyn AsyncWrite + Send + Unpin>, TmiCodec>;

struct Shared {
    config: Config,
    /// Single writer serialization point; whole lines only.
    writer: Mutex<Option<BoxedWriter>>,
    state: watch::Sender<ConnectionState>,
    events: broadcast::Sender<Event>,
}

/// An async TMI chat client.
///
/// Cheap to clone; all clones share the same session. Typical use spawns
/// [`Client::run`] on a clone and keeps the original for [`join_channel`]
/// and [`send_message`].
///
/// [`join_channel`]: Client::join_channel
/// [`send_message`]: Client::send_message
#[derive(Clone)]
pub struct Client {
    inner: Arc<Shared>,
}

impl Client {
    /// Create a client for the given configuration. No I/O happens until
    /// [`Client::run`] is called.
    pub fn new(config: Config) -> Self {
        let (state, _) = watch::channel(ConnectionState::default());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Shared {
                config,
                writer: Mutex::new(None),
                state,
                events,
            }),
        }
    }

    /// Current session state.
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Subscribe to session events.
    ///
    /// Each subscriber receives every event emitted from the point of
    /// subscription onward. Slow subscribers that fall more than the channel
    /// capacity behind will observe a lag error from the receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    /// Connect to the configured server and drive the session until it ends.
    ///
    /// The caller owns the task: spawn this (or await it directly) and use
    /// `cancel` to request a cooperative stop. Cancellation is observed once
    /// per line boundary, so a stop request may be delayed by one blocking
    /// read.
    ///
    /// Returning `Ok` means the session ended by cancellation, server EOF,
    /// or authentication failure; `Err` means the transport failed. A
    /// disconnect after authentication is signalled only by this function
    /// returning.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let addr = self.inner.config.addr();
        info!(%addr, "connecting");
        let stream = TcpStream::connect(&addr).await?;
        self.run_on(stream, cancel).await
    }

    /// Drive the session over an already-established stream.
    ///
    /// This is the seam [`Client::run`] uses after dialing TCP; it also
    /// admits TLS streams or in-memory pipes in tests.
    pub async fn run_on<S>(&self, stream: S, cancel: CancellationToken) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let mut reader = FramedRead::new(read_half, TmiCodec::new());

        {
            let mut guard = self.inner.writer.lock().await;
            let mut writer: BoxedWriter = FramedWrite::new(Box::new(write_half), TmiCodec::new());
            // Password first, then nick, both before the first read.
            writer
                .send(Command::Pass(self.inner.config.token.clone()))
                .await?;
            writer
                .send(Command::Nick(self.inner.config.username.clone()))
                .await?;
            *guard = Some(writer);
        }
        self.transition(ConnectionState::Connecting);

        let result = self.read_loop(&mut reader, &cancel).await;

        // A session that never authenticated ends in Failed and reports the
        // failure, unless the caller cancelled it. A post-authentication
        // disconnect emits no event; run() returning is the signal.
        if self.state() == ConnectionState::Connecting && !cancel.is_cancelled() {
            self.transition(ConnectionState::Failed);
            self.emit(Event::Connection { success: false });
        }
        self.inner.writer.lock().await.take();

        result
    }

    async fn read_loop<R>(
        &self,
        reader: &mut FramedRead<R, TmiCodec>,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        loop {
            // Cooperative cancellation, checked once per line boundary.
            if cancel.is_cancelled() {
                info!("session cancelled");
                return Ok(());
            }

            // Undecodable lines surface as Unrecognized from the codec, so
            // any error here means the transport itself failed.
            let event = match reader.next().await {
                Some(Ok(event)) => event,
                Some(Err(e)) => {
                    warn!(error = %e, "read failed");
                    return Err(e);
                }
                None => {
                    info!("server closed the connection");
                    return Ok(());
                }
            };

            match event {
                ServerEvent::Ping { token } => {
                    // Replied before the next line is processed.
                    debug!(%token, "answering ping");
                    self.write(Command::Pong(token)).await?;
                }
                ServerEvent::Welcome => {
                    // Duplicate welcomes are ignored; the connection event
                    // fires at most once.
                    if self.state() == ConnectionState::Connecting {
                        info!("authenticated");
                        self.transition(ConnectionState::Authenticated);
                        self.emit(Event::Connection { success: true });
                    }
                }
                ServerEvent::AuthFailure => {
                    if self.state() == ConnectionState::Connecting {
                        warn!("authentication rejected");
                        self.transition(ConnectionState::Failed);
                        self.emit(Event::Connection { success: false });
                        cancel.cancel();
                        return Ok(());
                    }
                }
                ServerEvent::Chat(msg) => {
                    trace!(channel = %msg.channel, sender = %msg.sender, "chat line");
                    self.emit(Event::Message(msg));
                }
                ServerEvent::Unrecognized => {}
            }
        }
    }

    /// Join a channel, suspending until the session is authenticated.
    ///
    /// Requests the command/tag capabilities and then joins; both lines are
    /// written under one writer hold, so no other caller can interleave
    /// between them. May be called once per channel to join several.
    ///
    /// Fails with [`ClientError::AuthenticationFailed`] once the session has
    /// conclusively failed to authenticate. While the session is still
    /// connecting this waits indefinitely; callers needing a bound should
    /// wrap the call in a timeout.
    pub async fn join_channel(&self, channel: &str) -> Result<()> {
        self.ready().await?;
        debug!(%channel, "joining channel");

        let mut guard = self.inner.writer.lock().await;
        let writer = guard.as_mut().ok_or(ClientError::NotConnected)?;
        writer
            .send(Command::CapReq(REQUESTED_CAPS.to_string()))
            .await?;
        writer.send(Command::Join(channel.to_string())).await?;
        Ok(())
    }

    /// Send a chat message to a channel, suspending until the session is
    /// authenticated.
    ///
    /// No length validation or rate limiting is applied; staying within the
    /// server's limits is the caller's responsibility. The same readiness
    /// semantics as [`Client::join_channel`] apply.
    pub async fn send_message(&self, channel: &str, text: &str) -> Result<()> {
        self.ready().await?;
        self.write(Command::Privmsg(channel.to_string(), text.to_string()))
            .await
    }

    /// Wait until the session reaches a terminal authentication outcome.
    ///
    /// The first transition to `Authenticated` releases all current and
    /// future waiters; the signal never resets.
    async fn ready(&self) -> Result<()> {
        let mut rx = self.inner.state.subscribe();
        let state = *rx
            .wait_for(|s| {
                matches!(
                    s,
                    ConnectionState::Authenticated | ConnectionState::Failed
                )
            })
            .await
            .map_err(|_| ClientError::NotConnected)?;

        match state {
            ConnectionState::Authenticated => Ok(()),
            _ => Err(ClientError::AuthenticationFailed),
        }
    }

    async fn write(&self, command: Command) -> Result<()> {
        let mut guard = self.inner.writer.lock().await;
        let writer = guard.as_mut().ok_or(ClientError::NotConnected)?;
        writer.send(command).await?;
        Ok(())
    }

    fn transition(&self, next: ConnectionState) {
        self.inner.state.send_if_modified(|state| {
            // Terminal states are sticky.
            if matches!(
                *state,
                ConnectionState::Authenticated | ConnectionState::Failed
            ) {
                return false;
            }
            debug!(from = ?state, to = ?next, "state transition");
            *state = next;
            true
        });
    }

    fn emit(&self, event: Event) {
        // No subscribers is not an error.
        let _ = self.inner.events.send(event);
    }
}
