//! The client handle: connection lifecycle, authentication gating, and
//! request/acknowledgment correlation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use foreman_protocol::{
    Codec, Command, JsonCodec, LineEvent, LoginEvent, LogoutEvent,
    OfflineEvent, OnlineEvent, ProtocolError, RconRunningEvent, Request,
    RequestId, ServerFrame, ServerStatus, StartingEvent, StatusEvent,
    StoppingEvent, WhitelistAction, WhitelistEntry, AUTH_OK,
};
use foreman_transport::{Link, WebSocketLink};
use serde_json::Value;
use tokio::sync::{oneshot, watch, Mutex};

use crate::events::EventHandlers;
use crate::{ClientConfig, ClientError, ConnectionState};

/// A settled acknowledgment as delivered by the supervisor.
#[derive(Debug)]
struct Ack {
    result: Value,
    error: Option<String>,
}

/// Outcome of a whitelist operation; the shape depends on the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhitelistReply {
    /// The current entries, for [`WhitelistAction::List`].
    Entries(Vec<WhitelistEntry>),
    /// Whether an add/remove took effect.
    Changed(bool),
}

/// State shared between the public handle, the connect task, and the
/// reader task.
struct Shared<L: Link> {
    config: ClientConfig,
    codec: JsonCodec,
    /// Lifecycle state. A watch sender gives atomic check-and-set for the
    /// connect gate and lock-free reads for the public accessors.
    state: watch::Sender<ConnectionState>,
    /// The live link, if any. Cleared by the reader on link loss.
    link: Mutex<Option<Arc<L>>>,
    /// In-flight requests awaiting their acknowledgment, keyed by
    /// correlation token. Slots survive a disconnect: a request that was
    /// in flight when the link died never settles.
    pending: Mutex<HashMap<RequestId, oneshot::Sender<Ack>>>,
    handlers: Mutex<EventHandlers>,
    next_id: AtomicU64,
}

/// Client handle for one supervising server.
///
/// Cheap to clone; all clones share one logical connection. Construction
/// does not dial; nothing touches the network until [`connect`] is
/// called.
///
/// [`connect`]: ForemanClient::connect
pub struct ForemanClient<L: Link = WebSocketLink> {
    shared: Arc<Shared<L>>,
}

impl<L: Link> Clone for ForemanClient<L> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<L: Link> ForemanClient<L> {
    /// Creates a new, disconnected client.
    pub fn new(config: ClientConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            shared: Arc::new(Shared {
                config,
                codec: JsonCodec,
                state,
                link: Mutex::new(None),
                pending: Mutex::new(HashMap::new()),
                handlers: Mutex::new(EventHandlers::default()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// The configured display name.
    pub fn name(&self) -> &str {
        &self.shared.config.name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    /// True while the client holds a valid authenticated session.
    pub fn ready(&self) -> bool {
        self.state().is_ready()
    }

    // -----------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------

    /// Instructs the transport to open the connection.
    ///
    /// Non-blocking: the outcome is reported through the `connect`
    /// lifecycle callback, which receives no error once the automatic
    /// credential handshake is accepted and the failure reason otherwise.
    /// Ignored while a dial, handshake, or live session is already in
    /// progress.
    pub fn connect(&self) {
        let started = self.shared.state.send_if_modified(|s| {
            if *s == ConnectionState::Disconnected {
                *s = ConnectionState::Connecting;
                true
            } else {
                false
            }
        });
        if !started {
            tracing::debug!(state = %self.state(), "connect ignored");
            return;
        }

        let client = self.clone();
        tokio::spawn(async move { client.run_connect().await });
    }

    /// Closes the link, if one is up.
    ///
    /// The `disconnect` lifecycle callback fires once the reader observes
    /// the close. Calling this while disconnected is a no-op.
    pub async fn disconnect(&self) -> Result<(), ClientError> {
        let link = self.shared.link.lock().await.clone();
        match link {
            Some(link) => Ok(link.close().await?),
            None => Ok(()),
        }
    }

    async fn run_connect(self) {
        tracing::info!(endpoint = %self.shared.config.endpoint, "connecting");

        let link = match L::connect(&self.shared.config.endpoint).await {
            Ok(link) => Arc::new(link),
            Err(e) => {
                tracing::info!(error = %e, "dial failed");
                self.shared
                    .state
                    .send_replace(ConnectionState::Disconnected);
                let reason = e.to_string();
                self.shared.handlers.lock().await.fire_connect(Some(&reason));
                return;
            }
        };

        *self.shared.link.lock().await = Some(Arc::clone(&link));
        self.shared
            .state
            .send_replace(ConnectionState::Authenticating);

        // The reader must be running before the handshake: it routes the
        // handshake's own acknowledgment.
        let reader = self.clone();
        let reader_link = Arc::clone(&link);
        tokio::spawn(async move { reader.read_loop(reader_link).await });

        match self.authenticate().await {
            Ok(()) => {
                tracing::info!(name = %self.shared.config.name, "session ready");
                self.shared.handlers.lock().await.fire_connect(None);
            }
            Err(e) => {
                tracing::info!(error = %e, "authentication rejected");
                let reason = e.to_string();
                self.shared.handlers.lock().await.fire_connect(Some(&reason));
            }
        }
    }

    async fn read_loop(self, link: Arc<L>) {
        loop {
            match link.recv().await {
                Ok(Some(data)) => self.route_frame(&data).await,
                Ok(None) => {
                    tracing::info!("link closed by peer");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "link read failed");
                    break;
                }
            }
        }
        self.finish_disconnect().await;
    }

    async fn route_frame(&self, data: &[u8]) {
        let frame: ServerFrame = match self.shared.codec.decode(data) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, "failed to decode frame");
                return;
            }
        };

        match frame {
            ServerFrame::Ack { id, result, error } => {
                match self.shared.pending.lock().await.remove(&id) {
                    Some(slot) => {
                        // A dropped receiver means the caller abandoned the
                        // whole handle; nothing to do.
                        let _ = slot.send(Ack { result, error });
                    }
                    None => {
                        tracing::debug!(%id, "acknowledgment for unknown request");
                    }
                }
            }
            ServerFrame::Event {
                server_id,
                name,
                data,
            } => {
                self.shared
                    .handlers
                    .lock()
                    .await
                    .dispatch(&server_id, &name, &data);
            }
        }
    }

    async fn finish_disconnect(&self) {
        *self.shared.link.lock().await = None;
        self.shared
            .state
            .send_replace(ConnectionState::Disconnected);
        // Pending slots stay in place: a request that was in flight when
        // the link died never settles.
        self.shared.handlers.lock().await.fire_disconnect();
    }

    // -----------------------------------------------------------------
    // Authentication
    // -----------------------------------------------------------------

    /// Performs the credential handshake.
    ///
    /// Runs once per command on purpose: one extra round trip buys the
    /// guarantee that no command is ever sent on a stale session. Safe to
    /// run concurrently: the supervisor treats repeated handshakes for
    /// one identity as idempotent, and the readiness flag reflects the
    /// most recently settled outcome.
    async fn authenticate(&self) -> Result<(), ClientError> {
        let ack = self
            .request(Command::Authenticate {
                name: self.shared.config.name.clone(),
                key: self.shared.config.key.clone(),
            })
            .await?;

        if let Some(reason) = ack.error.filter(|e| !e.is_empty()) {
            self.shared.state.send_replace(ConnectionState::AuthFailed);
            return Err(ClientError::Auth(reason));
        }

        // Only the exact sentinel counts; a merely truthy reply is a
        // refusal whose raw value is the reason.
        if ack.result.as_str() == Some(AUTH_OK) {
            self.shared.state.send_replace(ConnectionState::Ready);
            Ok(())
        } else {
            self.shared.state.send_replace(ConnectionState::AuthFailed);
            let reason = match ack.result.as_str() {
                Some(s) => s.to_string(),
                None => ack.result.to_string(),
            };
            Err(ClientError::Auth(reason))
        }
    }

    // -----------------------------------------------------------------
    // Request correlation
    // -----------------------------------------------------------------

    /// Emits one frame and converts its single-shot acknowledgment into a
    /// future. Exactly one settlement per request; a request the
    /// supervisor never acknowledges pends forever. There is no timeout,
    /// retry, or cancellation.
    async fn request(&self, command: Command) -> Result<Ack, ClientError> {
        let link = self
            .shared
            .link
            .lock()
            .await
            .clone()
            .ok_or(ClientError::NotConnected)?;

        let id = RequestId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = oneshot::channel();
        self.shared.pending.lock().await.insert(id, tx);

        let frame = self.shared.codec.encode(&Request { id, command })?;
        if let Err(e) = link.send(&frame).await {
            // The frame never left; settle the slot by removing it.
            self.shared.pending.lock().await.remove(&id);
            return Err(e.into());
        }

        rx.await.map_err(|_| ClientError::AckDropped)
    }

    /// Emits a command and applies the acknowledgment error policy: a
    /// non-empty error always rejects, whatever the result value says.
    async fn settle(&self, command: Command) -> Result<Value, ClientError> {
        let ack = self.request(command).await?;
        match ack.error.filter(|e| !e.is_empty()) {
            Some(error) => Err(ClientError::Command(error)),
            None => Ok(ack.result),
        }
    }

    /// The full per-command protocol: re-authenticate, emit, decode.
    async fn command<T: serde::de::DeserializeOwned>(
        &self,
        command: Command,
    ) -> Result<T, ClientError> {
        self.authenticate().await?;
        let value = self.settle(command).await?;
        Ok(serde_json::from_value(value).map_err(ProtocolError::Decode)?)
    }

    // -----------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------

    /// Starts the given server. Resolves to whether the process was
    /// started.
    pub async fn start(&self, server_id: &str) -> Result<bool, ClientError> {
        self.command(Command::Start {
            server_id: server_id.into(),
        })
        .await
    }

    /// Stops the given server. Resolves to whether the process was
    /// stopped.
    pub async fn stop(&self, server_id: &str) -> Result<bool, ClientError> {
        self.command(Command::Stop {
            server_id: server_id.into(),
        })
        .await
    }

    /// Feeds one line to the server console. Resolves to whether the
    /// line was accepted.
    pub async fn console(
        &self,
        server_id: &str,
        line: &str,
    ) -> Result<bool, ClientError> {
        self.command(Command::Console {
            server_id: server_id.into(),
            line: line.into(),
        })
        .await
    }

    /// Names of the players currently online, in the supervisor's order.
    pub async fn online_players(
        &self,
        server_id: &str,
    ) -> Result<Vec<String>, ClientError> {
        self.command(Command::OnlinePlayers {
            server_id: server_id.into(),
        })
        .await
    }

    /// The server's current lifecycle status.
    pub async fn status(
        &self,
        server_id: &str,
    ) -> Result<ServerStatus, ClientError> {
        self.command(Command::Status {
            server_id: server_id.into(),
        })
        .await
    }

    /// Queries or mutates the server's whitelist. `List` resolves to the
    /// entries; `Add`/`Remove` resolve to whether the change took effect.
    pub async fn whitelist(
        &self,
        server_id: &str,
        action: WhitelistAction,
    ) -> Result<WhitelistReply, ClientError> {
        let listing = matches!(action, WhitelistAction::List);
        self.authenticate().await?;
        let value = self
            .settle(Command::Whitelist {
                server_id: server_id.into(),
                action,
            })
            .await?;

        if listing {
            let entries =
                serde_json::from_value(value).map_err(ProtocolError::Decode)?;
            Ok(WhitelistReply::Entries(entries))
        } else {
            let changed =
                serde_json::from_value(value).map_err(ProtocolError::Decode)?;
            Ok(WhitelistReply::Changed(changed))
        }
    }

    // -----------------------------------------------------------------
    // Event subscriptions
    // -----------------------------------------------------------------

    /// Replaces the `connect` lifecycle subscriber. The callback receives
    /// the failure reason, or `None` when the session came up.
    pub async fn on_connect(&self, f: impl FnMut(Option<&str>) + Send + 'static) {
        self.shared.handlers.lock().await.connect = Box::new(f);
    }

    /// Replaces the `disconnect` lifecycle subscriber.
    pub async fn on_disconnect(&self, f: impl FnMut() + Send + 'static) {
        self.shared.handlers.lock().await.disconnect = Box::new(f);
    }

    /// Replaces the `status` subscriber.
    pub async fn on_status(
        &self,
        f: impl FnMut(&str, StatusEvent) + Send + 'static,
    ) {
        self.shared.handlers.lock().await.status = Some(Box::new(f));
    }

    /// Replaces the `starting` subscriber.
    pub async fn on_starting(
        &self,
        f: impl FnMut(&str, StartingEvent) + Send + 'static,
    ) {
        self.shared.handlers.lock().await.starting = Some(Box::new(f));
    }

    /// Replaces the `online` subscriber.
    pub async fn on_online(
        &self,
        f: impl FnMut(&str, OnlineEvent) + Send + 'static,
    ) {
        self.shared.handlers.lock().await.online = Some(Box::new(f));
    }

    /// Replaces the `stopping` subscriber.
    pub async fn on_stopping(
        &self,
        f: impl FnMut(&str, StoppingEvent) + Send + 'static,
    ) {
        self.shared.handlers.lock().await.stopping = Some(Box::new(f));
    }

    /// Replaces the `offline` subscriber.
    pub async fn on_offline(
        &self,
        f: impl FnMut(&str, OfflineEvent) + Send + 'static,
    ) {
        self.shared.handlers.lock().await.offline = Some(Box::new(f));
    }

    /// Replaces the `login` subscriber.
    pub async fn on_login(
        &self,
        f: impl FnMut(&str, LoginEvent) + Send + 'static,
    ) {
        self.shared.handlers.lock().await.login = Some(Box::new(f));
    }

    /// Replaces the `logout` subscriber.
    pub async fn on_logout(
        &self,
        f: impl FnMut(&str, LogoutEvent) + Send + 'static,
    ) {
        self.shared.handlers.lock().await.logout = Some(Box::new(f));
    }

    /// Replaces the `line` subscriber.
    pub async fn on_line(
        &self,
        f: impl FnMut(&str, LineEvent) + Send + 'static,
    ) {
        self.shared.handlers.lock().await.line = Some(Box::new(f));
    }

    /// Replaces the `rconRunning` subscriber.
    pub async fn on_rcon_running(
        &self,
        f: impl FnMut(&str, RconRunningEvent) + Send + 'static,
    ) {
        self.shared.handlers.lock().await.rcon_running = Some(Box::new(f));
    }

    /// Replaces the catch-all subscriber. It receives the server
    /// identifier, the raw event name, and the raw payload for every
    /// pushed event that has no dedicated subscriber.
    pub async fn on_any(
        &self,
        f: impl FnMut(&str, &str, &Value) + Send + 'static,
    ) {
        self.shared.handlers.lock().await.any = Some(Box::new(f));
    }
}
