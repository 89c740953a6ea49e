use super::config::ClientConfig;
use super::connection_state::{AtomicConnectionState, ConnectionState};
use super::dispatcher::{Dispatcher, Routed};
use super::handlers::HandlerTable;
use super::reconnect::{spawn_handshake, HandshakeOutcome};
use crate::error::{EventSubError, Result};
use crate::protocol::{ReconnectMessage, Session};
use crate::traits::{Connector, Transport, TransportEvent, TungsteniteConnector, NORMAL_CLOSURE};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// EventSub WebSocket client
///
/// Owns one transport of record and a single read loop. Frames are read and
/// routed strictly in arrival order; handlers run concurrently on the
/// blocking pool. A `session_reconnect` directive opens a candidate
/// transport next to the current one and swaps over once the candidate has
/// sent its welcome, so the caller never sees a gap.
///
/// ```no_run
/// use eventsub::{ClientConfig, EventSubClient, HandlerTable};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> eventsub::Result<()> {
/// let handlers = HandlerTable::new()
///     .on_welcome(|welcome| println!("session {}", welcome.payload.session.id))
///     .on_channel_follow(|follow, _| println!("{} followed", follow.user_name));
///
/// let client = EventSubClient::new(ClientConfig::default(), handlers);
/// client.run(CancellationToken::new()).await
/// # }
/// ```
pub struct EventSubClient {
    config: ClientConfig,
    dispatcher: Dispatcher,
    connector: Arc<dyn Connector>,
    state: AtomicConnectionState,
    session: RwLock<Option<Session>>,
    close_requested: AtomicBool,
    close_notify: Notify,
}

impl EventSubClient {
    /// Client dialing with tokio-tungstenite
    pub fn new(config: ClientConfig, handlers: HandlerTable) -> Self {
        Self::with_connector(config, handlers, Arc::new(TungsteniteConnector))
    }

    /// Client dialing through a custom [`Connector`]
    pub fn with_connector(
        config: ClientConfig,
        handlers: HandlerTable,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::new(Arc::new(handlers)),
            connector,
            state: AtomicConnectionState::new(ConnectionState::Disconnected),
            session: RwLock::new(None),
            close_requested: AtomicBool::new(false),
            close_notify: Notify::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Session of the transport of record, once welcomed
    pub fn session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    /// Connect and read until closed, cancelled or a fatal error
    ///
    /// Non-fatal errors go to the error handler and never end the run.
    /// Returns `Ok(())` after [`EventSubClient::close`], after `cancel`
    /// fires, and when the server closes the connection normally.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        if !self.dispatcher.handlers().has_welcome_handler() {
            return Err(EventSubError::MissingWelcomeHandler);
        }
        self.config.validate()?;

        if !self
            .state
            .transition(ConnectionState::Disconnected, ConnectionState::Connecting)
        {
            return Err(EventSubError::InvalidState(format!(
                "run requires a fresh client, state is {:?}",
                self.state.get()
            )));
        }

        let result = self.run_connection(cancel).await;
        self.state.set(ConnectionState::Closed);

        match &result {
            Ok(()) => info!("EventSub client stopped"),
            Err(e) => error!(error = %e, "EventSub client stopped with error"),
        }
        result
    }

    /// Ask the running loop to close the transport with a normal closure
    ///
    /// Idempotent: a second call, or a call on a client that is not
    /// running, is a no-op.
    pub fn close(&self) -> Result<()> {
        if !self.state.get().is_running() {
            debug!(state = ?self.state.get(), "Close requested on idle client, ignoring");
            return Ok(());
        }
        if self.close_requested.swap(true, Ordering::AcqRel) {
            debug!("Close already requested");
            return Ok(());
        }

        info!("Closing EventSub client");
        self.close_notify.notify_one();
        Ok(())
    }

    async fn run_connection(&self, cancel: CancellationToken) -> Result<()> {
        info!(url = %self.config.url, "Connecting to EventSub");

        let mut current = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Cancelled before the connection opened");
                return Ok(());
            }
            opened = self.connector.connect(&self.config.url) => opened?,
        };

        info!(url = %self.config.url, "Connected to EventSub");
        self.state.set(ConnectionState::Active);

        let mut pending: Option<oneshot::Receiver<HandshakeOutcome>> = None;
        // Old transport closed normally while a handshake was still running
        let mut current_closed = false;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!("Run cancelled");
                    if !current_closed {
                        self.close_transport(current.as_mut()).await;
                    }
                    return Ok(());
                }

                _ = self.close_notify.notified() => {
                    if !current_closed {
                        self.close_transport(current.as_mut()).await;
                    }
                    return Ok(());
                }

                outcome = next_handshake(&mut pending), if pending.is_some() => {
                    pending = None;
                    match outcome {
                        Ok(candidate) => {
                            let old = std::mem::replace(&mut current, candidate.transport);
                            if !current_closed {
                                self.retire(old);
                            }
                            current_closed = false;

                            let session = candidate.welcome.payload.session;
                            info!(session_id = %session.id, "Switched to reconnected session");
                            *self.session.write() = Some(session);
                            self.state.set(ConnectionState::Active);
                        }
                        Err(e) if current_closed => {
                            return Err(EventSubError::ConnectionClosed(format!(
                                "connection closed and reconnect failed: {}",
                                e
                            )));
                        }
                        Err(e) => {
                            self.state.set(ConnectionState::Active);
                            self.dispatcher.report(e);
                        }
                    }
                }

                event = current.recv(), if !current_closed => {
                    match event? {
                        TransportEvent::Message(message) => {
                            match self.dispatcher.dispatch(message.as_bytes()) {
                                Routed::Continue => {}
                                Routed::Welcome(session) => {
                                    info!(
                                        session_id = %session.id,
                                        keepalive_timeout_seconds = ?session.keepalive_timeout_seconds,
                                        "Session welcomed"
                                    );
                                    *self.session.write() = Some(session);
                                }
                                Routed::Reconnect(directive) => {
                                    self.begin_reconnect(&directive, &mut pending);
                                }
                            }
                        }
                        TransportEvent::Closed { code, reason } if code == NORMAL_CLOSURE => {
                            if pending.is_none() {
                                info!(%reason, "Server closed the connection");
                                return Ok(());
                            }
                            info!(%reason, "Old connection closed, waiting for the candidate");
                            current_closed = true;
                        }
                        TransportEvent::Closed { code, reason } => {
                            return Err(EventSubError::ConnectionClosed(format!(
                                "server closed the connection with code {} ({})",
                                code, reason
                            )));
                        }
                    }
                }
            }
        }
    }

    fn begin_reconnect(
        &self,
        directive: &ReconnectMessage,
        pending: &mut Option<oneshot::Receiver<HandshakeOutcome>>,
    ) {
        let Some(url) = directive.reconnect_url() else {
            self.dispatcher.report(EventSubError::ReconnectFailed(
                "session_reconnect carried no reconnect_url".into(),
            ));
            return;
        };

        if pending.is_some() {
            warn!(url, "Reconnect already in progress, ignoring directive");
            return;
        }

        if let Some(session) = self.session.write().as_mut() {
            session.reconnect_url = Some(url.to_string());
        }

        info!(url, "Reconnect requested");
        self.state.set(ConnectionState::Reconnecting);
        *pending = Some(spawn_handshake(
            Arc::clone(&self.connector),
            url.to_string(),
            self.config.reconnect_welcome_timeout,
            self.config.close_reason.clone(),
        ));
    }

    async fn close_transport(&self, transport: &mut dyn Transport) {
        debug!("Closing transport with normal closure");
        if let Err(e) = transport.close(NORMAL_CLOSURE, &self.config.close_reason).await {
            warn!(error = %e, "Could not close transport cleanly");
        }
    }

    /// Close a replaced transport without holding up the read loop
    fn retire(&self, mut old: Box<dyn Transport>) {
        let reason = self.config.close_reason.clone();
        tokio::spawn(async move {
            if let Err(e) = old.close(NORMAL_CLOSURE, &reason).await {
                warn!(error = %e, "Could not close replaced transport");
            }
        });
    }
}

async fn next_handshake(pending: &mut Option<oneshot::Receiver<HandshakeOutcome>>) -> HandshakeOutcome {
    match pending {
        Some(rx) => rx.await.unwrap_or_else(|_| {
            Err(EventSubError::ReconnectFailed(
                "handshake task ended without an outcome".into(),
            ))
        }),
        None => std::future::pending().await,
    }
}
