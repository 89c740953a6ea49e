//! Reconnect handshake
//!
//! Opens the candidate transport named by a `session_reconnect` directive
//! and reads exactly one message from it. The handshake succeeds only if
//! that message is a `session_welcome`; the coordinator then commits the
//! swap inside its own read loop. The candidate's welcome is consumed here
//! and never dispatched.

use crate::error::{EventSubError, Result};
use crate::protocol::{decode_message, Message, WelcomeMessage};
use crate::traits::{Connector, Transport, TransportEvent, NORMAL_CLOSURE};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// A candidate transport that has delivered its welcome
pub(crate) struct Candidate {
    pub transport: Box<dyn Transport>,
    pub welcome: WelcomeMessage,
}

pub(crate) type HandshakeOutcome = Result<Candidate>;

/// Run the handshake on its own task; the outcome arrives on the receiver
///
/// If the receiver is gone by the time a candidate is ready, the candidate
/// is closed with a normal closure instead of leaking.
pub(crate) fn spawn_handshake(
    connector: Arc<dyn Connector>,
    url: String,
    welcome_timeout: Duration,
    close_reason: String,
) -> oneshot::Receiver<HandshakeOutcome> {
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let outcome = handshake(connector.as_ref(), &url, welcome_timeout).await;
        if let Err(Ok(mut candidate)) = tx.send(outcome) {
            debug!(url = %url, "Handshake finished after the run ended, closing candidate");
            if let Err(e) = candidate.transport.close(NORMAL_CLOSURE, &close_reason).await {
                debug!(error = %e, "Could not close late candidate");
            }
        }
    });

    rx
}

/// Dial `url` and wait for its welcome, all within `welcome_timeout`
///
/// The deadline covers the dial as well as the first read, so a candidate
/// that never finishes connecting fails like a silent one. Every failure is
/// reported as [`EventSubError::ReconnectFailed`].
pub(crate) async fn handshake(
    connector: &dyn Connector,
    url: &str,
    welcome_timeout: Duration,
) -> HandshakeOutcome {
    info!(url, "Opening candidate connection");
    let deadline = Instant::now() + welcome_timeout;

    let mut transport = match tokio::time::timeout_at(deadline, connector.connect(url)).await {
        Ok(Ok(transport)) => transport,
        Ok(Err(e)) => return Err(EventSubError::ReconnectFailed(e.to_string())),
        Err(_) => {
            let failure = format!("candidate did not connect within {:?}", welcome_timeout);
            warn!(url, reason = %failure, "Reconnect handshake failed");
            return Err(EventSubError::ReconnectFailed(failure));
        }
    };

    let read = tokio::time::timeout_at(deadline, first_welcome(transport.as_mut())).await;
    let failure = match read {
        Ok(Ok(welcome)) => {
            info!(session_id = %welcome.payload.session.id, "Candidate connection welcomed");
            return Ok(Candidate { transport, welcome });
        }
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("no session_welcome within {:?}", welcome_timeout),
    };

    warn!(url, reason = %failure, "Reconnect handshake failed");
    if let Err(e) = transport.close(NORMAL_CLOSURE, "reconnect handshake failed").await {
        debug!(error = %e, "Could not close rejected candidate");
    }

    Err(EventSubError::ReconnectFailed(failure))
}

async fn first_welcome(transport: &mut dyn Transport) -> Result<WelcomeMessage> {
    match transport.recv().await? {
        TransportEvent::Message(message) => match decode_message(message.as_bytes())? {
            Message::Welcome(welcome) => Ok(welcome),
            other => Err(EventSubError::Decode(format!(
                "expected session_welcome as first message, got {}",
                other.kind().tag()
            ))),
        },
        TransportEvent::Closed { code, reason } => Err(EventSubError::ConnectionClosed(format!(
            "candidate closed before welcome ({}: {})",
            code, reason
        ))),
    }
}
