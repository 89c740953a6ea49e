//! Transport seam
//!
//! The client never touches sockets directly. It reads whole messages from a
//! [`Transport`] and opens new ones through a [`Connector`], which keeps the
//! lifecycle code independent of WebSocket framing and TLS.

use crate::error::{EventSubError, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

/// WebSocket close code for a normal closure
pub const NORMAL_CLOSURE: u16 = 1000;

/// Close code reported when the peer sent a close frame without a code
pub const NO_STATUS_RECEIVED: u16 = 1005;

/// Type alias for WebSocket data messages
/// Can be Text or Binary data
#[derive(Debug, Clone)]
pub enum WsMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl WsMessage {
    /// Raw bytes of the message, regardless of frame kind
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            WsMessage::Text(s) => s.as_bytes(),
            WsMessage::Binary(b) => b,
        }
    }

    /// Get the message as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WsMessage::Text(s) => Some(s),
            WsMessage::Binary(_) => None,
        }
    }
}

/// One observation from a transport read
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A complete data message
    Message(WsMessage),
    /// The peer closed the connection with this code
    Closed { code: u16, reason: String },
}

impl TransportEvent {
    /// True for a close with [`NORMAL_CLOSURE`]
    pub fn is_normal_closure(&self) -> bool {
        matches!(self, TransportEvent::Closed { code, .. } if *code == NORMAL_CLOSURE)
    }
}

/// A single open connection that yields whole messages
///
/// Control frames (ping/pong) are the transport's business and never surface
/// through [`Transport::recv`].
#[async_trait]
pub trait Transport: Send {
    /// Read the next data message or close notification
    ///
    /// Returns `Err` for any failure below the message level, including the
    /// stream ending without a close handshake.
    async fn recv(&mut self) -> Result<TransportEvent>;

    /// Send a close frame with the given code
    ///
    /// Closing an already-closed transport is not an error.
    async fn close(&mut self, code: u16, reason: &str) -> Result<()>;
}

/// Opens transports to a URL
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>>;
}

/// [`Transport`] backed by a tokio-tungstenite stream
pub struct TungsteniteTransport {
    stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

impl TungsteniteTransport {
    pub fn new(stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl Transport for TungsteniteTransport {
    async fn recv(&mut self) -> Result<TransportEvent> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(TransportEvent::Message(WsMessage::Text(text)))
                }
                Some(Ok(Message::Binary(data))) => {
                    return Ok(TransportEvent::Message(WsMessage::Binary(data)))
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = match frame {
                        Some(frame) => (u16::from(frame.code), frame.reason.into_owned()),
                        None => (NO_STATUS_RECEIVED, String::new()),
                    };
                    debug!(code, %reason, "Peer closed connection");
                    return Ok(TransportEvent::Closed { code, reason });
                }
                // Pongs are queued by tungstenite and flushed on the next read
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(EventSubError::Transport(e.to_string())),
                None => {
                    return Err(EventSubError::ConnectionClosed(
                        "stream ended without close frame".into(),
                    ))
                }
            }
        }
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<()> {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_owned().into(),
        };

        match self.stream.close(Some(frame)).await {
            Ok(()) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed) | Err(tungstenite::Error::AlreadyClosed) => {
                Ok(())
            }
            Err(e) => Err(EventSubError::Transport(format!(
                "could not close websocket connection: {}",
                e
            ))),
        }
    }
}

/// Default [`Connector`] dialing with tokio-tungstenite
#[derive(Debug, Clone, Default)]
pub struct TungsteniteConnector;

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>> {
        let (stream, _) = connect_async(url).await.map_err(|e| EventSubError::Connect {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        debug!(url, "Transport opened");
        Ok(Box::new(TungsteniteTransport::new(stream)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_closure_detection() {
        let normal = TransportEvent::Closed {
            code: NORMAL_CLOSURE,
            reason: String::new(),
        };
        let going_away = TransportEvent::Closed {
            code: 1001,
            reason: "going away".into(),
        };
        let message = TransportEvent::Message(WsMessage::Text("{}".into()));

        assert!(normal.is_normal_closure());
        assert!(!going_away.is_normal_closure());
        assert!(!message.is_normal_closure());
    }

    #[test]
    fn test_message_bytes() {
        assert_eq!(WsMessage::Text("abc".into()).as_bytes(), b"abc");
        assert_eq!(WsMessage::Binary(vec![1, 2]).as_bytes(), &[1, 2]);
        assert_eq!(WsMessage::Binary(vec![1]).as_text(), None);
    }
}
