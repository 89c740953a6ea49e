//! Common test utilities for EventSub integration tests
//!
//! A scripted mock EventSub server: each request path gets its own script of
//! frames, and every close frame the client sends back is recorded.

#![allow(dead_code)]

use eventsub::{ClientConfig, EventSubClient, HandlerTable};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// One server action on a connection
#[derive(Debug, Clone)]
pub enum Step {
    /// Send a text frame; `{base}` is replaced with the server's ws:// URL
    Send(String),
    Sleep(Duration),
    /// Send a close frame with this code and stop the script
    Close(u16),
    /// Drop the TCP connection without a close handshake
    Drop,
}

/// Scripted mock EventSub server
pub struct MockEventSubServer {
    pub addr: SocketAddr,
    closes: Arc<Mutex<Vec<(String, u16)>>>,
    accepted: Arc<Mutex<Vec<String>>>,
    shutdown: Arc<Notify>,
}

impl MockEventSubServer {
    /// Start a server serving `scripts`, keyed by request path
    ///
    /// Paths without a script get an open connection that sends nothing.
    pub async fn start(scripts: Vec<(&str, Vec<Step>)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base = format!("ws://{}", addr);

        let scripts: Arc<HashMap<String, Vec<Step>>> = Arc::new(
            scripts
                .into_iter()
                .map(|(path, steps)| (path.to_string(), steps))
                .collect(),
        );
        let closes = Arc::new(Mutex::new(Vec::new()));
        let accepted = Arc::new(Mutex::new(Vec::new()));
        let shutdown = Arc::new(Notify::new());

        {
            let closes = Arc::clone(&closes);
            let accepted = Arc::clone(&accepted);
            let shutdown = Arc::clone(&shutdown);

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        result = listener.accept() => {
                            match result {
                                Ok((stream, _)) => {
                                    let connection = Connection {
                                        base: base.clone(),
                                        scripts: Arc::clone(&scripts),
                                        closes: Arc::clone(&closes),
                                        accepted: Arc::clone(&accepted),
                                    };
                                    tokio::spawn(connection.serve(stream));
                                }
                                Err(e) => {
                                    eprintln!("Accept error: {}", e);
                                    break;
                                }
                            }
                        }
                        _ = shutdown.notified() => {
                            break;
                        }
                    }
                }
            });
        }

        Self {
            addr,
            closes,
            accepted,
            shutdown,
        }
    }

    /// URL of `path` on this server
    pub fn url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    /// Close codes received from the client, per path
    pub fn closes(&self) -> Vec<(String, u16)> {
        self.closes.lock().clone()
    }

    /// Paths that completed a WebSocket handshake, in order
    pub fn accepted(&self) -> Vec<String> {
        self.accepted.lock().clone()
    }

    /// Wait until the client has sent a close frame on `path`
    pub async fn wait_for_close(&self, path: &str) -> Option<u16> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
        while tokio::time::Instant::now() < deadline {
            if let Some((_, code)) = self.closes().into_iter().find(|(p, _)| p == path) {
                return Some(code);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        None
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockEventSubServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Connection {
    base: String,
    scripts: Arc<HashMap<String, Vec<Step>>>,
    closes: Arc<Mutex<Vec<(String, u16)>>>,
    accepted: Arc<Mutex<Vec<String>>>,
}

impl Connection {
    async fn serve(self, stream: tokio::net::TcpStream) {
        let mut path = String::new();
        let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            path = request.uri().path().to_string();
            Ok(response)
        };

        let ws_stream = match tokio_tungstenite::accept_hdr_async(stream, callback).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };
        self.accepted.lock().push(path.clone());

        let (mut write, mut read) = ws_stream.split();
        let steps = self.scripts.get(&path).cloned().unwrap_or_default();

        for step in steps {
            match step {
                Step::Send(text) => {
                    let text = text.replace("{base}", &self.base);
                    if write.send(Message::Text(text)).await.is_err() {
                        return;
                    }
                }
                Step::Sleep(duration) => tokio::time::sleep(duration).await,
                Step::Close(code) => {
                    let frame = CloseFrame {
                        code: CloseCode::from(code),
                        reason: "scripted close".into(),
                    };
                    let _ = write.send(Message::Close(Some(frame))).await;
                    // Let tungstenite finish the close handshake
                    while let Some(Ok(_)) = read.next().await {}
                    return;
                }
                Step::Drop => return,
            }
        }

        // Script done: keep the connection open and record how the client leaves
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Close(frame)) => {
                    let code = frame.map(|f| u16::from(f.code)).unwrap_or(1005);
                    self.closes.lock().push((path.clone(), code));
                    break;
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    }
}

/// Frame builders for the EventSub wire format
pub mod frames {
    pub fn welcome(session_id: &str) -> String {
        format!(
            r#"{{"metadata":{{"message_id":"welcome-{0}","message_type":"session_welcome","message_timestamp":"2023-07-19T14:56:51.634234626Z"}},"payload":{{"session":{{"id":"{0}","status":"connected","connected_at":"2023-07-19T14:56:51.616329898Z","keepalive_timeout_seconds":10,"reconnect_url":null,"recovery_url":null}}}}}}"#,
            session_id
        )
    }

    pub fn keepalive(message_id: &str) -> String {
        format!(
            r#"{{"metadata":{{"message_id":"{}","message_type":"session_keepalive","message_timestamp":"2023-07-19T10:11:12.634234626Z"}},"payload":{{}}}}"#,
            message_id
        )
    }

    pub fn notification(message_id: &str, subscription_type: &str, version: &str, event: &str) -> String {
        format!(
            r#"{{"metadata":{{"message_id":"{0}","message_type":"notification","message_timestamp":"2023-07-19T10:11:12.634234626Z","subscription_type":"{1}","subscription_version":"{2}"}},"payload":{{"subscription":{{"id":"f1c2a387-161a-49f9-a165-0f21d7a4e1c4","status":"enabled","type":"{1}","version":"{2}","cost":0,"condition":{{"broadcaster_user_id":"1337"}},"transport":{{"method":"websocket","session_id":"AQoQexAWVYKSTIu4ec_2VAxyuhAB"}},"created_at":"2023-07-19T14:56:51.634234626Z"}},"event":{3}}}}}"#,
            message_id, subscription_type, version, event
        )
    }

    /// `channel.follow` notification whose follower is `user_name`
    pub fn follow(message_id: &str, user_name: &str) -> String {
        let event = format!(
            r#"{{"user_id":"1234","user_login":"{0}","user_name":"{0}","broadcaster_user_id":"1337","broadcaster_user_login":"cooler_user","broadcaster_user_name":"Cooler_User","followed_at":"2020-07-15T18:16:11.17106713Z"}}"#,
            user_name
        );
        notification(message_id, "channel.follow", "2", &event)
    }

    pub fn reconnect(session_id: &str, reconnect_url: &str) -> String {
        format!(
            r#"{{"metadata":{{"message_id":"reconnect-{0}","message_type":"session_reconnect","message_timestamp":"2023-07-19T10:11:12.634234626Z"}},"payload":{{"session":{{"id":"{0}","status":"reconnecting","keepalive_timeout_seconds":null,"reconnect_url":"{1}","connected_at":"2023-07-19T14:56:51.616329898Z"}}}}}}"#,
            session_id, reconnect_url
        )
    }

    /// `session_reconnect` whose `reconnect_url` is null
    pub fn reconnect_without_url(session_id: &str) -> String {
        format!(
            r#"{{"metadata":{{"message_id":"reconnect-{0}","message_type":"session_reconnect","message_timestamp":"2023-07-19T10:11:12.634234626Z"}},"payload":{{"session":{{"id":"{0}","status":"reconnecting","keepalive_timeout_seconds":null,"reconnect_url":null,"connected_at":"2023-07-19T14:56:51.616329898Z"}}}}}}"#,
            session_id
        )
    }

    pub fn revocation(subscription_type: &str, status: &str) -> String {
        format!(
            r#"{{"metadata":{{"message_id":"revocation-1","message_type":"revocation","message_timestamp":"2023-07-19T10:11:12.634234626Z","subscription_type":"{0}","subscription_version":"1"}},"payload":{{"subscription":{{"id":"f1c2a387-161a-49f9-a165-0f21d7a4e1c4","status":"{1}","type":"{0}","version":"1","cost":0,"condition":{{"broadcaster_user_id":"1337"}},"transport":{{"method":"websocket","session_id":"AQoQexAWVYKSTIu4ec_2VAxyuhAB"}},"created_at":"2023-07-19T14:56:51.634234626Z"}}}}}}"#,
            subscription_type, status
        )
    }
}

/// Channel that handlers report into
pub fn recorder() -> (UnboundedSender<String>, UnboundedReceiver<String>) {
    unbounded_channel()
}

/// Next recorded entry, if one arrives within `timeout`
pub async fn next_within(rx: &mut UnboundedReceiver<String>, timeout: Duration) -> Option<String> {
    tokio::time::timeout(timeout, rx.recv()).await.ok().flatten()
}

/// Everything recorded during the next `window`
pub async fn drain_for(rx: &mut UnboundedReceiver<String>, window: Duration) -> Vec<String> {
    let mut seen = Vec::new();
    let deadline = tokio::time::Instant::now() + window;
    while let Ok(Some(entry)) = tokio::time::timeout_at(deadline, rx.recv()).await {
        seen.push(entry);
    }
    seen
}

/// Client for `url` with a short reconnect timeout
pub fn client(url: String, handlers: HandlerTable) -> Arc<EventSubClient> {
    let config = ClientConfig {
        url,
        reconnect_welcome_timeout: Duration::from_secs(2),
        ..ClientConfig::default()
    };
    Arc::new(EventSubClient::new(config, handlers))
}

/// Run `client` on its own task
pub fn spawn_run(
    client: &Arc<EventSubClient>,
    cancel: CancellationToken,
) -> JoinHandle<eventsub::Result<()>> {
    let client = Arc::clone(client);
    tokio::spawn(async move { client.run(cancel).await })
}
