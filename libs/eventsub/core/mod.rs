//! # EventSub Core
//!
//! Connection lifecycle, reconnect handshake and handler dispatch.
//!
//! ```text
//! transport ─► EventSubClient read loop ─► Dispatcher ─► handler (blocking pool)
//!                     ▲                        │
//!                     └──── Routed::Reconnect ─┘
//! ```

pub mod client;
pub mod config;
pub mod connection_state;
pub mod dispatcher;
pub mod handlers;
pub(crate) mod reconnect;

// Re-export main types
pub use client::EventSubClient;
pub use config::ClientConfig;
pub use connection_state::{AtomicConnectionState, ConnectionState};
pub use dispatcher::{Dispatcher, Routed};
pub use handlers::{ErrorHandler, HandlerTable, LifecycleHandler, RawEventHandler};
