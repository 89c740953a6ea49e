//! # EventSub Traits
//!
//! Error taxonomy and the transport seam shared by the rest of the crate:
//!
//! - **EventSubError**: fatal and recoverable failures in one enum
//! - **Transport**: one open connection that yields whole messages
//! - **Connector**: opens transports, swappable for tests or custom TLS

pub mod error;
pub mod transport;

// Re-export commonly used types
pub use error::{EventSubError, Result};
pub use transport::{
    Connector, Transport, TransportEvent, TungsteniteConnector, TungsteniteTransport, WsMessage,
    NORMAL_CLOSURE,
};
