//! EventSub Listener - Main Library
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (config, logging, shutdown)
//! - **eventsub**: EventSub WebSocket client (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use eventsub_listener::bin_common::{load_config_from_env, ConfigType};
//! use eventsub_listener::eventsub::EventSubClient;
//! ```

// Re-export workspace libraries for convenience
pub use eventsub;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod logging;
    pub mod runner;
    pub mod shutdown;

    pub use cli::{load_config_from_env, ConfigError, ConfigType, ListenerConfig};
    pub use logging::init_tracing;
    pub use runner::{print_banner, print_shutdown, RunConfig};
    pub use shutdown::ShutdownManager;
}
