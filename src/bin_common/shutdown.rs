//! Graceful shutdown management

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Manages graceful shutdown for long-running processes
pub struct ShutdownManager {
    token: CancellationToken,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Spawn a Ctrl+C signal handler that triggers shutdown
    pub fn spawn_signal_handler(&self) {
        let token = self.token.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                info!("");
                info!("Received shutdown signal (Ctrl+C)");
                info!("Shutting down gracefully...");
                token.cancel();
            }
        });
    }

    /// Check if the process should continue running
    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Token to hand to tasks that must stop on shutdown
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Trigger shutdown without a signal
    pub fn trigger(&self) {
        self.token.cancel();
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}
