//! Lock-free lifecycle state
//!
//! ```text
//! Disconnected ─► Connecting ─► Active ◄─► Reconnecting
//!                     │            │            │
//!                     └────────────┴─► Closed ◄─┘
//! ```

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of an [`crate::EventSubClient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectionState {
    /// Not started yet
    Disconnected = 0,
    /// Opening the initial transport
    Connecting = 1,
    /// Reading from the transport of record
    Active = 2,
    /// A candidate transport is being opened alongside the active one
    Reconnecting = 3,
    /// Run finished; terminal
    Closed = 4,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Disconnected,
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Active,
            3 => ConnectionState::Reconnecting,
            _ => ConnectionState::Closed,
        }
    }

    /// A run is in progress
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Active | ConnectionState::Reconnecting
        )
    }
}

/// Atomic wrapper around [`ConnectionState`]
#[derive(Debug)]
pub struct AtomicConnectionState {
    state: AtomicU8,
}

impl AtomicConnectionState {
    pub fn new(state: ConnectionState) -> Self {
        Self {
            state: AtomicU8::new(state as u8),
        }
    }

    #[inline]
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Move from `from` to `to` only if the current state is `from`
    pub fn transition(&self, from: ConnectionState, to: ConnectionState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.get() == ConnectionState::Active
    }

    #[inline]
    pub fn is_reconnecting(&self) -> bool {
        self.get() == ConnectionState::Reconnecting
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.get() == ConnectionState::Closed
    }
}

impl Default for AtomicConnectionState {
    fn default() -> Self {
        Self::new(ConnectionState::Disconnected)
    }
}
