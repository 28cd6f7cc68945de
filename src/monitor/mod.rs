//! # Connection Monitor
//!
//! Mirrors the liveness of the telemetry transport.
//!
//! The monitor never checks the link itself. `is_online` follows the
//! transport's connect/disconnect notifications and `last_update_time`
//! follows telemetry arrival; staleness is left to whoever reads the state.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::info;

/// Connectivity as seen by projections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConnectivityState {
    pub is_online: bool,
    pub last_update_time: Option<DateTime<Utc>>,
}

impl ConnectivityState {
    /// Time elapsed since the last telemetry event, if any arrived
    #[must_use]
    pub fn since(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_update_time.map(|t| now - t)
    }
}

/// Passive mirror of transport liveness
#[derive(Debug, Clone, Default)]
pub struct ConnectionMonitor {
    state: ConnectivityState,
}

impl ConnectionMonitor {
    /// Create a monitor in the offline state with no updates seen
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport reported a connection
    pub fn on_connect(&mut self) {
        if !self.state.is_online {
            info!("Telemetry link online");
        }
        self.state.is_online = true;
    }

    /// Transport reported a disconnection. `last_update_time` is kept.
    pub fn on_disconnect(&mut self) {
        if self.state.is_online {
            info!("Telemetry link offline");
        }
        self.state.is_online = false;
    }

    /// Telemetry arrived at `timestamp`
    ///
    /// Applies whatever the online flag says: an event can overtake a
    /// disconnect notification.
    pub fn on_event(&mut self, timestamp: DateTime<Utc>) {
        self.state.last_update_time = Some(timestamp);
    }

    #[must_use]
    pub fn state(&self) -> ConnectivityState {
        self.state
    }
}
