//! Link status tracking
//!
//! The tracker holds the most recent probe results for both links plus the
//! cumulative delivery statistics. Probes are pushed in by the runtime (which
//! owns the transports) immediately before arbitration, so a selection never
//! sees a stale-vs-fresh mix: a probe that failed is recorded as unavailable
//! with the RSSI floor, never left at its previous value.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::errors::TransportError;
use crate::transport::LinkState;
use crate::types::{LinkKind, Timestamp, UplinkMethod, RSSI_FLOOR};

// ----------------------------------------------------------------------------
// Link Health
// ----------------------------------------------------------------------------

/// Most recent probe result for one link.
///
/// `rssi` is only meaningful while `available` is true; unavailable links
/// carry the floor sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkHealth {
    pub available: bool,
    pub rssi: i8,
}

impl Default for LinkHealth {
    fn default() -> Self {
        Self {
            available: false,
            rssi: RSSI_FLOOR,
        }
    }
}

// ----------------------------------------------------------------------------
// Link Status Snapshot
// ----------------------------------------------------------------------------

/// Point-in-time copy of both links' health and the delivery statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStatus {
    /// Method chosen by the most recent arbitration
    pub active_method: UplinkMethod,
    pub lorawan: LinkHealth,
    pub cellular: LinkHealth,
    /// Cycles that exhausted every retry and fallback budget
    pub failed_transmissions: u16,
    /// Wall-clock time of the last successful delivery
    pub last_success_time: Timestamp,
}

impl LinkStatus {
    /// Health of one link by kind
    pub fn link(&self, kind: LinkKind) -> LinkHealth {
        match kind {
            LinkKind::Lorawan => self.lorawan,
            LinkKind::Cellular => self.cellular,
        }
    }
}

impl Default for LinkStatus {
    fn default() -> Self {
        Self {
            active_method: UplinkMethod::Auto,
            lorawan: LinkHealth::default(),
            cellular: LinkHealth::default(),
            failed_transmissions: 0,
            last_success_time: Timestamp::default(),
        }
    }
}

// ----------------------------------------------------------------------------
// Status Tracker
// ----------------------------------------------------------------------------

/// Holds per-link health and cumulative delivery statistics
#[derive(Debug, Default)]
pub struct StatusTracker {
    health: HashMap<LinkKind, LinkHealth>,
    failed_transmissions: u16,
    last_success_time: Timestamp,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh probe of one link.
    ///
    /// An RSSI read error degrades the link to unavailable regardless of its
    /// reported state, so downstream comparisons never use a value the radio
    /// could not actually produce.
    pub fn update_link(
        &mut self,
        kind: LinkKind,
        state: LinkState,
        rssi: Result<i8, TransportError>,
    ) {
        let health = match (state.is_available(), rssi) {
            (true, Ok(rssi)) => LinkHealth {
                available: true,
                rssi,
            },
            (true, Err(_)) => {
                log::debug!("{} reports connected but no rssi, treating as down", kind);
                LinkHealth::default()
            }
            (false, _) => LinkHealth::default(),
        };
        self.health.insert(kind, health);
    }

    /// Most recent health for one link; unknown links read as down
    pub fn link(&self, kind: LinkKind) -> LinkHealth {
        self.health.get(&kind).copied().unwrap_or_default()
    }

    /// Point-in-time snapshot for callers
    pub fn snapshot(&self, active_method: UplinkMethod) -> LinkStatus {
        LinkStatus {
            active_method,
            lorawan: self.link(LinkKind::Lorawan),
            cellular: self.link(LinkKind::Cellular),
            failed_transmissions: self.failed_transmissions,
            last_success_time: self.last_success_time,
        }
    }

    /// Record a delivered measurement
    pub fn record_success(&mut self, now: Timestamp) {
        self.last_success_time = now;
    }

    /// Record a cycle that exhausted every budget.
    ///
    /// Called exactly once per completed cycle, regardless of how many
    /// individual attempts the cycle made.
    pub fn record_terminal_failure(&mut self) {
        self.failed_transmissions = self.failed_transmissions.saturating_add(1);
    }

    /// Current statistics: (last success time, terminal failure count)
    pub fn stats(&self) -> (Timestamp, u16) {
        (self.last_success_time, self.failed_transmissions)
    }

    /// Zero the statistics
    pub fn reset_stats(&mut self) {
        self.failed_transmissions = 0;
        self.last_success_time = Timestamp::default();
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
