//! Transport abstraction for the uplink manager
//!
//! Each wide-area link (LoRaWAN, cellular) implements this trait; the manager
//! and arbitrator only ever see the trait, so additional transports plug in
//! without touching selection or scheduling logic. The transport owns its own
//! join/connection procedure, ack handling, and send timeout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::TransportError;
use crate::types::{LinkKind, Measurement};

// ----------------------------------------------------------------------------
// Link State
// ----------------------------------------------------------------------------

/// Connection state reported by a transport.
///
/// Only `Connected` counts as available for arbitration; a link that is still
/// joining, mid-send, or errored cannot take a new measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkState {
    Idle,
    Connecting,
    Connected,
    Sending,
    Error,
}

impl LinkState {
    pub fn is_available(self) -> bool {
        matches!(self, LinkState::Connected)
    }
}

// ----------------------------------------------------------------------------
// Transport Trait
// ----------------------------------------------------------------------------

/// Unified interface over the node's wide-area links
#[async_trait]
pub trait UplinkTransport: Send + Sync {
    /// Which link this transport drives
    fn kind(&self) -> LinkKind;

    /// Current connection state
    fn state(&self) -> LinkState;

    /// Current received signal strength in dBm
    fn rssi(&self) -> Result<i8, TransportError>;

    /// Deliver one measurement.
    ///
    /// Blocking per attempt, bounded by the transport's own timeout; the
    /// transport owns its internal ack handling. One call is one attempt —
    /// retries are the scheduler's job.
    async fn send(&mut self, measurement: &Measurement) -> Result<(), TransportError>;

    /// Bring the link up (radio on, re-join/attach as needed)
    async fn power_up(&mut self) -> Result<(), TransportError>;

    /// Take the link down
    async fn power_down(&mut self) -> Result<(), TransportError>;
}
