//! Core types for the uplink manager
//!
//! Fundamental identifiers and value types shared by the arbitration, status,
//! and scheduling modules.

use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// RSSI sentinel stored when a link cannot report signal strength.
///
/// Chosen below any value a radio will realistically report so a dead link
/// never wins an arbitration comparison.
pub const RSSI_FLOOR: i8 = -127;

// ----------------------------------------------------------------------------
// Link Kind
// ----------------------------------------------------------------------------

/// The two wide-area links the node can deliver measurements over.
///
/// LoRaWAN is the primary link (cheaper, lower power); cellular is the
/// secondary. Arbitration is biased toward the primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    Lorawan,
    Cellular,
}

impl LinkKind {
    /// The alternate link, used when escalating to fallback.
    pub fn opposite(self) -> Self {
        match self {
            LinkKind::Lorawan => LinkKind::Cellular,
            LinkKind::Cellular => LinkKind::Lorawan,
        }
    }

    /// The link favoured when nothing else decides.
    pub const PRIMARY: Self = LinkKind::Lorawan;
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkKind::Lorawan => write!(f, "lorawan"),
            LinkKind::Cellular => write!(f, "cellular"),
        }
    }
}

// ----------------------------------------------------------------------------
// Uplink Method
// ----------------------------------------------------------------------------

/// Configured delivery preference.
///
/// A concrete method pins that link; `Auto` lets the arbitrator pick based on
/// availability and signal strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UplinkMethod {
    Lorawan,
    Cellular,
    Auto,
}

impl UplinkMethod {
    /// The forced link, if this method names one.
    pub fn forced_link(self) -> Option<LinkKind> {
        match self {
            UplinkMethod::Lorawan => Some(LinkKind::Lorawan),
            UplinkMethod::Cellular => Some(LinkKind::Cellular),
            UplinkMethod::Auto => None,
        }
    }

    /// The link this method prefers when no availability information can
    /// break the tie. `Auto` resolves to the primary.
    pub fn preferred_link(self) -> LinkKind {
        self.forced_link().unwrap_or(LinkKind::PRIMARY)
    }
}

impl From<LinkKind> for UplinkMethod {
    fn from(kind: LinkKind) -> Self {
        match kind {
            LinkKind::Lorawan => UplinkMethod::Lorawan,
            LinkKind::Cellular => UplinkMethod::Cellular,
        }
    }
}

// ----------------------------------------------------------------------------
// Timestamp
// ----------------------------------------------------------------------------

/// Millisecond timestamp since Unix epoch
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a new timestamp
    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Get the raw milliseconds
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Get duration since another timestamp (saturating)
    pub fn duration_since(&self, other: Self) -> core::time::Duration {
        core::time::Duration::from_millis(self.0.saturating_sub(other.0))
    }
}

// ----------------------------------------------------------------------------
// Time Source Trait
// ----------------------------------------------------------------------------

/// Trait for providing wall-clock timestamps in a no_std compatible way
///
/// The manager records `last_success_time` through this seam so tests can
/// control time deterministically.
pub trait TimeSource: Send + Sync {
    /// Get the current timestamp
    fn now(&self) -> Timestamp;
}

cfg_if::cfg_if! {
    if #[cfg(feature = "std")] {
        /// Standard library implementation of TimeSource
        #[derive(Debug, Clone, Copy, Default)]
        pub struct SystemTimeSource;

        impl TimeSource for SystemTimeSource {
            fn now(&self) -> Timestamp {
                use std::time::{SystemTime, UNIX_EPOCH};
                let duration = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default();
                Timestamp::new(duration.as_millis() as u64)
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Measurement
// ----------------------------------------------------------------------------

/// One measurement ready for delivery to the backend.
///
/// The payload is opaque here; each transport owns its own wire encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// When the measurement was taken
    pub recorded_at: Timestamp,
    /// Encoded sensor readings, interpreted by the transport
    pub payload: Vec<u8>,
}

impl Measurement {
    pub fn new(recorded_at: Timestamp, payload: Vec<u8>) -> Self {
        Self {
            recorded_at,
            payload,
        }
    }

    /// A measurement with nothing to deliver is rejected at submission.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_link() {
        assert_eq!(LinkKind::Lorawan.opposite(), LinkKind::Cellular);
        assert_eq!(LinkKind::Cellular.opposite(), LinkKind::Lorawan);
    }

    #[test]
    fn test_method_preferred_link() {
        assert_eq!(UplinkMethod::Lorawan.preferred_link(), LinkKind::Lorawan);
        assert_eq!(UplinkMethod::Cellular.preferred_link(), LinkKind::Cellular);
        assert_eq!(UplinkMethod::Auto.preferred_link(), LinkKind::Lorawan);
        assert_eq!(UplinkMethod::Auto.forced_link(), None);
    }

    #[test]
    fn test_timestamp_duration_since() {
        let earlier = Timestamp::new(1_000);
        let later = Timestamp::new(6_000);
        assert_eq!(
            later.duration_since(earlier),
            core::time::Duration::from_secs(5)
        );
        // Saturates instead of panicking when clocks step backwards
        assert_eq!(
            earlier.duration_since(later),
            core::time::Duration::ZERO
        );
    }
}
