//! Core uplink logic for the hivelink monitoring node
//!
//! This crate contains the transport-agnostic half of the node's communication
//! manager: link arbitration, status tracking, and the retry/fallback cycle
//! state machine. It performs no IO and owns no timers — the runtime crate
//! drives it against real transports and a real clock. It is `no_std`
//! compatible (with `alloc`) so the same logic runs on-target and on the host.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod arbiter;
pub mod config;
pub mod cycle;
pub mod errors;
pub mod status;
pub mod transport;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use arbiter::{select_link, HYSTERESIS_DB};
pub use config::LinkPolicy;
pub use cycle::{CycleVerdict, RetryCycle};
pub use errors::{Result, TransportError, UplinkError};
pub use status::{LinkHealth, LinkStatus, StatusTracker};
pub use transport::{LinkState, UplinkTransport};
pub use types::{LinkKind, Measurement, TimeSource, Timestamp, UplinkMethod, RSSI_FLOOR};

#[cfg(feature = "std")]
pub use types::SystemTimeSource;
