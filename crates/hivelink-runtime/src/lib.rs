//! Tokio engine for the hivelink uplink manager
//!
//! This crate owns everything the core crate deliberately does not: the real
//! transports, the retry timer, and the mutex that serializes every public
//! operation with the scheduler. The core crate decides; this crate executes.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod manager;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use manager::{SubmitOutcome, UplinkManager};

// Re-export the core types callers need to drive the manager
pub use hivelink_core::{
    LinkKind, LinkPolicy, LinkStatus, Measurement, Result, Timestamp, UplinkError, UplinkMethod,
    UplinkTransport,
};
