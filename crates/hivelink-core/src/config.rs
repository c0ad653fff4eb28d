//! Uplink delivery policy
//!
//! The policy is an immutable snapshot: the manager replaces it wholesale on
//! reconfiguration, and an in-flight retry cycle keeps the snapshot it was
//! armed with.

use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, UplinkError};
use crate::types::UplinkMethod;

/// Configuration for uplink selection and retry behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPolicy {
    /// Delivery preference: a pinned link, or automatic selection
    pub method: UplinkMethod,
    /// Whether an exhausted retry burst escalates to the alternate link
    pub auto_fallback: bool,
    /// Timed retries granted per link after the immediate attempt fails
    pub retry_count: u16,
    /// Delay between attempts within a retry burst
    pub retry_interval: Duration,
}

impl LinkPolicy {
    /// Validate a caller-supplied policy.
    ///
    /// A zero retry interval with a non-zero retry budget would spin the
    /// scheduler; reject it before any state changes.
    pub fn validate(&self) -> Result<()> {
        if self.retry_count > 0 && self.retry_interval.is_zero() {
            return Err(UplinkError::invalid_config(
                "retry_interval must be non-zero when retries are enabled",
            ));
        }
        Ok(())
    }
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            method: UplinkMethod::Auto,
            auto_fallback: true,
            retry_count: 3,
            retry_interval: Duration::from_secs(60),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
