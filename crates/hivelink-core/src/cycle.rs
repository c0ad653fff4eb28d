//! Retry/fallback cycle state machine
//!
//! One `RetryCycle` exists per in-flight measurement, created when the
//! immediate send attempt fails and destroyed on success or terminal failure.
//! The machine is pure: it hands the caller a verdict after every failed
//! attempt, and the runtime supplies the timer. The link pinned at the start
//! of a burst stays pinned for the whole burst — arbitration is only re-run
//! when escalating to fallback, and then only in the sense that the opposite
//! link is taken.
//!
//! A burst is one immediate attempt plus `retry_count` timed retries. With
//! fallback enabled a cycle is therefore at most two bursts, one per link.

use core::time::Duration;

use crate::config::LinkPolicy;
use crate::types::LinkKind;

// ----------------------------------------------------------------------------
// Cycle Verdict
// ----------------------------------------------------------------------------

/// What the scheduler must do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleVerdict {
    /// Retry the pinned link after the interval elapses
    RetryAfter(Duration),
    /// Budget exhausted: the opposite link is now pinned with a fresh budget;
    /// attempt it immediately
    Escalate(LinkKind),
    /// Every budget exhausted; record one terminal failure and go idle
    GiveUp,
}

// ----------------------------------------------------------------------------
// Retry Cycle
// ----------------------------------------------------------------------------

/// Transient per-measurement retry state, owned exclusively by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryCycle {
    pinned: LinkKind,
    current_retry: u16,
    fallback_active: bool,
    retry_count: u16,
    retry_interval: Duration,
    auto_fallback: bool,
}

impl RetryCycle {
    /// Start a cycle for a measurement whose immediate attempt on `pinned`
    /// just failed. The policy is snapshotted: reconfiguration does not
    /// affect a cycle already in flight.
    pub fn new(pinned: LinkKind, policy: &LinkPolicy) -> Self {
        Self {
            pinned,
            current_retry: 0,
            fallback_active: false,
            retry_count: policy.retry_count,
            retry_interval: policy.retry_interval,
            auto_fallback: policy.auto_fallback,
        }
    }

    /// The link attempts are currently dispatched on
    pub fn pinned(&self) -> LinkKind {
        self.pinned
    }

    /// Timed retries already consumed in the current burst
    pub fn current_retry(&self) -> u16 {
        self.current_retry
    }

    /// Whether the cycle has escalated to the alternate link
    pub fn fallback_active(&self) -> bool {
        self.fallback_active
    }

    /// Advance the machine after a failed attempt on the pinned link.
    ///
    /// Retries within a burst do not re-arbitrate; escalation flips to the
    /// opposite link, resets the retry counter, and grants a full budget
    /// exactly once.
    pub fn on_attempt_failed(&mut self) -> CycleVerdict {
        if self.current_retry < self.retry_count {
            self.current_retry += 1;
            return CycleVerdict::RetryAfter(self.retry_interval);
        }

        if self.auto_fallback && !self.fallback_active {
            self.fallback_active = true;
            self.current_retry = 0;
            self.pinned = self.pinned.opposite();
            return CycleVerdict::Escalate(self.pinned);
        }

        CycleVerdict::GiveUp
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
