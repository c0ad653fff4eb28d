//! Link arbitration
//!
//! A pure function from (policy, status) to a link. Keeping it stateless is
//! what makes it independently testable: identical inputs always yield the
//! identical choice.

use crate::config::LinkPolicy;
use crate::status::LinkStatus;
use crate::types::LinkKind;

/// Margin, in dB, by which the cellular link must beat LoRaWAN before
/// automatic selection prefers it.
///
/// The margin is asymmetric on purpose: it biases toward the cheaper,
/// lower-power primary link and keeps noisy readings near the threshold from
/// flapping the selection.
pub const HYSTERESIS_DB: i16 = 10;

/// Choose the link for the next delivery attempt.
///
/// A forced method wins when its link is available. A forced method whose
/// link is down and whose policy forbids fallback is still returned
/// unchanged — the attempt will fail predictably rather than silently
/// switching links. Everything else falls through to automatic selection.
pub fn select_link(policy: &LinkPolicy, status: &LinkStatus) -> LinkKind {
    if let Some(forced) = policy.method.forced_link() {
        if status.link(forced).available {
            return forced;
        }
        if !policy.auto_fallback {
            return forced;
        }
    }

    let lorawan = status.link(LinkKind::Lorawan);
    let cellular = status.link(LinkKind::Cellular);

    match (lorawan.available, cellular.available) {
        (true, true) => {
            if (cellular.rssi as i16) > (lorawan.rssi as i16) + HYSTERESIS_DB {
                LinkKind::Cellular
            } else {
                LinkKind::Lorawan
            }
        }
        (true, false) => LinkKind::Lorawan,
        (false, true) => LinkKind::Cellular,
        (false, false) => policy.method.preferred_link(),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
