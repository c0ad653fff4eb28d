//! Property tests for the pure arbitration function
//!
//! `select_link` must be deterministic and total over the whole input space,
//! and its automatic mode must never pick a dead link while a live one exists.

use proptest::prelude::*;

use hivelink_core::{
    select_link, LinkHealth, LinkKind, LinkPolicy, LinkStatus, UplinkMethod, HYSTERESIS_DB,
};

fn method_strategy() -> impl Strategy<Value = UplinkMethod> {
    prop_oneof![
        Just(UplinkMethod::Lorawan),
        Just(UplinkMethod::Cellular),
        Just(UplinkMethod::Auto),
    ]
}

fn health_strategy() -> impl Strategy<Value = LinkHealth> {
    (any::<bool>(), -127i8..=0).prop_map(|(available, rssi)| LinkHealth { available, rssi })
}

fn policy_strategy() -> impl Strategy<Value = LinkPolicy> {
    (method_strategy(), any::<bool>(), 0u16..=8).prop_map(|(method, auto_fallback, retry_count)| {
        LinkPolicy {
            method,
            auto_fallback,
            retry_count,
            ..LinkPolicy::default()
        }
    })
}

fn status_strategy() -> impl Strategy<Value = LinkStatus> {
    (health_strategy(), health_strategy()).prop_map(|(lorawan, cellular)| LinkStatus {
        lorawan,
        cellular,
        ..LinkStatus::default()
    })
}

proptest! {
    #[test]
    fn select_is_deterministic(policy in policy_strategy(), status in status_strategy()) {
        let first = select_link(&policy, &status);
        let second = select_link(&policy, &status);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn auto_never_picks_a_dead_link_over_a_live_one(status in status_strategy()) {
        let policy = LinkPolicy { method: UplinkMethod::Auto, ..LinkPolicy::default() };
        let chosen = select_link(&policy, &status);
        let any_available = status.lorawan.available || status.cellular.available;
        if any_available {
            prop_assert!(status.link(chosen).available);
        }
    }

    #[test]
    fn auto_only_prefers_cellular_past_the_margin(status in status_strategy()) {
        let policy = LinkPolicy { method: UplinkMethod::Auto, ..LinkPolicy::default() };
        if status.lorawan.available && status.cellular.available {
            let chosen = select_link(&policy, &status);
            let diff = status.cellular.rssi as i16 - status.lorawan.rssi as i16;
            if diff > HYSTERESIS_DB {
                prop_assert_eq!(chosen, LinkKind::Cellular);
            } else {
                prop_assert_eq!(chosen, LinkKind::Lorawan);
            }
        }
    }

    #[test]
    fn forced_without_fallback_is_always_honoured(
        status in status_strategy(),
        forced in prop_oneof![Just(LinkKind::Lorawan), Just(LinkKind::Cellular)],
    ) {
        let policy = LinkPolicy {
            method: forced.into(),
            auto_fallback: false,
            ..LinkPolicy::default()
        };
        prop_assert_eq!(select_link(&policy, &status), forced);
    }
}
