//! Test utilities for deterministic testing of the uplink manager
//!
//! Scripted transports let a test dictate each link's state, signal strength,
//! and per-attempt send outcome while counting every attempt the manager
//! makes against it.

use async_trait::async_trait;
use hivelink_core::{
    LinkKind, LinkState, Measurement, TimeSource, Timestamp, TransportError, UplinkTransport,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

// ----------------------------------------------------------------------------
// Mock Time Source
// ----------------------------------------------------------------------------

/// Mock time source for deterministic delivery timestamps
#[derive(Debug)]
pub struct MockTimeSource {
    current_time: AtomicU64,
}

impl MockTimeSource {
    /// Create a new mock time source starting at a specific time
    pub fn new(millis: u64) -> Self {
        Self {
            current_time: AtomicU64::new(millis),
        }
    }

    /// Set the time to a specific value
    #[allow(dead_code)]
    pub fn set_time(&self, millis: u64) {
        self.current_time.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.current_time.load(Ordering::SeqCst))
    }
}

// ----------------------------------------------------------------------------
// Scripted Uplink Transport
// ----------------------------------------------------------------------------

struct Script {
    state: LinkState,
    rssi: Result<i8, TransportError>,
    /// Per-attempt outcomes; when empty, `send_ok` decides
    send_queue: VecDeque<bool>,
    send_ok: bool,
    attempts: usize,
    powered: bool,
}

/// Transport whose behaviour is scripted from the outside via a `ScriptHandle`
pub struct ScriptedUplink {
    kind: LinkKind,
    script: Arc<Mutex<Script>>,
}

/// Shared handle a test keeps after handing the transport to the manager
#[derive(Clone)]
pub struct ScriptHandle {
    kind: LinkKind,
    script: Arc<Mutex<Script>>,
}

/// Create a scripted transport for one link, initially offline with every
/// send failing
pub fn scripted_link(kind: LinkKind) -> (ScriptedUplink, ScriptHandle) {
    let script = Arc::new(Mutex::new(Script {
        state: LinkState::Idle,
        rssi: Err(TransportError::RssiUnavailable { link: kind }),
        send_queue: VecDeque::new(),
        send_ok: false,
        attempts: 0,
        powered: true,
    }));
    (
        ScriptedUplink {
            kind,
            script: Arc::clone(&script),
        },
        ScriptHandle { kind, script },
    )
}

impl ScriptHandle {
    /// Mark the link connected with the given signal strength
    pub fn go_online(&self, rssi: i8) {
        let mut script = self.script.lock().unwrap();
        script.state = LinkState::Connected;
        script.rssi = Ok(rssi);
    }

    /// Mark the link errored with no signal reading
    #[allow(dead_code)]
    pub fn go_offline(&self) {
        let mut script = self.script.lock().unwrap();
        script.state = LinkState::Error;
        script.rssi = Err(TransportError::RssiUnavailable { link: self.kind });
    }

    /// Default outcome for sends with no queued override
    #[allow(dead_code)]
    pub fn set_send_ok(&self, ok: bool) {
        self.script.lock().unwrap().send_ok = ok;
    }

    /// Let exactly the next send attempt succeed
    #[allow(dead_code)]
    pub fn allow_next_send(&self) {
        self.script.lock().unwrap().send_queue.push_back(true);
    }

    /// Total send attempts observed so far
    pub fn attempts(&self) -> usize {
        self.script.lock().unwrap().attempts
    }

    /// Whether the transport is powered
    #[allow(dead_code)]
    pub fn is_powered(&self) -> bool {
        self.script.lock().unwrap().powered
    }
}

#[async_trait]
impl UplinkTransport for ScriptedUplink {
    fn kind(&self) -> LinkKind {
        self.kind
    }

    fn state(&self) -> LinkState {
        self.script.lock().unwrap().state
    }

    fn rssi(&self) -> Result<i8, TransportError> {
        self.script.lock().unwrap().rssi.clone()
    }

    async fn send(&mut self, _measurement: &Measurement) -> Result<(), TransportError> {
        let mut script = self.script.lock().unwrap();
        script.attempts += 1;
        let ok = script.send_queue.pop_front().unwrap_or(script.send_ok);
        if ok {
            Ok(())
        } else {
            Err(TransportError::SendFailed { link: self.kind })
        }
    }

    async fn power_up(&mut self) -> Result<(), TransportError> {
        self.script.lock().unwrap().powered = true;
        Ok(())
    }

    async fn power_down(&mut self) -> Result<(), TransportError> {
        let mut script = self.script.lock().unwrap();
        script.powered = false;
        script.state = LinkState::Idle;
        script.rssi = Err(TransportError::RssiUnavailable { link: self.kind });
        Ok(())
    }
}
