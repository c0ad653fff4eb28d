//! Uplink manager
//!
//! `UplinkManager` owns both transports and every piece of mutable state
//! behind a single mutex; public operations and retry-timer firings all run
//! serialized under it, so arbitration, the cycle state machine, and the
//! status tracker never see a half-updated peer.
//!
//! Delivery flow: `submit` probes both links, arbitrates, and attempts the
//! chosen link immediately. On failure a `RetryCycle` is armed and a single
//! timer task drives it: sleep, re-attempt on the pinned link, feed the
//! verdict back in. Escalation to the fallback link happens immediately,
//! under the same lock as the attempt that exhausted the primary budget.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use hivelink_core::{
    select_link, CycleVerdict, LinkKind, LinkPolicy, LinkStatus, Measurement, Result, RetryCycle,
    StatusTracker, SystemTimeSource, TimeSource, Timestamp, TransportError, UplinkError,
    UplinkMethod, UplinkTransport,
};

// ----------------------------------------------------------------------------
// Submit Outcome
// ----------------------------------------------------------------------------

/// Result of a measurement submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Delivered during the call
    Accepted,
    /// Not delivered during the call; a retry/fallback cycle took ownership
    /// of the measurement. With a zero retry budget the cycle may already
    /// have run to completion by the time the call returns, in which case
    /// its outcome is visible in the statistics.
    Deferred,
    /// Rejected without side effects: a cycle for an earlier measurement is
    /// still in flight
    Busy,
}

// ----------------------------------------------------------------------------
// Manager State
// ----------------------------------------------------------------------------

/// A cycle in flight: the state machine, the measurement it owns, and the
/// timer task driving it
struct ActiveCycle {
    cycle: RetryCycle,
    measurement: Measurement,
    timer: JoinHandle<()>,
}

/// Where a cycle step left off
enum Flow {
    Delivered,
    Wait(Duration),
    Terminal,
}

struct ManagerState {
    policy: LinkPolicy,
    tracker: StatusTracker,
    lorawan: Box<dyn UplinkTransport>,
    cellular: Box<dyn UplinkTransport>,
    active_method: UplinkMethod,
    cycle: Option<ActiveCycle>,
    powered: bool,
    time: Arc<dyn TimeSource>,
}

impl ManagerState {
    fn link(&self, kind: LinkKind) -> &dyn UplinkTransport {
        match kind {
            LinkKind::Lorawan => self.lorawan.as_ref(),
            LinkKind::Cellular => self.cellular.as_ref(),
        }
    }

    fn link_mut(&mut self, kind: LinkKind) -> &mut dyn UplinkTransport {
        match kind {
            LinkKind::Lorawan => self.lorawan.as_mut(),
            LinkKind::Cellular => self.cellular.as_mut(),
        }
    }

    /// Probe both links and push the results into the tracker, so the next
    /// arbitration never mixes a fresh reading with a stale one
    fn refresh_links(&mut self) {
        for kind in [LinkKind::Lorawan, LinkKind::Cellular] {
            let (state, rssi) = {
                let link = self.link(kind);
                (link.state(), link.rssi())
            };
            self.tracker.update_link(kind, state, rssi);
        }
    }

    /// One delivery attempt on one link
    async fn attempt(
        &mut self,
        link: LinkKind,
        measurement: &Measurement,
    ) -> std::result::Result<(), TransportError> {
        debug!(%link, bytes = measurement.payload.len(), "attempting delivery");
        let result = self.link_mut(link).send(measurement).await;
        if let Err(ref err) = result {
            warn!(%link, %err, "delivery attempt failed");
        }
        result
    }

    /// Advance the cycle after a failed attempt on its pinned link,
    /// performing the immediate fallback attempt if the verdict calls for
    /// one. Returns only when the measurement is delivered, a timer must be
    /// armed, or the cycle is spent.
    async fn advance_after_failure(
        &mut self,
        cycle: &mut RetryCycle,
        measurement: &Measurement,
    ) -> Flow {
        loop {
            match cycle.on_attempt_failed() {
                CycleVerdict::RetryAfter(delay) => return Flow::Wait(delay),
                CycleVerdict::Escalate(link) => {
                    info!(%link, "retry budget exhausted, escalating to fallback link");
                    if self.attempt(link, measurement).await.is_ok() {
                        let now = self.time.now();
                        self.tracker.record_success(now);
                        return Flow::Delivered;
                    }
                }
                CycleVerdict::GiveUp => {
                    warn!("delivery abandoned, retry and fallback budgets exhausted");
                    self.tracker.record_terminal_failure();
                    return Flow::Terminal;
                }
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Uplink Manager
// ----------------------------------------------------------------------------

/// Owns the node's wide-area links and schedules measurement delivery
#[derive(Clone)]
pub struct UplinkManager {
    inner: Arc<Mutex<ManagerState>>,
}

impl UplinkManager {
    /// Create a manager over the two link transports, using the system clock
    /// for delivery timestamps
    pub fn new(
        policy: LinkPolicy,
        lorawan: Box<dyn UplinkTransport>,
        cellular: Box<dyn UplinkTransport>,
    ) -> Result<Self> {
        Self::with_time_source(policy, lorawan, cellular, Arc::new(SystemTimeSource))
    }

    /// Create a manager with an explicit time source
    pub fn with_time_source(
        policy: LinkPolicy,
        lorawan: Box<dyn UplinkTransport>,
        cellular: Box<dyn UplinkTransport>,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self> {
        policy.validate()?;
        if lorawan.kind() != LinkKind::Lorawan || cellular.kind() != LinkKind::Cellular {
            return Err(UplinkError::invalid_config(
                "transport wired to the wrong link slot",
            ));
        }
        Ok(Self {
            inner: Arc::new(Mutex::new(ManagerState {
                active_method: policy.method,
                policy,
                tracker: StatusTracker::new(),
                lorawan,
                cellular,
                cycle: None,
                powered: true,
                time,
            })),
        })
    }

    /// Submit one measurement for delivery.
    ///
    /// Probes both links, arbitrates, and attempts the chosen link before
    /// returning. A failed attempt arms a retry/fallback cycle which retains
    /// the measurement; only one cycle exists at a time, and submissions
    /// while one is in flight are rejected as `Busy`.
    pub async fn submit(&self, measurement: Measurement) -> Result<SubmitOutcome> {
        if measurement.is_empty() {
            return Err(UplinkError::EmptyMeasurement);
        }

        let mut state = self.inner.lock().await;
        if !state.powered {
            return Err(UplinkError::PoweredDown);
        }
        if state.cycle.is_some() {
            debug!("submission rejected, retry cycle in flight");
            return Ok(SubmitOutcome::Busy);
        }

        state.refresh_links();
        let snapshot = state.tracker.snapshot(state.active_method);
        let link = select_link(&state.policy, &snapshot);
        state.active_method = link.into();

        if state.attempt(link, &measurement).await.is_ok() {
            let now = state.time.now();
            state.tracker.record_success(now);
            return Ok(SubmitOutcome::Accepted);
        }

        let mut cycle = RetryCycle::new(link, &state.policy);
        match state.advance_after_failure(&mut cycle, &measurement).await {
            Flow::Delivered => Ok(SubmitOutcome::Accepted),
            Flow::Terminal => Ok(SubmitOutcome::Deferred),
            Flow::Wait(delay) => {
                let timer = self.arm_timer(delay);
                state.cycle = Some(ActiveCycle {
                    cycle,
                    measurement,
                    timer,
                });
                info!(retry_in = ?delay, "delivery deferred to retry cycle");
                Ok(SubmitOutcome::Deferred)
            }
        }
    }

    /// Spawn the timer task that drives the in-flight cycle. The task loops
    /// sleep/attempt/advance until the cycle resolves; it takes the cycle out
    /// of the shared state for each step, so a power-down that already
    /// removed it simply ends the task.
    fn arm_timer(&self, delay: Duration) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let mut delay = delay;
            loop {
                tokio::time::sleep(delay).await;
                let mut state = inner.lock().await;
                let Some(mut active) = state.cycle.take() else {
                    return;
                };

                let link = active.cycle.pinned();
                if state.attempt(link, &active.measurement).await.is_ok() {
                    let now = state.time.now();
                    state.tracker.record_success(now);
                    info!(%link, "deferred delivery succeeded");
                    return;
                }

                match state
                    .advance_after_failure(&mut active.cycle, &active.measurement)
                    .await
                {
                    Flow::Wait(next) => {
                        state.cycle = Some(active);
                        delay = next;
                    }
                    Flow::Delivered | Flow::Terminal => return,
                }
            }
        })
    }

    /// Replace the delivery policy.
    ///
    /// An invalid policy is rejected with no state change. A cycle already in
    /// flight keeps the policy snapshot it was armed with.
    pub async fn configure(&self, policy: LinkPolicy) -> Result<()> {
        policy.validate()?;
        let mut state = self.inner.lock().await;
        info!(?policy, "replacing uplink policy");
        state.policy = policy;
        Ok(())
    }

    /// Current delivery policy
    pub async fn get_config(&self) -> LinkPolicy {
        self.inner.lock().await.policy
    }

    /// Fresh status snapshot: both links are re-probed before reporting
    pub async fn status(&self) -> LinkStatus {
        let mut state = self.inner.lock().await;
        state.refresh_links();
        state.tracker.snapshot(state.active_method)
    }

    /// Pin delivery to one link, or return to automatic selection.
    ///
    /// Forcing a concrete link also disables fallback so the pin is absolute;
    /// selecting `Auto` re-enables it.
    pub async fn force_method(&self, method: UplinkMethod) {
        let mut state = self.inner.lock().await;
        state.policy.method = method;
        state.policy.auto_fallback = matches!(method, UplinkMethod::Auto);
        info!(?method, "uplink method forced");
    }

    /// Enable or disable escalation to the alternate link
    pub async fn set_auto_fallback(&self, enabled: bool) {
        let mut state = self.inner.lock().await;
        state.policy.auto_fallback = enabled;
    }

    /// Whether one link is currently able to take a measurement
    pub async fn is_available(&self, kind: LinkKind) -> bool {
        let mut state = self.inner.lock().await;
        state.refresh_links();
        state.tracker.link(kind).available
    }

    /// Current signal strength of one link in dBm, straight from the radio
    pub async fn signal_strength(&self, kind: LinkKind) -> Result<i8> {
        let state = self.inner.lock().await;
        Ok(state.link(kind).rssi()?)
    }

    /// Delivery statistics: (last success time, terminal failure count)
    pub async fn transmission_stats(&self) -> (Timestamp, u16) {
        self.inner.lock().await.tracker.stats()
    }

    /// Zero the delivery statistics
    pub async fn reset_stats(&self) {
        self.inner.lock().await.tracker.reset_stats();
    }

    /// Take both links down for low-power operation.
    ///
    /// An in-flight cycle is abandoned first, before any radio is touched,
    /// so its timer can never fire into a half-powered-down node. The
    /// abandoned measurement is dropped without counting as a terminal
    /// failure.
    pub async fn power_down(&self) -> Result<()> {
        let mut state = self.inner.lock().await;
        if let Some(active) = state.cycle.take() {
            active.timer.abort();
            info!("in-flight retry cycle abandoned for power down");
        }
        state.lorawan.power_down().await?;
        state.cellular.power_down().await?;
        state.powered = false;
        info!("uplinks powered down");
        Ok(())
    }

    /// Bring both links back up
    pub async fn power_up(&self) -> Result<()> {
        let mut state = self.inner.lock().await;
        state.lorawan.power_up().await?;
        state.cellular.power_up().await?;
        state.powered = true;
        info!("uplinks powered up");
        Ok(())
    }
}
