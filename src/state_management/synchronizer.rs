use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};
use crate::models::LiftState;
use crate::services::bus::LiftStatePublisher;
use crate::services::device::LiftDevice;
use crate::state_management::cancel_signal::CancelSignal;
use crate::state_management::request_slot::RequestSlot;

/// Result of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Every query succeeded; a new snapshot was stored and published.
    Refreshed,
    /// A query failed; the previous snapshot was published again unchanged.
    Stale,
    /// A query failed and no snapshot exists yet, so nothing was published.
    NoSnapshot,
}

/// # StateSynchronizer
///
/// Sole writer of the lift's `LiftState`. On every tick it reads the five device values, and either
/// stores and publishes a fresh snapshot or, if any read failed, re-publishes the last good one.
/// Device failures never stop the loop.
///
/// Readers get the latest snapshot through [`subscribe`](Self::subscribe); every successful cycle
/// marks the watch channel as changed, even when the values are identical.
pub struct StateSynchronizer {
    lift_name: String,
    device: LiftDevice,
    slot: Arc<RequestSlot>,
    state_tx: watch::Sender<LiftState>,
    publisher: Arc<dyn LiftStatePublisher>,
    poll_interval: Duration,
    has_snapshot: AtomicBool,
}

impl StateSynchronizer {
    pub fn new(
        lift_name: &str,
        device: LiftDevice,
        slot: Arc<RequestSlot>,
        publisher: Arc<dyn LiftStatePublisher>,
        poll_interval: Duration,
    ) -> Self {
        let (state_tx, _) = watch::channel(LiftState::unknown(lift_name));
        Self {
            lift_name: lift_name.to_string(),
            device,
            slot,
            state_tx,
            publisher,
            poll_interval,
            has_snapshot: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LiftState> {
        self.state_tx.subscribe()
    }

    /// Latest stored snapshot.
    pub fn latest(&self) -> LiftState {
        self.state_tx.borrow().clone()
    }

    pub fn has_snapshot(&self) -> bool {
        self.has_snapshot.load(Ordering::SeqCst)
    }

    /// Runs a single poll / publish cycle.
    pub async fn run_cycle(&self) -> CycleOutcome {
        match self.device.read_state().await {
            Ok(reading) => {
                let state = LiftState::from_reading(&self.lift_name, reading, self.slot.session());
                debug!("Lift {} state: {:?}", self.lift_name, state);
                self.state_tx.send_replace(state.clone());
                self.has_snapshot.store(true, Ordering::SeqCst);
                self.publish(&state).await;
                CycleOutcome::Refreshed
            }
            Err(e) => {
                error!("Unable to get new state from lift {}: {}", self.lift_name, e);
                if !self.has_snapshot() {
                    info!("No lift state received yet for {}", self.lift_name);
                    return CycleOutcome::NoSnapshot;
                }
                let previous = self.latest();
                self.publish(&previous).await;
                CycleOutcome::Stale
            }
        }
    }

    async fn publish(&self, state: &LiftState) {
        if let Err(e) = self.publisher.publish(state).await {
            error!("Failed to publish state of lift {}: {}", self.lift_name, e);
        }
    }

    /// Polls at the configured interval until `shutdown` fires.
    pub async fn run(&self, shutdown: CancelSignal) {
        info!("Starting state synchronizer for lift {} every {:?}", self.lift_name, self.poll_interval);
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("State synchronizer for lift {} stopping", self.lift_name);
                    break;
                }
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }
    }
}
