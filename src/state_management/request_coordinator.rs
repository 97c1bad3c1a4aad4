use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use crate::config::TimingSettings;
use crate::errors::RequestRejection;
use crate::executors::{AgvExecutor, ExecutionContext, ExecutorHandle, HumanExecutor, RequestExecutor};
use crate::models::{LiftCommand, LiftRequest, LiftState, RequestMode, RequestPhase};
use crate::services::device::LiftDevice;
use crate::state_management::cancel_signal::CancelSignal;
use crate::state_management::request_slot::RequestSlot;

/// What an accepted command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The floor command was accepted and an executor now drives the request.
    Accepted { session_id: String, phase: RequestPhase },
    /// The active session was ended and its executor cancelled.
    SessionEnded { session_id: String },
}

/// # RequestCoordinator
///
/// Owns the single in-flight lift request. First come, first served: while a request is active every
/// other request is rejected, and only an END_SESSION for the active session cancels it.
///
/// The coordinator reads the synchronizer's latest snapshot and never polls the device itself; the
/// only device call it makes is the initial floor command that decides whether a request is accepted.
pub struct RequestCoordinator {
    device: LiftDevice,
    slot: Arc<RequestSlot>,
    state: watch::Receiver<LiftState>,
    agv: Arc<dyn RequestExecutor>,
    human: Arc<dyn RequestExecutor>,
}

impl RequestCoordinator {
    pub fn new(
        device: LiftDevice,
        slot: Arc<RequestSlot>,
        state: watch::Receiver<LiftState>,
        timing: &TimingSettings,
    ) -> Self {
        Self::with_executors(
            device,
            slot,
            state,
            Arc::new(AgvExecutor::new(timing.floor_retry())),
            Arc::new(HumanExecutor::new(timing.floor_retry(), timing.arrival_poll(), timing.door_retry())),
        )
    }

    pub fn with_executors(
        device: LiftDevice,
        slot: Arc<RequestSlot>,
        state: watch::Receiver<LiftState>,
        agv: Arc<dyn RequestExecutor>,
        human: Arc<dyn RequestExecutor>,
    ) -> Self {
        Self { device, slot, state, agv, human }
    }

    pub fn phase(&self) -> RequestPhase {
        self.slot.phase()
    }

    pub fn active_session(&self) -> Option<String> {
        self.slot.active_session_id()
    }

    /// Handles one validated inbound command.
    pub async fn submit(&self, command: LiftCommand) -> Result<SubmitOutcome, RequestRejection> {
        match command {
            LiftCommand::Service(request) => self.accept(request).await,
            LiftCommand::EndSession { session_id } => self.end_session(&session_id),
        }
    }

    fn executor_for(&self, request: &LiftRequest) -> Arc<dyn RequestExecutor> {
        match request.mode {
            RequestMode::Agv => Arc::clone(&self.agv),
            RequestMode::Human { .. } => Arc::clone(&self.human),
        }
    }

    async fn accept(&self, request: LiftRequest) -> Result<SubmitOutcome, RequestRejection> {
        if let Some(active_session) = self.slot.active_session_id() {
            return Err(RequestRejection::Busy { active_session });
        }

        let snapshot = self.state.borrow().clone();
        if !snapshot.has_floor(&request.destination_floor) {
            return Err(RequestRejection::UnknownFloor(request.destination_floor));
        }

        // A command the device refuses here is a hard reject: nothing becomes active.
        if let Err(source) = self.device.command_lift(&request.destination_floor).await {
            error!("Failed to send lift to {}: {}", request.destination_floor, source);
            return Err(RequestRejection::CommandNotAccepted {
                floor: request.destination_floor,
                source,
            });
        }

        let executor = self.executor_for(&request);
        let phase = executor.initial_phase();
        let (ticket, cancel) = self.slot.try_claim(request.clone(), phase)?;
        info!("Requested lift to {} for session {} in {} mode",
            request.destination_floor, request.session_id, executor.mode());

        let session_id = request.session_id.clone();
        let ctx = ExecutionContext {
            request,
            ticket,
            device: self.device.clone(),
            state: self.state.clone(),
            slot: Arc::clone(&self.slot),
            cancel,
        };
        let handle = ExecutorHandle::spawn(executor, ctx);
        self.supervise(handle, ticket, session_id.clone());

        Ok(SubmitOutcome::Accepted { session_id, phase })
    }

    /// Waits on the executor in the background. If it panics, its request is released so the lift
    /// does not stay busy forever.
    fn supervise(&self, handle: ExecutorHandle, ticket: u64, session_id: String) {
        let slot = Arc::clone(&self.slot);
        tokio::spawn(async move {
            match handle.join().await {
                Ok(outcome) => debug!("Executor for session {} finished: {:?}", session_id, outcome),
                Err(e) => {
                    error!("Executor for session {} failed: {}", session_id, e);
                    if let Some(active) = slot.take_ticket(ticket) {
                        active.cancel.cancel();
                        warn!("Lift request of session {} dropped", session_id);
                    }
                }
            }
        });
    }

    /// Ends the active session if `session_id` owns it, cancelling its executor.
    pub fn end_session(&self, session_id: &str) -> Result<SubmitOutcome, RequestRejection> {
        match self.slot.take_session(session_id) {
            Some(active) => {
                active.cancel.cancel();
                info!("Session {} ended, lift request to {} dropped", session_id, active.request.destination_floor);
                Ok(SubmitOutcome::SessionEnded { session_id: session_id.to_string() })
            }
            None => Err(RequestRejection::NoActiveSession(session_id.to_string())),
        }
    }

    /// Cancels and clears whatever request is active.
    pub fn reset(&self) {
        if let Some(active) = self.slot.take() {
            active.cancel.cancel();
            info!("Coordinator reset, session {} dropped", active.request.session_id);
        }
    }

    /// Clears the active request if `state` shows it complete. Returns the finished session id.
    pub fn check_completion(&self, state: &LiftState) -> Option<String> {
        let finished = self.slot.take_if_complete(state)?;
        finished.cancel.cancel();
        info!("Lift request of session {} completed at floor {}",
            finished.request.session_id, finished.request.destination_floor);
        Some(finished.request.session_id)
    }

    /// Runs the completion check on every state refresh until `shutdown` fires.
    pub async fn watch_completion(&self, shutdown: CancelSignal) {
        let mut state = self.state.clone();
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                changed = state.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = state.borrow_and_update().clone();
                    if self.slot.is_busy() {
                        self.check_completion(&snapshot);
                    }
                }
            }
        }
    }
}
