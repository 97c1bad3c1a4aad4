//! # Request Executors
//!
//! Mode-specific command sequences that drive an accepted request. The coordinator picks an
//! executor by the request's mode, spawns it, and stops it through the request's cancel signal.

pub mod agv;
pub mod human;
pub mod retry;

use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use crate::models::{LiftMode, LiftRequest, LiftState, RequestPhase};
use crate::services::device::LiftDevice;
use crate::state_management::cancel_signal::CancelSignal;
use crate::state_management::request_slot::RequestSlot;

pub use agv::AgvExecutor;
pub use human::HumanExecutor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Every command in the sequence was acknowledged by the device.
    Acknowledged,
    /// The cancel signal fired before the sequence finished.
    Cancelled,
}

/// Everything an executor needs to drive one request.
#[derive(Clone)]
pub struct ExecutionContext {
    pub request: LiftRequest,
    pub ticket: u64,
    pub device: LiftDevice,
    /// Latest published state; read only
    pub state: watch::Receiver<LiftState>,
    pub slot: Arc<RequestSlot>,
    pub cancel: CancelSignal,
}

impl ExecutionContext {
    /// Reports a phase transition for this request. Ignored if the request is no longer active.
    pub fn advance(&self, phase: RequestPhase) -> bool {
        self.slot.advance(self.ticket, phase)
    }
}

#[async_trait]
pub trait RequestExecutor: Send + Sync {
    fn mode(&self) -> LiftMode;

    /// Phase a freshly accepted request of this mode starts in.
    fn initial_phase(&self) -> RequestPhase;

    async fn execute(&self, ctx: ExecutionContext) -> ExecutionOutcome;
}

/// A running executor. It is stopped through the request's cancel signal, never aborted.
pub struct ExecutorHandle {
    task: JoinHandle<ExecutionOutcome>,
}

impl ExecutorHandle {
    /// Spawns `executor` on its own task so its waits never hold up the state poll.
    pub fn spawn(executor: Arc<dyn RequestExecutor>, ctx: ExecutionContext) -> Self {
        let task = tokio::spawn(async move { executor.execute(ctx).await });
        Self { task }
    }

    /// Waits for the executor to finish. Fails only if it panicked.
    pub async fn join(self) -> Result<ExecutionOutcome, JoinError> {
        self.task.await
    }
}
