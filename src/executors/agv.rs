use std::time::Duration;
use async_trait::async_trait;
use tracing::info;
use crate::executors::{ExecutionContext, ExecutionOutcome, RequestExecutor};
use crate::executors::retry::{retry_until_acknowledged, sleep_unless_cancelled};
use crate::models::{LiftMode, RequestPhase};

/// AGV mode: the lift is only sent to the floor. Doors are left to the device, which holds them
/// open while the cabin is stopped.
pub struct AgvExecutor {
    floor_retry: Duration,
}

impl AgvExecutor {
    pub fn new(floor_retry: Duration) -> Self {
        Self { floor_retry }
    }
}

#[async_trait]
impl RequestExecutor for AgvExecutor {
    fn mode(&self) -> LiftMode {
        LiftMode::Agv
    }

    fn initial_phase(&self) -> RequestPhase {
        RequestPhase::AgvInProgress
    }

    async fn execute(&self, ctx: ExecutionContext) -> ExecutionOutcome {
        let floor = ctx.request.destination_floor.clone();
        info!("Executing lift request in AGV mode: floor [{}] for session {}", floor, ctx.request.session_id);

        // The coordinator already sent the floor command once when it accepted the request; the
        // first resubmission waits one backoff.
        if !sleep_unless_cancelled(self.floor_retry, &ctx.cancel).await {
            return ExecutionOutcome::Cancelled;
        }

        let device = ctx.device.clone();
        retry_until_acknowledged(
            &format!("Request lift to floor [{}]", floor),
            self.floor_retry,
            &ctx.cancel,
            || {
                let device = device.clone();
                let floor = floor.clone();
                async move { device.command_lift(&floor).await }
            },
        ).await
    }
}
