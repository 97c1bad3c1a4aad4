use std::time::Duration;
use async_trait::async_trait;
use tracing::{info, warn};
use crate::executors::{ExecutionContext, ExecutionOutcome, RequestExecutor};
use crate::executors::retry::{retry_until_acknowledged, sleep_unless_cancelled};
use crate::models::{LiftMode, RequestPhase};

/// Human mode: send the lift to the floor, wait for it to arrive, then perform the door transition
/// the requestor asked for.
pub struct HumanExecutor {
    floor_retry: Duration,
    arrival_poll: Duration,
    door_retry: Duration,
}

impl HumanExecutor {
    pub fn new(floor_retry: Duration, arrival_poll: Duration, door_retry: Duration) -> Self {
        Self { floor_retry, arrival_poll, door_retry }
    }

    /// Re-reads the shared state every `arrival_poll` until it reports the destination. Issues no
    /// device calls.
    async fn wait_for_arrival(&self, ctx: &ExecutionContext) -> ExecutionOutcome {
        let floor = &ctx.request.destination_floor;
        loop {
            if ctx.cancel.is_cancelled() {
                return ExecutionOutcome::Cancelled;
            }
            let arrived = ctx.state.borrow().is_at(floor);
            if arrived {
                return ExecutionOutcome::Acknowledged;
            }
            info!("Waiting for lift to reach floor [{}]", floor);
            if !sleep_unless_cancelled(self.arrival_poll, &ctx.cancel).await {
                return ExecutionOutcome::Cancelled;
            }
        }
    }
}

#[async_trait]
impl RequestExecutor for HumanExecutor {
    fn mode(&self) -> LiftMode {
        LiftMode::Human
    }

    fn initial_phase(&self) -> RequestPhase {
        RequestPhase::HumanMoving
    }

    async fn execute(&self, ctx: ExecutionContext) -> ExecutionOutcome {
        let floor = ctx.request.destination_floor.clone();
        let door = match ctx.request.requested_door() {
            Some(door) => door,
            None => {
                warn!("Human mode executor got a request without a door transition, session {}", ctx.request.session_id);
                return ExecutionOutcome::Cancelled;
            }
        };
        info!("Executing lift request in Human mode: floor [{}], door {} for session {}",
            floor, door, ctx.request.session_id);

        // As in AGV mode, the accepted floor command is resubmitted after one backoff.
        if !sleep_unless_cancelled(self.floor_retry, &ctx.cancel).await {
            return ExecutionOutcome::Cancelled;
        }

        let device = ctx.device.clone();
        let outcome = retry_until_acknowledged(
            &format!("Request lift to floor [{}]", floor),
            self.floor_retry,
            &ctx.cancel,
            || {
                let device = device.clone();
                let floor = floor.clone();
                async move { device.command_lift(&floor).await }
            },
        ).await;
        if outcome == ExecutionOutcome::Cancelled {
            return outcome;
        }

        if self.wait_for_arrival(&ctx).await == ExecutionOutcome::Cancelled {
            return ExecutionOutcome::Cancelled;
        }
        ctx.advance(RequestPhase::HumanDoorPending);

        // The transition is exactly the one requested, whatever the door currently shows.
        let outcome = retry_until_acknowledged(
            &format!("Request door to {}", door),
            self.door_retry,
            &ctx.cancel,
            || {
                let device = device.clone();
                async move { device.command_door(door).await }
            },
        ).await;
        if outcome == ExecutionOutcome::Acknowledged {
            ctx.advance(RequestPhase::HumanDone);
        }
        outcome
    }
}
