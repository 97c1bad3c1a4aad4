mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Call, Harness};
use lift_adapter::errors::DeviceError;
use lift_adapter::executors::{
    AgvExecutor, ExecutionContext, ExecutionOutcome, ExecutorHandle, HumanExecutor, RequestExecutor,
};
use lift_adapter::models::{DoorRequest, LiftRequest, RequestPhase};

fn context(h: &Harness, request: LiftRequest, executor: &dyn RequestExecutor) -> ExecutionContext {
    let (ticket, cancel) = h.slot
        .try_claim(request.clone(), executor.initial_phase())
        .expect("slot is free");
    ExecutionContext {
        request,
        ticket,
        device: h.device.clone(),
        state: h.synchronizer.subscribe(),
        slot: h.slot.clone(),
        cancel,
    }
}

fn human_executor() -> Arc<HumanExecutor> {
    Arc::new(HumanExecutor::new(Duration::from_secs(2), Duration::from_secs(1), Duration::from_secs(3)))
}

#[tokio::test(start_paused = true)]
async fn agv_floor_command_retried_every_two_seconds_until_acknowledged() {
    let mut h = Harness::new(&["l1", "l2"], "l1");
    h.poll().await;
    h.gateway.script_lift_results(vec![
        Err(DeviceError::Timeout),
        Err(DeviceError::Http(503)),
        Err(DeviceError::Unreachable("connection refused".to_string())),
    ]);

    let executor = Arc::new(AgvExecutor::new(Duration::from_secs(2)));
    let ctx = context(&h, LiftRequest::agv("l2", "s1"), executor.as_ref());
    let start = tokio::time::Instant::now();
    let handle = ExecutorHandle::spawn(executor, ctx);

    assert_eq!(handle.join().await.expect("executor task"), ExecutionOutcome::Acknowledged);

    let times = h.gateway.lift_command_times();
    assert_eq!(times.len(), 4);
    // The accepting command was sent by the coordinator; the first resubmission waits one backoff
    assert_eq!(times[0] - start, Duration::from_secs(2));
    for pair in times.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::from_secs(2));
    }
    assert!(h.gateway.calls().iter()
        .filter_map(|call| match call {
            Call::CommandLift(floor) => Some(floor),
            _ => None,
        })
        .all(|floor| floor == "l2"));
}

#[tokio::test(start_paused = true)]
async fn cancelled_agv_executor_stops_retrying() {
    let mut h = Harness::new(&["l1", "l2"], "l1");
    h.poll().await;
    h.gateway.script_lift_results((0..10).map(|_| Err(DeviceError::Timeout)).collect());

    let executor = Arc::new(AgvExecutor::new(Duration::from_secs(2)));
    let ctx = context(&h, LiftRequest::agv("l2", "s1"), executor.as_ref());
    let cancel = ctx.cancel.clone();
    let handle = ExecutorHandle::spawn(executor, ctx);

    // Attempts at 2s and 4s
    tokio::time::sleep(Duration::from_millis(4500)).await;
    cancel.cancel();
    assert_eq!(handle.join().await.expect("executor task"), ExecutionOutcome::Cancelled);
    assert_eq!(h.gateway.lift_command_count(), 2);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.gateway.lift_command_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn human_waits_for_arrival_without_polling_device() {
    let mut h = Harness::new(&["l1", "l2"], "l1");
    h.poll().await;
    let calls_before = h.gateway.calls().len();

    let executor = human_executor();
    let ctx = context(&h, LiftRequest::human("l2", "s1", DoorRequest::Open), executor.as_ref());
    let cancel = ctx.cancel.clone();
    let handle = ExecutorHandle::spawn(executor, ctx);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(h.gateway.calls()[calls_before..], [Call::CommandLift("l2".to_string())]);
    assert_eq!(h.slot.phase(), RequestPhase::HumanMoving);

    cancel.cancel();
    assert_eq!(handle.join().await.expect("executor task"), ExecutionOutcome::Cancelled);
    assert!(h.gateway.door_commands().is_empty());
}

#[tokio::test(start_paused = true)]
async fn human_door_command_retried_every_three_seconds() {
    let mut h = Harness::new(&["l1", "l2"], "l2");
    h.poll().await;
    h.gateway.script_door_results(vec![
        Err(DeviceError::Rejected("busy".to_string())),
        Err(DeviceError::Timeout),
    ]);

    let executor = human_executor();
    let ctx = context(&h, LiftRequest::human("l2", "s1", DoorRequest::Closed), executor.as_ref());
    let handle = ExecutorHandle::spawn(executor, ctx);

    assert_eq!(handle.join().await.expect("executor task"), ExecutionOutcome::Acknowledged);
    assert_eq!(h.slot.phase(), RequestPhase::HumanDone);

    let doors = h.gateway.door_commands();
    assert_eq!(doors.len(), 3);
    assert!(doors.iter().all(|(call, _)| *call == Call::CloseDoor));
    for pair in doors.windows(2) {
        assert_eq!(pair[1].1 - pair[0].1, Duration::from_secs(3));
    }
}

#[tokio::test(start_paused = true)]
async fn stale_executor_cannot_advance_a_newer_request() {
    let mut h = Harness::new(&["l1", "l2"], "l1");
    h.poll().await;

    let executor = human_executor();
    let ctx = context(&h, LiftRequest::human("l2", "s1", DoorRequest::Open), executor.as_ref());
    let stale = ctx.clone();
    let handle = ExecutorHandle::spawn(executor, ctx);
    tokio::time::sleep(Duration::from_millis(10)).await;

    h.slot.take_session("s1").expect("s1 active").cancel.cancel();
    assert_eq!(handle.join().await.expect("executor task"), ExecutionOutcome::Cancelled);

    h.slot.try_claim(LiftRequest::agv("l2", "s1"), RequestPhase::AgvInProgress).expect("slot is free");
    assert!(!stale.advance(RequestPhase::HumanDone));
    assert_eq!(h.slot.phase(), RequestPhase::AgvInProgress);
}
