use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use crate::errors::{DeviceError, DeviceResult};
use crate::models::{DoorRequest, DoorState, LiftReading, MotionState};
use crate::services::device::gateway::DeviceGateway;

/// # LiftDevice
///
/// Shared handle on the lift's [`DeviceGateway`]. The state poll and the request executors both go
/// through this handle, which guarantees:
///
/// * at most one device call is outstanding at any time, and
/// * every call is bounded by `timeout`, whatever the gateway implementation does.
///
/// Cloning is cheap and clones share the same call lock.
#[derive(Clone)]
pub struct LiftDevice {
    gateway: Arc<dyn DeviceGateway>,
    call_lock: Arc<Mutex<()>>,
    timeout: Duration,
}

impl LiftDevice {
    pub fn new(gateway: Arc<dyn DeviceGateway>, timeout: Duration) -> Self {
        Self {
            gateway,
            call_lock: Arc::new(Mutex::new(())),
            timeout,
        }
    }

    async fn call<T, F, Fut>(&self, op: F) -> DeviceResult<T>
    where
        F: FnOnce(Arc<dyn DeviceGateway>) -> Fut,
        Fut: Future<Output = DeviceResult<T>>,
    {
        let _guard = self.call_lock.lock().await;
        tokio::time::timeout(self.timeout, op(Arc::clone(&self.gateway)))
            .await
            .map_err(|_| DeviceError::Timeout)?
    }

    /// Reads available floors, current floor, destination floor, door state and motion state, in that
    /// order. The first failing query aborts the reading.
    pub async fn read_state(&self) -> DeviceResult<LiftReading> {
        let available_floors = self.call(|g| async move { g.available_floors().await }).await?;
        let current_floor = self.call(|g| async move { g.current_floor().await }).await?;
        let destination_floor = self.call(|g| async move { g.destination_floor().await }).await?;
        let door_state: DoorState = self.call(|g| async move { g.door_state().await }).await?;
        let motion_state: MotionState = self.call(|g| async move { g.motion_state().await }).await?;

        Ok(LiftReading {
            available_floors,
            current_floor,
            destination_floor,
            door_state,
            motion_state,
        })
    }

    pub async fn command_lift(&self, floor: &str) -> DeviceResult<()> {
        let floor = floor.to_string();
        self.call(|g| async move { g.command_lift(&floor).await }).await
    }

    /// Issues exactly the transition that was asked for.
    pub async fn command_door(&self, door: DoorRequest) -> DeviceResult<()> {
        match door {
            DoorRequest::Open => self.call(|g| async move { g.open_door().await }).await,
            DoorRequest::Closed => self.call(|g| async move { g.close_door().await }).await,
        }
    }
}
