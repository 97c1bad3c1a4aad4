use async_trait::async_trait;
use crate::errors::DeviceResult;
use crate::models::{DoorState, MotionState};

/// Abstraction over the lift's vendor control API.
///
/// Implementations are not assumed to tolerate concurrent calls; wrap them in
/// [`LiftDevice`](crate::services::device::LiftDevice) before sharing.
#[async_trait]
pub trait DeviceGateway: Send + Sync {
    /// Succeeds when the device answers at all.
    async fn check_connection(&self) -> DeviceResult<()>;

    async fn available_floors(&self) -> DeviceResult<Vec<String>>;

    async fn current_floor(&self) -> DeviceResult<String>;

    async fn destination_floor(&self) -> DeviceResult<String>;

    async fn door_state(&self) -> DeviceResult<DoorState>;

    async fn motion_state(&self) -> DeviceResult<MotionState>;

    /// Sends the cabin to `floor`. `Ok` means the device accepted the command.
    async fn command_lift(&self, floor: &str) -> DeviceResult<()>;

    async fn open_door(&self) -> DeviceResult<()>;

    async fn close_door(&self) -> DeviceResult<()>;
}
