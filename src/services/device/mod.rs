pub mod gateway;
pub mod lift_client;
pub mod lift_device;

pub use gateway::DeviceGateway;
pub use lift_client::LiftClientApi;
pub use lift_device::LiftDevice;
