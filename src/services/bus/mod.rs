pub mod publisher;
pub mod rabbitmq;

pub use publisher::{ChannelPublisher, LiftStatePublisher};
pub use rabbitmq::RabbitMqBus;
