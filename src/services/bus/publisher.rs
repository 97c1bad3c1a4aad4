use async_trait::async_trait;
use tokio::sync::mpsc;
use crate::errors::{LiftAdapterError, LiftAdapterResult};
use crate::models::LiftState;

/// Outbound side of the bus: carries each published `LiftState`.
#[async_trait]
pub trait LiftStatePublisher: Send + Sync {
    async fn publish(&self, state: &LiftState) -> LiftAdapterResult<()>;
}

/// In-process publisher that hands every state to an unbounded channel.
///
/// Used when the adapter is embedded next to its consumer, and by the integration tests to observe
/// exactly what was published.
#[derive(Clone)]
pub struct ChannelPublisher {
    sender: mpsc::UnboundedSender<LiftState>,
}

impl ChannelPublisher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LiftState>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl LiftStatePublisher for ChannelPublisher {
    async fn publish(&self, state: &LiftState) -> LiftAdapterResult<()> {
        self.sender.send(state.clone())
            .map_err(|e| LiftAdapterError::ChannelSendError(e.to_string()))
    }
}
