use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::RequestRejection;
use crate::models::LiftRequestMessage;
use crate::state_management::{CancelSignal, RequestCoordinator, SubmitOutcome};

/// Bridges inbound bus requests to the request coordinator for one lift
pub struct LiftController {
    /// Requests addressed to any other lift are ignored
    pub lift_name: String,
    /// The coordinator owning the in-flight request
    pub coordinator: Arc<RequestCoordinator>,
}

impl LiftController {
    /// Creates a new `LiftController`
    ///
    /// # Arguments
    ///
    /// * `lift_name`: Name of the lift this adapter serves
    /// * `coordinator`: The `RequestCoordinator` requests are handed to
    pub fn new(lift_name: &str, coordinator: Arc<RequestCoordinator>) -> Self {
        info!("Initializing Lift Controller for {}", lift_name);
        Self {
            lift_name: lift_name.to_string(),
            coordinator,
        }
    }

    /// Handles a single inbound request message
    ///
    /// 1. Drops messages addressed to another lift
    /// 2. Validates the message shape
    /// 3. Submits the resulting command to the coordinator
    ///
    /// Rejections are logged here and returned so callers can inspect them; none of them is fatal.
    pub async fn handle_request(&self, message: LiftRequestMessage) -> Result<SubmitOutcome, RequestRejection> {
        if message.lift_name != self.lift_name {
            debug!("Ignoring request for lift {}", message.lift_name);
            return Err(RequestRejection::WrongLift(message.lift_name));
        }

        info!("Lift request [{}] ({}) requested by {}",
            message.destination_floor, message.request_type, message.session_id);

        let result = match message.into_command() {
            Ok(command) => self.coordinator.submit(command).await,
            Err(rejection) => Err(rejection),
        };

        match &result {
            Ok(outcome) => debug!("Lift request handled: {:?}", outcome),
            Err(RequestRejection::Busy { active_session }) => {
                info!("Lift is currently busy with session {}, try again later.", active_session)
            }
            Err(rejection) => warn!("Lift request rejected: {}", rejection),
        }
        result
    }

    /// Consumes requests until the channel closes or `shutdown` fires
    pub async fn run(&self, mut requests: mpsc::Receiver<LiftRequestMessage>, shutdown: CancelSignal) {
        info!("Lift Controller for {} waiting for requests", self.lift_name);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                message = requests.recv() => match message {
                    Some(message) => {
                        let _ = self.handle_request(message).await;
                    }
                    None => {
                        info!("Lift request channel closed");
                        break;
                    }
                },
            }
        }
    }
}
