//! # Lift Requests

//! Inbound request message as carried on the bus, and the validated commands the coordinator acts on.

use serde::{Deserialize, Serialize};
use derive_more::Display;
use crate::errors::RequestRejection;
use crate::models::istates::{DoorRequest, LiftMode};

#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    #[display("AGV")]
    Agv,
    #[display("HUMAN")]
    Human,
    #[display("END_SESSION")]
    EndSession,
}

/// Request as received from the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiftRequestMessage {
    pub lift_name: String,
    #[serde(default)]
    pub destination_floor: String,
    pub session_id: String,
    pub request_type: RequestType,
    /// Only meaningful for HUMAN requests
    #[serde(default)]
    pub door_state: Option<DoorRequest>,
}

/// How a request is driven to completion.
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum RequestMode {
    Agv,
    Human { door: DoorRequest },
}

/// A validated floor request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiftRequest {
    pub destination_floor: String,
    pub session_id: String,
    pub mode: RequestMode,
}

impl LiftRequest {
    pub fn agv(destination_floor: &str, session_id: &str) -> Self {
        Self {
            destination_floor: destination_floor.to_string(),
            session_id: session_id.to_string(),
            mode: RequestMode::Agv,
        }
    }

    pub fn human(destination_floor: &str, session_id: &str, door: DoorRequest) -> Self {
        Self {
            destination_floor: destination_floor.to_string(),
            session_id: session_id.to_string(),
            mode: RequestMode::Human { door },
        }
    }

    pub fn lift_mode(&self) -> LiftMode {
        match self.mode {
            RequestMode::Agv => LiftMode::Agv,
            RequestMode::Human { .. } => LiftMode::Human,
        }
    }

    /// Door transition asked for by a human mode requestor.
    pub fn requested_door(&self) -> Option<DoorRequest> {
        match self.mode {
            RequestMode::Agv => None,
            RequestMode::Human { door } => Some(door),
        }
    }
}

/// What an inbound message asks the coordinator to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiftCommand {
    Service(LiftRequest),
    EndSession { session_id: String },
}

impl LiftRequestMessage {
    /// Validates the message shape. A HUMAN request must carry a door state.
    pub fn into_command(self) -> Result<LiftCommand, RequestRejection> {
        match self.request_type {
            RequestType::EndSession => Ok(LiftCommand::EndSession { session_id: self.session_id }),
            RequestType::Agv => Ok(LiftCommand::Service(LiftRequest {
                destination_floor: self.destination_floor,
                session_id: self.session_id,
                mode: RequestMode::Agv,
            })),
            RequestType::Human => {
                let door = self.door_state
                    .ok_or_else(|| RequestRejection::MissingDoorState(self.session_id.clone()))?;
                Ok(LiftCommand::Service(LiftRequest {
                    destination_floor: self.destination_floor,
                    session_id: self.session_id,
                    mode: RequestMode::Human { door },
                }))
            }
        }
    }
}
