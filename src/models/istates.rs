//! # Lift State Enums

//! Door, motion and mode enumerations shared by the device gateway, the state snapshot and the bus wire format.

use serde::{Deserialize, Serialize};
use derive_more::Display;

/// Position of the lift doors as reported by the device.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DoorState {
    #[display("CLOSED")]
    Closed,
    /// Doors are opening or closing.
    #[display("MOVING")]
    Moving,
    #[display("OPEN")]
    Open,
}

/// Direction of the lift cabin.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MotionState {
    #[display("STOPPED")]
    Stopped,
    #[display("UP")]
    Up,
    #[display("DOWN")]
    Down,
    /// The device did not report a direction.
    #[display("UNKNOWN")]
    Unknown,
}

/// Mode a session is serviced under.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiftMode {
    /// Doors are left to the device; the adapter only commands floors.
    #[display("AGV")]
    Agv,
    /// The adapter opens or closes the doors after arrival.
    #[display("HUMAN")]
    Human,
}

/// Door transition a human mode requestor asks for once the lift has arrived.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DoorRequest {
    #[display("OPEN")]
    Open,
    #[display("CLOSED")]
    Closed,
}

impl DoorRequest {
    /// Door state that confirms this transition has happened.
    pub fn confirming_state(self) -> DoorState {
        match self {
            DoorRequest::Open => DoorState::Open,
            DoorRequest::Closed => DoorState::Closed,
        }
    }
}

/// States of the request coordinator's machine. `Idle` is both the initial state and the state every
/// request cycle returns to.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize, Display)]
pub enum RequestPhase {
    Idle,
    AgvInProgress,
    HumanMoving,
    HumanDoorPending,
    HumanDone,
}
