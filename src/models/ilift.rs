//! # Lift State Snapshot

//! `LiftState` is the snapshot the synchronizer assembles every poll cycle and publishes on the bus.
//! It serializes directly as the outbound state message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::models::istates::{DoorState, LiftMode, MotionState};

/// The five values read from the device in one poll cycle. Only built when every query succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiftReading {
    pub available_floors: Vec<String>,
    pub current_floor: String,
    pub destination_floor: String,
    pub door_state: DoorState,
    pub motion_state: MotionState,
}

/// Owner of the lift as seen by the state snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: String,
    pub mode: LiftMode,
}

/// Published state of the lift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiftState {
    /// When the snapshot was assembled
    pub lift_time: DateTime<Utc>,
    pub lift_name: String,
    pub available_floors: Vec<String>,
    /// Empty when the device has not reported yet
    pub current_floor: String,
    pub destination_floor: String,
    pub door_state: DoorState,
    pub motion_state: MotionState,
    pub available_modes: Vec<LiftMode>,
    /// Mode of the active session, `AGV` when idle
    pub current_mode: LiftMode,
    /// Session currently owning the lift, empty when none
    pub session_id: String,
}

impl LiftState {
    /// Placeholder held until the first successful poll. Never published.
    pub fn unknown(lift_name: &str) -> Self {
        Self {
            lift_time: Utc::now(),
            lift_name: lift_name.to_string(),
            available_floors: Vec::new(),
            current_floor: String::new(),
            destination_floor: String::new(),
            door_state: DoorState::Closed,
            motion_state: MotionState::Unknown,
            available_modes: vec![LiftMode::Human, LiftMode::Agv],
            current_mode: LiftMode::Agv,
            session_id: String::new(),
        }
    }

    /// Builds a snapshot from a complete device reading. Field values are copied unchanged.
    pub fn from_reading(lift_name: &str, reading: LiftReading, session: Option<SessionInfo>) -> Self {
        let (session_id, current_mode) = match session {
            Some(info) => (info.session_id, info.mode),
            None => (String::new(), LiftMode::Agv),
        };
        Self {
            lift_time: Utc::now(),
            lift_name: lift_name.to_string(),
            available_floors: reading.available_floors,
            current_floor: reading.current_floor,
            destination_floor: reading.destination_floor,
            door_state: reading.door_state,
            motion_state: reading.motion_state,
            available_modes: vec![LiftMode::Human, LiftMode::Agv],
            current_mode,
            session_id,
        }
    }

    pub fn has_floor(&self, floor: &str) -> bool {
        self.available_floors.iter().any(|f| f == floor)
    }

    pub fn is_at(&self, floor: &str) -> bool {
        !self.current_floor.is_empty() && self.current_floor == floor
    }
}
