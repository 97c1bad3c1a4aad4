/// # Lift Adapter Errors
/// This module defines the error types used across the lift adapter.
/// `DeviceError` is the single failure kind returned by every device gateway call, `RequestRejection`
/// covers requests that are refused synchronously, and `LiftAdapterError` wraps everything that can
/// surface to process bootstrap.


use thiserror::Error;
use std::io;

/// Failure of a single call against the lift's vendor API.
///
/// Callers never branch on the variant: any `DeviceError` means "the call failed". The variants
/// exist so the failure can be logged meaningfully.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The device could not be reached (connection refused, DNS failure, ...).
    #[error("Device unreachable: {0}")]
    Unreachable(String),

    /// The call did not complete within the configured per-call timeout.
    #[error("Device call timed out")]
    Timeout,

    /// The device answered with a non-success HTTP status.
    #[error("Device returned HTTP status {0}")]
    Http(u16),

    /// The device answered but the payload could not be interpreted.
    #[error("Malformed device response: {0}")]
    Malformed(String),

    /// The device understood the command but refused to act on it.
    #[error("Device rejected command: {0}")]
    Rejected(String),
}

pub type DeviceResult<T> = Result<T, DeviceError>;

/// Reasons an inbound lift request is refused without changing coordinator state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestRejection {
    /// Another request already owns the lift.
    #[error("Lift is busy with session {active_session}")]
    Busy { active_session: String },

    /// The destination is not one of the lift's available floors.
    #[error("Floor {0} not available")]
    UnknownFloor(String),

    /// The device did not accept the initial floor command.
    #[error("Failed to send lift to {floor}: {source}")]
    CommandNotAccepted { floor: String, source: DeviceError },

    /// END_SESSION for a session that is not the active one.
    #[error("No active session {0}")]
    NoActiveSession(String),

    /// Request addressed to a different lift.
    #[error("Request addressed to lift {0}")]
    WrongLift(String),

    /// HUMAN request that does not say which door transition it wants.
    #[error("Human mode request from session {0} carries no door state")]
    MissingDoorState(String),
}

#[derive(Error, Debug)]
pub enum LiftAdapterError {
    /// Represents failure to establish the initial connection with the lift or the bus.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Represents errors arising from misconfigurations or invalid settings.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Represents errors raised by the message bus transport.
    #[error("Bus error: {0}")]
    BusError(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Represents errors that occur during serialization or deserialization of bus messages.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Represents errors when sending data over a channel.
    #[error("Channel send error: {0}")]
    ChannelSendError(String),
}

impl From<config::ConfigError> for LiftAdapterError {
    fn from(err: config::ConfigError) -> Self {
        LiftAdapterError::ConfigError(err.to_string())
    }
}

impl From<lapin::Error> for LiftAdapterError {
    fn from(err: lapin::Error) -> Self {
        LiftAdapterError::BusError(err.to_string())
    }
}

pub type LiftAdapterResult<T> = Result<T, LiftAdapterError>;
