use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::rate::RateVector;

#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("vehicle rejected `{command}`: {reply}")]
    CommandRejected { command: String, reply: String },

    #[error("no reply to `{command}` within {after:?}")]
    Timeout { command: String, after: Duration },

    #[error("vehicle not connected")]
    NotConnected,

    #[error("unexpected reply to `{command}`: {reply}")]
    Protocol { command: String, reply: String },

    #[error("link i/o")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipDirection {
    Left,
    Right,
    Forward,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
    Forward,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    Cw,
    Ccw,
}

/// Command surface of the remotely piloted vehicle.
///
/// Every call may fail with `CommandRejected` or `Timeout`; callers surface failures
/// and never retry. `send_rate_control` is fire-and-forget and clamps at the boundary.
#[allow(async_fn_in_trait)]
pub trait Vehicle {
    async fn connect(&mut self) -> Result<(), VehicleError>;
    async fn takeoff(&mut self) -> Result<(), VehicleError>;
    async fn land(&mut self) -> Result<(), VehicleError>;
    async fn set_speed(&mut self, tier: u8) -> Result<(), VehicleError>;
    async fn send_rate_control(&mut self, rates: RateVector) -> Result<(), VehicleError>;
    async fn flip(&mut self, direction: FlipDirection) -> Result<(), VehicleError>;
    async fn move_by(&mut self, direction: MoveDirection, cm: u32) -> Result<(), VehicleError>;
    async fn rotate(&mut self, rotation: Rotation, degrees: u32) -> Result<(), VehicleError>;
    async fn stream_on(&mut self) -> Result<(), VehicleError>;
    async fn stream_off(&mut self) -> Result<(), VehicleError>;
    /// Battery percentage from the latest state report, if any has arrived.
    async fn battery(&mut self) -> Result<Option<u8>, VehicleError>;
    /// Best-effort session close. Must be safe to call in any flight state.
    async fn end_session(&mut self) -> Result<(), VehicleError>;
}
