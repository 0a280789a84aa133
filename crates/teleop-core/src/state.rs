use serde::Serialize;
use tracing::info;

use crate::vehicle::{Vehicle, VehicleError};

pub const SPEED_MIN: u8 = 10;
pub const SPEED_MAX: u8 = 100;
pub const SPEED_STEP: u8 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlightState {
    Grounded,
    Airborne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrimState {
    Idle,
    Trimming,
}

/// Owns flight state, trimming sub-state and speed tier. Lifecycle commands go to the
/// vehicle first; state only changes once the vehicle accepted them.
#[derive(Debug, Clone)]
pub struct FlightController {
    flight: FlightState,
    trim: TrimState,
    speed: u8,
}

impl Default for FlightController {
    fn default() -> Self {
        Self::new(SPEED_MIN)
    }
}

impl FlightController {
    pub fn new(initial_speed: u8) -> Self {
        Self {
            flight: FlightState::Grounded,
            trim: TrimState::Idle,
            speed: initial_speed.clamp(SPEED_MIN, SPEED_MAX),
        }
    }

    pub fn flight(&self) -> FlightState {
        self.flight
    }

    pub fn trim_state(&self) -> TrimState {
        self.trim
    }

    pub fn is_airborne(&self) -> bool {
        self.flight == FlightState::Airborne
    }

    pub fn is_trimming(&self) -> bool {
        self.trim == TrimState::Trimming
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    /// Returns false (and sends nothing) when already airborne.
    pub async fn takeoff<V: Vehicle>(&mut self, vehicle: &mut V) -> Result<bool, VehicleError> {
        if self.is_airborne() {
            return Ok(false);
        }
        vehicle.takeoff().await?;
        self.flight = FlightState::Airborne;
        info!("flight: airborne");
        Ok(true)
    }

    /// Returns false (and sends nothing) when grounded. Landing ends any trim capture.
    pub async fn land<V: Vehicle>(&mut self, vehicle: &mut V) -> Result<bool, VehicleError> {
        if !self.is_airborne() {
            return Ok(false);
        }
        vehicle.land().await?;
        self.flight = FlightState::Grounded;
        self.trim = TrimState::Idle;
        info!("flight: grounded");
        Ok(true)
    }

    pub async fn speed_up<V: Vehicle>(&mut self, vehicle: &mut V) -> Result<bool, VehicleError> {
        let next = self.speed.saturating_add(SPEED_STEP).min(SPEED_MAX);
        self.push_speed(vehicle, next).await
    }

    pub async fn speed_down<V: Vehicle>(&mut self, vehicle: &mut V) -> Result<bool, VehicleError> {
        let next = self.speed.saturating_sub(SPEED_STEP).max(SPEED_MIN);
        self.push_speed(vehicle, next).await
    }

    // Pushed even when clamped to the same tier, matching the button press one-to-one.
    async fn push_speed<V: Vehicle>(&mut self, vehicle: &mut V, tier: u8) -> Result<bool, VehicleError> {
        if !self.is_airborne() {
            return Ok(false);
        }
        vehicle.set_speed(tier).await?;
        self.speed = tier;
        info!("flight: speed {}", tier);
        Ok(true)
    }

    pub fn start_trim(&mut self) -> bool {
        if !self.is_airborne() {
            return false;
        }
        self.trim = TrimState::Trimming;
        true
    }

    pub fn stop_trim(&mut self) -> bool {
        let was = self.is_trimming();
        self.trim = TrimState::Idle;
        was
    }
}
