use tracing::info;

use teleop_core::vehicle::{FlipDirection, MoveDirection, Rotation, Vehicle, VehicleError};
use teleop_core::RateVector;

/// Accepts every command and logs it. Used for dry runs without a vehicle.
#[derive(Debug, Default)]
pub struct SimVehicle {
    connected: bool,
    flying: bool,
    speed: u8,
    last_rates: RateVector,
}

impl SimVehicle {
    pub fn is_flying(&self) -> bool {
        self.flying
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn last_rates(&self) -> RateVector {
        self.last_rates
    }

    fn ensure_connected(&self) -> Result<(), VehicleError> {
        if self.connected {
            Ok(())
        } else {
            Err(VehicleError::NotConnected)
        }
    }
}

impl Vehicle for SimVehicle {
    async fn connect(&mut self) -> Result<(), VehicleError> {
        self.connected = true;
        info!("sim: connected");
        Ok(())
    }

    async fn takeoff(&mut self) -> Result<(), VehicleError> {
        self.ensure_connected()?;
        self.flying = true;
        info!("sim: takeoff");
        Ok(())
    }

    async fn land(&mut self) -> Result<(), VehicleError> {
        self.ensure_connected()?;
        self.flying = false;
        info!("sim: land");
        Ok(())
    }

    async fn set_speed(&mut self, tier: u8) -> Result<(), VehicleError> {
        self.ensure_connected()?;
        self.speed = tier;
        info!("sim: speed {}", tier);
        Ok(())
    }

    async fn send_rate_control(&mut self, rates: RateVector) -> Result<(), VehicleError> {
        self.ensure_connected()?;
        self.last_rates = rates.clamped();
        Ok(())
    }

    async fn flip(&mut self, direction: FlipDirection) -> Result<(), VehicleError> {
        self.ensure_connected()?;
        info!("sim: flip {:?}", direction);
        Ok(())
    }

    async fn move_by(&mut self, direction: MoveDirection, cm: u32) -> Result<(), VehicleError> {
        self.ensure_connected()?;
        info!("sim: move {:?} {}cm", direction, cm);
        Ok(())
    }

    async fn rotate(&mut self, rotation: Rotation, degrees: u32) -> Result<(), VehicleError> {
        self.ensure_connected()?;
        info!("sim: rotate {:?} {}deg", rotation, degrees);
        Ok(())
    }

    async fn stream_on(&mut self) -> Result<(), VehicleError> {
        self.ensure_connected()
    }

    async fn stream_off(&mut self) -> Result<(), VehicleError> {
        self.ensure_connected()
    }

    async fn battery(&mut self) -> Result<Option<u8>, VehicleError> {
        Ok(self.connected.then_some(100))
    }

    async fn end_session(&mut self) -> Result<(), VehicleError> {
        if self.flying {
            self.flying = false;
            info!("sim: land (end of session)");
        }
        self.connected = false;
        Ok(())
    }
}
