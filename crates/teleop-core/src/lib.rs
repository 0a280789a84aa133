pub mod dispatch;
pub mod doctor;
pub mod error;
pub mod feed;
pub mod input;
pub mod rate;
pub mod script;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod trim;
pub mod vehicle;

pub use dispatch::{Action, Bindings};
pub use error::MappingError;
pub use input::{AxisSnapshot, DeviceReading, Frame, HatValue, InputDevice, InputEvent, InputProvider, Sampler};
pub use rate::RateVector;
pub use session::{ControlConfig, Session};
pub use state::{FlightState, TrimState};
pub use vehicle::{FlipDirection, MoveDirection, Rotation, Vehicle, VehicleError};
