use serde::Serialize;

use crate::error::MappingError;
use crate::input::AxisSnapshot;
use crate::trim::TrimVector;

/// Storage order of the control axes on the input device.
pub const AXIS_ROLL: usize = 0;
pub const AXIS_PITCH: usize = 1;
pub const AXIS_THROTTLE: usize = 2;
pub const AXIS_YAW: usize = 3;

pub const RATE_LIMIT: i32 = 100;

/// Rate-control command in transport order. Values are not clamped here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RateVector {
    pub roll: i32,
    pub pitch: i32,
    pub yaw: i32,
    pub throttle: i32,
}

impl RateVector {
    pub fn clamped(self) -> Self {
        let c = |v: i32| v.clamp(-RATE_LIMIT, RATE_LIMIT);
        Self { roll: c(self.roll), pitch: c(self.pitch), yaw: c(self.yaw), throttle: c(self.throttle) }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}

impl std::fmt::Display for RateVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.roll, self.pitch, self.yaw, self.throttle)
    }
}

/// Cubic response: fine control near center, full authority at the stops.
pub fn shape(delta: f32) -> i32 {
    (delta.powi(3) * 100.0).round() as i32
}

/// Device axes differ in sign from the vehicle for pitch and yaw.
fn sign_correct(index: usize, v: f32) -> f32 {
    match index {
        AXIS_PITCH | AXIS_YAW => -v,
        _ => v,
    }
}

/// Map a control snapshot and trim to a rate command.
///
/// Trim is subtracted in device convention and the pitch/yaw sign flip is applied to
/// the difference, which equals flipping both operands before subtracting.
pub fn map_rates(raw: &AxisSnapshot, trim: &TrimVector) -> Result<RateVector, MappingError> {
    if raw.len() != trim.len() {
        return Err(MappingError::ShapeMismatch { expected: trim.len(), got: raw.len() });
    }
    let channel = |i: usize| -> Result<i32, MappingError> {
        let delta = raw.get(i)? - trim.get(i)?;
        Ok(shape(sign_correct(i, delta)))
    };
    Ok(RateVector {
        roll: channel(AXIS_ROLL)?,
        pitch: channel(AXIS_PITCH)?,
        yaw: channel(AXIS_YAW)?,
        throttle: channel(AXIS_THROTTLE)?,
    })
}
