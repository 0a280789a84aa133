use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::state::{SPEED_MAX, SPEED_MIN};
use crate::vehicle::{FlipDirection, MoveDirection, Rotation, Vehicle};

/// One step of a scripted mission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Takeoff,
    Land,
    Move { direction: MoveDirection, cm: u32 },
    Rotate { direction: Rotation, degrees: u32 },
    Flip { direction: FlipDirection },
    Speed { value: u8 },
    Wait { ms: u64 },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub steps: Vec<Step>,
}

impl Step {
    /// SDK limits for relative moves and rotations.
    pub fn validate(&self) -> Result<()> {
        match self {
            Step::Move { cm, .. } => anyhow::ensure!((20..=500).contains(cm), "move distance {}cm outside 20..=500", cm),
            Step::Rotate { degrees, .. } => anyhow::ensure!((1..=360).contains(degrees), "rotation {} outside 1..=360", degrees),
            Step::Speed { value } => {
                anyhow::ensure!((SPEED_MIN..=SPEED_MAX).contains(value), "speed {} outside {}..={}", value, SPEED_MIN, SPEED_MAX)
            }
            _ => {}
        }
        Ok(())
    }

    async fn run<V: Vehicle>(&self, vehicle: &mut V) -> Result<()> {
        match *self {
            Step::Takeoff => vehicle.takeoff().await?,
            Step::Land => vehicle.land().await?,
            Step::Move { direction, cm } => vehicle.move_by(direction, cm).await?,
            Step::Rotate { direction, degrees } => vehicle.rotate(direction, degrees).await?,
            Step::Flip { direction } => vehicle.flip(direction).await?,
            Step::Speed { value } => vehicle.set_speed(value).await?,
            Step::Wait { ms } => tokio::time::sleep(Duration::from_millis(ms)).await,
        }
        Ok(())
    }
}

/// Connect, run the steps in order, and end the session whether or not a step failed.
pub async fn run_script<V: Vehicle>(vehicle: &mut V, steps: &[Step]) -> Result<()> {
    for step in steps {
        step.validate()?;
    }
    vehicle.connect().await.context("connect to vehicle")?;

    let mut res = Ok(());
    for (i, step) in steps.iter().enumerate() {
        info!("script: step {} {:?}", i + 1, step);
        if let Err(e) = step.run(vehicle).await {
            res = Err(e.context(format!("script step {} ({:?})", i + 1, step)));
            break;
        }
    }

    if let Err(e) = vehicle.end_session().await {
        warn!("script: end failed: {}", e);
    }
    res
}
