use anyhow::{Context, Result};
use std::collections::HashMap;

use crate::dispatch::Bindings;
use crate::script::Step;
use crate::session::ControlConfig;
use crate::state::{SPEED_MAX, SPEED_MIN};

pub fn check_control(cfg: &ControlConfig) -> Result<()> {
    anyhow::ensure!((1..=120).contains(&cfg.rate_hz), "control.rate_hz should be 1..=120");
    anyhow::ensure!(
        (SPEED_MIN..=SPEED_MAX).contains(&cfg.initial_speed),
        "control.initial_speed should be {}..={}",
        SPEED_MIN,
        SPEED_MAX
    );
    Ok(())
}

pub fn check_bindings(b: &Bindings) -> Result<()> {
    let mut seen: HashMap<u8, &str> = HashMap::new();
    for (name, button) in b.buttons() {
        if let Some(prev) = seen.insert(button, name) {
            anyhow::bail!("bindings.{} and bindings.{} share button {}", prev, name, button);
        }
    }
    Ok(())
}

pub fn check_script(steps: &[Step]) -> Result<()> {
    for (i, s) in steps.iter().enumerate() {
        s.validate().with_context(|| format!("script step {}", i + 1))?;
    }
    Ok(())
}
