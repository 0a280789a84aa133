use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use teleop_core::telemetry::{render_text, TelemetryFrame, TelemetrySink};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// "log" | "terminal" | "json" | "off"
    pub mode: String,
    pub every_n_frames: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { mode: "log".into(), every_n_frames: 30 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Log,
    Terminal,
    Json,
    Off,
}

pub struct CliSink {
    mode: Mode,
    every_n: u64,
}

impl CliSink {
    pub fn new(cfg: &TelemetryConfig) -> Result<Self> {
        let mode = match cfg.mode.as_str() {
            "log" => Mode::Log,
            "terminal" => Mode::Terminal,
            "json" => Mode::Json,
            "off" => Mode::Off,
            other => anyhow::bail!("unknown telemetry.mode: {}", other),
        };
        Ok(Self { mode, every_n: cfg.every_n_frames.max(1) })
    }

    fn due(&self, frame: u64) -> bool {
        self.mode != Mode::Off && frame % self.every_n == 0
    }
}

impl TelemetrySink for CliSink {
    fn report(&mut self, frame: &TelemetryFrame) -> Result<()> {
        if !self.due(frame.frame) {
            return Ok(());
        }
        match self.mode {
            Mode::Log => {
                for line in render_text(frame).lines() {
                    info!("telemetry: {}", line);
                }
            }
            Mode::Terminal => print!("\x1b[2J\x1b[H{}", render_text(frame)),
            Mode::Json => println!("{}", serde_json::to_string(frame).context("encode telemetry")?),
            Mode::Off => {}
        }
        Ok(())
    }
}
