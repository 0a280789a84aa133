use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;

use crate::input::DeviceReading;
use crate::rate::RateVector;
use crate::state::FlightState;

/// Per-frame snapshot handed to the display.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryFrame {
    pub ts_unix_ms: i64,
    pub frame: u64,
    pub flight: FlightState,
    pub trimming: bool,
    pub speed: u8,
    pub rate: RateVector,
    pub battery: Option<u8>,
    pub devices: Vec<DeviceReading>,
}

pub trait TelemetrySink {
    fn report(&mut self, frame: &TelemetryFrame) -> Result<()>;
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn report(&mut self, _frame: &TelemetryFrame) -> Result<()> {
        Ok(())
    }
}

struct Lines {
    out: String,
    indent: usize,
}

impl Lines {
    fn line(&mut self, text: impl std::fmt::Display) {
        let _ = writeln!(self.out, "{:width$}{}", "", text, width = self.indent * 2);
    }
}

/// Human-readable multi-line rendering of a frame.
pub fn render_text(frame: &TelemetryFrame) -> String {
    let mut l = Lines { out: String::new(), indent: 0 };

    l.line(format_args!("control axis: {}", frame.rate));
    match frame.battery {
        Some(b) => l.line(format_args!("battery: {}", b)),
        None => l.line("battery: --"),
    }
    l.line(format_args!(
        "flight: {:?} speed: {} trimming: {}",
        frame.flight, frame.speed, frame.trimming
    ));
    l.indent += 1;

    for dev in &frame.devices {
        l.line(format_args!("Joystick {}", dev.instance_id));
        l.indent += 1;
        l.line(format_args!("Joystick name: {}", dev.name));
        l.line(format_args!("GUID: {}", dev.guid));
        l.line(format_args!("Joystick's power level: {}", dev.power_level));

        l.line(format_args!("Number of axes: {}", dev.axes.len()));
        l.indent += 1;
        for (i, v) in dev.axes.values().iter().enumerate() {
            l.line(format_args!("Axis {} value: {:>6.3}", i, v));
        }
        l.indent -= 1;

        l.line(format_args!("Number of buttons: {}", dev.buttons.len()));
        l.indent += 1;
        for (i, b) in dev.buttons.iter().enumerate() {
            l.line(format_args!("Button {:>2} value: {}", i, u8::from(*b)));
        }
        l.indent -= 1;

        l.line(format_args!("Number of hats: {}", dev.hats.len()));
        l.indent += 1;
        for (i, h) in dev.hats.iter().enumerate() {
            l.line(format_args!("Hat {} value: ({}, {})", i, h.x, h.y));
        }
        l.indent -= 2;
    }
    l.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{AxisSnapshot, HatValue};

    fn frame() -> TelemetryFrame {
        TelemetryFrame {
            ts_unix_ms: 0,
            frame: 7,
            flight: FlightState::Airborne,
            trimming: false,
            speed: 40,
            rate: RateVector { roll: 13, pitch: 1, yaw: -3, throttle: 0 },
            battery: Some(87),
            devices: vec![DeviceReading {
                instance_id: 2,
                name: "Pad".into(),
                guid: "0300".into(),
                power_level: "full".into(),
                axes: AxisSnapshot::new(vec![0.5, -0.25]),
                buttons: vec![true, false],
                hats: vec![HatValue::new(-1, 0)],
            }],
        }
    }

    #[test]
    fn renders_header_and_device_block() {
        let text = render_text(&frame());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "control axis: [13, 1, -3, 0]");
        assert_eq!(lines[1], "battery: 87");
        assert_eq!(lines[3], "  Joystick 2");
        assert!(lines.contains(&"      Axis 0 value:  0.500"));
        assert!(lines.contains(&"      Axis 1 value: -0.250"));
        assert!(lines.contains(&"      Button  0 value: 1"));
        assert!(lines.contains(&"      Hat 0 value: (-1, 0)"));
    }

    #[test]
    fn missing_battery() {
        let mut f = frame();
        f.battery = None;
        f.devices.clear();
        assert!(render_text(&f).contains("battery: --"));
    }
}
