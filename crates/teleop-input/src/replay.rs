use anyhow::{Context, Result};
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::info;

use teleop_core::input::{AxisSnapshot, DeviceReading, HatValue, InputDevice, InputEvent, InputProvider};

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayDeviceSpec {
    pub name: String,
    #[serde(default = "default_axes")]
    pub axes: usize,
    #[serde(default = "default_buttons")]
    pub buttons: usize,
    #[serde(default = "default_hats")]
    pub hats: usize,
}

fn default_axes() -> usize {
    4
}

fn default_buttons() -> usize {
    6
}

fn default_hats() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplayEvent {
    Added { device: u32 },
    Removed { device: u32 },
    ButtonDown { button: u8, #[serde(default)] device: u32 },
    ButtonUp { button: u8, #[serde(default)] device: u32 },
    Hat { x: i8, y: i8, #[serde(default)] device: u32 },
    Quit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayFrame {
    /// Number of consecutive frames this entry covers. Events fire on the first only.
    #[serde(default = "one")]
    pub repeat: u32,
    #[serde(default)]
    pub events: Vec<ReplayEvent>,
    /// New axis values for every attached device, held until changed.
    pub axes: Option<Vec<f32>>,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    pub devices: Vec<ReplayDeviceSpec>,
    #[serde(default)]
    pub frames: Vec<ReplayFrame>,
}

impl ReplayScript {
    pub fn load(path: &str) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read replay file {}", path))?;
        Self::parse(&s).with_context(|| format!("parse replay file {}", path))
    }

    pub fn parse(s: &str) -> Result<Self> {
        let script: ReplayScript = toml::from_str(s)?;
        for f in &script.frames {
            for ev in &f.events {
                if let ReplayEvent::Added { device } | ReplayEvent::Removed { device } = ev {
                    anyhow::ensure!((*device as usize) < script.devices.len(), "replay event for unknown device {}", device);
                }
            }
        }
        Ok(script)
    }
}

#[derive(Debug, Clone)]
struct DeviceState {
    axes: Vec<f32>,
    buttons: Vec<bool>,
    hats: Vec<HatValue>,
}

/// Handle to a replayed device; reads see the state the script has driven so far.
pub struct ReplayDevice {
    id: u32,
    name: String,
    state: Rc<RefCell<DeviceState>>,
}

impl InputDevice for ReplayDevice {
    fn instance_id(&self) -> u32 {
        self.id
    }

    fn read(&self) -> Result<DeviceReading> {
        let st = self.state.borrow();
        Ok(DeviceReading {
            instance_id: self.id,
            name: self.name.clone(),
            guid: format!("replay-{}", self.id),
            power_level: "wired".into(),
            axes: AxisSnapshot::new(st.axes.clone()),
            buttons: st.buttons.clone(),
            hats: st.hats.clone(),
        })
    }
}

/// Plays a script one entry per poll; emits `Quit` once it runs out.
pub struct ReplayInput {
    specs: Vec<ReplayDeviceSpec>,
    states: Vec<Rc<RefCell<DeviceState>>>,
    frames: VecDeque<ReplayFrame>,
    done: bool,
}

impl ReplayInput {
    pub fn new(script: ReplayScript) -> Self {
        let states = script
            .devices
            .iter()
            .map(|d| {
                Rc::new(RefCell::new(DeviceState {
                    axes: vec![0.0; d.axes],
                    buttons: vec![false; d.buttons],
                    hats: vec![HatValue::default(); d.hats],
                }))
            })
            .collect();
        Self { specs: script.devices, states, frames: script.frames.into(), done: false }
    }

    fn apply(&self, ev: &ReplayEvent) -> InputEvent {
        match *ev {
            ReplayEvent::Added { device } => InputEvent::DeviceAdded { device_index: device },
            ReplayEvent::Removed { device } => InputEvent::DeviceRemoved { instance_id: device },
            ReplayEvent::ButtonDown { button, device } => {
                self.set_button(device, button, true);
                InputEvent::ButtonDown { instance_id: device, button }
            }
            ReplayEvent::ButtonUp { button, device } => {
                self.set_button(device, button, false);
                InputEvent::ButtonUp { instance_id: device, button }
            }
            ReplayEvent::Hat { x, y, device } => {
                let value = HatValue::new(x, y);
                if let Some(st) = self.states.get(device as usize) {
                    if let Some(h) = st.borrow_mut().hats.first_mut() {
                        *h = value;
                    }
                }
                InputEvent::HatMotion { instance_id: device, hat: 0, value }
            }
            ReplayEvent::Quit => InputEvent::Quit,
        }
    }

    fn set_button(&self, device: u32, button: u8, pressed: bool) {
        if let Some(st) = self.states.get(device as usize) {
            if let Some(b) = st.borrow_mut().buttons.get_mut(button as usize) {
                *b = pressed;
            }
        }
    }
}

impl InputProvider for ReplayInput {
    type Device = ReplayDevice;

    fn poll(&mut self) -> Result<Vec<InputEvent>> {
        let Some(mut frame) = self.frames.pop_front() else {
            if self.done {
                return Ok(Vec::new());
            }
            self.done = true;
            info!("replay: script finished");
            return Ok(vec![InputEvent::Quit]);
        };

        if let Some(axes) = &frame.axes {
            for st in &self.states {
                let mut st = st.borrow_mut();
                for (dst, src) in st.axes.iter_mut().zip(axes) {
                    *dst = *src;
                }
            }
        }
        let events = std::mem::take(&mut frame.events);
        let out: Vec<InputEvent> = events.iter().map(|ev| self.apply(ev)).collect();

        if frame.repeat > 1 {
            frame.repeat -= 1;
            frame.axes = None;
            self.frames.push_front(frame);
        }
        Ok(out)
    }

    fn open(&mut self, device_index: u32) -> Result<ReplayDevice> {
        let spec = self
            .specs
            .get(device_index as usize)
            .with_context(|| format!("no replay device {}", device_index))?;
        Ok(ReplayDevice { id: device_index, name: spec.name.clone(), state: self.states[device_index as usize].clone() })
    }
}
