use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::MappingError;

/// Axes 0..4 drive the rate channels; any further axes are reported but not flown.
pub const CONTROL_AXES: usize = 4;

/// Directional pad position, each component in {-1, 0, 1}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HatValue {
    pub x: i8,
    pub y: i8,
}

impl HatValue {
    pub fn new(x: i8, y: i8) -> Self {
        Self { x: x.signum(), y: y.signum() }
    }

    pub fn is_centered(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// Discrete events, delivered in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ButtonDown { instance_id: u32, button: u8 },
    ButtonUp { instance_id: u32, button: u8 },
    HatMotion { instance_id: u32, hat: u8, value: HatValue },
    /// `device_index` is the provider's enumeration index, not an instance id.
    DeviceAdded { device_index: u32 },
    DeviceRemoved { instance_id: u32 },
    Quit,
}

/// Axis values of one device sampled at a single instant, each in [-1.0, 1.0].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct AxisSnapshot(Vec<f32>);

impl AxisSnapshot {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn zero(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Result<f32, MappingError> {
        self.0
            .get(index)
            .copied()
            .ok_or(MappingError::IndexOutOfRange { index, len: self.0.len() })
    }

    /// The leading axes that map onto rate channels.
    pub fn control(&self) -> Result<AxisSnapshot, MappingError> {
        if self.0.len() < CONTROL_AXES {
            return Err(MappingError::IndexOutOfRange { index: CONTROL_AXES - 1, len: self.0.len() });
        }
        Ok(Self(self.0[..CONTROL_AXES].to_vec()))
    }
}

impl From<Vec<f32>> for AxisSnapshot {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Everything a device reports in one frame. Used for control and for the telemetry display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceReading {
    pub instance_id: u32,
    pub name: String,
    pub guid: String,
    pub power_level: String,
    pub axes: AxisSnapshot,
    pub buttons: Vec<bool>,
    pub hats: Vec<HatValue>,
}

/// An opened input device.
pub trait InputDevice {
    fn instance_id(&self) -> u32;
    fn read(&self) -> Result<DeviceReading>;
}

/// Source of discrete events and device handles. `poll` must not block.
pub trait InputProvider {
    type Device: InputDevice;

    fn poll(&mut self) -> Result<Vec<InputEvent>>;
    fn open(&mut self, device_index: u32) -> Result<Self::Device>;
}

/// Attached devices keyed by instance id, iterated in attach order.
pub struct DeviceRegistry<D> {
    devices: Vec<(u32, D)>,
}

impl<D> Default for DeviceRegistry<D> {
    fn default() -> Self {
        Self { devices: Vec::new() }
    }
}

impl<D> DeviceRegistry<D> {
    pub fn insert(&mut self, instance_id: u32, device: D) {
        if let Some(slot) = self.devices.iter_mut().find(|(id, _)| *id == instance_id) {
            slot.1 = device;
        } else {
            self.devices.push((instance_id, device));
        }
    }

    pub fn remove(&mut self, instance_id: u32) -> Option<D> {
        let pos = self.devices.iter().position(|(id, _)| *id == instance_id)?;
        Some(self.devices.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.devices.iter().map(|(id, _)| *id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &D> {
        self.devices.iter().map(|(_, d)| d)
    }
}

/// One frame of input: the events since the previous poll and a reading of every device.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub events: Vec<InputEvent>,
    pub readings: Vec<DeviceReading>,
}

impl Frame {
    /// Axes that drive the vehicle this frame. With several devices the last one attached wins.
    pub fn active_axes(&self) -> Option<&AxisSnapshot> {
        self.readings.last().map(|r| &r.axes)
    }
}

pub struct Sampler<P: InputProvider> {
    provider: P,
    registry: DeviceRegistry<P::Device>,
}

impl<P: InputProvider> Sampler<P> {
    pub fn new(provider: P) -> Self {
        Self { provider, registry: DeviceRegistry::default() }
    }

    pub fn registry(&self) -> &DeviceRegistry<P::Device> {
        &self.registry
    }

    /// Polls pending events, applies hot-plug changes, then reads every registered device.
    pub fn sample(&mut self) -> Result<Frame> {
        let events = self.provider.poll().context("poll input events")?;

        for ev in &events {
            match ev {
                InputEvent::DeviceAdded { device_index } => {
                    let dev = self
                        .provider
                        .open(*device_index)
                        .with_context(|| format!("open input device {}", device_index))?;
                    let id = dev.instance_id();
                    self.registry.insert(id, dev);
                    info!("input: device {} connected", id);
                }
                InputEvent::DeviceRemoved { instance_id } => {
                    if self.registry.remove(*instance_id).is_some() {
                        info!("input: device {} disconnected", instance_id);
                    } else {
                        warn!("input: removal of unknown device {}", instance_id);
                    }
                }
                other => debug!("input: {:?}", other),
            }
        }

        let readings = self
            .registry
            .iter()
            .map(|d| d.read())
            .collect::<Result<Vec<_>>>()
            .context("read input devices")?;

        Ok(Frame { events, readings })
    }
}
