#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use teleop_core::feed::VideoFeed;
use teleop_core::input::{AxisSnapshot, DeviceReading, HatValue, InputDevice, InputEvent, InputProvider};
use teleop_core::vehicle::{FlipDirection, MoveDirection, Rotation, Vehicle, VehicleError};
use teleop_core::RateVector;

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn count(log: &Log, prefix: &str) -> usize {
    log.borrow().iter().filter(|l| l.starts_with(prefix)).count()
}

/// Records every command; rejects the command named in `reject`.
pub struct RecordingVehicle {
    pub log: Log,
    pub reject: Option<&'static str>,
}

impl RecordingVehicle {
    pub fn new(log: Log) -> Self {
        Self { log, reject: None }
    }

    fn record(&mut self, cmd: String) -> Result<(), VehicleError> {
        self.log.borrow_mut().push(cmd.clone());
        match self.reject {
            Some(r) if cmd.starts_with(r) => Err(VehicleError::CommandRejected { command: cmd, reply: "error".into() }),
            _ => Ok(()),
        }
    }
}

impl Vehicle for RecordingVehicle {
    async fn connect(&mut self) -> Result<(), VehicleError> {
        self.record("connect".into())
    }
    async fn takeoff(&mut self) -> Result<(), VehicleError> {
        self.record("takeoff".into())
    }
    async fn land(&mut self) -> Result<(), VehicleError> {
        self.record("land".into())
    }
    async fn set_speed(&mut self, tier: u8) -> Result<(), VehicleError> {
        self.record(format!("speed {}", tier))
    }
    async fn send_rate_control(&mut self, r: RateVector) -> Result<(), VehicleError> {
        self.record(format!("rc {} {} {} {}", r.roll, r.pitch, r.yaw, r.throttle))
    }
    async fn flip(&mut self, d: FlipDirection) -> Result<(), VehicleError> {
        self.record(format!("flip {:?}", d))
    }
    async fn move_by(&mut self, d: MoveDirection, cm: u32) -> Result<(), VehicleError> {
        self.record(format!("move {:?} {}", d, cm))
    }
    async fn rotate(&mut self, r: Rotation, deg: u32) -> Result<(), VehicleError> {
        self.record(format!("rotate {:?} {}", r, deg))
    }
    async fn stream_on(&mut self) -> Result<(), VehicleError> {
        self.record("streamon".into())
    }
    async fn stream_off(&mut self) -> Result<(), VehicleError> {
        self.record("streamoff".into())
    }
    async fn battery(&mut self) -> Result<Option<u8>, VehicleError> {
        Ok(Some(90))
    }
    async fn end_session(&mut self) -> Result<(), VehicleError> {
        self.record("end".into())
    }
}

pub struct RecordingVideo {
    pub log: Log,
    pub fail_start: bool,
}

impl VideoFeed for RecordingVideo {
    async fn start(&mut self) -> anyhow::Result<()> {
        self.log.borrow_mut().push("video start".into());
        anyhow::ensure!(!self.fail_start, "spawn failed");
        Ok(())
    }

    async fn stop(&mut self) -> anyhow::Result<()> {
        self.log.borrow_mut().push("video stop".into());
        Ok(())
    }
}

/// Device whose axes can be changed from the test between frames.
pub struct SharedDevice {
    pub id: u32,
    pub axes: Rc<RefCell<Vec<f32>>>,
}

impl InputDevice for SharedDevice {
    fn instance_id(&self) -> u32 {
        self.id
    }

    fn read(&self) -> anyhow::Result<DeviceReading> {
        Ok(DeviceReading {
            instance_id: self.id,
            name: "test pad".into(),
            guid: "00".into(),
            power_level: "wired".into(),
            axes: AxisSnapshot::new(self.axes.borrow().clone()),
            buttons: vec![false; 6],
            hats: vec![HatValue::default()],
        })
    }
}

/// Plays back one event batch per poll, then reports nothing.
pub struct QueuedInput {
    pub batches: VecDeque<Vec<InputEvent>>,
    pub axes: Rc<RefCell<Vec<f32>>>,
}

impl QueuedInput {
    pub fn new(batches: Vec<Vec<InputEvent>>) -> Self {
        Self { batches: batches.into(), axes: Rc::new(RefCell::new(vec![0.0; 4])) }
    }
}

impl InputProvider for QueuedInput {
    type Device = SharedDevice;

    fn poll(&mut self) -> anyhow::Result<Vec<InputEvent>> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }

    fn open(&mut self, device_index: u32) -> anyhow::Result<SharedDevice> {
        Ok(SharedDevice { id: device_index, axes: self.axes.clone() })
    }
}

pub fn down(button: u8) -> InputEvent {
    InputEvent::ButtonDown { instance_id: 0, button }
}

pub fn up(button: u8) -> InputEvent {
    InputEvent::ButtonUp { instance_id: 0, button }
}

pub fn hat(x: i8, y: i8) -> InputEvent {
    InputEvent::HatMotion { instance_id: 0, hat: 0, value: HatValue::new(x, y) }
}

pub fn frame(events: Vec<InputEvent>, axes: &[f32]) -> teleop_core::Frame {
    teleop_core::Frame {
        events,
        readings: vec![DeviceReading {
            instance_id: 0,
            name: "test pad".into(),
            guid: "00".into(),
            power_level: "wired".into(),
            axes: AxisSnapshot::new(axes.to_vec()),
            buttons: vec![],
            hats: vec![],
        }],
    }
}

pub fn never() -> std::future::Pending<()> {
    std::future::pending()
}

pub fn after(ms: u64) -> impl std::future::Future<Output = ()> {
    tokio::time::sleep(Duration::from_millis(ms))
}
