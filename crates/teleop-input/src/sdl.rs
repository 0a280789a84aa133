use anyhow::{anyhow, Result};
use sdl2::event::Event;
use sdl2::joystick::{HatState, Joystick};
use sdl2::{EventPump, JoystickSubsystem, Sdl};

use teleop_core::input::{AxisSnapshot, DeviceReading, HatValue, InputDevice, InputEvent, InputProvider};

use crate::normalize_axis;

/// SDL2 joystick backend. SDL reports already-connected devices as added events on the
/// first poll, so the registry fills itself without explicit enumeration.
pub struct SdlInput {
    _ctx: Sdl,
    joysticks: JoystickSubsystem,
    pump: EventPump,
}

impl SdlInput {
    pub fn init() -> Result<Self> {
        sdl2::hint::set("SDL_JOYSTICK_ALLOW_BACKGROUND_EVENTS", "1");
        let ctx = sdl2::init().map_err(|e| anyhow!("sdl init: {}", e))?;
        let joysticks = ctx.joystick().map_err(|e| anyhow!("sdl joystick subsystem: {}", e))?;
        let pump = ctx.event_pump().map_err(|e| anyhow!("sdl event pump: {}", e))?;
        Ok(Self { _ctx: ctx, joysticks, pump })
    }

    /// (index, name) of every attached joystick.
    pub fn list(&self) -> Result<Vec<(u32, String)>> {
        let n = self.joysticks.num_joysticks().map_err(|e| anyhow!("enumerate joysticks: {}", e))?;
        (0..n)
            .map(|i| {
                let name = self.joysticks.name_for_index(i).map_err(|e| anyhow!("joystick {} name: {}", i, e))?;
                Ok((i, name))
            })
            .collect()
    }
}

fn hat_value(state: HatState) -> HatValue {
    let (x, y) = match state {
        HatState::Centered => (0, 0),
        HatState::Up => (0, 1),
        HatState::Right => (1, 0),
        HatState::Down => (0, -1),
        HatState::Left => (-1, 0),
        HatState::RightUp => (1, 1),
        HatState::RightDown => (1, -1),
        HatState::LeftUp => (-1, 1),
        HatState::LeftDown => (-1, -1),
    };
    HatValue::new(x, y)
}

fn translate(ev: Event) -> Option<InputEvent> {
    match ev {
        Event::Quit { .. } => Some(InputEvent::Quit),
        Event::JoyButtonDown { which, button_idx, .. } => Some(InputEvent::ButtonDown { instance_id: which, button: button_idx }),
        Event::JoyButtonUp { which, button_idx, .. } => Some(InputEvent::ButtonUp { instance_id: which, button: button_idx }),
        Event::JoyHatMotion { which, hat_idx, state, .. } => {
            Some(InputEvent::HatMotion { instance_id: which, hat: hat_idx, value: hat_value(state) })
        }
        Event::JoyDeviceAdded { which, .. } => Some(InputEvent::DeviceAdded { device_index: which }),
        Event::JoyDeviceRemoved { which, .. } => Some(InputEvent::DeviceRemoved { instance_id: which }),
        _ => None,
    }
}

impl InputProvider for SdlInput {
    type Device = SdlDevice;

    fn poll(&mut self) -> Result<Vec<InputEvent>> {
        Ok(self.pump.poll_iter().filter_map(translate).collect())
    }

    fn open(&mut self, device_index: u32) -> Result<SdlDevice> {
        let js = self.joysticks.open(device_index).map_err(|e| anyhow!("open joystick {}: {}", device_index, e))?;
        Ok(SdlDevice(js))
    }
}

pub struct SdlDevice(Joystick);

impl InputDevice for SdlDevice {
    fn instance_id(&self) -> u32 {
        self.0.instance_id()
    }

    fn read(&self) -> Result<DeviceReading> {
        let js = &self.0;
        let axes = (0..js.num_axes())
            .map(|i| js.axis(i).map(normalize_axis).map_err(|e| anyhow!("axis {}: {}", i, e)))
            .collect::<Result<Vec<_>>>()?;
        let buttons = (0..js.num_buttons())
            .map(|i| js.button(i).map_err(|e| anyhow!("button {}: {}", i, e)))
            .collect::<Result<Vec<_>>>()?;
        let hats = (0..js.num_hats())
            .map(|i| js.hat(i).map(hat_value).map_err(|e| anyhow!("hat {}: {}", i, e)))
            .collect::<Result<Vec<_>>>()?;
        let power_level = match js.power_level() {
            Ok(p) => format!("{:?}", p),
            Err(_) => "unknown".into(),
        };

        Ok(DeviceReading {
            instance_id: js.instance_id(),
            name: js.name(),
            guid: js.guid().to_string(),
            power_level,
            axes: AxisSnapshot::new(axes),
            buttons,
            hats,
        })
    }
}
