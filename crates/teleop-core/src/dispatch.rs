use serde::Deserialize;

use crate::input::{HatValue, InputEvent};
use crate::state::FlightState;
use crate::vehicle::FlipDirection;

/// Button numbers for each discrete action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Bindings {
    pub trim: u8,
    pub trim_reset: u8,
    pub speed_down: u8,
    pub land: u8,
    pub speed_up: u8,
    pub takeoff: u8,
}

impl Default for Bindings {
    fn default() -> Self {
        Self { trim: 0, trim_reset: 1, speed_down: 2, land: 3, speed_up: 4, takeoff: 5 }
    }
}

impl Bindings {
    pub fn buttons(&self) -> [(&'static str, u8); 6] {
        [
            ("trim", self.trim),
            ("trim_reset", self.trim_reset),
            ("speed_down", self.speed_down),
            ("land", self.land),
            ("speed_up", self.speed_up),
            ("takeoff", self.takeoff),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    StartTrim,
    StopTrim,
    ResetTrim,
    Takeoff,
    Land,
    SpeedUp,
    SpeedDown,
    Flip(FlipDirection),
    Quit,
}

/// Pure lookup of the action for one event in the given flight state.
/// Bindings are checked in a fixed order so a shared button resolves deterministically.
pub fn resolve(event: &InputEvent, flight: FlightState, bindings: &Bindings) -> Action {
    let airborne = flight == FlightState::Airborne;
    match event {
        InputEvent::ButtonDown { button, .. } => {
            let b = *button;
            if airborne && b == bindings.trim {
                Action::StartTrim
            } else if b == bindings.trim_reset {
                Action::ResetTrim
            } else if !airborne && b == bindings.takeoff {
                Action::Takeoff
            } else if airborne && b == bindings.land {
                Action::Land
            } else if airborne && b == bindings.speed_up {
                Action::SpeedUp
            } else if airborne && b == bindings.speed_down {
                Action::SpeedDown
            } else {
                Action::None
            }
        }
        InputEvent::ButtonUp { button, .. } if *button == bindings.trim => Action::StopTrim,
        InputEvent::HatMotion { value, .. } if airborne => flip_for(*value).map_or(Action::None, Action::Flip),
        InputEvent::Quit => Action::Quit,
        _ => Action::None,
    }
}

/// Horizontal deflection takes precedence on diagonals.
fn flip_for(value: HatValue) -> Option<FlipDirection> {
    match (value.x, value.y) {
        (-1, _) => Some(FlipDirection::Left),
        (1, _) => Some(FlipDirection::Right),
        (_, -1) => Some(FlipDirection::Back),
        (_, 1) => Some(FlipDirection::Forward),
        _ => None,
    }
}
