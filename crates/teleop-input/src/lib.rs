pub mod replay;
#[cfg(feature = "input-sdl")]
pub mod sdl;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// "sdl" | "replay"
    pub backend: String,
    /// Frame script for the replay backend.
    pub replay_file: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { backend: "sdl".into(), replay_file: None }
    }
}

/// Axis readings arrive as signed 16-bit values; map them onto [-1.0, 1.0].
pub fn normalize_axis(raw: i16) -> f32 {
    (f32::from(raw) / 32767.0).clamp(-1.0, 1.0)
}
