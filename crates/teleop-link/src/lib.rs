pub mod doctor;
pub mod pacing;
pub mod sim;
pub mod state;
pub mod tello;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Vehicle host name or address. Resolved once at connect.
    pub host: String,
    pub command_port: u16,

    /// Local port commands are sent from. 0 picks an ephemeral port.
    pub local_port: u16,

    /// Listen for `key:value;` state reports (battery etc).
    pub state_enable: bool,
    pub state_port: u16,

    pub response_timeout_ms: u64,

    /// Minimum spacing between acknowledged commands.
    pub min_command_interval_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            host: "tello".into(),
            command_port: 8889,
            local_port: 8889,
            state_enable: true,
            state_port: 8890,
            response_timeout_ms: 7000,
            min_command_interval_ms: 100,
        }
    }
}
