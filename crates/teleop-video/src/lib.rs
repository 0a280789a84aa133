pub mod doctor;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::process::{Child, Command};
use tracing::{info, warn};

use teleop_core::feed::VideoFeed;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub enable: bool,
    /// Receiver/decoder program, started once per session.
    pub program: String,
    pub args: Vec<String>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self { enable: true, program: "./video-receiver.sh".into(), args: Vec::new() }
    }
}

/// Owns the external video receiver for the duration of a session.
///
/// `stop` kills and reaps explicitly; the child is also spawned kill-on-drop so an
/// unwinding session never leaves it behind.
pub struct VideoSupervisor {
    cfg: VideoConfig,
    child: Option<Child>,
}

impl VideoSupervisor {
    pub fn new(cfg: VideoConfig) -> Self {
        Self { cfg, child: None }
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(|c| c.id())
    }

    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(c) => matches!(c.try_wait(), Ok(None)),
            None => false,
        }
    }
}

impl VideoFeed for VideoSupervisor {
    async fn start(&mut self) -> Result<()> {
        anyhow::ensure!(self.child.is_none(), "video receiver already running");
        let child = Command::new(&self.cfg.program)
            .args(&self.cfg.args)
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawn video receiver {}", self.cfg.program))?;
        info!("video: started {} pid={:?}", self.cfg.program, child.id());
        self.child = Some(child);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else { return Ok(()) };

        if let Some(status) = child.try_wait().context("poll video receiver")? {
            warn!("video: receiver had already exited ({})", status);
            return Ok(());
        }
        child.start_kill().context("kill video receiver")?;
        let status = child.wait().await.context("reap video receiver")?;
        info!("video: stopped ({})", status);
        Ok(())
    }
}
