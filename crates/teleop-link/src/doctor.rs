use anyhow::{Context, Result};
use std::net::SocketAddr;

use crate::LinkConfig;

pub fn check_link(cfg: &LinkConfig) -> Result<()> {
    anyhow::ensure!(!cfg.host.is_empty(), "link.host missing");
    anyhow::ensure!(cfg.command_port > 0, "link.command_port invalid");
    anyhow::ensure!(!cfg.state_enable || cfg.state_port > 0, "link.state_port invalid");
    anyhow::ensure!(
        cfg.response_timeout_ms >= 100 && cfg.response_timeout_ms <= 30_000,
        "link.response_timeout_ms should be 100..=30000"
    );
    anyhow::ensure!(cfg.min_command_interval_ms <= 1000, "link.min_command_interval_ms too large");
    Ok(())
}

pub async fn check_host(cfg: &LinkConfig) -> Result<SocketAddr> {
    tokio::net::lookup_host((cfg.host.as_str(), cfg.command_port))
        .await
        .with_context(|| format!("resolve {}", cfg.host))?
        .next()
        .with_context(|| format!("no address for {}", cfg.host))
}
