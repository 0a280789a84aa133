use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tokio::net::{lookup_host, UdpSocket};
use tracing::{debug, info, warn};

use teleop_core::vehicle::{FlipDirection, MoveDirection, Rotation, Vehicle, VehicleError};
use teleop_core::RateVector;

use crate::pacing::CommandPacer;
use crate::state::{LinkStatus, StateReport};
use crate::LinkConfig;

const MAX_DATAGRAM: usize = 2048;

/// Text-command UDP link: every command except `rc` is answered with `ok` or an error string.
pub struct TelloLink {
    cfg: LinkConfig,
    sock: Option<UdpSocket>,
    state_sock: Option<UdpSocket>,
    peer: Option<SocketAddr>,
    pacer: CommandPacer,
    status: LinkStatus,
    last_report: Option<StateReport>,
    flying: bool,
    streaming: bool,
}

impl TelloLink {
    pub fn new(cfg: LinkConfig) -> Self {
        let pacer = CommandPacer::new(Duration::from_millis(cfg.min_command_interval_ms));
        Self {
            cfg,
            sock: None,
            state_sock: None,
            peer: None,
            pacer,
            status: LinkStatus::default(),
            last_report: None,
            flying: false,
            streaming: false,
        }
    }

    pub fn status(&self) -> &LinkStatus {
        &self.status
    }

    pub fn last_report(&self) -> Option<&StateReport> {
        self.last_report.as_ref()
    }

    /// Local address the state listener is bound to.
    pub fn state_addr(&self) -> Option<SocketAddr> {
        self.state_sock.as_ref().and_then(|s| s.local_addr().ok())
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.cfg.response_timeout_ms)
    }

    /// Send a command and return the trimmed reply text.
    pub async fn query(&mut self, cmd: &str) -> Result<String, VehicleError> {
        let timeout = self.timeout();
        let sock = self.sock.as_ref().ok_or(VehicleError::NotConnected)?;
        let peer = self.peer.ok_or(VehicleError::NotConnected)?;

        self.pacer.wait().await;

        let mut buf = [0u8; MAX_DATAGRAM];
        while let Ok((n, _)) = sock.try_recv_from(&mut buf) {
            debug!("link: dropping stale reply {:?}", String::from_utf8_lossy(&buf[..n]));
        }

        debug!("link: > {}", cmd);
        sock.send_to(cmd.as_bytes(), peer).await?;
        self.status.commands_sent += 1;

        let n = match tokio::time::timeout(timeout, recv_from_peer(sock, peer, &mut buf)).await {
            Ok(r) => r?,
            Err(_) => return Err(VehicleError::Timeout { command: cmd.to_string(), after: timeout }),
        };
        let reply = String::from_utf8_lossy(&buf[..n]).trim().to_string();
        debug!("link: < {}", reply);
        self.status.last_reply = Some(reply.clone());
        Ok(reply)
    }

    /// Send a command that must be acknowledged with `ok`.
    pub async fn command(&mut self, cmd: &str) -> Result<(), VehicleError> {
        let reply = self.query(cmd).await?;
        if reply.eq_ignore_ascii_case("ok") {
            Ok(())
        } else {
            Err(VehicleError::CommandRejected { command: cmd.to_string(), reply })
        }
    }

    fn drain_state(&mut self) {
        let Some(sock) = self.state_sock.as_ref() else { return };
        let mut buf = [0u8; MAX_DATAGRAM];
        let mut latest = None;
        while let Ok((n, _)) = sock.try_recv_from(&mut buf) {
            latest = Some(StateReport::parse(&String::from_utf8_lossy(&buf[..n])));
        }
        if let Some(report) = latest.filter(|r| !r.is_empty()) {
            self.status.last_state = Some(Instant::now());
            self.last_report = Some(report);
        }
    }
}

async fn recv_from_peer(sock: &UdpSocket, peer: SocketAddr, buf: &mut [u8]) -> std::io::Result<usize> {
    loop {
        let (n, from) = sock.recv_from(buf).await?;
        if from.ip() == peer.ip() {
            return Ok(n);
        }
        debug!("link: ignoring datagram from {}", from);
    }
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr, VehicleError> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port)).await?.collect();
    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| {
            VehicleError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, format!("no address for {}", host)))
        })
}

fn flip_code(d: FlipDirection) -> char {
    match d {
        FlipDirection::Left => 'l',
        FlipDirection::Right => 'r',
        FlipDirection::Forward => 'f',
        FlipDirection::Back => 'b',
    }
}

fn move_word(d: MoveDirection) -> &'static str {
    match d {
        MoveDirection::Up => "up",
        MoveDirection::Down => "down",
        MoveDirection::Left => "left",
        MoveDirection::Right => "right",
        MoveDirection::Forward => "forward",
        MoveDirection::Back => "back",
    }
}

/// Channels go out in `RateVector` order, clamped to the SDK range.
pub fn rc_command(rates: RateVector) -> String {
    let r = rates.clamped();
    format!("rc {} {} {} {}", r.roll, r.pitch, r.yaw, r.throttle)
}

impl Vehicle for TelloLink {
    async fn connect(&mut self) -> Result<(), VehicleError> {
        let peer = resolve(&self.cfg.host, self.cfg.command_port).await?;
        let sock = UdpSocket::bind(("0.0.0.0", self.cfg.local_port)).await?;
        if self.cfg.state_enable {
            self.state_sock = Some(UdpSocket::bind(("0.0.0.0", self.cfg.state_port)).await?);
        }
        self.sock = Some(sock);
        self.peer = Some(peer);
        self.status.peer = Some(peer);

        self.command("command").await?;
        self.status.connected = true;
        info!("link: SDK mode on {}", peer);
        Ok(())
    }

    async fn takeoff(&mut self) -> Result<(), VehicleError> {
        self.command("takeoff").await?;
        self.flying = true;
        Ok(())
    }

    async fn land(&mut self) -> Result<(), VehicleError> {
        self.command("land").await?;
        self.flying = false;
        Ok(())
    }

    async fn set_speed(&mut self, tier: u8) -> Result<(), VehicleError> {
        self.command(&format!("speed {}", tier)).await
    }

    async fn send_rate_control(&mut self, rates: RateVector) -> Result<(), VehicleError> {
        let sock = self.sock.as_ref().ok_or(VehicleError::NotConnected)?;
        let peer = self.peer.ok_or(VehicleError::NotConnected)?;
        sock.send_to(rc_command(rates).as_bytes(), peer).await?;
        Ok(())
    }

    async fn flip(&mut self, direction: FlipDirection) -> Result<(), VehicleError> {
        self.command(&format!("flip {}", flip_code(direction))).await
    }

    async fn move_by(&mut self, direction: MoveDirection, cm: u32) -> Result<(), VehicleError> {
        self.command(&format!("{} {}", move_word(direction), cm)).await
    }

    async fn rotate(&mut self, rotation: Rotation, degrees: u32) -> Result<(), VehicleError> {
        let word = match rotation {
            Rotation::Cw => "cw",
            Rotation::Ccw => "ccw",
        };
        self.command(&format!("{} {}", word, degrees)).await
    }

    async fn stream_on(&mut self) -> Result<(), VehicleError> {
        self.command("streamon").await?;
        self.streaming = true;
        Ok(())
    }

    async fn stream_off(&mut self) -> Result<(), VehicleError> {
        self.command("streamoff").await?;
        self.streaming = false;
        Ok(())
    }

    async fn battery(&mut self) -> Result<Option<u8>, VehicleError> {
        self.drain_state();
        Ok(self.last_report.as_ref().and_then(StateReport::battery))
    }

    async fn end_session(&mut self) -> Result<(), VehicleError> {
        if self.sock.is_none() {
            return Ok(());
        }
        if self.flying {
            if let Err(e) = self.land().await {
                warn!("link: landing at end of session failed: {}", e);
            }
        }
        if self.streaming {
            if let Err(e) = self.stream_off().await {
                warn!("link: streamoff at end of session failed: {}", e);
            }
        }
        self.sock = None;
        self.state_sock = None;
        self.status.connected = false;
        info!("link: closed");
        Ok(())
    }
}
