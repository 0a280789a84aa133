use anyhow::{Context, Result};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::dispatch::{resolve, Action, Bindings};
use crate::feed::VideoFeed;
use crate::input::{Frame, InputProvider, Sampler};
use crate::rate::{map_rates, RateVector};
use crate::state::{FlightController, SPEED_MIN};
use crate::telemetry::{TelemetryFrame, TelemetrySink};
use crate::trim::TrimCalculator;
use crate::vehicle::Vehicle;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Frames per second of the control loop.
    pub rate_hz: u32,
    pub initial_speed: u8,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self { rate_hz: 30, initial_speed: SPEED_MIN }
    }
}

impl ControlConfig {
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.rate_hz.max(1)))
    }
}

/// All mutable state of one teleoperation session. Only the loop task touches it.
pub struct Session {
    flight: FlightController,
    trim: TrimCalculator,
    bindings: Bindings,
    period: Duration,
    last_rate: RateVector,
    quit: bool,
    frames: u64,
}

impl Session {
    pub fn new(cfg: &ControlConfig, bindings: Bindings) -> Self {
        Self {
            flight: FlightController::new(cfg.initial_speed),
            trim: TrimCalculator::default(),
            bindings,
            period: cfg.frame_period(),
            last_rate: RateVector::default(),
            quit: false,
            frames: 0,
        }
    }

    pub fn flight(&self) -> &FlightController {
        &self.flight
    }

    pub fn trim(&self) -> &TrimCalculator {
        &self.trim
    }

    pub fn last_rate(&self) -> RateVector {
        self.last_rate
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    pub async fn apply<V: Vehicle>(&mut self, action: Action, vehicle: &mut V) -> Result<()> {
        match action {
            Action::None => {}
            Action::StartTrim => {
                if self.flight.start_trim() {
                    info!("trim: capturing");
                }
            }
            Action::StopTrim => {
                if self.flight.stop_trim() {
                    info!("trim: captured {:?}", self.trim.current().values());
                }
            }
            Action::ResetTrim => {
                self.trim.reset();
                info!("trim: reset");
            }
            Action::Takeoff => {
                self.flight.takeoff(vehicle).await.context("takeoff")?;
            }
            Action::Land => {
                self.flight.land(vehicle).await.context("land")?;
            }
            Action::SpeedUp => {
                self.flight.speed_up(vehicle).await.context("speed up")?;
            }
            Action::SpeedDown => {
                self.flight.speed_down(vehicle).await.context("speed down")?;
            }
            Action::Flip(dir) => {
                info!("maneuver: flip {:?}", dir);
                vehicle.flip(dir).await.with_context(|| format!("flip {:?}", dir))?;
            }
            Action::Quit => {
                info!("session: quit requested");
                self.quit = true;
            }
        }
        Ok(())
    }

    /// Process one frame: discrete events in order, then at most one rate command.
    pub async fn step<V: Vehicle>(&mut self, frame: &Frame, vehicle: &mut V) -> Result<Option<RateVector>> {
        self.frames += 1;

        for ev in &frame.events {
            let action = resolve(ev, self.flight.flight(), &self.bindings);
            if action != Action::None {
                debug!("dispatch: {:?} -> {:?}", ev, action);
            }
            self.apply(action, vehicle).await?;
        }

        if !self.flight.is_airborne() {
            return Ok(None);
        }
        let Some(axes) = frame.active_axes() else { return Ok(None) };

        let control = axes.control()?;
        if self.flight.is_trimming() {
            self.trim.capture(&control)?;
        }
        let rates = map_rates(&control, self.trim.current())?;
        vehicle.send_rate_control(rates).await.context("send rate control")?;
        self.last_rate = rates;
        Ok(Some(rates))
    }

    pub fn telemetry(&self, frame: Frame, battery: Option<u8>) -> TelemetryFrame {
        TelemetryFrame {
            ts_unix_ms: (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64,
            frame: self.frames,
            flight: self.flight.flight(),
            trimming: self.flight.is_trimming(),
            speed: self.flight.speed(),
            rate: self.last_rate,
            battery,
            devices: frame.readings,
        }
    }
}

/// Run a full session: connect, prepare the stream, supervise the video feed around the
/// control loop, then end the vehicle session on every exit path after connect.
pub async fn fly<P, V, F, T, S>(
    session: &mut Session,
    input: &mut Sampler<P>,
    vehicle: &mut V,
    video: &mut F,
    telemetry: &mut T,
    shutdown: S,
) -> Result<()>
where
    P: InputProvider,
    V: Vehicle,
    F: VideoFeed,
    T: TelemetrySink,
    S: Future<Output = ()>,
{
    vehicle.connect().await.context("connect to vehicle")?;
    info!("session: connected");

    let res = supervise(session, input, vehicle, video, telemetry, shutdown).await;
    if let Err(e) = &res {
        error!("session: {:#}", e);
    }

    if let Err(e) = vehicle.end_session().await {
        warn!("session: end failed: {}", e);
    }
    info!("session: ended after {} frames", session.frames());
    res
}

async fn supervise<P, V, F, T, S>(
    session: &mut Session,
    input: &mut Sampler<P>,
    vehicle: &mut V,
    video: &mut F,
    telemetry: &mut T,
    shutdown: S,
) -> Result<()>
where
    P: InputProvider,
    V: Vehicle,
    F: VideoFeed,
    T: TelemetrySink,
    S: Future<Output = ()>,
{
    vehicle.set_speed(session.flight.speed()).await.context("set initial speed")?;
    vehicle.stream_off().await.context("stream off")?;
    vehicle.stream_on().await.context("stream on")?;

    video.start().await.context("start video feed")?;
    let res = run_loop(session, input, vehicle, telemetry, shutdown).await;
    if let Err(e) = video.stop().await {
        warn!("video: stop failed: {:#}", e);
    }
    res
}

/// Fixed-rate loop. `shutdown` resolving has the same effect as a quit event.
pub async fn run_loop<P, V, T, S>(
    session: &mut Session,
    input: &mut Sampler<P>,
    vehicle: &mut V,
    telemetry: &mut T,
    shutdown: S,
) -> Result<()>
where
    P: InputProvider,
    V: Vehicle,
    T: TelemetrySink,
    S: Future<Output = ()>,
{
    let mut tick = tokio::time::interval(session.period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut shutdown = std::pin::pin!(shutdown);

    while !session.quit_requested() {
        let frame = input.sample()?;
        session.step(&frame, vehicle).await?;

        let battery = vehicle.battery().await.context("read battery")?;
        telemetry.report(&session.telemetry(frame, battery))?;

        tokio::select! {
            _ = tick.tick() => {}
            _ = &mut shutdown => {
                info!("session: interrupted");
                session.request_quit();
            }
        }
    }
    Ok(())
}
