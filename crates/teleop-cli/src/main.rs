mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use teleop_core::feed::{NoVideo, VideoFeed};
use teleop_core::input::{InputProvider, Sampler};
use teleop_core::script::{run_script, ScriptConfig};
use teleop_core::session::{self, ControlConfig, Session};
use teleop_core::vehicle::Vehicle;
use teleop_core::{doctor as core_doctor, Bindings};

use teleop_input::replay::{ReplayInput, ReplayScript};
use teleop_input::InputConfig;
use teleop_link::sim::SimVehicle;
use teleop_link::tello::TelloLink;
use teleop_link::{doctor as link_doctor, LinkConfig};
use teleop_video::{doctor as video_doctor, VideoConfig, VideoSupervisor};

#[cfg(feature = "input-sdl")]
use teleop_input::sdl::SdlInput;

use crate::telemetry::{CliSink, TelemetryConfig};

#[derive(Debug, Parser)]
#[command(name = "teleop", version, about = "Gamepad teleoperation for small UDP-commanded drones")]
struct Cli {
    #[arg(long)]
    config: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Doctor,
    /// Fly with the configured input device.
    Fly {
        /// Use a simulated vehicle and no video feed.
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the configured step list.
    Script {
        #[arg(long)]
        dry_run: bool,
    },
    Link { #[command(subcommand)] cmd: LinkCmd },
    Input { #[command(subcommand)] cmd: InputCmd },
}

#[derive(Debug, Subcommand)]
enum LinkCmd {
    /// Connect, print battery and link status, disconnect.
    Probe,
}

#[derive(Debug, Subcommand)]
enum InputCmd {
    /// List attached joysticks (SDL backend).
    List,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct Config {
    link: LinkConfig,
    video: VideoConfig,
    input: InputConfig,
    control: ControlConfig,
    bindings: Bindings,
    telemetry: TelemetryConfig,
    script: ScriptConfig,
}

fn load_config(path: &str) -> Result<Config> {
    let s = std::fs::read_to_string(path).context("read config")?;
    toml::from_str(&s).context("parse config toml")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;

    match cli.cmd {
        Command::Doctor => doctor(&cfg).await?,
        Command::Fly { dry_run } => fly(&cfg, dry_run).await?,
        Command::Script { dry_run } => script(&cfg, dry_run).await?,
        Command::Link { cmd } => link_cmd(&cfg, cmd).await?,
        Command::Input { cmd } => input_cmd(&cfg, cmd)?,
    }
    Ok(())
}

async fn doctor(cfg: &Config) -> Result<()> {
    info!("doctor: starting");

    core_doctor::check_control(&cfg.control)?;
    core_doctor::check_bindings(&cfg.bindings)?;
    core_doctor::check_script(&cfg.script.steps)?;
    link_doctor::check_link(&cfg.link)?;
    video_doctor::check_program(&cfg.video)?;
    CliSink::new(&cfg.telemetry)?;

    match cfg.input.backend.as_str() {
        "replay" => {
            let path = cfg.input.replay_file.as_deref().context("input.replay_file missing")?;
            ReplayScript::load(path)?;
        }
        "sdl" => {
            if !cfg!(feature = "input-sdl") {
                warn!("doctor: input.backend=sdl but binary built without --features input-sdl");
            }
        }
        other => anyhow::bail!("unknown input.backend: {}", other),
    }

    match link_doctor::check_host(&cfg.link).await {
        Ok(addr) => info!("doctor: vehicle resolves to {}", addr),
        Err(e) => warn!("doctor: {:#} (is the vehicle's network joined?)", e),
    }

    info!("doctor: OK");
    Ok(())
}

/// Completes on Ctrl-C. If the handler cannot be installed it never completes.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("ctrl-c handler unavailable: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn fly(cfg: &Config, dry_run: bool) -> Result<()> {
    match cfg.input.backend.as_str() {
        "replay" => {
            let path = cfg.input.replay_file.as_deref().context("input.replay_file missing")?;
            let provider = ReplayInput::new(ReplayScript::load(path)?);
            fly_with_input(cfg, provider, dry_run).await
        }
        "sdl" => {
            #[cfg(feature = "input-sdl")]
            {
                fly_with_input(cfg, SdlInput::init()?, dry_run).await
            }
            #[cfg(not(feature = "input-sdl"))]
            {
                anyhow::bail!("input.backend=sdl but binary not built with --features input-sdl")
            }
        }
        other => anyhow::bail!("unknown input.backend: {}", other),
    }
}

async fn fly_with_input<P: InputProvider>(cfg: &Config, provider: P, dry_run: bool) -> Result<()> {
    if dry_run {
        info!("fly: dry run (simulated vehicle, no video)");
        return fly_with(cfg, provider, SimVehicle::default(), NoVideo).await;
    }
    let link = TelloLink::new(cfg.link.clone());
    if cfg.video.enable {
        fly_with(cfg, provider, link, VideoSupervisor::new(cfg.video.clone())).await
    } else {
        fly_with(cfg, provider, link, NoVideo).await
    }
}

async fn fly_with<P, V, F>(cfg: &Config, provider: P, mut vehicle: V, mut video: F) -> Result<()>
where
    P: InputProvider,
    V: Vehicle,
    F: VideoFeed,
{
    let mut input = Sampler::new(provider);
    let mut sink = CliSink::new(&cfg.telemetry)?;
    let mut session = Session::new(&cfg.control, cfg.bindings.clone());

    session::fly(&mut session, &mut input, &mut vehicle, &mut video, &mut sink, interrupted()).await
}

async fn script(cfg: &Config, dry_run: bool) -> Result<()> {
    anyhow::ensure!(!cfg.script.steps.is_empty(), "no [script] steps configured");
    if dry_run {
        run_script(&mut SimVehicle::default(), &cfg.script.steps).await
    } else {
        run_script(&mut TelloLink::new(cfg.link.clone()), &cfg.script.steps).await
    }
}

async fn link_cmd(cfg: &Config, cmd: LinkCmd) -> Result<()> {
    match cmd {
        LinkCmd::Probe => {
            let mut link = TelloLink::new(cfg.link.clone());
            link.connect().await.context("connect to vehicle")?;

            let mut battery = None;
            for _ in 0..20 {
                battery = link.battery().await?;
                if battery.is_some() {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }

            let st = link.status().clone();
            println!("connected={}", st.connected);
            println!("peer={:?}", st.peer);
            println!("battery={:?}", battery);
            println!("last_state_age={:?}", st.state_age());
            println!("last_reply={:?}", st.last_reply);
            link.end_session().await?;
            Ok(())
        }
    }
}

fn input_cmd(_cfg: &Config, cmd: InputCmd) -> Result<()> {
    match cmd {
        InputCmd::List => {
            #[cfg(feature = "input-sdl")]
            {
                let sdl = SdlInput::init()?;
                for (i, name) in sdl.list()? {
                    println!("{} {}", i, name);
                }
                Ok(())
            }
            #[cfg(not(feature = "input-sdl"))]
            {
                anyhow::bail!("input listing needs the SDL backend; build with --features input-sdl")
            }
        }
    }
}
