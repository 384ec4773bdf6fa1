//! AquaNode simulator
//!
//! Runs the sensor node over stdin/stdout with simulated probes, so a host
//! application can be developed against it without hardware:
//!
//! ```text
//! aquanode-sim --ph-volts 1.2 --noise 4 | host-app
//! ```
//!
//! Logs go to stderr; stdout carries only protocol lines.

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use aquanode_core::{time::SystemClock, Mode, Node, NodeConfig, TimeSource};
use aquanode_link::{
    sim::{RandEntropy, SimulatedFrontEnd},
    ChannelTransport, SerialLink,
};
use clap::{Parser, ValueEnum};
use rand::{rngs::StdRng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StartMode {
    Real,
    Debug,
}

#[derive(Parser, Debug)]
#[command(name = "aquanode-sim", about = "AquaNode sensor node simulator over stdin/stdout")]
struct CliArgs {
    /// Main loop period in milliseconds
    #[arg(long, default_value_t = 10)]
    tick_ms: u64,

    /// Mode to boot into
    #[arg(long, value_enum, default_value_t = StartMode::Real)]
    mode: StartMode,

    /// RNG seed for probe noise and debug values; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated pH probe voltage
    #[arg(long, default_value_t = 1.65)]
    ph_volts: f32,

    /// Simulated EC probe voltage
    #[arg(long, default_value_t = 1.65)]
    ec_volts: f32,

    /// Simulated water temperature in °C (-127 simulates a missing probe)
    #[arg(long, default_value_t = 21.0, allow_hyphen_values = true)]
    temp: f32,

    /// ADC noise amplitude in codes
    #[arg(long, default_value_t = 2)]
    noise: u16,

    /// Start the millisecond counter here instead of 0
    #[arg(long, default_value_t = 0)]
    clock_offset: u32,

    /// JSON file overriding node timings
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<NodeConfig> {
    let Some(path) = path else {
        return Ok(NodeConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let config = load_config(args.config.as_ref())?;
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("starting simulator, seed {}, config {:?}", seed, config);

    let sensors = SimulatedFrontEnd::new(
        args.ph_volts,
        args.ec_volts,
        args.temp,
        StdRng::seed_from_u64(seed),
    )
    .with_noise(args.noise);
    let entropy = RandEntropy(StdRng::seed_from_u64(seed.wrapping_add(1)));

    let clock = SystemClock::starting_at(args.clock_offset);
    let mut node = Node::with_config(config, sensors, entropy);
    if args.mode == StartMode::Debug {
        node.set_mode(Mode::Debug, clock.now());
    }

    let mut link = SerialLink::new(ChannelTransport::stdio(), node);
    let period = Duration::from_millis(args.tick_ms);

    while !link.transport().is_closed() {
        link.poll(clock.now()).context("serial link failed")?;
        thread::sleep(period);
    }

    // Flush whatever was queued before stdin closed
    while link.queued_lines() > 0 {
        link.poll(clock.now()).context("serial link failed")?;
    }

    log::info!("input closed, stats: {}", serde_json::to_string(link.stats())?);
    Ok(())
}
