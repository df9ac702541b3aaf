//! Command line driver that drops a body onto flat ground.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::DVec3;
use log::info;
use serde::Serialize;
use tumble::body::BodySnapshot;
use tumble::events::{Damage, GameEvent, Recorded};
use tumble::prelude::*;
use tumble::{init_logging, TravelMode};

/// Drops a body onto flat ground and reports how it landed
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// Movement tunables in TOML
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Ticks to simulate
    #[arg(short, long, default_value_t = 60)]
    ticks: u32,
    /// Height above the ground the body starts at
    #[arg(short, long, default_value_t = 10.0)]
    drop_height: f64,
    /// Print a JSON summary instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Summary {
    ticks: u32,
    landed_at_tick: Option<u32>,
    final_mode: Option<TravelMode>,
    body: BodySnapshot,
    damage: Vec<Damage>,
    events: Vec<GameEvent>,
}

fn run(args: &Args) -> Result<Summary> {
    let config = match &args.config {
        Some(path) => MotionConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => MotionConfig::default(),
    };
    if !args.drop_height.is_finite() || args.drop_height < 0.0 {
        anyhow::bail!("drop height must be a non-negative number");
    }
    let terrain = VoxelTerrain::flat(16, BlockState::solid("stone"));
    let mut hooks = EventLog::new();
    let mut body = Body::configured(EntityId(1), DVec3::new(0.5, args.drop_height, 0.5), &config);
    let mut landed_at_tick = None;
    let mut final_mode = None;
    for tick in 1..=args.ticks {
        let mut ctx = MotionContext::new(&terrain, &mut hooks, &config);
        let report = tick_body(&mut ctx, &mut body, &MoveInput::default())
            .with_context(|| format!("tick {tick}"))?;
        final_mode = report.mode;
        if landed_at_tick.is_none() && body.on_ground() {
            landed_at_tick = Some(tick);
            info!("landed after {tick} ticks at y = {:.3}", body.position().y);
        }
    }
    let damage = hooks.damage().copied().collect();
    let events = hooks
        .entries
        .iter()
        .filter_map(|entry| match entry {
            Recorded::Event(event) => Some(event.clone()),
            _ => None,
        })
        .collect();
    Ok(Summary {
        ticks: args.ticks,
        landed_at_tick,
        final_mode,
        body: body.snapshot(),
        damage,
        events,
    })
}

#[expect(clippy::print_stdout, reason = "The summary is the program's output.")]
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let summary = run(&args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    let p = summary.body.position;
    println!("simulated {} ticks", summary.ticks);
    match summary.landed_at_tick {
        Some(tick) => println!("landed on tick {tick}"),
        None => println!("still airborne"),
    }
    println!("final position ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
    let total: f32 = summary.damage.iter().map(|d| d.amount).sum();
    println!("fall damage {total}");
    Ok(())
}
