//! Gridfall headless runner
//!
//! Usage: `gridfall [scene] [seconds] [settings.json]`
//!
//! Runs a scene in real time on the wall clock, then prints the final world
//! snapshot as JSON on stdout. Set `RUST_LOG=debug` for per-tick output.

use std::path::Path;
use std::time::Duration;

use gridfall::sim::{Clock, Diagnostic, Scene, SimulationLoop, World};
use gridfall::{NullSurface, WorldSettings};

const DEFAULT_SECONDS: f64 = 5.0;

fn main() {
    env_logger::init();
    log::info!("Gridfall (headless) starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);

    let scene_name = args.next().unwrap_or_else(|| "platform".to_string());
    let scene = Scene::from_name(&scene_name).ok_or_else(|| format!("unknown scene: {scene_name}"))?;
    let seconds = match args.next() {
        Some(s) => s.parse::<f64>()?,
        None => DEFAULT_SECONDS,
    };
    let settings = match args.next() {
        Some(path) => WorldSettings::load(Path::new(&path))?,
        None => WorldSettings::default(),
    };

    let mut world = World::new(settings)?;
    scene.populate(&mut world)?;

    let mut sim = SimulationLoop::new(world);
    sim.start();

    let mut surface = NullSurface;
    let deadline = sim.clock().now() + seconds;
    while sim.clock().now() < deadline {
        if let Some(report) = sim.poll(&mut surface) {
            for diagnostic in sim.world_mut().drain_diagnostics() {
                let Diagnostic::UnsupportedPair { tick, first, second, error } = diagnostic;
                log::debug!("tick {tick}: {first}/{second}: {error}");
            }
            if report.tick % 50 == 0 {
                log::info!(
                    "Tick {}: {} pairs, {} contacts",
                    report.tick,
                    report.pairs_tested,
                    report.contacts
                );
            }
        }
        if let Some(wait) = sim.time_until_due() {
            std::thread::sleep(Duration::from_secs_f64(wait));
        }
    }
    sim.stop();

    let snapshot = sim.world().snapshot();
    log::info!("Finished after {} ticks", snapshot.tick);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
