//! Crater Sim demo entry point
//!
//! Loads (or generates) a map, drops a walker at a spawn point, fires one
//! shell and runs the simulation until it lands, digging the crater.
//!
//! Usage: crater-sim [--settings <file.json>] [--map <ground.png>] [--info <map.json>]

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use crater_sim::{
    SimError, Settings,
    consts::PROJECTILE_SIZE,
    sim::{
        Body, CraterSet, EventLog, Impact, MapInfo, Projectile, SimulationContext, Team, Walker,
        World, tick,
    },
    terrain::generate::physics_test_map,
};

/// Longest the demo runs before giving up (ticks)
#[cfg(not(target_arch = "wasm32"))]
const MAX_TICKS: u32 = 2000;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
struct Args {
    settings: Option<PathBuf>,
    map: Option<PathBuf>,
    info: Option<PathBuf>,
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_args() -> Args {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--settings" => args.settings = iter.next().map(PathBuf::from),
            "--map" => args.map = iter.next().map(PathBuf::from),
            "--info" => args.info = iter.next().map(PathBuf::from),
            other => log::warn!("Ignoring unknown argument '{other}'"),
        }
    }
    args
}

#[cfg(not(target_arch = "wasm32"))]
fn build_world(args: &Args, settings: &Settings) -> Result<World, SimError> {
    let info = match &args.info {
        Some(path) => MapInfo::from_json(&std::fs::read_to_string(path)?)?,
        None => MapInfo {
            name: "physics test".to_string(),
            spawn_a: "60,40|80,40".to_string(),
            spawn_b: "700,40".to_string(),
            ..Default::default()
        },
    };

    match &args.map {
        Some(path) => World::from_image(path, info, settings),
        None => World::new(info, physics_test_map(800, 400)?, None, settings),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), SimError> {
    let args = parse_args();
    let settings = match &args.settings {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    let ctx = SimulationContext::from_settings(&settings);
    log::info!(
        "Precision {} (stride {}, probe radius {}), integrator {:?}",
        settings.precision.as_str(),
        ctx.step_size,
        ctx.probe_radius,
        ctx.integrator
    );

    let mut world = build_world(&args, &settings)?;
    let mut craters = CraterSet::from_settings(&settings);

    let spawn = world.spawn_point(Team::A);
    let walker = world.add_physical(
        Body::walker(Walker::new(Team::A), 10, 10).at(spawn.x as f32, spawn.y as f32),
    )?;

    let mut shell = Projectile::default();
    shell.launch(-std::f32::consts::FRAC_PI_4, 60.0);
    let muzzle = spawn.as_vec2() + glam::Vec2::new(12.0, -12.0);
    let shot = world.add_physical(Body::projectile(shell, PROJECTILE_SIZE).at(muzzle.x, muzzle.y))?;
    world.debug_summary();

    let solid_before = world.ground().count_solid();
    let mut log = EventLog::new();
    for _ in 0..MAX_TICKS {
        let report = tick(&mut world, &ctx, &mut log);
        craters.apply_all(&mut world, &report.impacts);
        if world.body(shot).is_none() {
            break;
        }
    }

    for event in &log.events {
        let what = match &event.impact {
            Impact::Objects(hits) => format!("hit {} object(s)", hits.len()),
            Impact::Ground => "hit the ground".to_string(),
            Impact::ExitedWorld => "left the world".to_string(),
        };
        println!("Body {} {} at ({}, {})", event.body, what, event.position.x, event.position.y);
    }
    if log.is_empty() {
        println!("Shell still in flight after {MAX_TICKS} ticks");
    }

    println!(
        "Terrain: {} -> {} solid pixels after {} ticks",
        solid_before,
        world.ground().count_solid(),
        world.time_ticks()
    );
    if let Some(body) = world.body(walker) {
        println!("Walker resting at ({}, {})", body.pos.x, body.pos.y);
    }
    world.debug_summary();
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Crater Sim (native) starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("crater-sim: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the product on wasm; there is no demo to run
}
