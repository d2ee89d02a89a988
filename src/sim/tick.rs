//! Fixed timestep simulation tick
//!
//! One tick, in order:
//! 1. advance every live, moving projectile (registry order)
//! 2. deregister projectiles that reached a terminal state
//! 3. settle walkers, respawning any that fell out of the world
//!
//! Terrain is not touched here. Apply the returned impacts (e.g. with a
//! `CraterSet`) once the tick is done so every projectile in a tick sees
//! the same ground.

use super::body::{Body, BodyId};
use super::events::{ImpactEvent, ImpactHooks};
use super::integrator::IntegratorKind;
use super::motion::advance_projectile;
use super::walker::{Settle, settle};
use super::world::World;
use crate::settings::Settings;

/// Per-run tuning passed by reference into every update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationContext {
    /// Integration step (seconds)
    pub dt: f32,
    pub integrator: IntegratorKind,
    /// Raycast stride (pixels, at least 1)
    pub step_size: u32,
    /// Terrain probe half-size
    pub probe_radius: i32,
    pub walker_fall_step: f32,
    pub walker_max_step_height: i32,
}

impl SimulationContext {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            dt: settings.fixed_dt,
            integrator: settings.integrator,
            step_size: settings.effective_step_size(),
            probe_radius: settings.effective_probe_radius(),
            walker_fall_step: settings.walker_fall_step,
            walker_max_step_height: settings.walker_max_step_height,
        }
    }
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Impacts in resolution order
    pub impacts: Vec<ImpactEvent>,
    /// Finished projectiles, deregistered
    pub removed: Vec<Body>,
    /// Walkers moved back to a spawn point
    pub respawned: Vec<BodyId>,
}

impl TickReport {
    pub fn is_quiet(&self) -> bool {
        self.impacts.is_empty() && self.removed.is_empty() && self.respawned.is_empty()
    }
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, ctx: &SimulationContext, hooks: &mut dyn ImpactHooks) -> TickReport {
    world.advance_tick();
    let mut report = TickReport::default();

    // Projectiles
    for id in world.bodies() {
        if !world.body(id).is_some_and(Body::is_projectile) {
            continue;
        }
        if let Some(event) = advance_projectile(world, id, ctx, hooks) {
            report.impacts.push(event);
        }
    }

    // Deregister finished projectiles
    let finished: Vec<BodyId> = world
        .iter()
        .filter(|(_, body)| body.is_projectile() && !body.is_living)
        .map(|(id, _)| id)
        .collect();
    for id in finished {
        if let Some(body) = world.remove_physical(id) {
            report.removed.push(body);
        }
    }

    // Walkers
    for id in world.bodies() {
        if settle(world, id, ctx) != Some(Settle::FellOut) {
            continue;
        }
        let Some(team) = world.body(id).and_then(|b| b.as_walker()).map(|w| w.team) else {
            continue;
        };
        let spawn = world.spawn_point(team);
        if let Some(body) = world.body_mut(id) {
            body.set_xy(spawn.x as f32, spawn.y as f32);
            if let Some(walker) = body.as_walker_mut() {
                walker.grounded = false;
                walker.slope = 0.0;
            }
            log::info!("Walker {id} fell out of the world, respawned at {spawn}");
            report.respawned.push(id);
        }
    }

    if !report.is_quiet() {
        log::debug!(
            "Tick {}: {} impact(s), {} removed, {} respawned",
            world.time_ticks(),
            report.impacts.len(),
            report.removed.len(),
            report.respawned.len()
        );
    }
    report
}
