//! Impact events and the hook points the surrounding game implements

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId};

/// How a moving body's path ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Impact {
    /// Hit one or more registered bodies (ids in registry order)
    Objects(Vec<BodyId>),
    /// Probe box touched solid terrain
    Ground,
    /// Left the world (past the out-of-map margins)
    ExitedWorld,
}

impl Impact {
    /// Impacts that should blow a crater into the ground
    pub fn digs_terrain(&self) -> bool {
        !matches!(self, Impact::ExitedWorld)
    }
}

/// A resolved impact, reported once per body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactEvent {
    pub body: BodyId,
    /// Snapped sample point where the impact was detected
    pub position: Vec2,
    pub impact: Impact,
    /// Crater shape requested by the projectile, if any
    pub crater: Option<String>,
}

/// Callbacks fired when a body reaches a terminal state.
///
/// These run while the world is mid-update; use them to record or react
/// (scoring, effects, turn changes). Terrain should be changed afterwards
/// from the returned `ImpactEvent`s.
pub trait ImpactHooks {
    fn on_collide_objects(&mut self, _body: &Body, _hits: &[BodyId]) {}

    fn on_collide_ground(&mut self, _body: &Body) {}

    fn on_exit_world(&mut self, _body: &Body) {}
}

/// No-op hooks
impl ImpactHooks for () {}

/// Route an impact to the matching hook
pub(crate) fn dispatch(hooks: &mut dyn ImpactHooks, body: &Body, impact: &Impact) {
    match impact {
        Impact::Objects(hits) => hooks.on_collide_objects(body, hits),
        Impact::Ground => hooks.on_collide_ground(body),
        Impact::ExitedWorld => hooks.on_exit_world(body),
    }
}

/// Hooks that record every terminal transition as an `ImpactEvent`
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<ImpactEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn record(&mut self, body: &Body, impact: Impact) {
        let Some(id) = body.id() else {
            log::warn!("Impact reported for an unregistered body at {}", body.pos);
            return;
        };
        self.events.push(ImpactEvent {
            body: id,
            position: body.pos,
            impact,
            crater: body.as_projectile().and_then(|p| p.crater.clone()),
        });
    }
}

impl ImpactHooks for EventLog {
    fn on_collide_objects(&mut self, body: &Body, hits: &[BodyId]) {
        self.record(body, Impact::Objects(hits.to_vec()));
    }

    fn on_collide_ground(&mut self, body: &Body) {
        self.record(body, Impact::Ground);
    }

    fn on_exit_world(&mut self, body: &Body) {
        self.record(body, Impact::ExitedWorld);
    }
}
