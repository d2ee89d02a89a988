//! Projectile force model
//!
//! Forces are captured from the world environment when the projectile is
//! registered (or when its factors change):
//! - air drag `arf = air_resistance * air_resist_factor`
//! - gravity `gf = gravity * gravity_factor * mass`
//! - wind `wf = wind * wind_factor`
//!
//! Each tick integrates x under `wf` and y under `gf`, both with drag `arf`.

use glam::Vec2;

use super::integrator::{EulerVector, Integrator};
use super::world::Environment;
use crate::consts::*;

/// Smallest mass accepted; keeps `F / m` finite
const MIN_MASS: f32 = 1e-3;

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub mass: f32,
    pub gravity_factor: f32,
    pub wind_factor: f32,
    pub air_resist_factor: f32,
    /// Horizontal axis state
    pub vx: EulerVector,
    /// Vertical axis state (y grows downward)
    pub vy: EulerVector,
    /// Cached force terms
    pub arf: f32,
    pub gf: f32,
    pub wf: f32,
    /// Set on the first terminal transition
    pub is_exploded: bool,
    /// Crater shape to dig on impact (falls back to a circle)
    pub crater: Option<String>,
}

impl Default for Projectile {
    fn default() -> Self {
        Self::new(
            PROJECTILE_MASS,
            PROJECTILE_GRAVITY_FACTOR,
            PROJECTILE_WIND_FACTOR,
            PROJECTILE_AIR_FACTOR,
        )
    }
}

impl Projectile {
    pub fn new(mass: f32, gravity_factor: f32, wind_factor: f32, air_resist_factor: f32) -> Self {
        Self {
            mass: mass.max(MIN_MASS),
            gravity_factor,
            wind_factor,
            air_resist_factor,
            vx: EulerVector::default(),
            vy: EulerVector::default(),
            arf: 0.0,
            gf: 0.0,
            wf: 0.0,
            is_exploded: false,
            crater: None,
        }
    }

    /// Builder: crater shape id
    pub fn with_crater(mut self, crater: impl Into<String>) -> Self {
        self.crater = Some(crater.into());
        self
    }

    /// Builder: launch velocity
    pub fn with_speed(mut self, vx: f32, vy: f32) -> Self {
        self.set_speed(vx, vy);
        self
    }

    pub fn set_speed(&mut self, vx: f32, vy: f32) {
        self.vx.x1 = vx;
        self.vy.x1 = vy;
    }

    /// Launch along `angle` (radians, 0 = +x, y down) at `speed`
    pub fn launch(&mut self, angle: f32, speed: f32) {
        let (sin, cos) = angle.sin_cos();
        self.set_speed(cos * speed, sin * speed);
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.vx.x1, self.vy.x1)
    }

    /// Integrated (unfloored) position
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.vx.x0, self.vy.x0)
    }

    pub(crate) fn set_position(&mut self, x: f32, y: f32) {
        self.vx.x0 = x;
        self.vy.x0 = y;
    }

    /// Recompute cached forces from the world environment
    pub fn refresh_forces(&mut self, env: &Environment) {
        self.arf = env.air_resistance * self.air_resist_factor;
        self.gf = env.gravity * self.gravity_factor * self.mass;
        self.wf = env.wind * self.wind_factor;
        log::trace!(
            "Projectile forces: air={:.3}, grav={:.3}, wind={:.3}",
            self.arf,
            self.gf,
            self.wf
        );
    }

    /// Change force factors and recompute forces
    pub fn update_force_factor(&mut self, air: f32, gravity: f32, wind: f32, env: &Environment) {
        self.air_resist_factor = air;
        self.gravity_factor = gravity;
        self.wind_factor = wind;
        self.refresh_forces(env);
    }

    /// Integrate one step and return the floored target point
    pub fn next_move_point(&mut self, integrator: &impl Integrator, dt: f32) -> Vec2 {
        integrator.step(&mut self.vx, self.mass, self.arf, self.wf, dt);
        integrator.step(&mut self.vy, self.mass, self.arf, self.gf, dt);
        Vec2::new(self.vx.x0.floor(), self.vy.x0.floor())
    }
}
