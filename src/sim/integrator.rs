//! Numeric integration for projectile motion
//!
//! Each axis is integrated independently as a three-state vector
//! (position, velocity, acceleration). Two schemes are available:
//!
//! - `EulerVector` (reference): `a = (F - drag * v) / m; v += a * dt; x += v * dt`
//! - `SemiImplicit`: forces are taken as accelerations, mass is ignored:
//!   `a = F - drag * v; v += a * dt; x += v * dt`
//!
//! The two produce different trajectories for the same inputs. Tuning data
//! (gravity factors, masses) is only valid for the scheme it was tuned with.

use serde::{Deserialize, Serialize};

/// Position / velocity / acceleration along one axis
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerVector {
    /// Position
    pub x0: f32,
    /// Velocity
    pub x1: f32,
    /// Acceleration (from the last step)
    pub x2: f32,
}

impl EulerVector {
    pub fn new(position: f32, velocity: f32, acceleration: f32) -> Self {
        Self {
            x0: position,
            x1: velocity,
            x2: acceleration,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Zero velocity and acceleration, keep position
    pub fn clear_motion(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
    }

    /// One Euler step of `m·x'' + drag·x' = force`
    pub fn compute_one_euler_step(&mut self, mass: f32, drag: f32, force: f32, dt: f32) {
        self.x2 = (force - drag * self.x1) / mass;
        self.x1 += self.x2 * dt;
        self.x0 += self.x1 * dt;
    }
}

impl std::fmt::Display for EulerVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x:{},v:{},a:{}", self.x0, self.x1, self.x2)
    }
}

/// Advances one axis by one timestep
pub trait Integrator {
    fn step(&self, axis: &mut EulerVector, mass: f32, drag: f32, force: f32, dt: f32);
}

/// Mass-weighted Euler-vector scheme (reference)
#[derive(Debug, Clone, Copy, Default)]
pub struct EulerVectorIntegrator;

impl Integrator for EulerVectorIntegrator {
    fn step(&self, axis: &mut EulerVector, mass: f32, drag: f32, force: f32, dt: f32) {
        axis.compute_one_euler_step(mass, drag, force, dt);
    }
}

/// Direct semi-implicit Euler, forces applied as accelerations
#[derive(Debug, Clone, Copy, Default)]
pub struct SemiImplicitEuler;

impl Integrator for SemiImplicitEuler {
    fn step(&self, axis: &mut EulerVector, _mass: f32, drag: f32, force: f32, dt: f32) {
        axis.x2 = force - drag * axis.x1;
        axis.x1 += axis.x2 * dt;
        axis.x0 += axis.x1 * dt;
    }
}

/// Integrator selection (serializable, used by settings)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IntegratorKind {
    #[default]
    EulerVector,
    SemiImplicit,
}

impl Integrator for IntegratorKind {
    fn step(&self, axis: &mut EulerVector, mass: f32, drag: f32, force: f32, dt: f32) {
        match self {
            IntegratorKind::EulerVector => EulerVectorIntegrator.step(axis, mass, drag, force, dt),
            IntegratorKind::SemiImplicit => SemiImplicitEuler.step(axis, mass, drag, force, dt),
        }
    }
}
