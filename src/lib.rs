//! Crater Sim - destructible terrain and projectile physics for side-view artillery games
//!
//! Core modules:
//! - `terrain`: Bit-packed solidity bitmaps, stamping/erasing, mask ingestion
//! - `sim`: Deterministic simulation (world registry, motion, collisions, tick)
//! - `settings`: Data-driven tuning (thresholds, margins, integrator choice)
//! - `error`: Error type for the few fallible operations (construction, loading)

pub mod error;
pub mod settings;
pub mod sim;
pub mod terrain;

pub use error::SimError;
pub use settings::{Precision, Settings};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed integration timestep used by projectiles (seconds per tick)
    pub const SIM_DT: f32 = 0.1;

    /// Alpha above which a ground-image pixel counts as solid
    pub const GROUND_ALPHA_THRESHOLD: u8 = 250;
    /// Alpha above which a crater/obstacle mask pixel counts as solid
    pub const STAMP_ALPHA_THRESHOLD: u8 = 50;

    /// Slack before a body is considered to have left the map
    pub const OUT_OF_MAP_LEFT: i32 = 100;
    pub const OUT_OF_MAP_RIGHT: i32 = 100;
    pub const OUT_OF_MAP_BOTTOM: i32 = 500;

    /// Raycast stride along the dominant axis (pixels)
    pub const STEP_SIZE: u32 = 2;
    /// Terrain probe half-size around a sampled point (1 => 3x3 box)
    pub const PROBE_RADIUS: i32 = 1;
    /// Longest single move (pixels along the dominant axis) a raycast samples
    pub const MAX_TRACE_SAMPLES: i64 = 1 << 16;

    /// Spawn point used when a team has none configured
    pub const FALLBACK_SPAWN: (i32, i32) = (100, 100);

    /// Default map gravity when metadata omits it
    pub const DEFAULT_GRAVITY: f32 = 9.8;

    /// Projectile defaults
    pub const PROJECTILE_MASS: f32 = 10.0;
    pub const PROJECTILE_GRAVITY_FACTOR: f32 = 100.0;
    pub const PROJECTILE_WIND_FACTOR: f32 = 1.0;
    pub const PROJECTILE_AIR_FACTOR: f32 = 1.0;
    pub const PROJECTILE_SIZE: i32 = 4;

    /// Default body bounding box
    pub const BODY_SIZE: i32 = 10;

    /// Walker resting-contact tuning
    pub const WALKER_FALL_STEP: f32 = 4.0;
    pub const WALKER_MAX_STEP_HEIGHT: i32 = 4;

    /// Crater radius used when an impact id has no registered shape
    pub const FALLBACK_CRATER_RADIUS: u32 = 30;
}

/// Floor a float coordinate onto the pixel grid
#[inline]
pub fn to_pixel(v: f32) -> i32 {
    v.floor() as i32
}

/// Angle (radians) of the line between two ground contacts
#[inline]
pub fn slope_angle(left: Vec2, right: Vec2) -> f32 {
    let d = right - left;
    d.y.atan2(d.x)
}
