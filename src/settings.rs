//! Simulation settings and tuning
//!
//! Loaded once at world-load time (JSON) and turned into a `SimulationContext`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;
use crate::sim::IntegratorKind;

/// Collision precision presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Precision {
    Low,
    #[default]
    Medium,
    High,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Low => "Low",
            Precision::Medium => "Medium",
            Precision::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Precision::Low),
            "medium" | "med" => Some(Precision::Medium),
            "high" => Some(Precision::High),
            _ => None,
        }
    }

    /// Raycast stride along the dominant axis.
    /// Larger strides can tunnel through thin terrain or small bodies.
    pub fn step_size(&self) -> u32 {
        match self {
            Precision::Low => 3,
            Precision::Medium => STEP_SIZE,
            Precision::High => 1,
        }
    }

    /// Terrain probe half-size around each sampled point
    pub fn probe_radius(&self) -> i32 {
        match self {
            Precision::Low => 2,
            Precision::Medium => PROBE_RADIUS,
            Precision::High => PROBE_RADIUS,
        }
    }
}

/// How far past the map edges a body may travel before it has left the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutOfMapMargins {
    pub left: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Default for OutOfMapMargins {
    fn default() -> Self {
        Self {
            left: OUT_OF_MAP_LEFT,
            right: OUT_OF_MAP_RIGHT,
            bottom: OUT_OF_MAP_BOTTOM,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Collision precision preset
    pub precision: Precision,

    // === Terrain ingestion ===
    /// Ground image alpha threshold (alpha > threshold => solid)
    pub ground_alpha_threshold: u8,
    /// Crater/obstacle mask alpha threshold
    pub stamp_alpha_threshold: u8,

    // === World bounds ===
    pub out_of_map: OutOfMapMargins,
    /// Spawn point used when a team has none
    pub fallback_spawn: (i32, i32),
    /// Seed for spawn-point selection
    pub seed: u64,

    // === Motion ===
    /// Fixed integration step (seconds)
    pub fixed_dt: f32,
    /// Numeric integration scheme for projectiles
    pub integrator: IntegratorKind,
    /// Overrides the preset stride when set
    pub step_size: Option<u32>,
    /// Overrides the preset probe radius when set
    pub probe_radius: Option<i32>,

    // === Walkers ===
    /// Fall distance per tick when nothing is underfoot
    pub walker_fall_step: f32,
    /// Largest ledge a walker snaps up onto in one tick
    pub walker_max_step_height: i32,

    // === Craters ===
    /// Circle radius for impacts without a registered shape
    pub fallback_crater_radius: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            precision: Precision::Medium,

            ground_alpha_threshold: GROUND_ALPHA_THRESHOLD,
            stamp_alpha_threshold: STAMP_ALPHA_THRESHOLD,

            out_of_map: OutOfMapMargins::default(),
            fallback_spawn: FALLBACK_SPAWN,
            seed: 0,

            fixed_dt: SIM_DT,
            integrator: IntegratorKind::default(),
            step_size: None,
            probe_radius: None,

            walker_fall_step: WALKER_FALL_STEP,
            walker_max_step_height: WALKER_MAX_STEP_HEIGHT,

            fallback_crater_radius: FALLBACK_CRATER_RADIUS,
        }
    }
}

impl Settings {
    /// Create settings from a precision preset
    pub fn from_preset(preset: Precision) -> Self {
        Self {
            precision: preset,
            ..Self::default()
        }
    }

    /// Apply a precision preset, dropping any explicit overrides
    pub fn apply_preset(&mut self, preset: Precision) {
        self.precision = preset;
        self.step_size = None;
        self.probe_radius = None;
    }

    /// Effective raycast stride (never zero)
    pub fn effective_step_size(&self) -> u32 {
        self.step_size.unwrap_or_else(|| self.precision.step_size()).max(1)
    }

    /// Effective probe radius (never negative)
    pub fn effective_probe_radius(&self) -> i32 {
        self.probe_radius
            .unwrap_or_else(|| self.precision.probe_radius())
            .max(0)
    }

    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings ({e})");
                Self::default()
            }
        }
    }
}
