//! Procedural terrain for demos and physics tests
//!
//! Flat ground across the bottom quarter plus two right-triangle ramps: a
//! gentle one for walking tests and a steep one that behaves like a wall.

use super::buffer::TerrainBuffer;
use crate::error::SimError;

/// Right triangle rising from `(x0, base)` to `(x1, base - rise)`
struct Ramp {
    x0: i32,
    x1: i32,
    rise: i32,
}

impl Ramp {
    fn contains(&self, x: i32, y: i32, base: i32) -> bool {
        if x < self.x0 || x >= self.x1 || y >= base {
            return false;
        }
        let t = (x - self.x0) as f32 / (self.x1 - self.x0) as f32;
        let surface = base as f32 - t * self.rise as f32;
        y as f32 >= surface
    }
}

/// Row where the flat ground starts for a map of the given height
pub fn floor_y(height: u32) -> i32 {
    (height as i32 * 3) / 4
}

/// Ground + gentle ramp + steep ramp, scaled to the requested size
pub fn physics_test_map(width: u32, height: u32) -> Result<TerrainBuffer, SimError> {
    let base = floor_y(height);
    let w = width as i32;
    let h = height as i32;
    let ramps = [
        Ramp { x0: w / 10, x1: w / 5, rise: h / 10 },
        Ramp { x0: w * 6 / 25, x1: w * 7 / 25, rise: h / 5 },
    ];

    let map = TerrainBuffer::from_fn(width, height, true, |x, y| {
        y >= base || ramps.iter().any(|r| r.contains(x, y, base))
    })?;

    log::info!(
        "Generated test map {}x{} (floor at y={}, {} solid pixels)",
        width,
        height,
        base,
        map.count_solid()
    );
    Ok(map)
}

/// Flat ground only, starting at row `ground_y`
pub fn flat_ground(width: u32, height: u32, ground_y: i32) -> Result<TerrainBuffer, SimError> {
    TerrainBuffer::from_fn(width, height, true, |_, y| y >= ground_y)
}
