//! Crater shapes and terrain destruction
//!
//! Impacts are applied after the projectile pass, from the `ImpactEvent`s the
//! tick returns. A crater id resolves to a registered shape (usually loaded
//! from a mask image), else to a circle of the id's registered radius, else
//! to a circle of the fallback radius.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use super::events::ImpactEvent;
use super::world::World;
use crate::error::SimError;
use crate::settings::Settings;
use crate::terrain::{self, TerrainBuffer};

#[derive(Debug, Clone)]
pub struct CraterSet {
    shapes: HashMap<String, TerrainBuffer>,
    borders: HashMap<String, TerrainBuffer>,
    radii: HashMap<String, u32>,
    fallback_radius: u32,
    stamp_threshold: u8,
    /// Circle stamps by radius
    circles: HashMap<u32, TerrainBuffer>,
}

impl Default for CraterSet {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl CraterSet {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            shapes: HashMap::new(),
            borders: HashMap::new(),
            radii: HashMap::new(),
            fallback_radius: settings.fallback_crater_radius,
            stamp_threshold: settings.stamp_alpha_threshold,
            circles: HashMap::new(),
        }
    }

    pub fn register_shape(&mut self, id: impl Into<String>, shape: TerrainBuffer) {
        self.shapes.insert(id.into(), shape);
    }

    /// Rim drawn on the decoration layer after digging `id`
    pub fn register_border(&mut self, id: impl Into<String>, border: TerrainBuffer) {
        self.borders.insert(id.into(), border);
    }

    pub fn register_radius(&mut self, id: impl Into<String>, radius: u32) {
        self.radii.insert(id.into(), radius);
    }

    /// Load a crater shape from an image's alpha channel
    pub fn load_shape(&mut self, id: impl Into<String>, path: &Path) -> Result<(), SimError> {
        let id = id.into();
        let shape = terrain::load_mask(path, self.stamp_threshold, true)?;
        log::info!(
            "Crater '{}' loaded from {} ({}x{})",
            id,
            path.display(),
            shape.width(),
            shape.height()
        );
        self.shapes.insert(id, shape);
        Ok(())
    }

    pub fn has_shape(&self, id: &str) -> bool {
        self.shapes.contains_key(id)
    }

    fn radius_for(&self, id: Option<&str>) -> u32 {
        id.and_then(|id| self.radii.get(id))
            .copied()
            .unwrap_or(self.fallback_radius)
    }

    fn lookup(&self, id: Option<&str>) -> Option<(&TerrainBuffer, Option<&TerrainBuffer>)> {
        let shape = id
            .and_then(|id| self.shapes.get(id))
            .or_else(|| self.circles.get(&self.radius_for(id)))?;
        let border = id.and_then(|id| self.borders.get(id));
        Some((shape, border))
    }

    /// Dig the crater for one impact. Returns whether terrain was touched.
    ///
    /// Exits and impacts past the out-of-map margins are skipped.
    pub fn apply(&mut self, world: &mut World, event: &ImpactEvent) -> bool {
        if !event.impact.digs_terrain() {
            return false;
        }
        let pos = event.position;
        if world.is_out_map(pos.x, pos.y) {
            log::debug!("Impact of {} at {} is out of map, not digging", event.body, pos);
            return false;
        }

        let id = event.crater.as_deref();
        if !id.is_some_and(|id| self.shapes.contains_key(id)) {
            let radius = self.radius_for(id);
            if let Entry::Vacant(entry) = self.circles.entry(radius) {
                match TerrainBuffer::create_circle_tile(radius, true) {
                    Ok(circle) => {
                        entry.insert(circle);
                    }
                    Err(e) => {
                        log::warn!("No crater for {:?}: {e}", id);
                        return false;
                    }
                }
            }
        }

        let Some((shape, border)) = self.lookup(id) else {
            return false;
        };
        world.dig(pos.x, pos.y, shape, border);
        true
    }

    /// Apply a batch of impacts in order. Returns how many dug terrain.
    pub fn apply_all(&mut self, world: &mut World, events: &[ImpactEvent]) -> usize {
        events.iter().filter(|e| self.apply(world, e)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodyId;
    use crate::sim::events::Impact;
    use crate::sim::world::MapInfo;
    use crate::terrain::generate::flat_ground;
    use glam::Vec2;

    fn ground_world() -> World {
        let ground = flat_ground(200, 200, 100).unwrap();
        World::new(MapInfo::default(), ground, None, &Settings::default()).unwrap()
    }

    fn event(x: f32, y: f32, impact: Impact, crater: Option<&str>) -> ImpactEvent {
        ImpactEvent {
            body: BodyId { index: 0, generation: 0 },
            position: Vec2::new(x, y),
            impact,
            crater: crater.map(str::to_string),
        }
    }

    #[test]
    fn test_fallback_circle() {
        let mut world = ground_world();
        let mut craters = CraterSet::default();
        assert!(craters.apply(&mut world, &event(50.0, 100.0, Impact::Ground, None)));

        assert!(world.is_empty(50, 110));
        assert!(world.is_empty(75, 110));
        assert!(!world.is_empty(50, 135));
        assert!(!world.is_empty(90, 110));
    }

    #[test]
    fn test_registered_radius_and_shape() {
        let mut world = ground_world();
        let mut craters = CraterSet::default();
        craters.register_radius("small", 5);
        craters.register_shape("slot", TerrainBuffer::create_rect_tile(2, 40, true).unwrap());

        craters.apply(&mut world, &event(50.0, 100.0, Impact::Ground, Some("small")));
        assert!(world.is_empty(50, 104));
        assert!(!world.is_empty(50, 106));

        craters.apply(&mut world, &event(150.0, 100.0, Impact::Objects(vec![]), Some("slot")));
        assert!(world.is_empty(150, 119));
        assert!(!world.is_empty(150, 121));
        assert!(!world.is_empty(152, 105));
    }

    #[test]
    fn test_border_only_decorates() {
        let ground = flat_ground(200, 200, 100).unwrap();
        let decoration = TerrainBuffer::create_empty(200, 200, true).unwrap();
        let mut world =
            World::new(MapInfo::default(), ground, Some(decoration), &Settings::default()).unwrap();
        let mut craters = CraterSet::default();
        craters.register_shape("hole", TerrainBuffer::create_circle_tile(20, true).unwrap());
        let ring = TerrainBuffer::from_fn(50, 50, true, |x, y| {
            let d = (x - 25) * (x - 25) + (y - 25) * (y - 25);
            (19 * 19..=22 * 22).contains(&d)
        })
        .unwrap();
        craters.register_border("hole", ring);

        assert!(craters.apply(&mut world, &event(100.0, 120.0, Impact::Ground, Some("hole"))));
        // Crater stays open and nothing grows above the old surface
        assert!(world.is_empty(100, 120));
        assert!(world.is_empty(100, 139));
        assert!(world.is_empty(100, 99));

        // The rim is drawn on the decoration layer
        let decoration = world.decoration().unwrap();
        assert!(!decoration.is_empty(100, 140));
        assert!(!decoration.is_empty(100, 99));
        assert!(decoration.is_empty(100, 120));
    }

    #[test]
    fn test_exits_and_out_of_map_are_skipped() {
        let mut world = ground_world();
        let before = world.ground().clone();
        let mut craters = CraterSet::default();

        assert!(!craters.apply(&mut world, &event(50.0, 150.0, Impact::ExitedWorld, None)));
        assert!(!craters.apply(&mut world, &event(-150.0, 150.0, Impact::Ground, None)));
        assert_eq!(world.ground(), &before);
    }

    #[test]
    fn test_zero_radius_is_skipped() {
        let mut world = ground_world();
        let mut craters = CraterSet::default();
        craters.register_radius("dud", 0);
        assert!(!craters.apply(&mut world, &event(50.0, 110.0, Impact::Ground, Some("dud"))));
        assert!(!world.is_empty(50, 110));
    }

    #[test]
    fn test_apply_all_counts_digs() {
        let mut world = ground_world();
        let mut craters = CraterSet::default();
        let events = [
            event(30.0, 100.0, Impact::Ground, None),
            event(60.0, 100.0, Impact::ExitedWorld, None),
            event(170.0, 100.0, Impact::Ground, None),
        ];
        assert_eq!(craters.apply_all(&mut world, &events), 2);
    }
}
