//! World: terrain layers, body registry and spatial queries
//!
//! The world owns its bodies in a generational slot map. Bodies only carry
//! their own `BodyId`; stale ids (removed bodies, reused slots) resolve to
//! `None`.

use std::path::Path;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId};
use crate::consts::DEFAULT_GRAVITY;
use crate::error::SimError;
use crate::settings::{OutOfMapMargins, Settings};
use crate::terrain::{self, Rect, TerrainBuffer};

/// Ambient forces derived from map metadata
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub gravity: f32,
    pub wind: f32,
    pub air_resistance: f32,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            wind: 0.0,
            air_resistance: 0.0,
        }
    }
}

/// Map metadata (usually loaded alongside the ground image)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapInfo {
    pub name: String,
    /// Gravity; missing or zero means the default 9.8
    pub weight: Option<f32>,
    /// Air resistance; missing means none
    pub drag_index: Option<f32>,
    /// Initial wind
    pub wind: f32,
    /// Team A spawn points, `"x,y|x,y"`
    pub spawn_a: String,
    /// Team B spawn points, `"x,y|x,y"`
    pub spawn_b: String,
}

impl MapInfo {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn environment(&self) -> Environment {
        let gravity = match self.weight {
            Some(w) if w != 0.0 && w.is_finite() => w,
            _ => DEFAULT_GRAVITY,
        };
        let air_resistance = match self.drag_index {
            Some(d) if d.is_finite() => d,
            _ => 0.0,
        };
        Environment {
            gravity,
            wind: if self.wind.is_finite() { self.wind } else { 0.0 },
            air_resistance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

#[derive(Debug, Clone)]
pub struct World {
    info: MapInfo,
    /// Primary layer: collidable and destructible
    ground: TerrainBuffer,
    /// Optional decoration layer: never collided against
    decoration: Option<TerrainBuffer>,
    bound: Rect,
    margins: OutOfMapMargins,
    env: Environment,
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
    spawn_a: Vec<IVec2>,
    spawn_b: Vec<IVec2>,
    fallback_spawn: IVec2,
    rng: Pcg32,
    time_ticks: u64,
}

impl World {
    pub fn new(
        info: MapInfo,
        ground: TerrainBuffer,
        decoration: Option<TerrainBuffer>,
        settings: &Settings,
    ) -> Result<Self, SimError> {
        if let Some(layer) = &decoration {
            let expected = (ground.width() as u32, ground.height() as u32);
            let found = (layer.width() as u32, layer.height() as u32);
            if expected != found {
                return Err(SimError::LayerMismatch { expected, found });
            }
        }
        let bound = ground.bound();
        let env = info.environment();
        let (fx, fy) = settings.fallback_spawn;

        let mut world = Self {
            ground,
            decoration,
            bound,
            margins: settings.out_of_map,
            env,
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            spawn_a: Vec::new(),
            spawn_b: Vec::new(),
            fallback_spawn: IVec2::new(fx, fy),
            rng: Pcg32::seed_from_u64(settings.seed),
            time_ticks: 0,
            info,
        };
        let (a, b) = (world.info.spawn_a.clone(), world.info.spawn_b.clone());
        world.set_spawn_points(&a, &b);

        log::info!(
            "World '{}' created: {}x{}",
            world.info.name,
            bound.width,
            bound.height
        );
        Ok(world)
    }

    /// Empty, diggable world of the given size
    pub fn empty(width: u32, height: u32, settings: &Settings) -> Result<Self, SimError> {
        let ground = TerrainBuffer::create_empty(width, height, true)?;
        Self::new(MapInfo::default(), ground, None, settings)
    }

    /// World whose ground layer is read from an image's alpha channel
    pub fn from_image(path: &Path, info: MapInfo, settings: &Settings) -> Result<Self, SimError> {
        let ground = terrain::load_mask(path, settings.ground_alpha_threshold, true)?;
        Self::new(info, ground, None, settings)
    }

    pub fn info(&self) -> &MapInfo {
        &self.info
    }

    pub fn ground(&self) -> &TerrainBuffer {
        &self.ground
    }

    pub fn decoration(&self) -> Option<&TerrainBuffer> {
        self.decoration.as_ref()
    }

    /// Always `{0, 0, W, H}` of the ground layer
    pub fn bound(&self) -> Rect {
        self.bound
    }

    pub fn margins(&self) -> OutOfMapMargins {
        self.margins
    }

    pub fn environment(&self) -> Environment {
        self.env
    }

    /// Already-registered projectiles keep the forces they were registered with
    pub fn set_wind(&mut self, wind: f32) {
        self.env.wind = wind;
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub(crate) fn advance_tick(&mut self) {
        self.time_ticks += 1;
    }

    // === Terrain queries ===

    pub fn is_empty(&self, x: i32, y: i32) -> bool {
        self.ground.is_empty(x, y)
    }

    /// Solid ground inside the world; anything out of map is not solid
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        !self.is_out_map(x as f32, y as f32) && !self.ground.is_empty(x, y)
    }

    /// Past the side or bottom margins. There is no top limit.
    pub fn is_out_map(&self, x: f32, y: f32) -> bool {
        let left = -(self.margins.left as f32);
        let right = self.bound.width as f32 + self.margins.right as f32;
        let bottom = self.bound.height as f32 + self.margins.bottom as f32;
        x < left || x >= right || y >= bottom
    }

    pub fn is_rectangle_empty(&self, rect: Rect) -> bool {
        self.ground.is_rectangle_empty_quick(rect)
    }

    /// First row at or below `y` where a column next to `x` is solid.
    ///
    /// `x` is clamped into the map; `h` defaults to the rest of the map.
    pub fn find_y_line_not_empty_point(&self, x: i32, y: i32, h: Option<i32>) -> Option<IVec2> {
        let (width, height) = (self.bound.width, self.bound.height);
        let x = x.clamp(0, width - 1);
        let mut y = y.max(0);
        let mut h = h.unwrap_or(height);
        if y.saturating_add(h) >= height {
            h = height - y - 1;
        }

        for _ in 0..h.max(0) {
            if !self.is_empty(x - 1, y) || !self.is_empty(x + 1, y) {
                return Some(IVec2::new(x, y));
            }
            y += 1;
        }
        None
    }

    // === Terrain mutation ===

    /// Erase `stamp` centered at `(cx, cy)` from both layers.
    ///
    /// `border` is only drawn on the decoration layer and is dropped when
    /// the world has none; the ground layer is never refilled by it.
    pub fn dig(&mut self, cx: f32, cy: f32, stamp: &TerrainBuffer, border: Option<&TerrainBuffer>) {
        log::debug!("Digging at ({cx}, {cy}) with a {}x{} stamp", stamp.width(), stamp.height());
        self.ground.dig(cx, cy, stamp);

        let Some(decoration) = self.decoration.as_mut() else {
            if border.is_some() {
                log::trace!("No decoration layer, crater border dropped");
            }
            return;
        };
        decoration.dig(cx, cy, stamp);
        if let Some(border) = border {
            decoration.overlay(cx, cy, border);
        }
    }

    /// Stamp solid matter into the ground layer with its top-left at `(x, y)`
    pub fn add(&mut self, x: i32, y: i32, stamp: &TerrainBuffer) {
        log::debug!("Adding terrain at ({x}, {y})");
        self.ground.add(x, y, stamp);
    }

    // === Body registry ===

    /// Registered bodies overlapping `rect`.
    ///
    /// Skips `exclude`, penetrable and dead bodies, and bodies whose box is
    /// degenerate. Results are in slot order.
    pub fn find_physical_objects(&self, rect: Rect, exclude: Option<BodyId>) -> Vec<BodyId> {
        let mut hits = Vec::new();
        for (id, body) in self.iter() {
            if Some(id) == exclude || body.can_penetrate || !body.is_living {
                continue;
            }
            let other = body.rect();
            if other.is_empty() {
                log::warn!("Body {id} has a degenerate box {other:?}");
                continue;
            }
            if rect.overlaps(&other) {
                hits.push(id);
            }
        }
        hits
    }

    /// Register a body. Projectiles capture the current environment forces.
    pub fn add_physical(&mut self, mut body: Body) -> Result<BodyId, SimError> {
        if let Some(id) = body.id() {
            return Err(SimError::AlreadyRegistered(id));
        }

        let id = match self.free.pop() {
            Some(index) => BodyId {
                index,
                generation: self.slots[index as usize].generation,
            },
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    body: None,
                });
                BodyId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };

        body.set_handle(Some(id));
        if let Some(p) = body.as_projectile_mut() {
            p.refresh_forces(&self.env);
        }
        log::debug!("Body {id} added at {}", body.pos);

        self.slots[id.index as usize].body = Some(body);
        self.len += 1;
        Ok(id)
    }

    /// Deregister a body and hand it back with its handle cleared
    pub fn remove_physical(&mut self, id: BodyId) -> Option<Body> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let mut body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;

        body.set_handle(None);
        log::debug!("Body {id} removed");
        Some(body)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.body.as_ref())
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.body.as_mut())
    }

    /// Registered bodies in slot order
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.body.as_ref().map(|body| {
                (
                    BodyId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    body,
                )
            })
        })
    }

    /// Registered body ids in slot order
    pub fn bodies(&self) -> Vec<BodyId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Number of registered bodies
    pub fn body_count(&self) -> usize {
        self.len
    }

    /// Deregister every body
    pub fn clear_bodies(&mut self) -> Vec<Body> {
        let ids = self.bodies();
        log::info!("Clearing {} bodies", ids.len());
        ids.into_iter()
            .filter_map(|id| self.remove_physical(id))
            .collect()
    }

    // === Spawn points ===

    pub fn set_spawn_points(&mut self, team_a: &str, team_b: &str) {
        self.spawn_a = parse_spawn_points(team_a);
        self.spawn_b = parse_spawn_points(team_b);
    }

    pub fn spawn_points(&self, team: Team) -> &[IVec2] {
        match team {
            Team::A => &self.spawn_a,
            Team::B => &self.spawn_b,
        }
    }

    /// Uniformly random spawn point for `team`, or the fallback point
    pub fn spawn_point(&mut self, team: Team) -> IVec2 {
        let list = match team {
            Team::A => &self.spawn_a,
            Team::B => &self.spawn_b,
        };
        if list.is_empty() {
            return self.fallback_spawn;
        }
        let index = self.rng.random_range(0..list.len());
        list[index]
    }

    /// One-line state summary (also logged)
    pub fn debug_summary(&self) -> String {
        let summary = format!(
            "{}x{} bodies={} gravity={} wind={} air={} decoration={} tick={}",
            self.bound.width,
            self.bound.height,
            self.len,
            self.env.gravity,
            self.env.wind,
            self.env.air_resistance,
            self.decoration.is_some(),
            self.time_ticks
        );
        log::info!("World: {summary}");
        summary
    }
}

/// Parse `"x,y|x,y|..."`; malformed pairs are dropped
pub fn parse_spawn_points(s: &str) -> Vec<IVec2> {
    s.split('|')
        .filter_map(|pair| {
            let (x, y) = pair.split_once(',')?;
            let x = x.trim().parse::<i32>().ok()?;
            let y = y.trim().parse::<i32>().ok()?;
            Some(IVec2::new(x, y))
        })
        .collect()
}
