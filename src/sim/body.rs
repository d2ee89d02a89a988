//! Physical bodies
//!
//! A `Body` carries what every registered object shares (center position,
//! bounding box, life/motion flags, registry handle). Behaviour that differs
//! per kind lives in the `BodyKind` variant and is dispatched by `match`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::Impact;
use super::projectile::Projectile;
use super::walker::Walker;
use crate::consts::BODY_SIZE;
use crate::terrain::Rect;
use crate::to_pixel;

/// Generational handle into a world's body registry.
///
/// A handle goes stale when its body is removed; lookups with a stale
/// handle return `None` even after the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl BodyId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// What kind of object a body is
#[derive(Debug, Clone, PartialEq)]
pub enum BodyKind {
    /// Integrated under forces, resolved by the stepped raycast
    Projectile(Projectile),
    /// Rests on the ground, settled once per tick
    Walker(Walker),
    /// Static collidable object (crates, decoration with a hitbox)
    Prop,
}

/// A physical object that can live in a world registry
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Center position
    pub pos: Vec2,
    /// Bounding box size (centered on `pos`)
    pub width: i32,
    pub height: i32,
    pub is_living: bool,
    pub is_moving: bool,
    /// Other bodies' paths pass through this one
    pub can_penetrate: bool,
    pub kind: BodyKind,
    handle: Option<BodyId>,
}

impl Body {
    pub fn new(kind: BodyKind, width: i32, height: i32) -> Self {
        Self {
            pos: Vec2::ZERO,
            width,
            height,
            is_living: true,
            is_moving: false,
            can_penetrate: false,
            kind,
            handle: None,
        }
    }

    /// Static collidable box
    pub fn prop(width: i32, height: i32) -> Self {
        Self::new(BodyKind::Prop, width, height)
    }

    /// A projectile starts out moving
    pub fn projectile(projectile: Projectile, size: i32) -> Self {
        let mut body = Self::new(BodyKind::Projectile(projectile), size, size);
        body.is_moving = true;
        body
    }

    pub fn walker(walker: Walker, width: i32, height: i32) -> Self {
        Self::new(BodyKind::Walker(walker), width, height)
    }

    /// Builder: place at a position
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.set_xy(x, y);
        self
    }

    /// Builder: mark penetrable
    pub fn penetrable(mut self) -> Self {
        self.can_penetrate = true;
        self
    }

    /// Registry handle, if registered
    pub fn id(&self) -> Option<BodyId> {
        self.handle
    }

    pub fn is_registered(&self) -> bool {
        self.handle.is_some()
    }

    pub(crate) fn set_handle(&mut self, handle: Option<BodyId>) {
        self.handle = handle;
    }

    #[inline]
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Teleport. Projectiles restart integration from here.
    pub fn set_xy(&mut self, x: f32, y: f32) {
        self.pos = Vec2::new(x, y);
        if let BodyKind::Projectile(p) = &mut self.kind {
            p.set_position(x, y);
        }
    }

    /// Move the body to where its integrator asked it to go, keeping the
    /// integrator's sub-pixel state
    pub(crate) fn commit_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    /// Global bounding box
    pub fn rect(&self) -> Rect {
        rect_at(self.pos, self.width, self.height)
    }

    pub fn distance(&self, x: f32, y: f32) -> f32 {
        self.pos.distance(Vec2::new(x, y))
    }

    /// Only bodies in a world can start moving
    pub fn start_moving(&mut self) {
        if self.is_registered() {
            self.is_moving = true;
        }
    }

    pub fn stop_moving(&mut self) {
        self.is_moving = false;
    }

    pub fn die(&mut self) {
        self.stop_moving();
        self.is_living = false;
    }

    pub fn is_projectile(&self) -> bool {
        matches!(self.kind, BodyKind::Projectile(_))
    }

    pub fn as_projectile(&self) -> Option<&Projectile> {
        match &self.kind {
            BodyKind::Projectile(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_projectile_mut(&mut self) -> Option<&mut Projectile> {
        match &mut self.kind {
            BodyKind::Projectile(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_walker(&self) -> Option<&Walker> {
        match &self.kind {
            BodyKind::Walker(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_walker_mut(&mut self) -> Option<&mut Walker> {
        match &mut self.kind {
            BodyKind::Walker(w) => Some(w),
            _ => None,
        }
    }

    /// Terminal transition for a path that ended in `impact`.
    ///
    /// Stops motion and kills the body. Projectiles latch `is_exploded` so a
    /// second resolution in the same tick is refused; returns `false` then.
    pub fn resolve(&mut self, impact: &Impact) -> bool {
        if let BodyKind::Projectile(p) = &mut self.kind {
            if p.is_exploded {
                return false;
            }
            p.is_exploded = true;
        }

        match impact {
            Impact::Objects(hits) => log::debug!("Body {:?} hit {} object(s)", self.handle, hits.len()),
            Impact::Ground => log::debug!("Body {:?} hit ground at {}", self.handle, self.pos),
            Impact::ExitedWorld => log::debug!("Body {:?} left the map at {}", self.handle, self.pos),
        }
        self.die();
        true
    }
}

/// Bounding box of a `width x height` body centered on `pos`
pub fn rect_at(pos: Vec2, width: i32, height: i32) -> Rect {
    Rect::new(
        to_pixel(pos.x - width as f32 / 2.0),
        to_pixel(pos.y - height as f32 / 2.0),
        width,
        height,
    )
}

impl Default for Body {
    fn default() -> Self {
        Self::prop(BODY_SIZE, BODY_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_is_floored_and_centered() {
        let body = Body::prop(10, 6).at(20.7, 5.2);
        assert_eq!(body.rect(), Rect::new(15, 2, 10, 6));

        let odd = Body::prop(3, 3).at(0.0, 0.0);
        assert_eq!(odd.rect(), Rect::new(-2, -2, 3, 3));
    }

    #[test]
    fn test_start_moving_requires_registry() {
        let mut body = Body::default();
        body.start_moving();
        assert!(!body.is_moving);

        body.set_handle(Some(BodyId { index: 0, generation: 0 }));
        body.start_moving();
        assert!(body.is_moving);
    }

    #[test]
    fn test_die_stops_motion() {
        let mut body = Body::projectile(Projectile::default(), 4);
        assert!(body.is_moving && body.is_living);
        body.die();
        assert!(!body.is_moving && !body.is_living);
    }

    #[test]
    fn test_projectile_resolves_once() {
        let mut body = Body::projectile(Projectile::default(), 4);
        assert!(body.resolve(&Impact::Ground));
        assert!(!body.resolve(&Impact::ExitedWorld));
        assert!(body.as_projectile().unwrap().is_exploded);
        assert!(!body.is_living);
    }

    #[test]
    fn test_set_xy_resets_projectile_integration() {
        let mut body = Body::projectile(Projectile::default(), 4).at(12.0, 34.0);
        let p = body.as_projectile().unwrap();
        assert_eq!(p.position(), Vec2::new(12.0, 34.0));
        body.set_xy(1.0, 2.0);
        assert_eq!(body.as_projectile().unwrap().position(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_distance() {
        let body = Body::default().at(3.0, 4.0);
        assert!((body.distance(0.0, 0.0) - 5.0).abs() < 1e-6);
    }
}
