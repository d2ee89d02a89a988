//! Stepped-raycast motion
//!
//! A move from the current position to a target is sampled along the
//! dominant axis. At every sampled point, in this order:
//! 1. the body's box is tested against other registered bodies
//! 2. a small probe box is tested against the ground (corner test)
//! 3. the point is tested against the out-of-map margins
//!
//! The first hit snaps the body to the sampled point and ends the path. A
//! path with no hit commits the body to the exact target.

use glam::Vec2;

use super::body::{BodyId, rect_at};
use super::events::{Impact, ImpactEvent, ImpactHooks, dispatch};
use super::tick::SimulationContext;
use super::world::World;
use crate::terrain::Rect;
use crate::consts::MAX_TRACE_SAMPLES;
use crate::to_pixel;

/// Point on the segment `(x1, y1) -> (x2, y2)` at abscissa `x`, floored
pub fn next_point_by_x(x1: f32, x2: f32, y1: f32, y2: f32, x: f32) -> Vec2 {
    if x2 == x1 {
        return Vec2::new(x, y1).floor();
    }
    let y = (x - x1) * (y2 - y1) / (x2 - x1) + y1;
    Vec2::new(x, y).floor()
}

/// Point on the segment `(x1, y1) -> (x2, y2)` at ordinate `y`, floored
pub fn next_point_by_y(x1: f32, x2: f32, y1: f32, y2: f32, y: f32) -> Vec2 {
    if y2 == y1 {
        return Vec2::new(x1, y).floor();
    }
    let x = (y - y1) * (x2 - x1) / (y2 - y1) + x1;
    Vec2::new(x, y).floor()
}

/// Result of sampling a path
#[derive(Debug, Clone, PartialEq)]
pub enum Trace {
    Clear,
    Hit { at: Vec2, impact: Impact },
}

/// Probe box of half-size `radius` around a sample (radius 1 => 3x3)
#[inline]
fn probe_rect(at: Vec2, radius: i32) -> Rect {
    let side = radius.saturating_mul(2).saturating_add(1);
    Rect::new(
        to_pixel(at.x).saturating_sub(radius),
        to_pixel(at.y).saturating_sub(radius),
        side,
        side,
    )
}

/// Sample the path of a `size` box from `from` to `to`.
///
/// `exclude` is skipped in the body query (the mover itself). Samples are
/// taken every `step_size` pixels along the dominant axis; strides above 1
/// can tunnel through features thinner than the stride.
pub fn trace_path(
    world: &World,
    exclude: Option<BodyId>,
    from: Vec2,
    to: Vec2,
    size: (i32, i32),
    step_size: u32,
    probe_radius: i32,
) -> Trace {
    let d = to - from;
    let use_x = d.x.abs() > d.y.abs();
    let major = if use_x { d.x } else { d.y };
    let count = major.abs().ceil() as i64;
    if count == 0 {
        return Trace::Clear;
    }
    if !d.is_finite() || count > MAX_TRACE_SAMPLES {
        log::warn!("Move of {count} px from {from} is too long to trace, treating as an exit");
        return Trace::Hit {
            at: to,
            impact: Impact::ExitedWorld,
        };
    }
    let step = major / count as f32;
    let stride = step_size.max(1) as usize;

    for i in (1..=count).step_by(stride) {
        let offset = i as f32 * step;
        let at = if use_x {
            next_point_by_x(from.x, to.x, from.y, to.y, from.x + offset)
        } else {
            next_point_by_y(from.x, to.x, from.y, to.y, from.y + offset)
        };

        let hits = world.find_physical_objects(rect_at(at, size.0, size.1), exclude);
        if !hits.is_empty() {
            return Trace::Hit {
                at,
                impact: Impact::Objects(hits),
            };
        }

        if !world.is_rectangle_empty(probe_rect(at, probe_radius)) {
            return Trace::Hit {
                at,
                impact: Impact::Ground,
            };
        }

        if world.is_out_map(at.x, at.y) {
            return Trace::Hit {
                at,
                impact: Impact::ExitedWorld,
            };
        }
    }

    Trace::Clear
}

/// Move a registered body towards `target`, resolving the first collision.
///
/// Returns the impact when the path ended in one. Unknown ids, non-finite
/// targets and zero-length moves do nothing.
pub fn move_to(
    world: &mut World,
    id: BodyId,
    target: Vec2,
    ctx: &SimulationContext,
    hooks: &mut dyn ImpactHooks,
) -> Option<ImpactEvent> {
    let body = world.body(id)?;
    if !target.is_finite() {
        log::warn!("Body {id} asked to move to non-finite target {target}");
        return None;
    }
    if target == body.pos {
        return None;
    }

    let trace = trace_path(
        world,
        Some(id),
        body.pos,
        target,
        body.size(),
        ctx.step_size,
        ctx.probe_radius,
    );

    let body = world.body_mut(id)?;
    match trace {
        Trace::Clear => {
            body.commit_position(target);
            None
        }
        Trace::Hit { at, impact } => {
            body.set_xy(at.x, at.y);
            if !body.resolve(&impact) {
                return None;
            }
            dispatch(hooks, body, &impact);
            Some(ImpactEvent {
                body: id,
                position: at,
                crater: body.as_projectile().and_then(|p| p.crater.clone()),
                impact,
            })
        }
    }
}

/// Integrate a moving projectile one step and move it along its path
pub fn advance_projectile(
    world: &mut World,
    id: BodyId,
    ctx: &SimulationContext,
    hooks: &mut dyn ImpactHooks,
) -> Option<ImpactEvent> {
    let body = world.body_mut(id)?;
    if !body.is_moving || !body.is_living {
        return None;
    }
    let target = body
        .as_projectile_mut()?
        .next_move_point(&ctx.integrator, ctx.dt);
    move_to(world, id, target, ctx, hooks)
}
