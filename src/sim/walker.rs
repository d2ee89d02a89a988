//! Resting contact for grounded bodies
//!
//! Walkers are not integrated. Once per tick the ground under their feet is
//! probed at three columns (center and both sides, one pixel in from the box
//! edge) over a short window from `max_step_height` above the feet to one
//! row below them:
//! - no column has ground: fall by `fall_step`
//! - some column has ground: snap so the row below the feet is the highest
//!   contact, and tilt by the angle between the side contacts
//! - every contact sits at the top of the window (buried): step up one pixel
//!
//! This is a heuristic. Ledges taller than `max_step_height` act as walls,
//! and resting height is exact only to the pixel.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::BodyId;
use super::tick::SimulationContext;
use super::world::{Team, World};
use crate::{slope_angle, to_pixel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Walker {
    pub team: Team,
    pub grounded: bool,
    /// Ground tilt under the walker (radians, y down)
    pub slope: f32,
}

impl Walker {
    pub fn new(team: Team) -> Self {
        Self {
            team,
            grounded: false,
            slope: 0.0,
        }
    }
}

/// Outcome of one settle step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Settle {
    Falling,
    Grounded { slope: f32 },
    /// Left the world; the caller decides what happens next
    FellOut,
}

/// Apply one tick of resting-contact locomotion to a registered walker
pub fn settle(world: &mut World, id: BodyId, ctx: &SimulationContext) -> Option<Settle> {
    let body = world.body(id)?;
    body.as_walker()?;

    if world.is_out_map(body.pos.x, body.pos.y) {
        return Some(Settle::FellOut);
    }

    let max_step = ctx.walker_max_step_height.max(0);
    let half_h = body.height as f32 / 2.0;
    let feet_y = to_pixel(body.pos.y + half_h);
    let top = feet_y - max_step;
    let window = max_step + 2;

    let cx = to_pixel(body.pos.x);
    let spread = (body.width / 2 - 1).max(0);
    let columns = [cx - spread, cx, cx + spread];
    let contacts = columns.map(|x| {
        world
            .ground()
            .find_not_empty_point(x, top, window)
            .map(|p| p.y)
    });

    let body = world.body_mut(id)?;
    let surface = contacts.iter().flatten().filter(|&&y| y > top).min().copied();
    let buried = contacts.iter().any(|c| c.is_some());

    let outcome = match surface {
        Some(highest) => {
            body.pos.y = (highest - 1) as f32 - half_h;
            let slope = match (contacts[0], contacts[2]) {
                (Some(left), Some(right)) if left > top && right > top => slope_angle(
                    Vec2::new(columns[0] as f32, left as f32),
                    Vec2::new(columns[2] as f32, right as f32),
                ),
                _ => 0.0,
            };
            Settle::Grounded { slope }
        }
        None if buried => {
            body.pos.y -= 1.0;
            Settle::Grounded { slope: 0.0 }
        }
        None => {
            body.pos.y += ctx.walker_fall_step;
            Settle::Falling
        }
    };

    let pos = body.pos;
    if let Some(walker) = body.as_walker_mut() {
        match outcome {
            Settle::Grounded { slope } => {
                walker.grounded = true;
                walker.slope = slope;
            }
            _ => walker.grounded = false,
        }
    }

    if world.is_out_map(pos.x, pos.y) {
        return Some(Settle::FellOut);
    }
    Some(outcome)
}
