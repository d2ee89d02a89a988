//! Deterministic simulation module
//!
//! Bodies, the world that owns them, and the per-tick motion rules. This
//! module must stay deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (spawn selection)
//! - Stable iteration order (registry slot order)
//! - No rendering or platform dependencies

pub mod body;
pub mod events;
pub mod impact;
pub mod integrator;
pub mod motion;
pub mod projectile;
pub mod tick;
pub mod walker;
pub mod world;

pub use body::{Body, BodyId, BodyKind};
pub use events::{EventLog, Impact, ImpactEvent, ImpactHooks};
pub use impact::CraterSet;
pub use integrator::{EulerVector, EulerVectorIntegrator, Integrator, IntegratorKind, SemiImplicitEuler};
pub use motion::{Trace, advance_projectile, move_to, trace_path};
pub use projectile::Projectile;
pub use tick::{SimulationContext, TickReport, tick};
pub use walker::{Settle, Walker, settle};
pub use world::{Environment, MapInfo, Team, World, parse_spawn_points};
