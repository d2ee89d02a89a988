//! Destructible terrain
//!
//! Bit-packed solidity layers, the stamps used to dig and build them, and the
//! conversions that produce both from image alpha.

pub mod buffer;
pub mod generate;
pub mod mask;
pub mod rect;

pub use buffer::TerrainBuffer;
pub use mask::{from_alpha, from_rgba, load_mask};
pub use rect::Rect;
