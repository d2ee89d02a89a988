//! Error type for the fallible edges of the simulation
//!
//! Terrain and motion queries are total and never fail; only construction,
//! registry insertion and file/JSON loading can return an error.

use crate::sim::BodyId;

/// Errors surfaced to callers of crater-sim.
#[derive(Debug)]
pub enum SimError {
    /// A buffer or world was requested with a zero-sized dimension.
    InvalidDimensions { width: u32, height: u32 },
    /// A secondary terrain layer does not match the ground layer's size.
    LayerMismatch { expected: (u32, u32), found: (u32, u32) },
    /// The body already belongs to a world registry.
    AlreadyRegistered(BodyId),
    /// Image decoding failed.
    Image(image::ImageError),
    /// Standard I/O error.
    Io(std::io::Error),
    /// JSON serialization/deserialization error.
    Json(serde_json::Error),
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::InvalidDimensions { width, height } => {
                write!(f, "invalid dimensions {width}x{height} (both must be non-zero)")
            }
            SimError::LayerMismatch { expected, found } => write!(
                f,
                "decoration layer is {}x{}, ground is {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
            SimError::AlreadyRegistered(id) => {
                write!(f, "body is already registered as {id}")
            }
            SimError::Image(e) => write!(f, "image error: {e}"),
            SimError::Io(e) => write!(f, "IO error: {e}"),
            SimError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Image(e) => Some(e),
            SimError::Io(e) => Some(e),
            SimError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for SimError {
    fn from(e: image::ImageError) -> Self {
        SimError::Image(e)
    }
}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Io(e)
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Json(e)
    }
}
