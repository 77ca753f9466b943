//! Shared types for the waterline renderer.
//!
//! Scene descriptors (tiles, lights, transforms) are plain data owned by the
//! application. GPU handles are opaque ids issued by a graphics backend.

mod scene;
mod types;

pub use scene::{PointLight, WaterTile};
pub use types::{
    Mesh, MeshId, ProgramId, TextureId, Transform, UniformLocation, transformation_matrix,
};

pub fn crate_info() -> &'static str {
    "waterline-common v0.1.0"
}
