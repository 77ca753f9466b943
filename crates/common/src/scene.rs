use crate::types::Transform;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A square patch of water. Externally owned; renderers only read it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterTile {
    pub x: f32,
    pub z: f32,
    pub height: f32,
}

impl WaterTile {
    /// Half-extent of every tile in world units. The shared quad spans
    /// [-1, 1], so this is also the model-matrix scale.
    pub const TILE_SIZE: f32 = 60.0;

    pub fn new(center_x: f32, center_z: f32, height: f32) -> Self {
        Self {
            x: center_x,
            z: center_z,
            height,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.height, self.z)
    }

    /// Placement of the tile: its centre, no rotation, scaled by [`Self::TILE_SIZE`].
    pub fn transform(&self) -> Transform {
        Transform::from_euler_degrees(self.position(), 0.0, 0.0, 0.0, Self::TILE_SIZE)
    }
}

/// A point light with a world position and an RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1000.0, 0.0),
            color: Vec3::ONE,
        }
    }
}
