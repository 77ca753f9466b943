use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Linked shader program issued by a graphics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

/// GPU-resident vertex data (a vertex array object on GL backends).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

/// Texture object issued by a graphics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Resolved uniform slot inside a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation(pub u32);

/// An uploaded mesh and the number of vertices a draw call should cover.
///
/// Attributes occupy indices `0..attribute_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mesh {
    pub id: MeshId,
    pub vertex_count: u32,
    pub attribute_count: u32,
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Build a transform from Euler angles in degrees, applied X then Y then Z,
    /// and a uniform scale.
    pub fn from_euler_degrees(position: Vec3, rx: f32, ry: f32, rz: f32, scale: f32) -> Self {
        let rotation = Quat::from_rotation_x(rx.to_radians())
            * Quat::from_rotation_y(ry.to_radians())
            * Quat::from_rotation_z(rz.to_radians());
        Self {
            position,
            rotation,
            scale: Vec3::splat(scale),
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Model matrix: translate, rotate about X, Y, Z (degrees), then scale uniformly.
pub fn transformation_matrix(translation: Vec3, rx: f32, ry: f32, rz: f32, scale: f32) -> Mat4 {
    Transform::from_euler_degrees(translation, rx, ry, rz, scale).matrix()
}
