use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Viewer position and orientation. Angles are in degrees.
///
/// Yaw 0 looks down -Z; positive pitch looks up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 15.0),
            yaw: 0.0,
            pitch: -20.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }

    pub fn forward(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        Vec3::new(
            yaw.sin() * pitch.cos(),
            pitch.sin(),
            -yaw.cos() * pitch.cos(),
        )
        .normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    /// Mirror below a water plane at `height`, for the reflection pass.
    pub fn reflected(&self, height: f32) -> Self {
        Self {
            position: Vec3::new(
                self.position.x,
                height - (self.position.y - height),
                self.position.z,
            ),
            yaw: self.yaw,
            pitch: -self.pitch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = Camera::default();
        assert!(cam.position.y > 0.0);
        let view = cam.view_matrix();
        // Should produce a valid matrix (no NaN)
        assert!(!view.col(0).x.is_nan());
    }

    #[test]
    fn zero_angles_look_down_negative_z() {
        let cam = Camera::new(Vec3::ZERO, 0.0, 0.0);
        assert!(cam.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        let ahead = cam.view_matrix().transform_point3(Vec3::new(0.0, 0.0, -5.0));
        assert!(ahead.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-5));
    }

    #[test]
    fn view_moves_camera_to_origin() {
        let cam = Camera::new(Vec3::new(3.0, 4.0, 5.0), 30.0, -10.0);
        let eye = cam.view_matrix().transform_point3(cam.position);
        assert!(eye.abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn reflection_mirrors_height_and_pitch() {
        let cam = Camera::new(Vec3::new(0.0, 10.0, 0.0), 45.0, -30.0);
        let mirrored = cam.reflected(2.0);
        assert_eq!(mirrored.position.y, -6.0);
        assert_eq!(mirrored.pitch, 30.0);
        assert_eq!(mirrored.yaw, 45.0);
    }
}
