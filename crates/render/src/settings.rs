use glam::Mat4;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::water::WAVE_SPEED;

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 1000.0;

/// Errors from loading render settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Projection and animation constants shared by the passes.
///
/// Every field is optional in YAML; missing fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub near_plane: f32,
    pub far_plane: f32,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub wave_speed: f32,
    pub asset_root: PathBuf,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            near_plane: NEAR_PLANE,
            far_plane: FAR_PLANE,
            fov_degrees: 70.0,
            aspect: 16.0 / 9.0,
            wave_speed: WAVE_SPEED,
            asset_root: PathBuf::from("res"),
        }
    }
}

impl RenderSettings {
    pub fn from_yaml(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_yaml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.near_plane > 0.0 && self.far_plane > self.near_plane) {
            return Err(SettingsError::Invalid(format!(
                "need 0 < near ({}) < far ({})",
                self.near_plane, self.far_plane
            )));
        }
        if !self.wave_speed.is_finite() {
            return Err(SettingsError::Invalid("wave_speed must be finite".into()));
        }
        Ok(())
    }

    /// Right-handed perspective with GL clip-space depth.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near_plane,
            self.far_plane,
        )
    }
}
