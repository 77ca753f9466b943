use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use waterline_common::{PointLight, WaterTile};
use waterline_render::{Camera, RenderSettings};

/// A scene description for offline frame traces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    pub settings: RenderSettings,
    pub camera: Camera,
    pub light: PointLight,
    pub tiles: Vec<WaterTile>,
}

impl SceneFile {
    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let scene: Self = serde_yaml::from_str(text)?;
        scene.settings.validate()?;
        Ok(scene)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing scene {}", path.display()))
    }
}
