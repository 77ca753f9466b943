//! Rendering glue: shader programs and the passes that drive them.
//!
//! # Invariants
//! - Renderers never own scene data; tiles, lights and cameras are borrowed per frame.
//! - All GPU state flows through an explicit [`GraphicsContext`].
//! - Shader failures are returned to the caller; decorative texture failures are not.
//!
//! [`RecordingContext`] stands in for a GPU in tests and tooling. The
//! OpenGL implementation lives in `waterline-render-gl`.

mod bloom;
mod camera;
mod context;
mod loader;
mod recording;
mod settings;
mod shader;
pub mod shaders;
mod shadows;
mod timer;
mod water;

pub use bloom::{BrightFilter, FULLSCREEN_QUAD};
pub use camera::Camera;
pub use context::{
    AttributeBinding, BlendMode, GraphicsContext, Primitive, ProgramDescriptor, RenderError,
    ShaderStage, UniformValue, VertexBuffer, mesh_vertex_count,
};
pub use loader::Loader;
pub use recording::{Command, RecordingContext};
pub use settings::{FAR_PLANE, NEAR_PLANE, RenderSettings, SettingsError};
pub use shader::{ProgramCore, ProgramLayout, ShaderProgram};
pub use shadows::{ShadowCaster, ShadowMapRenderer};
pub use timer::FrameTimer;
pub use water::{
    DUDV_MAP, NORMAL_MAP, QUAD_VERTICES, WATER_TEXTURE_UNITS, WAVE_SPEED, WaterFrameBufferTextures,
    WaterFrameBuffers, WaterRenderer, WaterTextureSlot, WaterTextureUnit, WaveAnimation,
};

pub fn crate_info() -> &'static str {
    "waterline-render v0.1.0"
}

/// Shader sources shipped with the workspace.
#[cfg(test)]
pub(crate) fn test_assets() -> waterline_assets::AssetLibrary {
    waterline_assets::AssetLibrary::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../res"))
}

/// A temporary asset root holding the shipped shaders and no textures.
#[cfg(test)]
pub(crate) fn shaders_only_assets() -> (tempfile::TempDir, waterline_assets::AssetLibrary) {
    let dir = tempfile::tempdir().unwrap();
    let shipped = test_assets();
    for stage in SHIPPED_SHADERS {
        let target = dir.path().join(stage);
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::copy(shipped.resolve(stage), target).unwrap();
    }
    let assets = waterline_assets::AssetLibrary::new(dir.path());
    (dir, assets)
}

#[cfg(test)]
const SHIPPED_SHADERS: [&str; 6] = [
    "shaders/bloom/simpleVertex.vert",
    "shaders/bloom/brightFilterFragment.frag",
    "shaders/shadows/shadowVertexShader.vert",
    "shaders/shadows/shadowFragmentShader.frag",
    "shaders/water/waterVertex.vert",
    "shaders/water/waterFragment.frag",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }

    #[test]
    fn shipped_shaders_are_readable() {
        let mut assets = test_assets();
        for path in SHIPPED_SHADERS {
            let source = assets.read_shader_source(path).unwrap();
            assert!(source.contains("void main"), "{path}");
        }
    }

    #[test]
    fn shipped_water_maps_decode() {
        let mut assets = test_assets();
        for path in [DUDV_MAP, NORMAL_MAP] {
            let image = assets.load_texture_image(path).unwrap();
            assert_eq!((image.width, image.height), (64, 64));
        }
    }
}
