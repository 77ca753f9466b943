//! Water surface pass.
//!
//! One shared quad is drawn per [`WaterTile`], blended over the scene and
//! textured from the reflection/refraction framebuffers plus two decorative
//! maps (DUDV distortion, normals).
//!
//! # Invariants
//! - The animation phase stays in `[0, 1)`.
//! - Tiles are drawn in input order, one draw call each.
//! - Texture units are bound in [`WATER_TEXTURE_UNITS`] order every frame.

use crate::camera::Camera;
use crate::context::{BlendMode, GraphicsContext, Primitive, RenderError};
use crate::loader::Loader;
use crate::settings::RenderSettings;
use crate::shader::ShaderProgram;
use crate::shaders::WaterShader;
use glam::Mat4;
use waterline_assets::AssetLibrary;
use waterline_common::{Mesh, PointLight, TextureId, WaterTile, transformation_matrix};

/// Phase advance per second of frame time.
pub const WAVE_SPEED: f32 = 0.03;

pub const DUDV_MAP: &str = "/textures/waterDUDV.png";
pub const NORMAL_MAP: &str = "/textures/normalMap.png";

/// Two triangles covering [-1, 1] in x and z. The vertex shader sets y = 0.
#[rustfmt::skip]
pub const QUAD_VERTICES: [f32; 12] = [
    -1.0, -1.0,   -1.0, 1.0,   1.0, -1.0,
     1.0, -1.0,   -1.0, 1.0,   1.0, 1.0,
];

/// Which texture feeds a water sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterTextureSlot {
    Reflection,
    Refraction,
    Dudv,
    Normal,
    RefractionDepth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaterTextureUnit {
    pub unit: u32,
    pub sampler: &'static str,
    pub slot: WaterTextureSlot,
}

/// Sampler-to-unit assignment, in binding order.
pub const WATER_TEXTURE_UNITS: [WaterTextureUnit; 5] = [
    WaterTextureUnit {
        unit: 0,
        sampler: "reflectionTexture",
        slot: WaterTextureSlot::Reflection,
    },
    WaterTextureUnit {
        unit: 1,
        sampler: "refractionTexture",
        slot: WaterTextureSlot::Refraction,
    },
    WaterTextureUnit {
        unit: 2,
        sampler: "dudvMap",
        slot: WaterTextureSlot::Dudv,
    },
    WaterTextureUnit {
        unit: 3,
        sampler: "normalMap",
        slot: WaterTextureSlot::Normal,
    },
    WaterTextureUnit {
        unit: 4,
        sampler: "depthMap",
        slot: WaterTextureSlot::RefractionDepth,
    },
];

/// Source of the three framebuffer textures the water samples.
/// The renderer reads them each frame and never owns them.
pub trait WaterFrameBuffers {
    fn reflection_texture(&self) -> TextureId;
    fn refraction_texture(&self) -> TextureId;
    fn refraction_depth_texture(&self) -> TextureId;
}

/// Plain set of already-created framebuffer textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaterFrameBufferTextures {
    pub reflection: TextureId,
    pub refraction: TextureId,
    pub refraction_depth: TextureId,
}

impl WaterFrameBuffers for WaterFrameBufferTextures {
    fn reflection_texture(&self) -> TextureId {
        self.reflection
    }

    fn refraction_texture(&self) -> TextureId {
        self.refraction
    }

    fn refraction_depth_texture(&self) -> TextureId {
        self.refraction_depth
    }
}

/// Ripple animation phase: advanced by frame time, wrapped into `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveAnimation {
    phase: f32,
    speed: f32,
}

impl Default for WaveAnimation {
    fn default() -> Self {
        Self::new(WAVE_SPEED)
    }
}

impl WaveAnimation {
    pub fn new(speed: f32) -> Self {
        Self { phase: 0.0, speed }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// `phase = (phase + speed * delta) mod 1`. Negative or non-finite
    /// deltas count as zero.
    pub fn advance(&mut self, delta_seconds: f32) -> f32 {
        let delta = if delta_seconds.is_finite() && delta_seconds > 0.0 {
            delta_seconds
        } else {
            0.0
        };
        let next = (self.phase + self.speed * delta).rem_euclid(1.0);
        // rem_euclid rounds up to exactly 1.0 for tiny negative inputs
        self.phase = if next.is_finite() && next < 1.0 { next } else { 0.0 };
        self.phase
    }
}

/// Draws water tiles with the water shader.
pub struct WaterRenderer<F> {
    quad: Mesh,
    shader: WaterShader,
    fbos: F,
    animation: WaveAnimation,
    dudv_map: Option<TextureId>,
    normal_map: Option<TextureId>,
    near_plane: f32,
    far_plane: f32,
}

impl<F: WaterFrameBuffers> WaterRenderer<F> {
    /// Loads the decorative maps, uploads the projection once, and builds the
    /// shared quad.
    ///
    /// A missing or undecodable DUDV/normal map is logged and leaves that
    /// texture unit empty; only quad upload failures are returned.
    pub fn new(
        ctx: &mut dyn GraphicsContext,
        loader: &mut Loader,
        assets: &mut AssetLibrary,
        shader: WaterShader,
        projection: Mat4,
        fbos: F,
        settings: &RenderSettings,
    ) -> Result<Self, RenderError> {
        let dudv_map = load_optional_texture(ctx, loader, assets, DUDV_MAP);
        let normal_map = load_optional_texture(ctx, loader, assets, NORMAL_MAP);

        shader.activate(ctx);
        shader.load_projection_matrix(ctx, projection);
        shader.deactivate(ctx);

        let quad = loader.load_to_vao(ctx, &QUAD_VERTICES, 2)?;

        Ok(Self {
            quad,
            shader,
            fbos,
            animation: WaveAnimation::new(settings.wave_speed),
            dudv_map,
            normal_map,
            near_plane: settings.near_plane,
            far_plane: settings.far_plane,
        })
    }

    /// Draw every tile, in order, for one frame `delta_seconds` after the last.
    pub fn render(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        tiles: &[WaterTile],
        camera: &Camera,
        light: &PointLight,
        delta_seconds: f32,
    ) {
        let _span = tracing::info_span!("water_render", tiles = tiles.len()).entered();
        self.prepare(ctx, camera, light, delta_seconds);
        for tile in tiles {
            let model = transformation_matrix(tile.position(), 0.0, 0.0, 0.0, WaterTile::TILE_SIZE);
            self.shader.load_model_matrix(ctx, model);
            ctx.draw_arrays(Primitive::Triangles, 0, self.quad.vertex_count);
        }
        self.unbind(ctx);
    }

    /// Current ripple phase in `[0, 1)`.
    pub fn move_factor(&self) -> f32 {
        self.animation.phase()
    }

    pub fn quad(&self) -> Mesh {
        self.quad
    }

    pub fn frame_buffers(&self) -> &F {
        &self.fbos
    }

    /// Texture bound to a slot this frame; `None` for a map that failed to load.
    pub fn texture_for(&self, slot: WaterTextureSlot) -> Option<TextureId> {
        match slot {
            WaterTextureSlot::Reflection => Some(self.fbos.reflection_texture()),
            WaterTextureSlot::Refraction => Some(self.fbos.refraction_texture()),
            WaterTextureSlot::Dudv => self.dudv_map,
            WaterTextureSlot::Normal => self.normal_map,
            WaterTextureSlot::RefractionDepth => Some(self.fbos.refraction_depth_texture()),
        }
    }

    /// Release the shader. Meshes and textures belong to the [`Loader`].
    pub fn clean_up(&self, ctx: &mut dyn GraphicsContext) {
        self.shader.destroy(ctx);
    }

    fn prepare(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        camera: &Camera,
        light: &PointLight,
        delta_seconds: f32,
    ) {
        self.shader.activate(ctx);
        self.shader.connect_texture_units(ctx);
        self.shader.load_view_matrix(ctx, camera);
        let phase = self.animation.advance(delta_seconds);
        self.shader.load_move_factor(ctx, phase);
        self.shader.load_light(ctx, light);
        self.shader.load_near_far_plane(ctx, self.near_plane, self.far_plane);

        ctx.bind_mesh(Some(self.quad.id));
        ctx.set_vertex_attribute_enabled(0, true);
        for entry in &WATER_TEXTURE_UNITS {
            ctx.bind_texture(entry.unit, self.texture_for(entry.slot));
        }
        ctx.set_blend(Some(BlendMode::Alpha));
    }

    fn unbind(&self, ctx: &mut dyn GraphicsContext) {
        ctx.set_blend(None);
        ctx.set_vertex_attribute_enabled(0, false);
        ctx.bind_mesh(None);
        self.shader.deactivate(ctx);
    }
}

fn load_optional_texture(
    ctx: &mut dyn GraphicsContext,
    loader: &mut Loader,
    assets: &mut AssetLibrary,
    path: &str,
) -> Option<TextureId> {
    match loader.load_texture(ctx, assets, path, true) {
        Ok(texture) => Some(texture),
        Err(e) => {
            tracing::error!("failed to load {path}: {e}");
            None
        }
    }
}
