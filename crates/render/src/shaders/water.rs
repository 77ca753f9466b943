use crate::camera::Camera;
use crate::context::{AttributeBinding, GraphicsContext, RenderError, UniformValue};
use crate::shader::{ProgramCore, ProgramLayout, ShaderProgram};
use crate::water::WATER_TEXTURE_UNITS;
use glam::Mat4;
use waterline_assets::AssetLibrary;
use waterline_common::PointLight;

const PROJECTION_MATRIX: &str = "projectionMatrix";
const VIEW_MATRIX: &str = "viewMatrix";
const MODEL_MATRIX: &str = "modelMatrix";
const CAMERA_POSITION: &str = "cameraPosition";
const MOVE_FACTOR: &str = "moveFactor";
const LIGHT_POSITION: &str = "lightPosition";
const LIGHT_COLOUR: &str = "lightColour";
const NEAR: &str = "near";
const FAR: &str = "far";

const LAYOUT: ProgramLayout = ProgramLayout {
    label: "water",
    vertex_path: "shaders/water/waterVertex.vert",
    fragment_path: "shaders/water/waterFragment.frag",
    attributes: &[AttributeBinding {
        index: 0,
        name: "position",
    }],
    uniforms: &[
        PROJECTION_MATRIX,
        VIEW_MATRIX,
        MODEL_MATRIX,
        CAMERA_POSITION,
        MOVE_FACTOR,
        LIGHT_POSITION,
        LIGHT_COLOUR,
        NEAR,
        FAR,
        "reflectionTexture",
        "refractionTexture",
        "dudvMap",
        "normalMap",
        "depthMap",
    ],
};

/// Program for the water surface: samples reflection, refraction, DUDV,
/// normal and depth textures and animates ripples by `moveFactor`.
#[derive(Debug)]
pub struct WaterShader {
    core: ProgramCore,
}

impl WaterShader {
    pub fn new(
        ctx: &mut dyn GraphicsContext,
        assets: &mut AssetLibrary,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            core: ProgramCore::load(ctx, assets, &LAYOUT)?,
        })
    }

    /// Point every sampler at its fixed texture unit.
    pub fn connect_texture_units(&self, ctx: &mut dyn GraphicsContext) {
        for entry in &WATER_TEXTURE_UNITS {
            self.core.set_uniform(ctx, entry.sampler, UniformValue::Int(entry.unit as i32));
        }
    }

    pub fn load_projection_matrix(&self, ctx: &mut dyn GraphicsContext, projection: Mat4) {
        self.core.set_uniform(ctx, PROJECTION_MATRIX, UniformValue::Mat4(projection));
    }

    /// Uploads the camera's view matrix and its world position.
    pub fn load_view_matrix(&self, ctx: &mut dyn GraphicsContext, camera: &Camera) {
        self.core.set_uniform(ctx, VIEW_MATRIX, UniformValue::Mat4(camera.view_matrix()));
        self.core.set_uniform(ctx, CAMERA_POSITION, UniformValue::Vec3(camera.position));
    }

    pub fn load_model_matrix(&self, ctx: &mut dyn GraphicsContext, model: Mat4) {
        self.core.set_uniform(ctx, MODEL_MATRIX, UniformValue::Mat4(model));
    }

    pub fn load_move_factor(&self, ctx: &mut dyn GraphicsContext, factor: f32) {
        self.core.set_uniform(ctx, MOVE_FACTOR, UniformValue::Float(factor));
    }

    pub fn load_light(&self, ctx: &mut dyn GraphicsContext, light: &PointLight) {
        self.core.set_uniform(ctx, LIGHT_COLOUR, UniformValue::Vec3(light.color));
        self.core.set_uniform(ctx, LIGHT_POSITION, UniformValue::Vec3(light.position));
    }

    pub fn load_near_far_plane(&self, ctx: &mut dyn GraphicsContext, near: f32, far: f32) {
        self.core.set_uniform(ctx, NEAR, UniformValue::Float(near));
        self.core.set_uniform(ctx, FAR, UniformValue::Float(far));
    }
}

impl ShaderProgram for WaterShader {
    fn core(&self) -> &ProgramCore {
        &self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingContext;
    use crate::test_assets;

    #[test]
    fn resolves_every_uniform() {
        let mut ctx = RecordingContext::new();
        let shader = WaterShader::new(&mut ctx, &mut test_assets()).unwrap();
        assert_eq!(shader.core().uniform_count(), LAYOUT.uniforms.len());
    }

    #[test]
    fn samplers_follow_unit_table() {
        let mut ctx = RecordingContext::new();
        let shader = WaterShader::new(&mut ctx, &mut test_assets()).unwrap();
        shader.connect_texture_units(&mut ctx);

        assert_eq!(ctx.uniform_uploads("reflectionTexture"), vec![UniformValue::Int(0)]);
        assert_eq!(ctx.uniform_uploads("refractionTexture"), vec![UniformValue::Int(1)]);
        assert_eq!(ctx.uniform_uploads("dudvMap"), vec![UniformValue::Int(2)]);
        assert_eq!(ctx.uniform_uploads("normalMap"), vec![UniformValue::Int(3)]);
        assert_eq!(ctx.uniform_uploads("depthMap"), vec![UniformValue::Int(4)]);
    }

    #[test]
    fn light_uploads_colour_and_position() {
        let mut ctx = RecordingContext::new();
        let shader = WaterShader::new(&mut ctx, &mut test_assets()).unwrap();
        let light = PointLight {
            position: glam::Vec3::new(1.0, 2.0, 3.0),
            color: glam::Vec3::new(0.5, 0.6, 0.7),
        };
        shader.load_light(&mut ctx, &light);
        assert_eq!(
            ctx.uniform_uploads(LIGHT_POSITION),
            vec![UniformValue::Vec3(light.position)]
        );
        assert_eq!(
            ctx.uniform_uploads(LIGHT_COLOUR),
            vec![UniformValue::Vec3(light.color)]
        );
    }
}
