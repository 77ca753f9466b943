use crate::context::{GraphicsContext, Primitive, RenderError};
use crate::loader::Loader;
use crate::shader::ShaderProgram;
use crate::shaders::BrightFilterShader;
use waterline_assets::AssetLibrary;
use waterline_common::{Mesh, TextureId};

/// Full-screen quad as a 4-vertex triangle strip.
pub const FULLSCREEN_QUAD: [f32; 8] = [-1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0, -1.0];

/// Bloom bright-pass: draws an input texture through [`BrightFilterShader`]
/// into whatever render target is currently bound.
#[derive(Debug)]
pub struct BrightFilter {
    shader: BrightFilterShader,
    quad: Mesh,
}

impl BrightFilter {
    pub fn new(
        ctx: &mut dyn GraphicsContext,
        loader: &mut Loader,
        assets: &mut AssetLibrary,
    ) -> Result<Self, RenderError> {
        let shader = BrightFilterShader::new(ctx, assets)?;
        let quad = loader.load_to_vao(ctx, &FULLSCREEN_QUAD, 2)?;
        Ok(Self { shader, quad })
    }

    pub fn render(&self, ctx: &mut dyn GraphicsContext, input: TextureId) {
        self.shader.activate(ctx);
        ctx.bind_mesh(Some(self.quad.id));
        ctx.set_vertex_attribute_enabled(0, true);
        ctx.bind_texture(0, Some(input));
        ctx.draw_arrays(Primitive::TriangleStrip, 0, self.quad.vertex_count);
        ctx.set_vertex_attribute_enabled(0, false);
        ctx.bind_mesh(None);
        self.shader.deactivate(ctx);
    }

    pub fn clean_up(&self, ctx: &mut dyn GraphicsContext) {
        self.shader.destroy(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Command, RecordingContext};
    use crate::test_assets;

    #[test]
    fn samples_input_on_unit_zero_and_draws_strip() {
        let mut ctx = RecordingContext::new();
        let mut loader = Loader::new();
        let filter = BrightFilter::new(&mut ctx, &mut loader, &mut test_assets()).unwrap();
        ctx.clear();

        filter.render(&mut ctx, TextureId(77));
        let commands = ctx.commands();
        assert!(commands.contains(&Command::BindTexture {
            unit: 0,
            texture: Some(TextureId(77))
        }));
        assert!(commands.contains(&Command::Draw {
            primitive: Primitive::TriangleStrip,
            first: 0,
            count: 4
        }));
        assert_eq!(commands.last(), Some(&Command::UseProgram(None)));
    }

    #[test]
    fn broken_shader_is_fatal() {
        let mut ctx = RecordingContext::new().failing_program("bright_filter");
        let mut loader = Loader::new();
        let err = BrightFilter::new(&mut ctx, &mut loader, &mut test_assets()).unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompile { .. }));
        assert_eq!(loader.mesh_count(), 0);
    }
}
