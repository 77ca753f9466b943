use crate::context::{GraphicsContext, Primitive, RenderError};
use crate::shader::ShaderProgram;
use crate::shaders::ShadowShader;
use glam::Mat4;
use waterline_assets::AssetLibrary;
use waterline_common::{Mesh, TextureId, Transform};

/// Something that casts a shadow: a mesh placed in the world.
///
/// `texture` is sampled on unit 0 and texels with alpha below 0.5 cast no
/// shadow. `None` binds no texture, which samples as opaque.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowCaster {
    pub mesh: Mesh,
    pub transform: Transform,
    pub texture: Option<TextureId>,
}

/// Renders casters into the currently bound shadow-map target.
#[derive(Debug)]
pub struct ShadowMapRenderer {
    shader: ShadowShader,
}

impl ShadowMapRenderer {
    pub fn new(
        ctx: &mut dyn GraphicsContext,
        assets: &mut AssetLibrary,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            shader: ShadowShader::new(ctx, assets)?,
        })
    }

    /// Draw each caster with `mvp = projection_view * model`, in order, with
    /// its own texture on unit 0.
    pub fn render(
        &self,
        ctx: &mut dyn GraphicsContext,
        projection_view: Mat4,
        casters: &[ShadowCaster],
    ) {
        self.shader.activate(ctx);
        for caster in casters {
            let mesh = caster.mesh;
            ctx.bind_mesh(Some(mesh.id));
            for index in 0..mesh.attribute_count {
                ctx.set_vertex_attribute_enabled(index, true);
            }
            ctx.bind_texture(0, caster.texture);
            self.shader.load_mvp_matrix(ctx, projection_view * caster.transform.matrix());
            ctx.draw_arrays(Primitive::Triangles, 0, mesh.vertex_count);
            for index in 0..mesh.attribute_count {
                ctx.set_vertex_attribute_enabled(index, false);
            }
        }
        ctx.bind_texture(0, None);
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
    use crate::context::UniformValue;
    use crate::loader::Loader;
    use crate::recording::{Command, RecordingContext};
    use crate::test_assets;
    use glam::Vec3;

    #[test]
    fn one_draw_per_caster_with_combined_matrix() {
        let mut ctx = RecordingContext::new();
        let mut loader = Loader::new();
        let mesh = loader.load_textured(&mut ctx, &[0.0; 9], &[0.0; 6]).unwrap();
        let renderer = ShadowMapRenderer::new(&mut ctx, &mut test_assets()).unwrap();
        ctx.clear();

        let projection_view = Mat4::orthographic_rh_gl(-10.0, 10.0, -10.0, 10.0, 0.1, 50.0);
        let casters = [
            ShadowCaster {
                mesh,
                transform: Transform {
                    position: Vec3::new(1.0, 0.0, 0.0),
                    ..Transform::default()
                },
                texture: None,
            },
            ShadowCaster {
                mesh,
                transform: Transform::default(),
                texture: None,
            },
        ];
        renderer.render(&mut ctx, projection_view, &casters);

        assert_eq!(ctx.draw_count(), 2);
        let uploads = ctx.uniform_uploads("mvpMatrix");
        assert_eq!(
            uploads,
            vec![
                UniformValue::Mat4(projection_view * casters[0].transform.matrix()),
                UniformValue::Mat4(projection_view),
            ]
        );
    }

    #[test]
    fn each_caster_binds_its_texture_before_drawing() {
        let mut ctx = RecordingContext::new();
        let mut loader = Loader::new();
        let mesh = loader.load_textured(&mut ctx, &[0.0; 9], &[0.0; 6]).unwrap();
        let renderer = ShadowMapRenderer::new(&mut ctx, &mut test_assets()).unwrap();
        ctx.clear();

        let casters = [
            ShadowCaster {
                mesh,
                transform: Transform::default(),
                texture: Some(TextureId(41)),
            },
            ShadowCaster {
                mesh,
                transform: Transform::default(),
                texture: None,
            },
            ShadowCaster {
                mesh,
                transform: Transform::default(),
                texture: Some(TextureId(42)),
            },
        ];
        renderer.render(&mut ctx, Mat4::IDENTITY, &casters);

        let commands = ctx.commands();
        let mut bound = Vec::new();
        let mut current = None;
        for command in commands {
            match command {
                Command::BindTexture { unit: 0, texture } => current = Some(*texture),
                Command::Draw { .. } => {
                    bound.push(current.take().expect("draw without a texture bind"));
                }
                _ => {}
            }
        }
        assert_eq!(bound, vec![Some(TextureId(41)), None, Some(TextureId(42))]);

        // Unit 0 is cleared so later passes do not inherit a caster texture.
        let tail: Vec<&Command> = commands.iter().rev().take(3).collect();
        assert_eq!(
            tail,
            vec![
                &Command::UseProgram(None),
                &Command::BindMesh(None),
                &Command::BindTexture {
                    unit: 0,
                    texture: None
                },
            ]
        );
    }
}
