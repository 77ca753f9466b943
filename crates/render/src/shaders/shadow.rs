use crate::context::{AttributeBinding, GraphicsContext, RenderError, UniformValue};
use crate::shader::{ProgramCore, ProgramLayout, ShaderProgram};
use glam::Mat4;
use waterline_assets::AssetLibrary;

const MVP_MATRIX: &str = "mvpMatrix";

const LAYOUT: ProgramLayout = ProgramLayout {
    label: "shadow",
    vertex_path: "shaders/shadows/shadowVertexShader.vert",
    fragment_path: "shaders/shadows/shadowFragmentShader.frag",
    attributes: &[
        AttributeBinding {
            index: 0,
            name: "in_position",
        },
        AttributeBinding {
            index: 1,
            name: "in_textureCoords",
        },
    ],
    uniforms: &[MVP_MATRIX],
};

/// Depth-only program for the shadow map pass.
#[derive(Debug)]
pub struct ShadowShader {
    core: ProgramCore,
}

impl ShadowShader {
    pub fn new(
        ctx: &mut dyn GraphicsContext,
        assets: &mut AssetLibrary,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            core: ProgramCore::load(ctx, assets, &LAYOUT)?,
        })
    }

    /// Upload the combined model-view-projection matrix of the next draw.
    pub fn load_mvp_matrix(&self, ctx: &mut dyn GraphicsContext, mvp: Mat4) {
        self.core.set_uniform(ctx, MVP_MATRIX, UniformValue::Mat4(mvp));
    }
}

impl ShaderProgram for ShadowShader {
    fn core(&self) -> &ProgramCore {
        &self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Command, RecordingContext};
    use crate::test_assets;

    #[test]
    fn binds_two_attributes() {
        let mut ctx = RecordingContext::new();
        ShadowShader::new(&mut ctx, &mut test_assets()).unwrap();
        let Command::CreateProgram { attributes, .. } = &ctx.commands()[0] else {
            panic!("expected program creation first");
        };
        assert_eq!(
            attributes,
            &vec![
                (0, "in_position".to_string()),
                (1, "in_textureCoords".to_string())
            ]
        );
    }

    #[test]
    fn mvp_goes_to_its_cached_location() {
        let mut ctx = RecordingContext::new();
        let shader = ShadowShader::new(&mut ctx, &mut test_assets()).unwrap();
        let mvp = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        shader.load_mvp_matrix(&mut ctx, mvp);

        let location = shader.core().location(MVP_MATRIX).unwrap();
        assert_eq!(
            ctx.commands().last(),
            Some(&Command::SetUniform {
                location,
                name: MVP_MATRIX.to_string(),
                value: UniformValue::Mat4(mvp),
            })
        );
    }
}
