use crate::context::{AttributeBinding, GraphicsContext, RenderError};
use crate::shader::{ProgramCore, ProgramLayout, ShaderProgram};
use waterline_assets::AssetLibrary;

const LAYOUT: ProgramLayout = ProgramLayout {
    label: "bright_filter",
    vertex_path: "shaders/bloom/simpleVertex.vert",
    fragment_path: "shaders/bloom/brightFilterFragment.frag",
    attributes: &[AttributeBinding {
        index: 0,
        name: "position",
    }],
    uniforms: &[],
};

/// Bloom bright-pass: keeps only the bright parts of the input texture.
/// Position attribute only, no uniforms.
#[derive(Debug)]
pub struct BrightFilterShader {
    core: ProgramCore,
}

impl BrightFilterShader {
    pub fn new(
        ctx: &mut dyn GraphicsContext,
        assets: &mut AssetLibrary,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            core: ProgramCore::load(ctx, assets, &LAYOUT)?,
        })
    }
}

impl ShaderProgram for BrightFilterShader {
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
    fn binds_position_and_resolves_nothing() {
        let mut ctx = RecordingContext::new();
        let shader = BrightFilterShader::new(&mut ctx, &mut test_assets()).unwrap();
        assert_eq!(shader.core().uniform_count(), 0);
        assert!(matches!(
            &ctx.commands()[0],
            Command::CreateProgram { attributes, .. }
                if attributes == &vec![(0, "position".to_string())]
        ));
    }
}
