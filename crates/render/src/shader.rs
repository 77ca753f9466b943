use crate::context::{
    AttributeBinding, GraphicsContext, ProgramDescriptor, RenderError, UniformValue,
};
use std::collections::BTreeMap;
use waterline_assets::AssetLibrary;
use waterline_common::{ProgramId, UniformLocation};

/// Static description of a shader program: where its stages live, which
/// attributes it binds before linking, and which uniforms it resolves.
#[derive(Debug, Clone, Copy)]
pub struct ProgramLayout {
    pub label: &'static str,
    pub vertex_path: &'static str,
    pub fragment_path: &'static str,
    pub attributes: &'static [AttributeBinding],
    pub uniforms: &'static [&'static str],
}

/// A linked program plus its uniform handles, resolved once after linking.
#[derive(Debug, Clone)]
pub struct ProgramCore {
    id: ProgramId,
    label: &'static str,
    uniforms: BTreeMap<&'static str, UniformLocation>,
}

impl ProgramCore {
    /// Read both stages from `assets`, compile, link, and resolve uniforms.
    pub fn load(
        ctx: &mut dyn GraphicsContext,
        assets: &mut AssetLibrary,
        layout: &ProgramLayout,
    ) -> Result<Self, RenderError> {
        let vertex_source = assets.read_shader_source(layout.vertex_path)?;
        let fragment_source = assets.read_shader_source(layout.fragment_path)?;
        Self::from_sources(ctx, layout, &vertex_source, &fragment_source)
    }

    /// Compile and link from source text already in memory.
    pub fn from_sources(
        ctx: &mut dyn GraphicsContext,
        layout: &ProgramLayout,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, RenderError> {
        let id = ctx.create_program(&ProgramDescriptor {
            label: layout.label,
            vertex_path: layout.vertex_path,
            vertex_source,
            fragment_path: layout.fragment_path,
            fragment_source,
            attributes: layout.attributes,
        })?;

        let mut uniforms = BTreeMap::new();
        for &name in layout.uniforms {
            match ctx.uniform_location(id, name) {
                Some(location) => {
                    uniforms.insert(name, location);
                }
                None => tracing::warn!(
                    program = layout.label,
                    uniform = name,
                    "uniform not active in linked program"
                ),
            }
        }
        tracing::debug!(
            program = layout.label,
            id = id.0,
            uniforms = uniforms.len(),
            "linked shader program"
        );

        Ok(Self {
            id,
            label: layout.label,
            uniforms,
        })
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).copied()
    }

    /// Number of uniforms that resolved at link time.
    pub fn uniform_count(&self) -> usize {
        self.uniforms.len()
    }

    /// Upload to a cached uniform. Unknown or inactive names are skipped.
    pub fn set_uniform(&self, ctx: &mut dyn GraphicsContext, name: &str, value: UniformValue) {
        match self.location(name) {
            Some(location) => ctx.set_uniform(location, value),
            None => tracing::trace!(program = self.label, uniform = name, "skipped upload"),
        }
    }
}

/// Capability shared by every shader variant.
pub trait ShaderProgram {
    fn core(&self) -> &ProgramCore;

    /// Make this the current program.
    fn activate(&self, ctx: &mut dyn GraphicsContext) {
        ctx.use_program(Some(self.core().id()));
    }

    fn deactivate(&self, ctx: &mut dyn GraphicsContext) {
        ctx.use_program(None);
    }

    fn set_uniform(&self, ctx: &mut dyn GraphicsContext, name: &str, value: UniformValue) {
        self.core().set_uniform(ctx, name, value);
    }

    /// Release the program. Deactivates first, matching shutdown order.
    fn destroy(&self, ctx: &mut dyn GraphicsContext) {
        self.deactivate(ctx);
        ctx.delete_program(self.core().id());
    }
}
