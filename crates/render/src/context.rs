use glam::{Mat4, Vec2, Vec3, Vec4};
use std::fmt;
use waterline_assets::{AssetError, TextureImage};
use waterline_common::{MeshId, ProgramId, TextureId, UniformLocation};

/// Errors raised while creating GPU resources.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to compile {stage} shader {path}: {log}")]
    ShaderCompile {
        stage: ShaderStage,
        path: String,
        log: String,
    },
    #[error("failed to link program {label}: {log}")]
    ProgramLink { label: String, log: String },
    #[error("invalid mesh layout: {0}")]
    MeshLayout(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// A value uploaded into a program uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

/// Blend equation applied to subsequent draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// `src * src_alpha + dst * (1 - src_alpha)`.
    Alpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    TriangleStrip,
}

/// Vertex attribute name bound to a fixed index before the program links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeBinding {
    pub index: u32,
    pub name: &'static str,
}

/// Everything a backend needs to compile and link one program.
#[derive(Debug, Clone, Copy)]
pub struct ProgramDescriptor<'a> {
    pub label: &'a str,
    pub vertex_path: &'a str,
    pub vertex_source: &'a str,
    pub fragment_path: &'a str,
    pub fragment_source: &'a str,
    pub attributes: &'a [AttributeBinding],
}

/// One float attribute stream of a mesh.
#[derive(Debug, Clone, Copy)]
pub struct VertexBuffer<'a> {
    pub index: u32,
    pub components: u32,
    pub data: &'a [f32],
}

impl VertexBuffer<'_> {
    /// Number of whole vertices in this stream, or an error if the data does
    /// not divide evenly into `components`-sized vertices.
    pub fn vertex_count(&self) -> Result<u32, RenderError> {
        if !(1..=4).contains(&self.components) {
            return Err(RenderError::MeshLayout(format!(
                "attribute {} has {} components, expected 1..=4",
                self.index, self.components
            )));
        }
        let components = self.components as usize;
        if self.data.len() % components != 0 {
            return Err(RenderError::MeshLayout(format!(
                "attribute {} has {} floats, not a multiple of {}",
                self.index,
                self.data.len(),
                components
            )));
        }
        Ok((self.data.len() / components) as u32)
    }
}

/// Explicit handle to a graphics API.
///
/// Every piece of GPU state the renderers touch flows through this trait, so
/// a pass can be driven by a real GL context or by a recorder in tests.
/// Calls are synchronous and made from the render thread only.
pub trait GraphicsContext {
    /// Compile both stages, bind `attributes`, and link.
    fn create_program(&mut self, desc: &ProgramDescriptor<'_>) -> Result<ProgramId, RenderError>;

    /// Resolve a uniform by name. `None` if the program has no active uniform
    /// of that name.
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    fn delete_program(&mut self, program: ProgramId);

    /// Make `program` current, or clear the current program with `None`.
    fn use_program(&mut self, program: Option<ProgramId>);

    /// Upload a value to a uniform of the current program.
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Upload vertex streams into a new mesh. All streams must describe the
    /// same number of vertices.
    fn create_mesh(&mut self, buffers: &[VertexBuffer<'_>]) -> Result<MeshId, RenderError>;

    fn delete_mesh(&mut self, mesh: MeshId);

    fn create_texture(
        &mut self,
        image: &TextureImage,
        mipmapped: bool,
    ) -> Result<TextureId, RenderError>;

    fn delete_texture(&mut self, texture: TextureId);

    fn bind_mesh(&mut self, mesh: Option<MeshId>);

    fn set_vertex_attribute_enabled(&mut self, index: u32, enabled: bool);

    /// Bind a 2D texture to a texture unit. `None` leaves the unit empty.
    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>);

    /// Enable blending with `mode`, or disable it with `None`.
    fn set_blend(&mut self, mode: Option<BlendMode>);

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32);
}

/// Shared vertex-count check for backends implementing
/// [`GraphicsContext::create_mesh`].
pub fn mesh_vertex_count(buffers: &[VertexBuffer<'_>]) -> Result<u32, RenderError> {
    let Some(first) = buffers.first() else {
        return Err(RenderError::MeshLayout("mesh has no vertex buffers".into()));
    };
    let count = first.vertex_count()?;
    for buffer in &buffers[1..] {
        let other = buffer.vertex_count()?;
        if other != count {
            return Err(RenderError::MeshLayout(format!(
                "attribute {} has {other} vertices, attribute {} has {count}",
                buffer.index, first.index
            )));
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_count_divides_by_components() {
        let data = [0.0f32; 12];
        let buffer = VertexBuffer {
            index: 0,
            components: 2,
            data: &data,
        };
        assert_eq!(buffer.vertex_count().unwrap(), 6);
    }

    #[test]
    fn ragged_buffer_is_rejected() {
        let data = [0.0f32; 7];
        let buffer = VertexBuffer {
            index: 0,
            components: 2,
            data: &data,
        };
        assert!(matches!(
            buffer.vertex_count(),
            Err(RenderError::MeshLayout(_))
        ));
    }

    #[test]
    fn mismatched_streams_are_rejected() {
        let positions = [0.0f32; 9];
        let coords = [0.0f32; 4];
        let buffers = [
            VertexBuffer {
                index: 0,
                components: 3,
                data: &positions,
            },
            VertexBuffer {
                index: 1,
                components: 2,
                data: &coords,
            },
        ];
        assert!(mesh_vertex_count(&buffers).is_err());
        assert!(mesh_vertex_count(&[]).is_err());
    }

    #[test]
    fn stage_display() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }
}
