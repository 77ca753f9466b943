use crate::context::{GraphicsContext, RenderError, VertexBuffer, mesh_vertex_count};
use waterline_assets::AssetLibrary;
use waterline_common::{Mesh, MeshId, TextureId};

/// Uploads meshes and textures and remembers them for [`clean_up`](Loader::clean_up).
#[derive(Debug, Default)]
pub struct Loader {
    meshes: Vec<MeshId>,
    textures: Vec<TextureId>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload positions only, `dimensions` floats per vertex, to attribute 0.
    pub fn load_to_vao(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        positions: &[f32],
        dimensions: u32,
    ) -> Result<Mesh, RenderError> {
        self.load_buffers(
            ctx,
            &[VertexBuffer {
                index: 0,
                components: dimensions,
                data: positions,
            }],
        )
    }

    /// Upload 3D positions to attribute 0 and 2D texture coordinates to attribute 1.
    pub fn load_textured(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        positions: &[f32],
        texture_coords: &[f32],
    ) -> Result<Mesh, RenderError> {
        self.load_buffers(
            ctx,
            &[
                VertexBuffer {
                    index: 0,
                    components: 3,
                    data: positions,
                },
                VertexBuffer {
                    index: 1,
                    components: 2,
                    data: texture_coords,
                },
            ],
        )
    }

    /// Decode an image from `assets` and upload it.
    pub fn load_texture(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        assets: &mut AssetLibrary,
        path: &str,
        mipmapped: bool,
    ) -> Result<TextureId, RenderError> {
        let image = assets.load_texture_image(path)?;
        let texture = ctx.create_texture(&image, mipmapped)?;
        self.textures.push(texture);
        Ok(texture)
    }

    /// Delete everything this loader created.
    pub fn clean_up(&mut self, ctx: &mut dyn GraphicsContext) {
        tracing::debug!(
            meshes = self.meshes.len(),
            textures = self.textures.len(),
            "releasing loader resources"
        );
        for mesh in self.meshes.drain(..) {
            ctx.delete_mesh(mesh);
        }
        for texture in self.textures.drain(..) {
            ctx.delete_texture(texture);
        }
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn load_buffers(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        buffers: &[VertexBuffer<'_>],
    ) -> Result<Mesh, RenderError> {
        let vertex_count = mesh_vertex_count(buffers)?;
        let id = ctx.create_mesh(buffers)?;
        self.meshes.push(id);
        Ok(Mesh {
            id,
            vertex_count,
            attribute_count: buffers.len() as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Command, RecordingContext};

    #[test]
    fn position_mesh_counts_vertices() {
        let mut ctx = RecordingContext::new();
        let mut loader = Loader::new();
        let mesh = loader.load_to_vao(&mut ctx, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0], 2).unwrap();
        assert_eq!(mesh.vertex_count, 3);
        assert_eq!(mesh.attribute_count, 1);
        assert_eq!(loader.mesh_count(), 1);
    }

    #[test]
    fn bad_layout_uploads_nothing() {
        let mut ctx = RecordingContext::new();
        let mut loader = Loader::new();
        assert!(loader.load_to_vao(&mut ctx, &[0.0; 5], 2).is_err());
        assert!(ctx.commands().is_empty());
        assert_eq!(loader.mesh_count(), 0);
    }

    #[test]
    fn missing_texture_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut assets = AssetLibrary::new(dir.path());
        let mut ctx = RecordingContext::new();
        let mut loader = Loader::new();
        let err = loader
            .load_texture(&mut ctx, &mut assets, "/textures/none.png", true)
            .unwrap_err();
        assert!(matches!(err, RenderError::Asset(_)));
        assert_eq!(loader.texture_count(), 0);
    }

    #[test]
    fn clean_up_deletes_everything_once() {
        let mut ctx = RecordingContext::new();
        let mut loader = Loader::new();
        let mesh = loader.load_textured(&mut ctx, &[0.0; 9], &[0.0; 6]).unwrap();
        assert_eq!(mesh.attribute_count, 2);
        ctx.clear();

        loader.clean_up(&mut ctx);
        loader.clean_up(&mut ctx);
        assert_eq!(ctx.commands(), &[Command::DeleteMesh(mesh.id)]);
    }
}
