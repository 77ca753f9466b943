use crate::convert::{blend_factors, gl_int, primitive_mode, texture_unit};
use glow::{HasContext, PixelUnpackData};
use std::collections::HashMap;
use std::sync::Arc;
use waterline_assets::TextureImage;
use waterline_common::{MeshId, ProgramId, TextureId, UniformLocation};
use waterline_render::{
    BlendMode, GraphicsContext, Primitive, ProgramDescriptor, RenderError, ShaderStage,
    UniformValue, VertexBuffer, mesh_vertex_count,
};

/// GL objects backing one mesh.
struct GlMesh {
    vao: glow::VertexArray,
    buffers: Vec<glow::Buffer>,
}

/// [`GraphicsContext`] backed by an OpenGL 3.3+ context.
///
/// Owns the mapping from waterline ids to GL object names. GL objects are
/// not released on drop, since the context may already be gone; delete them
/// through the trait while the context is still current.
pub struct GlContext {
    gl: Arc<glow::Context>,
    next_id: u32,
    programs: HashMap<ProgramId, glow::Program>,
    uniforms: HashMap<UniformLocation, (ProgramId, glow::UniformLocation)>,
    meshes: HashMap<MeshId, GlMesh>,
    textures: HashMap<TextureId, glow::Texture>,
}

impl GlContext {
    /// Wrap a GL context.
    ///
    /// # Safety
    ///
    /// `gl` must be current on the calling thread for as long as this value
    /// is used, and every call must come from that thread.
    pub unsafe fn new(gl: Arc<glow::Context>) -> Self {
        tracing::debug!(
            version = ?gl.version(),
            "wrapping GL context"
        );
        Self {
            gl,
            next_id: 0,
            programs: HashMap::new(),
            uniforms: HashMap::new(),
            meshes: HashMap::new(),
            textures: HashMap::new(),
        }
    }

    pub fn gl(&self) -> &Arc<glow::Context> {
        &self.gl
    }

    fn issue(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn compile_stage(
        &self,
        stage: ShaderStage,
        path: &str,
        source: &str,
    ) -> Result<glow::Shader, RenderError> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        let gl = &self.gl;
        // SAFETY: the constructor contract keeps the context current on this thread.
        unsafe {
            let shader = gl.create_shader(kind).map_err(RenderError::Backend)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(RenderError::ShaderCompile {
                    stage,
                    path: path.to_string(),
                    log,
                });
            }
            Ok(shader)
        }
    }

    fn upload_buffers(
        &self,
        vao: glow::VertexArray,
        buffers: &[VertexBuffer<'_>],
    ) -> Result<Vec<glow::Buffer>, (Vec<glow::Buffer>, String)> {
        let gl = &self.gl;
        let mut uploaded = Vec::with_capacity(buffers.len());
        // SAFETY: the constructor contract keeps the context current on this thread.
        unsafe {
            gl.bind_vertex_array(Some(vao));
            for buffer in buffers {
                let vbo = match gl.create_buffer() {
                    Ok(vbo) => vbo,
                    Err(e) => {
                        gl.bind_vertex_array(None);
                        return Err((uploaded, e));
                    }
                };
                gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
                gl.buffer_data_u8_slice(
                    glow::ARRAY_BUFFER,
                    bytemuck::cast_slice(buffer.data),
                    glow::STATIC_DRAW,
                );
                gl.vertex_attrib_pointer_f32(
                    buffer.index,
                    gl_int(buffer.components),
                    glow::FLOAT,
                    false,
                    0,
                    0,
                );
                uploaded.push(vbo);
            }
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_vertex_array(None);
        }
        Ok(uploaded)
    }
}

impl GraphicsContext for GlContext {
    fn create_program(&mut self, desc: &ProgramDescriptor<'_>) -> Result<ProgramId, RenderError> {
        let vertex = self.compile_stage(ShaderStage::Vertex, desc.vertex_path, desc.vertex_source)?;
        let fragment =
            match self.compile_stage(ShaderStage::Fragment, desc.fragment_path, desc.fragment_source)
            {
                Ok(shader) => shader,
                Err(e) => {
                    // SAFETY: the constructor contract keeps the context current on this thread.
                    unsafe { self.gl.delete_shader(vertex) };
                    return Err(e);
                }
            };

        let gl = &self.gl;
        // SAFETY: the constructor contract keeps the context current on this thread.
        let program = unsafe {
            let program = match gl.create_program() {
                Ok(program) => program,
                Err(e) => {
                    gl.delete_shader(vertex);
                    gl.delete_shader(fragment);
                    return Err(RenderError::Backend(e));
                }
            };
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            for attribute in desc.attributes {
                gl.bind_attrib_location(program, attribute.index, attribute.name);
            }
            gl.link_program(program);
            let linked = gl.get_program_link_status(program);
            let log = if linked {
                String::new()
            } else {
                gl.get_program_info_log(program)
            };
            gl.detach_shader(program, vertex);
            gl.detach_shader(program, fragment);
            gl.delete_shader(vertex);
            gl.delete_shader(fragment);
            if !linked {
                gl.delete_program(program);
                return Err(RenderError::ProgramLink {
                    label: desc.label.to_string(),
                    log,
                });
            }
            program
        };

        let id = ProgramId(self.issue());
        self.programs.insert(id, program);
        tracing::debug!(label = desc.label, id = id.0, "created GL program");
        Ok(id)
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let gl_program = *self.programs.get(&program)?;
        // SAFETY: the constructor contract keeps the context current on this thread.
        let location = unsafe { self.gl.get_uniform_location(gl_program, name) }?;
        let id = UniformLocation(self.issue());
        self.uniforms.insert(id, (program, location));
        Some(id)
    }

    fn delete_program(&mut self, program: ProgramId) {
        let Some(gl_program) = self.programs.remove(&program) else {
            tracing::warn!(id = program.0, "delete of unknown program");
            return;
        };
        self.uniforms.retain(|_, (owner, _)| *owner != program);
        // SAFETY: the constructor contract keeps the context current on this thread.
        unsafe { self.gl.delete_program(gl_program) };
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        let gl_program = program.and_then(|p| self.programs.get(&p).copied());
        // SAFETY: the constructor contract keeps the context current on this thread.
        unsafe { self.gl.use_program(gl_program) };
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let Some((_, gl_location)) = self.uniforms.get(&location) else {
            tracing::trace!(location = location.0, "upload to unknown uniform");
            return;
        };
        let gl = &self.gl;
        let loc = Some(gl_location);
        // SAFETY: the constructor contract keeps the context current on this thread.
        unsafe {
            match value {
                UniformValue::Float(v) => gl.uniform_1_f32(loc, v),
                UniformValue::Int(v) => gl.uniform_1_i32(loc, v),
                UniformValue::Vec2(v) => gl.uniform_2_f32(loc, v.x, v.y),
                UniformValue::Vec3(v) => gl.uniform_3_f32(loc, v.x, v.y, v.z),
                UniformValue::Vec4(v) => gl.uniform_4_f32(loc, v.x, v.y, v.z, v.w),
                UniformValue::Mat4(m) => {
                    gl.uniform_matrix_4_f32_slice(loc, false, &m.to_cols_array())
                }
            }
        }
    }

    fn create_mesh(&mut self, buffers: &[VertexBuffer<'_>]) -> Result<MeshId, RenderError> {
        let vertex_count = mesh_vertex_count(buffers)?;
        // SAFETY: the constructor contract keeps the context current on this thread.
        let vao = unsafe { self.gl.create_vertex_array() }.map_err(RenderError::Backend)?;
        let uploaded = match self.upload_buffers(vao, buffers) {
            Ok(uploaded) => uploaded,
            Err((partial, e)) => {
                // SAFETY: the constructor contract keeps the context current on this thread.
                unsafe {
                    for vbo in partial {
                        self.gl.delete_buffer(vbo);
                    }
                    self.gl.delete_vertex_array(vao);
                }
                return Err(RenderError::Backend(e));
            }
        };

        let id = MeshId(self.issue());
        self.meshes.insert(
            id,
            GlMesh {
                vao,
                buffers: uploaded,
            },
        );
        tracing::debug!(id = id.0, vertex_count, "uploaded mesh");
        Ok(id)
    }

    fn delete_mesh(&mut self, mesh: MeshId) {
        let Some(gl_mesh) = self.meshes.remove(&mesh) else {
            tracing::warn!(id = mesh.0, "delete of unknown mesh");
            return;
        };
        // SAFETY: the constructor contract keeps the context current on this thread.
        unsafe {
            for vbo in gl_mesh.buffers {
                self.gl.delete_buffer(vbo);
            }
            self.gl.delete_vertex_array(gl_mesh.vao);
        }
    }

    fn create_texture(
        &mut self,
        image: &TextureImage,
        mipmapped: bool,
    ) -> Result<TextureId, RenderError> {
        let expected = image.width as usize * image.height as usize * 4;
        if image.pixels.len() != expected {
            return Err(RenderError::Backend(format!(
                "texture {}x{} needs {expected} bytes, got {}",
                image.width,
                image.height,
                image.pixels.len()
            )));
        }

        let gl = &self.gl;
        // SAFETY: the constructor contract keeps the context current on this thread.
        let texture = unsafe {
            let texture = gl.create_texture().map_err(RenderError::Backend)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                gl_int(image.width),
                gl_int(image.height),
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                PixelUnpackData::Slice(Some(image.pixels.as_slice())),
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            if mipmapped {
                gl.generate_mipmap(glow::TEXTURE_2D);
                gl.tex_parameter_i32(
                    glow::TEXTURE_2D,
                    glow::TEXTURE_MIN_FILTER,
                    glow::LINEAR_MIPMAP_LINEAR as i32,
                );
            } else {
                gl.tex_parameter_i32(
                    glow::TEXTURE_2D,
                    glow::TEXTURE_MIN_FILTER,
                    glow::LINEAR as i32,
                );
            }
            gl.bind_texture(glow::TEXTURE_2D, None);
            texture
        };

        let id = TextureId(self.issue());
        self.textures.insert(id, texture);
        tracing::debug!(
            id = id.0,
            width = image.width,
            height = image.height,
            mipmapped,
            "uploaded texture"
        );
        Ok(id)
    }

    fn delete_texture(&mut self, texture: TextureId) {
        let Some(gl_texture) = self.textures.remove(&texture) else {
            tracing::warn!(id = texture.0, "delete of unknown texture");
            return;
        };
        // SAFETY: the constructor contract keeps the context current on this thread.
        unsafe { self.gl.delete_texture(gl_texture) };
    }

    fn bind_mesh(&mut self, mesh: Option<MeshId>) {
        let vao = mesh.and_then(|m| self.meshes.get(&m).map(|gl_mesh| gl_mesh.vao));
        // SAFETY: the constructor contract keeps the context current on this thread.
        unsafe { self.gl.bind_vertex_array(vao) };
    }

    fn set_vertex_attribute_enabled(&mut self, index: u32, enabled: bool) {
        // SAFETY: the constructor contract keeps the context current on this thread.
        unsafe {
            if enabled {
                self.gl.enable_vertex_attrib_array(index);
            } else {
                self.gl.disable_vertex_attrib_array(index);
            }
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        let gl_texture = match texture {
            Some(id) => {
                let found = self.textures.get(&id).copied();
                if found.is_none() {
                    tracing::warn!(id = id.0, unit, "binding unknown texture");
                }
                found
            }
            None => None,
        };
        // SAFETY: the constructor contract keeps the context current on this thread.
        unsafe {
            self.gl.active_texture(texture_unit(unit));
            self.gl.bind_texture(glow::TEXTURE_2D, gl_texture);
        }
    }

    fn set_blend(&mut self, mode: Option<BlendMode>) {
        // SAFETY: the constructor contract keeps the context current on this thread.
        unsafe {
            match mode {
                Some(mode) => {
                    let (src, dst) = blend_factors(mode);
                    self.gl.enable(glow::BLEND);
                    self.gl.blend_func(src, dst);
                }
                None => self.gl.disable(glow::BLEND),
            }
        }
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        // SAFETY: the constructor contract keeps the context current on this thread.
        unsafe {
            self.gl
                .draw_arrays(primitive_mode(primitive), gl_int(first), gl_int(count))
        };
    }
}
