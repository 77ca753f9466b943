use crate::context::{
    BlendMode, GraphicsContext, Primitive, ProgramDescriptor, RenderError, ShaderStage,
    UniformValue, VertexBuffer, mesh_vertex_count,
};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use waterline_assets::TextureImage;
use waterline_common::{MeshId, ProgramId, TextureId, UniformLocation};

/// One call made against a [`RecordingContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateProgram {
        program: ProgramId,
        label: String,
        attributes: Vec<(u32, String)>,
    },
    DeleteProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    SetUniform {
        location: UniformLocation,
        name: String,
        value: UniformValue,
    },
    CreateMesh {
        mesh: MeshId,
        vertex_count: u32,
        attributes: Vec<(u32, u32)>,
    },
    DeleteMesh(MeshId),
    CreateTexture {
        texture: TextureId,
        width: u32,
        height: u32,
        mipmapped: bool,
    },
    DeleteTexture(TextureId),
    BindMesh(Option<MeshId>),
    VertexAttribute {
        index: u32,
        enabled: bool,
    },
    BindTexture {
        unit: u32,
        texture: Option<TextureId>,
    },
    SetBlend(Option<BlendMode>),
    Draw {
        primitive: Primitive,
        first: u32,
        count: u32,
    },
}

/// Headless [`GraphicsContext`] that records every call instead of touching a GPU.
///
/// Used by tests and by the CLI `trace` command. Ids are handed out from a
/// single counter starting at 1, so id 0 never names a live resource.
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<Command>,
    next_id: u32,
    uniform_names: BTreeMap<UniformLocation, String>,
    fail_program: Option<String>,
    hidden_uniforms: Vec<String>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create_program` fail with a compile error for the program with
    /// this label.
    pub fn failing_program(mut self, label: impl Into<String>) -> Self {
        self.fail_program = Some(label.into());
        self
    }

    /// Pretend the driver optimized this uniform out of every program.
    pub fn hiding_uniform(mut self, name: impl Into<String>) -> Self {
        self.hidden_uniforms.push(name.into());
        self
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Forget recorded commands; issued ids stay valid.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Draw { .. }))
            .count()
    }

    /// Every value uploaded to the named uniform, in call order.
    pub fn uniform_uploads(&self, name: &str) -> Vec<UniformValue> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::SetUniform {
                    name: n, value, ..
                } if n == name => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// Human-readable listing of the recorded commands, one per line.
    pub fn trace(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== {} commands ===", self.commands.len());
        for command in &self.commands {
            let _ = writeln!(out, "{}", describe(command));
        }
        out
    }

    fn issue(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

fn describe(command: &Command) -> String {
    match command {
        Command::CreateProgram {
            program,
            label,
            attributes,
        } => {
            let attrs: Vec<String> = attributes.iter().map(|(i, n)| format!("{i}={n}")).collect();
            format!("create_program #{} {label} [{}]", program.0, attrs.join(", "))
        }
        Command::DeleteProgram(p) => format!("delete_program #{}", p.0),
        Command::UseProgram(Some(p)) => format!("use_program #{}", p.0),
        Command::UseProgram(None) => "use_program none".into(),
        Command::SetUniform { name, value, .. } => format!("uniform {name} = {}", value_text(value)),
        Command::CreateMesh {
            mesh,
            vertex_count,
            attributes,
        } => format!(
            "create_mesh #{} vertices={vertex_count} attributes={}",
            mesh.0,
            attributes.len()
        ),
        Command::DeleteMesh(m) => format!("delete_mesh #{}", m.0),
        Command::CreateTexture {
            texture,
            width,
            height,
            mipmapped,
        } => format!(
            "create_texture #{} {width}x{height} mipmapped={mipmapped}",
            texture.0
        ),
        Command::DeleteTexture(t) => format!("delete_texture #{}", t.0),
        Command::BindMesh(Some(m)) => format!("bind_mesh #{}", m.0),
        Command::BindMesh(None) => "bind_mesh none".into(),
        Command::VertexAttribute { index, enabled } => {
            let verb = if *enabled { "enable" } else { "disable" };
            format!("{verb}_attribute {index}")
        }
        Command::BindTexture {
            unit,
            texture: Some(t),
        } => format!("bind_texture unit={unit} #{}", t.0),
        Command::BindTexture {
            unit,
            texture: None,
        } => format!("bind_texture unit={unit} none"),
        Command::SetBlend(Some(mode)) => format!("blend {mode:?}"),
        Command::SetBlend(None) => "blend off".into(),
        Command::Draw {
            primitive,
            first,
            count,
        } => format!("draw {primitive:?} first={first} count={count}"),
    }
}

fn value_text(value: &UniformValue) -> String {
    match value {
        UniformValue::Float(v) => format!("{v:.4}"),
        UniformValue::Int(v) => v.to_string(),
        UniformValue::Vec2(v) => format!("({:.2}, {:.2})", v.x, v.y),
        UniformValue::Vec3(v) => format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z),
        UniformValue::Vec4(v) => format!("({:.2}, {:.2}, {:.2}, {:.2})", v.x, v.y, v.z, v.w),
        UniformValue::Mat4(m) => {
            let t = m.w_axis;
            format!("mat4[t=({:.2}, {:.2}, {:.2})]", t.x, t.y, t.z)
        }
    }
}

impl GraphicsContext for RecordingContext {
    fn create_program(&mut self, desc: &ProgramDescriptor<'_>) -> Result<ProgramId, RenderError> {
        if self.fail_program.as_deref() == Some(desc.label) {
            return Err(RenderError::ShaderCompile {
                stage: ShaderStage::Vertex,
                path: desc.vertex_path.to_string(),
                log: "compilation failed (recording context)".into(),
            });
        }
        let program = ProgramId(self.issue());
        self.commands.push(Command::CreateProgram {
            program,
            label: desc.label.to_string(),
            attributes: desc
                .attributes
                .iter()
                .map(|a| (a.index, a.name.to_string()))
                .collect(),
        });
        Ok(program)
    }

    fn uniform_location(&mut self, _program: ProgramId, name: &str) -> Option<UniformLocation> {
        if self.hidden_uniforms.iter().any(|h| h == name) {
            return None;
        }
        let location = UniformLocation(self.issue());
        self.uniform_names.insert(location, name.to_string());
        Some(location)
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.commands.push(Command::DeleteProgram(program));
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.commands.push(Command::UseProgram(program));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let name = self
            .uniform_names
            .get(&location)
            .cloned()
            .unwrap_or_else(|| format!("<{}>", location.0));
        self.commands.push(Command::SetUniform {
            location,
            name,
            value,
        });
    }

    fn create_mesh(&mut self, buffers: &[VertexBuffer<'_>]) -> Result<MeshId, RenderError> {
        let vertex_count = mesh_vertex_count(buffers)?;
        let mesh = MeshId(self.issue());
        self.commands.push(Command::CreateMesh {
            mesh,
            vertex_count,
            attributes: buffers.iter().map(|b| (b.index, b.components)).collect(),
        });
        Ok(mesh)
    }

    fn delete_mesh(&mut self, mesh: MeshId) {
        self.commands.push(Command::DeleteMesh(mesh));
    }

    fn create_texture(
        &mut self,
        image: &TextureImage,
        mipmapped: bool,
    ) -> Result<TextureId, RenderError> {
        let texture = TextureId(self.issue());
        self.commands.push(Command::CreateTexture {
            texture,
            width: image.width,
            height: image.height,
            mipmapped,
        });
        Ok(texture)
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.commands.push(Command::DeleteTexture(texture));
    }

    fn bind_mesh(&mut self, mesh: Option<MeshId>) {
        self.commands.push(Command::BindMesh(mesh));
    }

    fn set_vertex_attribute_enabled(&mut self, index: u32, enabled: bool) {
        self.commands.push(Command::VertexAttribute { index, enabled });
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        self.commands.push(Command::BindTexture { unit, texture });
    }

    fn set_blend(&mut self, mode: Option<BlendMode>) {
        self.commands.push(Command::SetBlend(mode));
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        self.commands.push(Command::Draw {
            primitive,
            first,
            count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AttributeBinding;

    const ATTRS: &[AttributeBinding] = &[AttributeBinding {
        index: 0,
        name: "position",
    }];

    fn descriptor(label: &str) -> ProgramDescriptor<'_> {
        ProgramDescriptor {
            label,
            vertex_path: "a.vert",
            vertex_source: "",
            fragment_path: "a.frag",
            fragment_source: "",
            attributes: ATTRS,
        }
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut ctx = RecordingContext::new();
        let p = ctx.create_program(&descriptor("a")).unwrap();
        let loc = ctx.uniform_location(p, "x").unwrap();
        assert_eq!(p, ProgramId(1));
        assert_eq!(loc, UniformLocation(2));
    }

    #[test]
    fn uniform_names_are_recorded() {
        let mut ctx = RecordingContext::new();
        let p = ctx.create_program(&descriptor("a")).unwrap();
        let loc = ctx.uniform_location(p, "moveFactor").unwrap();
        ctx.set_uniform(loc, UniformValue::Float(0.25));
        assert_eq!(
            ctx.uniform_uploads("moveFactor"),
            vec![UniformValue::Float(0.25)]
        );
    }

    #[test]
    fn failing_program_returns_compile_error() {
        let mut ctx = RecordingContext::new().failing_program("broken");
        assert!(ctx.create_program(&descriptor("fine")).is_ok());
        let err = ctx.create_program(&descriptor("broken")).unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompile { .. }));
    }

    #[test]
    fn hidden_uniform_does_not_resolve() {
        let mut ctx = RecordingContext::new().hiding_uniform("near");
        let p = ctx.create_program(&descriptor("a")).unwrap();
        assert!(ctx.uniform_location(p, "near").is_none());
        assert!(ctx.uniform_location(p, "far").is_some());
    }

    #[test]
    fn trace_lists_commands() {
        let mut ctx = RecordingContext::new();
        ctx.set_blend(Some(BlendMode::Alpha));
        ctx.draw_arrays(Primitive::Triangles, 0, 6);
        ctx.set_blend(None);
        let trace = ctx.trace();
        assert!(trace.contains("=== 3 commands ==="));
        assert!(trace.contains("blend Alpha"));
        assert!(trace.contains("draw Triangles first=0 count=6"));
        assert!(trace.contains("blend off"));
        assert_eq!(ctx.draw_count(), 1);
    }
}
