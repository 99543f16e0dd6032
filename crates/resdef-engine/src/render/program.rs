use std::collections::BTreeMap;

use crate::handle::Handle;

use super::backend::{ProgramId, RenderBackend};
use super::shader::Shader;

// ── Slots ─────────────────────────────────────────────────────────────────

pub const ATTRIB_POSITION: u32     = 0;
pub const ATTRIB_COLOR: u32        = 1;
pub const ATTRIB_NORMAL: u32       = 2;
pub const ATTRIB_BINORMAL: u32     = 3;
pub const ATTRIB_TANGENT: u32      = 4;
pub const ATTRIB_TEXCOORD0: u32    = 5;
pub const ATTRIB_TEXCOORD1: u32    = 6;
pub const ATTRIB_TEXCOORD2: u32    = 7;
pub const ATTRIB_TEXCOORD3: u32    = 8;
pub const ATTRIB_BONE_INDICES: u32 = 9;
pub const ATTRIB_BONE_WEIGHTS: u32 = 10;

pub const UNIFORM_MODELVIEW: i32      = 0;
pub const UNIFORM_PROJECTION: i32     = 1;
pub const UNIFORM_TEXTURE_MATRIX: i32 = 2;
pub const UNIFORM_BONES: i32          = 3;
/// `texture0`; units 1–7 follow consecutively.
pub const UNIFORM_TEXTURE0: i32       = 4;

// ── Program ───────────────────────────────────────────────────────────────

/// A uniform slot bound to a source-level name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uniform {
    /// Resolved on link; `None` before linking or if the uniform is inactive.
    pub location: Option<i32>,
    pub name:     String,
}

/// A shader program with its semantic bindings.
///
/// Uniform, attribute and fragment-output bindings can be made in any order
/// relative to attaching shaders; they take effect on [`Program::link`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    id:        Option<ProgramId>,
    uniforms:  BTreeMap<i32, Uniform>,
    attribs:   BTreeMap<u32, String>,
    frag_outs: BTreeMap<u32, String>,
    shaders:   Vec<Handle<Shader>>,
    linked:    bool,
    error:     String,
}

impl Program {
    pub fn new(backend: &mut dyn RenderBackend) -> Self {
        Self {
            id:        Some(backend.create_program()),
            uniforms:  BTreeMap::new(),
            attribs:   BTreeMap::new(),
            frag_outs: BTreeMap::new(),
            shaders:   Vec::new(),
            linked:    false,
            error:     String::new(),
        }
    }

    /// Binds `slot` to a uniform name, returning the name it replaced.
    pub fn bind_uniform(&mut self, slot: i32, name: &str) -> Option<String> {
        self.uniforms
            .insert(slot, Uniform { location: None, name: name.to_string() })
            .map(|old| old.name)
    }

    pub fn bind_attrib(&mut self, location: u32, name: &str) -> Option<String> {
        self.attribs.insert(location, name.to_string())
    }

    pub fn bind_frag_out(&mut self, color: u32, name: &str) -> Option<String> {
        self.frag_outs.insert(color, name.to_string())
    }

    /// Attaches a compiled shader. The program keeps `handle` so the shader
    /// can be released with it.
    pub fn attach_shader(&mut self, backend: &mut dyn RenderBackend, handle: Handle<Shader>, shader: &Shader) {
        if let (Some(program), Some(id)) = (self.id, shader.id()) {
            backend.attach_shader(program, id);
        }
        self.shaders.push(handle);
    }

    /// Applies attribute and output bindings, links, then resolves uniform
    /// locations. On failure the link log is kept in [`Program::error_string`].
    pub fn link(&mut self, backend: &mut dyn RenderBackend) -> bool {
        let Some(program) = self.id else {
            self.error = "program was unloaded".to_string();
            return false;
        };

        for (location, name) in &self.attribs {
            backend.bind_attrib(program, *location, name);
        }
        for (color, name) in &self.frag_outs {
            backend.bind_frag_out(program, *color, name);
        }

        match backend.link_program(program) {
            Ok(()) => {
                self.linked = true;
                self.error.clear();
                for uniform in self.uniforms.values_mut() {
                    uniform.location = backend.uniform_location(program, &uniform.name);
                }
            }
            Err(log) => {
                self.linked = false;
                self.error = log;
                for uniform in self.uniforms.values_mut() {
                    uniform.location = None;
                }
            }
        }
        self.linked
    }

    pub fn id(&self) -> Option<ProgramId> {
        self.id
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }

    pub fn error_string(&self) -> &str {
        &self.error
    }

    pub fn uniform(&self, slot: i32) -> Option<&Uniform> {
        self.uniforms.get(&slot)
    }

    pub fn uniform_location(&self, slot: i32) -> Option<i32> {
        self.uniforms.get(&slot).and_then(|u| u.location)
    }

    pub fn has_uniform(&self, slot: i32) -> bool {
        self.uniforms.contains_key(&slot)
    }

    pub fn attrib(&self, location: u32) -> Option<&str> {
        self.attribs.get(&location).map(String::as_str)
    }

    pub fn frag_out(&self, color: u32) -> Option<&str> {
        self.frag_outs.get(&color).map(String::as_str)
    }

    pub fn shaders(&self) -> &[Handle<Shader>] {
        &self.shaders
    }

    /// Deletes the backend object and drops all bindings. Returns the
    /// attached shader handles for the owner to release.
    pub fn unload(&mut self, backend: &mut dyn RenderBackend) -> Vec<Handle<Shader>> {
        if let Some(id) = self.id.take() {
            backend.delete_program(id);
        }
        self.uniforms.clear();
        self.attribs.clear();
        self.frag_outs.clear();
        self.linked = false;
        std::mem::take(&mut self.shaders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::RawHandle;
    use crate::render::{HeadlessBackend, ShaderKind};

    fn handle(index: u32) -> Handle<Shader> {
        Handle::new(RawHandle { index, generation: 0 })
    }

    #[test]
    fn links_and_resolves_uniforms() {
        let mut gl = HeadlessBackend::new();
        let vs = Shader::compile(&mut gl, ShaderKind::Vertex, "uniform mat4 mv;").unwrap();
        let fs = Shader::compile(&mut gl, ShaderKind::Fragment, "out vec4 c;").unwrap();

        let mut program = Program::new(&mut gl);
        program.bind_uniform(UNIFORM_MODELVIEW, "mv");
        program.bind_uniform(UNIFORM_PROJECTION, "proj");
        program.bind_attrib(ATTRIB_POSITION, "pos_in");
        program.attach_shader(&mut gl, handle(0), &vs);
        program.attach_shader(&mut gl, handle(1), &fs);

        assert!(program.link(&mut gl));
        assert!(!program.has_error());
        assert!(program.uniform_location(UNIFORM_MODELVIEW).is_some());
        assert_eq!(program.uniform_location(UNIFORM_PROJECTION), None);
        assert!(program.has_uniform(UNIFORM_PROJECTION));
        assert_eq!(program.attrib(ATTRIB_POSITION), Some("pos_in"));
    }

    #[test]
    fn link_failure_keeps_log() {
        let mut gl = HeadlessBackend::new();
        let vs = Shader::compile(&mut gl, ShaderKind::Vertex, "void main() {}").unwrap();
        let mut program = Program::new(&mut gl);
        program.attach_shader(&mut gl, handle(0), &vs);
        assert!(!program.link(&mut gl));
        assert!(program.error_string().contains("fragment"));
    }

    #[test]
    fn rebinding_returns_old_name() {
        let mut gl = HeadlessBackend::new();
        let mut program = Program::new(&mut gl);
        assert_eq!(program.bind_frag_out(0, "a"), None);
        assert_eq!(program.bind_frag_out(0, "b").as_deref(), Some("a"));
        assert_eq!(program.frag_out(0), Some("b"));
    }

    #[test]
    fn unload_returns_shaders() {
        let mut gl = HeadlessBackend::new();
        let vs = Shader::compile(&mut gl, ShaderKind::Vertex, "x").unwrap();
        let mut program = Program::new(&mut gl);
        program.attach_shader(&mut gl, handle(7), &vs);
        assert_eq!(program.unload(&mut gl), [handle(7)]);
        assert_eq!(gl.live_programs(), 0);
        assert!(program.unload(&mut gl).is_empty());
    }
}
