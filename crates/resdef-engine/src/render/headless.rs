use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::backend::{ProgramId, RenderBackend, ShaderId, TextureData, TextureId};
use super::shader::ShaderKind;

#[derive(Debug, Default)]
struct HeadlessState {
    next_id:  u32,
    shaders:  HashMap<u32, (ShaderKind, String)>,
    programs: HashMap<u32, HeadlessProgram>,
    textures: HashMap<u32, (u32, u32)>,
}

#[derive(Debug, Default)]
struct HeadlessProgram {
    shaders: Vec<u32>,
    linked:  bool,
}

/// A [`RenderBackend`] that validates calls without a GPU.
///
/// * compiling fails on empty sources and on sources with a `#error` line;
/// * linking needs at least one vertex and one fragment shader attached;
/// * a uniform is active when its name appears in an attached source.
///
/// Clones share state, so a test can keep one clone to inspect what the
/// cache has left alive.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn live_shaders(&self) -> usize {
        self.lock().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.lock().programs.len()
    }

    pub fn live_textures(&self) -> usize {
        self.lock().textures.len()
    }
}

impl HeadlessState {
    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderBackend for HeadlessBackend {
    fn compile_shader(&mut self, kind: ShaderKind, source: &str) -> Result<ShaderId, String> {
        if source.trim().is_empty() {
            return Err("empty shader source".to_string());
        }
        if let Some((line, text)) =
            source.lines().enumerate().find(|(_, l)| l.trim_start().starts_with("#error"))
        {
            return Err(format!("0:{}: {}", line + 1, text.trim()));
        }
        let mut state = self.lock();
        let id = state.next();
        state.shaders.insert(id, (kind, source.to_string()));
        Ok(ShaderId(id))
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.lock().shaders.remove(&shader.0);
    }

    fn create_program(&mut self) -> ProgramId {
        let mut state = self.lock();
        let id = state.next();
        state.programs.insert(id, HeadlessProgram::default());
        ProgramId(id)
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        if let Some(p) = self.lock().programs.get_mut(&program.0) {
            p.shaders.push(shader.0);
        }
    }

    fn bind_attrib(&mut self, _program: ProgramId, _location: u32, _name: &str) {}

    fn bind_frag_out(&mut self, _program: ProgramId, _color: u32, _name: &str) {}

    fn link_program(&mut self, program: ProgramId) -> Result<(), String> {
        let mut state = self.lock();
        let state = &mut *state;
        let p = state.programs.get_mut(&program.0).ok_or("no such program")?;
        let kinds: Vec<ShaderKind> =
            p.shaders.iter().filter_map(|id| state.shaders.get(id)).map(|(kind, _)| *kind).collect();
        for needed in [ShaderKind::Vertex, ShaderKind::Fragment] {
            if !kinds.contains(&needed) {
                p.linked = false;
                return Err(format!("link failed: no {} shader attached", needed.name()));
            }
        }
        p.linked = true;
        Ok(())
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<i32> {
        let state = self.lock();
        let p = state.programs.get(&program.0).filter(|p| p.linked)?;
        let active = p
            .shaders
            .iter()
            .filter_map(|id| state.shaders.get(id))
            .any(|(_, source)| source.contains(name));
        // Locations are stable per name, which is all callers rely on.
        active.then(|| (resdef_syntax::hash32_str(name) & 0x7fff_ffff) as i32)
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.lock().programs.remove(&program.0);
    }

    fn upload_texture(&mut self, data: &TextureData) -> Result<TextureId, String> {
        let expected = data.width as usize * data.height as usize * 4;
        if data.width == 0 || data.height == 0 || data.pixels.len() != expected {
            return Err(format!(
                "invalid texture: {}x{} with {} bytes of pixel data",
                data.width,
                data.height,
                data.pixels.len()
            ));
        }
        let mut state = self.lock();
        let id = state.next();
        state.textures.insert(id, (data.width, data.height));
        Ok(TextureId(id))
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.lock().textures.remove(&texture.0);
    }
}
