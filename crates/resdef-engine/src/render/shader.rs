use super::backend::{RenderBackend, ShaderId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        }
    }
}

/// A compiled shader object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shader {
    kind: ShaderKind,
    id:   Option<ShaderId>,
}

impl Shader {
    /// Compiles `source`, returning the backend's log on failure.
    pub fn compile(backend: &mut dyn RenderBackend, kind: ShaderKind, source: &str) -> Result<Self, String> {
        let id = backend.compile_shader(kind, source)?;
        Ok(Self { kind, id: Some(id) })
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn id(&self) -> Option<ShaderId> {
        self.id
    }

    pub fn is_compiled(&self) -> bool {
        self.id.is_some()
    }

    /// Deletes the backend object. Safe to call more than once.
    pub fn unload(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(id) = self.id.take() {
            backend.delete_shader(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessBackend;

    #[test]
    fn compile_and_unload() {
        let mut gl = HeadlessBackend::new();
        let mut shader = Shader::compile(&mut gl, ShaderKind::Fragment, "void main() {}").unwrap();
        assert_eq!(shader.kind(), ShaderKind::Fragment);
        assert!(shader.is_compiled());
        shader.unload(&mut gl);
        shader.unload(&mut gl);
        assert!(!shader.is_compiled());
        assert_eq!(gl.live_shaders(), 0);
    }

    #[test]
    fn compile_failure_carries_log() {
        let mut gl = HeadlessBackend::new();
        let err = Shader::compile(&mut gl, ShaderKind::Vertex, "").unwrap_err();
        assert_eq!(err, "empty shader source");
    }
}
