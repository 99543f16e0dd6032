use super::shader::ShaderKind;

/// Backend object name for a compiled shader.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Backend object name for a program.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// Backend object name for an uploaded texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Decoded RGBA8 pixels ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width:   u32,
    pub height:  u32,
    pub mipmaps: bool,
    pub pixels:  Vec<u8>,
}

/// GPU object operations the render-state model is built on.
///
/// Compile, link and upload report failure as the backend's diagnostic text.
/// Everything else is expected to succeed for ids the backend handed out.
pub trait RenderBackend: Send {
    fn compile_shader(&mut self, kind: ShaderKind, source: &str) -> Result<ShaderId, String>;
    fn delete_shader(&mut self, shader: ShaderId);

    fn create_program(&mut self) -> ProgramId;
    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId);
    fn bind_attrib(&mut self, program: ProgramId, location: u32, name: &str);
    fn bind_frag_out(&mut self, program: ProgramId, color: u32, name: &str);
    fn link_program(&mut self, program: ProgramId) -> Result<(), String>;
    /// Location of a uniform in a linked program, `None` if it is not active.
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<i32>;
    fn delete_program(&mut self, program: ProgramId);

    fn upload_texture(&mut self, data: &TextureData) -> Result<TextureId, String>;
    fn delete_texture(&mut self, texture: TextureId);
}
