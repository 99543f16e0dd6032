//! Reference-counted resource cache.
//!
//! [`Resources`] indexes definition files and font databases, loads
//! resources lazily on first request, and shares them by handle until the
//! last reference is released.
//!
//! ```text
//! unindexed ──prepare──▶ indexed ──load──▶ loaded(refs ≥ 1) ──release×refs──▶ destroyed
//!                                   └──failure──▶ nothing stored
//! ```
//!
//! Every public call takes the cache lock once; loads triggered while
//! parsing (a material's program, a program's shaders) run under that same
//! lock.

mod arena;
mod kind;
mod state;

use std::sync::{Mutex, MutexGuard};

pub use kind::{Cached, Resource, ResourceKind};
pub use state::ResourceLocation;

use crate::config::ResourcesConfig;
use crate::error::ResourceError;
use crate::handle::Handle;
use crate::render::{Font, Material, Program, RenderBackend, Shader, ShaderKind, Texture};
use crate::resdef::DefKind;
use crate::vfs::Vfs;

use state::{logged, CacheState};

/// The resource cache. Safe to share between threads; calls are serialized.
pub struct Resources {
    state: Mutex<CacheState>,
}

impl Resources {
    /// Creates an empty cache. Nothing is indexed until
    /// [`Resources::prepare_resources`] runs.
    pub fn new(vfs: impl Vfs + 'static, backend: impl RenderBackend + 'static, config: ResourcesConfig) -> Self {
        Self { state: Mutex::new(CacheState::new(Box::new(vfs), Box::new(backend), config)) }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // A panic under the lock is a contract violation; the state itself is
        // still consistent enough to keep serving.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn config(&self) -> ResourcesConfig {
        self.lock().config.clone()
    }

    // ── Indexing ──────────────────────────────────────────────────────────

    /// Releases everything, then rescans font databases and definition
    /// files. Nothing is loaded eagerly.
    pub fn prepare_resources(&self) {
        self.lock().prepare_resources();
    }

    /// Indexes definitions under `dir` in addition to what is already known.
    pub fn find_definitions(&self, dir: &str) {
        self.lock().find_definitions(dir);
    }

    /// Indexes the definitions in a single file.
    pub fn find_definitions_within(&self, path: &str) {
        self.lock().find_definitions_within(path);
    }

    pub fn location(&self, kind: DefKind, name: &str) -> Option<ResourceLocation> {
        self.lock().location(kind, name).cloned()
    }

    /// All indexed definitions, ordered by file and offset.
    pub fn locations(&self) -> Vec<ResourceLocation> {
        let mut out: Vec<_> = self.lock().locations().cloned().collect();
        out.sort_by(|a, b| (&a.file, a.offset).cmp(&(&b.file, b.offset)));
        out
    }

    /// Names of all indexed definitions, sorted.
    pub fn definition_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().locations().map(|l| l.name.to_string()).collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn name_is_material(&self, name: &str) -> bool {
        self.lock().location(DefKind::Material, name).is_some()
    }

    pub fn name_is_program(&self, name: &str) -> bool {
        self.lock().location(DefKind::Shader, name).is_some()
    }

    /// Names of all fonts found in font databases, in discovery order.
    pub fn font_names(&self) -> Vec<String> {
        self.lock().font_names().iter().map(|n| n.to_string()).collect()
    }

    // ── Loading ───────────────────────────────────────────────────────────

    pub fn load_font(&self, name: &str) -> Option<Handle<Font>> {
        logged("font", name, self.try_load_font(name))
    }

    pub fn load_texture(&self, path: &str, mipmaps: bool) -> Option<Handle<Texture>> {
        logged("texture", path, self.try_load_texture(path, mipmaps))
    }

    pub fn load_material(&self, name: &str) -> Option<Handle<Material>> {
        logged("material", name, self.try_load_material(name))
    }

    pub fn load_program(&self, name: &str) -> Option<Handle<Program>> {
        logged("program", name, self.try_load_program(name))
    }

    pub fn load_shader(&self, path: &str, kind: ShaderKind) -> Option<Handle<Shader>> {
        logged(kind.name(), path, self.try_load_shader(path, kind))
    }

    /// Like [`Resources::load_font`], returning the error instead of logging it.
    pub fn try_load_font(&self, name: &str) -> Result<Handle<Font>, ResourceError> {
        self.lock().try_load_font(name)
    }

    pub fn try_load_texture(&self, path: &str, mipmaps: bool) -> Result<Handle<Texture>, ResourceError> {
        self.lock().try_load_texture(path, mipmaps)
    }

    pub fn try_load_material(&self, name: &str) -> Result<Handle<Material>, ResourceError> {
        self.lock().try_load_material(name)
    }

    pub fn try_load_program(&self, name: &str) -> Result<Handle<Program>, ResourceError> {
        self.lock().try_load_program(name)
    }

    pub fn try_load_shader(&self, path: &str, kind: ShaderKind) -> Result<Handle<Shader>, ResourceError> {
        self.lock().try_load_shader(path, kind)
    }

    // ── Releasing ─────────────────────────────────────────────────────────

    /// Drops a reference to any cached resource. Releasing a handle whose
    /// resource is already gone logs a warning and does nothing.
    pub fn release<T: Cached>(&self, handle: Handle<T>) {
        self.lock().release(handle);
    }

    /// Also releases the font's page materials once the font goes.
    pub fn release_font(&self, font: Handle<Font>) {
        self.release(font);
    }

    pub fn release_texture(&self, texture: Handle<Texture>) {
        self.release(texture);
    }

    /// Also releases each pass's program and textures once the material goes.
    pub fn release_material(&self, material: Handle<Material>) {
        self.release(material);
    }

    /// Also releases the attached shaders once the program goes.
    pub fn release_program(&self, program: Handle<Program>) {
        self.release(program);
    }

    pub fn release_shader(&self, shader: Handle<Shader>) {
        self.release(shader);
    }

    /// Destroys every cached resource regardless of reference counts. All
    /// outstanding handles become stale.
    pub fn release_all(&self) {
        self.lock().release_all();
    }

    // ── Access ────────────────────────────────────────────────────────────

    /// Runs `f` on a copy of a cached resource. The lock is released before
    /// `f` runs, so `f` may call back into the cache.
    pub fn with<T: Cached, R>(&self, handle: Handle<T>, f: impl FnOnce(&T) -> R) -> Option<R> {
        let copy = self.get(handle)?;
        Some(f(&copy))
    }

    /// A copy of a cached resource.
    pub fn get<T: Cached>(&self, handle: Handle<T>) -> Option<T> {
        self.lock().get(handle).cloned()
    }

    pub fn with_material<R>(&self, handle: Handle<Material>, f: impl FnOnce(&Material) -> R) -> Option<R> {
        self.with(handle, f)
    }

    pub fn with_program<R>(&self, handle: Handle<Program>, f: impl FnOnce(&Program) -> R) -> Option<R> {
        self.with(handle, f)
    }

    pub fn with_font<R>(&self, handle: Handle<Font>, f: impl FnOnce(&Font) -> R) -> Option<R> {
        self.with(handle, f)
    }

    pub fn material(&self, handle: Handle<Material>) -> Option<Material> {
        self.get(handle)
    }

    pub fn program(&self, handle: Handle<Program>) -> Option<Program> {
        self.get(handle)
    }

    pub fn texture(&self, handle: Handle<Texture>) -> Option<Texture> {
        self.get(handle)
    }

    pub fn shader(&self, handle: Handle<Shader>) -> Option<Shader> {
        self.get(handle)
    }

    pub fn font(&self, handle: Handle<Font>) -> Option<Font> {
        self.get(handle)
    }

    /// Current reference count, `None` once the resource is destroyed.
    pub fn ref_count<T: Cached>(&self, handle: Handle<T>) -> Option<u32> {
        self.lock().ref_count(handle)
    }

    /// Number of resources currently stored.
    pub fn live_resources(&self) -> usize {
        self.lock().live_resources()
    }
}
