use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use resdef_syntax::{Lexer, Position, TokenStream};

use crate::config::ResourcesConfig;
use crate::error::ResourceError;
use crate::fontdb::FontDatabase;
use crate::handle::{Handle, RawHandle};
use crate::render::{Font, Material, Program, RenderBackend, Shader, ShaderKind, Texture};
use crate::resdef::{DefKind, ResdefParser, ResourceLoader};
use crate::vfs::{self, Vfs};

use super::arena::Arena;
use super::kind::{Cached, KeySpace, Resource, ResourceKind};

/// Where a named definition lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocation {
    pub kind:   DefKind,
    pub name:   Arc<str>,
    pub file:   Arc<str>,
    /// Byte offset of the definition's keyword.
    pub offset: u64,
    /// Length through the closing brace.
    pub len:    usize,
    pub pos:    Position,
}

fn key_space(kind: DefKind) -> KeySpace {
    match kind {
        DefKind::Material => KeySpace::Material,
        DefKind::Shader => KeySpace::Program,
    }
}

/// Everything behind the cache lock. Nested loads made while parsing run
/// against this directly, so one public call takes the lock once.
pub(crate) struct CacheState {
    pub config:    ResourcesConfig,
    vfs:           Box<dyn Vfs>,
    backend:       Box<dyn RenderBackend>,
    arena:         Arena,
    store:         HashMap<u64, RawHandle>,
    locations:     HashMap<u64, ResourceLocation>,
    /// Font name hash → database path.
    fonts:         HashMap<u64, Arc<str>>,
    font_names:    Vec<Arc<str>>,
    interned:      HashSet<Arc<str>>,
}

impl CacheState {
    pub fn new(vfs: Box<dyn Vfs>, backend: Box<dyn RenderBackend>, config: ResourcesConfig) -> Self {
        Self {
            config,
            vfs,
            backend,
            arena: Arena::default(),
            store: HashMap::new(),
            locations: HashMap::new(),
            fonts: HashMap::new(),
            font_names: Vec::new(),
            interned: HashSet::new(),
        }
    }

    fn intern(&mut self, s: &str) -> Arc<str> {
        if let Some(existing) = self.interned.get(s) {
            return existing.clone();
        }
        let interned: Arc<str> = Arc::from(s);
        self.interned.insert(interned.clone());
        interned
    }

    // ── Store ─────────────────────────────────────────────────────────────

    /// Bumps and returns the stored handle for `key`, if any.
    fn retain<T: Cached>(&mut self, key: u64, name: &str) -> Option<Handle<T>> {
        let raw = *self.store.get(&key)?;
        let entry = self.arena.get_mut(raw)?;
        let found = entry.resource.kind();
        assert!(
            found == T::KIND,
            "resource '{name}' is registered as a {} but was requested as a {}",
            found.name(),
            T::KIND.name(),
        );
        entry.refs += 1;
        Some(Handle::new(raw))
    }

    fn register<T: Cached>(&mut self, key: u64, name: &str, resource: Resource) -> Handle<T> {
        log::debug!("allocating {} '{name}' ({key:016x})", T::KIND.name());
        let raw = self.arena.insert(key, resource);
        self.store.insert(key, raw);
        Handle::new(raw)
    }

    pub fn get<T: Cached>(&self, handle: Handle<T>) -> Option<&T> {
        T::from_resource(&self.arena.get(handle.raw)?.resource)
    }

    pub fn ref_count<T: Cached>(&self, handle: Handle<T>) -> Option<u32> {
        let entry = self.arena.get(handle.raw)?;
        T::from_resource(&entry.resource).map(|_| entry.refs)
    }

    pub fn live_resources(&self) -> usize {
        self.arena.len()
    }

    /// Drops one reference; at zero the resource and its dependencies go.
    pub fn release<T: Cached>(&mut self, handle: Handle<T>) {
        let Some(entry) = self.arena.get_mut(handle.raw) else {
            log::warn!("release of stale {} handle {handle:?}", T::KIND.name());
            return;
        };
        assert!(
            entry.resource.kind() == T::KIND,
            "{handle:?} refers to a {}",
            entry.resource.kind().name()
        );
        entry.refs -= 1;
        if entry.refs > 0 {
            return;
        }
        if let Some(entry) = self.arena.remove(handle.raw) {
            log::debug!("destroying {} ({:016x})", T::KIND.name(), entry.hash);
            self.store.remove(&entry.hash);
            self.destroy(entry.resource);
        }
    }

    fn destroy(&mut self, resource: Resource) {
        match resource {
            Resource::Font(mut font) => {
                for page in font.take_pages() {
                    self.release(page);
                }
            }
            Resource::Texture(mut texture) => texture.unload(self.backend.as_mut()),
            Resource::Material(material) => self.release_material_deps(&material),
            Resource::Program(mut program) => {
                for shader in program.unload(self.backend.as_mut()) {
                    self.release(shader);
                }
            }
            Resource::Shader(mut shader) => shader.unload(self.backend.as_mut()),
        }
    }

    fn release_material_deps(&mut self, material: &Material) {
        for pass in material.passes() {
            if let Some(program) = pass.program {
                self.release(program);
            }
            for texture in pass.texture_handles() {
                self.release(texture);
            }
        }
    }

    /// Destroys every stored resource regardless of reference counts.
    pub fn release_all(&mut self) {
        let entries = self.arena.drain();
        if !entries.is_empty() {
            log::debug!("releasing all {} resources", entries.len());
        }
        self.store.clear();
        for entry in entries {
            // Dependencies are in the same drain, so only backend objects
            // need freeing here.
            match entry.resource {
                Resource::Texture(mut texture) => texture.unload(self.backend.as_mut()),
                Resource::Program(mut program) => {
                    program.unload(self.backend.as_mut());
                }
                Resource::Shader(mut shader) => shader.unload(self.backend.as_mut()),
                Resource::Font(_) | Resource::Material(_) => {}
            }
        }
    }

    // ── Loading ───────────────────────────────────────────────────────────

    pub fn try_load_texture(&mut self, path: &str, mipmaps: bool) -> Result<Handle<Texture>, ResourceError> {
        let key = KeySpace::Texture.key(path);
        if let Some(handle) = self.retain(key, path) {
            return Ok(handle);
        }
        let bytes = vfs::read_all(self.vfs.as_ref(), path).map_err(|e| ResourceError::io(path, e))?;
        let data = Texture::decode(&bytes, mipmaps)
            .map_err(|source| ResourceError::Decode { path: path.to_string(), source })?;
        let texture = Texture::upload(self.backend.as_mut(), &data)
            .map_err(|log| ResourceError::Upload { path: path.to_string(), log })?;
        Ok(self.register(key, path, Resource::Texture(texture)))
    }

    pub fn try_load_shader(&mut self, path: &str, kind: ShaderKind) -> Result<Handle<Shader>, ResourceError> {
        let key = KeySpace::for_shader(kind).key(path);
        if let Some(handle) = self.retain(key, path) {
            return Ok(handle);
        }
        let source = self.read_text(path, 0, None)?;
        let shader = Shader::compile(self.backend.as_mut(), kind, &source)
            .map_err(|log| ResourceError::Compile { path: path.to_string(), log })?;
        Ok(self.register(key, path, Resource::Shader(shader)))
    }

    pub fn try_load_material(&mut self, name: &str) -> Result<Handle<Material>, ResourceError> {
        let key = KeySpace::Material.key(name);
        if let Some(handle) = self.retain(key, name) {
            return Ok(handle);
        }
        let location = self.locate(key, "material", name)?;
        let source = self.read_text(&location.file, location.offset, Some(location.len))?;
        let tokens = Lexer::compact()
            .tokenize(&source)
            .map_err(|source| ResourceError::Lex { path: location.file.to_string(), source })?;

        let mut parser = ResdefParser::new(TokenStream::new(&tokens));
        parser.texture_mipmaps = self.config.texture_mipmaps;
        let mut material = Material::new();
        if let Err(source) = parser.read_material(&mut material, self) {
            self.release_material_deps(&material);
            return Err(ResourceError::Parse { path: location.file.to_string(), source });
        }
        warn_trailing(&parser, &location);

        Ok(self.register(key, name, Resource::Material(material)))
    }

    pub fn try_load_program(&mut self, name: &str) -> Result<Handle<Program>, ResourceError> {
        let key = KeySpace::Program.key(name);
        if let Some(handle) = self.retain(key, name) {
            return Ok(handle);
        }
        let location = self.locate(key, "program", name)?;
        let source = self.read_text(&location.file, location.offset, Some(location.len))?;
        let tokens = Lexer::compact()
            .tokenize(&source)
            .map_err(|source| ResourceError::Lex { path: location.file.to_string(), source })?;

        let mut parser = ResdefParser::new(TokenStream::new(&tokens));
        let mut program = Program::new(self.backend.as_mut());
        if let Err(source) = parser.read_shader(&mut program, self) {
            for shader in program.unload(self.backend.as_mut()) {
                self.release(shader);
            }
            return Err(ResourceError::Parse { path: location.file.to_string(), source });
        }
        warn_trailing(&parser, &location);

        if !program.link(self.backend.as_mut()) {
            // Stored regardless; the link log stays queryable.
            log::error!("program '{name}' failed to link: {}", program.error_string());
        }
        Ok(self.register(key, name, Resource::Program(program)))
    }

    pub fn try_load_font(&mut self, name: &str) -> Result<Handle<Font>, ResourceError> {
        let key = KeySpace::Font.key(name);
        if let Some(handle) = self.retain(key, name) {
            return Ok(handle);
        }
        let path = self
            .fonts
            .get(&key)
            .cloned()
            .ok_or_else(|| ResourceError::NotIndexed { kind: "font", name: name.to_string() })?;
        let bytes = vfs::read_all(self.vfs.as_ref(), &path).map_err(|e| ResourceError::io(&path, e))?;
        let db = FontDatabase::from_slice(&bytes)
            .map_err(|source| ResourceError::FontDb { path: path.to_string(), source })?;
        let mut font = Font::from_database(&db, name)
            .ok_or_else(|| ResourceError::FontNotFound { name: name.to_string() })?;

        for page in 0..font.num_pages() {
            let material = match font.page_material_name(page).map(str::to_string) {
                Some(page_name) => self.load_material_or_missing(&page_name),
                None => {
                    log::warn!("font '{name}' has no material for page {page}");
                    self.load_missing_material()
                }
            };
            font.set_page(page, material);
        }

        Ok(self.register(key, name, Resource::Font(font)))
    }

    fn load_material_or_missing(&mut self, name: &str) -> Option<Handle<Material>> {
        match self.try_load_material(name) {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::error!("unable to load font page material '{name}': {err}");
                self.load_missing_material()
            }
        }
    }

    fn load_missing_material(&mut self) -> Option<Handle<Material>> {
        let missing = self.config.missing_material.clone();
        logged("material", &missing, self.try_load_material(&missing))
    }

    fn locate(&self, key: u64, kind: &'static str, name: &str) -> Result<ResourceLocation, ResourceError> {
        self.locations
            .get(&key)
            .cloned()
            .ok_or_else(|| ResourceError::NotIndexed { kind, name: name.to_string() })
    }

    fn read_text(&self, path: &str, offset: u64, len: Option<usize>) -> Result<String, ResourceError> {
        let bytes = match len {
            Some(len) => vfs::read_range(self.vfs.as_ref(), path, offset, len),
            None => vfs::read_all(self.vfs.as_ref(), path),
        }
        .map_err(|e| ResourceError::io(path, e))?;
        String::from_utf8(bytes).map_err(|_| ResourceError::Utf8 { path: path.to_string() })
    }

    // ── Indexing ──────────────────────────────────────────────────────────

    /// Releases everything and rebuilds the font and definition indexes.
    pub fn prepare_resources(&mut self) {
        self.release_all();
        self.locations.clear();
        self.fonts.clear();
        self.font_names.clear();
        self.interned.clear();

        self.find_fonts();
        let defs_dir = self.config.defs_dir.clone();
        self.find_definitions(&defs_dir);
        log::info!(
            "indexed {} definitions and {} fonts",
            self.locations.len(),
            self.fonts.len()
        );
    }

    fn find_fonts(&mut self) {
        let dir = self.config.fonts_dir.clone();
        let entries = match self.vfs.enumerate(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("unable to enumerate font directory '{dir}': {err}");
                return;
            }
        };

        for file_name in &entries {
            if !self.config.is_font_db(file_name) {
                continue;
            }
            let path = vfs::join(&dir, file_name);
            let db = match vfs::read_all(self.vfs.as_ref(), &path) {
                Ok(bytes) => FontDatabase::from_slice(&bytes)
                    .map_err(|source| ResourceError::FontDb { path: path.clone(), source }),
                Err(err) => Err(ResourceError::io(&path, err)),
            };
            let db = match db {
                Ok(db) => db,
                Err(err) => {
                    log::error!("unable to open font database: {err}");
                    continue;
                }
            };

            let path = self.intern(&path);
            for font_name in db.font_names() {
                let key = KeySpace::Font.key(font_name);
                if let Some(existing) = self.fonts.get(&key) {
                    log::error!("font '{font_name}' in '{path}' is already provided by '{existing}', skipping");
                    continue;
                }
                let font_name = self.intern(font_name);
                log::info!("located font '{font_name}' in '{path}'");
                self.fonts.insert(key, path.clone());
                self.font_names.push(font_name);
            }
        }
    }

    /// Indexes every definition in every file under `dir`.
    pub fn find_definitions(&mut self, dir: &str) {
        match vfs::walk_files(self.vfs.as_ref(), dir) {
            Ok(files) => {
                for file in files {
                    self.find_definitions_within(&file);
                }
            }
            Err(err) => log::warn!("unable to enumerate definitions directory '{dir}': {err}"),
        }
    }

    /// Indexes the definitions in one file. Files that cannot be read or
    /// lexed are logged and skipped.
    pub fn find_definitions_within(&mut self, path: &str) {
        let source = match self.read_text(path, 0, None) {
            Ok(source) => source,
            Err(err) => {
                log::error!("{err}");
                return;
            }
        };
        let tokens = match Lexer::compact().tokenize(&source) {
            Ok(tokens) => tokens,
            Err(err) => {
                log::error!("{path}: {err}, skipping file");
                return;
            }
        };

        let file = self.intern(path);
        let mut parser = ResdefParser::new(TokenStream::new(&tokens));
        while !parser.eof() {
            match parser.read_resource_def() {
                Ok(def) => {
                    let key = key_space(def.kind).key(&def.name);
                    if let Some(existing) = self.locations.get(&key) {
                        log::error!(
                            "{path}:{}: {} '{}' is already defined at {}:{}, skipping",
                            def.pos,
                            def.kind.keyword(),
                            def.name,
                            existing.file,
                            existing.pos,
                        );
                        continue;
                    }
                    log::debug!("located {} '{}' in '{path}'", def.kind.keyword(), def.name);
                    let location = ResourceLocation {
                        kind:   def.kind,
                        name:   self.intern(&def.name),
                        file:   file.clone(),
                        offset: def.span.start as u64,
                        len:    def.span.len(),
                        pos:    def.pos,
                    };
                    self.locations.insert(key, location);
                }
                Err(err) => log::error!("{path}: {err}"),
            }
        }
    }

    pub fn location(&self, kind: DefKind, name: &str) -> Option<&ResourceLocation> {
        self.locations.get(&key_space(kind).key(name))
    }

    pub fn locations(&self) -> impl Iterator<Item = &ResourceLocation> + '_ {
        self.locations.values()
    }

    pub fn font_names(&self) -> &[Arc<str>] {
        &self.font_names
    }
}

fn warn_trailing(parser: &ResdefParser<'_>, location: &ResourceLocation) {
    if !parser.eof() {
        log::warn!(
            "{}:{}: ignoring tokens after the end of '{}'",
            location.file,
            location.pos,
            location.name
        );
    }
}

/// Logs a failed load and flattens it to an `Option`.
pub(crate) fn logged<T>(kind: &str, name: &str, result: Result<T, ResourceError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::error!("unable to load {kind} '{name}': {err}");
            None
        }
    }
}

impl ResourceLoader for CacheState {
    fn load_program(&mut self, name: &str) -> Option<Handle<Program>> {
        let result = self.try_load_program(name);
        logged("program", name, result)
    }

    fn load_texture(&mut self, path: &str, mipmaps: bool) -> Option<Handle<Texture>> {
        let result = self.try_load_texture(path, mipmaps);
        logged("texture", path, result)
    }

    fn load_shader(&mut self, path: &str, kind: ShaderKind) -> Option<Handle<Shader>> {
        let result = self.try_load_shader(path, kind);
        logged(kind.name(), path, result)
    }

    fn release_program(&mut self, program: Handle<Program>) {
        self.release(program);
    }

    fn release_texture(&mut self, texture: Handle<Texture>) {
        self.release(texture);
    }

    fn release_shader(&mut self, shader: Handle<Shader>) {
        self.release(shader);
    }

    fn attach_shader(&mut self, program: &mut Program, shader: Handle<Shader>) {
        let Some(compiled) = self.arena.get(shader.raw).and_then(|e| Shader::from_resource(&e.resource)) else {
            log::warn!("attaching stale shader handle {shader:?}");
            return;
        };
        program.attach_shader(self.backend.as_mut(), shader, compiled);
    }
}
