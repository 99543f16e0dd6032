//! Resource definitions and the reference-counted resource cache.
//!
//! Materials and shader programs are described in `.def` text files,
//! fonts in JSON font databases. [`Resources`] indexes both, loads on first
//! request, shares loaded objects by [`Handle`], and destroys them when the
//! last reference is released.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | `ResourcesConfig` |
//! | [`error`] | `ResourceError` |
//! | [`fontdb`] | JSON font database rows and queries |
//! | [`logging`] | `init_logging`, `LoggingConfig` |
//! | [`render`] | render-state model, `RenderBackend`, `HeadlessBackend` |
//! | [`resdef`] | definition parser, `ResourceLoader` |
//! | [`resources`] | `Resources` cache |
//! | [`vfs`] | `Vfs` trait, `DirVfs`, `MemVfs` |
//!
//! # Quick start
//!
//! ```rust
//! use resdef_engine::render::HeadlessBackend;
//! use resdef_engine::vfs::MemVfs;
//! use resdef_engine::{Resources, ResourcesConfig};
//!
//! let mut fs = MemVfs::new();
//! fs.insert("defs/ui.def", r#"mat "ui/panel" { pass { blend alpha; depthwrite false; } }"#);
//!
//! let res = Resources::new(fs, HeadlessBackend::new(), ResourcesConfig::default());
//! res.prepare_resources();
//!
//! let panel = res.load_material("ui/panel").unwrap();
//! assert_eq!(res.material(panel).unwrap().num_passes(), 1);
//! res.release_material(panel);
//! ```

pub mod config;
pub mod error;
pub mod fontdb;
pub mod logging;
pub mod render;
pub mod resdef;
pub mod resources;
pub mod vfs;

mod handle;

pub use config::ResourcesConfig;
pub use error::ResourceError;
pub use handle::Handle;
pub use resources::{Cached, ResourceKind, ResourceLocation, Resources};

pub use resdef_syntax as syntax;
