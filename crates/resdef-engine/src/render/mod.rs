//! Render-state model.
//!
//! These types describe what to draw with; they talk to the GPU only through
//! a [`RenderBackend`]. [`HeadlessBackend`] stands in for a real device in
//! tests and tools.

mod backend;
mod font;
mod headless;
mod pass;
pub mod program;
mod shader;
mod texture;

pub use backend::{ProgramId, RenderBackend, ShaderId, TextureData, TextureId};
pub use font::{Font, Glyph, GlyphQuad};
pub use headless::HeadlessBackend;
pub use pass::{
    Blend, BlendFactor, CompareFunc, Depth, Material, Pass, Stencil, StencilOp, TextureFilter,
    TextureGap, TextureUnit, TextureWrap,
};
pub use program::{Program, Uniform};
pub use shader::{Shader, ShaderKind};
pub use texture::Texture;

#[cfg(test)]
pub(crate) use texture::tests::png;
