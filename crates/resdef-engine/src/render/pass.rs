use crate::handle::Handle;

use super::program::Program;
use super::texture::Texture;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    Incr,
    IncrWrap,
    Decr,
    DecrWrap,
    Invert,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl TextureFilter {
    /// Whether the filter can be used for magnification.
    pub fn is_mag_filter(self) -> bool {
        matches!(self, Self::Nearest | Self::Linear)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureWrap {
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Blend {
    pub sfactor: BlendFactor,
    pub dfactor: BlendFactor,
}

impl Blend {
    pub const OPAQUE: Self = Self { sfactor: BlendFactor::One, dfactor: BlendFactor::Zero };
    pub const SCREEN: Self = Self { sfactor: BlendFactor::SrcAlpha, dfactor: BlendFactor::One };
    pub const MULTIPLY: Self = Self { sfactor: BlendFactor::DstColor, dfactor: BlendFactor::OneMinusSrcAlpha };
    pub const ALPHA: Self = Self { sfactor: BlendFactor::SrcAlpha, dfactor: BlendFactor::OneMinusSrcAlpha };
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Depth {
    pub func:  CompareFunc,
    pub write: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Stencil {
    pub mask:       u32,
    pub func:       CompareFunc,
    pub ref_value:  i32,
    pub ref_mask:   u32,
    pub fail:       StencilOp,
    pub depth_fail: StencilOp,
    pub depth_pass: StencilOp,
}

/// One texture unit of a pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureUnit {
    pub texture:    Option<Handle<Texture>>,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub x_wrap:     TextureWrap,
    pub y_wrap:     TextureWrap,
}

impl Default for TextureUnit {
    fn default() -> Self {
        Self {
            texture:    None,
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            x_wrap:     TextureWrap::Repeat,
            y_wrap:     TextureWrap::Repeat,
        }
    }
}

/// A bound texture unit following an empty one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureGap {
    pub empty_unit: usize,
    pub bound_unit: usize,
}

/// Render state for drawing one pass of a material.
///
/// The program and textures are cache handles the pass holds a reference on;
/// releasing the material releases them.
#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    pub skip:     bool,
    pub blend:    Blend,
    pub depth:    Depth,
    pub stencil:  Stencil,
    pub program:  Option<Handle<Program>>,
    pub textures: [TextureUnit; Pass::MAX_TEXTURE_UNITS],
}

impl Default for Pass {
    fn default() -> Self {
        Self {
            skip:     false,
            blend:    Blend::OPAQUE,
            depth:    Depth { func: CompareFunc::Less, write: true },
            stencil:  Stencil {
                mask:       u32::MAX,
                func:       CompareFunc::Always,
                ref_value:  0,
                ref_mask:   u32::MAX,
                fail:       StencilOp::Keep,
                depth_fail: StencilOp::Keep,
                depth_pass: StencilOp::Keep,
            },
            program:  None,
            textures: [TextureUnit::default(); Pass::MAX_TEXTURE_UNITS],
        }
    }
}

impl Pass {
    pub const MAX_TEXTURE_UNITS: usize = 8;

    /// Attaches a program to a pass that has none.
    ///
    /// # Panics
    /// If the pass already has a program.
    pub fn set_program(&mut self, program: Handle<Program>) {
        assert!(self.program.is_none(), "pass already has a program attached");
        self.program = Some(program);
    }

    /// Binds a texture to an empty unit.
    ///
    /// # Panics
    /// If `unit` is out of range or already has a texture.
    pub fn set_texture(&mut self, unit: usize, texture: Handle<Texture>) {
        let slot = &mut self.textures[unit].texture;
        assert!(slot.is_none(), "texture unit {unit} already has a texture bound");
        *slot = Some(texture);
    }

    /// Checks that bound units are contiguous from unit 0.
    pub fn validate_texture_units(&self) -> Result<(), TextureGap> {
        let Some(empty_unit) = self.textures.iter().position(|u| u.texture.is_none()) else {
            return Ok(());
        };
        match self.textures[empty_unit..].iter().position(|u| u.texture.is_some()) {
            Some(offset) => Err(TextureGap { empty_unit, bound_unit: empty_unit + offset }),
            None => Ok(()),
        }
    }

    /// Units that would be applied when drawing: everything up to the first
    /// empty unit.
    pub fn bound_textures(&self) -> impl Iterator<Item = (usize, &TextureUnit)> + '_ {
        self.textures.iter().enumerate().take_while(|(_, u)| u.texture.is_some())
    }

    pub(crate) fn texture_handles(&self) -> impl Iterator<Item = Handle<Texture>> + '_ {
        self.textures.iter().filter_map(|u| u.texture)
    }
}

/// Up to [`Material::MAX_PASSES`] passes, drawn in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Material {
    passes: Vec<Pass>,
}

impl Material {
    pub const MAX_PASSES: usize = 4;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_passes(&self) -> usize {
        self.passes.len()
    }

    /// Appends a default pass and returns it, or `None` when the material is
    /// full.
    pub fn add_pass(&mut self) -> Option<&mut Pass> {
        if self.passes.len() >= Self::MAX_PASSES {
            return None;
        }
        self.passes.push(Pass::default());
        self.passes.last_mut()
    }

    pub fn pass(&self, index: usize) -> Option<&Pass> {
        self.passes.get(index)
    }

    pub fn pass_mut(&mut self, index: usize) -> Option<&mut Pass> {
        self.passes.get_mut(index)
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// A material with no passes draws nothing.
    pub fn is_valid(&self) -> bool {
        !self.passes.is_empty()
    }
}
