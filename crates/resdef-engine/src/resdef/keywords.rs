//! Directive vocabularies, dispatched on the 32-bit hash of the identifier.

use resdef_syntax::hash32_str;

use crate::render::program::{
    ATTRIB_BINORMAL, ATTRIB_BONE_INDICES, ATTRIB_BONE_WEIGHTS, ATTRIB_COLOR, ATTRIB_NORMAL,
    ATTRIB_POSITION, ATTRIB_TANGENT, ATTRIB_TEXCOORD0, ATTRIB_TEXCOORD1, ATTRIB_TEXCOORD2,
    ATTRIB_TEXCOORD3, UNIFORM_BONES, UNIFORM_MODELVIEW, UNIFORM_PROJECTION, UNIFORM_TEXTURE0,
    UNIFORM_TEXTURE_MATRIX,
};
use crate::render::{Blend, BlendFactor, CompareFunc, StencilOp, TextureFilter, TextureWrap};

// ── Structure ─────────────────────────────────────────────────────────────

pub(crate) const MAT: &str = "mat";
pub(crate) const SHADER: &str = "shader";
pub(crate) const PASS: &str = "pass";

// ── Pass directives ───────────────────────────────────────────────────────

pub(crate) const SHADER_KW: u32 = hash32_str("shader");
pub(crate) const BLEND: u32 = hash32_str("blend");
pub(crate) const DEPTHWRITE: u32 = hash32_str("depthwrite");
pub(crate) const DEPTHFUNC: u32 = hash32_str("depthfunc");
pub(crate) const STENCILMASK: u32 = hash32_str("stencilmask");
pub(crate) const STENCILFUNC: u32 = hash32_str("stencilfunc");
pub(crate) const STENCILOP: u32 = hash32_str("stencilop");

// ── Map directives ────────────────────────────────────────────────────────

pub(crate) const MAP: u32 = hash32_str("map");
pub(crate) const FILTER: u32 = hash32_str("filter");
pub(crate) const WRAP: u32 = hash32_str("wrap");

// ── Shader directives ─────────────────────────────────────────────────────

pub(crate) const UNIFORM: u32 = hash32_str("uniform");
pub(crate) const ATTRIB: u32 = hash32_str("attrib");
pub(crate) const FRAG_OUT: u32 = hash32_str("frag_out");
pub(crate) const VERT: u32 = hash32_str("vert");
pub(crate) const FRAG: u32 = hash32_str("frag");

// ── Values ────────────────────────────────────────────────────────────────

const ZERO: u32 = hash32_str("zero");
const ONE: u32 = hash32_str("one");
const SRC_COLOR: u32 = hash32_str("src_color");
const ONE_MINUS_SRC_COLOR: u32 = hash32_str("one_minus_src_color");
const DST_COLOR: u32 = hash32_str("dst_color");
const ONE_MINUS_DST_COLOR: u32 = hash32_str("one_minus_dst_color");
const SRC_ALPHA: u32 = hash32_str("src_alpha");
const ONE_MINUS_SRC_ALPHA: u32 = hash32_str("one_minus_src_alpha");
const DST_ALPHA: u32 = hash32_str("dst_alpha");
const ONE_MINUS_DST_ALPHA: u32 = hash32_str("one_minus_dst_alpha");

const OPAQUE: u32 = hash32_str("opaque");
const SCREEN: u32 = hash32_str("screen");
const MULTIPLY: u32 = hash32_str("multiply");
const ALPHA: u32 = hash32_str("alpha");

const NEVER: u32 = hash32_str("never");
const LESS: u32 = hash32_str("less");
const EQUAL: u32 = hash32_str("equal");
const LEQUAL: u32 = hash32_str("lequal");
const GREATER: u32 = hash32_str("greater");
const NOTEQUAL: u32 = hash32_str("notequal");
const GEQUAL: u32 = hash32_str("gequal");
const ALWAYS: u32 = hash32_str("always");

const KEEP: u32 = hash32_str("keep");
const REPLACE: u32 = hash32_str("replace");
const INCR: u32 = hash32_str("incr");
const INCR_WRAP: u32 = hash32_str("incr_wrap");
const DECR: u32 = hash32_str("decr");
const DECR_WRAP: u32 = hash32_str("decr_wrap");
const INVERT: u32 = hash32_str("invert");

const NEAREST: u32 = hash32_str("nearest");
const LINEAR: u32 = hash32_str("linear");
const NEAREST_MIPMAP_NEAREST: u32 = hash32_str("nearest_mipmap_nearest");
const LINEAR_MIPMAP_NEAREST: u32 = hash32_str("linear_mipmap_nearest");
const NEAREST_MIPMAP_LINEAR: u32 = hash32_str("nearest_mipmap_linear");
const LINEAR_MIPMAP_LINEAR: u32 = hash32_str("linear_mipmap_linear");

const EDGE: u32 = hash32_str("edge");
const REPEAT: u32 = hash32_str("repeat");
const MIRRORED: u32 = hash32_str("mirrored");

pub(crate) fn blend_factor(hash: u32) -> Option<BlendFactor> {
    Some(match hash {
        ZERO                => BlendFactor::Zero,
        ONE                 => BlendFactor::One,
        SRC_COLOR           => BlendFactor::SrcColor,
        ONE_MINUS_SRC_COLOR => BlendFactor::OneMinusSrcColor,
        DST_COLOR           => BlendFactor::DstColor,
        ONE_MINUS_DST_COLOR => BlendFactor::OneMinusDstColor,
        SRC_ALPHA           => BlendFactor::SrcAlpha,
        ONE_MINUS_SRC_ALPHA => BlendFactor::OneMinusSrcAlpha,
        DST_ALPHA           => BlendFactor::DstAlpha,
        ONE_MINUS_DST_ALPHA => BlendFactor::OneMinusDstAlpha,
        _ => return None,
    })
}

/// Single-keyword blend modes setting both factors.
pub(crate) fn blend_mode(hash: u32) -> Option<Blend> {
    Some(match hash {
        OPAQUE   => Blend::OPAQUE,
        SCREEN   => Blend::SCREEN,
        MULTIPLY => Blend::MULTIPLY,
        ALPHA    => Blend::ALPHA,
        _ => return None,
    })
}

pub(crate) fn compare_func(hash: u32) -> Option<CompareFunc> {
    Some(match hash {
        NEVER    => CompareFunc::Never,
        LESS     => CompareFunc::Less,
        EQUAL    => CompareFunc::Equal,
        LEQUAL   => CompareFunc::LessEqual,
        GREATER  => CompareFunc::Greater,
        NOTEQUAL => CompareFunc::NotEqual,
        GEQUAL   => CompareFunc::GreaterEqual,
        ALWAYS   => CompareFunc::Always,
        _ => return None,
    })
}

pub(crate) fn stencil_op(hash: u32) -> Option<StencilOp> {
    Some(match hash {
        KEEP      => StencilOp::Keep,
        ZERO      => StencilOp::Zero,
        REPLACE   => StencilOp::Replace,
        INCR      => StencilOp::Incr,
        INCR_WRAP => StencilOp::IncrWrap,
        DECR      => StencilOp::Decr,
        DECR_WRAP => StencilOp::DecrWrap,
        INVERT    => StencilOp::Invert,
        _ => return None,
    })
}

pub(crate) fn texture_filter(hash: u32) -> Option<TextureFilter> {
    Some(match hash {
        NEAREST                => TextureFilter::Nearest,
        LINEAR                 => TextureFilter::Linear,
        NEAREST_MIPMAP_NEAREST => TextureFilter::NearestMipmapNearest,
        LINEAR_MIPMAP_NEAREST  => TextureFilter::LinearMipmapNearest,
        NEAREST_MIPMAP_LINEAR  => TextureFilter::NearestMipmapLinear,
        LINEAR_MIPMAP_LINEAR   => TextureFilter::LinearMipmapLinear,
        _ => return None,
    })
}

pub(crate) fn texture_wrap(hash: u32) -> Option<TextureWrap> {
    Some(match hash {
        EDGE     => TextureWrap::ClampToEdge,
        REPEAT   => TextureWrap::Repeat,
        MIRRORED => TextureWrap::MirroredRepeat,
        _ => return None,
    })
}

// ── Named slots ───────────────────────────────────────────────────────────

pub(crate) fn named_uniform(name: &str) -> Option<i32> {
    Some(match name {
        "modelview"      => UNIFORM_MODELVIEW,
        "projection"     => UNIFORM_PROJECTION,
        "texture_matrix" => UNIFORM_TEXTURE_MATRIX,
        "bones"          => UNIFORM_BONES,
        _ => {
            let unit = name.strip_prefix("texture")?;
            if unit.len() != 1 {
                return None;
            }
            let unit = unit.parse::<i32>().ok().filter(|u| (0..8).contains(u))?;
            UNIFORM_TEXTURE0 + unit
        }
    })
}

pub(crate) fn named_attrib(name: &str) -> Option<u32> {
    Some(match name {
        "position"     => ATTRIB_POSITION,
        "color"        => ATTRIB_COLOR,
        "normal"       => ATTRIB_NORMAL,
        "binormal"     => ATTRIB_BINORMAL,
        "tangent"      => ATTRIB_TANGENT,
        "texcoord0"    => ATTRIB_TEXCOORD0,
        "texcoord1"    => ATTRIB_TEXCOORD1,
        "texcoord2"    => ATTRIB_TEXCOORD2,
        "texcoord3"    => ATTRIB_TEXCOORD3,
        "bone_indices" => ATTRIB_BONE_INDICES,
        "bone_weights" => ATTRIB_BONE_WEIGHTS,
        _ => return None,
    })
}

pub(crate) fn named_frag_out(name: &str) -> Option<u32> {
    Some(match name {
        "out0" => 0,
        "out1" => 1,
        "out2" => 2,
        "out3" => 3,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_vocabulary() {
        assert_eq!(blend_factor(hash32_str("one_minus_dst_alpha")), Some(BlendFactor::OneMinusDstAlpha));
        assert_eq!(blend_factor(hash32_str("alpha")), None);
        assert_eq!(blend_mode(hash32_str("multiply")), Some(Blend::MULTIPLY));
        assert_eq!(blend_mode(hash32_str("one")), None);
    }

    #[test]
    fn zero_is_shared() {
        assert_eq!(blend_factor(hash32_str("zero")), Some(BlendFactor::Zero));
        assert_eq!(stencil_op(hash32_str("zero")), Some(StencilOp::Zero));
    }

    #[test]
    fn compare_and_filters() {
        assert_eq!(compare_func(hash32_str("lequal")), Some(CompareFunc::LessEqual));
        assert_eq!(texture_filter(hash32_str("linear_mipmap_linear")), Some(TextureFilter::LinearMipmapLinear));
        assert_eq!(texture_wrap(hash32_str("mirrored")), Some(TextureWrap::MirroredRepeat));
        assert_eq!(texture_wrap(hash32_str("clamp")), None);
    }

    #[test]
    fn uniform_names() {
        assert_eq!(named_uniform("projection"), Some(UNIFORM_PROJECTION));
        assert_eq!(named_uniform("texture0"), Some(UNIFORM_TEXTURE0));
        assert_eq!(named_uniform("texture7"), Some(UNIFORM_TEXTURE0 + 7));
        assert_eq!(named_uniform("texture8"), None);
        assert_eq!(named_uniform("texture"), None);
    }

    #[test]
    fn texcoords_are_distinct() {
        let slots: Vec<_> = (0..4).filter_map(|i| named_attrib(&format!("texcoord{i}"))).collect();
        assert_eq!(slots, [ATTRIB_TEXCOORD0, ATTRIB_TEXCOORD1, ATTRIB_TEXCOORD2, ATTRIB_TEXCOORD3]);
    }

    #[test]
    fn frag_outs() {
        assert_eq!(named_frag_out("out3"), Some(3));
        assert_eq!(named_frag_out("out4"), None);
    }
}
