use resdef_syntax::{hash32_str, hash64};

use crate::render::{Font, Material, Program, Shader, ShaderKind, Texture};

/// What a cache slot holds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Font,
    Texture,
    Material,
    Program,
    Shader,
}

impl ResourceKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Font => "font",
            Self::Texture => "texture",
            Self::Material => "material",
            Self::Program => "program",
            Self::Shader => "shader",
        }
    }
}

/// A cached object, tagged by kind.
#[derive(Debug)]
pub enum Resource {
    Font(Font),
    Texture(Texture),
    Material(Material),
    Program(Program),
    Shader(Shader),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Font(_) => ResourceKind::Font,
            Self::Texture(_) => ResourceKind::Texture,
            Self::Material(_) => ResourceKind::Material,
            Self::Program(_) => ResourceKind::Program,
            Self::Shader(_) => ResourceKind::Shader,
        }
    }
}

/// Types the cache can store and hand out handles to.
pub trait Cached: Sized + Clone + 'static {
    const KIND: ResourceKind;

    #[doc(hidden)]
    fn from_resource(resource: &Resource) -> Option<&Self>;
}

macro_rules! cached {
    ($($ty:ident),* $(,)?) => {$(
        impl Cached for $ty {
            const KIND: ResourceKind = ResourceKind::$ty;

            fn from_resource(resource: &Resource) -> Option<&Self> {
                match resource {
                    Resource::$ty(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    )*};
}

cached!(Font, Texture, Material, Program, Shader);

/// Namespaces for store keys. Names in different spaces never collide, so a
/// texture and a material may share a path.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum KeySpace {
    Font,
    Texture,
    Material,
    Program,
    VertexShader,
    FragmentShader,
}

impl KeySpace {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Font => "font+",
            Self::Texture => "texture+",
            Self::Material => "material+",
            Self::Program => "program+",
            Self::VertexShader => "vertshader+",
            Self::FragmentShader => "fragshader+",
        }
    }

    pub const fn seed(self) -> u32 {
        hash32_str(self.tag())
    }

    pub const fn key(self, name: &str) -> u64 {
        hash64(name.as_bytes(), self.seed())
    }

    pub fn for_shader(kind: ShaderKind) -> Self {
        match kind {
            ShaderKind::Vertex => Self::VertexShader,
            ShaderKind::Fragment => Self::FragmentShader,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_do_not_collide() {
        let spaces = [
            KeySpace::Font,
            KeySpace::Texture,
            KeySpace::Material,
            KeySpace::Program,
            KeySpace::VertexShader,
            KeySpace::FragmentShader,
        ];
        let keys: Vec<u64> = spaces.iter().map(|s| s.key("test/basic")).collect();
        for (i, a) in keys.iter().enumerate() {
            assert!(keys[i + 1..].iter().all(|b| a != b));
        }
    }

    #[test]
    fn key_is_seeded_hash() {
        assert_eq!(KeySpace::Material.seed(), hash32_str("material+"));
        assert_eq!(KeySpace::Material.key("x"), hash64(b"x", hash32_str("material+")));
    }

    #[test]
    fn resource_downcast() {
        let res = Resource::Material(Material::new());
        assert_eq!(res.kind(), ResourceKind::Material);
        assert!(Material::from_resource(&res).is_some());
        assert!(Program::from_resource(&res).is_none());
    }
}
