use serde::Deserialize;

/// Where the resource cache looks for things, and how it loads them.
///
/// All paths are relative to the root of the [`Vfs`](crate::vfs::Vfs) the
/// cache reads from. Can be deserialized from JSON; missing fields keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    /// Root of the recursive definition scan.
    pub defs_dir: String,
    /// Directory scanned (non-recursively) for font databases.
    pub fonts_dir: String,
    /// Extension of font database files, matched case-insensitively.
    pub font_db_extension: String,
    /// Material used for font pages whose own material fails to load.
    pub missing_material: String,
    /// Whether textures referenced by `map` directives get mipmaps.
    pub texture_mipmaps: bool,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            defs_dir: "defs".to_string(),
            fonts_dir: "fonts".to_string(),
            font_db_extension: "db".to_string(),
            missing_material: "notex".to_string(),
            texture_mipmaps: true,
        }
    }
}

impl ResourcesConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub(crate) fn is_font_db(&self, file_name: &str) -> bool {
        file_name
            .rsplit_once('.')
            .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case(&self.font_db_extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ResourcesConfig::from_json(r#"{ "defs_dir": "data/defs" }"#).unwrap();
        assert_eq!(config.defs_dir, "data/defs");
        assert_eq!(config.fonts_dir, "fonts");
        assert!(config.texture_mipmaps);
    }

    #[test]
    fn font_db_extension_ignores_case() {
        let config = ResourcesConfig::default();
        assert!(config.is_font_db("sans.db"));
        assert!(config.is_font_db("SANS.DB"));
        assert!(!config.is_font_db("sans.dbx"));
        assert!(!config.is_font_db(".db"));
        assert!(!config.is_font_db("db"));
    }
}
