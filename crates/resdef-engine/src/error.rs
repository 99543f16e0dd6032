use std::fmt;
use std::io;

use resdef_syntax::{LexError, ParseError};

/// Why a resource could not be located or materialized.
///
/// The cache logs these and hands `None` to its callers; the tool and tests
/// can get at them through the `try_*` loaders.
#[derive(Debug)]
pub enum ResourceError {
    /// No definition or font database registered under this name.
    NotIndexed { kind: &'static str, name: String },
    Io { path: String, source: io::Error },
    Utf8 { path: String },
    Lex { path: String, source: LexError },
    Parse { path: String, source: ParseError },
    Decode { path: String, source: image::ImageError },
    Compile { path: String, log: String },
    Upload { path: String, log: String },
    FontDb { path: String, source: serde_json::Error },
    /// A font database was found but holds no font of this name.
    FontNotFound { name: String },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotIndexed { kind, name } => write!(f, "no {kind} named '{name}' is indexed"),
            Self::Io { path, source } => write!(f, "unable to read '{path}': {source}"),
            Self::Utf8 { path } => write!(f, "'{path}' is not valid UTF-8"),
            Self::Lex { path, source } => write!(f, "{path}: {source}"),
            Self::Parse { path, source } => write!(f, "{path}: {source}"),
            Self::Decode { path, source } => write!(f, "unable to decode image '{path}': {source}"),
            Self::Compile { path, log } => write!(f, "unable to compile shader '{path}': {log}"),
            Self::Upload { path, log } => write!(f, "unable to upload texture '{path}': {log}"),
            Self::FontDb { path, source } => write!(f, "malformed font database '{path}': {source}"),
            Self::FontNotFound { name } => write!(f, "font '{name}' is not in its database"),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Lex { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::FontDb { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl ResourceError {
    pub(crate) fn io(path: &str, source: io::Error) -> Self {
        Self::Io { path: path.to_string(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_display_and_source() {
        let err = ResourceError::io("defs/a.def", io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "unable to read 'defs/a.def': gone");
        assert!(err.source().is_some());
    }

    #[test]
    fn not_indexed_display() {
        let err = ResourceError::NotIndexed { kind: "material", name: "x".into() };
        assert_eq!(err.to_string(), "no material named 'x' is indexed");
        assert!(err.source().is_none());
    }
}
