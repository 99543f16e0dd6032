//! Parser for resource definition files.
//!
//! A definitions file holds any number of `mat "name" { ... }` and
//! `shader "name" { ... }` blocks. [`ResdefParser::read_resource_def`] indexes
//! them without interpreting their bodies; [`ResdefParser::read_material`] and
//! [`ResdefParser::read_shader`] build the render state, pulling dependencies
//! through a [`ResourceLoader`].
//!
//! Errors inside a body are logged and skipped: a bad statement is dropped
//! through its `;`, a bad pass or map block through its `}`. Only running out
//! of tokens fails the whole definition.

pub(crate) mod keywords;
mod material;
mod shader;

use std::ops::{Deref, DerefMut, Range};

use resdef_syntax::{ParseError, ParseErrorKind, Position, TokenKind, TokenStream};

use crate::handle::Handle;
use crate::render::{Program, Shader, ShaderKind, Texture};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DefKind {
    Material,
    Shader,
}

impl DefKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Material => keywords::MAT,
            Self::Shader => keywords::SHADER,
        }
    }
}

/// A definition found by [`ResdefParser::read_resource_def`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDef {
    pub kind: DefKind,
    pub name: String,
    /// Byte range from the leading keyword through the closing brace.
    pub span: Range<usize>,
    pub pos:  Position,
}

/// Where the definition parser gets its dependencies from.
///
/// Loads log their own failures; `None` leaves the dependent slot unset.
pub trait ResourceLoader {
    fn load_program(&mut self, name: &str) -> Option<Handle<Program>>;
    fn load_texture(&mut self, path: &str, mipmaps: bool) -> Option<Handle<Texture>>;
    fn load_shader(&mut self, path: &str, kind: ShaderKind) -> Option<Handle<Shader>>;

    fn release_program(&mut self, program: Handle<Program>);
    fn release_texture(&mut self, texture: Handle<Texture>);
    fn release_shader(&mut self, shader: Handle<Shader>);

    /// Attaches a loaded shader to `program`. The program takes over the
    /// reference.
    fn attach_shader(&mut self, program: &mut Program, shader: Handle<Shader>);
}

/// Domain parser over a token stream. Derefs to the underlying
/// [`TokenStream`], so all of its reads and skips are available.
pub struct ResdefParser<'t> {
    stream: TokenStream<'t>,
    /// Whether textures loaded by `map` get mipmaps.
    pub texture_mipmaps: bool,
    /// Name of the definition being parsed, for log lines.
    context: String,
}

impl<'t> Deref for ResdefParser<'t> {
    type Target = TokenStream<'t>;

    fn deref(&self) -> &Self::Target {
        &self.stream
    }
}

impl DerefMut for ResdefParser<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.stream
    }
}

impl<'t> ResdefParser<'t> {
    pub fn new(stream: TokenStream<'t>) -> Self {
        Self { stream, texture_mipmaps: true, context: String::new() }
    }

    pub fn into_stream(self) -> TokenStream<'t> {
        self.stream
    }

    fn error_here(&self, kind: ParseErrorKind, message: impl Into<String>) -> ParseError {
        ParseError::new(kind, message, self.position())
    }

    fn log_recovered(&self, err: &ParseError) {
        log::error!("{}: {err}", self.context);
    }

    /// Reads one definition header and skips its body.
    ///
    /// On a malformed header the parser skips to the next `{`, past its
    /// matching `}`, and returns the error; calling again continues with the
    /// following definition.
    pub fn read_resource_def(&mut self) -> Result<ResourceDef, ParseError> {
        let first = self.current().ok_or_else(ParseError::end_of_tokens)?;

        let result = self.read_def_header();
        let kind_name = match result {
            Ok(header) => header,
            Err(err) => {
                self.skip_through_token(TokenKind::CurlOpen);
                let _ = self.skip_matched_braces(1);
                let _ = self.read_token(TokenKind::CurlClose);
                return Err(err);
            }
        };

        self.skip_matched_braces(1)?;
        let close = self.read_token(TokenKind::CurlClose)?;

        let (kind, name) = kind_name;
        Ok(ResourceDef { kind, name, span: first.span.start..close.span.end, pos: first.pos })
    }

    fn read_def_header(&mut self) -> Result<(DefKind, String), ParseError> {
        let kind = if self.is_at_value(TokenKind::Id, keywords::MAT) {
            DefKind::Material
        } else if self.is_at_value(TokenKind::Id, keywords::SHADER) {
            DefKind::Shader
        } else {
            let found = self.current().map_or("end of tokens", |t| t.kind.descriptor());
            return Err(self.error_here(
                ParseErrorKind::InvalidResdef,
                format!("expected either 'mat' or 'shader', found {found}"),
            ));
        };
        self.skip_token();

        let name = self.read_name()?;
        self.read_open_brace()?;
        Ok((kind, name.to_string()))
    }

    fn read_name(&mut self) -> Result<&'t str, ParseError> {
        self.read_string()
            .map_err(|e| e.with_kind(ParseErrorKind::UnexpectedToken))
    }

    fn read_open_brace(&mut self) -> Result<(), ParseError> {
        self.read_token(TokenKind::CurlOpen)
            .map(|_| ())
            .map_err(|e| e.with_kind(ParseErrorKind::UnexpectedToken))
    }

    /// Skips forward to the `}` closing `depth` open braces and stops on it
    /// without consuming it. The cursor must be just inside the innermost
    /// open brace.
    pub fn skip_matched_braces(&mut self, mut depth: usize) -> Result<(), ParseError> {
        if depth == 0 {
            return Ok(());
        }
        while let Some(kind) = self.current_kind() {
            match kind {
                TokenKind::CurlOpen => depth += 1,
                TokenKind::CurlClose => depth -= 1,
                _ => {}
            }
            if depth == 0 {
                return Ok(());
            }
            self.skip_token();
        }
        Err(ParseError::new(
            ParseErrorKind::UnmatchedBrace,
            "parser encountered an unclosed curly brace",
            None,
        ))
    }

    /// Skips a `{ ... }` block whose opening brace is the current token.
    fn skip_block(&mut self) -> Result<(), ParseError> {
        self.read_token(TokenKind::CurlOpen)?;
        self.skip_matched_braces(1)?;
        self.read_token(TokenKind::CurlClose).map(|_| ())
    }

    /// Runs one statement parser, resyncing through the next `;` if it
    /// fails. Only end-of-tokens is passed up.
    fn statement(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<(), ParseError>,
    ) -> Result<(), ParseError> {
        match read(self) {
            Err(err) if err.is_end_of_tokens() => Err(err),
            Err(err) => {
                self.log_recovered(&err);
                self.skip_through_token(TokenKind::Semicolon);
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    /// Reads an identifier and maps its hash through `lookup`.
    fn read_hashed<T>(&mut self, what: &str, lookup: fn(u32) -> Option<T>) -> Result<T, ParseError> {
        let pos = self.position();
        let tok = self.read_token(TokenKind::Id)?;
        lookup(resdef_syntax::hash32_str(&tok.value)).ok_or_else(|| {
            ParseError::new(ParseErrorKind::UnexpectedToken, format!("`{}` is not a {what}", tok.value), pos)
        })
    }

    fn read_semicolon(&mut self) -> Result<(), ParseError> {
        self.read_token(TokenKind::Semicolon).map(|_| ())
    }

    /// Integer that fits in 32 bits, signed or not. Negative values wrap, so
    /// `-1` is an all-ones mask.
    fn read_u32_bits(&mut self) -> Result<u32, ParseError> {
        let pos = self.position();
        let value = self.read_integer()?;
        if value < i64::from(i32::MIN) || value > i64::from(u32::MAX) {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedToken,
                format!("{value} does not fit in 32 bits"),
                pos,
            ));
        }
        Ok(value as u32)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::handle::RawHandle;
    use crate::render::HeadlessBackend;
    use resdef_syntax::{Lexer, Token};

    pub(crate) fn lex(src: &str) -> Vec<Token> {
        Lexer::compact().tokenize(src).unwrap()
    }

    /// Hands out fresh handles for everything except the name `missing`, and
    /// records what was asked of it.
    #[derive(Default)]
    pub(crate) struct MockLoader {
        pub gl:       HeadlessBackend,
        pub loads:    Vec<String>,
        pub released: Vec<String>,
        pub shaders:  Vec<Shader>,
        next:         u32,
    }

    impl MockLoader {
        fn next<T>(&mut self, what: &str, name: &str) -> Option<Handle<T>> {
            self.loads.push(format!("{what}:{name}"));
            if name == "missing" {
                return None;
            }
            let index = self.next;
            self.next += 1;
            Some(Handle::new(RawHandle { index, generation: 0 }))
        }
    }

    impl ResourceLoader for MockLoader {
        fn load_program(&mut self, name: &str) -> Option<Handle<Program>> {
            self.next("program", name)
        }

        fn load_texture(&mut self, path: &str, _mipmaps: bool) -> Option<Handle<Texture>> {
            self.next("texture", path)
        }

        fn load_shader(&mut self, path: &str, kind: ShaderKind) -> Option<Handle<Shader>> {
            let handle = self.next(kind.name(), path)?;
            let source = if path.ends_with(".bad") { "" } else { "void main() {}" };
            match Shader::compile(&mut self.gl, kind, source) {
                Ok(shader) => {
                    self.shaders.push(shader);
                    Some(handle)
                }
                Err(_) => None,
            }
        }

        fn release_program(&mut self, program: Handle<Program>) {
            self.released.push(format!("program:{}", program.index()));
        }

        fn release_texture(&mut self, texture: Handle<Texture>) {
            self.released.push(format!("texture:{}", texture.index()));
        }

        fn release_shader(&mut self, shader: Handle<Shader>) {
            self.released.push(format!("shader:{}", shader.index()));
        }

        fn attach_shader(&mut self, program: &mut Program, shader: Handle<Shader>) {
            if let Some(compiled) = self.shaders.last() {
                program.attach_shader(&mut self.gl, shader, compiled);
            }
        }
    }

    fn defs(src: &str) -> Vec<Result<ResourceDef, ParseErrorKind>> {
        let toks = lex(src);
        let mut parser = ResdefParser::new(TokenStream::new(&toks));
        let mut out = Vec::new();
        while !parser.eof() {
            out.push(parser.read_resource_def().map_err(|e| e.kind));
        }
        out
    }

    #[test]
    fn indexes_definitions() {
        let src = "mat \"a\" { pass { blend one zero; } }\nshader 'b' { vert \"x\"; }";
        let found = defs(src);
        assert_eq!(found.len(), 2);
        let a = found[0].as_ref().unwrap();
        assert_eq!((a.kind, a.name.as_str()), (DefKind::Material, "a"));
        assert_eq!(&src[a.span.clone()], "mat \"a\" { pass { blend one zero; } }");
        let b = found[1].as_ref().unwrap();
        assert_eq!((b.kind, b.name.as_str()), (DefKind::Shader, "b"));
        assert_eq!(b.pos, Position::new(2, 1));
        assert!(src[b.span.clone()].ends_with('}'));
    }

    #[test]
    fn bad_header_skips_its_block() {
        let found = defs("tex \"a\" { { } } mat \"b\" {}");
        assert_eq!(found[0], Err(ParseErrorKind::InvalidResdef));
        assert_eq!(found[1].as_ref().unwrap().name, "b");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn missing_name() {
        let found = defs("mat { } shader \"s\" { }");
        assert_eq!(found[0], Err(ParseErrorKind::UnexpectedToken));
        assert_eq!(found[1].as_ref().unwrap().name, "s");
    }

    #[test]
    fn unclosed_definition() {
        assert_eq!(defs("mat \"a\" { pass {"), [Err(ParseErrorKind::UnmatchedBrace)]);
    }

    #[test]
    fn brace_matching_stops_on_the_match() {
        for depth in 1..6 {
            let body = "{ ".repeat(depth - 1) + &"} ".repeat(depth - 1);
            let src = format!("{{ {body} }} tail");
            let toks = lex(&src);
            let mut parser = ResdefParser::new(TokenStream::new(&toks));
            parser.read_token(TokenKind::CurlOpen).unwrap();
            parser.skip_matched_braces(1).unwrap();
            assert!(parser.is_at(TokenKind::CurlClose), "depth {depth}");
            assert!(parser.next_is_value(TokenKind::Id, "tail"), "depth {depth}");
        }
    }

    #[test]
    fn zero_depth_is_a_no_op() {
        let toks = lex("} x");
        let mut parser = ResdefParser::new(TokenStream::new(&toks));
        parser.skip_matched_braces(0).unwrap();
        assert!(parser.is_at(TokenKind::CurlClose));
    }

    #[test]
    fn u32_bits() {
        let toks = lex("-1 0xffffffff 0x100000000");
        let mut parser = ResdefParser::new(TokenStream::new(&toks));
        assert_eq!(parser.read_u32_bits().unwrap(), u32::MAX);
        assert_eq!(parser.read_u32_bits().unwrap(), u32::MAX);
        assert!(parser.read_u32_bits().is_err());
    }
}
