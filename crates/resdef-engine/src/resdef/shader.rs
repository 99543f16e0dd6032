use resdef_syntax::{ParseError, ParseErrorKind, TokenKind};

use crate::render::{Program, ShaderKind};

use super::keywords as kw;
use super::{ResdefParser, ResourceLoader};

impl<'t> ResdefParser<'t> {
    /// Parses a complete `shader "name" { ... }` definition into `program`.
    /// Linking is left to the caller.
    pub fn read_shader(&mut self, program: &mut Program, loader: &mut dyn ResourceLoader) -> Result<(), ParseError> {
        self.read_keyword(kw::SHADER)
            .map_err(|e| e.with_kind(ParseErrorKind::NotShader))?;
        self.context = self.read_name()?.to_string();
        self.read_open_brace()?;

        while !self.eof() {
            if self.read_token(TokenKind::CurlClose).is_ok() {
                return Ok(());
            }
            self.statement(|p| p.read_shader_statement(program, loader))?;
        }

        Err(ParseError::end_of_tokens())
    }

    fn read_shader_statement(&mut self, program: &mut Program, loader: &mut dyn ResourceLoader) -> Result<(), ParseError> {
        let pos = self.position();
        let directive = self.read_token(TokenKind::Id)?;

        match resdef_syntax::hash32_str(&directive.value) {
            kw::UNIFORM => {
                let slot = self.read_slot("uniform", kw::named_uniform)?;
                let alias = self.read_alias()?;
                self.read_semicolon()?;
                if let Some(old) = program.bind_uniform(slot, alias) {
                    log::warn!("{}: uniform slot {slot} rebound from `{old}` to `{alias}`", self.context);
                }
            }
            kw::ATTRIB => {
                let slot = self.read_slot("attribute", kw::named_attrib)?;
                let alias = self.read_alias()?;
                self.read_semicolon()?;
                if let Some(old) = program.bind_attrib(slot, alias) {
                    log::warn!("{}: attribute {slot} rebound from `{old}` to `{alias}`", self.context);
                }
            }
            kw::FRAG_OUT => {
                let slot = self.read_slot("fragment output", kw::named_frag_out)?;
                let alias = self.read_alias()?;
                self.read_semicolon()?;
                if let Some(old) = program.bind_frag_out(slot, alias) {
                    log::warn!("{}: fragment output {slot} rebound from `{old}` to `{alias}`", self.context);
                }
            }
            hash @ (kw::VERT | kw::FRAG) => {
                let kind = if hash == kw::VERT { ShaderKind::Vertex } else { ShaderKind::Fragment };
                let path = self.read_string()?;
                self.read_semicolon()?;
                if let Some(shader) = loader.load_shader(path, kind) {
                    loader.attach_shader(program, shader);
                }
            }
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedToken,
                    format!("unknown shader directive `{}`", directive.value),
                    pos,
                ));
            }
        }
        Ok(())
    }

    /// A slot name from `table`, or a non-negative integer slot.
    fn read_slot<T: TryFrom<i64>>(&mut self, what: &str, table: fn(&str) -> Option<T>) -> Result<T, ParseError> {
        let pos = self.position();
        if let Some(tok) = self.current().filter(|t| t.kind == TokenKind::Id) {
            let slot = table(&tok.value).ok_or_else(|| {
                ParseError::new(ParseErrorKind::UnexpectedToken, format!("unknown {what} name `{}`", tok.value), pos)
            })?;
            self.skip_token();
            return Ok(slot);
        }
        let value = self.read_integer()?;
        if value < 0 {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedToken,
                format!("{what} slot {value} is negative"),
                pos,
            ));
        }
        T::try_from(value).map_err(|_| {
            ParseError::new(ParseErrorKind::UnexpectedToken, format!("{what} slot {value} is out of range"), pos)
        })
    }

    /// Source-level name a slot is bound to.
    fn read_alias(&mut self) -> Result<&'t str, ParseError> {
        let tok = self.read_token(TokenKind::Id)?;
        Ok(&tok.value)
    }
}

#[cfg(test)]
mod tests {
    use resdef_syntax::TokenStream;

    use super::super::tests::{lex, MockLoader};
    use super::*;
    use crate::render::program::{ATTRIB_POSITION, ATTRIB_TEXCOORD2, UNIFORM_MODELVIEW, UNIFORM_TEXTURE0};

    fn parse(src: &str) -> (Result<(), ParseError>, Program, MockLoader) {
        let toks = lex(src);
        let mut parser = ResdefParser::new(TokenStream::new(&toks));
        let mut loader = MockLoader::default();
        let mut program = Program::new(&mut loader.gl);
        let result = parser.read_shader(&mut program, &mut loader);
        (result, program, loader)
    }

    #[test]
    fn basic_shader() {
        let (result, mut program, mut loader) = parse(
            "shader \"test/basic\" { attrib position pos_in; vert \"shaders/basic.vert\"; frag \"shaders/basic.frag\"; }",
        );
        result.unwrap();
        assert_eq!(program.attrib(ATTRIB_POSITION), Some("pos_in"));
        assert_eq!(program.shaders().len(), 2);
        assert_eq!(loader.loads, ["vertex:shaders/basic.vert", "fragment:shaders/basic.frag"]);
        assert!(program.link(&mut loader.gl));
    }

    #[test]
    fn failed_compile_breaks_link() {
        let (result, mut program, mut loader) = parse("shader \"s\" { vert \"a.vert\"; frag \"b.bad\"; }");
        result.unwrap();
        assert_eq!(program.shaders().len(), 1);
        assert!(!program.link(&mut loader.gl));
        assert!(program.has_error());
    }

    #[test]
    fn named_and_numbered_slots() {
        let (result, program, _) = parse(
            "shader \"s\" { uniform modelview mv; uniform 5 diffuse; attrib texcoord2 uv2; frag_out out1 color; frag_out 3 glow; }",
        );
        result.unwrap();
        assert_eq!(program.uniform(UNIFORM_MODELVIEW).unwrap().name, "mv");
        assert_eq!(program.uniform(UNIFORM_TEXTURE0 + 1).unwrap().name, "diffuse");
        assert_eq!(program.attrib(ATTRIB_TEXCOORD2), Some("uv2"));
        assert_eq!(program.frag_out(1), Some("color"));
        assert_eq!(program.frag_out(3), Some("glow"));
    }

    #[test]
    fn bad_slots_resync() {
        let (result, program, _) = parse(
            "shader \"s\" { uniform sideways x; attrib -1 y; attrib \"pos\" z; uniform projection p; }",
        );
        result.unwrap();
        assert!(program.attrib(0).is_none());
        assert_eq!(program.uniform(1).unwrap().name, "p");
    }

    #[test]
    fn unknown_directive_resyncs() {
        let (result, program, _) = parse("shader \"s\" { geom \"g\"; attrib color c; }");
        result.unwrap();
        assert_eq!(program.attrib(1), Some("c"));
    }

    #[test]
    fn missing_shader_is_not_attached() {
        let (result, program, _) = parse("shader \"s\" { vert \"missing\"; }");
        result.unwrap();
        assert!(program.shaders().is_empty());
    }

    #[test]
    fn not_a_shader() {
        let (result, _, _) = parse("mat \"m\" { }");
        assert_eq!(result.unwrap_err().kind, ParseErrorKind::NotShader);
    }

    #[test]
    fn unterminated() {
        let (result, _, _) = parse("shader \"s\" { attrib position p;");
        assert!(result.unwrap_err().is_end_of_tokens());
    }
}
