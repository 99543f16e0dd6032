use resdef_syntax::{ParseError, ParseErrorKind, TokenKind};

use crate::render::{Blend, Material, Pass};

use super::keywords as kw;
use super::{ResdefParser, ResourceLoader};

impl ResdefParser<'_> {
    /// Parses a complete `mat "name" { pass { ... } ... }` definition into
    /// `material`.
    ///
    /// Passes past [`Material::MAX_PASSES`] and texture blocks past
    /// [`Pass::MAX_TEXTURE_UNITS`] are logged and skipped.
    pub fn read_material(
        &mut self,
        material: &mut Material,
        loader: &mut dyn ResourceLoader,
    ) -> Result<(), ParseError> {
        self.read_keyword(kw::MAT)
            .map_err(|e| e.with_kind(ParseErrorKind::NotMaterial))?;
        self.context = self.read_name()?.to_string();
        self.read_open_brace()?;

        while !self.eof() {
            if self.read_token(TokenKind::CurlClose).is_ok() {
                return Ok(());
            }

            if !self.is_at_value(TokenKind::Id, kw::PASS) {
                let err = self.error_here(
                    ParseErrorKind::UnexpectedToken,
                    format!("expected 'pass' or '}}', found {}", self.describe_current()),
                );
                self.log_recovered(&err);
                self.skip_token();
                continue;
            }
            self.skip_token();

            let index = material.num_passes();
            let Some(pass) = material.add_pass() else {
                let err = self.error_here(
                    ParseErrorKind::UnexpectedToken,
                    format!("a material has at most {} passes", Material::MAX_PASSES),
                );
                self.log_recovered(&err);
                if let Err(err) = self.skip_block() {
                    if err.is_end_of_tokens() || err.kind == ParseErrorKind::UnmatchedBrace {
                        return Err(err);
                    }
                }
                continue;
            };

            match self.read_pass(pass, loader) {
                Ok(()) => {}
                Err(err) if err.is_end_of_tokens() => return Err(err),
                Err(err) => {
                    self.log_recovered(&err);
                    self.skip_through_token(TokenKind::CurlClose);
                }
            }

            if let Err(gap) = pass.validate_texture_units() {
                log::warn!(
                    "{}: pass {index} binds texture unit {} after empty unit {}; units past the gap are not applied",
                    self.context,
                    gap.bound_unit,
                    gap.empty_unit,
                );
            }
        }

        Err(ParseError::end_of_tokens())
    }

    fn describe_current(&self) -> String {
        match self.current() {
            Some(tok) if tok.kind == TokenKind::Id => format!("`{}`", tok.value),
            Some(tok) => tok.kind.descriptor().to_string(),
            None => "end of tokens".to_string(),
        }
    }

    fn read_pass(&mut self, pass: &mut Pass, loader: &mut dyn ResourceLoader) -> Result<(), ParseError> {
        self.read_open_brace()?;

        let mut unit = 0;
        while !self.eof() {
            if self.read_token(TokenKind::CurlClose).is_ok() {
                return Ok(());
            }

            if self.is_at(TokenKind::CurlOpen) {
                if unit >= Pass::MAX_TEXTURE_UNITS {
                    let err = self.error_here(
                        ParseErrorKind::UnexpectedToken,
                        format!("a pass has at most {} texture units", Pass::MAX_TEXTURE_UNITS),
                    );
                    self.log_recovered(&err);
                    self.skip_block()?;
                } else {
                    self.skip_token();
                    self.read_map(pass, unit, loader)?;
                }
                unit += 1;
                continue;
            }

            self.statement(|p| p.read_pass_statement(pass, loader))?;
        }

        Err(ParseError::end_of_tokens())
    }

    fn read_pass_statement(&mut self, pass: &mut Pass, loader: &mut dyn ResourceLoader) -> Result<(), ParseError> {
        let pos = self.position();
        let directive = self.read_token(TokenKind::Id)?;

        match resdef_syntax::hash32_str(&directive.value) {
            kw::SHADER_KW => {
                let name = self.read_string()?;
                self.read_semicolon()?;
                if let Some(program) = loader.load_program(name) {
                    if let Some(old) = pass.program.replace(program) {
                        log::warn!("{}: replacing the pass program with '{name}'", self.context);
                        loader.release_program(old);
                    }
                }
            }
            kw::BLEND => {
                let blend = if self.current().is_some_and(|t| {
                    t.kind == TokenKind::Id && kw::blend_mode(resdef_syntax::hash32_str(&t.value)).is_some()
                }) {
                    self.read_hashed("blend mode", kw::blend_mode)?
                } else {
                    let sfactor = self.read_hashed("blend factor", kw::blend_factor)?;
                    let dfactor = self.read_hashed("blend factor", kw::blend_factor)?;
                    Blend { sfactor, dfactor }
                };
                self.read_semicolon()?;
                pass.blend = blend;
            }
            kw::DEPTHWRITE => {
                let write = self.read_bool()?;
                self.read_semicolon()?;
                pass.depth.write = write;
            }
            kw::DEPTHFUNC => {
                let func = self.read_hashed("comparison function", kw::compare_func)?;
                self.read_semicolon()?;
                pass.depth.func = func;
            }
            kw::STENCILMASK => {
                let mask = self.read_u32_bits()?;
                self.read_semicolon()?;
                pass.stencil.mask = mask;
            }
            kw::STENCILFUNC => {
                let func = self.read_hashed("comparison function", kw::compare_func)?;
                let ref_value = self.read_u32_bits()? as i32;
                let ref_mask = self.read_u32_bits()?;
                self.read_semicolon()?;
                pass.stencil.func = func;
                pass.stencil.ref_value = ref_value;
                pass.stencil.ref_mask = ref_mask;
            }
            kw::STENCILOP => {
                let fail = self.read_hashed("stencil operation", kw::stencil_op)?;
                let depth_fail = self.read_hashed("stencil operation", kw::stencil_op)?;
                let depth_pass = self.read_hashed("stencil operation", kw::stencil_op)?;
                self.read_semicolon()?;
                pass.stencil.fail = fail;
                pass.stencil.depth_fail = depth_fail;
                pass.stencil.depth_pass = depth_pass;
            }
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedToken,
                    format!("unknown pass directive `{}`", directive.value),
                    pos,
                ));
            }
        }
        Ok(())
    }

    /// Texture block for unit `unit`; the opening brace is already consumed.
    fn read_map(&mut self, pass: &mut Pass, unit: usize, loader: &mut dyn ResourceLoader) -> Result<(), ParseError> {
        while !self.eof() {
            if self.read_token(TokenKind::CurlClose).is_ok() {
                return Ok(());
            }
            self.statement(|p| p.read_map_statement(pass, unit, loader))?;
        }
        Err(ParseError::end_of_tokens())
    }

    fn read_map_statement(
        &mut self,
        pass: &mut Pass,
        unit: usize,
        loader: &mut dyn ResourceLoader,
    ) -> Result<(), ParseError> {
        let pos = self.position();
        let directive = self.read_token(TokenKind::Id)?;

        match resdef_syntax::hash32_str(&directive.value) {
            kw::MAP => {
                let path = self.read_string()?;
                self.read_semicolon()?;
                if let Some(texture) = loader.load_texture(path, self.texture_mipmaps) {
                    if let Some(old) = pass.textures[unit].texture.replace(texture) {
                        log::warn!("{}: replacing the texture of unit {unit} with '{path}'", self.context);
                        loader.release_texture(old);
                    }
                }
            }
            kw::FILTER => {
                let min = self.read_hashed("texture filter", kw::texture_filter)?;
                let mag_pos = self.position();
                let mag = self.read_hashed("texture filter", kw::texture_filter)?;
                if !mag.is_mag_filter() {
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedToken,
                        "magnification filter must be 'nearest' or 'linear'",
                        mag_pos,
                    ));
                }
                self.read_semicolon()?;
                pass.textures[unit].min_filter = min;
                pass.textures[unit].mag_filter = mag;
            }
            kw::WRAP => {
                let x = self.read_hashed("wrap mode", kw::texture_wrap)?;
                let y = if self.is_at(TokenKind::Semicolon) {
                    x
                } else {
                    self.read_hashed("wrap mode", kw::texture_wrap)?
                };
                self.read_semicolon()?;
                pass.textures[unit].x_wrap = x;
                pass.textures[unit].y_wrap = y;
            }
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedToken,
                    format!("unknown texture directive `{}`", directive.value),
                    pos,
                ));
            }
        }
        Ok(())
    }
}
