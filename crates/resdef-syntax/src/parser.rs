use crate::error::{ParseError, ParseErrorKind};
use crate::hash::{hash32_str, hash64_str};
use crate::lexer::{Position, Token, TokenKind};

/// Saved cursor position, see [`TokenStream::mark`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mark(usize);

/// Rotation literal `{x, y, z[, w]}`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quat {
    pub xyz: [f32; 3],
    pub w:   f32,
}

// ── TokenStream ───────────────────────────────────────────────────────────

/// Typed, backtrackable cursor over a borrowed token list.
///
/// Every `read_*` either consumes the requested construct and returns it, or
/// returns an error describing the current token and leaves the cursor where
/// it was. With whitespace skipping on (the default), comments and newlines
/// following a consumed token are stepped over as part of the read, so the
/// current token is never whitespace.
///
/// The `skip_*` family never fails. Each returns whether tokens remain, which
/// makes them usable for resynchronising after the caller reports an error.
#[derive(Debug, Clone)]
pub struct TokenStream<'t> {
    tokens:          &'t [Token],
    pos:             usize,
    skip_ws_on_read: bool,
}

impl<'t> TokenStream<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        let mut stream = Self { tokens, pos: 0, skip_ws_on_read: true };
        stream.skip_whitespace();
        stream
    }

    pub fn set_skip_whitespace_on_read(&mut self, skip: bool) {
        self.skip_ws_on_read = skip;
    }

    pub fn skips_whitespace_on_read(&self) -> bool {
        self.skip_ws_on_read
    }

    pub fn tokens(&self) -> &'t [Token] {
        self.tokens
    }

    // ── Navigation ────────────────────────────────────────────────────────

    pub fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    pub fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|t| t.kind)
    }

    /// Position of the current token, `None` at end of tokens.
    pub fn position(&self) -> Option<Position> {
        self.current().map(|t| t.pos)
    }

    /// Whether the current token is of `kind`.
    pub fn is_at(&self, kind: TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    pub fn is_at_value(&self, kind: TokenKind, value: &str) -> bool {
        self.current().is_some_and(|t| t.kind == kind && t.value == value)
    }

    /// Kind of the token after the current one.
    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos + 1).map(|t| t.kind)
    }

    /// Whether the token after the current one is of `kind`.
    pub fn next_is(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    pub fn next_is_value(&self, kind: TokenKind, value: &str) -> bool {
        self.tokens.get(self.pos + 1).is_some_and(|t| t.kind == kind && t.value == value)
    }

    pub fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    pub fn reset(&mut self, mark: Mark) {
        assert!(mark.0 <= self.tokens.len(), "mark {} is outside the token list", mark.0);
        self.pos = mark.0;
    }

    /// Runs `read`, rewinding to the starting position if it fails.
    pub fn attempt<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let mark = self.mark();
        let result = read(self);
        if result.is_err() {
            self.reset(mark);
        }
        result
    }

    fn advance_by(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.tokens.len());
        if self.skip_ws_on_read {
            self.skip_whitespace();
        }
    }

    fn expect_current(&self) -> Result<&'t Token, ParseError> {
        self.current().ok_or_else(ParseError::end_of_tokens)
    }

    fn no_match(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(ParseErrorKind::NoMatch, message, self.position())
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    pub fn read_token(&mut self, kind: TokenKind) -> Result<&'t Token, ParseError> {
        let tok = self.expect_current()?;
        if tok.kind != kind {
            return Err(self.no_match(format!("expected {kind}, found {}", tok.kind)));
        }
        self.advance_by(1);
        Ok(tok)
    }

    pub fn read_token_value(&mut self, kind: TokenKind, value: &str) -> Result<&'t Token, ParseError> {
        let tok = self.expect_current()?;
        let kind_matches = tok.kind == kind;
        let value_matches = tok.value == value;
        if kind_matches && value_matches {
            self.advance_by(1);
            return Ok(tok);
        }
        let why = if kind_matches {
            "token kind matches but token value does not"
        } else if value_matches {
            "token value matches but token kind does not"
        } else {
            "neither token kind nor value matches"
        };
        Err(self.no_match(format!("expected {kind} `{value}`, found {} `{}`: {why}", tok.kind, tok.value)))
    }

    /// Identifier with exactly this spelling.
    pub fn read_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        self.read_token_value(TokenKind::Id, keyword).map(|_| ())
    }

    pub fn read_null(&mut self) -> Result<(), ParseError> {
        self.read_token(TokenKind::NullKw).map(|_| ())
    }

    /// Consumes a token of `kind` and returns the 32-bit hash of its value.
    pub fn read_token_hash32(&mut self, kind: TokenKind) -> Result<u32, ParseError> {
        self.read_token(kind).map(|t| hash32_str(&t.value))
    }

    /// Consumes a token of `kind` and returns the 64-bit hash of its value.
    pub fn read_token_hash64(&mut self, kind: TokenKind) -> Result<u64, ParseError> {
        self.read_token(kind).map(|t| hash64_str(&t.value))
    }

    /// Numeric token, optionally preceded by a `-` or `+` token directly
    /// adjacent in the list. Returns the sign, the literal and how many tokens
    /// the whole thing spans.
    fn signed_literal(&self) -> Option<(bool, &'t Token, usize)> {
        let tok = self.current()?;
        match tok.kind {
            TokenKind::Minus | TokenKind::Plus => {
                let next = self.tokens.get(self.pos + 1).filter(|t| t.kind.is_number())?;
                Some((tok.kind == TokenKind::Minus, next, 2))
            }
            kind if kind.is_number() => Some((false, tok, 1)),
            _ => None,
        }
    }

    /// Float, integer, `true` (1) or `false` (0).
    pub fn read_float(&mut self) -> Result<f32, ParseError> {
        let tok = self.expect_current()?;
        let (value, width) = match tok.kind {
            TokenKind::TrueKw => (1.0, 1),
            TokenKind::FalseKw => (0.0, 1),
            _ => match self.signed_literal() {
                Some((negative, lit, width)) => {
                    let value = literal_f64(lit)
                        .ok_or_else(|| self.no_match(format!("`{}` is not a valid number", lit.value)))?;
                    (if negative { -value } else { value }, width)
                }
                None => {
                    return Err(self.no_match(format!(
                        "token is not a float or cannot be implicitly converted to one (found {})",
                        tok.kind
                    )));
                }
            },
        };
        self.advance_by(width);
        Ok(value as f32)
    }

    /// Integer (decimal, hex or binary), float (truncated), `true` (1) or
    /// `false` (0).
    pub fn read_integer(&mut self) -> Result<i64, ParseError> {
        let tok = self.expect_current()?;
        let (value, width) = match tok.kind {
            TokenKind::TrueKw => (1, 1),
            TokenKind::FalseKw => (0, 1),
            _ => match self.signed_literal() {
                Some((negative, lit, width)) => {
                    let value = literal_i64(lit)
                        .ok_or_else(|| self.no_match(format!("`{}` is not a valid integer", lit.value)))?;
                    (if negative { value.wrapping_neg() } else { value }, width)
                }
                None => {
                    return Err(self.no_match(format!(
                        "token is not an integer or cannot be implicitly converted to one (found {})",
                        tok.kind
                    )));
                }
            },
        };
        self.advance_by(width);
        Ok(value)
    }

    /// `true`, `false`, or any number (non-zero is true).
    pub fn read_bool(&mut self) -> Result<bool, ParseError> {
        let tok = self.expect_current()?;
        let value = match tok.kind {
            TokenKind::TrueKw => true,
            TokenKind::FalseKw => false,
            kind if kind.is_number() => literal_f64(tok).is_some_and(|v| v != 0.0),
            other => {
                return Err(self.no_match(format!(
                    "token is not a bool or cannot be implicitly converted to one (found {other})"
                )));
            }
        };
        self.advance_by(1);
        Ok(value)
    }

    /// Quoted string value, or `""` for `null`.
    pub fn read_string(&mut self) -> Result<&'t str, ParseError> {
        let tok = self.expect_current()?;
        let value = match tok.kind {
            TokenKind::NullKw => "",
            kind if kind.is_string() => tok.value.as_str(),
            other => return Err(self.no_match(format!("token is not a string or null (found {other})"))),
        };
        self.advance_by(1);
        Ok(value)
    }

    fn read_components<const N: usize>(&mut self, optional_last: bool) -> Result<[f32; N], ParseError> {
        self.attempt(|s| {
            s.read_token(TokenKind::CurlOpen)?;
            let mut out = [0.0; N];
            for (i, slot) in out.iter_mut().enumerate() {
                if i > 0 {
                    if optional_last && i == N - 1 && s.is_at(TokenKind::CurlClose) {
                        *slot = 1.0;
                        break;
                    }
                    s.read_token(TokenKind::Comma)?;
                }
                *slot = s.read_float()?;
            }
            s.read_token(TokenKind::CurlClose)?;
            Ok(out)
        })
    }

    /// `{x, y}`
    pub fn read_vec2(&mut self) -> Result<[f32; 2], ParseError> {
        self.read_components(false)
    }

    /// `{x, y, z}`
    pub fn read_vec3(&mut self) -> Result<[f32; 3], ParseError> {
        self.read_components(false)
    }

    /// `{x, y, z[, w]}`, `w` defaulting to 1.
    pub fn read_vec4(&mut self) -> Result<[f32; 4], ParseError> {
        self.read_components(true)
    }

    /// `{x, y, z[, w]}`, `w` defaulting to 1.
    pub fn read_quat(&mut self) -> Result<Quat, ParseError> {
        let [x, y, z, w] = self.read_components::<4>(true)?;
        Ok(Quat { xyz: [x, y, z], w })
    }

    // ── Skips ─────────────────────────────────────────────────────────────

    pub fn skip_token(&mut self) -> bool {
        self.skip_tokens(1)
    }

    pub fn skip_tokens(&mut self, count: usize) -> bool {
        self.advance_by(count);
        !self.eof()
    }

    /// Skips to the start of the next line, whether or not newline tokens
    /// were emitted by the lexer.
    pub fn skip_through_newline(&mut self) -> bool {
        let Some(line) = self.position().map(|p| p.line) else {
            return false;
        };
        while let Some(tok) = self.current() {
            if tok.pos.line != line {
                break;
            }
            self.pos += 1;
            if tok.kind == TokenKind::Newline {
                break;
            }
        }
        !self.eof()
    }

    /// Steps over comments and newlines.
    pub fn skip_whitespace(&mut self) -> bool {
        while self.current_kind().is_some_and(TokenKind::is_whitespace) {
            self.pos += 1;
        }
        !self.eof()
    }

    /// Stops on the first token of `kind` without consuming it.
    pub fn skip_until_token(&mut self, kind: TokenKind) -> bool {
        while self.current_kind().is_some_and(|k| k != kind) {
            self.pos += 1;
        }
        !self.eof()
    }

    /// Consumes everything up to and including the first token of `kind`.
    pub fn skip_through_token(&mut self, kind: TokenKind) -> bool {
        if self.skip_until_token(kind) {
            self.advance_by(1);
        }
        !self.eof()
    }
}

fn literal_f64(tok: &Token) -> Option<f64> {
    match tok.kind {
        TokenKind::IntegerLit | TokenKind::HexLit | TokenKind::BinLit => literal_i64(tok).map(|v| v as f64),
        TokenKind::FloatLit | TokenKind::FloatExpLit => tok.value.parse().ok(),
        _ => None,
    }
}

fn literal_i64(tok: &Token) -> Option<i64> {
    let digits = tok.value.get(2..);
    match tok.kind {
        TokenKind::IntegerLit => tok.value.parse().ok(),
        TokenKind::HexLit => i64::from_str_radix(digits?, 16).ok(),
        TokenKind::BinLit => i64::from_str_radix(digits?, 2).ok(),
        TokenKind::FloatLit | TokenKind::FloatExpLit => tok.value.parse::<f64>().ok().map(|v| v as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn lex(src: &str) -> Vec<Token> {
        Lexer::new().tokenize(src).unwrap()
    }

    macro_rules! stream {
        ($toks:ident, $src:expr) => {
            let $toks = lex($src);
            #[allow(unused_mut)]
            let mut $toks = TokenStream::new(&$toks);
        };
    }

    #[test] fn float_from_int() { stream!(s, "3"); assert_eq!(s.read_float().unwrap(), 3.0); }
    #[test] fn float_from_exp() { stream!(s, "2.5e2"); assert_eq!(s.read_float().unwrap(), 250.0); }
    #[test] fn float_from_bool() { stream!(s, "true"); assert_eq!(s.read_float().unwrap(), 1.0); }
    #[test] fn negative_float() { stream!(s, "-0.5"); assert_eq!(s.read_float().unwrap(), -0.5); }
    #[test] fn integer_truncates_float() { stream!(s, "7.9"); assert_eq!(s.read_integer().unwrap(), 7); }
    #[test] fn integer_hex() { stream!(s, "0xFFFFFFFF"); assert_eq!(s.read_integer().unwrap(), 0xFFFF_FFFF); }
    #[test] fn integer_binary() { stream!(s, "0b101"); assert_eq!(s.read_integer().unwrap(), 5); }
    #[test] fn integer_false() { stream!(s, "false"); assert_eq!(s.read_integer().unwrap(), 0); }
    #[test] fn negative_integer() { stream!(s, "- 12"); assert_eq!(s.read_integer().unwrap(), -12); }
    #[test] fn bool_from_number() { stream!(s, "0.0 2"); assert!(!s.read_bool().unwrap()); assert!(s.read_bool().unwrap()); }
    #[test] fn string_value() { stream!(s, "'abc'"); assert_eq!(s.read_string().unwrap(), "abc"); }
    #[test] fn null_string() { stream!(s, "null"); assert_eq!(s.read_string().unwrap(), ""); }
    #[test] fn number_is_not_string() { stream!(s, "12"); assert!(s.read_string().is_err()); }
    #[test] fn string_is_not_float() { stream!(s, "\"1\""); assert!(s.read_float().is_err()); }
    #[test] fn minus_alone_is_not_number() { stream!(s, "- x"); assert!(s.read_float().is_err()); assert!(s.is_at(TokenKind::Minus)); }

    #[test]
    fn keyword_mismatch_messages() {
        stream!(s, "pass");
        let err = s.read_keyword("mat").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NoMatch);
        assert!(err.message.contains("kind matches but token value does not"));
        assert_eq!(err.pos, Some(Position::START));
        assert!(s.read_token_value(TokenKind::DoubleStringLit, "pass").unwrap_err().message.contains("value matches"));
        s.read_keyword("pass").unwrap();
        assert!(s.eof());
    }

    #[test]
    fn end_of_tokens() {
        stream!(s, "// nothing\n");
        let err = s.read_token(TokenKind::Id).unwrap_err();
        assert!(err.is_end_of_tokens());
        assert_eq!(err.pos, None);
    }

    #[test]
    fn hashes_value() {
        stream!(s, "blend blend");
        assert_eq!(s.read_token_hash32(TokenKind::Id).unwrap(), hash32_str("blend"));
        assert_eq!(s.read_token_hash64(TokenKind::Id).unwrap(), hash64_str("blend"));
    }

    #[test]
    fn reads_skip_trailing_whitespace() {
        stream!(s, "\n// c\na /* b */\n\nb");
        assert_eq!(s.read_token(TokenKind::Id).unwrap().value, "a");
        assert_eq!(s.current().unwrap().value, "b");
    }

    #[test]
    fn raw_mode_sees_whitespace() {
        stream!(s, "a\nb");
        s.set_skip_whitespace_on_read(false);
        s.read_token(TokenKind::Id).unwrap();
        assert!(s.is_at(TokenKind::Newline));
    }

    #[test] fn vec2() { stream!(s, "{1, 2}"); assert_eq!(s.read_vec2().unwrap(), [1.0, 2.0]); }
    #[test] fn vec3() { stream!(s, "{1, -2, 3.5}"); assert_eq!(s.read_vec3().unwrap(), [1.0, -2.0, 3.5]); }
    #[test] fn vec4_full() { stream!(s, "{1, 2, 3, 4}"); assert_eq!(s.read_vec4().unwrap(), [1.0, 2.0, 3.0, 4.0]); }
    #[test] fn vec4_default_w() { stream!(s, "{1, 2, 3}"); assert_eq!(s.read_vec4().unwrap(), [1.0, 2.0, 3.0, 1.0]); }
    #[test] fn quat_default_w() {
        stream!(s, "{0, 0, 1}");
        assert_eq!(s.read_quat().unwrap(), Quat { xyz: [0.0, 0.0, 1.0], w: 1.0 });
    }

    #[test]
    fn failed_vectors_rewind() {
        for src in ["{1 2}", "{1, 2, 3", "{1, 2, 3, 4, 5}", "{1, x, 3}", "{}"] {
            let toks = lex(src);
            let mut s = TokenStream::new(&toks);
            let before = s.mark();
            assert!(s.read_vec2().is_err(), "{src}");
            assert_eq!(s.mark(), before, "{src}");
            assert!(s.read_vec3().is_err(), "{src}");
            assert_eq!(s.mark(), before, "{src}");
            assert!(s.read_vec4().is_err(), "{src}");
            assert_eq!(s.mark(), before, "{src}");
            assert!(s.read_quat().is_err(), "{src}");
            assert_eq!(s.mark(), before, "{src}");
        }
    }

    #[test]
    fn mark_and_reset() {
        stream!(s, "a b c");
        let m = s.mark();
        s.skip_tokens(2);
        assert_eq!(s.current().unwrap().value, "c");
        s.reset(m);
        assert_eq!(s.current().unwrap().value, "a");
    }

    #[test]
    fn lookahead() {
        stream!(s, "shader \"x\"");
        assert!(s.is_at_value(TokenKind::Id, "shader"));
        assert!(s.next_is(TokenKind::DoubleStringLit));
        assert!(s.next_is_value(TokenKind::DoubleStringLit, "x"));
        assert_eq!(s.peek_kind(), Some(TokenKind::DoubleStringLit));
    }

    #[test]
    fn skip_until_stops_before() {
        stream!(s, "a b ; c");
        assert!(s.skip_until_token(TokenKind::Semicolon));
        assert!(s.is_at(TokenKind::Semicolon));
    }

    #[test]
    fn skip_through_consumes() {
        stream!(s, "a b ; c");
        assert!(s.skip_through_token(TokenKind::Semicolon));
        assert_eq!(s.current().unwrap().value, "c");
        assert!(!s.skip_through_token(TokenKind::Semicolon));
        assert!(s.eof());
    }

    #[test]
    fn skip_through_newline_without_newline_tokens() {
        let toks = Lexer::compact().tokenize("a b\nc").unwrap();
        let mut s = TokenStream::new(&toks);
        assert!(s.skip_through_newline());
        assert_eq!(s.current().unwrap().value, "c");
    }

    #[test]
    fn skip_through_newline_token() {
        stream!(s, "a b\nc");
        s.set_skip_whitespace_on_read(false);
        assert!(s.skip_through_newline());
        assert_eq!(s.current().unwrap().value, "c");
    }

    #[test]
    fn skips_set_no_error_at_end() {
        stream!(s, "a");
        assert!(!s.skip_token());
        assert!(!s.skip_token());
        assert!(!s.skip_whitespace());
    }
}
