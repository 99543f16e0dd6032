//! Lexer, token stream, and hashing for **resource definition** (`.def`) files.
//!
//! This crate is intentionally dependency-free so it can be consumed by
//! tooling (linters, editors, hash-constant helpers) without pulling in any
//! engine code.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`error`] | `LexError`, `ParseError` |
//! | [`hash`] | `hash32`, `hash64` (MurmurHash3, `const fn`) |
//! | [`lexer`] | `Lexer`, `Token`, `TokenKind`, `Position` |
//! | [`parser`] | `TokenStream` typed reads, lookahead, mark/reset, skips |
//!
//! # Quick start
//!
//! ```rust
//! use resdef_syntax::{Lexer, TokenKind, TokenStream};
//!
//! let tokens = Lexer::compact().tokenize(r#"mat "ui/panel" { pass { blend alpha; } }"#).unwrap();
//! let mut stream = TokenStream::new(&tokens);
//!
//! stream.read_keyword("mat").unwrap();
//! assert_eq!(stream.read_string().unwrap(), "ui/panel");
//! stream.read_token(TokenKind::CurlOpen).unwrap();
//! ```

pub mod error;
pub mod hash;
pub mod lexer;
pub mod parser;

pub use error::{LexError, LexErrorKind, ParseError, ParseErrorKind};
pub use hash::{hash32, hash32_str, hash64, hash64_str, DEFAULT_SEED};
pub use lexer::{LexRun, LexStop, Lexer, Position, Token, TokenKind};
pub use parser::{Mark, Quat, TokenStream};

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        Lexer::compact().tokenize(src).unwrap()
    }

    #[test]
    fn reads_a_directive_list() {
        let toks = tokens("depthwrite true; stencilmask 0xff; // done\n");
        let mut s = TokenStream::new(&toks);
        assert_eq!(s.read_token_hash32(TokenKind::Id).unwrap(), hash32_str("depthwrite"));
        assert!(s.read_bool().unwrap());
        s.read_token(TokenKind::Semicolon).unwrap();
        s.read_keyword("stencilmask").unwrap();
        assert_eq!(s.read_integer().unwrap(), 255);
        s.read_token(TokenKind::Semicolon).unwrap();
        assert!(s.eof());
    }

    #[test]
    fn resync_after_bad_statement() {
        let toks = tokens("depthfunc 12 13; blend one zero;");
        let mut s = TokenStream::new(&toks);
        s.read_keyword("depthfunc").unwrap();
        assert!(s.read_token(TokenKind::Id).is_err());
        assert!(s.skip_through_token(TokenKind::Semicolon));
        s.read_keyword("blend").unwrap();
    }

    #[test]
    fn lex_error_display() {
        let err = Lexer::new().tokenize("\n  'open").unwrap_err();
        assert_eq!(err.to_string(), "lex error at 2:3: unterminated string");
    }

    #[test]
    fn parse_error_display() {
        let toks = tokens("x");
        let mut s = TokenStream::new(&toks);
        let err = s.read_token(TokenKind::Semicolon).unwrap_err();
        assert_eq!(err.to_string(), "parse error at 1:1: expected ;, found identifier");
    }
}
