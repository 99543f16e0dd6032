use std::fmt;
use std::ops::Range;

use crate::error::{LexError, LexErrorKind};

// ── Position ──────────────────────────────────────────────────────────────

/// 1-based line/column of a character in the source.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line:   u32,
    pub column: u32,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };

    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ── Token ─────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    TrueKw,
    FalseKw,
    NullKw,
    // Punctuation
    Dot,
    DoubleDot,
    TripleDot,
    Bang,
    NotEqual,
    Question,
    Pound,
    At,
    Dollar,
    Percent,
    ParenOpen,
    ParenClose,
    BracketOpen,
    BracketClose,
    CurlOpen,
    CurlClose,
    Caret,
    Tilde,
    Grave,
    Backslash,
    Slash,
    Comma,
    Semicolon,
    GreaterThan,
    ShiftRight,
    GreaterEqual,
    LessThan,
    ShiftLeft,
    LesserEqual,
    Equals,
    Equality,
    Pipe,
    Or,
    Ampersand,
    And,
    Colon,
    DoubleColon,
    Minus,
    DoubleMinus,
    Arrow,
    Plus,
    DoublePlus,
    Asterisk,
    DoubleAsterisk,
    Newline,
    // Words and literals
    Id,
    IntegerLit,
    FloatLit,
    FloatExpLit,
    HexLit,
    BinLit,
    SingleStringLit,
    DoubleStringLit,
    // Comments
    LineComment,
    BlockComment,
}

impl TokenKind {
    /// The exact source text of kinds that only have one spelling.
    pub fn spelling(self) -> Option<&'static str> {
        use TokenKind::*;
        Some(match self {
            TrueKw         => "true",
            FalseKw        => "false",
            NullKw         => "null",
            Dot            => ".",
            DoubleDot      => "..",
            TripleDot      => "...",
            Bang           => "!",
            NotEqual       => "!=",
            Question       => "?",
            Pound          => "#",
            At             => "@",
            Dollar         => "$",
            Percent        => "%",
            ParenOpen      => "(",
            ParenClose     => ")",
            BracketOpen    => "[",
            BracketClose   => "]",
            CurlOpen       => "{",
            CurlClose      => "}",
            Caret          => "^",
            Tilde          => "~",
            Grave          => "`",
            Backslash      => "\\",
            Slash          => "/",
            Comma          => ",",
            Semicolon      => ";",
            GreaterThan    => ">",
            ShiftRight     => ">>",
            GreaterEqual   => ">=",
            LessThan       => "<",
            ShiftLeft      => "<<",
            LesserEqual    => "<=",
            Equals         => "=",
            Equality       => "==",
            Pipe           => "|",
            Or             => "||",
            Ampersand      => "&",
            And            => "&&",
            Colon          => ":",
            DoubleColon    => "::",
            Minus          => "-",
            DoubleMinus    => "--",
            Arrow          => "->",
            Plus           => "+",
            DoublePlus     => "++",
            Asterisk       => "*",
            DoubleAsterisk => "**",
            Newline        => "\n",
            _ => return None,
        })
    }

    /// Human-readable name used in diagnostics.
    pub fn descriptor(self) -> &'static str {
        use TokenKind::*;
        match self {
            Newline         => "newline",
            Id              => "identifier",
            IntegerLit      => "integer",
            FloatLit        => "float",
            FloatExpLit     => "float (exponent)",
            HexLit          => "hex integer",
            BinLit          => "binary integer",
            SingleStringLit => "'...' string",
            DoubleStringLit => "\"...\" string",
            LineComment     => "// comment",
            BlockComment    => "/* comment */",
            other => other.spelling().unwrap_or("invalid"),
        }
    }

    pub fn is_int(self) -> bool {
        matches!(self, TokenKind::IntegerLit | TokenKind::HexLit | TokenKind::BinLit)
    }

    pub fn is_float(self) -> bool {
        matches!(self, TokenKind::FloatLit | TokenKind::FloatExpLit)
    }

    pub fn is_number(self) -> bool {
        self.is_int() || self.is_float()
    }

    pub fn is_string(self) -> bool {
        matches!(self, TokenKind::SingleStringLit | TokenKind::DoubleStringLit)
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }

    /// Comments and newlines; what whitespace-skipping reads step over.
    pub fn is_whitespace(self) -> bool {
        self.is_comment() || self == TokenKind::Newline
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor())
    }
}

/// One lexical unit.
///
/// `value` is the decoded content for string literals (quotes stripped,
/// escapes applied) and the verbatim source text for everything else.
/// `span` is the byte range of the token in the source it was lexed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind:  TokenKind,
    pub pos:   Position,
    pub value: String,
    pub span:  Range<usize>,
}

// ── Cursor ────────────────────────────────────────────────────────────────

struct Cursor<'s> {
    src:    &'s str,
    pos:    usize,
    line:   u32,
    column: u32,
}

impl<'s> Cursor<'s> {
    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn bump_if(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\r')) {
            self.bump();
        }
    }
}

fn is_word_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic() || ch as u32 >= 160
}

fn is_word_continue(ch: char) -> bool {
    is_word_start(ch) || ch.is_ascii_digit()
}

// ── Lexer ─────────────────────────────────────────────────────────────────

/// How a successful run ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LexStop {
    /// The input was exhausted.
    Finished,
    /// The run emitted as many tokens as it was allowed to.
    CountReached,
    /// A token of the requested `until` kind was scanned.
    TokenFound,
}

/// Result of a bounded run: why it stopped and the byte offset it stopped at.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LexRun {
    pub stop:   LexStop,
    pub offset: usize,
}

/// Snapshot of the lexer's counters and output length.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LexMark {
    pub pos:    Position,
    pub tokens: usize,
}

/// Accumulating tokenizer.
///
/// Tokens from successive runs are appended to one list. Line and column
/// counters carry over between runs so a document can be fed line by line;
/// [`Lexer::reset`] starts over at `1:1`.
#[derive(Debug, Default)]
pub struct Lexer {
    /// Do not emit `//` and `/* */` tokens.
    pub skip_comments: bool,
    /// Do not emit newline tokens.
    pub skip_newlines: bool,
    pos:    Position,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lexer that emits neither comments nor newlines.
    pub fn compact() -> Self {
        Self { skip_comments: true, skip_newlines: true, ..Self::default() }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn take_tokens(&mut self) -> Vec<Token> {
        std::mem::take(&mut self.tokens)
    }

    /// Position the next run starts counting from.
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Drops accumulated tokens, keeping the position counters.
    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    /// Drops accumulated tokens and rewinds the counters to `1:1`.
    pub fn reset(&mut self) {
        self.tokens.clear();
        self.pos = Position::START;
    }

    pub fn mark(&self) -> LexMark {
        LexMark { pos: self.pos, tokens: self.tokens.len() }
    }

    /// Forgets everything emitted after `mark` was taken.
    pub fn rollback(&mut self, mark: LexMark) {
        self.tokens.truncate(mark.tokens);
        self.pos = mark.pos;
    }

    /// Lexes all of `source`.
    pub fn run(&mut self, source: &str) -> Result<LexStop, LexError> {
        self.run_bounded(source, 0, None, None).map(|run| run.stop)
    }

    /// Consumes the lexer, returning every token of `source`.
    pub fn tokenize(mut self, source: &str) -> Result<Vec<Token>, LexError> {
        self.run(source)?;
        Ok(self.tokens)
    }

    /// Lexes `source` from byte offset `from`, stopping early after a token of
    /// kind `until` or once `count` tokens have been emitted by this run.
    ///
    /// `until` is honoured even for kinds the skip flags suppress. On error the
    /// tokens emitted before the failure stay in the list.
    pub fn run_bounded(
        &mut self,
        source: &str,
        from: usize,
        until: Option<TokenKind>,
        count: Option<usize>,
    ) -> Result<LexRun, LexError> {
        let mut cur = Cursor { src: source, pos: from, line: self.pos.line, column: self.pos.column };
        let mut emitted = 0usize;

        let result = loop {
            if count.is_some_and(|n| emitted >= n) {
                break Ok(LexStop::CountReached);
            }

            cur.skip_blanks();
            if cur.peek().is_none() {
                break Ok(LexStop::Finished);
            }

            let token = match Self::next_token(&mut cur) {
                Ok(token) => token,
                Err(e) => break Err(e),
            };
            let kind = token.kind;

            if !self.suppressed(kind) {
                self.tokens.push(token);
                emitted += 1;
            }
            if until == Some(kind) {
                break Ok(LexStop::TokenFound);
            }
        };

        self.pos = cur.position();
        result.map(|stop| LexRun { stop, offset: cur.pos })
    }

    fn suppressed(&self, kind: TokenKind) -> bool {
        (self.skip_comments && kind.is_comment()) || (self.skip_newlines && kind == TokenKind::Newline)
    }

    fn next_token(cur: &mut Cursor<'_>) -> Result<Token, LexError> {
        use TokenKind::*;

        let start = cur.pos;
        let pos = cur.position();
        let Some(ch) = cur.peek() else {
            return Err(LexError::new(LexErrorKind::InvalidToken, pos));
        };

        let mut decoded = None;
        let kind = match ch {
            '0'..='9' => lex_number(cur)?,
            '.' if cur.peek_second().is_some_and(|c| c.is_ascii_digit()) => lex_number(cur)?,
            '.' => {
                cur.bump();
                if cur.bump_if('.') {
                    if cur.bump_if('.') { TripleDot } else { DoubleDot }
                } else {
                    Dot
                }
            }
            '"' | '\'' => {
                decoded = Some(lex_string(cur, ch)?);
                if ch == '"' { DoubleStringLit } else { SingleStringLit }
            }
            '/' => match cur.peek_second() {
                Some('/') => lex_line_comment(cur),
                Some('*') => lex_block_comment(cur)?,
                _ => punct(cur, Slash, &[]),
            },
            ':'  => punct(cur, Colon, &[(':', DoubleColon)]),
            '='  => punct(cur, Equals, &[('=', Equality)]),
            '>'  => punct(cur, GreaterThan, &[('>', ShiftRight), ('=', GreaterEqual)]),
            '<'  => punct(cur, LessThan, &[('<', ShiftLeft), ('=', LesserEqual)]),
            '&'  => punct(cur, Ampersand, &[('&', And)]),
            '|'  => punct(cur, Pipe, &[('|', Or)]),
            '+'  => punct(cur, Plus, &[('+', DoublePlus)]),
            '*'  => punct(cur, Asterisk, &[('*', DoubleAsterisk)]),
            '!'  => punct(cur, Bang, &[('=', NotEqual)]),
            '-'  => punct(cur, Minus, &[('-', DoubleMinus), ('>', Arrow)]),
            '?'  => punct(cur, Question, &[]),
            '#'  => punct(cur, Pound, &[]),
            '@'  => punct(cur, At, &[]),
            '$'  => punct(cur, Dollar, &[]),
            '%'  => punct(cur, Percent, &[]),
            '('  => punct(cur, ParenOpen, &[]),
            ')'  => punct(cur, ParenClose, &[]),
            '['  => punct(cur, BracketOpen, &[]),
            ']'  => punct(cur, BracketClose, &[]),
            '{'  => punct(cur, CurlOpen, &[]),
            '}'  => punct(cur, CurlClose, &[]),
            '^'  => punct(cur, Caret, &[]),
            '~'  => punct(cur, Tilde, &[]),
            '`'  => punct(cur, Grave, &[]),
            '\\' => punct(cur, Backslash, &[]),
            ','  => punct(cur, Comma, &[]),
            ';'  => punct(cur, Semicolon, &[]),
            '\n' => punct(cur, Newline, &[]),
            c if is_word_start(c) => lex_word(cur),
            _ => return Err(LexError::new(LexErrorKind::InvalidToken, pos)),
        };

        let span = start..cur.pos;
        let value = decoded.unwrap_or_else(|| cur.src[span.clone()].to_string());
        Ok(Token { kind, pos, value, span })
    }
}

/// Consumes one punctuation character, extending it with the first follower
/// in `pairs` that matches the next character.
fn punct(cur: &mut Cursor<'_>, single: TokenKind, pairs: &[(char, TokenKind)]) -> TokenKind {
    cur.bump();
    for &(next, kind) in pairs {
        if cur.bump_if(next) {
            return kind;
        }
    }
    single
}

fn lex_number(cur: &mut Cursor<'_>) -> Result<TokenKind, LexError> {
    if cur.peek() == Some('0') && matches!(cur.peek_second(), Some('x' | 'X' | 'b' | 'B')) {
        cur.bump();
        let hex = matches!(cur.bump(), Some('x' | 'X'));
        let mut digits = 0;
        while cur.peek().is_some_and(|c| if hex { c.is_ascii_hexdigit() } else { c == '0' || c == '1' }) {
            cur.bump();
            digits += 1;
        }
        if digits == 0 {
            return Err(LexError::new(LexErrorKind::MalformedBaseNumber, cur.position()));
        }
        return Ok(if hex { TokenKind::HexLit } else { TokenKind::BinLit });
    }

    let mut seen_dot = false;
    let mut seen_exp = false;
    loop {
        match cur.peek() {
            Some(c) if c.is_ascii_digit() => {
                cur.bump();
            }
            // `1..2` is a range, not `1.` followed by `.2`.
            Some('.') if !seen_dot && !seen_exp && cur.peek_second() != Some('.') => {
                seen_dot = true;
                cur.bump();
            }
            Some('e' | 'E') => {
                if seen_exp {
                    return Err(LexError::new(LexErrorKind::MultipleExponent, cur.position()));
                }
                seen_exp = true;
                cur.bump();
                if matches!(cur.peek(), Some('+' | '-')) {
                    cur.bump();
                }
                if !cur.peek().is_some_and(|c| c.is_ascii_digit()) {
                    return Err(LexError::new(LexErrorKind::NoExponent, cur.position()));
                }
            }
            _ => break,
        }
    }

    Ok(if seen_exp {
        TokenKind::FloatExpLit
    } else if seen_dot {
        TokenKind::FloatLit
    } else {
        TokenKind::IntegerLit
    })
}

fn lex_string(cur: &mut Cursor<'_>, delim: char) -> Result<String, LexError> {
    let start = cur.position();
    let unterminated = || LexError::new(LexErrorKind::UnterminatedString, start);
    cur.bump();

    let mut value = String::new();
    loop {
        let escape_pos = cur.position();
        let ch = cur.bump().ok_or_else(unterminated)?;
        if ch == delim {
            return Ok(value);
        }
        if ch != '\\' {
            value.push(ch);
            continue;
        }

        let esc = cur.bump().ok_or_else(unterminated)?;
        value.push(match esc {
            'r' => '\r',
            'n' => '\n',
            't' => '\t',
            '0' => '\0',
            'b' => '\u{08}',
            'a' => '\u{07}',
            'f' => '\u{0c}',
            'v' => '\u{0b}',
            'x' | 'X' => {
                let max_digits = if esc == 'x' { 4 } else { 8 };
                let mut code = 0u32;
                let mut digits = 0;
                while digits < max_digits {
                    let Some(d) = cur.peek().and_then(|c| c.to_digit(16)) else { break };
                    code = (code << 4) | d;
                    cur.bump();
                    digits += 1;
                }
                let malformed = LexError::new(LexErrorKind::MalformedUnicode, escape_pos);
                if digits == 0 {
                    return Err(malformed);
                }
                char::from_u32(code).ok_or(malformed)?
            }
            other => other,
        });
    }
}

fn lex_word(cur: &mut Cursor<'_>) -> TokenKind {
    let start = cur.pos;
    while cur.peek().is_some_and(is_word_continue) {
        cur.bump();
    }
    match &cur.src.as_bytes()[start..cur.pos] {
        b"true"  => TokenKind::TrueKw,
        b"false" => TokenKind::FalseKw,
        b"null"  => TokenKind::NullKw,
        _        => TokenKind::Id,
    }
}

fn lex_line_comment(cur: &mut Cursor<'_>) -> TokenKind {
    while !matches!(cur.peek(), None | Some('\n')) {
        cur.bump();
    }
    TokenKind::LineComment
}

fn lex_block_comment(cur: &mut Cursor<'_>) -> Result<TokenKind, LexError> {
    let start = cur.position();
    cur.bump(); // `/`
    cur.bump(); // `*`
    loop {
        match cur.bump() {
            None => return Err(LexError::new(LexErrorKind::UnterminatedComment, start)),
            Some('*') if cur.bump_if('/') => return Ok(TokenKind::BlockComment),
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn lex(src: &str) -> Vec<Token> {
        Lexer::new().tokenize(src).unwrap()
    }

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).into_iter().map(|t| t.kind).collect()
    }

    fn lex_err(src: &str) -> LexError {
        Lexer::new().tokenize(src).unwrap_err()
    }

    const FIXED: &[TokenKind] = &[
        TrueKw, FalseKw, NullKw, Dot, DoubleDot, TripleDot, Bang, NotEqual, Question, Pound, At,
        Dollar, Percent, ParenOpen, ParenClose, BracketOpen, BracketClose, CurlOpen, CurlClose,
        Caret, Tilde, Grave, Backslash, Slash, Comma, Semicolon, GreaterThan, ShiftRight,
        GreaterEqual, LessThan, ShiftLeft, LesserEqual, Equals, Equality, Pipe, Or, Ampersand, And,
        Colon, DoubleColon, Minus, DoubleMinus, Arrow, Plus, DoublePlus, Asterisk, DoubleAsterisk,
        Newline,
    ];

    #[test]
    fn fixed_spellings_round_trip() {
        for &kind in FIXED {
            let text = kind.spelling().unwrap();
            let tokens = lex(text);
            assert_eq!(tokens.len(), 1, "{text:?}");
            assert_eq!(tokens[0].kind, kind, "{text:?}");
            assert_eq!(tokens[0].value, text);
        }
    }

    #[test] fn bang_does_not_double() { assert_eq!(kinds("!!"), [Bang, Bang]); }
    #[test] fn minus_variants() { assert_eq!(kinds("- -- -> -"), [Minus, DoubleMinus, Arrow, Minus]); }
    #[test] fn four_dots() { assert_eq!(kinds("...."), [TripleDot, Dot]); }
    #[test] fn shift_then_equals() { assert_eq!(kinds(">>="), [ShiftRight, Equals]); }

    #[test] fn integer() { assert_eq!(kinds("42"), [IntegerLit]); }
    #[test] fn float() { assert_eq!(kinds("4.25"), [FloatLit]); }
    #[test] fn leading_dot_float() { assert_eq!(kinds(".5"), [FloatLit]); }
    #[test] fn exponent() { assert_eq!(kinds("1e5"), [FloatExpLit]); }
    #[test] fn signed_exponent() { assert_eq!(kinds("1.2e-3"), [FloatExpLit]); }
    #[test] fn range_after_integer() { assert_eq!(kinds("1..2"), [IntegerLit, DoubleDot, IntegerLit]); }
    #[test] fn hex() { assert_eq!(lex("0xFF")[0].kind, HexLit); }
    #[test] fn binary() { assert_eq!(lex("0b1010")[0].value, "0b1010"); }

    #[test] fn multiple_exponents() { assert_eq!(lex_err("1e5e3").kind, LexErrorKind::MultipleExponent); }
    #[test] fn missing_exponent() { assert_eq!(lex_err("1e").kind, LexErrorKind::NoExponent); }
    #[test] fn missing_signed_exponent() { assert_eq!(lex_err("1e+;").kind, LexErrorKind::NoExponent); }
    #[test] fn empty_hex() { assert_eq!(lex_err("0x").kind, LexErrorKind::MalformedBaseNumber); }
    #[test] fn invalid_char() { assert_eq!(lex_err("a \u{7} b").pos, Position::new(1, 3)); }

    #[test]
    fn string_escape_decodes() {
        let tok = &lex(r#""a\nb""#)[0];
        assert_eq!(tok.kind, DoubleStringLit);
        assert_eq!(tok.value.chars().collect::<Vec<_>>(), ['a', '\n', 'b']);
        assert_eq!(tok.span, 0..6);
    }
    #[test] fn single_quoted() { assert_eq!(lex("'it''s'")[1].value, "s"); }
    #[test] fn unknown_escape_passes_through() { assert_eq!(lex(r#""\q\"""#)[0].value, "q\""); }
    #[test] fn unicode_escape() { assert_eq!(lex(r#""\x00e9!""#)[0].value, "é!"); }
    #[test] fn long_unicode_escape() { assert_eq!(lex(r#""\X0001F600""#)[0].value, "\u{1F600}"); }
    #[test] fn short_unicode_escape() { assert_eq!(lex(r#""\x41""#)[0].value, "A"); }
    #[test] fn bad_unicode_escape() { assert_eq!(lex_err(r#""\xg""#).kind, LexErrorKind::MalformedUnicode); }
    #[test] fn surrogate_escape() { assert_eq!(lex_err(r#""\xD800""#).kind, LexErrorKind::MalformedUnicode); }

    #[test]
    fn unterminated_string_reports_start() {
        let err = lex_err("x\n  \"abc");
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.pos, Position::new(2, 3));
    }

    #[test]
    fn unterminated_comment_reports_start() {
        let err = lex_err("a /* never");
        assert_eq!(err.kind, LexErrorKind::UnterminatedComment);
        assert_eq!(err.pos, Position::new(1, 3));
    }

    #[test] fn line_comment_stops_at_newline() { assert_eq!(kinds("// hi\nx"), [LineComment, Newline, Id]); }
    #[test] fn block_comment() { assert_eq!(lex("/* a * b */")[0].value, "/* a * b */"); }

    #[test] fn keywords() { assert_eq!(kinds("true false null truex nul"), [TrueKw, FalseKw, NullKw, Id, Id]); }
    #[test] fn word_with_digits() { assert_eq!(lex("tex0_a")[0].value, "tex0_a"); }
    #[test] fn non_ascii_word() { assert_eq!(kinds("façade"), [Id]); }

    #[test]
    fn positions_track_lines() {
        let toks = lex("a\n  b");
        assert_eq!(toks[0].pos, Position::new(1, 1));
        assert_eq!(toks[2].pos, Position::new(2, 3));
    }

    #[test]
    fn skip_flags() {
        let mut lexer = Lexer::compact();
        lexer.run("a // c\n/* d */ b\n").unwrap();
        let kinds: Vec<_> = lexer.tokens().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, [Id, Id]);
    }

    #[test]
    fn until_stops_after_kind() {
        let mut lexer = Lexer::new();
        let run = lexer.run_bounded("a; b;", 0, Some(Semicolon), None).unwrap();
        assert_eq!(run, LexRun { stop: LexStop::TokenFound, offset: 2 });
        let run = lexer.run_bounded("a; b;", run.offset, Some(Semicolon), None).unwrap();
        assert_eq!(run.offset, 5);
        assert_eq!(lexer.tokens().len(), 4);
    }

    #[test]
    fn until_honours_suppressed_kind() {
        let mut lexer = Lexer::compact();
        let run = lexer.run_bounded("a\nb", 0, Some(Newline), None).unwrap();
        assert_eq!(run.stop, LexStop::TokenFound);
        assert_eq!(lexer.tokens().len(), 1);
    }

    #[test]
    fn count_budget() {
        let mut lexer = Lexer::new();
        let run = lexer.run_bounded("a b c", 0, None, Some(2)).unwrap();
        assert_eq!(run.stop, LexStop::CountReached);
        assert_eq!(lexer.tokens().len(), 2);
        assert_eq!(lexer.run_bounded("a b c", run.offset, None, None).unwrap().stop, LexStop::Finished);
        assert_eq!(lexer.tokens()[2].pos, Position::new(1, 5));
    }

    #[test]
    fn counters_persist_until_reset() {
        let mut lexer = Lexer::new();
        lexer.run("a\n").unwrap();
        lexer.run("b").unwrap();
        assert_eq!(lexer.tokens()[2].pos, Position::new(2, 1));
        lexer.reset();
        lexer.run("c").unwrap();
        assert_eq!(lexer.tokens()[0].pos, Position::START);
    }

    #[test]
    fn rollback_to_mark() {
        let mut lexer = Lexer::new();
        lexer.run("a ").unwrap();
        let mark = lexer.mark();
        lexer.run("b c").unwrap();
        lexer.rollback(mark);
        assert_eq!(lexer.tokens().len(), 1);
        assert_eq!(lexer.position(), Position::new(1, 3));
    }

    #[test]
    fn error_keeps_earlier_tokens() {
        let mut lexer = Lexer::new();
        assert!(lexer.run("a b 1e").is_err());
        assert_eq!(lexer.tokens().len(), 2);
    }
}
