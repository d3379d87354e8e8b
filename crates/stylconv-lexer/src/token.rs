/// A position in source text, tracking line and column for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// Token classification for Stylus source.
///
/// Data-carrying variants embed their value directly (no separate `value` field on Token).
/// Keywords (`if`, `for`, `and`, `in` ...) stay identifiers: Stylus keywords are
/// contextual and the parser decides what they mean.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Structure
    Indent,
    Dedent,
    Newline,

    // Words and literals (carry data)
    Ident(String),
    Number { value: f64, unit: String },
    String { value: String, quote: char },
    Hash(String),   // #fff, #main
    AtWord(String), // @import, @media, @width
    Url(String),    // url(...) kept verbatim

    // Punctuation
    Colon,
    Semicolon,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Dot,
    DotDot,
    DotDotDot,

    // Operators
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    Assign,         // =
    ConditionalAssign, // ?=
    EqEq,
    NotEq,
    Lt,
    Gt,
    Lte,
    Gte,
    Bang,
    AndAnd,
    OrOr,
    Amp,

    /// Any other character, only meaningful inside selectors (`~`, `*`, `|` ...).
    Symbol(char),

    // End of input
    Eof,
}

impl TokenKind {
    /// Whether this token ends a logical line.
    pub fn is_line_end(&self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::Eof
        )
    }
}

/// A token produced by the Stylus lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whether `next` starts exactly where this token ends (no whitespace between).
    pub fn touches(&self, next: &Token) -> bool {
        self.span.end == next.span.start
    }
}
