use std::fmt;

use crate::ast::LiteralValue;

/// A location in the query source.
///
/// `offset` counts characters from the start of the input; `line` and
/// `column` are 1-based and advance together with it. The column resets
/// to 1 after every newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Position of the first character of any input.
    pub const START: Position = Position {
        offset: 0,
        line: 1,
        column: 1,
    };

    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Position {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Half-open range `[start, end)` over the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// Zero-width span at `position`.
    pub fn point(position: Position) -> Self {
        Span {
            start: position,
            end: position,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
        }
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    /// `true`, matched case-insensitively
    True,

    /// `false`, matched case-insensitively
    False,

    /// `null`, matched case-insensitively
    Null,

    /// Integer, optionally negative
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -3
    /// -0
    /// ```
    Number,

    /// String enclosed in double or single quotes
    ///
    /// # Examples
    /// ```text
    /// "Tactic."
    /// 'Practiced'
    /// ```
    String,

    /// Regular expression enclosed in slashes
    ///
    /// Only recognized where a value is expected: at the start of input,
    /// after a comparison or membership operator, after `[` and after `,`.
    ///
    /// # Examples
    /// ```text
    /// name = /^the/
    /// text ? [/\d+ damage/, /horror/]
    /// ```
    Regex,

    /// Field name, normalized to lowercase
    ///
    /// Starts with a letter or underscore; may continue with letters,
    /// underscores, digits and `:`.
    Identifier,

    // Comparison
    /// `==`
    StrictEq,
    /// `=`
    LooseEq,
    /// `!=`
    NotEq,
    /// `!==`
    StrictNotEq,

    // Membership
    /// `??`
    StrictContains,
    /// `!??`
    StrictNotContains,
    /// `?`
    LooseContains,
    /// `!?`
    LooseNotContains,

    // Relational
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Gte,
    /// `<=`
    Lte,

    // Logical
    /// `&`
    And,
    /// `|`
    Or,

    // Arithmetic
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Whether a `/` following this token starts a regex literal rather
    /// than a division.
    pub fn opens_value_position(self) -> bool {
        matches!(
            self,
            TokenKind::LooseEq
                | TokenKind::StrictEq
                | TokenKind::NotEq
                | TokenKind::StrictNotEq
                | TokenKind::LooseContains
                | TokenKind::StrictContains
                | TokenKind::LooseNotContains
                | TokenKind::StrictNotContains
                | TokenKind::LBracket
                | TokenKind::Comma
        )
    }

    /// Upper-case name used in token dumps.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Null => "NULL",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Regex => "REGEX",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::StrictEq => "STRICT_EQ",
            TokenKind::LooseEq => "LOOSE_EQ",
            TokenKind::NotEq => "NOT_EQ",
            TokenKind::StrictNotEq => "STRICT_NOT_EQ",
            TokenKind::StrictContains => "STRICT_CONTAINS",
            TokenKind::StrictNotContains => "STRICT_NOT_CONTAINS",
            TokenKind::LooseContains => "LOOSE_CONTAINS",
            TokenKind::LooseNotContains => "LOOSE_NOT_CONTAINS",
            TokenKind::Gt => "GT",
            TokenKind::Lt => "LT",
            TokenKind::Gte => "GTE",
            TokenKind::Lte => "LTE",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Multiply => "MULTIPLY",
            TokenKind::Divide => "DIVIDE",
            TokenKind::Modulo => "MODULO",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Comma => "COMMA",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token produced by the lexer.
///
/// `lexeme` is the raw source slice; `value` carries the decoded literal
/// (unescaped string, parsed number, lowercased identifier, regex source)
/// or [`LiteralValue::Null`] for operators and delimiters.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub value: LiteralValue,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, value: LiteralValue, span: Span) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            value,
            span,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
