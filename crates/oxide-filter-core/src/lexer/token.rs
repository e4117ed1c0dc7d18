//! Token types for the filter lexer.

use super::Span;

/// The kind of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `$$`
    And,
    /// `||`
    Or,
    /// A condition segment; its text is the token's span.
    Segment,
    /// A character sequence that is not a token.
    Error(String),
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns a short description for error messages.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::LeftParen => "`(`",
            Self::RightParen => "`)`",
            Self::And => "`$$`",
            Self::Or => "`||`",
            Self::Segment => "condition",
            Self::Error(_) => "invalid input",
            Self::Eof => "end of input",
        }
    }
}

/// A token with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source text.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}
