//! Recursive descent parser for textual filters.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::ast::{Connective, Expr, Segment, Term};
use crate::context::DEFAULT_MAX_DEPTH;
use crate::error::{FilterError, Result};
use crate::lexer::{Lexer, Span, Token, TokenKind};
use crate::operation::Operation;

static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*):([a-z]{2,3}):(.+)$").expect("Invalid regex")
});

static HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*:[a-z]{2,3}:").expect("Invalid regex"));

/// Filter parser.
///
/// ```text
/// expr    := term (conn term)*
/// term    := "(" expr ")" | segment
/// conn    := "$$" | "||"
/// segment := tag ":" op ":" value
/// ```
pub struct Parser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,
    current: Token,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            input,
            lexer,
            current,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the deepest allowed group nesting.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses the whole input.
    ///
    /// # Errors
    ///
    /// Returns `Syntax` for structural problems, `TooDeep` when groups nest
    /// past the limit, and `MalformedSegment`, `AmbiguousSegment` or
    /// `UnknownOperation` for a bad segment.
    pub fn parse(mut self) -> Result<Expr<'a>> {
        if self.current.is_eof() {
            return Err(FilterError::syntax("empty filter", self.current.span));
        }
        let expr = self.parse_expr()?;
        if !self.current.is_eof() {
            return Err(self.unexpected("`$$`, `||` or end of input"));
        }
        Ok(expr)
    }

    fn parse_expr(&mut self) -> Result<Expr<'a>> {
        let first = self.parse_term()?;
        let mut rest = Vec::new();
        loop {
            let connective = match self.current.kind {
                TokenKind::And => Connective::And,
                TokenKind::Or => Connective::Or,
                _ => break,
            };
            self.advance();
            rest.push((connective, self.parse_term()?));
        }
        Ok(Expr { first, rest })
    }

    fn parse_term(&mut self) -> Result<Term<'a>> {
        match &self.current.kind {
            TokenKind::LeftParen => self.parse_group(),
            TokenKind::Segment => {
                let span = self.current.span;
                self.advance();
                parse_segment(self.input, span).map(Term::Condition)
            }
            TokenKind::Error(message) => Err(FilterError::syntax(message.clone(), self.current.span)),
            _ => Err(self.unexpected("a condition or `(`")),
        }
    }

    fn parse_group(&mut self) -> Result<Term<'a>> {
        let open = self.current.span;
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FilterError::TooDeep(self.max_depth));
        }
        self.advance();
        let inner = self.parse_expr()?;
        if self.current.kind != TokenKind::RightParen {
            if self.current.is_eof() {
                return Err(FilterError::syntax(
                    "unclosed `(`",
                    open.merge(self.current.span),
                ));
            }
            return Err(self.unexpected("`)`"));
        }
        self.advance();
        self.depth -= 1;
        Ok(Term::Group(Box::new(inner)))
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn unexpected(&self, expected: &str) -> FilterError {
        FilterError::syntax(
            format!("expected {expected}, found {}", self.current.kind.describe()),
            self.current.span,
        )
    }
}

/// Splits a segment token into tag, operation and raw value.
fn parse_segment(input: &str, span: Span) -> Result<Segment<'_>> {
    let text = span.slice(input);
    if HEAD.find_iter(text).count() > 1 {
        return Err(FilterError::AmbiguousSegment(String::from(text)));
    }
    let Some(captures) = SEGMENT.captures(text) else {
        return Err(FilterError::MalformedSegment(String::from(text)));
    };
    let (Some(tag), Some(code), Some(raw)) = (captures.get(1), captures.get(2), captures.get(3))
    else {
        return Err(FilterError::MalformedSegment(String::from(text)));
    };
    let operation = Operation::from_code(code.as_str())
        .ok_or_else(|| FilterError::UnknownOperation(String::from(code.as_str())))?;
    trace!(tag = tag.as_str(), %operation, raw = raw.as_str(), "segment");
    Ok(Segment {
        tag: tag.as_str(),
        operation,
        raw: raw.as_str(),
        span,
    })
}
