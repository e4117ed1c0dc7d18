//! Filter tokenizer implementation.

use tracing::trace;

use super::{Span, Token, TokenKind};

/// Characters that end a segment.
fn is_delimiter(c: char) -> bool {
    matches!(c, '(' | ')' | '$' | '|') || c.is_whitespace()
}

/// A lexer that tokenizes a filter expression.
pub struct Lexer<'a> {
    /// The input text.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Creates a token spanning from the token start to the current position.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos))
    }

    /// Scans `$$` or `||`; a lone `$` or `|` is an error token.
    fn scan_connective(&mut self, c: char, kind: TokenKind) -> Token {
        if self.peek() == Some(c) {
            self.advance();
            self.make_token(kind)
        } else {
            self.make_token(TokenKind::Error(format!("expected `{c}{c}`")))
        }
    }

    /// Scans a segment up to the next delimiter.
    fn scan_segment(&mut self) -> Token {
        while self.peek().is_some_and(|c| !is_delimiter(c)) {
            self.advance();
        }
        self.make_token(TokenKind::Segment)
    }

    /// Returns the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start = self.pos;

        let Some(c) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        let token = match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            '$' => self.scan_connective('$', TokenKind::And),
            '|' => self.scan_connective('|', TokenKind::Or),
            _ => self.scan_segment(),
        };
        trace!(kind = ?token.kind, start = token.span.start, end = token.span.end, "token");
        token
    }

    /// Tokenizes the whole input. The last token is always `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}
