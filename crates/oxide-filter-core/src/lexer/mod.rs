//! Lexer for the textual filter language.
//!
//! The language has four punctuation tokens (`(`, `)`, `$$`, `||`) and one
//! word token, the condition segment `tag:op:value`. Whitespace separates
//! tokens and is otherwise ignored.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Token, TokenKind};
pub use tokenizer::Lexer;
