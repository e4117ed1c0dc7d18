//! Syntax tree of a textual filter.

use crate::lexer::Span;
use crate::operation::Operation;

/// Connective between two terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    /// `$$`
    And,
    /// `||`
    Or,
}

/// One `tag:op:value` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub tag: &'a str,
    pub operation: Operation,
    /// The value text, not yet read as the field's type.
    pub raw: &'a str,
    pub span: Span,
}

/// A condition or a parenthesized group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term<'a> {
    Condition(Segment<'a>),
    Group(Box<Expr<'a>>),
}

/// Terms joined left to right, exactly as written.
///
/// No precedence is applied between `$$` and `||`; the connectives are
/// emitted in order and the database applies its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr<'a> {
    pub first: Term<'a>,
    pub rest: Vec<(Connective, Term<'a>)>,
}

impl<'a> Expr<'a> {
    /// Iterates over every segment, depth first.
    pub fn segments(&self) -> impl Iterator<Item = &Segment<'a>> + '_ {
        let mut out = Vec::new();
        collect(self, &mut out);
        out.into_iter()
    }

    /// Returns the deepest group nesting in this expression.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.terms()
            .map(|term| match term {
                Term::Condition(_) => 0,
                Term::Group(inner) => inner.depth() + 1,
            })
            .max()
            .unwrap_or(0)
    }

    fn terms(&self) -> impl Iterator<Item = &Term<'a>> + '_ {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, term)| term))
    }
}

fn collect<'e, 'a>(expr: &'e Expr<'a>, out: &mut Vec<&'e Segment<'a>>) {
    for term in expr.terms() {
        match term {
            Term::Condition(segment) => out.push(segment),
            Term::Group(inner) => collect(inner, out),
        }
    }
}
