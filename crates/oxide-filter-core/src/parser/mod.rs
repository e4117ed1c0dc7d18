//! Textual filters.
//!
//! A filter such as `age:gte:18$$(name:bw:Al||name:eq:Bob)` is parsed into
//! a small syntax tree and then replayed onto the builder handles, so the
//! textual form produces exactly what the equivalent fluent calls produce.
//!
//! Segments select fields by tag. Raw values are read as the field's
//! declared type by [`crate::Column::coerce`]; list operations split the
//! value on commas.

mod ast;
#[allow(clippy::module_inception)]
mod parser;

use tracing::debug;

pub use ast::{Connective, Expr, Segment, Term};
pub use parser::Parser;

use crate::builder::{AndOr, Builder, Target};
use crate::context::Context;
use crate::error::Result;
use crate::schema::Model;
use crate::storage::ColumnLookup;
use crate::value::SqlValue;

/// Parses `filter` and appends it at `target`.
///
/// With `grouped`, a filter of more than one term is wrapped in a group.
pub(crate) fn replay<'b, 'a, M, L>(
    mut target: Target<'b, 'a, M, L>,
    filter: &str,
    grouped: bool,
) -> Result<AndOr<'b, 'a, M, L>>
where
    M: Model,
    L: ColumnLookup + ?Sized,
{
    let max_depth = target.state().ctx.max_depth();
    let parsed = Parser::new(filter).with_max_depth(max_depth).parse();
    let expr = target.state().track(parsed)?;
    debug!(filter, conditions = expr.segments().count(), "parsed filter");
    if grouped && !expr.rest.is_empty() {
        target.group(|t| emit(t, &expr))
    } else {
        emit(target, &expr)
    }
}

fn emit<'b, 'a, M, L>(target: Target<'b, 'a, M, L>, expr: &Expr<'_>) -> Result<AndOr<'b, 'a, M, L>>
where
    M: Model,
    L: ColumnLookup + ?Sized,
{
    let mut and_or = emit_term(target, &expr.first)?;
    for (connective, term) in &expr.rest {
        let next = match connective {
            Connective::And => and_or.and(),
            Connective::Or => and_or.or(),
        };
        and_or = emit_term(next, term)?;
    }
    Ok(and_or)
}

fn emit_term<'b, 'a, M, L>(target: Target<'b, 'a, M, L>, term: &Term<'_>) -> Result<AndOr<'b, 'a, M, L>>
where
    M: Model,
    L: ColumnLookup + ?Sized,
{
    match term {
        Term::Group(inner) => target.group(|t| emit(t, inner)),
        Term::Condition(segment) => target
            .tag(segment.tag)?
            .push_raw(segment.operation, segment.raw),
    }
}

/// Builds the condition for `filter` against the fields of `M`.
///
/// # Errors
///
/// Returns the first parse, lookup, coercion or render error.
pub fn parse_filter<M, L>(columns: &L, filter: &str) -> Result<(String, Vec<SqlValue>)>
where
    M: Model,
    L: ColumnLookup + ?Sized,
{
    parse_filter_with::<M, L>(Context::new(), columns, filter)
}

/// Like [`parse_filter`] with an explicit context.
///
/// # Errors
///
/// Returns the first parse, lookup, coercion or render error.
pub fn parse_filter_with<M, L>(
    ctx: Context,
    columns: &L,
    filter: &str,
) -> Result<(String, Vec<SqlValue>)>
where
    M: Model,
    L: ColumnLookup + ?Sized,
{
    let mut builder = Builder::<M, L>::detached(columns).with_context(ctx);
    replay(builder.begin()?, filter, false)?;
    builder.into_sql()
}
