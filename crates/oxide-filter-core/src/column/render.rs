//! Standard renderers and the default operation set per field type.

use super::{Column, RenderError, Rendered, Renderer};
use crate::context::Context;
use crate::operation::Operation;
use crate::schema::FieldDescriptor;
use crate::value::{SqlValue, ValueType};

/// `column <op> ?` for a binary comparison operator.
#[derive(Debug, Clone)]
pub struct Compare {
    column: String,
    op: &'static str,
}

impl Compare {
    /// Creates a comparison renderer.
    #[must_use]
    pub fn new(column: impl Into<String>, op: &'static str) -> Self {
        Self {
            column: column.into(),
            op,
        }
    }
}

impl Renderer for Compare {
    fn render(&self, ctx: &Context, _value: &SqlValue) -> Result<Rendered, RenderError> {
        Ok(Rendered::bound(format!(
            "{} {} {}",
            self.column,
            self.op,
            ctx.placeholder()
        )))
    }
}

/// Equality that turns a NULL operand into `IS [NOT] NULL`.
#[derive(Debug, Clone)]
pub struct Equality {
    column: String,
    negated: bool,
}

impl Equality {
    /// Creates an equality renderer.
    #[must_use]
    pub fn new(column: impl Into<String>, negated: bool) -> Self {
        Self {
            column: column.into(),
            negated,
        }
    }
}

impl Renderer for Equality {
    fn render(&self, ctx: &Context, value: &SqlValue) -> Result<Rendered, RenderError> {
        let column = &self.column;
        Ok(match (value.is_null(), self.negated) {
            (true, false) => Rendered::literal(format!("{column} IS NULL")),
            (true, true) => Rendered::literal(format!("{column} IS NOT NULL")),
            (false, false) => Rendered::bound(format!("{column} = {}", ctx.placeholder())),
            (false, true) => Rendered::bound(format!("{column} != {}", ctx.placeholder())),
        })
    }
}

/// `column [NOT] IN (?, ...)`, one placeholder per list element.
#[derive(Debug, Clone)]
pub struct InList {
    column: String,
    negated: bool,
}

impl InList {
    /// Creates a list membership renderer.
    #[must_use]
    pub fn new(column: impl Into<String>, negated: bool) -> Self {
        Self {
            column: column.into(),
            negated,
        }
    }
}

impl Renderer for InList {
    fn render(&self, ctx: &Context, value: &SqlValue) -> Result<Rendered, RenderError> {
        let SqlValue::List(items) = value else {
            return Err(RenderError(format!(
                "expected a list, found {}",
                value.type_name()
            )));
        };
        // `IN ()` is not valid SQL.
        if items.is_empty() {
            return Ok(Rendered::literal(if self.negated { "1 = 1" } else { "1 = 0" }));
        }
        let keyword = if self.negated { "NOT IN" } else { "IN" };
        Ok(Rendered::bound(format!(
            "{} {keyword} ({})",
            self.column,
            ctx.placeholders(items.len())
        )))
    }
}

/// Which end of the text a pattern anchors to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// `value%`
    Prefix,
    /// `%value`
    Suffix,
    /// `%value%`
    Substring,
}

/// `column [NOT] LIKE (...)` with the wildcards concatenated in SQL, so the
/// bound parameter is the caller's value unchanged.
#[derive(Debug, Clone)]
pub struct Like {
    column: String,
    pattern: Pattern,
    negated: bool,
}

impl Like {
    /// Creates a pattern renderer.
    #[must_use]
    pub fn new(column: impl Into<String>, pattern: Pattern, negated: bool) -> Self {
        Self {
            column: column.into(),
            pattern,
            negated,
        }
    }
}

impl Renderer for Like {
    fn render(&self, ctx: &Context, _value: &SqlValue) -> Result<Rendered, RenderError> {
        let keyword = if self.negated { "NOT LIKE" } else { "LIKE" };
        let marker = ctx.placeholder();
        let pattern = match self.pattern {
            Pattern::Prefix => format!("{marker} || '%'"),
            Pattern::Suffix => format!("'%' || {marker}"),
            Pattern::Substring => format!("'%' || {marker} || '%'"),
        };
        Ok(Rendered::bound(format!(
            "{} {keyword} ({pattern})",
            self.column
        )))
    }
}

impl Column {
    /// Creates a column with the default operations for the field's type.
    ///
    /// Every type gets equality and list membership; ordered types add the
    /// range comparisons; text adds the pattern operations.
    #[must_use]
    pub fn standard(field: &'static FieldDescriptor) -> Self {
        let name = field.column;
        let mut column = Self::new(field)
            .with(Operation::Equal, Equality::new(name, false))
            .with(Operation::NotEqual, Equality::new(name, true))
            .with(Operation::InList, InList::new(name, false))
            .with(Operation::NotInList, InList::new(name, true));

        if field.value_type.is_ordered() {
            column = column
                .with(Operation::GreaterThan, Compare::new(name, ">"))
                .with(Operation::GreaterOrEqual, Compare::new(name, ">="))
                .with(Operation::LessThan, Compare::new(name, "<"))
                .with(Operation::LessOrEqual, Compare::new(name, "<="));
        }

        if field.value_type == ValueType::Text {
            column = column
                .with(Operation::BeginsWith, Like::new(name, Pattern::Prefix, false))
                .with(Operation::NotBeginsWith, Like::new(name, Pattern::Prefix, true))
                .with(Operation::EndsWith, Like::new(name, Pattern::Suffix, false))
                .with(Operation::NotEndsWith, Like::new(name, Pattern::Suffix, true))
                .with(Operation::Contains, Like::new(name, Pattern::Substring, false))
                .with(Operation::NotContains, Like::new(name, Pattern::Substring, true));
        }

        column
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Placeholder;

    static NAME: FieldDescriptor =
        FieldDescriptor::new("name", "name", "name", "User.name", 0, ValueType::Text);
    static ACTIVE: FieldDescriptor =
        FieldDescriptor::new("active", "active", "is_active", "User.active", 0, ValueType::Bool);

    fn render(column: &Column, op: Operation, value: SqlValue) -> Rendered {
        column
            .resolve(op)
            .unwrap()
            .render(&Context::new(), &value)
            .unwrap()
    }

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(String::from(s))
    }

    #[test]
    fn test_standard_text_operations() {
        let column = Column::standard(&NAME);
        assert_eq!(column.operations().count(), Operation::ALL.len());
        assert_eq!(render(&column, Operation::Equal, text("x")).sql, "name = ?");
        assert_eq!(render(&column, Operation::NotEqual, text("x")).sql, "name != ?");
        assert_eq!(render(&column, Operation::LessOrEqual, text("x")).sql, "name <= ?");
        assert_eq!(
            render(&column, Operation::BeginsWith, text("x")).sql,
            "name LIKE (? || '%')"
        );
        assert_eq!(
            render(&column, Operation::NotEndsWith, text("x")).sql,
            "name NOT LIKE ('%' || ?)"
        );
        assert_eq!(
            render(&column, Operation::Contains, text("x")).sql,
            "name LIKE ('%' || ? || '%')"
        );
    }

    #[test]
    fn test_standard_bool_operations() {
        let column = Column::standard(&ACTIVE);
        let ops: Vec<Operation> = column.operations().collect();
        assert_eq!(
            ops,
            vec![
                Operation::Equal,
                Operation::NotEqual,
                Operation::InList,
                Operation::NotInList
            ]
        );
        assert_eq!(
            render(&column, Operation::Equal, SqlValue::Bool(true)).sql,
            "is_active = ?"
        );
    }

    #[test]
    fn test_null_equality_does_not_bind() {
        let column = Column::standard(&NAME);
        assert_eq!(
            render(&column, Operation::Equal, SqlValue::Null),
            Rendered::literal("name IS NULL")
        );
        assert_eq!(
            render(&column, Operation::NotEqual, SqlValue::Null),
            Rendered::literal("name IS NOT NULL")
        );
    }

    #[test]
    fn test_in_list() {
        let column = Column::standard(&NAME);
        let rendered = render(
            &column,
            Operation::InList,
            SqlValue::List(vec![text("a"), text("b"), text("c")]),
        );
        assert_eq!(rendered, Rendered::bound("name IN (?, ?, ?)"));
        let rendered = render(&column, Operation::NotInList, SqlValue::List(vec![text("a")]));
        assert_eq!(rendered.sql, "name NOT IN (?)");
    }

    #[test]
    fn test_empty_in_list() {
        let column = Column::standard(&NAME);
        assert_eq!(
            render(&column, Operation::InList, SqlValue::List(vec![])),
            Rendered::literal("1 = 0")
        );
        assert_eq!(
            render(&column, Operation::NotInList, SqlValue::List(vec![])),
            Rendered::literal("1 = 1")
        );
    }

    #[test]
    fn test_dollar_placeholders() {
        let mut ctx = Context::new().with_placeholder(Placeholder::Dollar);
        ctx.set_bound(1);
        let column = Column::standard(&NAME);
        let rendered = column
            .resolve(Operation::InList)
            .unwrap()
            .render(&ctx, &SqlValue::List(vec![text("a"), text("b")]))
            .unwrap();
        assert_eq!(rendered.sql, "name IN ($2, $3)");
    }
}
