//! Typestate handles for the condition grammar.
//!
//! Each handle mutably borrows the builder state and is consumed by the call
//! that moves to the next position, so sequences such as two operators in a
//! row or a trailing connective do not compile.

use std::marker::PhantomData;

use super::State;
use crate::column::Column;
use crate::error::Result;
use crate::operation::Operation;
use crate::schema::Model;
use crate::storage::ColumnLookup;
use crate::value::{FieldType, Operand, SqlValue, ToSqlValue, Untyped};

/// Position: expects a field or a group.
pub struct Target<'b, 'a, M, L: ?Sized> {
    state: &'b mut State<'a, M, L>,
}

/// Position: expects exactly one comparison for the selected field.
///
/// `T` is the dereferenced Rust type of the field; operator methods only
/// accept values that are [`Operand<T>`].
pub struct QOperation<'b, 'a, M, L: ?Sized, T> {
    state: &'b mut State<'a, M, L>,
    column: &'a Column,
    _base: PhantomData<fn() -> T>,
}

/// Position: expects a connective, or the end of the condition.
pub struct AndOr<'b, 'a, M, L: ?Sized> {
    state: &'b mut State<'a, M, L>,
}

/// Base types that support the pattern operations.
pub trait TextLike {}

impl TextLike for String {}
impl TextLike for Untyped {}

impl<'b, 'a, M: Model, L: ColumnLookup + ?Sized> Target<'b, 'a, M, L> {
    pub(crate) fn new(state: &'b mut State<'a, M, L>) -> Self {
        Self { state }
    }

    /// Selects a field by reference into the builder's model instance.
    ///
    /// # Errors
    ///
    /// Returns `FieldNotFound` if `field` is not a field of the bound
    /// instance, and `ColumnNotConfigured` if the field has no column.
    pub fn field<T: FieldType>(self, field: &T) -> Result<QOperation<'b, 'a, M, L, T::Base>> {
        let descriptor = self.state.field_of(field)?;
        let column = self.state.column_for(descriptor)?;
        Ok(QOperation::new(self.state, column))
    }

    /// Selects a field by its serialization tag.
    ///
    /// The field's type is not known statically, so values are only checked
    /// at runtime.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTag` or `ColumnNotConfigured`.
    pub fn tag(self, tag: &str) -> Result<QOperation<'b, 'a, M, L, Untyped>> {
        let descriptor = self.state.field_by_tag(tag)?;
        let column = self.state.column_for(descriptor)?;
        Ok(QOperation::new(self.state, column))
    }

    /// Appends a parenthesized sub-condition built by `build`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised inside `build`.
    pub fn group<F>(self, build: F) -> Result<AndOr<'b, 'a, M, L>>
    where
        F: for<'c> FnOnce(Target<'c, 'a, M, L>) -> Result<AndOr<'c, 'a, M, L>>,
    {
        self.state.open_group();
        let inner = build(Target::new(&mut *self.state)).map(drop);
        self.state.track(inner)?;
        self.state.close_group();
        Ok(AndOr { state: self.state })
    }

    /// Appends a textual filter expression at this position.
    ///
    /// A filter with more than one term is parenthesized, so its `||` cannot
    /// bind against the surrounding conditions.
    ///
    /// # Errors
    ///
    /// See [`crate::parser`] for the errors a filter may raise.
    pub fn parse(self, filter: &str) -> Result<AndOr<'b, 'a, M, L>> {
        crate::parser::replay(self, filter, true)
    }

    pub(crate) fn state(&mut self) -> &mut State<'a, M, L> {
        self.state
    }
}

impl<'b, 'a, M: Model, L: ColumnLookup + ?Sized, T> QOperation<'b, 'a, M, L, T> {
    fn new(state: &'b mut State<'a, M, L>, column: &'a Column) -> Self {
        Self {
            state,
            column,
            _base: PhantomData,
        }
    }

    pub(crate) fn push(self, operation: Operation, value: SqlValue) -> Result<AndOr<'b, 'a, M, L>> {
        self.state.push_condition(self.column, operation, value)?;
        Ok(AndOr { state: self.state })
    }

    /// Reads `raw` as the field's declared type and applies `operation`.
    pub(crate) fn push_raw(self, operation: Operation, raw: &str) -> Result<AndOr<'b, 'a, M, L>> {
        let value = self.column.coerce(operation, raw);
        let value = self.state.track(value)?;
        self.push(operation, value)
    }

    /// Applies `operation` with a value of the field's type.
    ///
    /// # Errors
    ///
    /// Returns `OperationNotRegistered` if the column lacks the operation,
    /// `TypeMismatch` if the value's runtime type differs from the field's,
    /// or `Render` if the renderer fails.
    pub fn apply<V: Operand<T>>(self, operation: Operation, value: V) -> Result<AndOr<'b, 'a, M, L>> {
        self.push(operation, value.to_sql_value())
    }

    /// `field = value`
    ///
    /// # Errors
    ///
    /// See [`QOperation::apply`].
    pub fn eq<V: Operand<T>>(self, value: V) -> Result<AndOr<'b, 'a, M, L>> {
        self.apply(Operation::Equal, value)
    }

    /// `field != value`
    ///
    /// # Errors
    ///
    /// See [`QOperation::apply`].
    pub fn ne<V: Operand<T>>(self, value: V) -> Result<AndOr<'b, 'a, M, L>> {
        self.apply(Operation::NotEqual, value)
    }

    /// `field > value`
    ///
    /// # Errors
    ///
    /// See [`QOperation::apply`].
    pub fn gt<V: Operand<T>>(self, value: V) -> Result<AndOr<'b, 'a, M, L>> {
        self.apply(Operation::GreaterThan, value)
    }

    /// `field >= value`
    ///
    /// # Errors
    ///
    /// See [`QOperation::apply`].
    pub fn gte<V: Operand<T>>(self, value: V) -> Result<AndOr<'b, 'a, M, L>> {
        self.apply(Operation::GreaterOrEqual, value)
    }

    /// `field < value`
    ///
    /// # Errors
    ///
    /// See [`QOperation::apply`].
    pub fn lt<V: Operand<T>>(self, value: V) -> Result<AndOr<'b, 'a, M, L>> {
        self.apply(Operation::LessThan, value)
    }

    /// `field <= value`
    ///
    /// # Errors
    ///
    /// See [`QOperation::apply`].
    pub fn lte<V: Operand<T>>(self, value: V) -> Result<AndOr<'b, 'a, M, L>> {
        self.apply(Operation::LessOrEqual, value)
    }

    /// `field IN (values...)`
    ///
    /// # Errors
    ///
    /// See [`QOperation::apply`].
    pub fn in_list<I>(self, values: I) -> Result<AndOr<'b, 'a, M, L>>
    where
        I: IntoIterator,
        I::Item: Operand<T>,
    {
        self.push(Operation::InList, list(values))
    }

    /// `field NOT IN (values...)`
    ///
    /// # Errors
    ///
    /// See [`QOperation::apply`].
    pub fn not_in_list<I>(self, values: I) -> Result<AndOr<'b, 'a, M, L>>
    where
        I: IntoIterator,
        I::Item: Operand<T>,
    {
        self.push(Operation::NotInList, list(values))
    }
}

impl<'b, 'a, M: Model, L: ColumnLookup + ?Sized, T: TextLike> QOperation<'b, 'a, M, L, T> {
    /// Field ends with `value`.
    ///
    /// # Errors
    ///
    /// See [`QOperation::apply`].
    pub fn ends_with<V: Operand<T>>(self, value: V) -> Result<AndOr<'b, 'a, M, L>> {
        self.apply(Operation::EndsWith, value)
    }

    /// Field does not end with `value`.
    ///
    /// # Errors
    ///
    /// See [`QOperation::apply`].
    pub fn not_ends_with<V: Operand<T>>(self, value: V) -> Result<AndOr<'b, 'a, M, L>> {
        self.apply(Operation::NotEndsWith, value)
    }

    /// Field begins with `value`.
    ///
    /// # Errors
    ///
    /// See [`QOperation::apply`].
    pub fn begins_with<V: Operand<T>>(self, value: V) -> Result<AndOr<'b, 'a, M, L>> {
        self.apply(Operation::BeginsWith, value)
    }

    /// Field does not begin with `value`.
    ///
    /// # Errors
    ///
    /// See [`QOperation::apply`].
    pub fn not_begins_with<V: Operand<T>>(self, value: V) -> Result<AndOr<'b, 'a, M, L>> {
        self.apply(Operation::NotBeginsWith, value)
    }

    /// Field contains `value`.
    ///
    /// # Errors
    ///
    /// See [`QOperation::apply`].
    pub fn contains<V: Operand<T>>(self, value: V) -> Result<AndOr<'b, 'a, M, L>> {
        self.apply(Operation::Contains, value)
    }

    /// Field does not contain `value`.
    ///
    /// # Errors
    ///
    /// See [`QOperation::apply`].
    pub fn not_contains<V: Operand<T>>(self, value: V) -> Result<AndOr<'b, 'a, M, L>> {
        self.apply(Operation::NotContains, value)
    }
}

fn list<I>(values: I) -> SqlValue
where
    I: IntoIterator,
    I::Item: ToSqlValue,
{
    SqlValue::List(values.into_iter().map(ToSqlValue::to_sql_value).collect())
}

impl<'b, 'a, M: Model, L: ColumnLookup + ?Sized> AndOr<'b, 'a, M, L> {
    /// Appends ` AND ` and moves back to the field position.
    #[must_use]
    pub fn and(self) -> Target<'b, 'a, M, L> {
        self.state.connect(" AND ");
        Target::new(self.state)
    }

    /// Appends ` OR ` and moves back to the field position.
    #[must_use]
    pub fn or(self) -> Target<'b, 'a, M, L> {
        self.state.connect(" OR ");
        Target::new(self.state)
    }

    /// Returns the SQL and parameters accumulated so far.
    ///
    /// Idempotent; does not reset the builder.
    ///
    /// # Errors
    ///
    /// Returns `Aborted` if any step failed, and `Incomplete` when called
    /// inside an unfinished group.
    pub fn to_sql(&self) -> Result<(String, Vec<SqlValue>)> {
        self.state.check_complete()?;
        Ok((self.state.sql.clone(), self.state.values.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::mem::offset_of;

    use crate::builder::Builder;
    use crate::column::Column;
    use crate::error::FilterError;
    use crate::operation::Operation;
    use crate::schema::{FieldDescriptor, Model};
    use crate::storage::Columns;
    use crate::value::{SqlValue, ValueType};

    struct Person {
        age: i64,
        name: String,
        nickname: Option<String>,
    }

    impl Model for Person {
        const NAME: &'static str = "Person";
        const FIELDS: &'static [FieldDescriptor] = &[
            FieldDescriptor::new(
                "age",
                "age",
                "age",
                "Person.age",
                offset_of!(Person, age),
                ValueType::Int,
            ),
            FieldDescriptor::new(
                "name",
                "name",
                "name",
                "Person.name",
                offset_of!(Person, name),
                ValueType::Text,
            ),
            FieldDescriptor::new(
                "nickname",
                "nick",
                "nickname",
                "Person.nickname",
                offset_of!(Person, nickname),
                ValueType::Text,
            ),
        ];
    }

    fn person() -> Person {
        Person {
            age: 0,
            name: String::new(),
            nickname: None,
        }
    }

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(String::from(s))
    }

    #[test]
    fn test_single_condition() {
        let p = person();
        let columns = Columns::standard::<Person>();
        let mut builder = Builder::new(&p, &columns);
        let and_or = builder.begin().unwrap().field(&p.age).unwrap().eq(30).unwrap();
        let (sql, values) = and_or.to_sql().unwrap();
        assert_eq!(sql, "age = ?");
        assert_eq!(values, vec![SqlValue::Int(30)]);
    }

    #[test]
    fn test_and_chain() {
        let p = person();
        let columns = Columns::standard::<Person>();
        let mut builder = Builder::new(&p, &columns);
        builder
            .begin()
            .unwrap()
            .field(&p.age)
            .unwrap()
            .eq(30)
            .unwrap()
            .and()
            .field(&p.name)
            .unwrap()
            .eq("x")
            .unwrap();
        let (sql, values) = builder.to_sql().unwrap();
        assert_eq!(sql, "age = ? AND name = ?");
        assert_eq!(values, vec![SqlValue::Int(30), text("x")]);
    }

    #[test]
    fn test_group() {
        let p = person();
        let columns = Columns::standard::<Person>();
        let mut builder = Builder::new(&p, &columns);
        builder
            .begin()
            .unwrap()
            .field(&p.age)
            .unwrap()
            .gt(18)
            .unwrap()
            .and()
            .group(|t| t.field(&p.name)?.begins_with("A")?.or().field(&p.nickname)?.eq("al"))
            .unwrap();
        let (sql, values) = builder.to_sql().unwrap();
        assert_eq!(sql, "age > ? AND (name LIKE (? || '%') OR nickname = ?)");
        assert_eq!(values, vec![SqlValue::Int(18), text("A"), text("al")]);
    }

    #[test]
    fn test_nested_groups() {
        let p = person();
        let columns = Columns::standard::<Person>();
        let mut builder = Builder::new(&p, &columns);
        builder
            .begin()
            .unwrap()
            .group(|t| {
                t.group(|t| t.field(&p.age)?.lt(5)?.or().field(&p.age)?.gt(60))?
                    .and()
                    .field(&p.name)?
                    .ne("bob")
            })
            .unwrap();
        assert_eq!(builder.sql(), "((age < ? OR age > ?) AND name != ?)");
        assert_eq!(builder.values().len(), 3);
    }

    #[test]
    fn test_option_field_accepts_none() {
        let p = person();
        let columns = Columns::standard::<Person>();
        let mut builder = Builder::new(&p, &columns);
        builder
            .begin()
            .unwrap()
            .field(&p.nickname)
            .unwrap()
            .eq(None::<&str>)
            .unwrap();
        let (sql, values) = builder.to_sql().unwrap();
        assert_eq!(sql, "nickname IS NULL");
        assert!(values.is_empty());
    }

    #[test]
    fn test_in_list_flattens_values() {
        let p = person();
        let columns = Columns::standard::<Person>();
        let mut builder = Builder::new(&p, &columns);
        builder
            .begin()
            .unwrap()
            .field(&p.age)
            .unwrap()
            .in_list([1, 2, 3])
            .unwrap();
        let (sql, values) = builder.to_sql().unwrap();
        assert_eq!(sql, "age IN (?, ?, ?)");
        assert_eq!(
            values,
            vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)]
        );
    }

    #[test]
    fn test_untyped_value_is_checked_at_runtime() {
        let p = person();
        let columns = Columns::standard::<Person>();
        let mut builder = Builder::new(&p, &columns);
        let err = builder
            .begin()
            .unwrap()
            .field(&p.age)
            .unwrap()
            .eq(text("thirty"))
            .err()
            .unwrap();
        assert!(matches!(err, FilterError::TypeMismatch { .. }));
        assert!(builder.is_aborted());
        assert_eq!(builder.to_sql(), Err(FilterError::Aborted));
    }

    #[test]
    fn test_unregistered_operation_keeps_partial_sql() {
        let p = person();
        let mut columns = Columns::standard::<Person>();
        columns.insert(
            Column::new(&Person::FIELDS[0])
                .with(Operation::Equal, crate::column::render::Equality::new("age", false))
                .with(Operation::NotEqual, crate::column::render::Equality::new("age", true)),
        );
        let mut builder = Builder::new(&p, &columns);
        let err = builder
            .begin()
            .unwrap()
            .field(&p.name)
            .unwrap()
            .eq("x")
            .unwrap()
            .and()
            .field(&p.age)
            .unwrap()
            .in_list([1, 2])
            .err()
            .unwrap();
        assert_eq!(
            err,
            FilterError::OperationNotRegistered {
                field: "Person.age",
                operation: Operation::InList,
            }
        );
        assert_eq!(builder.sql(), "name = ? AND ");
        assert!(builder.to_sql().is_err());
    }

    #[test]
    fn test_foreign_reference_is_rejected() {
        let p = person();
        let other = person();
        let columns = Columns::standard::<Person>();
        let mut builder = Builder::new(&p, &columns);
        let err = builder.begin().unwrap().field(&other.age).err().unwrap();
        assert_eq!(err, FilterError::FieldNotFound);
    }

    #[test]
    fn test_missing_column() {
        let p = person();
        let columns = Columns::new();
        let mut builder = Builder::new(&p, &columns);
        let err = builder.begin().unwrap().field(&p.age).err().unwrap();
        assert_eq!(err, FilterError::ColumnNotConfigured("Person.age"));
    }

    #[test]
    fn test_tag_selection() {
        let columns = Columns::standard::<Person>();
        let mut builder = Builder::<Person>::detached(&columns);
        builder
            .begin()
            .unwrap()
            .tag("nick")
            .unwrap()
            .contains("li")
            .unwrap();
        assert_eq!(builder.sql(), "nickname LIKE ('%' || ? || '%')");
    }

    #[test]
    fn test_to_sql_is_idempotent() {
        let p = person();
        let columns = Columns::standard::<Person>();
        let mut builder = Builder::new(&p, &columns);
        let and_or = builder.begin().unwrap().field(&p.age).unwrap().gte(1).unwrap();
        assert_eq!(and_or.to_sql(), and_or.to_sql());
        let first = builder.to_sql().unwrap();
        assert_eq!(first, builder.to_sql().unwrap());
    }

    #[test]
    fn test_dangling_connective_is_incomplete() {
        let p = person();
        let columns = Columns::standard::<Person>();
        let mut builder = Builder::new(&p, &columns);
        let _ = builder.begin().unwrap().field(&p.age).unwrap().eq(30).unwrap().and();
        assert_eq!(builder.sql(), "age = ? AND ");
        assert_eq!(builder.to_sql(), Err(FilterError::Incomplete));

        // The field position can be resumed.
        builder.begin().unwrap().field(&p.name).unwrap().eq("x").unwrap();
        assert_eq!(builder.to_sql().unwrap().0, "age = ? AND name = ?");
    }

    #[test]
    fn test_empty_builder_is_incomplete() {
        let columns = Columns::standard::<Person>();
        let builder = Builder::<Person>::detached(&columns);
        assert_eq!(builder.to_sql(), Err(FilterError::Incomplete));
        assert_eq!(builder.into_sql(), Err(FilterError::Incomplete));
    }

    #[test]
    fn test_second_begin_is_rejected() {
        let p = person();
        let columns = Columns::standard::<Person>();
        let mut builder = Builder::new(&p, &columns);
        builder.begin().unwrap().field(&p.age).unwrap().eq(30).unwrap();
        assert_eq!(builder.begin().err(), Some(FilterError::AlreadyStarted));
        assert_eq!(builder.sql(), "age = ?");
        assert_eq!(builder.to_sql(), Err(FilterError::Aborted));
    }

    #[test]
    fn test_and_or_to_sql_inside_group() {
        let p = person();
        let columns = Columns::standard::<Person>();
        let mut builder = Builder::new(&p, &columns);
        builder
            .begin()
            .unwrap()
            .group(|t| {
                let and_or = t.field(&p.age)?.eq(1)?;
                assert_eq!(and_or.to_sql(), Err(FilterError::Incomplete));
                Ok(and_or)
            })
            .unwrap();
        assert_eq!(builder.to_sql().unwrap().0, "(age = ?)");
    }
}
