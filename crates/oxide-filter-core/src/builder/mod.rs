//! Condition builder.
//!
//! A [`Builder`] accumulates a SQL condition and its parameters. Conditions
//! are added through typestate handles that only expose the calls valid in
//! the current position of the grammar:
//!
//! ```text
//! Target --field/tag--> QOperation --eq/gt/...--> AndOr --and/or--> Target
//!    \--group(..)----------------------------------^
//! ```
//!
//! # Example
//!
//! ```rust
//! use oxide_filter_core::{Builder, Columns, FieldDescriptor, Model, ValueType};
//!
//! struct User {
//!     age: i64,
//!     name: String,
//! }
//!
//! impl Model for User {
//!     const NAME: &'static str = "User";
//!     const FIELDS: &'static [FieldDescriptor] = &[
//!         FieldDescriptor::new("age", "age", "age", "User.age",
//!             std::mem::offset_of!(User, age), ValueType::Int),
//!         FieldDescriptor::new("name", "name", "name", "User.name",
//!             std::mem::offset_of!(User, name), ValueType::Text),
//!     ];
//! }
//!
//! # fn main() -> oxide_filter_core::Result<()> {
//! let user = User { age: 0, name: String::new() };
//! let columns = Columns::standard::<User>();
//! let mut builder = Builder::new(&user, &columns);
//! builder
//!     .begin()?
//!     .field(&user.age)?
//!     .eq(30)?
//!     .and()
//!     .field(&user.name)?
//!     .eq("x")?;
//!
//! let (sql, params) = builder.to_sql()?;
//! assert_eq!(sql, "age = ? AND name = ?");
//! assert_eq!(params.len(), 2);
//! # Ok(())
//! # }
//! ```

mod typed;

use tracing::debug;

pub use typed::{AndOr, QOperation, Target, TextLike};

use crate::column::Column;
use crate::context::Context;
use crate::error::{FilterError, Result};
use crate::operation::Operation;
use crate::schema::{FieldDescriptor, Model};
use crate::storage::{ColumnLookup, Columns};
use crate::value::SqlValue;

/// Accumulated SQL and parameters shared by all handles of one builder.
pub(crate) struct State<'a, M, L: ?Sized> {
    model: Option<&'a M>,
    columns: &'a L,
    pub(crate) ctx: Context,
    pub(crate) sql: String,
    pub(crate) values: Vec<SqlValue>,
    conditions: usize,
    /// True at a field position: before the first condition and after a
    /// connective or an opening parenthesis.
    awaiting_field: bool,
    open_groups: usize,
    aborted: bool,
}

impl<'a, M: Model, L: ColumnLookup + ?Sized> State<'a, M, L> {
    /// Marks the build as aborted when `result` is an error.
    pub(crate) fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.aborted = true;
        }
        result
    }

    pub(crate) fn field_of<T: crate::value::FieldType>(
        &mut self,
        field: &T,
    ) -> Result<&'static FieldDescriptor> {
        let found = self.model.and_then(|model| model.field_of(field));
        self.track(found.ok_or(FilterError::FieldNotFound))
    }

    pub(crate) fn field_by_tag(&mut self, tag: &str) -> Result<&'static FieldDescriptor> {
        let found = M::field_by_tag(tag).ok_or_else(|| FilterError::UnknownTag(String::from(tag)));
        self.track(found)
    }

    pub(crate) fn column_for(&mut self, field: &'static FieldDescriptor) -> Result<&'a Column> {
        let columns: &'a L = self.columns;
        let found = columns
            .column(field)
            .ok_or(FilterError::ColumnNotConfigured(field.path));
        self.track(found)
    }

    /// Fails unless the buffer holds a complete condition.
    pub(crate) fn check_complete(&self) -> Result<()> {
        if self.aborted {
            return Err(FilterError::Aborted);
        }
        if self.awaiting_field || self.open_groups > 0 {
            return Err(FilterError::Incomplete);
        }
        Ok(())
    }

    pub(crate) fn connect(&mut self, connective: &str) {
        self.sql.push_str(connective);
        self.awaiting_field = true;
    }

    pub(crate) fn open_group(&mut self) {
        self.sql.push('(');
        self.open_groups += 1;
        self.awaiting_field = true;
    }

    pub(crate) fn close_group(&mut self) {
        self.sql.push(')');
        self.open_groups -= 1;
        self.awaiting_field = false;
    }

    /// Renders one condition and appends it with its parameters.
    pub(crate) fn push_condition(
        &mut self,
        column: &Column,
        operation: Operation,
        value: SqlValue,
    ) -> Result<()> {
        let result = self.render_condition(column, operation, value);
        self.track(result)
    }

    fn render_condition(
        &mut self,
        column: &Column,
        operation: Operation,
        value: SqlValue,
    ) -> Result<()> {
        let field = column.field();
        let validated =
            column
                .resolve(operation)
                .ok_or(FilterError::OperationNotRegistered {
                    field: field.path,
                    operation,
                })?;
        self.ctx.set_bound(self.values.len());
        let rendered = validated.render(&self.ctx, &value)?;
        let params = if rendered.bind { value.param_count() } else { 0 };
        debug!(
            field = field.path,
            %operation,
            sql = %rendered.sql,
            params,
            "appended condition"
        );
        self.sql.push_str(&rendered.sql);
        if rendered.bind {
            match value {
                SqlValue::List(items) => self.values.extend(items),
                other => self.values.push(other),
            }
        }
        self.conditions += 1;
        self.awaiting_field = false;
        Ok(())
    }
}

/// Builds one parameterized SQL condition.
///
/// Created per query and discarded after [`Builder::to_sql`]. Once any step
/// fails the builder is aborted: what was appended so far stays in place but
/// `to_sql` refuses to return it.
pub struct Builder<'a, M, L: ?Sized = Columns> {
    state: State<'a, M, L>,
}

impl<'a, M: Model, L: ColumnLookup + ?Sized> Builder<'a, M, L> {
    /// Creates a builder bound to a model instance.
    ///
    /// Field references passed to [`Target::field`] must point into `model`.
    #[must_use]
    pub fn new(model: &'a M, columns: &'a L) -> Self {
        Self::with_model(Some(model), columns)
    }

    /// Creates a builder without a model instance.
    ///
    /// Only tag-based selection ([`Target::tag`], [`Target::parse`]) works;
    /// [`Target::field`] fails with [`FilterError::FieldNotFound`].
    #[must_use]
    pub fn detached(columns: &'a L) -> Self {
        Self::with_model(None, columns)
    }

    fn with_model(model: Option<&'a M>, columns: &'a L) -> Self {
        Self {
            state: State {
                model,
                columns,
                ctx: Context::new(),
                sql: String::new(),
                values: Vec::new(),
                conditions: 0,
                awaiting_field: true,
                open_groups: 0,
                aborted: false,
            },
        }
    }

    /// Replaces the evaluation context.
    #[must_use]
    pub fn with_context(mut self, ctx: Context) -> Self {
        self.state.ctx = ctx;
        self
    }

    /// Returns the evaluation context.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.state.ctx
    }

    /// Returns the handle for the next condition.
    ///
    /// Only valid while the builder is at a field position: when it is empty,
    /// or when the last handle was dropped right after a connective.
    ///
    /// # Errors
    ///
    /// Returns `Aborted` after an earlier failure, and `AlreadyStarted` if the
    /// builder ends with a condition. The latter also aborts the builder.
    pub fn begin(&mut self) -> Result<Target<'_, 'a, M, L>> {
        if self.state.aborted {
            return Err(FilterError::Aborted);
        }
        if !self.state.awaiting_field {
            return self.state.track(Err(FilterError::AlreadyStarted));
        }
        Ok(Target::new(&mut self.state))
    }

    /// Returns the SQL accumulated so far.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.state.sql
    }

    /// Returns the parameters accumulated so far.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.state.values
    }

    /// Returns the number of conditions appended.
    #[must_use]
    pub const fn conditions(&self) -> usize {
        self.state.conditions
    }

    /// Returns true once a construction step has failed.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        self.state.aborted
    }

    /// Returns the SQL and its parameters.
    ///
    /// Does not reset the builder; repeated calls return the same result.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::Aborted` if any construction step failed, and
    /// `FilterError::Incomplete` if the condition is empty or ends at a
    /// connective.
    pub fn to_sql(&self) -> Result<(String, Vec<SqlValue>)> {
        self.state.check_complete()?;
        Ok((self.state.sql.clone(), self.state.values.clone()))
    }

    /// Consumes the builder and returns the SQL and its parameters.
    ///
    /// # Errors
    ///
    /// Same as [`Builder::to_sql`].
    pub fn into_sql(self) -> Result<(String, Vec<SqlValue>)> {
        self.state.check_complete()?;
        Ok((self.state.sql, self.state.values))
    }
}
