//! Per-field registry of filter operations.
//!
//! A [`Column`] maps each supported [`Operation`] to a [`Renderer`]. Every
//! lookup goes through [`Column::resolve`], which wraps the renderer in a
//! type guard: a value whose type differs from the field's declared type is
//! rejected before any SQL is produced.

pub mod render;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::context::Context;
use crate::error::{FilterError, Result};
use crate::operation::Operation;
use crate::schema::FieldDescriptor;
use crate::value::SqlValue;

pub use render::Pattern;

/// Output of a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The SQL fragment.
    pub sql: String,
    /// Whether the value must be appended to the parameter list.
    pub bind: bool,
}

impl Rendered {
    /// A fragment whose placeholders consume the value.
    #[must_use]
    pub fn bound(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            bind: true,
        }
    }

    /// A fragment that does not reference the value.
    #[must_use]
    pub fn literal(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            bind: false,
        }
    }
}

/// Failure reported by a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RenderError(pub String);

/// Produces the SQL fragment for one operation on one column.
pub trait Renderer: Send + Sync {
    /// Renders `value`. The value's type has already been checked.
    ///
    /// # Errors
    ///
    /// Returns a `RenderError` if the value cannot be rendered.
    fn render(&self, ctx: &Context, value: &SqlValue) -> std::result::Result<Rendered, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&Context, &SqlValue) -> std::result::Result<Rendered, RenderError> + Send + Sync,
{
    fn render(&self, ctx: &Context, value: &SqlValue) -> std::result::Result<Rendered, RenderError> {
        self(ctx, value)
    }
}

/// Filter registry for a single model field.
#[derive(Clone)]
pub struct Column {
    field: &'static FieldDescriptor,
    renderers: HashMap<Operation, Arc<dyn Renderer>>,
}

impl Column {
    /// Creates a column with no operations.
    #[must_use]
    pub fn new(field: &'static FieldDescriptor) -> Self {
        Self {
            field,
            renderers: HashMap::new(),
        }
    }

    /// Returns the field this column filters.
    #[must_use]
    pub const fn field(&self) -> &'static FieldDescriptor {
        self.field
    }

    /// Registers the renderer for `operation`, replacing any earlier one.
    pub fn register<R: Renderer + 'static>(&mut self, operation: Operation, renderer: R) {
        if self
            .renderers
            .insert(operation, Arc::new(renderer))
            .is_some()
        {
            debug!(field = self.field.path, %operation, "replaced renderer");
        }
    }

    /// Registers a renderer and returns the column, for setup chains.
    #[must_use]
    pub fn with<R: Renderer + 'static>(mut self, operation: Operation, renderer: R) -> Self {
        self.register(operation, renderer);
        self
    }

    /// Returns true if `operation` has a renderer.
    #[must_use]
    pub fn supports(&self, operation: Operation) -> bool {
        self.renderers.contains_key(&operation)
    }

    /// Returns the registered operations in vocabulary order.
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL
            .into_iter()
            .filter(|op| self.renderers.contains_key(op))
    }

    /// Looks up the type-guarded renderer for `operation`.
    #[must_use]
    pub fn resolve(&self, operation: Operation) -> Option<Validated<'_>> {
        let renderer = self.renderers.get(&operation)?;
        Some(Validated {
            field: self.field,
            operation,
            renderer: renderer.as_ref(),
        })
    }

    /// Reads a raw textual value as the field's declared type.
    ///
    /// List operations split `raw` on commas.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidLiteral` if a literal does not parse.
    pub fn coerce(&self, operation: Operation, raw: &str) -> Result<SqlValue> {
        let parse = |literal: &str| {
            self.field
                .value_type
                .parse(literal)
                .map_err(|reason| FilterError::InvalidLiteral {
                    field: self.field.path,
                    raw: String::from(literal),
                    reason,
                })
        };
        if operation.takes_list() {
            raw.split(',')
                .map(parse)
                .collect::<Result<Vec<_>>>()
                .map(SqlValue::List)
        } else {
            parse(raw)
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("field", &self.field.path)
            .field("operations", &self.operations().collect::<Vec<_>>())
            .finish()
    }
}

/// A renderer wrapped with the field's type guard.
pub struct Validated<'c> {
    field: &'static FieldDescriptor,
    operation: Operation,
    renderer: &'c dyn Renderer,
}

impl Validated<'_> {
    /// Returns the operation this renderer was resolved for.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Checks the value's type, then renders it.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::TypeMismatch` without invoking the renderer when
    /// the value's type differs from the declared type, and
    /// `FilterError::Render` when the renderer fails.
    pub fn render(&self, ctx: &Context, value: &SqlValue) -> Result<Rendered> {
        self.check(value)?;
        self.renderer
            .render(ctx, value)
            .map_err(|RenderError(message)| FilterError::Render {
                field: self.field.path,
                operation: self.operation,
                message,
            })
    }

    fn check(&self, value: &SqlValue) -> Result<()> {
        let declared = self.field.value_type;
        let matches = if self.operation.takes_list() {
            match value {
                SqlValue::List(items) => items.iter().all(|item| item.matches(declared)),
                _ => false,
            }
        } else {
            value.matches(declared)
        };
        if matches {
            return Ok(());
        }
        debug!(
            field = self.field.path,
            operation = %self.operation,
            expected = %declared,
            found = value.type_name(),
            "type mismatch"
        );
        Err(FilterError::TypeMismatch {
            field: self.field.path,
            operation: self.operation,
            expected: declared,
            found: String::from(value.type_name()),
        })
    }
}
