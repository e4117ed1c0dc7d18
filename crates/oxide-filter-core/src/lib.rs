//! # oxide-filter-core
//!
//! Type-checked, parameterized SQL filter conditions.
//!
//! This crate provides:
//! - A per-field registry of filter operations ([`Column`], [`Columns`])
//! - A condition builder using the typestate pattern ([`Builder`])
//! - A textual filter syntax replayed onto the same builder ([`parse_filter`])
//!
//! ## Type-Checked Conditions
//!
//! Fields are selected by reference into a model instance, so both the
//! field and the operand type are checked at compile time:
//!
//! ```rust
//! use oxide_filter_core::{Builder, Columns, FieldDescriptor, Model, ValueType};
//!
//! struct Order {
//!     total: f64,
//!     customer: String,
//! }
//!
//! impl Model for Order {
//!     const NAME: &'static str = "Order";
//!     const FIELDS: &'static [FieldDescriptor] = &[
//!         FieldDescriptor::new("total", "total", "total", "Order.total",
//!             std::mem::offset_of!(Order, total), ValueType::Float),
//!         FieldDescriptor::new("customer", "customer", "customer", "Order.customer",
//!             std::mem::offset_of!(Order, customer), ValueType::Text),
//!     ];
//! }
//!
//! # fn main() -> oxide_filter_core::Result<()> {
//! let order = Order { total: 0.0, customer: String::new() };
//! let columns = Columns::standard::<Order>();
//! let mut builder = Builder::new(&order, &columns);
//! builder
//!     .begin()?
//!     .field(&order.total)?
//!     .gt(100.0)?
//!     .and()
//!     .field(&order.customer)?
//!     .begins_with("ACME")?;
//!
//! // This would NOT compile: `total` is a float.
//! // builder.begin()?.field(&order.total)?.eq("100");
//!
//! let (sql, params) = builder.to_sql()?;
//! assert_eq!(sql, "total > ? AND customer LIKE (? || '%')");
//! assert_eq!(params.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Textual Filters
//!
//! ```rust
//! # use oxide_filter_core::{Columns, FieldDescriptor, Model, ValueType, parse_filter};
//! # struct Order { total: f64 }
//! # impl Model for Order {
//! #     const NAME: &'static str = "Order";
//! #     const FIELDS: &'static [FieldDescriptor] = &[FieldDescriptor::new(
//! #         "total", "total", "total", "Order.total",
//! #         std::mem::offset_of!(Order, total), ValueType::Float)];
//! # }
//! let columns = Columns::standard::<Order>();
//! let (sql, params) = parse_filter::<Order, _>(&columns, "total:gte:10||total:lt:1").unwrap();
//! assert_eq!(sql, "total >= ? OR total < ?");
//! assert_eq!(params.len(), 2);
//! ```
//!
//! Values never appear in the SQL text; they are always returned as
//! parameters.

pub mod builder;
pub mod column;
pub mod context;
pub mod error;
pub mod lexer;
pub mod operation;
pub mod parser;
pub mod schema;
pub mod storage;
pub mod value;

pub use builder::{AndOr, Builder, QOperation, Target};
pub use column::{Column, Pattern, RenderError, Rendered, Renderer};
pub use context::{Context, Placeholder};
pub use error::{FilterError, Result};
pub use operation::Operation;
pub use parser::{parse_filter, parse_filter_with};
pub use schema::{FieldDescriptor, Model};
pub use storage::{ColumnLookup, Columns};
pub use value::{FieldType, Operand, SqlValue, ToSqlValue, Untyped, ValueType};
