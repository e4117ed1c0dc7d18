//! Columns storage: where the builder finds a field's [`Column`].

use std::collections::HashMap;

use crate::column::Column;
use crate::schema::{FieldDescriptor, Model};

/// Lookup contract between the builder and whatever owns the columns.
pub trait ColumnLookup {
    /// Returns the column configured for `field`, if any.
    fn column(&self, field: &FieldDescriptor) -> Option<&Column>;
}

/// Columns keyed by field path.
///
/// Filled during setup, read-only while queries are built.
#[derive(Debug, Clone, Default)]
pub struct Columns {
    columns: HashMap<&'static str, Column>,
}

impl Columns {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage with a standard column for every field of `M`.
    #[must_use]
    pub fn standard<M: Model>() -> Self {
        let mut columns = Self::new();
        for field in M::FIELDS {
            columns.insert(Column::standard(field));
        }
        columns
    }

    /// Adds a column, replacing any column for the same field.
    pub fn insert(&mut self, column: Column) -> Option<Column> {
        self.columns.insert(column.field().path, column)
    }

    /// Adds a column and returns the storage, for setup chains.
    #[must_use]
    pub fn with(mut self, column: Column) -> Self {
        self.insert(column);
        self
    }

    /// Edits the column of `field`, creating an empty one first if needed.
    pub fn configure<F>(&mut self, field: &'static FieldDescriptor, f: F)
    where
        F: FnOnce(&mut Column),
    {
        let column = self
            .columns
            .entry(field.path)
            .or_insert_with(|| Column::new(field));
        f(column);
    }

    /// Removes the column of the field at `path`.
    pub fn remove(&mut self, path: &str) -> Option<Column> {
        self.columns.remove(path)
    }

    /// Returns the column for the field at `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Column> {
        self.columns.get(path)
    }

    /// Returns the number of configured columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if no column is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl ColumnLookup for Columns {
    fn column(&self, field: &FieldDescriptor) -> Option<&Column> {
        self.columns.get(field.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::render::Compare;
    use crate::operation::Operation;
    use crate::value::ValueType;

    static SCORE: FieldDescriptor =
        FieldDescriptor::new("score", "score", "score", "Game.score", 0, ValueType::Int);
    static TITLE: FieldDescriptor =
        FieldDescriptor::new("title", "title", "title", "Game.title", 8, ValueType::Text);

    #[test]
    fn test_lookup_by_descriptor() {
        let columns = Columns::new().with(Column::standard(&SCORE));
        assert!(columns.column(&SCORE).is_some());
        assert!(columns.column(&TITLE).is_none());
        assert_eq!(columns.len(), 1);
    }

    #[test]
    fn test_configure_creates_and_edits() {
        let mut columns = Columns::new();
        columns.configure(&SCORE, |col| {
            col.register(Operation::GreaterThan, Compare::new("score", ">"));
        });
        columns.configure(&SCORE, |col| {
            col.register(Operation::LessThan, Compare::new("score", "<"));
        });
        let column = columns.get("Game.score").unwrap();
        assert!(column.supports(Operation::GreaterThan));
        assert!(column.supports(Operation::LessThan));
        assert!(!column.supports(Operation::Equal));
    }

    #[test]
    fn test_insert_replaces() {
        let mut columns = Columns::new();
        assert!(columns.insert(Column::standard(&TITLE)).is_none());
        assert!(columns.insert(Column::new(&TITLE)).is_some());
        assert_eq!(columns.get("Game.title").unwrap().operations().count(), 0);
        assert!(columns.remove("Game.title").is_some());
        assert!(columns.is_empty());
    }
}
