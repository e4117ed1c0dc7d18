//! Field metadata for filterable models.
//!
//! This module provides the traits implemented by `#[derive(Filterable)]`.
//! A model lists one [`FieldDescriptor`] per field; the builder uses them to
//! turn a field reference or a serialization tag back into column metadata.

use crate::value::{FieldType, ValueType};

/// Metadata for one struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// The Rust field name.
    pub name: &'static str,
    /// The serialization-tag name used by textual filters.
    pub tag: &'static str,
    /// The SQL column name.
    pub column: &'static str,
    /// Stable structural path, `"<Struct>.<field>"`.
    pub path: &'static str,
    /// Byte offset of the field inside the struct.
    pub offset: usize,
    /// The declared, dereferenced type.
    pub value_type: ValueType,
}

impl FieldDescriptor {
    /// Creates a field descriptor.
    #[must_use]
    pub const fn new(
        name: &'static str,
        tag: &'static str,
        column: &'static str,
        path: &'static str,
        offset: usize,
        value_type: ValueType,
    ) -> Self {
        Self {
            name,
            tag,
            column,
            path,
            offset,
            value_type,
        }
    }
}

/// Trait for models whose fields can be filtered on.
///
/// Implemented by `#[derive(Filterable)]`.
pub trait Model: Sized + 'static {
    /// The model name.
    const NAME: &'static str;

    /// Descriptors for every filterable field, in declaration order.
    const FIELDS: &'static [FieldDescriptor];

    /// Resolves a reference into `self` to the descriptor of that field.
    ///
    /// Returns `None` when `field` does not point into `self`, or when the
    /// field at that offset has a different declared type.
    fn field_of<T: FieldType>(&self, field: &T) -> Option<&'static FieldDescriptor> {
        let base = self as *const Self as usize;
        let addr = field as *const T as usize;
        let offset = addr.checked_sub(base)?;
        if offset >= std::mem::size_of::<Self>() {
            return None;
        }
        Self::FIELDS
            .iter()
            .find(|d| d.offset == offset && d.value_type == T::VALUE_TYPE)
    }

    /// Looks up a field by its serialization tag.
    fn field_by_tag(tag: &str) -> Option<&'static FieldDescriptor> {
        Self::FIELDS.iter().find(|d| d.tag == tag)
    }

    /// Looks up a field by its structural path.
    fn field_by_path(path: &str) -> Option<&'static FieldDescriptor> {
        Self::FIELDS.iter().find(|d| d.path == path)
    }
}
