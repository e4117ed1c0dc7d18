//! SQL values, runtime type tags and compile-time operand typing.
//!
//! Values never reach the SQL text: renderers emit placeholders and the
//! builder collects the values into the parameter list.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A SQL value that can be bound as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Timestamp without time zone (UTC by convention).
    Timestamp(NaiveDateTime),
    /// Operand of a list operation. Bound element by element.
    List(Vec<SqlValue>),
}

impl SqlValue {
    /// Returns the runtime type of a scalar value.
    ///
    /// `Null` and `List` have no scalar type.
    #[must_use]
    pub const fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Bool(_) => Some(ValueType::Bool),
            Self::Int(_) => Some(ValueType::Int),
            Self::Float(_) => Some(ValueType::Float),
            Self::Text(_) => Some(ValueType::Text),
            Self::Blob(_) => Some(ValueType::Blob),
            Self::Timestamp(_) => Some(ValueType::Timestamp),
            Self::Null | Self::List(_) => None,
        }
    }

    /// Returns a short name for the value's kind, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::List(_) => "list",
            other => match other.value_type() {
                Some(ty) => ty.as_str(),
                None => "unknown",
            },
        }
    }

    /// Returns true if this scalar may be compared against a field of type
    /// `declared`.
    ///
    /// `Null` matches every type: an absent `Option<T>` still dereferences
    /// to `T`.
    #[must_use]
    pub fn matches(&self, declared: ValueType) -> bool {
        match self {
            Self::Null => true,
            other => other.value_type() == Some(declared),
        }
    }

    /// Returns true for `SqlValue::Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the number of parameters this value occupies once bound.
    #[must_use]
    pub fn param_count(&self) -> usize {
        match self {
            Self::List(items) => items.len(),
            _ => 1,
        }
    }
}

/// The declared, fully dereferenced type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Text,
    Blob,
    Timestamp,
}

impl ValueType {
    /// Returns the lowercase name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "text",
            Self::Blob => "blob",
            Self::Timestamp => "timestamp",
        }
    }

    /// Returns true if values of this type have a meaningful ordering.
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Text | Self::Timestamp)
    }

    /// Reads a raw textual literal as a value of this type.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when `raw` is not a valid literal.
    pub fn parse(self, raw: &str) -> Result<SqlValue, String> {
        match self {
            Self::Bool => match raw {
                "true" | "1" => Ok(SqlValue::Bool(true)),
                "false" | "0" => Ok(SqlValue::Bool(false)),
                _ => Err(String::from("expected true, false, 1 or 0")),
            },
            Self::Int => raw
                .parse::<i64>()
                .map(SqlValue::Int)
                .map_err(|e| e.to_string()),
            Self::Float => raw
                .parse::<f64>()
                .map(SqlValue::Float)
                .map_err(|e| e.to_string()),
            Self::Text => Ok(SqlValue::Text(String::from(raw))),
            Self::Blob => decode_hex(raw).map(SqlValue::Blob),
            Self::Timestamp => parse_timestamp(raw).map(SqlValue::Timestamp),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn decode_hex(raw: &str) -> Result<Vec<u8>, String> {
    if raw.len() % 2 != 0 {
        return Err(String::from("hex blob must have an even number of digits"));
    }
    (0..raw.len())
        .step_by(2)
        .map(|i| {
            raw.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid hex digits at offset {i}"))
        })
        .collect()
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.naive_utc());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| String::from("expected an RFC 3339 timestamp or a YYYY-MM-DD date"))
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

macro_rules! impl_to_sql_int {
    ($($ty:ty),+) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )+
    };
}

impl_to_sql_int!(i64, i32, i16, i8, u32, u16, u8);

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Timestamp(self)
    }
}

impl ToSqlValue for DateTime<Utc> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Timestamp(self.naive_utc())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

/// Maps a Rust field type to its dereferenced base type and runtime tag.
///
/// Indirections (`Option`, `Box`) are peeled off at any depth, so
/// `Option<Box<i64>>` has base `i64` and type [`ValueType::Int`].
pub trait FieldType {
    /// The dereferenced Rust type.
    type Base: 'static;

    /// The runtime tag of the dereferenced type.
    const VALUE_TYPE: ValueType;
}

macro_rules! impl_field_type {
    ($($ty:ty => $tag:ident),+ $(,)?) => {
        $(
            impl FieldType for $ty {
                type Base = $ty;
                const VALUE_TYPE: ValueType = ValueType::$tag;
            }
        )+
    };
}

impl_field_type!(
    bool => Bool,
    i64 => Int,
    i32 => Int,
    i16 => Int,
    i8 => Int,
    u32 => Int,
    u16 => Int,
    u8 => Int,
    f64 => Float,
    f32 => Float,
    String => Text,
    Vec<u8> => Blob,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => Timestamp,
);

impl<T: FieldType> FieldType for Option<T> {
    type Base = T::Base;
    const VALUE_TYPE: ValueType = T::VALUE_TYPE;
}

impl<T: FieldType> FieldType for Box<T> {
    type Base = T::Base;
    const VALUE_TYPE: ValueType = T::VALUE_TYPE;
}

/// Marker for values that may be compared against a field whose base type
/// is `T`.
///
/// This is the compile-time half of type validation. `SqlValue` is accepted
/// for every base type and is checked at runtime instead.
pub trait Operand<T>: ToSqlValue {}

/// Base type of a field selected without static type information.
#[derive(Debug, Clone, Copy)]
pub struct Untyped;

impl<V: ToSqlValue> Operand<Untyped> for V {}

impl<T: FieldType> Operand<T> for SqlValue {}

impl<T: FieldType, V: Operand<T>> Operand<T> for Option<V> {}

macro_rules! impl_operand {
    ($($base:ty: $($ty:ty),+;)+) => {
        $($(impl Operand<$base> for $ty {})+)+
    };
}

impl_operand! {
    bool: bool;
    i64: i64, i32, i16, i8, u32, u16, u8;
    i32: i32, i16, i8, u16, u8;
    i16: i16, i8, u8;
    i8: i8;
    u32: u32, u16, u8;
    u16: u16, u8;
    u8: u8;
    f64: f64, f32;
    f32: f32;
    String: String, &String, &str;
    Vec<u8>: Vec<u8>, &[u8];
    NaiveDateTime: NaiveDateTime, DateTime<Utc>;
    DateTime<Utc>: DateTime<Utc>;
}
