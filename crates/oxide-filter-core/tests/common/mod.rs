#![allow(dead_code)]

use chrono::NaiveDateTime;
use oxide_filter_core::{Columns, FilterError, SqlValue, parse_filter};
use oxide_filter_derive::Filterable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Filterable)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    #[filter(column = "full_name")]
    pub full_name: String,
    pub age: i32,
    #[serde(rename = "dept")]
    #[filter(column = "department")]
    pub department: String,
    pub salary: f64,
    pub active: bool,
    #[filter(column = "manager_id")]
    pub manager_id: Option<i64>,
    #[filter(column = "hired_at")]
    pub hired_at: Option<NaiveDateTime>,
    #[serde(skip)]
    #[filter(skip)]
    pub notes: String,
}

pub fn columns() -> Columns {
    Columns::standard::<Employee>()
}

pub fn filter(text: &str) -> (String, Vec<SqlValue>) {
    parse_filter::<Employee, _>(&columns(), text)
        .unwrap_or_else(|e| panic!("Failed to build: {text}\nError: {e:?}"))
}

pub fn filter_err(text: &str) -> FilterError {
    parse_filter::<Employee, _>(&columns(), text)
        .expect_err(&format!("Expected filter error for: {text}"))
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(String::from(s))
}

/// Counts `?` placeholders outside single-quoted literals.
pub fn placeholder_count(sql: &str) -> usize {
    let mut quoted = false;
    sql.chars()
        .filter(|c| {
            if *c == '\'' {
                quoted = !quoted;
            }
            !quoted && *c == '?'
        })
        .count()
}

/// Sends builder and parser events to the test output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
