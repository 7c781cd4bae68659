//! Row-source boundary.
//!
//! The core never talks to a database directly. It issues parameterized
//! queries against a `RowSource` supplied by the caller and maps the returned
//! positional rows into typed records. Pooling, isolation, timeouts and
//! cancellation all belong to the implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;

/// A single positional column value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Text(_) => "text",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// A result row with zero-based positional getters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Value, CollaboratorError> {
        self.values
            .get(index)
            .ok_or_else(|| CollaboratorError::column(index, "out of range"))
    }

    pub fn get_i64(&self, index: usize) -> Result<i64, CollaboratorError> {
        match self.get(index)? {
            Value::Int(v) => Ok(*v),
            other => Err(mismatch(index, "int", other)),
        }
    }

    pub fn get_str(&self, index: usize) -> Result<&str, CollaboratorError> {
        match self.get(index)? {
            Value::Text(v) => Ok(v.as_str()),
            other => Err(mismatch(index, "text", other)),
        }
    }

    /// Booleans are also accepted as 0/1 integers, which is how several
    /// SQL dialects store them.
    pub fn get_bool(&self, index: usize) -> Result<bool, CollaboratorError> {
        match self.get(index)? {
            Value::Bool(v) => Ok(*v),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            other => Err(mismatch(index, "bool", other)),
        }
    }

    pub fn get_opt_i64(&self, index: usize) -> Result<Option<i64>, CollaboratorError> {
        match self.get(index)? {
            Value::Null => Ok(None),
            Value::Int(v) => Ok(Some(*v)),
            other => Err(mismatch(index, "int or null", other)),
        }
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn mismatch(index: usize, expected: &str, found: &Value) -> CollaboratorError {
    CollaboratorError::column(
        index,
        format!("expected {expected}, found {}", found.type_name()),
    )
}

/// Executes a parameterized query and returns the raw rows.
///
/// Each call is an independent unit of work; callers must not assume
/// connection affinity between consecutive calls.
pub trait RowSource: Send + Sync {
    fn query(&self, query: &str, params: &[Value]) -> Result<Vec<Row>, CollaboratorError>;
}

impl<S> RowSource for Arc<S>
where
    S: RowSource + ?Sized,
{
    fn query(&self, query: &str, params: &[Value]) -> Result<Vec<Row>, CollaboratorError> {
        (**self).query(query, params)
    }
}

/// Maps one row into a typed record.
pub trait RowMapper<T> {
    fn map_row(&self, row: &Row, row_num: usize) -> Result<T, CollaboratorError>;
}

impl<T, F> RowMapper<T> for F
where
    F: Fn(&Row, usize) -> Result<T, CollaboratorError>,
{
    fn map_row(&self, row: &Row, row_num: usize) -> Result<T, CollaboratorError> {
        self(row, row_num)
    }
}

/// Run `query` and map every returned row, failing on the first bad row.
pub fn query_map<S, T, M>(
    source: &S,
    query: &str,
    params: &[Value],
    mapper: M,
) -> Result<Vec<T>, CollaboratorError>
where
    S: RowSource + ?Sized,
    M: RowMapper<T>,
{
    source
        .query(query, params)?
        .iter()
        .enumerate()
        .map(|(row_num, row)| mapper.map_row(row, row_num))
        .collect()
}
