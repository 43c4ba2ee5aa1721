//! Native values held in the keyspace.
//!
//! These are plain Rust shapes, independent of the wire format. The command
//! layer turns them into protocol values when building a reply.

use serde::{Deserialize, Serialize};

/// A stored value, or the result of a store operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Text(String),
    List(Vec<Value>),
    Bool(bool),
    Float(f64),
    /// Key/value pairs in insertion order
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
    /// A fixed-size group, sent to clients as a push frame
    Tuple(Vec<Value>),
    /// Absence of a value
    Nil,
    /// A short acknowledgement such as `OK`
    Status(String),
}

impl Value {
    /// The acknowledgement returned by successful writes.
    pub fn ok() -> Self {
        Value::Status("OK".to_string())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Float(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Nil)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
