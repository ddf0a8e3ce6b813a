//! Row filters shared by every backend.

use serde_json::Value;

use super::Row;

/// A single column condition. Multiple filters are AND-ed.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Neq(String, Value),
    IsNull(String),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(column.into(), value.into())
    }

    pub fn neq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Neq(column.into(), value.into())
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Filter::IsNull(column.into())
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _) | Filter::Neq(c, _) | Filter::IsNull(c) => c,
        }
    }

    /// Evaluate against a row. A missing column reads as null.
    pub fn matches(&self, row: &Row) -> bool {
        let field = row.get(self.column()).unwrap_or(&Value::Null);
        match self {
            Filter::Eq(_, v) => field == v,
            Filter::Neq(_, v) => field != v,
            Filter::IsNull(_) => field.is_null(),
        }
    }

    /// Encode as a PostgREST query pair, e.g. `("status", "eq.active")`.
    pub fn to_query_pair(&self) -> (String, String) {
        let encoded = match self {
            Filter::Eq(_, v) => format!("eq.{}", scalar(v)),
            Filter::Neq(_, v) => format!("neq.{}", scalar(v)),
            Filter::IsNull(_) => "is.null".to_string(),
        };
        (self.column().to_string(), encoded)
    }
}

/// True when every filter matches.
pub fn matches_all(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|f| f.matches(row))
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
