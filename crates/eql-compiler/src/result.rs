//! Rows produced by executing a query.

use eql_core::Value;
use serde::{Deserialize, Serialize};

/// The rows a query produced, one per event that returned a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().filter_map(|row| row.get(index)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_lookup() {
        let mut result = ResultSet::new(vec!["id".into(), "value".into()]);
        result.rows.push(vec![Value::from("a"), Value::Int(1)]);
        result.rows.push(vec![Value::from("b"), Value::Int(2)]);
        assert_eq!(result.column("value"), Some(vec![&Value::Int(1), &Value::Int(2)]));
        assert_eq!(result.column("missing"), None);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn serializes_as_columns_and_rows() {
        let mut result = ResultSet::new(vec!["value".into()]);
        result.rows.push(vec![Value::Float(1.5)]);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"columns":["value"],"rows":[[1.5]]}"#);
    }
}
