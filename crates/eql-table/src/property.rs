//! Schema properties and their data types.

use std::fmt;
use std::str::FromStr;

use eql_core::{DataType, Value};
use serde::{Deserialize, Serialize};

use crate::TableError;

/// Storage type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// A string stored as a small integer through a per-table dictionary.
    Factor,
    String,
    Integer,
    Float,
    Boolean,
}

impl DataKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DataKind::Factor => "factor",
            DataKind::String => "string",
            DataKind::Integer => "integer",
            DataKind::Float => "float",
            DataKind::Boolean => "boolean",
        }
    }

    /// The query-language type a property of this kind is read as.
    pub fn data_type(self) -> DataType {
        match self {
            DataKind::Factor | DataKind::String => DataType::String,
            DataKind::Integer => DataType::Int,
            DataKind::Float => DataType::Float,
            DataKind::Boolean => DataType::Boolean,
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataKind {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "factor" => Ok(DataKind::Factor),
            "string" => Ok(DataKind::String),
            "integer" => Ok(DataKind::Integer),
            "float" => Ok(DataKind::Float),
            "boolean" => Ok(DataKind::Boolean),
            other => Err(TableError::InvalidDataType(other.to_string())),
        }
    }
}

/// One column of a table schema.
///
/// Permanent properties have positive ids, transient ones negative ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: i64,
    pub name: String,
    #[serde(rename = "dataType")]
    pub data_type: DataKind,
    pub transient: bool,
}

impl Property {
    /// Property names are non-empty and made of `[A-Za-z0-9_]`.
    pub fn validate_name(name: &str) -> Result<(), TableError> {
        if name.is_empty() || !name.chars().all(is_word_char) {
            return Err(TableError::InvalidPropertyName(name.to_string()));
        }
        Ok(())
    }

    /// Coerce `value` into this property's data type.
    ///
    /// Numbers convert between integer and float; anything else that does not
    /// fit becomes the type's zero value.
    pub fn cast(&self, value: Value) -> Value {
        match self.data_type {
            DataKind::Factor | DataKind::String => match value {
                Value::String(s) => Value::String(s),
                _ => Value::String(String::new()),
            },
            DataKind::Integer => match value {
                Value::Int(v) => Value::Int(v),
                Value::Float(v) => Value::Int(v as i64),
                _ => Value::Int(0),
            },
            DataKind::Float => match value {
                Value::Float(v) => Value::Float(v),
                Value::Int(v) => Value::Float(v as f64),
                _ => Value::Float(0.0),
            },
            DataKind::Boolean => match value {
                Value::Boolean(v) => Value::Boolean(v),
                _ => Value::Boolean(false),
            },
        }
    }
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(data_type: DataKind) -> Property {
        Property {
            id: 1,
            name: "p".into(),
            data_type,
            transient: false,
        }
    }

    #[test]
    fn name_validation() {
        assert!(Property::validate_name("first_name2").is_ok());
        assert_eq!(
            Property::validate_name("my•prop"),
            Err(TableError::InvalidPropertyName("my•prop".into()))
        );
        assert!(Property::validate_name("").is_err());
        assert!(Property::validate_name("a b").is_err());
    }

    #[test]
    fn cast_numbers() {
        assert_eq!(property(DataKind::Integer).cast(Value::Float(3.9)), Value::Int(3));
        assert_eq!(property(DataKind::Float).cast(Value::Int(2)), Value::Float(2.0));
        assert_eq!(property(DataKind::Integer).cast(Value::String("x".into())), Value::Int(0));
    }

    #[test]
    fn cast_strings_and_booleans() {
        assert_eq!(property(DataKind::Factor).cast(Value::Int(1)), Value::String(String::new()));
        assert_eq!(property(DataKind::String).cast(Value::from("a")), Value::from("a"));
        assert_eq!(property(DataKind::Boolean).cast(Value::Boolean(true)), Value::Boolean(true));
        assert_eq!(property(DataKind::Boolean).cast(Value::Int(1)), Value::Boolean(false));
    }

    #[test]
    fn data_kind_names() {
        assert_eq!("factor".parse::<DataKind>(), Ok(DataKind::Factor));
        assert_eq!(
            "decimal".parse::<DataKind>(),
            Err(TableError::InvalidDataType("decimal".into()))
        );
        assert_eq!(DataKind::Integer.data_type(), DataType::Int);

        let json = serde_json::to_string(&property(DataKind::Boolean)).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"p","dataType":"boolean","transient":false}"#);
    }
}
