//! Resolved types attached to expression nodes.

use std::fmt;

/// Name of the builtin class bound to the implicit `event` variable.
pub const EVENT_CLASS: &str = "Event";

/// A named class type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub name: String,
}

impl ClassType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The signature of a function or method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub params: Vec<DataType>,
    pub return_type: Box<DataType>,
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Void,
    Int,
    Float,
    Boolean,
    String,
    /// Type of the `null` literal; assignable to any class.
    Null,
    Class(ClassType),
    Function(FunctionType),
}

impl DataType {
    /// Look up a primitive by its source spelling.
    pub fn primitive(name: &str) -> Option<DataType> {
        match name {
            "Void" => Some(DataType::Void),
            "Int" => Some(DataType::Int),
            "Float" => Some(DataType::Float),
            "Boolean" => Some(DataType::Boolean),
            "String" => Some(DataType::String),
            _ => None,
        }
    }

    /// Create a class type from a name.
    pub fn class(name: impl Into<String>) -> DataType {
        DataType::Class(ClassType::new(name))
    }

    /// Create a function type.
    pub fn function(params: Vec<DataType>, return_type: DataType) -> DataType {
        DataType::Function(FunctionType {
            params,
            return_type: Box::new(return_type),
        })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int | DataType::Float)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, DataType::Void)
    }

    pub fn is_class(&self) -> bool {
        matches!(self, DataType::Class(_))
    }

    /// The class type, if this is one.
    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            DataType::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Whether a value of this type may be stored where `target` is expected.
    ///
    /// Identical types, `Int` widening to `Float`, and `null` into any class.
    pub fn is_assignable_to(&self, target: &DataType) -> bool {
        match (self, target) {
            (a, b) if a == b => true,
            (DataType::Int, DataType::Float) => true,
            (DataType::Null, DataType::Class(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Void => write!(f, "Void"),
            DataType::Int => write!(f, "Int"),
            DataType::Float => write!(f, "Float"),
            DataType::Boolean => write!(f, "Boolean"),
            DataType::String => write!(f, "String"),
            DataType::Null => write!(f, "null"),
            DataType::Class(class) => write!(f, "{}", class.name),
            DataType::Function(func) => {
                write!(f, "(")?;
                for (i, param) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {}", func.return_type)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_lookup() {
        assert_eq!(DataType::primitive("Int"), Some(DataType::Int));
        assert_eq!(DataType::primitive("Boolean"), Some(DataType::Boolean));
        assert_eq!(DataType::primitive("int"), None);
        assert_eq!(DataType::primitive("Foo"), None);
    }

    #[test]
    fn assignability() {
        assert!(DataType::Int.is_assignable_to(&DataType::Int));
        assert!(DataType::Int.is_assignable_to(&DataType::Float));
        assert!(!DataType::Float.is_assignable_to(&DataType::Int));
        assert!(DataType::Null.is_assignable_to(&DataType::class("Foo")));
        assert!(!DataType::class("Foo").is_assignable_to(&DataType::class("Bar")));
        assert!(!DataType::class("Foo").is_assignable_to(&DataType::Int));
    }

    #[test]
    fn display_function_type() {
        let ty = DataType::function(vec![DataType::Int, DataType::class("Foo")], DataType::Boolean);
        assert_eq!(ty.to_string(), "(Int, Foo) -> Boolean");
    }
}
