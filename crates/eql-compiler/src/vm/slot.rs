//! Runtime values on the VM stack and in object fields.

use eql_core::{DataType, Value};

/// A value on the VM stack, in a local slot or in an object field.
#[derive(Debug, Clone, PartialEq)]
pub enum VmSlot {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Index into the execution's object heap.
    Object(usize),
    /// The event currently being processed.
    Event,
}

impl VmSlot {
    /// The zero value for a declared type.
    pub fn default_for(ty: &DataType) -> VmSlot {
        match ty {
            DataType::Int => VmSlot::Int(0),
            DataType::Float => VmSlot::Float(0.0),
            DataType::Boolean => VmSlot::Bool(false),
            DataType::String => VmSlot::String(String::new()),
            _ => VmSlot::Null,
        }
    }

    /// Convert a stored table value to a slot of type `ty`.
    ///
    /// Returns `None` when the value cannot represent `ty`.
    pub fn from_value(value: &Value, ty: &DataType) -> Option<VmSlot> {
        Some(match (value, ty) {
            (Value::Null, ty) => VmSlot::default_for(ty),
            (Value::Int(v), DataType::Int) => VmSlot::Int(*v),
            (Value::Int(v), DataType::Float) => VmSlot::Float(*v as f64),
            (Value::Float(v), DataType::Float) => VmSlot::Float(*v),
            (Value::Float(v), DataType::Int) => VmSlot::Int(*v as i64),
            (Value::Boolean(v), DataType::Boolean) => VmSlot::Bool(*v),
            (Value::String(v), DataType::String) => VmSlot::String(v.clone()),
            _ => return None,
        })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            VmSlot::Null => "null",
            VmSlot::Bool(_) => "Boolean",
            VmSlot::Int(_) => "Int",
            VmSlot::Float(_) => "Float",
            VmSlot::String(_) => "String",
            VmSlot::Object(_) => "object",
            VmSlot::Event => "Event",
        }
    }
}

/// A class instance. Lives until the current event finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub class: usize,
    pub fields: Vec<VmSlot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(VmSlot::default_for(&DataType::Float), VmSlot::Float(0.0));
        assert_eq!(VmSlot::default_for(&DataType::class("A")), VmSlot::Null);
    }

    #[test]
    fn stored_values_convert_to_declared_type() {
        assert_eq!(VmSlot::from_value(&Value::Int(3), &DataType::Float), Some(VmSlot::Float(3.0)));
        assert_eq!(VmSlot::from_value(&Value::Null, &DataType::String), Some(VmSlot::String(String::new())));
        assert_eq!(VmSlot::from_value(&Value::from("x"), &DataType::Int), None);
    }
}
