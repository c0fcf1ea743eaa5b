//! Class and member symbols collected by the registration pass.
//!
//! The table holds the builtin `Event` class plus every user class, each with
//! its properties and method signatures. Lookup is by name or by the
//! declaring node.

use eql_core::{ClassType, DataType, EVENT_CLASS, FunctionType, Span};
use eql_parser::ast::{Access, NodeId};
use eql_table::Schema;
use rustc_hash::FxHashMap;

/// Builtin `Event` field holding the object id.
pub const EVENT_ID_FIELD: &str = "id";
/// Builtin `Event` field holding the event timestamp.
pub const EVENT_TIMESTAMP_FIELD: &str = "timestamp";

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSymbol {
    pub name: String,
    pub ty: DataType,
    pub access: Access,
    /// Declaring property node; `None` for builtin fields.
    pub node: Option<NodeId>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSymbol {
    pub name: String,
    pub node: NodeId,
    pub signature: FunctionType,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassSymbol {
    pub ty: ClassType,
    /// Declaring class node; `None` for the builtin `Event` class.
    pub node: Option<NodeId>,
    pub span: Span,
    pub fields: Vec<FieldSymbol>,
    pub methods: Vec<MethodSymbol>,
}

impl ClassSymbol {
    pub fn name(&self) -> &str {
        &self.ty.name
    }

    pub fn is_builtin(&self) -> bool {
        self.node.is_none()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSymbol> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodSymbol> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Every class visible to one module.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    classes: Vec<ClassSymbol>,
    by_name: FxHashMap<String, usize>,
    by_node: FxHashMap<NodeId, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding only the builtin `Event` class for `schema`.
    pub fn with_event_class(schema: &Schema) -> Self {
        let mut fields = vec![
            builtin_field(EVENT_ID_FIELD, DataType::String),
            builtin_field(EVENT_TIMESTAMP_FIELD, DataType::Int),
        ];
        fields.extend(
            schema
                .iter()
                .filter(|p| p.name != EVENT_ID_FIELD && p.name != EVENT_TIMESTAMP_FIELD)
                .map(|p| builtin_field(&p.name, p.data_type.data_type())),
        );

        let mut table = Self::new();
        table.insert(ClassSymbol {
            ty: ClassType::new(EVENT_CLASS),
            node: None,
            span: Span::default(),
            fields,
            methods: Vec::new(),
        });
        table
    }

    /// Add a class; returns `false` if the name is already taken.
    pub fn insert(&mut self, class: ClassSymbol) -> bool {
        if self.by_name.contains_key(class.name()) {
            return false;
        }
        let index = self.classes.len();
        self.by_name.insert(class.name().to_string(), index);
        if let Some(node) = class.node {
            self.by_node.insert(node, index);
        }
        self.classes.push(class);
        true
    }

    pub fn class(&self, name: &str) -> Option<&ClassSymbol> {
        self.by_name.get(name).map(|&i| &self.classes[i])
    }

    pub fn class_by_node(&self, node: NodeId) -> Option<&ClassSymbol> {
        self.by_node.get(&node).map(|&i| &self.classes[i])
    }

    pub(crate) fn class_by_node_mut(&mut self, node: NodeId) -> Option<&mut ClassSymbol> {
        self.by_node.get(&node).map(|&i| &mut self.classes[i])
    }

    /// The class symbol for a class type.
    pub fn class_of(&self, ty: &DataType) -> Option<&ClassSymbol> {
        ty.as_class().and_then(|class| self.class(&class.name))
    }

    /// Resolve a type name to a primitive or a registered class.
    pub fn resolve_type(&self, name: &str) -> Option<DataType> {
        DataType::primitive(name).or_else(|| self.class(name).map(|c| DataType::Class(c.ty.clone())))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassSymbol> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

fn builtin_field(name: &str, ty: DataType) -> FieldSymbol {
    FieldSymbol {
        name: name.to_string(),
        ty,
        access: Access::Public,
        node: None,
        span: Span::default(),
    }
}
