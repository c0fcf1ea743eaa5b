//! The EQL syntax tree.
//!
//! Nodes live in an [`Ast`] arena and are addressed by [`NodeId`]. Each node
//! records its parent, so scope lookup can walk outward from any use site.

mod dump;
mod node;
mod ops;
mod tree;

pub use dump::dump;
pub use node::{
    Access, Annotation, Assignment, Binary, Binding, Block, Class, ExprStmt, Function, If,
    Literal, MethodCall, Module, New, Node, NodeId, NodeKind, Property, PropertyRef, Return,
    Unary, VarDecl, VarRef, While,
};
pub use ops::{BinaryOp, UnaryOp};
pub use tree::{Ancestors, Ast};
