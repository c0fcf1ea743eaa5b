//! Node kinds of the EQL syntax tree.
//!
//! Every kind is its own struct, wrapped by the [`Node`] sum type. Child
//! references are [`NodeId`]s into the owning [`Ast`](super::Ast); they are
//! readable through accessors but only the arena can rewire them, which keeps
//! the parent back-references consistent.

use std::fmt;

use eql_core::{DataType, Span};

use super::ops::{BinaryOp, UnaryOp};

/// Stable handle to a node in an [`Ast`](super::Ast).
///
/// The generation detects use of a handle after its node was freed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Slot index inside the arena.
    pub fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Discriminant of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Module,
    Class,
    Function,
    Property,
    VarDecl,
    Block,
    Literal,
    VarRef,
    PropertyRef,
    MethodCall,
    Binary,
    Unary,
    Assignment,
    If,
    While,
    Return,
    New,
    ExprStmt,
}

impl NodeKind {
    /// Kinds that produce a value.
    pub fn is_expression(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            Literal | VarRef | PropertyRef | MethodCall | Binary | Unary | New
        )
    }

    /// Kinds that may appear directly in a block.
    pub fn is_statement(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            VarDecl | Block | Assignment | If | While | Return | ExprStmt
        )
    }

    /// Tag name used in dumps and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Module => "module",
            NodeKind::Class => "class",
            NodeKind::Function => "function",
            NodeKind::Property => "property",
            NodeKind::VarDecl => "var-decl",
            NodeKind::Block => "block",
            NodeKind::Literal => "literal",
            NodeKind::VarRef => "var-ref",
            NodeKind::PropertyRef => "property-ref",
            NodeKind::MethodCall => "method-call",
            NodeKind::Binary => "binary-expr",
            NodeKind::Unary => "unary-expr",
            NodeKind::Assignment => "assignment",
            NodeKind::If => "if",
            NodeKind::While => "while",
            NodeKind::Return => "return",
            NodeKind::New => "new",
            NodeKind::ExprStmt => "expr-stmt",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// The root construct: classes plus an optional anonymous main function.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub(crate) classes: Vec<NodeId>,
    pub(crate) main_function: Option<NodeId>,
}

impl Module {
    pub fn classes(&self) -> &[NodeId] {
        &self.classes
    }

    pub fn main_function(&self) -> Option<NodeId> {
        self.main_function
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: String,
    pub(crate) properties: Vec<NodeId>,
    pub(crate) methods: Vec<NodeId>,
}

impl Class {
    pub fn properties(&self) -> &[NodeId] {
        &self.properties
    }

    pub fn methods(&self) -> &[NodeId] {
        &self.methods
    }
}

/// A method, or the module's main function when the name is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    /// Return type as written; empty when inferred.
    pub return_type: String,
    pub(crate) params: Vec<NodeId>,
    pub(crate) body: Option<NodeId>,
}

impl Function {
    /// Parameters, each a [`VarDecl`] without initializer.
    pub fn params(&self) -> &[NodeId] {
        &self.params
    }

    pub fn body(&self) -> Option<NodeId> {
        self.body
    }
}

/// Visibility of a class property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Access {
    #[default]
    Public,
    Private,
}

impl Access {
    pub fn as_str(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Private => "private",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub access: Access,
    pub type_name: String,
    pub name: String,
}

/// A local variable or function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub type_name: String,
    pub name: String,
    pub(crate) initializer: Option<NodeId>,
}

impl VarDecl {
    pub fn initializer(&self) -> Option<NodeId> {
        self.initializer
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub(crate) statements: Vec<NodeId>,
}

impl Block {
    pub fn statements(&self) -> &[NodeId] {
        &self.statements
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub(crate) target: NodeId,
    pub(crate) value: NodeId,
}

impl Assignment {
    /// A [`VarRef`] or [`PropertyRef`].
    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn value(&self) -> NodeId {
        self.value
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub(crate) condition: NodeId,
    pub(crate) then_block: NodeId,
    pub(crate) else_branch: Option<NodeId>,
}

impl If {
    pub fn condition(&self) -> NodeId {
        self.condition
    }

    pub fn then_block(&self) -> NodeId {
        self.then_block
    }

    /// A [`Block`] or a chained [`If`].
    pub fn else_branch(&self) -> Option<NodeId> {
        self.else_branch
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub(crate) condition: NodeId,
    pub(crate) body: NodeId,
}

impl While {
    pub fn condition(&self) -> NodeId {
        self.condition
    }

    pub fn body(&self) -> NodeId {
        self.body
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Return {
    pub(crate) value: Option<NodeId>,
}

impl Return {
    pub fn value(&self) -> Option<NodeId> {
        self.value
    }
}

/// An expression evaluated for its side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub(crate) expr: NodeId,
}

impl ExprStmt {
    pub fn expr(&self) -> NodeId {
        self.expr
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Null,
}

/// A bare identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    pub name: String,
}

/// `target.name`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRef {
    pub(crate) target: NodeId,
    pub name: String,
}

impl PropertyRef {
    pub fn target(&self) -> NodeId {
        self.target
    }
}

/// `target.name(args)` or an unqualified `name(args)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub(crate) target: Option<NodeId>,
    pub name: String,
    pub(crate) args: Vec<NodeId>,
}

impl MethodCall {
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn args(&self) -> &[NodeId] {
        &self.args
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub op: BinaryOp,
    pub(crate) lhs: NodeId,
    pub(crate) rhs: NodeId,
}

impl Binary {
    pub fn lhs(&self) -> NodeId {
        self.lhs
    }

    pub fn rhs(&self) -> NodeId {
        self.rhs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: UnaryOp,
    pub(crate) operand: NodeId,
}

impl Unary {
    pub fn operand(&self) -> NodeId {
        self.operand
    }
}

/// `new Type()`
#[derive(Debug, Clone, PartialEq)]
pub struct New {
    pub type_name: String,
}

// ============================================================================
// Node
// ============================================================================

/// One syntax tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Module(Module),
    Class(Class),
    Function(Function),
    Property(Property),
    VarDecl(VarDecl),
    Block(Block),
    Literal(Literal),
    VarRef(VarRef),
    PropertyRef(PropertyRef),
    MethodCall(MethodCall),
    Binary(Binary),
    Unary(Unary),
    Assignment(Assignment),
    If(If),
    While(While),
    Return(Return),
    New(New),
    ExprStmt(ExprStmt),
}

macro_rules! node_accessors {
    ($($method:ident => $variant:ident($ty:ty)),* $(,)?) => {
        impl Node {
            $(
                pub fn $method(&self) -> Option<&$ty> {
                    match self {
                        Node::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            )*
        }
    };
}

node_accessors! {
    as_module => Module(Module),
    as_class => Class(Class),
    as_function => Function(Function),
    as_property => Property(Property),
    as_var_decl => VarDecl(VarDecl),
    as_block => Block(Block),
    as_literal => Literal(Literal),
    as_var_ref => VarRef(VarRef),
    as_property_ref => PropertyRef(PropertyRef),
    as_method_call => MethodCall(MethodCall),
    as_binary => Binary(Binary),
    as_unary => Unary(Unary),
    as_assignment => Assignment(Assignment),
    as_if => If(If),
    as_while => While(While),
    as_return => Return(Return),
    as_new => New(New),
    as_expr_stmt => ExprStmt(ExprStmt),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Module(_) => NodeKind::Module,
            Node::Class(_) => NodeKind::Class,
            Node::Function(_) => NodeKind::Function,
            Node::Property(_) => NodeKind::Property,
            Node::VarDecl(_) => NodeKind::VarDecl,
            Node::Block(_) => NodeKind::Block,
            Node::Literal(_) => NodeKind::Literal,
            Node::VarRef(_) => NodeKind::VarRef,
            Node::PropertyRef(_) => NodeKind::PropertyRef,
            Node::MethodCall(_) => NodeKind::MethodCall,
            Node::Binary(_) => NodeKind::Binary,
            Node::Unary(_) => NodeKind::Unary,
            Node::Assignment(_) => NodeKind::Assignment,
            Node::If(_) => NodeKind::If,
            Node::While(_) => NodeKind::While,
            Node::Return(_) => NodeKind::Return,
            Node::New(_) => NodeKind::New,
            Node::ExprStmt(_) => NodeKind::ExprStmt,
        }
    }

    /// The identifier carried by named kinds.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Module(n) => Some(&n.name),
            Node::Class(n) => Some(&n.name),
            Node::Function(n) => Some(&n.name),
            Node::Property(n) => Some(&n.name),
            Node::VarDecl(n) => Some(&n.name),
            Node::VarRef(n) => Some(&n.name),
            Node::PropertyRef(n) => Some(&n.name),
            Node::MethodCall(n) => Some(&n.name),
            _ => None,
        }
    }

    /// Owned children in stored order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            Node::Module(n) => {
                out.extend_from_slice(&n.classes);
                out.extend(n.main_function);
            }
            Node::Class(n) => {
                out.extend_from_slice(&n.properties);
                out.extend_from_slice(&n.methods);
            }
            Node::Function(n) => {
                out.extend_from_slice(&n.params);
                out.extend(n.body);
            }
            Node::VarDecl(n) => out.extend(n.initializer),
            Node::Block(n) => out.extend_from_slice(&n.statements),
            Node::PropertyRef(n) => out.push(n.target),
            Node::MethodCall(n) => {
                out.extend(n.target);
                out.extend_from_slice(&n.args);
            }
            Node::Binary(n) => out.extend([n.lhs, n.rhs]),
            Node::Unary(n) => out.push(n.operand),
            Node::Assignment(n) => out.extend([n.target, n.value]),
            Node::If(n) => {
                out.extend([n.condition, n.then_block]);
                out.extend(n.else_branch);
            }
            Node::While(n) => out.extend([n.condition, n.body]),
            Node::Return(n) => out.extend(n.value),
            Node::ExprStmt(n) => out.push(n.expr),
            Node::Property(_) | Node::Literal(_) | Node::VarRef(_) | Node::New(_) => {}
        }
        out
    }

    /// Unlink `child` from an optional or sequence slot.
    ///
    /// Returns `false` when `child` fills a required slot, which cannot be
    /// left empty.
    pub(crate) fn unlink(&mut self, child: NodeId) -> bool {
        fn remove(list: &mut Vec<NodeId>, child: NodeId) -> bool {
            match list.iter().position(|&c| c == child) {
                Some(pos) => {
                    list.remove(pos);
                    true
                }
                None => false,
            }
        }
        fn clear(slot: &mut Option<NodeId>, child: NodeId) -> bool {
            if *slot == Some(child) {
                *slot = None;
                true
            } else {
                false
            }
        }

        match self {
            Node::Module(n) => remove(&mut n.classes, child) || clear(&mut n.main_function, child),
            Node::Class(n) => remove(&mut n.properties, child) || remove(&mut n.methods, child),
            Node::Function(n) => remove(&mut n.params, child) || clear(&mut n.body, child),
            Node::VarDecl(n) => clear(&mut n.initializer, child),
            Node::Block(n) => remove(&mut n.statements, child),
            Node::MethodCall(n) => clear(&mut n.target, child) || remove(&mut n.args, child),
            Node::If(n) => clear(&mut n.else_branch, child),
            Node::Return(n) => clear(&mut n.value, child),
            _ => false,
        }
    }
}

// ============================================================================
// Resolver annotations
// ============================================================================

/// The declaration a reference resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// A local variable or parameter ([`VarDecl`] node).
    Local(NodeId),
    /// A property of a user class.
    Property { class: NodeId, property: NodeId },
    /// A method of a user class.
    Method { class: NodeId, method: NodeId },
    /// A class name.
    Class(NodeId),
    /// The implicit `event` variable of the main function.
    Event,
    /// A field of the current event.
    EventField(String),
}

/// Type information attached by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub ty: DataType,
    pub binding: Option<Binding>,
}

impl Annotation {
    pub fn typed(ty: DataType) -> Self {
        Self { ty, binding: None }
    }

    pub fn bound(ty: DataType, binding: Binding) -> Self {
        Self {
            ty,
            binding: Some(binding),
        }
    }
}

/// Arena entry: the node plus its tree links and metadata.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) node: Node,
    pub(crate) parent: Option<NodeId>,
    pub(crate) span: Span,
    pub(crate) annotation: Option<Annotation>,
}
