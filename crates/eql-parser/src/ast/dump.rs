//! Canonical text rendering of a subtree.
//!
//! One line per node, indented two spaces per depth level, children in stored
//! order. Attribute values are always quoted and always present, so a node
//! with an empty name renders `name=''`. Tests assert this text verbatim.

use std::fmt::Write;

use super::node::{Literal, Node, NodeId};
use super::tree::Ast;

/// Render the subtree rooted at `id`.
pub fn dump(ast: &Ast, id: NodeId) -> String {
    let mut out = String::new();
    let mut pending = vec![(id, 0usize)];
    while let Some((id, depth)) = pending.pop() {
        for _ in 0..depth {
            out.push_str("  ");
        }
        write_tag(ast.get(id), &mut out);
        out.push('\n');
        pending.extend(ast.children(id).into_iter().rev().map(|child| (child, depth + 1)));
    }
    out
}

fn write_tag(node: &Node, out: &mut String) {
    // Writing into a String cannot fail.
    let _ = match node {
        Node::Module(n) => write!(out, "<module name='{}'>", escape(&n.name)),
        Node::Class(n) => write!(out, "<class name='{}'>", escape(&n.name)),
        Node::Function(n) => write!(
            out,
            "<function name='{}' return-type='{}'>",
            escape(&n.name),
            escape(&n.return_type)
        ),
        Node::Property(n) => write!(
            out,
            "<property access='{}' type='{}' name='{}'>",
            n.access.as_str(),
            escape(&n.type_name),
            escape(&n.name)
        ),
        Node::VarDecl(n) => write!(
            out,
            "<var-decl type='{}' name='{}'>",
            escape(&n.type_name),
            escape(&n.name)
        ),
        Node::Block(_) => write!(out, "<block>"),
        Node::Literal(Literal::Int(v)) => write!(out, "<int-literal value='{v}'>"),
        Node::Literal(Literal::Float(v)) => write!(out, "<float-literal value='{v:?}'>"),
        Node::Literal(Literal::Boolean(v)) => write!(out, "<boolean-literal value='{v}'>"),
        Node::Literal(Literal::String(v)) => write!(out, "<string-literal value='{}'>", escape(v)),
        Node::Literal(Literal::Null) => write!(out, "<null-literal>"),
        Node::VarRef(n) => write!(out, "<var-ref name='{}'>", escape(&n.name)),
        Node::PropertyRef(n) => write!(out, "<property-ref name='{}'>", escape(&n.name)),
        Node::MethodCall(n) => write!(out, "<method-call name='{}'>", escape(&n.name)),
        Node::Binary(n) => write!(out, "<binary-expr operator='{}'>", n.op),
        Node::Unary(n) => write!(out, "<unary-expr operator='{}'>", n.op),
        Node::Assignment(_) => write!(out, "<assignment>"),
        Node::If(_) => write!(out, "<if>"),
        Node::While(_) => write!(out, "<while>"),
        Node::Return(_) => write!(out, "<return>"),
        Node::New(n) => write!(out, "<new type='{}'>", escape(&n.type_name)),
        Node::ExprStmt(_) => write!(out, "<expr-stmt>"),
    };
}

/// Escape quotes, backslashes and control characters so each node stays on one line.
fn escape(text: &str) -> std::borrow::Cow<'_, str> {
    if !text.contains(['\'', '\\', '\n', '\t', '\r']) {
        return std::borrow::Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 2);
    for ch in text.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    std::borrow::Cow::Owned(out)
}
