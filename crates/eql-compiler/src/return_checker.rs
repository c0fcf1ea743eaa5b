//! Return path verification for non-void methods.

use eql_parser::ast::{Ast, Node, NodeId};

/// Whether every path through `stmt` ends in a `return`.
///
/// A block returns if any of its statements does; an `if` returns only when
/// both branches do. Loops never count, since their body may not run.
pub fn all_paths_return(ast: &Ast, stmt: NodeId) -> bool {
    match ast.get(stmt) {
        Node::Return(_) => true,
        Node::Block(block) => block.statements().iter().any(|&s| all_paths_return(ast, s)),
        Node::If(if_stmt) => match if_stmt.else_branch() {
            Some(else_branch) => {
                all_paths_return(ast, if_stmt.then_block()) && all_paths_return(ast, else_branch)
            }
            None => false,
        },
        _ => false,
    }
}
