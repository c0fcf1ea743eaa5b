//! Name lookup by walking parent links outward from a use site.
//!
//! Lookup order, innermost first:
//! - `Block`: variables declared by statements before the one containing the use
//! - `Function`: parameters; the module's main function also provides `event`
//! - `Class`: properties (for variables) or methods (for unqualified calls)
//! - `Module`: class names
//!
//! The first match wins, so inner declarations shadow outer ones.

use eql_parser::ast::{Ast, Binding, Node, NodeId};

/// The implicit variable bound to the current event inside the main function.
pub const EVENT_VARIABLE: &str = "event";

/// Whether `function` is its module's anonymous main function.
pub fn is_main_function(ast: &Ast, function: NodeId) -> bool {
    match ast.parent(function).map(|p| ast.get(p)) {
        Some(Node::Module(module)) => module.main_function() == Some(function),
        _ => false,
    }
}

/// Resolve an identifier used as a value at `use_site`.
pub fn lookup_variable(ast: &Ast, use_site: NodeId, name: &str) -> Option<Binding> {
    let mut child = use_site;
    for ancestor in ast.ancestors(use_site) {
        match ast.get(ancestor) {
            Node::Block(block) => {
                let statements = block.statements();
                let before = statements.iter().position(|&s| s == child).unwrap_or(statements.len());
                let declared = statements[..before].iter().rev().find(|&&stmt| {
                    matches!(ast.get(stmt), Node::VarDecl(decl) if decl.name == name)
                });
                if let Some(&decl) = declared {
                    return Some(Binding::Local(decl));
                }
            }
            Node::Function(function) => {
                let param = function.params().iter().find(|&&p| ast.name(p) == Some(name));
                if let Some(&param) = param {
                    return Some(Binding::Local(param));
                }
                if name == EVENT_VARIABLE && is_main_function(ast, ancestor) {
                    return Some(Binding::Event);
                }
            }
            Node::Class(class) => {
                let property = class.properties().iter().find(|&&p| ast.name(p) == Some(name));
                if let Some(&property) = property {
                    return Some(Binding::Property {
                        class: ancestor,
                        property,
                    });
                }
            }
            Node::Module(module) => {
                let class = module.classes().iter().find(|&&c| ast.name(c) == Some(name));
                if let Some(&class) = class {
                    return Some(Binding::Class(class));
                }
            }
            _ => {}
        }
        child = ancestor;
    }
    None
}

/// Resolve an unqualified call `name(...)` against the enclosing class.
pub fn lookup_method(ast: &Ast, use_site: NodeId, name: &str) -> Option<Binding> {
    ast.ancestors(use_site).find_map(|ancestor| match ast.get(ancestor) {
        Node::Class(class) => class
            .methods()
            .iter()
            .find(|&&m| ast.name(m) == Some(name))
            .map(|&method| Binding::Method {
                class: ancestor,
                method,
            }),
        _ => None,
    })
}

/// The class whose method contains `node`, if any.
pub fn enclosing_class(ast: &Ast, node: NodeId) -> Option<NodeId> {
    ast.ancestors(node).find(|&a| matches!(ast.get(a), Node::Class(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eql_parser::ast::{Literal, Node};

    /// Find the first `VarRef` named `name` in pre-order.
    fn var_ref(ast: &Ast, name: &str) -> NodeId {
        ast.descendants(ast.root().unwrap())
            .into_iter()
            .find(|&id| matches!(ast.get(id), Node::VarRef(v) if v.name == name))
            .unwrap()
    }

    #[test]
    fn block_locals_must_precede_use() {
        let ast = eql_parser::parse("m", "Int a = b;\nInt b = 1;\nreturn b;").unwrap();
        let first = var_ref(&ast, "b");
        assert_eq!(lookup_variable(&ast, first, "b"), None);

        let main = ast.get(ast.root().unwrap()).as_module().unwrap().main_function().unwrap();
        let body = ast.get(main).as_function().unwrap().body().unwrap();
        let decl_b = ast.get(body).as_block().unwrap().statements()[1];
        let ret = ast.get(body).as_block().unwrap().statements()[2];
        let use_b = ast.get(ret).as_return().unwrap().value().unwrap();
        assert_eq!(lookup_variable(&ast, use_b, "b"), Some(Binding::Local(decl_b)));
    }

    #[test]
    fn inner_declarations_shadow_outer() {
        let ast = eql_parser::parse("m", "Int x = 1;\nif (true) { Int x = 2; return x; }").unwrap();
        let ret_x = ast
            .descendants(ast.root().unwrap())
            .into_iter()
            .filter(|&id| matches!(ast.get(id), Node::VarRef(_)))
            .last()
            .unwrap();
        let Some(Binding::Local(decl)) = lookup_variable(&ast, ret_x, "x") else {
            panic!("x should resolve to a local");
        };
        let init = ast.get(decl).as_var_decl().unwrap().initializer().unwrap();
        assert_eq!(ast.get(init).as_literal(), Some(&Literal::Int(2)));
    }

    #[test]
    fn method_scope_reaches_params_properties_and_classes() {
        let ast = eql_parser::parse(
            "m",
            "class A { Int n; Int f(Int k) { return n + k + g(); } Int g() { return 0; } }\nclass B {}",
        )
        .unwrap();
        let k = var_ref(&ast, "k");
        assert!(matches!(lookup_variable(&ast, k, "k"), Some(Binding::Local(_))));
        let n = var_ref(&ast, "n");
        assert!(matches!(lookup_variable(&ast, n, "n"), Some(Binding::Property { .. })));
        assert!(matches!(lookup_variable(&ast, n, "B"), Some(Binding::Class(_))));
        assert!(matches!(lookup_method(&ast, n, "g"), Some(Binding::Method { .. })));
        assert_eq!(lookup_variable(&ast, n, EVENT_VARIABLE), None);
        assert!(enclosing_class(&ast, n).is_some());
    }

    #[test]
    fn event_is_visible_in_main_only() {
        let ast = eql_parser::parse("m", "return event;").unwrap();
        let use_site = var_ref(&ast, "event");
        assert_eq!(lookup_variable(&ast, use_site, EVENT_VARIABLE), Some(Binding::Event));
        assert_eq!(lookup_method(&ast, use_site, "f"), None);
    }
}
