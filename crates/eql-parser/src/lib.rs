//! EQL parser crate.
//!
//! This crate turns EQL source text into a syntax tree:
//! - Lexical analysis (tokenization)
//! - The arena-backed node model ([`Ast`]) and its canonical dump
//! - A recursive-descent parser with Pratt expression parsing
//!
//! # Example
//!
//! ```
//! let ast = eql_parser::parse("bar", "class Foo {}\nreturn 1;").unwrap();
//! let root = ast.root().unwrap();
//! assert!(ast.dump(root).starts_with("<module name='bar'>\n  <class name='Foo'>\n"));
//! ```

pub mod ast;
pub mod lexer;
mod parser;

use bumpalo::Bump;
use eql_core::SyntaxError;

pub use ast::{Ast, Node, NodeId, NodeKind, dump};
pub use parser::{MAX_NESTING, Parser};

/// Parse `source` as a module named `module_name`.
///
/// Returns a complete tree or the first syntax error; no partial tree is
/// ever returned.
pub fn parse(module_name: &str, source: &str) -> Result<Ast, SyntaxError> {
    let arena = Bump::new();
    Parser::new(source, &arena)?.parse_module(module_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_reports_position() {
        let err = parse("m", "class A {\n  Int x;\n  Int y\n}").unwrap_err();
        assert_eq!(err.span.line, 4);
        assert_eq!(err.span.col, 1);
    }

    proptest! {
        #[test]
        fn dump_is_deterministic(
            classes in proptest::collection::vec("[A-Z][a-z]{0,6}", 0..5),
            values in proptest::collection::vec(-1000i64..1000, 0..5),
        ) {
            let mut source = String::new();
            for name in &classes {
                source.push_str(&format!("class {name} {{ Int n; }}\n"));
            }
            for value in &values {
                source.push_str(&format!("x = x + {value} * 2;\n"));
            }
            let first = parse("p", &source).unwrap();
            let second = parse("p", &source).unwrap();
            let root = first.root().unwrap();
            prop_assert_eq!(first.dump(root), first.dump(root));
            prop_assert_eq!(first.dump(root), second.dump(second.root().unwrap()));
        }
    }
}
