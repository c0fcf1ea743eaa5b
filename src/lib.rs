//! EQL: the query language of an embedded event database.
//!
//! This crate ties the pipeline together:
//!
//! - [`parse`] and [`dump`]: source text to syntax tree, and its canonical dump
//! - [`check`]: parse and resolve, reporting every resolution error
//! - [`compile`]: produce a [`CompiledQuery`] runnable against any [`Table`]
//!
//! ```
//! use eql_table::{DataKind, Event, MemoryTable, Table};
//!
//! let mut table = MemoryTable::new("users");
//! let age = table.create_property("age", DataKind::Integer, false).unwrap().id;
//! table.insert_event("u1", Event::new(1).with_value(age, 42i64)).unwrap();
//!
//! let query = eql::compile("adults", "if (event.age >= 18) { return event.id; }", table.schema()).unwrap();
//! let result = query.execute(&table).unwrap();
//! assert_eq!(result.len(), 1);
//! ```
//!
//! The `eqlc` binary exposes the same operations on the command line.

pub mod config;
pub mod logging;

pub use config::{CompilerConfig, Config, ConfigError};
pub use eql_compiler::{CompiledQuery, Compiler, Resolution, ResultSet};
pub use eql_core::{CompileError, CompileErrors, DataType, EqlError, ExecutionError, Span, SyntaxError, Value};
pub use eql_parser::{Ast, Node, NodeId, NodeKind};
pub use eql_protocol as protocol;
pub use eql_table::{MemoryTable, Schema, Table, TableDefinition};

use eql_core::InternalCompilerError;

/// Parse `source` into a tree whose root is a module named `module_name`.
pub fn parse(module_name: &str, source: &str) -> Result<Ast, EqlError> {
    Ok(eql_parser::parse(module_name, source)?)
}

/// Parse `source` and render the canonical dump of its module.
pub fn dump(module_name: &str, source: &str) -> Result<String, EqlError> {
    let ast = parse(module_name, source)?;
    Ok(ast.root().map(|root| ast.dump(root)).unwrap_or_default())
}

/// Parse and resolve `source` against `schema` without generating code.
pub fn check(module_name: &str, source: &str, schema: &Schema) -> Result<Resolution, EqlError> {
    let mut ast = parse(module_name, source)?;
    let module = root(&ast)?;
    Ok(Compiler::new().resolve(&mut ast, module, schema)?)
}

/// Compile `source` against `schema` with default compiler settings.
pub fn compile(module_name: &str, source: &str, schema: &Schema) -> Result<CompiledQuery, EqlError> {
    Compiler::new().compile(module_name, source, schema)
}

fn root(ast: &Ast) -> Result<NodeId, EqlError> {
    ast.root()
        .ok_or_else(|| InternalCompilerError::new(Span::default(), "parser returned a tree without a module").into())
}

impl From<ConfigError> for EqlError {
    fn from(error: ConfigError) -> Self {
        EqlError::Config(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_of_empty_source_is_an_empty_module() {
        assert_eq!(dump("m", "").unwrap(), "<module name='m'>\n");
    }

    #[test]
    fn check_reports_resolution_errors() {
        let err = check("m", "return nope;", &Schema::new()).unwrap_err();
        assert!(matches!(err, EqlError::Compile(_)));
        assert_eq!(err.span(), Some(Span::new(1, 8, 4)));
    }

    #[test]
    fn config_errors_convert() {
        let err: EqlError = ConfigError::Invalid("port must be non-zero".into()).into();
        assert_eq!(err.to_string(), "invalid configuration: port must be non-zero");
    }
}
