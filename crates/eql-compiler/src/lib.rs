//! EQL compiler
//!
//! Turns a parsed module into an executable query in three stages.
//!
//! ## Architecture
//!
//! - **Pass 1 (Registration)**: collect every class, property and method
//!   signature, plus the builtin `Event` class built from the table schema
//! - **Pass 2 (Resolution)**: bind every reference and annotate every node
//!   with its resolved type
//! - **Code generation**: lower the annotated tree to bytecode
//!
//! Resolution errors are collected across the whole module and returned
//! sorted by source position; code generation only runs on a clean tree.
//!
//! ## Modules
//!
//! - [`bytecode`]: OpCode, BytecodeChunk and ConstantPool
//! - [`codegen`]: tree to bytecode lowering
//! - [`emit`]: low-level bytecode emitter
//! - [`passes`]: registration and resolution
//! - [`scope`]: lexical lookup over the annotated tree
//! - [`symbols`]: class and member symbols
//! - [`vm`]: the stack machine that executes compiled queries

pub mod bytecode;
pub mod codegen;
pub mod emit;
pub mod passes;
mod query;
mod result;
mod return_checker;
pub mod scope;
pub mod symbols;
pub mod vm;

pub use codegen::CodeGenerator;
pub use passes::{RegistrationOutput, RegistrationPass, ResolutionOutput, ResolutionPass};
pub use query::{ClassLayout, CompiledFunction, CompiledQuery, DEFAULT_MAX_CALL_DEPTH, MAX_CALL_DEPTH_CEILING};
pub use result::ResultSet;
pub use symbols::SymbolTable;

use eql_core::{CompileErrors, DataType, EqlError, InternalCompilerError, Span};
use eql_parser::{Ast, NodeId};
use eql_table::Schema;
use tracing::{debug, debug_span};

/// Outcome of a successful resolution.
#[derive(Debug)]
pub struct Resolution {
    pub symbols: SymbolTable,
    /// Return type of the main function; `Void` without one.
    pub main_return_type: DataType,
}

/// The compiler entry point.
#[derive(Debug, Clone)]
pub struct Compiler {
    max_call_depth: usize,
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit on nested method calls for queries built by this compiler,
    /// clamped to `1..=MAX_CALL_DEPTH_CEILING`.
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = query::clamp_call_depth(depth);
        self
    }

    /// Resolve `module` in place against `schema`.
    ///
    /// Annotations from an earlier resolution are discarded first, so a tree
    /// can be resolved again after it was edited. On failure every error
    /// found is returned, sorted by position.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve(&self, ast: &mut Ast, module: NodeId, schema: &Schema) -> Result<Resolution, CompileErrors> {
        let _span = debug_span!("resolve", module = ast.name(module).unwrap_or_default()).entered();
        ast.clear_annotations();

        let registration = RegistrationPass::new(ast, module, schema).run();
        debug!(
            classes = registration.classes_registered,
            methods = registration.methods_registered,
            errors = registration.errors.len(),
            "registration complete"
        );

        let mut errors = registration.errors;
        let resolution = ResolutionPass::new(ast, module, &registration.symbols).run();
        debug!(
            expressions = resolution.expressions_annotated,
            errors = resolution.errors.len(),
            "resolution complete"
        );

        errors.extend(resolution.errors);
        errors.sort();
        errors.into_result()?;
        Ok(Resolution {
            symbols: registration.symbols,
            main_return_type: resolution.main_return_type,
        })
    }

    /// Resolve and generate code for the root module of `ast`.
    pub fn compile_ast(&self, mut ast: Ast, schema: &Schema) -> Result<CompiledQuery, EqlError> {
        let module = ast
            .root()
            .ok_or_else(|| InternalCompilerError::new(Span::default(), "tree has no root module"))?;
        self.resolve(&mut ast, module, schema)?;
        let query = CodeGenerator::generate(&ast, module)?;
        Ok(query.with_max_call_depth(self.max_call_depth))
    }

    /// Parse, resolve and generate code for `source`.
    pub fn compile(&self, module_name: &str, source: &str, schema: &Schema) -> Result<CompiledQuery, EqlError> {
        let ast = eql_parser::parse(module_name, source)?;
        self.compile_ast(ast, schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eql_core::CompileError;
    use pretty_assertions::assert_eq;

    #[test]
    fn errors_from_both_passes_are_sorted() {
        let source = "class A { Int x; Int x; }\nreturn y;";
        let err = Compiler::new().compile("q", source, &Schema::new()).unwrap_err();
        let EqlError::Compile(errors) = err else {
            panic!("expected compile errors, got {err:?}");
        };
        let spans: Vec<Span> = errors.iter().map(CompileError::span).collect();
        let mut sorted = spans.clone();
        sorted.sort();
        assert_eq!(spans, sorted);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors.first(), Some(CompileError::DuplicateDefinition { .. })));
    }

    #[test]
    fn resolving_twice_gives_the_same_result() {
        let mut ast = eql_parser::parse("q", "Float f = 1;\nreturn f + 2;").unwrap();
        let module = ast.root().unwrap();
        let compiler = Compiler::new();
        let first = compiler.resolve(&mut ast, module, &Schema::new()).unwrap();
        let dump = ast.dump(module);
        let second = compiler.resolve(&mut ast, module, &Schema::new()).unwrap();
        assert_eq!(first.main_return_type, DataType::Float);
        assert_eq!(second.main_return_type, DataType::Float);
        assert_eq!(ast.dump(module), dump);
    }

    #[test]
    fn syntax_errors_pass_through() {
        let err = Compiler::new().compile("q", "return 1 +;", &Schema::new()).unwrap_err();
        assert!(matches!(err, EqlError::Syntax(_)));
        assert_eq!(err.span().map(|s| s.line), Some(1));
    }

    #[test]
    fn call_depth_is_applied() {
        let query = Compiler::new()
            .with_max_call_depth(8)
            .compile("q", "return 1;", &Schema::new())
            .unwrap();
        assert_eq!(query.max_call_depth(), 8);
    }

    #[test]
    fn call_depth_is_clamped_to_the_ceiling() {
        let compile = |depth| {
            Compiler::new()
                .with_max_call_depth(depth)
                .compile("q", "return 1;", &Schema::new())
                .unwrap()
                .max_call_depth()
        };
        assert_eq!(compile(usize::MAX), MAX_CALL_DEPTH_CEILING);
        assert_eq!(compile(0), 1);
    }
}
