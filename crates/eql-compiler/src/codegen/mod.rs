//! Code generation: lower a resolved tree into a [`CompiledQuery`].
//!
//! The generator trusts the resolver. It reads types and bindings only from
//! the annotations on the tree and never repeats a lookup; a node the
//! resolver left bare is reported as an [`InternalCompilerError`].
//!
//! Function indices: the main function (if any) is 0, then every method in
//! class and declaration order. Class indices follow declaration order.

mod expr;
mod function;

use eql_core::{DataType, InternalCompilerError};
use eql_parser::ast::{Ast, Node, NodeId};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::bytecode::ConstantPool;
use crate::query::{ClassLayout, CompiledQuery, DEFAULT_MAX_CALL_DEPTH};
use function::FunctionCompiler;

/// Index tables shared by every function of one query.
#[derive(Debug, Default)]
struct Layout {
    functions: FxHashMap<NodeId, usize>,
    classes: FxHashMap<NodeId, usize>,
}

pub struct CodeGenerator;

impl CodeGenerator {
    /// Generate the query for `module`, which must have been resolved.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn generate(ast: &Ast, module: NodeId) -> Result<CompiledQuery, InternalCompilerError> {
        let Node::Module(module_node) = ast.get(module) else {
            return Err(InternalCompilerError::new(ast.span(module), "code generation needs a module node"));
        };

        let mut layout = Layout::default();
        let mut function_nodes = Vec::new();
        let main = module_node.main_function();
        if let Some(main) = main {
            layout.functions.insert(main, function_nodes.len());
            function_nodes.push(main);
        }
        for (index, &class) in module_node.classes().iter().enumerate() {
            layout.classes.insert(class, index);
            if let Node::Class(decl) = ast.get(class) {
                for &method in decl.methods() {
                    layout.functions.insert(method, function_nodes.len());
                    function_nodes.push(method);
                }
            }
        }

        let classes = module_node
            .classes()
            .iter()
            .map(|&class| class_layout(ast, class))
            .collect::<Result<Vec<_>, _>>()?;

        let mut constants = ConstantPool::new();
        let mut event_fields = Vec::new();
        let mut functions = Vec::with_capacity(function_nodes.len());
        for &function in &function_nodes {
            let compiler = FunctionCompiler::new(ast, &layout, &mut constants, &mut event_fields);
            functions.push(compiler.compile(function)?);
        }

        let return_type = match main {
            Some(main) => function_return_type(ast, main)?,
            None => DataType::Void,
        };

        debug!(
            module = %module_node.name,
            functions = functions.len(),
            constants = constants.len(),
            "generated bytecode"
        );

        Ok(CompiledQuery {
            module: module_node.name.clone(),
            main: main.map(|_| 0),
            functions,
            classes,
            constants,
            event_fields,
            return_type,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        })
    }
}

fn class_layout(ast: &Ast, class: NodeId) -> Result<ClassLayout, InternalCompilerError> {
    let Node::Class(decl) = ast.get(class) else {
        return Err(InternalCompilerError::new(ast.span(class), "expected a class node"));
    };
    let fields = decl
        .properties()
        .iter()
        .map(|&property| {
            let name = ast.name(property).unwrap_or_default().to_string();
            match ast.node_type(property) {
                Some(ty) => Ok((name, ty.clone())),
                None => Err(InternalCompilerError::new(
                    ast.span(property),
                    format!("property '{name}' has no resolved type"),
                )),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ClassLayout {
        name: decl.name.clone(),
        fields,
    })
}

/// Declared (or, for main, inferred) return type from a function's annotation.
fn function_return_type(ast: &Ast, function: NodeId) -> Result<DataType, InternalCompilerError> {
    match ast.node_type(function) {
        Some(DataType::Function(signature)) => Ok((*signature.return_type).clone()),
        _ => Err(InternalCompilerError::new(
            ast.span(function),
            format!("function '{}' has no resolved signature", ast.name(function).unwrap_or_default()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::OpCode;
    use crate::Compiler;
    use eql_table::Schema;

    fn generate(source: &str) -> CompiledQuery {
        let mut ast = eql_parser::parse("q", source).unwrap();
        let module = ast.root().unwrap();
        Compiler::new().resolve(&mut ast, module, &Schema::new()).unwrap();
        CodeGenerator::generate(&ast, module).unwrap()
    }

    #[test]
    fn main_function_is_index_zero() {
        let query = generate("class A { Int f() { return 1; } Int g() { return 2; } }\nreturn 3;");
        let names: Vec<&str> = query.functions().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["", "A.f", "A.g"]);
        assert_eq!(query.functions()[1].arity, 1);
        assert_eq!(query.return_type(), &DataType::Int);
    }

    #[test]
    fn simple_return() {
        let query = generate("Int x = 2;\nreturn x * 21;");
        query.functions()[0].chunk.assert_opcodes(&[
            OpCode::Constant,
            OpCode::SetLocal,
            OpCode::GetLocal,
            OpCode::Constant,
            OpCode::MulInt,
            OpCode::Return,
            OpCode::ReturnVoid,
        ]);
        assert_eq!(query.functions()[0].local_count, 1);
    }

    #[test]
    fn class_layouts_follow_declaration_order() {
        let query = generate("class P { String name; Float score; }\nreturn new P();");
        assert_eq!(
            query.classes(),
            &[ClassLayout {
                name: "P".into(),
                fields: vec![("name".into(), DataType::String), ("score".into(), DataType::Float)],
            }]
        );
        assert_eq!(query.columns(), vec!["id", "timestamp", "name", "score"]);
    }

    #[test]
    fn unresolved_tree_is_an_internal_error() {
        let ast = eql_parser::parse("q", "return 1;").unwrap();
        let err = CodeGenerator::generate(&ast, ast.root().unwrap()).unwrap_err();
        assert!(err.message.contains("no resolved"), "{}", err.message);
        assert_eq!(err.span.line, 1);
    }

    #[test]
    fn empty_module_has_no_main() {
        let query = generate("class A {}");
        assert!(query.functions().is_empty());
        assert_eq!(query.return_type(), &DataType::Void);
        assert_eq!(query.columns(), vec!["id", "timestamp", "value"]);
    }
}
