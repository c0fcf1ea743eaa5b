//! Registration pass (pass 1): classes, properties and method signatures.
//!
//! Walks the module's declarations and fills a [`SymbolTable`] without
//! looking inside method bodies. Besides class members, the pass checks
//! parameter lists and blocks for names declared twice.

use eql_core::{ClassType, CompileError, CompileErrors, DataType, EVENT_CLASS, FunctionType, Span, SymbolKind};
use eql_parser::ast::{Ast, Node, NodeId};
use eql_table::Schema;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::symbols::{ClassSymbol, FieldSymbol, MethodSymbol, SymbolTable};

/// Output of the registration pass.
#[derive(Debug, Default)]
pub struct RegistrationOutput {
    pub symbols: SymbolTable,
    pub classes_registered: usize,
    pub methods_registered: usize,
    /// Collected errors; registration continues past each one.
    pub errors: CompileErrors,
}

pub struct RegistrationPass<'a> {
    ast: &'a Ast,
    module: NodeId,
    symbols: SymbolTable,
    classes_registered: usize,
    methods_registered: usize,
    errors: CompileErrors,
}

impl<'a> RegistrationPass<'a> {
    pub fn new(ast: &'a Ast, module: NodeId, schema: &Schema) -> Self {
        Self {
            ast,
            module,
            symbols: SymbolTable::with_event_class(schema),
            classes_registered: 0,
            methods_registered: 0,
            errors: CompileErrors::new(),
        }
    }

    pub fn run(mut self) -> RegistrationOutput {
        let Node::Module(module) = self.ast.get(self.module) else {
            return self.finish();
        };
        let classes = module.classes().to_vec();
        let main = module.main_function();

        // Names first, so member types may refer to classes declared later.
        let mut registered = Vec::new();
        for &class in &classes {
            if self.register_class(class) {
                registered.push(class);
            }
        }
        for &class in &registered {
            self.register_members(class);
        }

        for &class in &classes {
            if let Node::Class(decl) = self.ast.get(class) {
                for &method in decl.methods() {
                    self.check_function_locals(method);
                }
            }
        }
        if let Some(main) = main {
            self.check_function_locals(main);
        }

        self.finish()
    }

    fn finish(self) -> RegistrationOutput {
        RegistrationOutput {
            symbols: self.symbols,
            classes_registered: self.classes_registered,
            methods_registered: self.methods_registered,
            errors: self.errors,
        }
    }

    // ==========================================================================
    // Classes
    // ==========================================================================

    fn register_class(&mut self, class: NodeId) -> bool {
        let name = self.ast.name(class).unwrap_or_default().to_string();
        let span = self.ast.span(class);

        if name == EVENT_CLASS || DataType::primitive(&name).is_some() {
            self.errors.push(CompileError::InvalidOperation {
                message: format!("class name '{name}' is reserved"),
                span,
            });
            return false;
        }
        if let Some(first) = self.symbols.class(&name) {
            self.errors.push(CompileError::DuplicateDefinition {
                kind: SymbolKind::Class,
                name,
                span,
                first: first.span,
            });
            return false;
        }

        trace!(class = %name, "registering class");
        self.symbols.insert(ClassSymbol {
            ty: ClassType::new(name),
            node: Some(class),
            span,
            fields: Vec::new(),
            methods: Vec::new(),
        });
        self.classes_registered += 1;
        true
    }

    fn register_members(&mut self, class: NodeId) {
        let Node::Class(decl) = self.ast.get(class) else {
            return;
        };
        // Properties and methods share one namespace per class.
        let mut seen: FxHashMap<&str, Span> = FxHashMap::default();
        let mut fields = Vec::new();
        let mut methods = Vec::new();

        for &property in decl.properties() {
            let Node::Property(prop) = self.ast.get(property) else {
                continue;
            };
            let span = self.ast.span(property);
            if let Some(&first) = seen.get(prop.name.as_str()) {
                self.errors.push(CompileError::DuplicateDefinition {
                    kind: SymbolKind::Property,
                    name: prop.name.clone(),
                    span,
                    first,
                });
                continue;
            }
            seen.insert(&prop.name, span);

            let ty = self.resolve_value_type(&prop.type_name, span, || {
                format!("property '{}' cannot have type Void", prop.name)
            });
            fields.push(FieldSymbol {
                name: prop.name.clone(),
                ty,
                access: prop.access,
                node: Some(property),
                span,
            });
        }

        for &method in decl.methods() {
            let Node::Function(function) = self.ast.get(method) else {
                continue;
            };
            let span = self.ast.span(method);
            if let Some(&first) = seen.get(function.name.as_str()) {
                self.errors.push(CompileError::DuplicateDefinition {
                    kind: SymbolKind::Method,
                    name: function.name.clone(),
                    span,
                    first,
                });
                continue;
            }
            seen.insert(&function.name, span);

            let signature = self.method_signature(method);
            trace!(class = %decl.name, method = %function.name, "registering method");
            methods.push(MethodSymbol {
                name: function.name.clone(),
                node: method,
                signature,
                span,
            });
            self.methods_registered += 1;
        }

        if let Some(symbol) = self.symbols.class_by_node_mut(class) {
            symbol.fields = fields;
            symbol.methods = methods;
        }
    }

    fn method_signature(&mut self, method: NodeId) -> FunctionType {
        let Node::Function(function) = self.ast.get(method) else {
            return FunctionType {
                params: Vec::new(),
                return_type: Box::new(DataType::Void),
            };
        };
        let span = self.ast.span(method);
        let return_type = self.resolve_type(&function.return_type, span);

        let mut seen: FxHashMap<&str, Span> = FxHashMap::default();
        let mut params = Vec::with_capacity(function.params().len());
        for &param in function.params() {
            let Node::VarDecl(decl) = self.ast.get(param) else {
                continue;
            };
            let param_span = self.ast.span(param);
            if let Some(&first) = seen.get(decl.name.as_str()) {
                self.errors.push(CompileError::DuplicateDefinition {
                    kind: SymbolKind::Parameter,
                    name: decl.name.clone(),
                    span: param_span,
                    first,
                });
            } else {
                seen.insert(&decl.name, param_span);
            }
            params.push(self.resolve_value_type(&decl.type_name, param_span, || {
                format!("parameter '{}' cannot have type Void", decl.name)
            }));
        }

        FunctionType {
            params,
            return_type: Box::new(return_type),
        }
    }

    // ==========================================================================
    // Locals
    // ==========================================================================

    /// Report variables declared twice in one block.
    fn check_function_locals(&mut self, function: NodeId) {
        let Some(body) = self.ast.get(function).as_function().and_then(|f| f.body()) else {
            return;
        };
        for node in self.ast.descendants(body) {
            let Node::Block(block) = self.ast.get(node) else {
                continue;
            };
            let mut seen: FxHashMap<&str, Span> = FxHashMap::default();
            for &stmt in block.statements() {
                let Node::VarDecl(decl) = self.ast.get(stmt) else {
                    continue;
                };
                let span = self.ast.span(stmt);
                if let Some(&first) = seen.get(decl.name.as_str()) {
                    self.errors.push(CompileError::DuplicateDefinition {
                        kind: SymbolKind::Variable,
                        name: decl.name.clone(),
                        span,
                        first,
                    });
                } else {
                    seen.insert(&decl.name, span);
                }
            }
        }
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    /// Resolve a declared type, recording an error for unknown names.
    ///
    /// Unknown names still yield a class type so that later lookups fail
    /// quietly instead of reporting the same name again.
    fn resolve_type(&mut self, name: &str, span: Span) -> DataType {
        match self.symbols.resolve_type(name) {
            Some(ty) => ty,
            None => {
                self.errors.push(CompileError::UnknownType {
                    name: name.to_string(),
                    span,
                });
                DataType::class(name)
            }
        }
    }

    fn resolve_value_type(&mut self, name: &str, span: Span, void_message: impl FnOnce() -> String) -> DataType {
        let ty = self.resolve_type(name, span);
        if ty.is_void() {
            self.errors.push(CompileError::InvalidOperation {
                message: void_message(),
                span,
            });
        }
        ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eql_core::CompileErrorCategory;
    use eql_table::DataKind;

    fn register(source: &str) -> RegistrationOutput {
        let ast = eql_parser::parse("m", source).unwrap();
        let mut schema = Schema::new();
        schema.add("price", DataKind::Float, false).unwrap();
        RegistrationPass::new(&ast, ast.root().unwrap(), &schema).run()
    }

    #[test]
    fn registers_classes_and_members() {
        let output = register(
            "class Order { Float total; Item first; Float add(Float x, Int n) { return total; } }
             class Item { String name; }",
        );
        assert!(output.errors.is_empty(), "{}", output.errors);
        assert_eq!(output.classes_registered, 2);
        assert_eq!(output.methods_registered, 1);

        let order = output.symbols.class("Order").unwrap();
        assert_eq!(order.field("first").unwrap().ty, DataType::class("Item"));
        let add = order.method("add").unwrap();
        assert_eq!(add.signature.params, vec![DataType::Float, DataType::Int]);
        assert_eq!(*add.signature.return_type, DataType::Float);
        assert!(output.symbols.class(EVENT_CLASS).unwrap().field("price").is_some());
    }

    #[test]
    fn duplicate_class_reports_both_positions() {
        let output = register("class Foo {}\nclass Foo {}");
        let errors = output.errors.into_vec();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            CompileError::DuplicateDefinition { kind, name, span, first } => {
                assert_eq!(*kind, SymbolKind::Class);
                assert_eq!(name, "Foo");
                assert_eq!(span.line, 2);
                assert_eq!(first.line, 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(output.classes_registered, 1);
    }

    #[test]
    fn duplicate_members() {
        let output = register("class A { Int x; String x; Void x() {} Void f(Int a, Int a) {} }");
        let kinds: Vec<SymbolKind> = output
            .errors
            .iter()
            .map(|e| match e {
                CompileError::DuplicateDefinition { kind, .. } => *kind,
                other => panic!("unexpected error {other:?}"),
            })
            .collect();
        assert_eq!(kinds, vec![SymbolKind::Property, SymbolKind::Method, SymbolKind::Parameter]);
    }

    #[test]
    fn duplicate_locals_in_one_block() {
        let output = register("Int a = 1;\nInt a = 2;\nif (true) { Int a = 3; }");
        let errors = output.errors.into_vec();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category(), CompileErrorCategory::DuplicateDefinition);
        assert_eq!(errors[0].span().line, 2);
    }

    #[test]
    fn unknown_and_reserved_types() {
        let output = register("class A { Missing m; Void v; }\nclass Event {}");
        let messages: Vec<String> = output.errors.iter().map(ToString::to_string).collect();
        assert_eq!(messages.len(), 3, "{messages:?}");
        assert!(messages[0].contains("class name 'Event' is reserved"));
        assert!(messages[1].contains("unknown type 'Missing'"));
        assert!(messages[2].contains("cannot have type Void"));
    }
}
