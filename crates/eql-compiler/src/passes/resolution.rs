//! Resolution pass (pass 2): bind every reference and type every expression.
//!
//! Runs after registration. Walks class methods in declaration order, then
//! the main function, and attaches an [`Annotation`] to:
//!
//! - every expression node (its type, plus a [`Binding`] for references)
//! - every variable declaration, parameter and property (its declared type)
//! - every function (its signature; main's return type is inferred)
//!
//! Errors are collected. An expression whose operands already failed is left
//! unannotated and reports nothing more, so one mistake yields one error.

use eql_core::{CompileError, CompileErrors, DataType, EVENT_CLASS, FunctionType, Span, SymbolKind};
use eql_parser::ast::{
    Access, Annotation, Ast, BinaryOp, Binding, Literal, Node, NodeId, UnaryOp,
};
use tracing::trace;

use crate::return_checker::all_paths_return;
use crate::scope::{self, EVENT_VARIABLE};
use crate::symbols::{ClassSymbol, SymbolTable};

/// Output of the resolution pass.
#[derive(Debug)]
pub struct ResolutionOutput {
    /// Return type of the main function; `Void` without one.
    pub main_return_type: DataType,
    pub expressions_annotated: usize,
    pub errors: CompileErrors,
}

/// What `return` statements are checked against.
enum ReturnTarget {
    Declared(DataType),
    /// Main: the first value-carrying return decides.
    Inferred(Option<DataType>),
}

pub struct ResolutionPass<'a> {
    ast: &'a mut Ast,
    symbols: &'a SymbolTable,
    module: NodeId,
    /// Class whose method is being resolved.
    current_class: Option<NodeId>,
    returns: ReturnTarget,
    expressions_annotated: usize,
    errors: CompileErrors,
}

impl<'a> ResolutionPass<'a> {
    pub fn new(ast: &'a mut Ast, module: NodeId, symbols: &'a SymbolTable) -> Self {
        Self {
            ast,
            symbols,
            module,
            current_class: None,
            returns: ReturnTarget::Declared(DataType::Void),
            expressions_annotated: 0,
            errors: CompileErrors::new(),
        }
    }

    pub fn run(mut self) -> ResolutionOutput {
        let (classes, main) = match self.ast.get(self.module) {
            Node::Module(module) => (module.classes().to_vec(), module.main_function()),
            _ => (Vec::new(), None),
        };

        for class in classes {
            self.resolve_class(class);
        }

        let main_return_type = match main {
            Some(main) => self.resolve_main(main),
            None => DataType::Void,
        };

        ResolutionOutput {
            main_return_type,
            expressions_annotated: self.expressions_annotated,
            errors: self.errors,
        }
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    fn resolve_class(&mut self, class: NodeId) {
        let symbols = self.symbols;
        // Duplicate and reserved classes were reported during registration.
        let Some(symbol) = symbols.class_by_node(class) else {
            return;
        };
        for field in &symbol.fields {
            if let Some(property) = field.node {
                self.ast.set_annotation(property, Annotation::typed(field.ty.clone()));
            }
        }

        self.current_class = Some(class);
        for method in &symbol.methods {
            trace!(class = %symbol.name(), method = %method.name, "resolving method");
            self.resolve_method(method.node, &method.name, &method.signature);
        }
        self.current_class = None;
    }

    fn resolve_method(&mut self, method: NodeId, name: &str, signature: &FunctionType) {
        let (params, body) = match self.ast.get(method) {
            Node::Function(function) => (function.params().to_vec(), function.body()),
            _ => return,
        };
        for (&param, ty) in params.iter().zip(&signature.params) {
            self.ast.set_annotation(param, Annotation::typed(ty.clone()));
        }
        self.ast
            .set_annotation(method, Annotation::typed(DataType::Function(signature.clone())));

        let Some(body) = body else {
            return;
        };
        self.returns = ReturnTarget::Declared((*signature.return_type).clone());
        self.resolve_statement(body);

        if !signature.return_type.is_void() && !all_paths_return(self.ast, body) {
            self.errors.push(CompileError::InvalidOperation {
                message: format!("method '{name}' does not return a value on every path"),
                span: self.ast.span(method),
            });
        }
    }

    fn resolve_main(&mut self, main: NodeId) -> DataType {
        self.returns = ReturnTarget::Inferred(None);
        if let Some(body) = self.ast.get(main).as_function().and_then(|f| f.body()) {
            self.resolve_statement(body);
        }
        let return_type = match std::mem::replace(&mut self.returns, ReturnTarget::Declared(DataType::Void)) {
            ReturnTarget::Inferred(Some(ty)) => ty,
            _ => DataType::Void,
        };
        self.ast.set_annotation(
            main,
            Annotation::typed(DataType::function(Vec::new(), return_type.clone())),
        );
        return_type
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn resolve_statement(&mut self, stmt: NodeId) {
        let span = self.ast.span(stmt);
        match self.ast.get(stmt) {
            Node::Block(block) => {
                for statement in block.statements().to_vec() {
                    self.resolve_statement(statement);
                }
            }
            Node::VarDecl(decl) => {
                let type_name = decl.type_name.clone();
                let name = decl.name.clone();
                let initializer = decl.initializer();
                self.resolve_var_decl(stmt, &type_name, &name, initializer, span);
            }
            Node::Assignment(assignment) => {
                let (target, value) = (assignment.target(), assignment.value());
                self.resolve_assignment(target, value);
            }
            Node::If(if_stmt) => {
                let (condition, then_block, else_branch) =
                    (if_stmt.condition(), if_stmt.then_block(), if_stmt.else_branch());
                self.expect_boolean(condition, "if condition");
                self.resolve_statement(then_block);
                if let Some(else_branch) = else_branch {
                    self.resolve_statement(else_branch);
                }
            }
            Node::While(while_stmt) => {
                let (condition, body) = (while_stmt.condition(), while_stmt.body());
                self.expect_boolean(condition, "while condition");
                self.resolve_statement(body);
            }
            Node::Return(ret) => {
                let value = ret.value();
                self.resolve_return(value, span);
            }
            Node::ExprStmt(expr_stmt) => {
                let expr = expr_stmt.expr();
                self.resolve_expr(expr);
            }
            _ => {}
        }
    }

    fn resolve_var_decl(
        &mut self,
        decl: NodeId,
        type_name: &str,
        name: &str,
        initializer: Option<NodeId>,
        span: Span,
    ) {
        let declared = match self.symbols.resolve_type(type_name) {
            Some(DataType::Void) => {
                self.errors.push(CompileError::InvalidOperation {
                    message: format!("variable '{name}' cannot have type Void"),
                    span,
                });
                None
            }
            Some(ty) => Some(ty),
            None => {
                self.errors.push(CompileError::UnknownType {
                    name: type_name.to_string(),
                    span,
                });
                None
            }
        };
        if let Some(ty) = &declared {
            self.ast.set_annotation(decl, Annotation::typed(ty.clone()));
        }

        if let Some(init) = initializer {
            let actual = self.resolve_expr(init);
            if let (Some(expected), Some(actual)) = (declared, actual) {
                self.check_assignable(&actual, &expected, &format!("initialization of '{name}'"), init);
            }
        }
    }

    fn resolve_assignment(&mut self, target: NodeId, value: NodeId) {
        let target_ty = self.resolve_expr(target);
        let value_ty = self.resolve_expr(value);

        let read_only = match self.ast.annotation(target).and_then(|a| a.binding.as_ref()) {
            Some(Binding::Event) => Some(format!("cannot assign to '{EVENT_VARIABLE}'")),
            Some(Binding::EventField(field)) => Some(format!("event property '{field}' is read-only")),
            _ => None,
        };
        if let Some(message) = read_only {
            self.errors.push(CompileError::InvalidOperation {
                message,
                span: self.ast.span(target),
            });
            return;
        }

        if let (Some(target_ty), Some(value_ty)) = (target_ty, value_ty) {
            self.check_assignable(&value_ty, &target_ty, "assignment", value);
        }
    }

    fn resolve_return(&mut self, value: Option<NodeId>, span: Span) {
        let actual = match value {
            Some(value) => match self.resolve_expr(value) {
                Some(ty) => Some(ty),
                None => return,
            },
            None => None,
        };

        match &mut self.returns {
            ReturnTarget::Declared(expected) => {
                let expected = expected.clone();
                match (actual, value) {
                    (None, _) if !expected.is_void() => {
                        self.errors
                            .push(CompileError::type_mismatch("return", &expected, DataType::Void, span));
                    }
                    (Some(actual), Some(value)) if expected.is_void() => {
                        self.errors.push(CompileError::type_mismatch(
                            "return",
                            DataType::Void,
                            actual,
                            self.ast.span(value),
                        ));
                    }
                    (Some(actual), Some(value)) => {
                        self.check_assignable(&actual, &expected, "return", value);
                    }
                    _ => {}
                }
            }
            ReturnTarget::Inferred(inferred) => {
                // A bare `return;` in main ends the event without a row.
                let (Some(actual), Some(value)) = (actual, value) else {
                    return;
                };
                if actual.is_void() {
                    let span = self.ast.span(value);
                    self.errors.push(CompileError::InvalidOperation {
                        message: "cannot return the result of a Void call".to_string(),
                        span,
                    });
                    return;
                }
                match inferred {
                    None => *inferred = Some(actual),
                    Some(first) => {
                        let first = first.clone();
                        self.check_assignable(&actual, &first, "return", value);
                    }
                }
            }
        }
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    /// Resolve `expr`, annotate it, and return its type.
    fn resolve_expr(&mut self, expr: NodeId) -> Option<DataType> {
        let annotation = self.infer(expr)?;
        let ty = annotation.ty.clone();
        self.ast.set_annotation(expr, annotation);
        self.expressions_annotated += 1;
        Some(ty)
    }

    fn infer(&mut self, expr: NodeId) -> Option<Annotation> {
        let span = self.ast.span(expr);
        match self.ast.get(expr) {
            Node::Literal(literal) => Some(Annotation::typed(match literal {
                Literal::Int(_) => DataType::Int,
                Literal::Float(_) => DataType::Float,
                Literal::Boolean(_) => DataType::Boolean,
                Literal::String(_) => DataType::String,
                Literal::Null => DataType::Null,
            })),
            Node::VarRef(var) => {
                let name = var.name.clone();
                self.infer_var_ref(expr, &name, span)
            }
            Node::PropertyRef(prop) => {
                let (target, name) = (prop.target(), prop.name.clone());
                self.infer_property_ref(target, &name, span)
            }
            Node::MethodCall(call) => {
                let (target, name, args) = (call.target(), call.name.clone(), call.args().to_vec());
                self.infer_call(expr, target, &name, &args, span)
            }
            Node::Binary(binary) => {
                let (op, lhs, rhs) = (binary.op, binary.lhs(), binary.rhs());
                self.infer_binary(op, lhs, rhs, span)
            }
            Node::Unary(unary) => {
                let (op, operand) = (unary.op, unary.operand());
                self.infer_unary(op, operand, span)
            }
            Node::New(new) => {
                let type_name = new.type_name.clone();
                self.infer_new(&type_name, span)
            }
            _ => None,
        }
    }

    fn infer_var_ref(&mut self, expr: NodeId, name: &str, span: Span) -> Option<Annotation> {
        match scope::lookup_variable(self.ast, expr, name) {
            Some(Binding::Local(decl)) => {
                // Declarations with an unknown type were already reported.
                let ty = self.ast.node_type(decl)?.clone();
                Some(Annotation::bound(ty, Binding::Local(decl)))
            }
            Some(Binding::Property { class, property }) => {
                let field = self
                    .symbols
                    .class_by_node(class)?
                    .fields
                    .iter()
                    .find(|f| f.node == Some(property))?;
                Some(Annotation::bound(
                    field.ty.clone(),
                    Binding::Property { class, property },
                ))
            }
            Some(Binding::Event) => {
                let event = self.symbols.class(EVENT_CLASS)?;
                Some(Annotation::bound(DataType::Class(event.ty.clone()), Binding::Event))
            }
            Some(Binding::Class(_)) => {
                self.errors.push(CompileError::InvalidOperation {
                    message: format!("class '{name}' cannot be used as a value"),
                    span,
                });
                None
            }
            Some(_) => None,
            None => {
                self.errors.push(CompileError::UnresolvedSymbol {
                    name: name.to_string(),
                    span,
                });
                None
            }
        }
    }

    fn infer_property_ref(&mut self, target: NodeId, name: &str, span: Span) -> Option<Annotation> {
        let target_ty = self.resolve_expr(target)?;
        let class = self.member_owner(&target_ty, "property", name, span)?;

        let Some(field) = class.field(name) else {
            self.errors.push(CompileError::UnknownMember {
                owner: class.name().to_string(),
                kind: SymbolKind::Property,
                name: name.to_string(),
                span,
            });
            return None;
        };

        if field.access == Access::Private && class.node != self.current_class {
            self.errors.push(CompileError::InvalidOperation {
                message: format!("property '{name}' of '{}' is private", class.name()),
                span,
            });
            return None;
        }

        let binding = match (class.node, field.node) {
            (Some(class), Some(property)) => Binding::Property { class, property },
            _ => Binding::EventField(name.to_string()),
        };
        Some(Annotation::bound(field.ty.clone(), binding))
    }

    fn infer_call(
        &mut self,
        expr: NodeId,
        target: Option<NodeId>,
        name: &str,
        args: &[NodeId],
        span: Span,
    ) -> Option<Annotation> {
        let target_ty = target.map(|t| self.resolve_expr(t));
        let arg_types: Vec<Option<DataType>> = args.iter().map(|&arg| self.resolve_expr(arg)).collect();

        let method = match target_ty {
            Some(None) => return None,
            Some(Some(target_ty)) => {
                let class = self.member_owner(&target_ty, "method", name, span)?;
                let Some(method) = class.method(name) else {
                    self.errors.push(CompileError::UnknownMember {
                        owner: class.name().to_string(),
                        kind: SymbolKind::Method,
                        name: name.to_string(),
                        span,
                    });
                    return None;
                };
                (class.node?, method)
            }
            None => {
                let symbols = self.symbols;
                let Some(Binding::Method { class, method }) = scope::lookup_method(self.ast, expr, name) else {
                    self.errors.push(CompileError::UnresolvedSymbol {
                        name: name.to_string(),
                        span,
                    });
                    return None;
                };
                let symbol = symbols.class_by_node(class)?.methods.iter().find(|m| m.node == method)?;
                (class, symbol)
            }
        };
        let (class, method) = method;

        let params = &method.signature.params;
        if params.len() != args.len() {
            self.errors.push(CompileError::ArgumentCount {
                name: name.to_string(),
                expected: params.len(),
                actual: args.len(),
                span,
            });
            return None;
        }
        for (index, ((&arg, actual), expected)) in args.iter().zip(&arg_types).zip(params).enumerate() {
            if let Some(actual) = actual {
                let context = format!("argument {} of '{name}'", index + 1);
                self.check_assignable(actual, expected, &context, arg);
            }
        }

        Some(Annotation::bound(
            (*method.signature.return_type).clone(),
            Binding::Method {
                class,
                method: method.node,
            },
        ))
    }

    fn infer_binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId, span: Span) -> Option<Annotation> {
        let left = self.resolve_expr(lhs);
        let right = self.resolve_expr(rhs);
        let (left, right) = (left?, right?);

        let result = if op.is_arithmetic() {
            match (&left, &right) {
                (DataType::Int, DataType::Int) => Some(DataType::Int),
                (l, r) if l.is_numeric() && r.is_numeric() => Some(DataType::Float),
                (DataType::String, DataType::String) if op == BinaryOp::Add => Some(DataType::String),
                _ => None,
            }
        } else if op.is_relational() {
            (left.is_numeric() && right.is_numeric()).then_some(DataType::Boolean)
        } else if op.is_equality() {
            comparable(&left, &right).then_some(DataType::Boolean)
        } else {
            (left == DataType::Boolean && right == DataType::Boolean).then_some(DataType::Boolean)
        };

        match result {
            Some(ty) => Some(Annotation::typed(ty)),
            None => {
                self.errors.push(CompileError::InvalidOperation {
                    message: format!("operator '{op}' cannot be applied to '{left}' and '{right}'"),
                    span,
                });
                None
            }
        }
    }

    fn infer_unary(&mut self, op: UnaryOp, operand: NodeId, span: Span) -> Option<Annotation> {
        let ty = self.resolve_expr(operand)?;
        let valid = match op {
            UnaryOp::Neg => ty.is_numeric(),
            UnaryOp::Not => ty == DataType::Boolean,
        };
        if !valid {
            self.errors.push(CompileError::InvalidOperation {
                message: format!("operator '{}' cannot be applied to '{ty}'", op.as_str()),
                span,
            });
            return None;
        }
        Some(Annotation::typed(ty))
    }

    fn infer_new(&mut self, type_name: &str, span: Span) -> Option<Annotation> {
        let Some(class) = self.symbols.class(type_name) else {
            let error = if DataType::primitive(type_name).is_some() {
                CompileError::InvalidOperation {
                    message: format!("cannot instantiate primitive type '{type_name}'"),
                    span,
                }
            } else {
                CompileError::UnknownType {
                    name: type_name.to_string(),
                    span,
                }
            };
            self.errors.push(error);
            return None;
        };
        let Some(node) = class.node else {
            self.errors.push(CompileError::InvalidOperation {
                message: format!("cannot instantiate builtin class '{type_name}'"),
                span,
            });
            return None;
        };
        Some(Annotation::bound(DataType::Class(class.ty.clone()), Binding::Class(node)))
    }

    // ==========================================================================
    // Helpers
    // ==========================================================================

    /// The registered class owning a member accessed on `target_ty`.
    fn member_owner(
        &mut self,
        target_ty: &DataType,
        member: &str,
        name: &str,
        span: Span,
    ) -> Option<&'a ClassSymbol> {
        if !target_ty.is_class() {
            self.errors.push(CompileError::InvalidOperation {
                message: format!("cannot access {member} '{name}' on a value of type '{target_ty}'"),
                span,
            });
            return None;
        }
        // Unknown class names were reported where they were declared.
        let symbols = self.symbols;
        symbols.class_of(target_ty)
    }

    fn expect_boolean(&mut self, condition: NodeId, context: &str) {
        if let Some(ty) = self.resolve_expr(condition)
            && ty != DataType::Boolean
        {
            self.errors.push(CompileError::type_mismatch(
                context,
                DataType::Boolean,
                ty,
                self.ast.span(condition),
            ));
        }
    }

    fn check_assignable(&mut self, actual: &DataType, expected: &DataType, context: &str, at: NodeId) {
        if !actual.is_assignable_to(expected) {
            self.errors.push(CompileError::type_mismatch(
                context,
                expected,
                actual,
                self.ast.span(at),
            ));
        }
    }
}

/// Operand types `==` and `!=` accept.
fn comparable(left: &DataType, right: &DataType) -> bool {
    match (left, right) {
        (l, r) if l == r => !l.is_void(),
        (l, r) if l.is_numeric() && r.is_numeric() => true,
        (DataType::Null, DataType::Class(_)) | (DataType::Class(_), DataType::Null) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::RegistrationPass;
    use eql_table::{DataKind, Schema};
    use pretty_assertions::assert_eq;

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema.add("price", DataKind::Float, false).unwrap();
        schema.add("plan", DataKind::Factor, false).unwrap();
        schema
    }

    fn resolve(source: &str) -> (Ast, ResolutionOutput) {
        let mut ast = eql_parser::parse("q", source).unwrap();
        let module = ast.root().unwrap();
        let registration = RegistrationPass::new(&ast, module, &schema()).run();
        assert!(registration.errors.is_empty(), "{}", registration.errors);
        let output = ResolutionPass::new(&mut ast, module, &registration.symbols).run();
        (ast, output)
    }

    fn messages(source: &str) -> Vec<String> {
        let (_, output) = resolve(source);
        output.errors.iter().map(ToString::to_string).collect()
    }

    fn first_of(ast: &Ast, pred: impl Fn(&Node) -> bool) -> NodeId {
        ast.descendants(ast.root().unwrap())
            .into_iter()
            .find(|&id| pred(ast.get(id)))
            .unwrap()
    }

    #[test]
    fn every_expression_is_typed() {
        let (ast, output) = resolve("Int a = 1;\nFloat b = a * 2.0;\nreturn b > 3 && !false;");
        assert!(output.errors.is_empty(), "{}", output.errors);
        assert_eq!(output.main_return_type, DataType::Boolean);
        for id in ast.descendants(ast.root().unwrap()) {
            if ast.kind(id).is_expression() {
                assert!(ast.node_type(id).is_some(), "{id:?} is untyped");
            }
        }
        let product = first_of(&ast, |n| matches!(n, Node::Binary(b) if b.op == BinaryOp::Mul));
        assert_eq!(ast.node_type(product), Some(&DataType::Float));
    }

    #[test]
    fn references_are_bound() {
        let (ast, output) = resolve(
            "class Counter { Int n; Int bump(Int by) { n = n + by; return n; } }
             Counter c = new Counter();
             c.bump(2);
             return event.price;",
        );
        assert!(output.errors.is_empty(), "{}", output.errors);

        let field = first_of(&ast, |n| matches!(n, Node::VarRef(v) if v.name == "n"));
        assert!(matches!(
            ast.annotation(field).unwrap().binding,
            Some(Binding::Property { .. })
        ));
        let call = first_of(&ast, |n| matches!(n, Node::MethodCall(_)));
        assert!(matches!(ast.annotation(call).unwrap().binding, Some(Binding::Method { .. })));
        let price = first_of(&ast, |n| matches!(n, Node::PropertyRef(p) if p.name == "price"));
        assert_eq!(
            ast.annotation(price).unwrap().binding,
            Some(Binding::EventField("price".into()))
        );
        assert_eq!(output.main_return_type, DataType::Float);
    }

    #[test]
    fn function_nodes_carry_signatures() {
        let (ast, _) = resolve("class A { Float f(Int x) { return x; } }\nreturn 1;");
        let method = first_of(&ast, |n| matches!(n, Node::Function(f) if f.name == "f"));
        assert_eq!(
            ast.node_type(method),
            Some(&DataType::function(vec![DataType::Int], DataType::Float))
        );
    }

    #[test]
    fn unresolved_identifier_reports_once() {
        let errors = messages("Int x = missing + 1;");
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("unresolved identifier 'missing'"));
    }

    #[test]
    fn type_mismatch_contexts() {
        let errors = messages(
            "Int x = 1.5;
             x = \"s\";
             if (x) { }
             while (1.0) { }",
        );
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors[0].contains("initialization of 'x'"));
        assert!(errors[1].contains("in assignment"));
        assert!(errors[2].contains("if condition"));
        assert!(errors[3].contains("while condition"));
    }

    #[test]
    fn invalid_operators() {
        let errors = messages("Boolean b = true + 1;\nInt n = -\"s\";\nBoolean c = 1 && true;");
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors[0].contains("operator '+' cannot be applied to 'Boolean' and 'Int'"));
        assert!(errors[1].contains("operator '-' cannot be applied to 'String'"));
        assert!(errors[2].contains("operator '&&'"));
    }

    #[test]
    fn member_errors() {
        let errors = messages(
            "class A { private Int secret; Int f(Int x) { return x; } }
             A a = new A();
             Int s = a.secret;
             a.g();
             a.f(1, 2);
             a.f(true);
             Int n = 1;
             n.x;",
        );
        assert_eq!(errors.len(), 5, "{errors:?}");
        assert!(errors[0].contains("private"));
        assert!(errors[1].contains("has no method named 'g'"));
        assert!(errors[2].contains("expects 1 argument(s), found 2"));
        assert!(errors[3].contains("argument 1 of 'f'"));
        assert!(errors[4].contains("on a value of type 'Int'"));
    }

    #[test]
    fn instantiation_rules() {
        let errors = messages("Int a = new Int();\nEvent e = new Event();\nnew Nope();");
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors[0].contains("cannot instantiate primitive type 'Int'"));
        assert!(errors[1].contains("cannot instantiate builtin class 'Event'"));
        assert!(errors[2].contains("unknown type 'Nope'"));
    }

    #[test]
    fn event_is_read_only() {
        let errors = messages("event.price = 1.0;\nevent = null;");
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert!(errors[0].contains("event property 'price' is read-only"));
        assert!(errors[1].contains("cannot assign to 'event'"));
    }

    #[test]
    fn main_return_type_is_inferred_from_first_return() {
        let (_, output) = resolve("if (event.price > 1.0) { return 1; }\nreturn;");
        assert!(output.errors.is_empty(), "{}", output.errors);
        assert_eq!(output.main_return_type, DataType::Int);

        let errors = messages("if (true) { return 1; }\nreturn \"no\";");
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("expected 'Int', found 'String'"));
    }

    #[test]
    fn method_returns() {
        let errors = messages(
            "class A {
                 Int f(Boolean b) { if (b) { return 1; } }
                 Void g() { return 1; }
                 Int h() { return; }
             }",
        );
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors[0].contains("does not return a value on every path"));
        assert!(errors[1].contains("expected 'Void', found 'Int'"));
        assert!(errors[2].contains("expected 'Int', found 'Void'"));
    }

    #[test]
    fn class_name_is_not_a_value() {
        let errors = messages("class A {}\nreturn A;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("class 'A' cannot be used as a value"));
    }

    #[test]
    fn null_compares_with_classes() {
        let (_, output) = resolve("class A {}\nA a = null;\nreturn a == null;");
        assert!(output.errors.is_empty(), "{}", output.errors);
        assert_eq!(output.main_return_type, DataType::Boolean);
    }
}
