//! Expression code generation.
//!
//! Every expression leaves exactly one value on the stack, except calls to
//! `Void` methods, which leave none.

use eql_core::{DataType, InternalCompilerError};
use eql_parser::ast::{BinaryOp, Binding, Literal, Node, NodeId, UnaryOp};

use super::function::FunctionCompiler;
use crate::bytecode::OpCode;

impl FunctionCompiler<'_> {
    /// Generate `expr` and return its resolved type.
    pub(super) fn expr(&mut self, expr: NodeId) -> Result<DataType, InternalCompilerError> {
        let ast = self.ast;
        let ty = self.expr_type(expr)?;
        self.emitter.set_span(ast.span(expr));

        match ast.get(expr) {
            Node::Literal(literal) => match literal {
                Literal::Int(v) => self.emitter.emit_int(*v)?,
                Literal::Float(v) => self.emitter.emit_float(*v)?,
                Literal::Boolean(v) => self.emitter.emit_bool(*v),
                Literal::String(v) => self.emitter.emit_string(v)?,
                Literal::Null => self.emitter.emit(OpCode::PushNull),
            },
            Node::VarRef(_) => match self.binding(expr)? {
                Binding::Local(decl) => {
                    let slot = self.slot(*decl)?;
                    self.emitter.emit_get_local(slot);
                }
                Binding::Property { class, property } => {
                    let field = self.field_index(*class, *property)?;
                    self.emitter.emit_get_local(0);
                    self.emitter.emit_index(OpCode::GetField, field)?;
                }
                Binding::Event => self.emitter.emit(OpCode::GetEvent),
                other => return Err(self.emitter.error(format!("variable bound to {other:?}"))),
            },
            Node::PropertyRef(prop) => {
                let binding = self.binding(expr)?;
                self.expr(prop.target())?;
                self.emitter.set_span(ast.span(expr));
                match binding {
                    Binding::Property { class, property } => {
                        let field = self.field_index(*class, *property)?;
                        self.emitter.emit_index(OpCode::GetField, field)?;
                    }
                    Binding::EventField(name) => {
                        let index = self.event_field(name, &ty);
                        self.emitter.emit_index(OpCode::GetEventField, index)?;
                    }
                    other => return Err(self.emitter.error(format!("property bound to {other:?}"))),
                }
            }
            Node::MethodCall(call) => {
                let Binding::Method { method, .. } = self.binding(expr)? else {
                    return Err(self.emitter.error(format!("call to '{}' is not bound to a method", call.name)));
                };
                let params = match ast.node_type(*method) {
                    Some(DataType::Function(signature)) => signature.params.clone(),
                    _ => return Err(self.emitter.error(format!("method '{}' has no resolved signature", call.name))),
                };
                match call.target() {
                    Some(target) => {
                        self.expr(target)?;
                    }
                    None => self.emitter.emit_get_local(0),
                }
                for (&arg, param) in call.args().iter().zip(&params) {
                    self.expr_as(arg, param)?;
                }
                let index = self.function_index(*method)?;
                self.emitter.set_span(ast.span(expr));
                self.emitter.emit_index(OpCode::Call, index)?;
            }
            Node::Binary(binary) => self.binary(binary.op, binary.lhs(), binary.rhs(), &ty)?,
            Node::Unary(unary) => {
                self.expr(unary.operand())?;
                self.emitter.set_span(ast.span(expr));
                let op = match (unary.op, &ty) {
                    (UnaryOp::Neg, DataType::Int) => OpCode::NegInt,
                    (UnaryOp::Neg, _) => OpCode::NegFloat,
                    (UnaryOp::Not, _) => OpCode::Not,
                };
                self.emitter.emit(op);
            }
            Node::New(_) => {
                let Binding::Class(class) = self.binding(expr)? else {
                    return Err(self.emitter.error("instantiation is not bound to a class"));
                };
                let index = self.class_index(*class)?;
                self.emitter.emit_index(OpCode::New, index)?;
            }
            other => {
                return Err(self.emitter.error(format!("unexpected {} in expression position", other.kind())));
            }
        }
        Ok(ty)
    }

    /// Generate `expr`, widening an `Int` result where `target` is `Float`.
    pub(super) fn expr_as(&mut self, expr: NodeId, target: &DataType) -> Result<(), InternalCompilerError> {
        let ty = self.expr(expr)?;
        if ty == DataType::Int && *target == DataType::Float {
            self.emitter.emit(OpCode::IntToFloat);
        }
        Ok(())
    }

    fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId, ty: &DataType) -> Result<(), InternalCompilerError> {
        let span = self.emitter.span();

        if op.is_logical() {
            // Short circuit: the left value is the result when it decides.
            self.expr(lhs)?;
            self.emitter.set_span(span);
            self.emitter.emit(OpCode::Dup);
            let jump = if op == BinaryOp::And { OpCode::JumpIfFalse } else { OpCode::JumpIfTrue };
            let end_label = self.emitter.emit_jump(jump);
            self.emitter.emit(OpCode::Pop);
            self.expr(rhs)?;
            self.emitter.patch_jump(end_label)?;
            return Ok(());
        }

        let left = self.expr_type(lhs)?;
        let right = self.expr_type(rhs)?;
        let operands = if left.is_numeric() && right.is_numeric() && left != right {
            DataType::Float
        } else {
            left
        };
        self.expr_as(lhs, &operands)?;
        self.expr_as(rhs, &operands)?;
        self.emitter.set_span(span);

        let opcode = if op.is_arithmetic() {
            match (op, ty) {
                (BinaryOp::Add, DataType::String) => OpCode::Concat,
                (BinaryOp::Add, DataType::Int) => OpCode::AddInt,
                (BinaryOp::Sub, DataType::Int) => OpCode::SubInt,
                (BinaryOp::Mul, DataType::Int) => OpCode::MulInt,
                (BinaryOp::Div, DataType::Int) => OpCode::DivInt,
                (BinaryOp::Mod, DataType::Int) => OpCode::ModInt,
                (BinaryOp::Add, _) => OpCode::AddFloat,
                (BinaryOp::Sub, _) => OpCode::SubFloat,
                (BinaryOp::Mul, _) => OpCode::MulFloat,
                (BinaryOp::Div, _) => OpCode::DivFloat,
                _ => OpCode::ModFloat,
            }
        } else {
            let int = operands == DataType::Int;
            match op {
                BinaryOp::Equal => OpCode::Equal,
                BinaryOp::NotEqual => OpCode::NotEqual,
                BinaryOp::Less if int => OpCode::LtInt,
                BinaryOp::LessEqual if int => OpCode::LeInt,
                BinaryOp::Greater if int => OpCode::GtInt,
                BinaryOp::GreaterEqual if int => OpCode::GeInt,
                BinaryOp::Less => OpCode::LtFloat,
                BinaryOp::LessEqual => OpCode::LeFloat,
                BinaryOp::Greater => OpCode::GtFloat,
                BinaryOp::GreaterEqual => OpCode::GeFloat,
                _ => return Err(self.emitter.error(format!("operator '{op}' has no instruction"))),
            }
        };
        self.emitter.emit(opcode);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::Compiler;
    use crate::bytecode::OpCode::{self, *};
    use eql_table::Schema;

    fn main_ops(source: &str) -> Vec<OpCode> {
        let ast = eql_parser::parse("q", source).unwrap();
        let query = Compiler::new().compile_ast(ast, &Schema::new()).unwrap();
        query.functions()[0].chunk.opcodes()
    }

    #[test]
    fn logical_and_short_circuits() {
        assert_eq!(
            main_ops("return true && false;"),
            vec![PushTrue, Dup, JumpIfFalse, Pop, PushFalse, Return, ReturnVoid]
        );
        assert_eq!(
            main_ops("return false || true;"),
            vec![PushFalse, Dup, JumpIfTrue, Pop, PushTrue, Return, ReturnVoid]
        );
    }

    #[test]
    fn mixed_comparison_widens_int_side() {
        assert_eq!(
            main_ops("return 2 < 2.5;"),
            vec![Constant, IntToFloat, Constant, LtFloat, Return, ReturnVoid]
        );
        assert_eq!(main_ops("return 2 >= 1;"), vec![Constant, PushOne, GeInt, Return, ReturnVoid]);
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(
            main_ops("return \"a\" + \"b\";"),
            vec![Constant, Constant, Concat, Return, ReturnVoid]
        );
    }

    #[test]
    fn unary_operators() {
        assert_eq!(main_ops("return -(1);"), vec![PushOne, NegInt, Return, ReturnVoid]);
        assert_eq!(main_ops("return -1;"), vec![Constant, Return, ReturnVoid]);
        assert_eq!(main_ops("return -1.5;"), vec![Constant, NegFloat, Return, ReturnVoid]);
        assert_eq!(main_ops("return !true;"), vec![PushTrue, Not, Return, ReturnVoid]);
    }

    #[test]
    fn unqualified_call_passes_receiver() {
        let ast = eql_parser::parse("q", "class A { Int f() { return g(2); } Int g(Int x) { return x; } }").unwrap();
        let query = Compiler::new().compile_ast(ast, &Schema::new()).unwrap();
        assert_eq!(
            query.functions()[0].chunk.opcodes(),
            vec![GetLocal, Constant, Call, Return, ReturnVoid]
        );
    }
}
