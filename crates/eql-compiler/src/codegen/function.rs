//! Per-function code generation: frames, slots and statements.

use eql_core::{DataType, InternalCompilerError};
use eql_parser::ast::{Ast, Binding, Node, NodeId};
use rustc_hash::FxHashMap;

use super::{Layout, function_return_type};
use crate::bytecode::{ConstantPool, OpCode};
use crate::emit::BytecodeEmitter;
use crate::query::CompiledFunction;
use crate::scope::is_main_function;

/// Compiles one function body.
pub(super) struct FunctionCompiler<'a> {
    pub(super) ast: &'a Ast,
    pub(super) layout: &'a Layout,
    pub(super) emitter: BytecodeEmitter<'a>,
    pub(super) event_fields: &'a mut Vec<(String, DataType)>,
    /// Slot of every parameter and local declared so far.
    slots: FxHashMap<NodeId, u32>,
    next_slot: usize,
    return_type: DataType,
}

impl<'a> FunctionCompiler<'a> {
    pub(super) fn new(
        ast: &'a Ast,
        layout: &'a Layout,
        constants: &'a mut ConstantPool,
        event_fields: &'a mut Vec<(String, DataType)>,
    ) -> Self {
        Self {
            ast,
            layout,
            emitter: BytecodeEmitter::new(constants),
            event_fields,
            slots: FxHashMap::default(),
            next_slot: 0,
            return_type: DataType::Void,
        }
    }

    pub(super) fn compile(mut self, function: NodeId) -> Result<CompiledFunction, InternalCompilerError> {
        let ast = self.ast;
        self.emitter.set_span(ast.span(function));
        let Node::Function(decl) = ast.get(function) else {
            return Err(self.emitter.error("expected a function node"));
        };
        self.return_type = function_return_type(ast, function)?;

        let name = if is_main_function(ast, function) {
            String::new()
        } else {
            // Slot 0 holds the receiver.
            self.next_slot = 1;
            let class = ast.parent(function).and_then(|c| ast.name(c)).unwrap_or_default();
            format!("{class}.{}", decl.name)
        };
        for &param in decl.params() {
            self.allocate(param)?;
        }
        let arity = self.next_slot;

        if let Some(body) = decl.body() {
            self.statement(body)?;
        }
        self.emitter.emit(OpCode::ReturnVoid);

        Ok(CompiledFunction {
            name,
            arity,
            local_count: self.next_slot,
            chunk: self.emitter.finish(),
        })
    }

    fn allocate(&mut self, decl: NodeId) -> Result<u32, InternalCompilerError> {
        let slot = u32::try_from(self.next_slot)
            .map_err(|_| self.emitter.error("function needs more than u32::MAX local slots"))?;
        self.next_slot += 1;
        self.slots.insert(decl, slot);
        Ok(slot)
    }

    pub(super) fn slot(&self, decl: NodeId) -> Result<u32, InternalCompilerError> {
        self.slots
            .get(&decl)
            .copied()
            .ok_or_else(|| self.emitter.error("local variable used before its declaration"))
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn statement(&mut self, stmt: NodeId) -> Result<(), InternalCompilerError> {
        let ast = self.ast;
        self.emitter.set_span(ast.span(stmt));
        match ast.get(stmt) {
            Node::Block(block) => {
                for &statement in block.statements() {
                    self.statement(statement)?;
                }
            }
            Node::VarDecl(decl) => {
                let ty = self.declared_type(stmt)?;
                match decl.initializer() {
                    Some(init) => self.expr_as(init, &ty)?,
                    None => self.default_value(&ty)?,
                }
                let slot = self.allocate(stmt)?;
                self.emitter.emit_set_local(slot);
            }
            Node::Assignment(assignment) => self.assignment(assignment.target(), assignment.value())?,
            Node::If(if_stmt) => {
                self.condition(if_stmt.condition())?;
                let else_label = self.emitter.emit_jump(OpCode::JumpIfFalse);
                self.statement(if_stmt.then_block())?;
                match if_stmt.else_branch() {
                    Some(else_branch) => {
                        let end_label = self.emitter.emit_jump(OpCode::Jump);
                        self.emitter.patch_jump(else_label)?;
                        self.statement(else_branch)?;
                        self.emitter.patch_jump(end_label)?;
                    }
                    None => self.emitter.patch_jump(else_label)?,
                }
            }
            Node::While(while_stmt) => {
                let loop_start = self.emitter.current_offset();
                self.condition(while_stmt.condition())?;
                let exit_label = self.emitter.emit_jump(OpCode::JumpIfFalse);
                self.statement(while_stmt.body())?;
                self.emitter.set_span(ast.span(stmt));
                self.emitter.emit_loop(loop_start)?;
                self.emitter.patch_jump(exit_label)?;
            }
            Node::Return(ret) => match ret.value() {
                Some(value) => {
                    let return_type = self.return_type.clone();
                    self.expr_as(value, &return_type)?;
                    self.emitter.emit(OpCode::Return);
                }
                None => self.emitter.emit(OpCode::ReturnVoid),
            },
            Node::ExprStmt(expr_stmt) => {
                let ty = self.expr(expr_stmt.expr())?;
                if !ty.is_void() {
                    self.emitter.emit(OpCode::Pop);
                }
            }
            other => {
                return Err(self.emitter.error(format!("unexpected {} in statement position", other.kind())));
            }
        }
        Ok(())
    }

    fn condition(&mut self, condition: NodeId) -> Result<(), InternalCompilerError> {
        self.expr(condition)?;
        self.emitter.set_span(self.ast.span(condition));
        Ok(())
    }

    fn assignment(&mut self, target: NodeId, value: NodeId) -> Result<(), InternalCompilerError> {
        let ast = self.ast;
        let target_ty = self.expr_type(target)?;
        match (ast.get(target), self.binding(target)?) {
            (Node::VarRef(_), Binding::Local(decl)) => {
                let slot = self.slot(*decl)?;
                self.expr_as(value, &target_ty)?;
                self.emitter.emit_set_local(slot);
            }
            (Node::VarRef(_), Binding::Property { class, property }) => {
                let field = self.field_index(*class, *property)?;
                self.emitter.emit_get_local(0);
                self.expr_as(value, &target_ty)?;
                self.emitter.emit_index(OpCode::SetField, field)?;
            }
            (Node::PropertyRef(prop), Binding::Property { class, property }) => {
                let field = self.field_index(*class, *property)?;
                self.expr(prop.target())?;
                self.expr_as(value, &target_ty)?;
                self.emitter.set_span(ast.span(target));
                self.emitter.emit_index(OpCode::SetField, field)?;
            }
            _ => return Err(self.emitter.error("invalid assignment target")),
        }
        Ok(())
    }

    /// Push the zero value of `ty`.
    pub(super) fn default_value(&mut self, ty: &DataType) -> Result<(), InternalCompilerError> {
        match ty {
            DataType::Int => self.emitter.emit_int(0)?,
            DataType::Float => self.emitter.emit_float(0.0)?,
            DataType::Boolean => self.emitter.emit_bool(false),
            DataType::String => self.emitter.emit_string("")?,
            DataType::Class(_) | DataType::Null => self.emitter.emit(OpCode::PushNull),
            DataType::Void | DataType::Function(_) => {
                return Err(self.emitter.error(format!("no value of type '{ty}'")));
            }
        }
        Ok(())
    }

    // ==========================================================================
    // Annotations
    // ==========================================================================

    fn declared_type(&self, decl: NodeId) -> Result<DataType, InternalCompilerError> {
        self.ast.node_type(decl).cloned().ok_or_else(|| {
            self.emitter.error(format!(
                "variable '{}' has no resolved type",
                self.ast.name(decl).unwrap_or_default()
            ))
        })
    }

    pub(super) fn expr_type(&self, expr: NodeId) -> Result<DataType, InternalCompilerError> {
        self.ast.node_type(expr).cloned().ok_or_else(|| {
            InternalCompilerError::new(
                self.ast.span(expr),
                format!("{} has no resolved type", self.ast.kind(expr)),
            )
        })
    }

    pub(super) fn binding(&self, expr: NodeId) -> Result<&'a Binding, InternalCompilerError> {
        let ast = self.ast;
        ast.annotation(expr)
            .and_then(|a| a.binding.as_ref())
            .ok_or_else(|| InternalCompilerError::new(ast.span(expr), format!("{} is not bound", ast.kind(expr))))
    }

    /// Index of `property` within the layout of `class`.
    pub(super) fn field_index(&self, class: NodeId, property: NodeId) -> Result<usize, InternalCompilerError> {
        self.ast
            .get(class)
            .as_class()
            .and_then(|c| c.properties().iter().position(|&p| p == property))
            .ok_or_else(|| self.emitter.error("property is not declared by its class"))
    }

    pub(super) fn function_index(&self, method: NodeId) -> Result<usize, InternalCompilerError> {
        self.layout
            .functions
            .get(&method)
            .copied()
            .ok_or_else(|| self.emitter.error("call to a method that was not generated"))
    }

    pub(super) fn class_index(&self, class: NodeId) -> Result<usize, InternalCompilerError> {
        self.layout
            .classes
            .get(&class)
            .copied()
            .ok_or_else(|| self.emitter.error("instantiation of an unknown class"))
    }

    /// Index of an event field in the query's field table, adding it if new.
    pub(super) fn event_field(&mut self, name: &str, ty: &DataType) -> usize {
        match self.event_fields.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.event_fields.push((name.to_string(), ty.clone()));
                self.event_fields.len() - 1
            }
        }
    }
}
