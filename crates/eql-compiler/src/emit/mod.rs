//! Bytecode emitter.
//!
//! [`BytecodeEmitter`] wraps a [`BytecodeChunk`] with constant handling and
//! jump patching. Every instruction is tagged with the source line of the
//! node being generated, which the VM reports in execution errors.

use eql_core::{InternalCompilerError, Span};

use crate::bytecode::{BytecodeChunk, Constant, ConstantPool, OpCode};

/// Emits the bytecode of a single function.
///
/// The constant pool is shared by every function of a query.
pub struct BytecodeEmitter<'pool> {
    chunk: BytecodeChunk,
    constants: &'pool mut ConstantPool,
    /// Span of the node being generated.
    span: Span,
}

impl<'pool> BytecodeEmitter<'pool> {
    pub fn new(constants: &'pool mut ConstantPool) -> Self {
        Self {
            chunk: BytecodeChunk::new(),
            constants,
            span: Span::new(1, 1, 0),
        }
    }

    /// Attribute subsequent instructions to `span`.
    pub fn set_span(&mut self, span: Span) {
        self.span = span;
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// An internal error at the current span.
    pub fn error(&self, message: impl Into<String>) -> InternalCompilerError {
        InternalCompilerError::new(self.span, message)
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    pub fn emit(&mut self, op: OpCode) {
        self.chunk.write_op(op, self.span.line);
    }

    pub fn emit_u32(&mut self, op: OpCode, value: u32) {
        self.chunk.write_op(op, self.span.line);
        self.chunk.write_u32(value, self.span.line);
    }

    /// Emit an opcode whose operand is a table index.
    pub fn emit_index(&mut self, op: OpCode, index: usize) -> Result<(), InternalCompilerError> {
        let index = u32::try_from(index)
            .map_err(|_| self.error(format!("{} operand {index} exceeds u32::MAX", op.name())))?;
        self.emit_u32(op, index);
        Ok(())
    }

    // ==========================================================================
    // Constants
    // ==========================================================================

    pub fn emit_constant(&mut self, constant: Constant) -> Result<(), InternalCompilerError> {
        let index = self.constants.add(constant);
        self.emit_index(OpCode::Constant, index)
    }

    /// Emit an integer; 0 and 1 have dedicated opcodes.
    pub fn emit_int(&mut self, value: i64) -> Result<(), InternalCompilerError> {
        match value {
            0 => self.emit(OpCode::PushZero),
            1 => self.emit(OpCode::PushOne),
            _ => self.emit_constant(Constant::Int(value))?,
        }
        Ok(())
    }

    pub fn emit_float(&mut self, value: f64) -> Result<(), InternalCompilerError> {
        self.emit_constant(Constant::Float(value.into()))
    }

    pub fn emit_string(&mut self, value: &str) -> Result<(), InternalCompilerError> {
        self.emit_constant(Constant::String(value.to_string()))
    }

    pub fn emit_bool(&mut self, value: bool) {
        self.emit(if value { OpCode::PushTrue } else { OpCode::PushFalse });
    }

    // ==========================================================================
    // Locals
    // ==========================================================================

    pub fn emit_get_local(&mut self, slot: u32) {
        self.emit_u32(OpCode::GetLocal, slot);
    }

    pub fn emit_set_local(&mut self, slot: u32) {
        self.emit_u32(OpCode::SetLocal, slot);
    }

    // ==========================================================================
    // Control Flow
    // ==========================================================================

    /// Emit a forward jump; returns the label to pass to [`patch_jump`](Self::patch_jump).
    pub fn emit_jump(&mut self, op: OpCode) -> usize {
        self.chunk.emit_jump(op, self.span.line)
    }

    pub fn patch_jump(&mut self, label: usize) -> Result<(), InternalCompilerError> {
        self.chunk.patch_jump(label).map_err(|e| self.error(e.message))
    }

    pub fn current_offset(&self) -> usize {
        self.chunk.current_offset()
    }

    pub fn emit_loop(&mut self, loop_start: usize) -> Result<(), InternalCompilerError> {
        let line = self.span.line;
        self.chunk.emit_loop(loop_start, line).map_err(|e| self.error(e.message))
    }

    /// Finish and return the chunk.
    pub fn finish(self) -> BytecodeChunk {
        self.chunk
    }
}
