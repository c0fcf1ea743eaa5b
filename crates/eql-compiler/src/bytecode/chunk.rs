//! Bytecode chunk for compiled functions.
//!
//! A `BytecodeChunk` holds the bytecode of one function plus the source line
//! of every byte, which execution errors report.

use eql_core::{InternalCompilerError, Span};

use super::OpCode;

/// Compiled bytecode for a single function.
///
/// Constants live in the query-wide [`ConstantPool`](super::ConstantPool).
#[derive(Debug, Clone, Default)]
pub struct BytecodeChunk {
    code: Vec<u8>,
    /// Line numbers, parallel to `code`.
    lines: Vec<u32>,
}

impl BytecodeChunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_op(&mut self, op: OpCode, line: u32) {
        self.code.push(op.into());
        self.lines.push(line);
    }

    fn write_byte(&mut self, byte: u8, line: u32) {
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Write a 32-bit operand (big-endian).
    pub fn write_u32(&mut self, value: u32, line: u32) {
        for byte in value.to_be_bytes() {
            self.write_byte(byte, line);
        }
    }

    /// Current code offset, for jump targets.
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Emit a forward jump and return the operand offset to patch later.
    pub fn emit_jump(&mut self, op: OpCode, line: u32) -> usize {
        self.write_op(op, line);
        let offset = self.code.len();
        self.write_u32(u32::MAX, line);
        offset
    }

    /// Point the jump whose operand is at `offset` to the current position.
    pub fn patch_jump(&mut self, offset: usize) -> Result<(), InternalCompilerError> {
        let distance = self.code.len() - offset - 4;
        let distance = u32::try_from(distance).map_err(|_| {
            InternalCompilerError::new(Span::default(), format!("jump distance {distance} exceeds u32::MAX"))
        })?;
        self.code[offset..offset + 4].copy_from_slice(&distance.to_be_bytes());
        Ok(())
    }

    /// Emit a backward jump to `loop_start`.
    pub fn emit_loop(&mut self, loop_start: usize, line: u32) -> Result<(), InternalCompilerError> {
        self.write_op(OpCode::Loop, line);
        // +4 for the operand bytes about to be written
        let offset = self.code.len() - loop_start + 4;
        let offset = u32::try_from(offset).map_err(|_| {
            InternalCompilerError::new(Span::default(), format!("loop offset {offset} exceeds u32::MAX"))
        })?;
        self.write_u32(offset, line);
        Ok(())
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn line_at(&self, offset: usize) -> Option<u32> {
        self.lines.get(offset).copied()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Read a u32 operand at the given offset (big-endian).
    pub fn read_u32(&self, offset: usize) -> Option<u32> {
        let bytes = self.code.get(offset..offset + 4)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_op(&self, offset: usize) -> Option<OpCode> {
        self.code.get(offset).and_then(|&b| OpCode::from_u8(b))
    }

    /// All opcodes in the chunk, operands skipped.
    pub fn opcodes(&self) -> Vec<OpCode> {
        let mut ops = Vec::new();
        let mut offset = 0;
        while offset < self.code.len() {
            match self.read_op(offset) {
                Some(op) => {
                    ops.push(op);
                    offset += 1 + op.operand_size();
                }
                None => offset += 1,
            }
        }
        ops
    }

    /// One line per instruction: offset, source line, name and operand.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let mut offset = 0;
        while offset < self.code.len() {
            let line = self.line_at(offset).unwrap_or_default();
            let Some(op) = self.read_op(offset) else {
                out.push_str(&format!("{offset:04} {line:>4} <invalid {:#04x}>\n", self.code[offset]));
                offset += 1;
                continue;
            };
            let operand = match op.operand_size() {
                4 => self.read_u32(offset + 1),
                _ => None,
            };
            match operand {
                Some(operand) => out.push_str(&format!("{offset:04} {line:>4} {op} {operand}\n")),
                None => out.push_str(&format!("{offset:04} {line:>4} {op}\n")),
            }
            offset += 1 + op.operand_size();
        }
        out
    }

    /// Assert the chunk holds exactly `expected`, ignoring operands.
    #[cfg(test)]
    #[track_caller]
    pub fn assert_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        assert_eq!(
            actual,
            expected,
            "Bytecode mismatch.\nExpected: {:?}\nActual:   {:?}",
            expected.iter().map(|op| op.name()).collect::<Vec<_>>(),
            actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
        );
    }
}
