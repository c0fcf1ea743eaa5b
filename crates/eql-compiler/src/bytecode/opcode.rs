//! Bytecode operation codes.
//!
//! Each opcode is a single byte, with operands following inline
//! (every operand is a big-endian u32).

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Bytecode operation codes.
///
/// The VM is a stack machine. Most operations pop their operands and push
/// the result back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum OpCode {
    // =========================================================================
    // Constants
    // =========================================================================
    /// Push constant from pool.
    /// Operand: u32 constant index
    Constant = 0,
    /// Push null.
    PushNull,
    /// Push boolean true.
    PushTrue,
    /// Push boolean false.
    PushFalse,
    /// Push integer 0.
    PushZero,
    /// Push integer 1.
    PushOne,

    // =========================================================================
    // Stack Operations
    // =========================================================================
    /// Pop top of stack.
    Pop,
    /// Duplicate top of stack.
    Dup,

    // =========================================================================
    // Locals
    // =========================================================================
    /// Load local variable.
    /// Operand: u32 slot index
    GetLocal,
    /// Store top of stack to a local variable and pop it.
    /// Operand: u32 slot index
    SetLocal,

    // =========================================================================
    // Objects
    // =========================================================================
    /// Pop an object and push one of its fields.
    /// Operand: u32 field index
    GetField,
    /// Pop a value and an object, store the value into the field.
    /// Operand: u32 field index
    SetField,
    /// Push the current event.
    GetEvent,
    /// Push a field of the current event.
    /// Operand: u32 index into the query's event field table
    GetEventField,
    /// Allocate an object with default field values.
    /// Operand: u32 class index
    New,

    // =========================================================================
    // Calls
    // =========================================================================
    /// Call a method. Receiver and arguments are on the stack.
    /// Operand: u32 function index
    Call,
    /// Return top of stack to the caller.
    Return,
    /// Return without a value.
    ReturnVoid,

    // =========================================================================
    // Integer Arithmetic (wrapping)
    // =========================================================================
    AddInt,
    SubInt,
    MulInt,
    DivInt,
    ModInt,
    NegInt,

    // =========================================================================
    // Float Arithmetic
    // =========================================================================
    AddFloat,
    SubFloat,
    MulFloat,
    DivFloat,
    ModFloat,
    NegFloat,

    // =========================================================================
    // Conversions
    // =========================================================================
    /// Widen the Int on top of the stack to a Float.
    IntToFloat,
    /// Concatenate two strings.
    Concat,

    // =========================================================================
    // Comparison
    // =========================================================================
    Equal,
    NotEqual,
    LtInt,
    LeInt,
    GtInt,
    GeInt,
    LtFloat,
    LeFloat,
    GtFloat,
    GeFloat,
    /// Logical NOT.
    Not,

    // =========================================================================
    // Control Flow
    // =========================================================================
    /// Unconditional forward jump.
    /// Operand: u32 offset
    Jump,
    /// Jump forward if the popped value is false.
    /// Operand: u32 offset
    JumpIfFalse,
    /// Jump forward if the popped value is true.
    /// Operand: u32 offset
    JumpIfTrue,
    /// Jump backward.
    /// Operand: u32 offset
    Loop,
}

impl OpCode {
    /// Convert from u8, returning None for invalid values.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Size of the operands following this opcode, in bytes.
    pub fn operand_size(&self) -> usize {
        match self {
            OpCode::Constant
            | OpCode::GetLocal
            | OpCode::SetLocal
            | OpCode::GetField
            | OpCode::SetField
            | OpCode::GetEventField
            | OpCode::New
            | OpCode::Call
            | OpCode::Jump
            | OpCode::JumpIfFalse
            | OpCode::JumpIfTrue
            | OpCode::Loop => 4,
            _ => 0,
        }
    }

    /// Name of this opcode for disassembly.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Constant => "CONSTANT",
            OpCode::PushNull => "PUSH_NULL",
            OpCode::PushTrue => "PUSH_TRUE",
            OpCode::PushFalse => "PUSH_FALSE",
            OpCode::PushZero => "PUSH_ZERO",
            OpCode::PushOne => "PUSH_ONE",
            OpCode::Pop => "POP",
            OpCode::Dup => "DUP",
            OpCode::GetLocal => "GET_LOCAL",
            OpCode::SetLocal => "SET_LOCAL",
            OpCode::GetField => "GET_FIELD",
            OpCode::SetField => "SET_FIELD",
            OpCode::GetEvent => "GET_EVENT",
            OpCode::GetEventField => "GET_EVENT_FIELD",
            OpCode::New => "NEW",
            OpCode::Call => "CALL",
            OpCode::Return => "RETURN",
            OpCode::ReturnVoid => "RETURN_VOID",
            OpCode::AddInt => "ADD_INT",
            OpCode::SubInt => "SUB_INT",
            OpCode::MulInt => "MUL_INT",
            OpCode::DivInt => "DIV_INT",
            OpCode::ModInt => "MOD_INT",
            OpCode::NegInt => "NEG_INT",
            OpCode::AddFloat => "ADD_FLOAT",
            OpCode::SubFloat => "SUB_FLOAT",
            OpCode::MulFloat => "MUL_FLOAT",
            OpCode::DivFloat => "DIV_FLOAT",
            OpCode::ModFloat => "MOD_FLOAT",
            OpCode::NegFloat => "NEG_FLOAT",
            OpCode::IntToFloat => "INT_TO_FLOAT",
            OpCode::Concat => "CONCAT",
            OpCode::Equal => "EQUAL",
            OpCode::NotEqual => "NOT_EQUAL",
            OpCode::LtInt => "LT_INT",
            OpCode::LeInt => "LE_INT",
            OpCode::GtInt => "GT_INT",
            OpCode::GeInt => "GE_INT",
            OpCode::LtFloat => "LT_FLOAT",
            OpCode::LeFloat => "LE_FLOAT",
            OpCode::GtFloat => "GT_FLOAT",
            OpCode::GeFloat => "GE_FLOAT",
            OpCode::Not => "NOT",
            OpCode::Jump => "JUMP",
            OpCode::JumpIfFalse => "JUMP_IF_FALSE",
            OpCode::JumpIfTrue => "JUMP_IF_TRUE",
            OpCode::Loop => "LOOP",
        }
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_round_trips_through_u8() {
        for byte in 0..=u8::MAX {
            if let Some(op) = OpCode::from_u8(byte) {
                assert_eq!(u8::from(op), byte);
            }
        }
        assert_eq!(OpCode::from_u8(0), Some(OpCode::Constant));
        assert_eq!(OpCode::from_u8(OpCode::Loop as u8 + 1), None);
    }

    #[test]
    fn operand_sizes() {
        assert_eq!(OpCode::Constant.operand_size(), 4);
        assert_eq!(OpCode::GetLocal.operand_size(), 4);
        assert_eq!(OpCode::AddInt.operand_size(), 0);
        assert_eq!(OpCode::Loop.operand_size(), 4);
    }

    #[test]
    fn opcode_name() {
        assert_eq!(OpCode::GetEventField.to_string(), "GET_EVENT_FIELD");
    }
}
