//! Bytecode types for compiled queries.
//!
//! - [`OpCode`] - The instruction set for the query VM
//! - [`BytecodeChunk`] - Compiled bytecode for one function
//! - [`Constant`] and [`ConstantPool`] - Query-level constant storage

mod chunk;
mod constant;
mod opcode;

pub use chunk::BytecodeChunk;
pub use constant::{Constant, ConstantPool};
pub use opcode::OpCode;
