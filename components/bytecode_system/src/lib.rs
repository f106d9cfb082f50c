//! Bytecode system for the Lox VM
//!
//! This crate provides the instruction set and the chunk container the
//! compiler writes into and the interpreter reads from.
//!
//! # Features
//!
//! - One-byte opcodes with inline one- and two-byte operands
//! - Constant pool and per-byte source line table
//! - Text disassembler for debugging and execution tracing
//!
//! # Example
//!
//! ```
//! use bytecode_system::{disassemble_chunk, Chunk, OpCode, PlainConstants};
//! use core_types::Value;
//!
//! let mut chunk = Chunk::new();
//!
//! let idx = chunk.add_constant(Value::Number(42.0));
//! chunk.write_op(OpCode::Constant, 1);
//! chunk.write(idx as u8, 1);
//! chunk.write_op(OpCode::Return, 1);
//!
//! let listing = disassemble_chunk(&chunk, "answer", &PlainConstants);
//! assert!(listing.contains("OP_CONSTANT"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod disasm;
pub mod opcode;

// Re-export main types at crate root
pub use chunk::{Chunk, MAX_CONSTANTS};
pub use disasm::{disassemble_chunk, disassemble_instruction, ConstantInfo, PlainConstants};
pub use opcode::{OpCode, UnknownOpCode};
