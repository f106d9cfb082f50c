//! Bytecode chunk - compiled bytecode container
//!
//! Holds the code bytes of one function together with its constant pool and a
//! line table parallel to the code.

use core_types::Value;

use crate::opcode::OpCode;

/// Constant pool operands are one byte wide.
pub const MAX_CONSTANTS: usize = u8::MAX as usize + 1;

/// A compiled bytecode chunk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    /// Opcode and operand bytes
    pub code: Vec<u8>,
    /// Constant pool for literal values
    pub constants: Vec<Value>,
    /// Source line of each byte in `code`
    pub lines: Vec<u32>,
}

impl Chunk {
    /// Create a new empty chunk
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw byte attributed to `line`
    pub fn write(&mut self, byte: u8, line: u32) {
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Append an opcode attributed to `line`
    pub fn write_op(&mut self, op: OpCode, line: u32) {
        self.write(op.into(), line);
    }

    /// Add a constant to the pool and return its index
    ///
    /// The caller is responsible for checking the index fits the one-byte
    /// operand (see [`MAX_CONSTANTS`]).
    pub fn add_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    /// Source line of the byte at `offset`, if in range
    pub fn line_at(&self, offset: usize) -> Option<u32> {
        self.lines.get(offset).copied()
    }

    /// Number of code bytes
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns true when no code has been written
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Read a big-endian 16-bit operand at `offset`
    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        let hi = *self.code.get(offset)?;
        let lo = *self.code.get(offset + 1)?;
        Some(u16::from_be_bytes([hi, lo]))
    }

    /// Heap bytes owned by this chunk's storage
    pub fn allocated_bytes(&self) -> usize {
        self.code.capacity()
            + self.constants.capacity() * std::mem::size_of::<Value>()
            + self.lines.capacity() * std::mem::size_of::<u32>()
    }
}
