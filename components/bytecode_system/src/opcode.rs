//! Bytecode opcodes for the Lox VM
//!
//! Every instruction is a one-byte opcode followed by its operands:
//!
//! | operand | width | used by |
//! |---|---|---|
//! | constant index | 1 byte | `Constant`, `*Global`, `Closure` |
//! | local slot | 1 byte | `GetLocal`, `SetLocal` |
//! | upvalue index | 1 byte | `GetUpvalue`, `SetUpvalue` |
//! | argument count | 1 byte | `Call` |
//! | jump offset | 2 bytes, big-endian | `Jump`, `JumpIfFalse`, `Loop` |
//!
//! `Closure` is additionally followed by one `(is_local, index)` byte pair
//! per upvalue of the referenced function.

use std::fmt;

/// Bytecode opcodes for Lox execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Push constant from pool
    Constant = 0,
    /// Push nil
    Nil,
    /// Push true
    True,
    /// Push false
    False,
    /// Discard top of stack
    Pop,
    /// Push frame-relative stack slot
    GetLocal,
    /// Store top of stack into frame-relative slot (no pop)
    SetLocal,
    /// Push global by name constant
    GetGlobal,
    /// Pop and bind global by name constant
    DefineGlobal,
    /// Store top of stack into an existing global (no pop)
    SetGlobal,
    /// Push captured variable
    GetUpvalue,
    /// Store top of stack into captured variable (no pop)
    SetUpvalue,
    /// Equality of top two values
    Equal,
    /// Numeric `>`
    Greater,
    /// Numeric `<`
    Less,
    /// Numeric sum or string concatenation
    Add,
    /// Numeric difference
    Subtract,
    /// Numeric product
    Multiply,
    /// Numeric quotient
    Divide,
    /// Logical not of truthiness
    Not,
    /// Numeric negation
    Negate,
    /// Pop and print
    Print,
    /// Unconditional forward jump
    Jump,
    /// Forward jump when top of stack is falsy (no pop)
    JumpIfFalse,
    /// Unconditional backward jump
    Loop,
    /// Call with argument count
    Call,
    /// Create closure from function constant
    Closure,
    /// Close the upvalue at the top slot, then pop it
    CloseUpvalue,
    /// Return from the current function
    Return,
}

impl OpCode {
    /// Every opcode, in encoding order.
    pub const ALL: [OpCode; 29] = [
        OpCode::Constant,
        OpCode::Nil,
        OpCode::True,
        OpCode::False,
        OpCode::Pop,
        OpCode::GetLocal,
        OpCode::SetLocal,
        OpCode::GetGlobal,
        OpCode::DefineGlobal,
        OpCode::SetGlobal,
        OpCode::GetUpvalue,
        OpCode::SetUpvalue,
        OpCode::Equal,
        OpCode::Greater,
        OpCode::Less,
        OpCode::Add,
        OpCode::Subtract,
        OpCode::Multiply,
        OpCode::Divide,
        OpCode::Not,
        OpCode::Negate,
        OpCode::Print,
        OpCode::Jump,
        OpCode::JumpIfFalse,
        OpCode::Loop,
        OpCode::Call,
        OpCode::Closure,
        OpCode::CloseUpvalue,
        OpCode::Return,
    ];

    /// Disassembler mnemonic
    pub fn name(self) -> &'static str {
        match self {
            OpCode::Constant => "OP_CONSTANT",
            OpCode::Nil => "OP_NIL",
            OpCode::True => "OP_TRUE",
            OpCode::False => "OP_FALSE",
            OpCode::Pop => "OP_POP",
            OpCode::GetLocal => "OP_GET_LOCAL",
            OpCode::SetLocal => "OP_SET_LOCAL",
            OpCode::GetGlobal => "OP_GET_GLOBAL",
            OpCode::DefineGlobal => "OP_DEFINE_GLOBAL",
            OpCode::SetGlobal => "OP_SET_GLOBAL",
            OpCode::GetUpvalue => "OP_GET_UPVALUE",
            OpCode::SetUpvalue => "OP_SET_UPVALUE",
            OpCode::Equal => "OP_EQUAL",
            OpCode::Greater => "OP_GREATER",
            OpCode::Less => "OP_LESS",
            OpCode::Add => "OP_ADD",
            OpCode::Subtract => "OP_SUBTRACT",
            OpCode::Multiply => "OP_MULTIPLY",
            OpCode::Divide => "OP_DIVIDE",
            OpCode::Not => "OP_NOT",
            OpCode::Negate => "OP_NEGATE",
            OpCode::Print => "OP_PRINT",
            OpCode::Jump => "OP_JUMP",
            OpCode::JumpIfFalse => "OP_JUMP_IF_FALSE",
            OpCode::Loop => "OP_LOOP",
            OpCode::Call => "OP_CALL",
            OpCode::Closure => "OP_CLOSURE",
            OpCode::CloseUpvalue => "OP_CLOSE_UPVALUE",
            OpCode::Return => "OP_RETURN",
        }
    }

    /// Check if this opcode is a binary numeric operation
    pub fn is_binary_arithmetic(self) -> bool {
        matches!(
            self,
            OpCode::Add | OpCode::Subtract | OpCode::Multiply | OpCode::Divide
        )
    }

    /// Check if this opcode carries a two-byte jump offset
    pub fn is_jump(self) -> bool {
        matches!(self, OpCode::Jump | OpCode::JumpIfFalse | OpCode::Loop)
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op as u8
    }
}

/// The byte did not name an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownOpCode(pub u8);

impl fmt::Display for UnknownOpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown opcode {:#04x}", self.0)
    }
}

impl std::error::Error for UnknownOpCode {}

impl TryFrom<u8> for OpCode {
    type Error = UnknownOpCode;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        OpCode::ALL
            .get(byte as usize)
            .copied()
            .ok_or(UnknownOpCode(byte))
    }
}
