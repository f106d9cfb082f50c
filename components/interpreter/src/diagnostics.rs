//! Fault causes and their mapping onto the error taxonomy
//!
//! Every way the dispatch loop can stop early is a [`Fault`]. Faults caused
//! by the running program are runtime errors and get a traceback; faults
//! that mean the bytecode itself is malformed are reported in the compile
//! category, without one.

use core_types::{ErrorKind, ObjRef, StackFrame};
use memory_manager::Heap;
use thiserror::Error;

use crate::call_frame::CallFrame;

/// Why execution stopped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// Argument count differs from the callee's arity
    #[error("Expected {expected} arguments but got {got}.")]
    ArityMismatch {
        /// Declared parameter count
        expected: u8,
        /// Arguments supplied
        got: u8,
    },

    /// Call depth would exceed the frame capacity
    #[error("Stack overflow.")]
    StackOverflow,

    /// Callee is neither a closure nor a native
    #[error("Can only call functions.")]
    NotCallable,

    /// Unary operator applied to a non-number
    #[error("Operand must be a number.")]
    OperandNotNumber,

    /// `!` applied to something other than a boolean or nil
    #[error("Operand must be a boolean or nil.")]
    OperandNotBool,

    /// Numeric binary operator applied to a non-number
    #[error("Operands must be numbers.")]
    OperandsNotNumbers,

    /// `+` on anything but two numbers or two strings
    #[error("Operands must be two numbers or two strings.")]
    InvalidAddOperands,

    /// An instruction needed more operands than the stack holds
    #[error("Stack underflow.")]
    StackUnderflow,

    /// Read of, or assignment to, an unbound global
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),

    /// `print` could not write to the output
    #[error("Could not write output: {0}")]
    Output(String),

    /// Byte does not decode to an opcode
    #[error("Unknown instruction {0:#04x}.")]
    UnknownOpcode(u8),

    /// Instruction pointer left the chunk
    #[error("Instruction pointer ran past the end of the chunk.")]
    CodeOverrun,

    /// Constant operand outside the pool
    #[error("Constant index {0} is out of range.")]
    BadConstant(usize),

    /// Constant of the wrong kind for its instruction
    #[error("Constant {index} is not a {expected}.")]
    ConstantType {
        /// Pool index
        index: usize,
        /// What the instruction required
        expected: &'static str,
    },

    /// Local slot outside the frame's stack window
    #[error("Local slot {0} is out of range.")]
    BadSlot(usize),

    /// Upvalue index outside the closure's slot array, or a slot never filled
    #[error("Upvalue index {0} is out of range.")]
    BadUpvalue(usize),

    /// Handle that does not refer to an object of the expected kind
    #[error("Object {0} is missing or of the wrong kind.")]
    BadObject(ObjRef),

    /// The dispatch loop ran with no frame pushed
    #[error("No active call frame.")]
    NoActiveFrame,
}

impl Fault {
    /// Where this fault sits in the error taxonomy
    pub fn category(&self) -> ErrorKind {
        match self {
            Fault::ArityMismatch { .. }
            | Fault::StackOverflow
            | Fault::NotCallable
            | Fault::OperandNotNumber
            | Fault::OperandNotBool
            | Fault::OperandsNotNumbers
            | Fault::InvalidAddOperands
            | Fault::StackUnderflow
            | Fault::UndefinedVariable(_)
            | Fault::Output(_) => ErrorKind::RuntimeError,
            Fault::UnknownOpcode(_)
            | Fault::CodeOverrun
            | Fault::BadConstant(_)
            | Fault::ConstantType { .. }
            | Fault::BadSlot(_)
            | Fault::BadUpvalue(_)
            | Fault::BadObject(_)
            | Fault::NoActiveFrame => ErrorKind::CompileError,
        }
    }
}

/// Active frames innermost first, each resolved to the line of the
/// instruction it was executing.
pub fn traceback(heap: &Heap, frames: &[CallFrame]) -> Vec<StackFrame> {
    frames
        .iter()
        .rev()
        .map(|frame| {
            let line = heap
                .function(frame.function)
                .and_then(|f| f.chunk.line_at(frame.ip.saturating_sub(1)))
                .unwrap_or(0);
            StackFrame::new(heap.function_name(frame.function), line)
        })
        .collect()
}
