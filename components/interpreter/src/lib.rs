//! Bytecode interpreter for the Lox runtime
//!
//! This crate provides the virtual machine that executes compiled Lox:
//! - A fixed-capacity call frame stack over one shared value stack
//! - Closures with upvalues shared between every closure that captures a
//!   variable, closed when the variable's slot goes away
//! - Inline checks of every instruction's operands, reported as [`Fault`]s
//! - Tracebacks for runtime errors
//!
//! # Example
//!
//! ```
//! use interpreter::VM;
//! use core_types::{InterpretStatus, Value};
//!
//! let mut vm = VM::new();
//!
//! let result = vm.interpret("\"a\" + \"b\" == \"ab\"");
//! assert_eq!(result.unwrap(), Value::Bool(true));
//!
//! let result = vm.interpret("1 + \"1\"");
//! assert_eq!(InterpretStatus::from(&result), InterpretStatus::RuntimeError);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod call_frame;
pub mod config;
pub mod diagnostics;
mod dispatch;
pub mod natives;
pub mod upvalue;
pub mod vm;

// Re-export main types at crate root
pub use call_frame::{CallFrame, FRAMES_MAX};
pub use config::VmConfig;
pub use diagnostics::Fault;
pub use upvalue::OpenUpvalues;
pub use vm::VM;
