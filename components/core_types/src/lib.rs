//! Core Lox value types and error handling.
//!
//! This crate provides the foundational types shared by every component of
//! the Lox virtual machine.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of Lox values
//! - [`ObjRef`] - Non-owning handle into a heap registry
//! - [`LoxError`] - Interpretation errors with tracebacks
//! - [`ErrorKind`] / [`InterpretStatus`] - Result categories
//! - [`StackFrame`] - Traceback entry
//!
//! # Examples
//!
//! ```
//! use core_types::{LoxError, InterpretStatus, Value};
//!
//! let num = Value::Number(42.0);
//! assert!(!num.is_falsy());
//!
//! let result: Result<Value, LoxError> = Err(LoxError::compile("Expect ';'."));
//! assert_eq!(InterpretStatus::from(&result), InterpretStatus::CompileError);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod source;
mod value;

pub use error::{ErrorKind, InterpretStatus, LoxError};
pub use source::StackFrame;
pub use value::{format_number, ObjRef, Value};
