//! Interpreter error types.
//!
//! Every failed `interpret` call produces a [`LoxError`]. Its [`ErrorKind`]
//! is the result tag callers branch on; the stack trace is only populated
//! for runtime errors.

use std::fmt;

use crate::StackFrame;

/// The category of a failed interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Front-end failure, or bytecode the VM could not make sense of
    CompileError,
    /// A fault raised while executing well-formed bytecode
    RuntimeError,
}

/// Status tag of an interpretation, `Ok` included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretStatus {
    /// Ran to completion
    Ok,
    /// See [`ErrorKind::CompileError`]
    CompileError,
    /// See [`ErrorKind::RuntimeError`]
    RuntimeError,
}

impl<T> From<&Result<T, LoxError>> for InterpretStatus {
    fn from(result: &Result<T, LoxError>) -> Self {
        match result {
            Ok(_) => InterpretStatus::Ok,
            Err(e) => match e.kind {
                ErrorKind::CompileError => InterpretStatus::CompileError,
                ErrorKind::RuntimeError => InterpretStatus::RuntimeError,
            },
        }
    }
}

/// An interpretation failure with message and traceback.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, LoxError};
///
/// let error = LoxError::compile("Expect expression.");
/// assert_eq!(error.kind, ErrorKind::CompileError);
/// assert!(error.stack.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LoxError {
    /// The category of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Active frames at the time of a runtime error, innermost first
    pub stack: Vec<StackFrame>,
}

impl LoxError {
    /// A compile-category error; never carries a traceback.
    pub fn compile(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::CompileError,
            message: message.into(),
            stack: vec![],
        }
    }

    /// A runtime error with its traceback.
    pub fn runtime(message: impl Into<String>, stack: Vec<StackFrame>) -> Self {
        Self {
            kind: ErrorKind::RuntimeError,
            message: message.into(),
            stack,
        }
    }

    /// Returns true for [`ErrorKind::RuntimeError`].
    pub fn is_runtime(&self) -> bool {
        self.kind == ErrorKind::RuntimeError
    }
}

/// Renders the message followed by one traceback line per frame.
impl fmt::Display for LoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for frame in &self.stack {
            write!(f, "\n{}", frame)?;
        }
        Ok(())
    }
}

impl std::error::Error for LoxError {}
