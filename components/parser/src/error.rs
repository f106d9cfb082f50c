//! Compile error types

use std::fmt;

use core_types::LoxError;
use thiserror::Error;

/// Where in the source a compile error was reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// At a token, shown by its lexeme
    Token(String),
    /// At end of input
    End,
    /// Lexical errors carry no location
    None,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Token(lexeme) => write!(f, " at '{}'", lexeme),
            Location::End => f.write_str(" at end"),
            Location::None => Ok(()),
        }
    }
}

/// A single compile error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line {line}] Error{location}: {message}")]
pub struct CompileError {
    /// Source line of the offending token
    pub line: u32,
    /// Where on that line
    pub location: Location,
    /// What went wrong
    pub message: String,
}

/// Every error reported while compiling one source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_lines(.0))]
pub struct CompileErrors(pub Vec<CompileError>);

impl CompileErrors {
    /// Reported errors in source order
    pub fn errors(&self) -> &[CompileError] {
        &self.0
    }
}

fn join_lines(errors: &[CompileError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<CompileErrors> for LoxError {
    fn from(errors: CompileErrors) -> Self {
        LoxError::compile(errors.to_string())
    }
}
