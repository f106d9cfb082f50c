//! Error types for the CLI

use std::io;
use std::path::PathBuf;

use core_types::{ErrorKind, LoxError};
use thiserror::Error;

/// Exit status for a script that failed to compile
pub const EXIT_COMPILE_ERROR: u8 = 65;
/// Exit status for a script that failed while running
pub const EXIT_RUNTIME_ERROR: u8 = 70;
/// Exit status for a file or terminal failure
pub const EXIT_IO_ERROR: u8 = 74;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Compile or runtime error from the VM
    #[error("{0}")]
    Lox(#[from] LoxError),

    /// Script file could not be read
    #[error("Could not read file '{}': {source}", path.display())]
    Io {
        /// File that was requested
        path: PathBuf,
        /// Underlying failure
        source: io::Error,
    },

    /// Line editor failure
    #[error("REPL error: {0}")]
    Repl(String),
}

impl CliError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Lox(e) => match e.kind {
                ErrorKind::CompileError => EXIT_COMPILE_ERROR,
                ErrorKind::RuntimeError => EXIT_RUNTIME_ERROR,
            },
            CliError::Io { .. } | CliError::Repl(_) => EXIT_IO_ERROR,
        }
    }

    /// Whether the VM already wrote this error to its diagnostics stream
    pub fn is_reported(&self) -> bool {
        matches!(self, CliError::Lox(_))
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
