//! Lox front end
//!
//! Provides the lexer and the single-pass compiler that turns Lox source into
//! a top-level script function living in a [`Heap`](memory_manager::Heap).
//!
//! # Overview
//!
//! - [`Lexer`] - Tokenizes Lox source code on demand
//! - [`Token`] / [`TokenKind`] - Scanned tokens
//! - [`compile`] - Pratt parser emitting bytecode directly
//! - [`CompileErrors`] - Every error reported for one source
//!
//! # Example
//!
//! ```
//! use memory_manager::Heap;
//!
//! let mut heap = Heap::new();
//! let script = parser::compile("var x = 42; print x;", &mut heap).unwrap();
//!
//! let function = heap.function(script).unwrap();
//! assert_eq!(function.arity, 0);
//! assert!(function.name.is_none());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiler;
pub mod error;
pub mod lexer;

pub use compiler::{compile, MAX_ARITY, MAX_LOCALS, MAX_UPVALUES};
pub use error::{CompileError, CompileErrors, Location};
pub use lexer::{Lexer, Token, TokenKind};
