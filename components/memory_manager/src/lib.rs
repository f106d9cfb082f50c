//! Memory Manager - object registry for the Lox VM
//!
//! This component provides:
//! - The heap object variants (strings, functions, natives, closures, upvalues)
//! - An append-only registry that hands out [`ObjRef`](core_types::ObjRef) handles
//! - String interning keyed by FNV-1a hash and content
//! - The hash table used for global bindings
//! - A single bulk release at teardown
//!
//! There is no garbage collector. Objects live until [`Heap::release_all`].
//!
//! # Example
//!
//! ```
//! use memory_manager::Heap;
//!
//! let mut heap = Heap::new();
//! let a = heap.intern_str("lox");
//! let b = heap.intern_str("lox");
//! assert_eq!(a, b);
//!
//! let stats = heap.release_all();
//! assert_eq!(stats.objects, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod heap;
mod interner;
pub mod object;
pub mod table;

pub use heap::{Heap, ReleaseStats};
pub use interner::fnv1a;
pub use object::{
    NativeFn, ObjClosure, ObjFunction, ObjNative, ObjString, ObjUpvalue, Object, ObjectKind,
    UpvalueState, HEADER_SIZE,
};
pub use table::Table;
