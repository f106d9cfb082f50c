//! Heap object variants
//!
//! Every object the VM creates is one of the [`Object`] variants below and
//! lives in the [`Heap`](crate::Heap) registry until teardown. Cross-object
//! references are [`ObjRef`] handles, never owning pointers.

use std::borrow::Cow;
use std::mem;

use bytecode_system::Chunk;
use core_types::{ObjRef, Value};

/// Type tag of a heap object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Interned byte string
    String,
    /// Compiled function
    Function,
    /// Host-provided callable
    Native,
    /// Function plus captured variables
    Closure,
    /// Captured variable
    Upvalue,
}

/// Host-provided callable. Receives the call arguments and returns one value.
pub type NativeFn = fn(&[Value]) -> Value;

/// Size accounted for every object regardless of payload.
pub const HEADER_SIZE: usize = mem::size_of::<Object>();

/// A heap object
#[derive(Debug, Clone)]
pub enum Object {
    /// See [`ObjString`]
    String(ObjString),
    /// See [`ObjFunction`]
    Function(ObjFunction),
    /// See [`ObjNative`]
    Native(ObjNative),
    /// See [`ObjClosure`]
    Closure(ObjClosure),
    /// See [`ObjUpvalue`]
    Upvalue(ObjUpvalue),
}

impl Object {
    /// The object's type tag
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::String(_) => ObjectKind::String,
            Object::Function(_) => ObjectKind::Function,
            Object::Native(_) => ObjectKind::Native,
            Object::Closure(_) => ObjectKind::Closure,
            Object::Upvalue(_) => ObjectKind::Upvalue,
        }
    }

    /// Header plus payload bytes, as counted by allocation statistics
    pub fn size(&self) -> usize {
        HEADER_SIZE
            + match self {
                Object::String(s) => s.chars.len(),
                Object::Function(f) => f.chunk.allocated_bytes(),
                Object::Closure(c) => c.upvalues.len() * mem::size_of::<Option<ObjRef>>(),
                Object::Native(_) | Object::Upvalue(_) => 0,
            }
    }
}

/// Immutable string with a cached FNV-1a hash.
///
/// The buffer holds `len() + 1` bytes; the last one is a NUL terminator kept
/// for hosts that want a C string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjString {
    chars: Box<[u8]>,
    hash: u32,
}

impl ObjString {
    pub(crate) fn new(bytes: &[u8], hash: u32) -> Self {
        let mut chars = Vec::with_capacity(bytes.len() + 1);
        chars.extend_from_slice(bytes);
        chars.push(0);
        Self {
            chars: chars.into_boxed_slice(),
            hash,
        }
    }

    /// Content length in bytes, terminator excluded
    pub fn len(&self) -> usize {
        self.chars.len() - 1
    }

    /// Returns true for the empty string
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content bytes, terminator excluded
    pub fn as_bytes(&self) -> &[u8] {
        &self.chars[..self.len()]
    }

    /// Content bytes followed by the NUL terminator
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.chars
    }

    /// Cached FNV-1a hash of the content
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Content as text, with invalid UTF-8 replaced
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }
}

/// A compiled function. Owns its chunk.
#[derive(Debug, Clone, Default)]
pub struct ObjFunction {
    /// Declared parameter count
    pub arity: u8,
    /// Number of upvalues closures over this function capture
    pub upvalue_count: usize,
    /// Interned name; `None` for the top-level script
    pub name: Option<ObjRef>,
    /// Bytecode, constants and line table
    pub chunk: Chunk,
}

impl ObjFunction {
    /// An unnamed function with no parameters and an empty chunk
    pub fn new() -> Self {
        Self::default()
    }
}

/// A host capability exposed to scripts
#[derive(Debug, Clone)]
pub struct ObjNative {
    /// Interned global name the native was registered under
    pub name: ObjRef,
    /// The callable itself
    pub function: NativeFn,
}

/// A function paired with the upvalues it captured
#[derive(Debug, Clone)]
pub struct ObjClosure {
    /// The function being closed over; shared with other closures
    pub function: ObjRef,
    /// One slot per upvalue of `function`, filled right after creation
    pub upvalues: Box<[Option<ObjRef>]>,
}

/// Where a captured variable currently lives
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpvalueState {
    /// Still on the VM stack at this absolute slot
    Open(usize),
    /// Copied off the stack when its scope ended
    Closed(Value),
}

/// A captured variable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjUpvalue {
    /// Current location of the variable
    pub state: UpvalueState,
}

impl ObjUpvalue {
    /// Stack slot of an open upvalue
    pub fn open_slot(&self) -> Option<usize> {
        match self.state {
            UpvalueState::Open(slot) => Some(slot),
            UpvalueState::Closed(_) => None,
        }
    }

    /// Returns true while the variable is still on the stack
    pub fn is_open(&self) -> bool {
        matches!(self.state, UpvalueState::Open(_))
    }
}
