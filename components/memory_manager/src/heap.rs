//! Object registry with a single bulk-release path.
//!
//! The heap owns every object the VM creates:
//! - Objects are appended in allocation order and addressed by [`ObjRef`]
//! - Nothing is ever freed individually; there is no collector
//! - [`Heap::release_all`] walks the registry newest-first at teardown
//! - Strings are interned, so equal content means the same handle

use bytecode_system::ConstantInfo;
use core_types::{ObjRef, Value};
use tracing::{debug, trace};

use crate::interner::{fnv1a, InternTable};
use crate::object::{
    NativeFn, ObjClosure, ObjFunction, ObjNative, ObjString, ObjUpvalue, Object, ObjectKind,
    UpvalueState, HEADER_SIZE,
};

/// Counts reported by [`Heap::release_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseStats {
    /// Objects released
    pub objects: usize,
    /// Bytes released, as accounted at allocation
    pub bytes: usize,
    /// Interned strings dropped from the intern table
    pub interned: usize,
}

/// The object registry of one VM.
#[derive(Debug, Default)]
pub struct Heap {
    /// Every live object, oldest first
    objects: Vec<Object>,
    /// Content index over the string objects
    strings: InternTable,
    /// Running total of `Object::size` over `objects`
    bytes_allocated: usize,
}

impl Heap {
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `object` and returns its handle.
    ///
    /// This is the only way objects enter the heap; the typed constructors
    /// below all go through it.
    pub fn allocate(&mut self, object: Object) -> ObjRef {
        let size = object.size();
        debug_assert!(size >= HEADER_SIZE);
        let kind = object.kind();

        let handle = ObjRef::new(self.objects.len());
        self.objects.push(object);
        self.bytes_allocated += size;

        trace!(?kind, size, handle = handle.index(), "allocate");
        handle
    }

    /// Returns the canonical string object for `bytes`, allocating it on
    /// first use.
    pub fn intern(&mut self, bytes: &[u8]) -> ObjRef {
        let hash = fnv1a(bytes);
        if let Some(existing) = self.strings.find(&self.objects, hash, bytes) {
            return existing;
        }
        let handle = self.allocate(Object::String(ObjString::new(bytes, hash)));
        self.strings.insert(hash, handle);
        handle
    }

    /// The interned string for `bytes`, if one exists. Never allocates.
    pub fn find_interned(&self, bytes: &[u8]) -> Option<ObjRef> {
        self.strings.find(&self.objects, fnv1a(bytes), bytes)
    }

    /// [`Heap::intern`] for text.
    pub fn intern_str(&mut self, s: &str) -> ObjRef {
        self.intern(s.as_bytes())
    }

    /// Interned concatenation of two strings.
    ///
    /// The combined bytes only live in a scratch buffer; if the result is
    /// already interned no object is allocated. Returns `None` if either
    /// handle is not a string.
    pub fn concat(&mut self, a: ObjRef, b: ObjRef) -> Option<ObjRef> {
        let lhs = self.string(a)?.as_bytes();
        let rhs = self.string(b)?.as_bytes();
        let mut buffer = Vec::with_capacity(lhs.len() + rhs.len());
        buffer.extend_from_slice(lhs);
        buffer.extend_from_slice(rhs);
        Some(self.intern(&buffer))
    }

    /// Registers a compiled function.
    pub fn new_function(&mut self, function: ObjFunction) -> ObjRef {
        self.allocate(Object::Function(function))
    }

    /// Registers a native under an interned `name`.
    pub fn new_native(&mut self, name: &str, function: NativeFn) -> ObjRef {
        let name = self.intern_str(name);
        self.allocate(Object::Native(ObjNative { name, function }))
    }

    /// Creates a closure over `function` with every upvalue slot empty.
    ///
    /// Returns `None` if `function` is not a function object.
    pub fn new_closure(&mut self, function: ObjRef) -> Option<ObjRef> {
        let count = self.function(function)?.upvalue_count;
        let upvalues = vec![None; count].into_boxed_slice();
        Some(self.allocate(Object::Closure(ObjClosure { function, upvalues })))
    }

    /// Creates an open upvalue for absolute stack `slot`.
    pub fn new_upvalue(&mut self, slot: usize) -> ObjRef {
        self.allocate(Object::Upvalue(ObjUpvalue {
            state: UpvalueState::Open(slot),
        }))
    }

    /// Object behind a handle
    pub fn get(&self, handle: ObjRef) -> Option<&Object> {
        self.objects.get(handle.index())
    }

    /// Type tag of the object behind a handle
    pub fn kind(&self, handle: ObjRef) -> Option<ObjectKind> {
        self.get(handle).map(Object::kind)
    }

    /// Kind of a value's object, `None` for scalars
    pub fn kind_of(&self, value: Value) -> Option<ObjectKind> {
        value.as_object().and_then(|r| self.kind(r))
    }

    /// The string behind a handle
    pub fn string(&self, handle: ObjRef) -> Option<&ObjString> {
        match self.get(handle)? {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    /// The function behind a handle
    pub fn function(&self, handle: ObjRef) -> Option<&ObjFunction> {
        match self.get(handle)? {
            Object::Function(f) => Some(f),
            _ => None,
        }
    }

    /// The native behind a handle
    pub fn native(&self, handle: ObjRef) -> Option<&ObjNative> {
        match self.get(handle)? {
            Object::Native(n) => Some(n),
            _ => None,
        }
    }

    /// The closure behind a handle
    pub fn closure(&self, handle: ObjRef) -> Option<&ObjClosure> {
        match self.get(handle)? {
            Object::Closure(c) => Some(c),
            _ => None,
        }
    }

    /// Mutable access to a closure, for filling its upvalue slots
    pub fn closure_mut(&mut self, handle: ObjRef) -> Option<&mut ObjClosure> {
        match self.objects.get_mut(handle.index())? {
            Object::Closure(c) => Some(c),
            _ => None,
        }
    }

    /// The upvalue behind a handle
    pub fn upvalue(&self, handle: ObjRef) -> Option<&ObjUpvalue> {
        match self.get(handle)? {
            Object::Upvalue(u) => Some(u),
            _ => None,
        }
    }

    /// Mutable access to an upvalue, for closing it or writing a closed value
    pub fn upvalue_mut(&mut self, handle: ObjRef) -> Option<&mut ObjUpvalue> {
        match self.objects.get_mut(handle.index())? {
            Object::Upvalue(u) => Some(u),
            _ => None,
        }
    }

    /// Name of a function, `None` for the script or a non-function handle
    pub fn function_name(&self, function: ObjRef) -> Option<String> {
        let name = self.function(function)?.name?;
        Some(self.string(name)?.as_str().into_owned())
    }

    /// Lox equality.
    ///
    /// Values of different variants are never equal. Strings compare by
    /// content (length, then bytes). Every other object kind compares by
    /// identity.
    pub fn values_equal(&self, a: Value, b: Value) -> bool {
        match (a, b) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Number(x), Value::Number(y)) => x == y,
            (Value::Object(x), Value::Object(y)) => {
                if x == y {
                    return true;
                }
                match (self.string(x), self.string(y)) {
                    (Some(s), Some(t)) => s.len() == t.len() && s.as_bytes() == t.as_bytes(),
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Text written by `print`: strings unquoted.
    pub fn display(&self, value: Value) -> String {
        match value {
            Value::Object(r) => match self.get(r) {
                Some(Object::String(s)) => s.as_str().into_owned(),
                Some(_) => self.describe_object(r),
                None => format!("<dangling {}>", r),
            },
            scalar => scalar.to_string(),
        }
    }

    /// Debug form: strings quoted, functions and closures by name.
    pub fn repr(&self, value: Value) -> String {
        match value {
            Value::Object(r) => self.describe_object(r),
            scalar => scalar.to_string(),
        }
    }

    fn describe_object(&self, handle: ObjRef) -> String {
        match self.get(handle) {
            Some(Object::String(s)) => format!("\"{}\"", s.as_str()),
            Some(Object::Function(_)) => match self.function_name(handle) {
                Some(name) => format!("<fn {}>", name),
                None => "<script>".to_string(),
            },
            Some(Object::Native(n)) => match self.string(n.name) {
                Some(name) => format!("<native {}>", name.as_str()),
                None => "<native>".to_string(),
            },
            Some(Object::Closure(c)) => match self.function_name(c.function) {
                Some(name) => format!("<closure {}>", name),
                None => "<closure>".to_string(),
            },
            Some(Object::Upvalue(_)) => "upvalue".to_string(),
            None => format!("<dangling {}>", handle),
        }
    }

    /// Number of live objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of interned strings
    pub fn interned_count(&self) -> usize {
        self.strings.len()
    }

    /// Bytes accounted to live objects
    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated
    }

    /// Releases every object, newest first, then the intern table.
    ///
    /// Functions release their chunk storage as part of the walk. Every
    /// handle issued so far is dangling afterwards.
    pub fn release_all(&mut self) -> ReleaseStats {
        let mut stats = ReleaseStats {
            interned: self.strings.len(),
            ..ReleaseStats::default()
        };
        while let Some(object) = self.objects.pop() {
            stats.objects += 1;
            stats.bytes += object.size();
            drop(object);
        }
        self.strings.clear();
        self.bytes_allocated = 0;

        debug!(
            objects = stats.objects,
            bytes = stats.bytes,
            interned = stats.interned,
            "heap released"
        );
        stats
    }
}

impl ConstantInfo for Heap {
    fn describe(&self, value: &Value) -> String {
        self.repr(*value)
    }

    fn upvalue_count(&self, value: &Value) -> usize {
        value
            .as_object()
            .and_then(|r| self.function(r))
            .map_or(0, |f| f.upvalue_count)
    }
}
