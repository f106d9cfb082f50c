//! Tests for the object registry

use bytecode_system::{disassemble_chunk, OpCode};
use core_types::Value;
use memory_manager::{fnv1a, Heap, ObjFunction, ObjectKind, UpvalueState, HEADER_SIZE};
use pretty_assertions::assert_eq;

fn zero(_args: &[Value]) -> Value {
    Value::Number(0.0)
}

#[test]
fn test_interned_string_caches_hash() {
    let mut heap = Heap::new();
    let r = heap.intern_str("counter");
    let s = heap.string(r).unwrap();
    assert_eq!(s.hash(), fnv1a(b"counter"));
    assert_eq!(s.as_bytes(), b"counter");
    assert_eq!(s.as_bytes_with_nul().last(), Some(&0));
}

#[test]
fn test_find_interned_does_not_allocate() {
    let mut heap = Heap::new();
    assert_eq!(heap.find_interned(b"missing"), None);
    assert_eq!(heap.object_count(), 0);

    let r = heap.intern_str("present");
    assert_eq!(heap.find_interned(b"present"), Some(r));
}

#[test]
fn test_empty_string_is_interned_once() {
    let mut heap = Heap::new();
    let a = heap.intern(b"");
    let b = heap.intern_str("");
    assert_eq!(a, b);
    assert!(heap.string(a).unwrap().is_empty());
}

#[test]
fn test_concat_allocates_only_new_results() {
    let mut heap = Heap::new();
    let a = heap.intern_str("a");
    let b = heap.intern_str("b");
    let ab = heap.concat(a, b).unwrap();
    assert_eq!(heap.string(ab).unwrap().as_bytes(), b"ab");
    assert_eq!(heap.object_count(), 3);

    let again = heap.concat(a, b).unwrap();
    assert_eq!(again, ab);
    assert_eq!(heap.object_count(), 3);
}

#[test]
fn test_strings_equal_by_content() {
    let mut heap = Heap::new();
    let a = heap.intern_str("same");
    let b = heap.intern_str("same");
    assert!(heap.values_equal(Value::Object(a), Value::Object(b)));
    assert!(!heap.values_equal(Value::Object(a), Value::Number(0.0)));
}

#[test]
fn test_number_equality_follows_ieee() {
    let heap = Heap::new();
    assert!(heap.values_equal(Value::Number(0.0), Value::Number(-0.0)));
    assert!(!heap.values_equal(Value::Number(f64::NAN), Value::Number(f64::NAN)));
}

#[test]
fn test_native_carries_interned_name() {
    let mut heap = Heap::new();
    let native = heap.new_native("zero", zero);
    let name = heap.native(native).unwrap().name;
    assert_eq!(name, heap.intern_str("zero"));
    assert_eq!(heap.display(Value::Object(native)), "<native zero>");
    assert_eq!((heap.native(native).unwrap().function)(&[]), Value::Number(0.0));
}

#[test]
fn test_upvalue_close_in_place() {
    let mut heap = Heap::new();
    let up = heap.new_upvalue(5);
    assert_eq!(heap.upvalue(up).unwrap().open_slot(), Some(5));

    heap.upvalue_mut(up).unwrap().state = UpvalueState::Closed(Value::Number(9.0));
    assert!(!heap.upvalue(up).unwrap().is_open());
    assert_eq!(heap.kind(up), Some(ObjectKind::Upvalue));
}

#[test]
fn test_bytes_allocated_tracks_sizes() {
    let mut heap = Heap::new();
    assert_eq!(heap.bytes_allocated(), 0);
    heap.intern_str("abc");
    assert_eq!(heap.bytes_allocated(), HEADER_SIZE + 4);
}

#[test]
fn test_heap_renders_constants_for_disassembly() {
    let mut heap = Heap::new();
    let name = heap.intern_str("greeting");
    let mut function = ObjFunction::new();
    let idx = function.chunk.add_constant(Value::Object(name));
    function.chunk.write_op(OpCode::GetGlobal, 1);
    function.chunk.write(idx as u8, 1);
    function.chunk.write_op(OpCode::Return, 1);

    let listing = disassemble_chunk(&function.chunk, "script", &heap);
    assert!(listing.contains("OP_GET_GLOBAL       0 '\"greeting\"'"), "{}", listing);
}

#[test]
fn test_release_all_is_idempotent() {
    let mut heap = Heap::new();
    heap.intern_str("x");
    assert_eq!(heap.release_all().objects, 1);
    assert_eq!(heap.release_all().objects, 0);
}
