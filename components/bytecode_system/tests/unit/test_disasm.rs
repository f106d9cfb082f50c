//! Tests for the disassembler

use bytecode_system::{disassemble_chunk, Chunk, ConstantInfo, OpCode};
use core_types::{ObjRef, Value};

/// Pretends every object constant is a function with two upvalues.
struct FakeHeap;

impl ConstantInfo for FakeHeap {
    fn describe(&self, value: &Value) -> String {
        match value {
            Value::Object(_) => "<fn inner>".to_string(),
            other => other.to_string(),
        }
    }

    fn upvalue_count(&self, value: &Value) -> usize {
        if matches!(value, Value::Object(_)) {
            2
        } else {
            0
        }
    }
}

#[test]
fn test_closure_lists_upvalue_pairs() {
    let mut chunk = Chunk::new();
    let idx = chunk.add_constant(Value::Object(ObjRef::new(0)));
    chunk.write_op(OpCode::Closure, 1);
    chunk.write(idx as u8, 1);
    chunk.write(1, 1);
    chunk.write(3, 1);
    chunk.write(0, 1);
    chunk.write(0, 1);
    chunk.write_op(OpCode::Return, 2);

    let listing = disassemble_chunk(&chunk, "outer", &FakeHeap);
    let lines: Vec<&str> = listing.lines().collect();

    assert_eq!(lines[0], "== outer ==");
    assert!(lines[1].contains("OP_CLOSURE") && lines[1].contains("<fn inner>"));
    assert!(lines[2].ends_with("local 3"));
    assert!(lines[3].ends_with("upvalue 0"));
    assert!(lines[4].starts_with("0006    2 OP_RETURN"));
}

#[test]
fn test_truncated_operand_does_not_panic() {
    let mut chunk = Chunk::new();
    chunk.write_op(OpCode::GetLocal, 1);
    let listing = disassemble_chunk(&chunk, "broken", &FakeHeap);
    assert!(listing.contains("<truncated>"));
}
