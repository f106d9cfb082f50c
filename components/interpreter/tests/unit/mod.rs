//! Unit tests for the dispatch loop, driven by hand-assembled bytecode

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use bytecode_system::{Chunk, OpCode};
use core_types::{ErrorKind, ObjRef, Value};
use interpreter::VM;
use memory_manager::{Heap, ObjFunction};
use pretty_assertions::assert_eq;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn quiet_vm() -> VM {
    VM::new().with_output(io::sink()).with_diagnostics(io::sink())
}

/// Build a script function whose chunk is filled in by `build`.
fn assemble(vm: &mut VM, build: impl FnOnce(&mut Heap, &mut Chunk)) -> ObjRef {
    let mut function = ObjFunction::new();
    build(vm.heap_mut(), &mut function.chunk);
    vm.heap_mut().new_function(function)
}

fn op_constant(chunk: &mut Chunk, value: Value) {
    let index = chunk.add_constant(value);
    chunk.write_op(OpCode::Constant, 1);
    chunk.write(index as u8, 1);
}

// ============================================================================
// Arithmetic and values
// ============================================================================

#[test]
fn test_constant_arithmetic() {
    let mut vm = quiet_vm();
    // (10 + 5) * 3 - 2 / 4
    let script = assemble(&mut vm, |_, chunk| {
        op_constant(chunk, Value::Number(10.0));
        op_constant(chunk, Value::Number(5.0));
        chunk.write_op(OpCode::Add, 1);
        op_constant(chunk, Value::Number(3.0));
        chunk.write_op(OpCode::Multiply, 1);
        op_constant(chunk, Value::Number(2.0));
        op_constant(chunk, Value::Number(4.0));
        chunk.write_op(OpCode::Divide, 1);
        chunk.write_op(OpCode::Subtract, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    assert_eq!(vm.execute(script).unwrap(), Value::Number(44.5));
    assert_eq!(vm.stack_depth(), 0);
    assert_eq!(vm.frame_count(), 0);
}

#[test]
fn test_divide_by_zero_is_infinite() {
    let mut vm = quiet_vm();
    let script = assemble(&mut vm, |_, chunk| {
        op_constant(chunk, Value::Number(1.0));
        op_constant(chunk, Value::Number(0.0));
        chunk.write_op(OpCode::Divide, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    assert_eq!(vm.execute(script).unwrap(), Value::Number(f64::INFINITY));
}

#[test]
fn test_comparisons() {
    let mut vm = quiet_vm();
    let script = assemble(&mut vm, |_, chunk| {
        op_constant(chunk, Value::Number(1.0));
        op_constant(chunk, Value::Number(2.0));
        chunk.write_op(OpCode::Less, 1);
        op_constant(chunk, Value::Number(1.0));
        op_constant(chunk, Value::Number(2.0));
        chunk.write_op(OpCode::Greater, 1);
        chunk.write_op(OpCode::Equal, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    // true == false
    assert_eq!(vm.execute(script).unwrap(), Value::Bool(false));
}

#[test]
fn test_not_on_bool_and_nil() {
    let mut vm = quiet_vm();
    let truth = assemble(&mut vm, |_, chunk| {
        chunk.write_op(OpCode::True, 1);
        chunk.write_op(OpCode::Not, 1);
        chunk.write_op(OpCode::Return, 1);
    });
    let nil = assemble(&mut vm, |_, chunk| {
        chunk.write_op(OpCode::Nil, 1);
        chunk.write_op(OpCode::Not, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    assert_eq!(vm.execute(truth).unwrap(), Value::Bool(false));
    assert_eq!(vm.execute(nil).unwrap(), Value::Bool(true));
}

#[test]
fn test_not_on_number_fails() {
    let mut vm = quiet_vm();
    let zero = assemble(&mut vm, |_, chunk| {
        op_constant(chunk, Value::Number(0.0));
        chunk.write_op(OpCode::Not, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    let error = vm.execute(zero).unwrap_err();
    assert_eq!(error.kind, ErrorKind::RuntimeError);
    assert_eq!(error.message, "Operand must be a boolean or nil.");
    assert_eq!(error.stack[0].to_string(), "[line 1] in script");
    assert_eq!(vm.stack_depth(), 0);
}

#[test]
fn test_string_add_yields_interned_string() {
    let mut vm = quiet_vm();
    let script = assemble(&mut vm, |heap, chunk| {
        let ab = heap.intern_str("ab");
        let a = heap.intern_str("a");
        let b = heap.intern_str("b");
        op_constant(chunk, Value::Object(ab));
        op_constant(chunk, Value::Object(a));
        op_constant(chunk, Value::Object(b));
        chunk.write_op(OpCode::Add, 1);
        chunk.write_op(OpCode::Equal, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    assert_eq!(vm.execute(script).unwrap(), Value::Bool(true));
}

#[test]
fn test_add_mismatched_operands() {
    let mut vm = quiet_vm();
    let script = assemble(&mut vm, |heap, chunk| {
        let one = heap.intern_str("1");
        op_constant(chunk, Value::Number(1.0));
        op_constant(chunk, Value::Object(one));
        chunk.write_op(OpCode::Add, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    let error = vm.execute(script).unwrap_err();
    assert_eq!(error.kind, ErrorKind::RuntimeError);
    assert_eq!(error.message, "Operands must be two numbers or two strings.");
    assert_eq!(error.stack.len(), 1);
    assert_eq!(error.stack[0].to_string(), "[line 1] in script");
    assert_eq!(vm.stack_depth(), 0);
}

#[test]
fn test_negate_non_number() {
    let mut vm = quiet_vm();
    let script = assemble(&mut vm, |_, chunk| {
        chunk.write_op(OpCode::True, 1);
        chunk.write_op(OpCode::Negate, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    let error = vm.execute(script).unwrap_err();
    assert_eq!(error.kind, ErrorKind::RuntimeError);
    assert_eq!(error.message, "Operand must be a number.");
}

#[test]
fn test_binary_on_non_numbers() {
    let mut vm = quiet_vm();
    let script = assemble(&mut vm, |_, chunk| {
        chunk.write_op(OpCode::Nil, 1);
        op_constant(chunk, Value::Number(1.0));
        chunk.write_op(OpCode::Less, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    let error = vm.execute(script).unwrap_err();
    assert_eq!(error.message, "Operands must be numbers.");
}

// ============================================================================
// Malformed bytecode
// ============================================================================

#[test]
fn test_unknown_opcode_is_compile_error() {
    let mut vm = quiet_vm();
    let script = assemble(&mut vm, |_, chunk| {
        chunk.write_op(OpCode::Nil, 1);
        chunk.write(0xff, 1);
    });

    let error = vm.execute(script).unwrap_err();
    assert_eq!(error.kind, ErrorKind::CompileError);
    assert_eq!(error.message, "Unknown instruction 0xff.");
    assert!(error.stack.is_empty());
    assert_eq!(vm.stack_depth(), 0);
    assert_eq!(vm.frame_count(), 0);
}

#[test]
fn test_constant_index_out_of_range() {
    let mut vm = quiet_vm();
    let script = assemble(&mut vm, |_, chunk| {
        chunk.write_op(OpCode::Constant, 1);
        chunk.write(5, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    let error = vm.execute(script).unwrap_err();
    assert_eq!(error.kind, ErrorKind::CompileError);
    assert_eq!(error.message, "Constant index 5 is out of range.");
}

#[test]
fn test_running_off_the_end() {
    let mut vm = quiet_vm();
    let script = assemble(&mut vm, |_, chunk| {
        chunk.write_op(OpCode::Nil, 1);
    });

    let error = vm.execute(script).unwrap_err();
    assert_eq!(error.kind, ErrorKind::CompileError);
}

#[test]
fn test_pop_on_empty_stack() {
    let mut vm = quiet_vm();
    // The first pop removes the script closure itself.
    let script = assemble(&mut vm, |_, chunk| {
        chunk.write_op(OpCode::Pop, 1);
        chunk.write_op(OpCode::Pop, 1);
        chunk.write_op(OpCode::Nil, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    let error = vm.execute(script).unwrap_err();
    assert_eq!(error.kind, ErrorKind::RuntimeError);
    assert_eq!(error.message, "Stack underflow.");
    assert_eq!(vm.stack_depth(), 0);
}

#[test]
fn test_global_operand_must_be_string() {
    let mut vm = quiet_vm();
    let script = assemble(&mut vm, |_, chunk| {
        let index = chunk.add_constant(Value::Number(1.0));
        chunk.write_op(OpCode::GetGlobal, 1);
        chunk.write(index as u8, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    let error = vm.execute(script).unwrap_err();
    assert_eq!(error.kind, ErrorKind::CompileError);
    assert_eq!(error.message, "Constant 0 is not a string.");
}

// ============================================================================
// Globals
// ============================================================================

#[test]
fn test_define_and_get_global() {
    let mut vm = quiet_vm();
    let script = assemble(&mut vm, |heap, chunk| {
        let name = heap.intern_str("answer");
        let index = chunk.add_constant(Value::Object(name));
        op_constant(chunk, Value::Number(42.0));
        chunk.write_op(OpCode::DefineGlobal, 1);
        chunk.write(index as u8, 1);
        chunk.write_op(OpCode::GetGlobal, 1);
        chunk.write(index as u8, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    assert_eq!(vm.execute(script).unwrap(), Value::Number(42.0));
    assert_eq!(vm.get_global("answer"), Some(Value::Number(42.0)));
}

#[test]
fn test_set_global_unbound() {
    let mut vm = quiet_vm();
    let script = assemble(&mut vm, |heap, chunk| {
        let name = heap.intern_str("ghost");
        let index = chunk.add_constant(Value::Object(name));
        chunk.write_op(OpCode::Nil, 1);
        chunk.write_op(OpCode::SetGlobal, 1);
        chunk.write(index as u8, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    let error = vm.execute(script).unwrap_err();
    assert_eq!(error.kind, ErrorKind::RuntimeError);
    assert_eq!(error.message, "Undefined variable 'ghost'.");
    assert_eq!(vm.get_global("ghost"), None);
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn test_jump_skips_forward() {
    let mut vm = quiet_vm();
    let script = assemble(&mut vm, |_, chunk| {
        op_constant(chunk, Value::Number(1.0));
        chunk.write_op(OpCode::Jump, 1);
        chunk.write(0, 1);
        chunk.write(2, 1);
        op_constant(chunk, Value::Number(2.0));
        chunk.write_op(OpCode::Return, 1);
    });

    assert_eq!(vm.execute(script).unwrap(), Value::Number(1.0));
}

#[test]
fn test_jump_if_false_leaves_condition() {
    let mut vm = quiet_vm();
    let script = assemble(&mut vm, |_, chunk| {
        chunk.write_op(OpCode::False, 1);
        chunk.write_op(OpCode::JumpIfFalse, 1);
        chunk.write(0, 1);
        chunk.write(1, 1);
        chunk.write_op(OpCode::True, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    assert_eq!(vm.execute(script).unwrap(), Value::Bool(false));
}

#[test]
fn test_loop_counts_local() {
    let mut vm = quiet_vm();
    // var i = 0; while (i < 3) i = i + 1; return i;
    let script = assemble(&mut vm, |_, chunk| {
        let zero = chunk.add_constant(Value::Number(0.0)) as u8;
        let one = chunk.add_constant(Value::Number(1.0)) as u8;
        let three = chunk.add_constant(Value::Number(3.0)) as u8;
        let code: &[u8] = &[
            OpCode::Constant as u8,
            zero,
            OpCode::GetLocal as u8, // 2: loop start
            1,
            OpCode::Constant as u8,
            three,
            OpCode::Less as u8,
            OpCode::JumpIfFalse as u8,
            0,
            12,
            OpCode::Pop as u8,
            OpCode::GetLocal as u8,
            1,
            OpCode::Constant as u8,
            one,
            OpCode::Add as u8,
            OpCode::SetLocal as u8,
            1,
            OpCode::Pop as u8,
            OpCode::Loop as u8,
            0,
            20,
            OpCode::Pop as u8, // 22: exit
            OpCode::GetLocal as u8,
            1,
            OpCode::Return as u8,
        ];
        for &byte in code {
            chunk.write(byte, 1);
        }
    });

    assert_eq!(vm.execute(script).unwrap(), Value::Number(3.0));
}

// ============================================================================
// Calls and output
// ============================================================================

fn twice(args: &[Value]) -> Value {
    match args {
        [Value::Number(n)] => Value::Number(n * 2.0),
        _ => Value::Nil,
    }
}

#[test]
fn test_native_call() {
    let mut vm = quiet_vm();
    vm.define_native("twice", twice);
    let script = assemble(&mut vm, |heap, chunk| {
        let name = heap.intern_str("twice");
        let index = chunk.add_constant(Value::Object(name));
        chunk.write_op(OpCode::GetGlobal, 1);
        chunk.write(index as u8, 1);
        op_constant(chunk, Value::Number(21.0));
        chunk.write_op(OpCode::Call, 1);
        chunk.write(1, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    assert_eq!(vm.execute(script).unwrap(), Value::Number(42.0));
    assert_eq!(vm.stack_depth(), 0);
}

#[test]
fn test_call_non_callable() {
    let mut vm = quiet_vm();
    let script = assemble(&mut vm, |_, chunk| {
        op_constant(chunk, Value::Number(1.0));
        chunk.write_op(OpCode::Call, 2);
        chunk.write(0, 2);
        chunk.write_op(OpCode::Return, 2);
    });

    let error = vm.execute(script).unwrap_err();
    assert_eq!(error.kind, ErrorKind::RuntimeError);
    assert_eq!(error.message, "Can only call functions.");
    assert_eq!(error.stack[0].to_string(), "[line 2] in script");
}

#[test]
fn test_print_writes_to_output() {
    let output = SharedBuffer::default();
    let mut vm = VM::new()
        .with_output(output.clone())
        .with_diagnostics(io::sink());
    let script = assemble(&mut vm, |heap, chunk| {
        let hi = heap.intern_str("hi");
        op_constant(chunk, Value::Object(hi));
        chunk.write_op(OpCode::Print, 1);
        op_constant(chunk, Value::Number(2.5));
        chunk.write_op(OpCode::Print, 1);
        chunk.write_op(OpCode::Nil, 1);
        chunk.write_op(OpCode::Print, 1);
        chunk.write_op(OpCode::Nil, 1);
        chunk.write_op(OpCode::Return, 1);
    });

    assert_eq!(vm.execute(script).unwrap(), Value::Nil);
    assert_eq!(output.contents(), "hi\n2.5\nnil\n");
}

#[test]
fn test_runtime_error_written_to_diagnostics() {
    let diagnostics = SharedBuffer::default();
    let mut vm = VM::new()
        .with_output(io::sink())
        .with_diagnostics(diagnostics.clone());
    let script = assemble(&mut vm, |_, chunk| {
        chunk.write_op(OpCode::Nil, 3);
        chunk.write_op(OpCode::Negate, 3);
        chunk.write_op(OpCode::Return, 3);
    });

    assert!(vm.execute(script).is_err());
    assert_eq!(
        diagnostics.contents(),
        "Operand must be a number.\n[line 3] in script\n"
    );
}
