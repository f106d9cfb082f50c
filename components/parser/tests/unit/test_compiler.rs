//! Tests for the compiler

use bytecode_system::{disassemble_chunk, OpCode};
use core_types::{ErrorKind, LoxError, ObjRef, Value};
use memory_manager::{Heap, ObjFunction};
use parser::compile;
use pretty_assertions::assert_eq;

fn script<'h>(heap: &'h Heap, handle: ObjRef) -> &'h ObjFunction {
    heap.function(handle).unwrap()
}

fn nested_functions(heap: &Heap, function: &ObjFunction) -> Vec<ObjRef> {
    function
        .chunk
        .constants
        .iter()
        .filter_map(|v| v.as_object())
        .filter(|r| heap.function(*r).is_some())
        .collect()
}

fn first_error(source: &str) -> String {
    let mut heap = Heap::new();
    compile(source, &mut heap).unwrap_err().errors()[0].message.clone()
}

#[test]
fn test_compile_listing() {
    let mut heap = Heap::new();
    let handle = compile("print 1 + 2;", &mut heap).unwrap();
    let listing = disassemble_chunk(&script(&heap, handle).chunk, "script", &heap);
    assert_eq!(
        listing,
        "== script ==\n\
         0000    1 OP_CONSTANT         0 '1'\n\
         0002    | OP_CONSTANT         1 '2'\n\
         0004    | OP_ADD\n\
         0005    | OP_PRINT\n\
         0006    | OP_NIL\n\
         0007    | OP_RETURN\n"
    );
}

#[test]
fn test_globals_use_interned_name_constants() {
    let mut heap = Heap::new();
    let handle = compile("var a = 1; a = 2;", &mut heap).unwrap();
    let name = heap.intern_str("a");
    let chunk = &script(&heap, handle).chunk;
    assert_eq!(chunk.constants[0], Value::Object(name));
    assert!(chunk.code.contains(&(OpCode::SetGlobal as u8)));
}

#[test]
fn test_function_metadata() {
    let mut heap = Heap::new();
    let handle = compile("fun add(a, b) { return a + b; }", &mut heap).unwrap();
    let functions = nested_functions(&heap, script(&heap, handle));
    assert_eq!(functions.len(), 1);

    let add = heap.function(functions[0]).unwrap();
    assert_eq!(add.arity, 2);
    assert_eq!(add.upvalue_count, 0);
    assert_eq!(heap.function_name(functions[0]).as_deref(), Some("add"));
}

#[test]
fn test_upvalues_are_deduplicated() {
    let mut heap = Heap::new();
    let handle = compile(
        "fun outer() { var x = 1; fun inner() { x; x = x + 1; return x; } }",
        &mut heap,
    )
    .unwrap();
    let outer = nested_functions(&heap, script(&heap, handle))[0];
    let inner = nested_functions(&heap, heap.function(outer).unwrap())[0];
    assert_eq!(heap.function(inner).unwrap().upvalue_count, 1);
}

#[test]
fn test_upvalues_chain_through_enclosing_functions() {
    let mut heap = Heap::new();
    let handle = compile(
        "fun a() { var x = 1; fun b() { fun c() { return x; } return c; } return b; }",
        &mut heap,
    )
    .unwrap();
    let a = nested_functions(&heap, script(&heap, handle))[0];
    let b = nested_functions(&heap, heap.function(a).unwrap())[0];
    let c = nested_functions(&heap, heap.function(b).unwrap())[0];

    assert_eq!(heap.function(b).unwrap().upvalue_count, 1);
    assert_eq!(heap.function(c).unwrap().upvalue_count, 1);

    // b's closure instruction in a captures a local; c's in b captures b's upvalue
    let b_code = &heap.function(b).unwrap().chunk.code;
    let at = b_code
        .iter()
        .position(|&byte| byte == OpCode::Closure as u8)
        .unwrap();
    assert_eq!(&b_code[at + 2..at + 4], &[0, 0]);
}

#[test]
fn test_block_locals_are_popped() {
    let mut heap = Heap::new();
    let handle = compile("{ var a = 1; var b = 2; }", &mut heap).unwrap();
    let code = &script(&heap, handle).chunk.code;
    let tail: Vec<u8> = code[code.len() - 4..].to_vec();
    assert_eq!(
        tail,
        vec![
            OpCode::Pop as u8,
            OpCode::Pop as u8,
            OpCode::Nil as u8,
            OpCode::Return as u8
        ]
    );
}

#[test]
fn test_captured_locals_are_closed() {
    let mut heap = Heap::new();
    let handle = compile("{ var a = 1; fun f() { return a; } }", &mut heap).unwrap();
    let code = &script(&heap, handle).chunk.code;
    assert!(code.contains(&(OpCode::CloseUpvalue as u8)));
}

#[test]
fn test_too_many_constants() {
    let source = "0;".repeat(257);
    assert_eq!(first_error(&source), "Too many constants in one chunk.");
}

#[test]
fn test_too_many_locals() {
    let mut source = String::from("{");
    for i in 0..256 {
        source.push_str(&format!("var v{};", i));
    }
    source.push('}');
    assert_eq!(first_error(&source), "Too many local variables in function.");
}

#[test]
fn test_too_many_parameters() {
    let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
    let source = format!("fun f({}) {{}}", params.join(", "));
    assert_eq!(first_error(&source), "Can't have more than 255 parameters.");
}

#[test]
fn test_too_many_arguments() {
    let args = vec!["nil"; 256].join(", ");
    let source = format!("f({});", args);
    assert_eq!(first_error(&source), "Can't have more than 255 arguments.");
}

#[test]
fn test_duplicate_local() {
    assert_eq!(
        first_error("{ var a; var a; }"),
        "Already a variable with this name in this scope."
    );
}

#[test]
fn test_invalid_assignment_target() {
    assert_eq!(first_error("1 + 2 = 3;"), "Invalid assignment target.");
}

#[test]
fn test_missing_semicolon_mid_script() {
    assert_eq!(first_error("1 2"), "Expect ';' after expression.");
}

#[test]
fn test_compile_errors_convert_to_lox_error() {
    let mut heap = Heap::new();
    let err: LoxError = compile("print", &mut heap).unwrap_err().into();
    assert_eq!(err.kind, ErrorKind::CompileError);
    assert_eq!(err.message, "[line 1] Error at end: Expect expression.");
}
