//! Unit tests for LoxError

use core_types::{ErrorKind, InterpretStatus, LoxError, StackFrame, Value};
use pretty_assertions::assert_eq;

#[test]
fn test_compile_error_has_no_traceback() {
    let error = LoxError::compile("Unknown instruction.");
    assert_eq!(error.kind, ErrorKind::CompileError);
    assert!(!error.is_runtime());
    assert_eq!(error.to_string(), "Unknown instruction.");
}

#[test]
fn test_runtime_error_renders_frames_innermost_first() {
    let error = LoxError::runtime(
        "Undefined variable 'x'.",
        vec![
            StackFrame::new(Some("inner".to_string()), 2),
            StackFrame::new(Some("outer".to_string()), 5),
            StackFrame::new(None, 9),
        ],
    );
    assert!(error.is_runtime());
    assert_eq!(
        error.to_string(),
        "Undefined variable 'x'.\n[line 2] in inner()\n[line 5] in outer()\n[line 9] in script"
    );
}

#[test]
fn test_interpret_status_ok() {
    let result: Result<Value, LoxError> = Ok(Value::Nil);
    assert_eq!(InterpretStatus::from(&result), InterpretStatus::Ok);
}
