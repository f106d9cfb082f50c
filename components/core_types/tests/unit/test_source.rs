//! Unit tests for StackFrame

use core_types::StackFrame;

#[test]
fn test_named_frame() {
    let frame = StackFrame::new(Some("counter".to_string()), 4);
    assert_eq!(frame.line, 4);
    assert_eq!(frame.to_string(), "[line 4] in counter()");
}

#[test]
fn test_script_frame() {
    let frame = StackFrame::new(None, 1);
    assert_eq!(frame.function_name, None);
    assert_eq!(frame.to_string(), "[line 1] in script");
}
