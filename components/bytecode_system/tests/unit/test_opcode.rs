//! Tests for OpCode encoding

use bytecode_system::{OpCode, UnknownOpCode};

#[test]
fn test_every_opcode_decodes_to_itself() {
    for op in OpCode::ALL {
        assert_eq!(OpCode::try_from(u8::from(op)), Ok(op));
    }
}

#[test]
fn test_unknown_byte_is_rejected() {
    let err = OpCode::try_from(200).unwrap_err();
    assert_eq!(err, UnknownOpCode(200));
    assert_eq!(err.to_string(), "unknown opcode 0xc8");
}

#[test]
fn test_binary_arithmetic_classification() {
    assert!(OpCode::Add.is_binary_arithmetic());
    assert!(OpCode::Divide.is_binary_arithmetic());
    assert!(!OpCode::Negate.is_binary_arithmetic());
    assert!(!OpCode::Equal.is_binary_arithmetic());
}

#[test]
fn test_mnemonics_are_unique() {
    let mut names: Vec<_> = OpCode::ALL.iter().map(|op| op.name()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), OpCode::ALL.len());
}
