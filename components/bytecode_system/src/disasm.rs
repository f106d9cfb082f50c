//! Human-readable listing of a chunk.
//!
//! A chunk cannot see the heap its object constants live in, so rendering a
//! constant (and knowing how many upvalue pairs follow a `Closure`) is
//! delegated to a [`ConstantInfo`] implementation.

use std::fmt::Write;

use core_types::Value;

use crate::chunk::Chunk;
use crate::opcode::OpCode;

/// Heap-side knowledge the disassembler needs about constants.
pub trait ConstantInfo {
    /// Render a constant for the listing
    fn describe(&self, value: &Value) -> String;

    /// Upvalue count of a function constant, 0 for anything else
    fn upvalue_count(&self, value: &Value) -> usize;
}

/// Renders scalars only; object constants show as handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainConstants;

impl ConstantInfo for PlainConstants {
    fn describe(&self, value: &Value) -> String {
        value.to_string()
    }

    fn upvalue_count(&self, _value: &Value) -> usize {
        0
    }
}

/// Disassemble the whole chunk under a `== name ==` header.
pub fn disassemble_chunk(chunk: &Chunk, name: &str, info: &dyn ConstantInfo) -> String {
    let mut out = format!("== {} ==\n", name);
    let mut offset = 0;
    while offset < chunk.len() {
        offset = disassemble_instruction(chunk, offset, info, &mut out);
    }
    out
}

/// Append one instruction line to `out` and return the next offset.
pub fn disassemble_instruction(
    chunk: &Chunk,
    offset: usize,
    info: &dyn ConstantInfo,
    out: &mut String,
) -> usize {
    let _ = write!(out, "{:04} ", offset);
    match (chunk.line_at(offset), offset.checked_sub(1).and_then(|p| chunk.line_at(p))) {
        (Some(line), Some(prev)) if line == prev => out.push_str("   | "),
        (Some(line), _) => {
            let _ = write!(out, "{:4} ", line);
        }
        (None, _) => out.push_str("   ? "),
    }

    let byte = chunk.code[offset];
    let op = match OpCode::try_from(byte) {
        Ok(op) => op,
        Err(e) => {
            let _ = writeln!(out, "{}", e);
            return offset + 1;
        }
    };

    match op {
        OpCode::Constant | OpCode::GetGlobal | OpCode::DefineGlobal | OpCode::SetGlobal => {
            constant_instruction(op, chunk, offset, info, out)
        }
        OpCode::GetLocal
        | OpCode::SetLocal
        | OpCode::GetUpvalue
        | OpCode::SetUpvalue
        | OpCode::Call => byte_instruction(op, chunk, offset, out),
        OpCode::Jump | OpCode::JumpIfFalse => jump_instruction(op, true, chunk, offset, out),
        OpCode::Loop => jump_instruction(op, false, chunk, offset, out),
        OpCode::Closure => closure_instruction(chunk, offset, info, out),
        _ => {
            let _ = writeln!(out, "{}", op.name());
            offset + 1
        }
    }
}

fn constant_instruction(
    op: OpCode,
    chunk: &Chunk,
    offset: usize,
    info: &dyn ConstantInfo,
    out: &mut String,
) -> usize {
    let Some(&index) = chunk.code.get(offset + 1) else {
        let _ = writeln!(out, "{:<16} <truncated>", op.name());
        return chunk.len();
    };
    let rendered = chunk
        .constants
        .get(index as usize)
        .map(|v| info.describe(v))
        .unwrap_or_else(|| "<bad constant>".to_string());
    let _ = writeln!(out, "{:<16} {:4} '{}'", op.name(), index, rendered);
    offset + 2
}

fn byte_instruction(op: OpCode, chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    match chunk.code.get(offset + 1) {
        Some(slot) => {
            let _ = writeln!(out, "{:<16} {:4}", op.name(), slot);
            offset + 2
        }
        None => {
            let _ = writeln!(out, "{:<16} <truncated>", op.name());
            chunk.len()
        }
    }
}

fn jump_instruction(
    op: OpCode,
    forward: bool,
    chunk: &Chunk,
    offset: usize,
    out: &mut String,
) -> usize {
    let Some(jump) = chunk.read_u16(offset + 1) else {
        let _ = writeln!(out, "{:<16} <truncated>", op.name());
        return chunk.len();
    };
    let next = offset + 3;
    let target = if forward {
        next as i64 + jump as i64
    } else {
        next as i64 - jump as i64
    };
    let _ = writeln!(out, "{:<16} {:4} -> {}", op.name(), offset, target);
    next
}

fn closure_instruction(
    chunk: &Chunk,
    offset: usize,
    info: &dyn ConstantInfo,
    out: &mut String,
) -> usize {
    let Some(&index) = chunk.code.get(offset + 1) else {
        let _ = writeln!(out, "{:<16} <truncated>", OpCode::Closure.name());
        return chunk.len();
    };
    let constant = chunk.constants.get(index as usize);
    let rendered = constant
        .map(|v| info.describe(v))
        .unwrap_or_else(|| "<bad constant>".to_string());
    let _ = writeln!(out, "{:<16} {:4} {}", OpCode::Closure.name(), index, rendered);

    let mut next = offset + 2;
    let upvalues = constant.map(|v| info.upvalue_count(v)).unwrap_or(0);
    for _ in 0..upvalues {
        let (Some(&is_local), Some(&slot)) = (chunk.code.get(next), chunk.code.get(next + 1))
        else {
            return chunk.len();
        };
        let kind = if is_local != 0 { "local" } else { "upvalue" };
        let _ = writeln!(out, "{:04}    |                     {} {}", next, kind, slot);
        next += 2;
    }
    next
}
