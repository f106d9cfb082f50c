//! Dispatch loop for bytecode execution
//!
//! Decodes one opcode at a time from the innermost frame and executes it
//! against the shared value stack. Every precondition an instruction has
//! (operand count, operand types, operand indices) is checked inline and
//! reported as a [`Fault`].

use std::io::Write;

use bytecode_system::{disassemble_instruction, OpCode};
use core_types::{ObjRef, Value};
use memory_manager::Object;
use tracing::trace;

use crate::call_frame::CallFrame;
use crate::diagnostics::Fault;
use crate::upvalue;
use crate::vm::VM;

impl VM {
    /// Run until the outermost frame returns.
    pub(crate) fn run(&mut self) -> Result<Value, Fault> {
        loop {
            if self.config.trace_execution {
                self.trace_instruction();
            }

            let byte = self.read_byte()?;
            let op = OpCode::try_from(byte).map_err(|e| Fault::UnknownOpcode(e.0))?;

            match op {
                OpCode::Constant => {
                    let value = self.read_constant()?;
                    self.stack.push(value);
                }
                OpCode::Nil => self.stack.push(Value::Nil),
                OpCode::True => self.stack.push(Value::Bool(true)),
                OpCode::False => self.stack.push(Value::Bool(false)),
                OpCode::Pop => {
                    self.pop()?;
                }
                OpCode::GetLocal => {
                    let slot = self.local_slot()?;
                    self.stack.push(self.stack[slot]);
                }
                OpCode::SetLocal => {
                    let slot = self.local_slot()?;
                    let value = self.peek(0)?;
                    self.stack[slot] = value;
                }
                OpCode::GetGlobal => {
                    let name = self.read_string()?;
                    match self.globals.get(name) {
                        Some(value) => self.stack.push(value),
                        None => return Err(self.undefined(name)),
                    }
                }
                OpCode::DefineGlobal => {
                    let name = self.read_string()?;
                    let value = self.pop()?;
                    self.globals.set(name, value);
                }
                OpCode::SetGlobal => {
                    let name = self.read_string()?;
                    let value = self.peek(0)?;
                    // Assignment never declares: undo the binding set() created.
                    if self.globals.set(name, value) {
                        self.globals.remove(name);
                        return Err(self.undefined(name));
                    }
                }
                OpCode::GetUpvalue => {
                    let handle = self.frame_upvalue()?;
                    let value = upvalue::read(&self.heap, &self.stack, handle)?;
                    self.stack.push(value);
                }
                OpCode::SetUpvalue => {
                    let handle = self.frame_upvalue()?;
                    let value = self.peek(0)?;
                    upvalue::write(&mut self.heap, &mut self.stack, handle, value)?;
                }
                OpCode::Equal => {
                    let b = self.peek(0)?;
                    let a = self.peek(1)?;
                    self.stack.truncate(self.stack.len() - 2);
                    self.stack.push(Value::Bool(self.heap.values_equal(a, b)));
                }
                OpCode::Greater => {
                    let (a, b) = self.pop_numbers()?;
                    self.stack.push(Value::Bool(a > b));
                }
                OpCode::Less => {
                    let (a, b) = self.pop_numbers()?;
                    self.stack.push(Value::Bool(a < b));
                }
                OpCode::Add => self.add()?,
                OpCode::Subtract => {
                    let (a, b) = self.pop_numbers()?;
                    self.stack.push(Value::Number(a - b));
                }
                OpCode::Multiply => {
                    let (a, b) = self.pop_numbers()?;
                    self.stack.push(Value::Number(a * b));
                }
                OpCode::Divide => {
                    let (a, b) = self.pop_numbers()?;
                    self.stack.push(Value::Number(a / b));
                }
                OpCode::Not => {
                    let negated = match self.peek(0)? {
                        Value::Nil => true,
                        Value::Bool(b) => !b,
                        _ => return Err(Fault::OperandNotBool),
                    };
                    self.stack.pop();
                    self.stack.push(Value::Bool(negated));
                }
                OpCode::Negate => {
                    let n = self.peek(0)?.as_number().ok_or(Fault::OperandNotNumber)?;
                    self.stack.pop();
                    self.stack.push(Value::Number(-n));
                }
                OpCode::Print => {
                    let value = self.pop()?;
                    let text = self.heap.display(value);
                    writeln!(self.output, "{}", text).map_err(|e| Fault::Output(e.to_string()))?;
                }
                OpCode::Jump => {
                    let offset = self.read_u16()?;
                    self.frame_mut()?.ip += offset as usize;
                }
                OpCode::JumpIfFalse => {
                    let offset = self.read_u16()?;
                    if self.peek(0)?.is_falsy() {
                        self.frame_mut()?.ip += offset as usize;
                    }
                }
                OpCode::Loop => {
                    let offset = self.read_u16()?;
                    let frame = self.frame_mut()?;
                    frame.ip = frame
                        .ip
                        .checked_sub(offset as usize)
                        .ok_or(Fault::CodeOverrun)?;
                }
                OpCode::Call => {
                    let arg_count = self.read_byte()?;
                    let callee = self.peek(arg_count as usize)?;
                    self.call_value(callee, arg_count)?;
                }
                OpCode::Closure => self.make_closure()?,
                OpCode::CloseUpvalue => {
                    let top = self.stack.len().checked_sub(1).ok_or(Fault::StackUnderflow)?;
                    self.open_upvalues.close(&mut self.heap, &self.stack, top);
                    self.stack.pop();
                }
                OpCode::Return => {
                    let result = self.pop()?;
                    let frame = self.frames.pop().ok_or(Fault::NoActiveFrame)?;
                    self.open_upvalues
                        .close(&mut self.heap, &self.stack, frame.base);
                    self.stack.truncate(frame.base);
                    if self.frames.is_empty() {
                        return Ok(result);
                    }
                    self.stack.push(result);
                }
            }
        }
    }

    /// Call `callee`, which sits `arg_count` slots below the stack top.
    ///
    /// A failed call leaves the stack and frames exactly as they were.
    pub(crate) fn call_value(&mut self, callee: Value, arg_count: u8) -> Result<(), Fault> {
        let Value::Object(handle) = callee else {
            return Err(Fault::NotCallable);
        };
        match self.heap.get(handle) {
            Some(Object::Closure(_)) => self.call_closure(handle, arg_count),
            Some(Object::Native(native)) => {
                let function = native.function;
                let args_start = self
                    .stack
                    .len()
                    .checked_sub(arg_count as usize)
                    .filter(|&start| start > 0)
                    .ok_or(Fault::StackUnderflow)?;
                let result = function(&self.stack[args_start..]);
                self.stack.truncate(args_start - 1);
                self.stack.push(result);
                Ok(())
            }
            _ => Err(Fault::NotCallable),
        }
    }

    /// Push a frame for `closure` over the callee and its arguments.
    pub(crate) fn call_closure(&mut self, closure: ObjRef, arg_count: u8) -> Result<(), Fault> {
        let function = self
            .heap
            .closure(closure)
            .ok_or(Fault::BadObject(closure))?
            .function;
        let arity = self
            .heap
            .function(function)
            .ok_or(Fault::BadObject(function))?
            .arity;
        if arity != arg_count {
            return Err(Fault::ArityMismatch {
                expected: arity,
                got: arg_count,
            });
        }

        let base = self
            .stack
            .len()
            .checked_sub(arg_count as usize + 1)
            .ok_or(Fault::StackUnderflow)?;
        self.frames
            .try_push(CallFrame::new(closure, function, base))
            .map_err(|_| Fault::StackOverflow)
    }

    fn make_closure(&mut self) -> Result<(), Fault> {
        let index = self.read_byte()? as usize;
        let function = self.constant(index)?;
        let closure = function
            .as_object()
            .and_then(|r| self.heap.new_closure(r))
            .ok_or(Fault::ConstantType {
                index,
                expected: "function",
            })?;
        self.stack.push(Value::Object(closure));

        let frame = self.frame()?;
        let count = self
            .heap
            .closure(closure)
            .map_or(0, |c| c.upvalues.len());
        for i in 0..count {
            let is_local = self.read_byte()?;
            let index = self.read_byte()? as usize;
            let captured = if is_local != 0 {
                let slot = frame.base + index;
                if slot >= self.stack.len() {
                    return Err(Fault::BadSlot(index));
                }
                self.open_upvalues.capture(&mut self.heap, slot)
            } else {
                self.enclosing_upvalue(frame.closure, index)?
            };
            if let Some(c) = self.heap.closure_mut(closure) {
                c.upvalues[i] = Some(captured);
            }
        }
        Ok(())
    }

    fn add(&mut self) -> Result<(), Fault> {
        let b = self.peek(0)?;
        let a = self.peek(1)?;
        let sum = match (a, b) {
            (Value::Number(x), Value::Number(y)) => Value::Number(x + y),
            (Value::Object(x), Value::Object(y)) => self
                .heap
                .concat(x, y)
                .map(Value::Object)
                .ok_or(Fault::InvalidAddOperands)?,
            _ => return Err(Fault::InvalidAddOperands),
        };
        self.stack.truncate(self.stack.len() - 2);
        self.stack.push(sum);
        Ok(())
    }

    /// Pop two number operands, left first. Checks before popping.
    fn pop_numbers(&mut self) -> Result<(f64, f64), Fault> {
        let b = self.peek(0)?;
        let a = self.peek(1)?;
        let (Some(a), Some(b)) = (a.as_number(), b.as_number()) else {
            return Err(Fault::OperandsNotNumbers);
        };
        self.stack.truncate(self.stack.len() - 2);
        Ok((a, b))
    }

    fn pop(&mut self) -> Result<Value, Fault> {
        self.stack.pop().ok_or(Fault::StackUnderflow)
    }

    fn peek(&self, distance: usize) -> Result<Value, Fault> {
        self.stack
            .len()
            .checked_sub(distance + 1)
            .map(|i| self.stack[i])
            .ok_or(Fault::StackUnderflow)
    }

    fn frame(&self) -> Result<CallFrame, Fault> {
        self.frames.last().copied().ok_or(Fault::NoActiveFrame)
    }

    fn frame_mut(&mut self) -> Result<&mut CallFrame, Fault> {
        self.frames.last_mut().ok_or(Fault::NoActiveFrame)
    }

    fn read_byte(&mut self) -> Result<u8, Fault> {
        let frame = self.frames.last_mut().ok_or(Fault::NoActiveFrame)?;
        let function = self
            .heap
            .function(frame.function)
            .ok_or(Fault::BadObject(frame.function))?;
        let byte = *function
            .chunk
            .code
            .get(frame.ip)
            .ok_or(Fault::CodeOverrun)?;
        frame.ip += 1;
        Ok(byte)
    }

    fn read_u16(&mut self) -> Result<u16, Fault> {
        let hi = self.read_byte()?;
        let lo = self.read_byte()?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    fn constant(&self, index: usize) -> Result<Value, Fault> {
        let frame = self.frame()?;
        self.heap
            .function(frame.function)
            .ok_or(Fault::BadObject(frame.function))?
            .chunk
            .constants
            .get(index)
            .copied()
            .ok_or(Fault::BadConstant(index))
    }

    fn read_constant(&mut self) -> Result<Value, Fault> {
        let index = self.read_byte()? as usize;
        self.constant(index)
    }

    fn read_string(&mut self) -> Result<ObjRef, Fault> {
        let index = self.read_byte()? as usize;
        self.constant(index)?
            .as_object()
            .filter(|r| self.heap.string(*r).is_some())
            .ok_or(Fault::ConstantType {
                index,
                expected: "string",
            })
    }

    /// Absolute stack index for the local slot operand that follows.
    fn local_slot(&mut self) -> Result<usize, Fault> {
        let offset = self.read_byte()? as usize;
        let slot = self.frame()?.base + offset;
        if slot < self.stack.len() {
            Ok(slot)
        } else {
            Err(Fault::BadSlot(offset))
        }
    }

    /// Upvalue of the running closure named by the operand that follows.
    fn frame_upvalue(&mut self) -> Result<ObjRef, Fault> {
        let index = self.read_byte()? as usize;
        let closure = self.frame()?.closure;
        self.enclosing_upvalue(closure, index)
    }

    fn enclosing_upvalue(&self, closure: ObjRef, index: usize) -> Result<ObjRef, Fault> {
        self.heap
            .closure(closure)
            .and_then(|c| c.upvalues.get(index).copied().flatten())
            .ok_or(Fault::BadUpvalue(index))
    }

    fn undefined(&self, name: ObjRef) -> Fault {
        Fault::UndefinedVariable(self.heap.display(Value::Object(name)))
    }

    fn trace_instruction(&self) {
        let Ok(frame) = self.frame() else {
            return;
        };
        let Some(function) = self.heap.function(frame.function) else {
            return;
        };
        if frame.ip >= function.chunk.len() {
            return;
        }
        let stack: String = self
            .stack
            .iter()
            .map(|v| format!("[ {} ]", self.heap.repr(*v)))
            .collect();
        let mut line = String::new();
        disassemble_instruction(&function.chunk, frame.ip, &self.heap, &mut line);
        trace!(stack = %stack, "{}", line.trim_end());
    }
}
