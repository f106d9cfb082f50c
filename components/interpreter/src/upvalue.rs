//! Upvalue support for closures
//!
//! Captured variables start out open, aliasing a slot of the VM stack, and
//! are closed (copied into the upvalue object) when that slot goes away.
//! At most one open upvalue exists per slot, so closures that capture the
//! same variable share one upvalue object and see each other's writes.

use std::collections::BTreeMap;

use core_types::{ObjRef, Value};
use memory_manager::{Heap, UpvalueState};

use crate::diagnostics::Fault;

/// Index of the open upvalues, keyed by absolute stack slot
#[derive(Debug, Default)]
pub struct OpenUpvalues {
    by_slot: BTreeMap<usize, ObjRef>,
}

impl OpenUpvalues {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// The open upvalue for `slot`, created on first capture.
    pub fn capture(&mut self, heap: &mut Heap, slot: usize) -> ObjRef {
        *self
            .by_slot
            .entry(slot)
            .or_insert_with(|| heap.new_upvalue(slot))
    }

    /// Close every open upvalue at or above `boundary`, highest slot first.
    ///
    /// Each one takes a copy of its slot's current value and leaves the
    /// index. Returns how many were closed.
    pub fn close(&mut self, heap: &mut Heap, stack: &[Value], boundary: usize) -> usize {
        let closing = self.by_slot.split_off(&boundary);
        let count = closing.len();
        for (slot, handle) in closing.into_iter().rev() {
            let value = stack.get(slot).copied().unwrap_or_default();
            if let Some(upvalue) = heap.upvalue_mut(handle) {
                upvalue.state = UpvalueState::Closed(value);
            }
        }
        count
    }

    /// The open upvalue for `slot`, if any
    pub fn get(&self, slot: usize) -> Option<ObjRef> {
        self.by_slot.get(&slot).copied()
    }

    /// Number of open upvalues
    pub fn len(&self) -> usize {
        self.by_slot.len()
    }

    /// Returns true when nothing is open
    pub fn is_empty(&self) -> bool {
        self.by_slot.is_empty()
    }
}

/// Current value of a captured variable
pub fn read(heap: &Heap, stack: &[Value], upvalue: ObjRef) -> Result<Value, Fault> {
    match heap.upvalue(upvalue).ok_or(Fault::BadObject(upvalue))?.state {
        UpvalueState::Open(slot) => stack.get(slot).copied().ok_or(Fault::BadSlot(slot)),
        UpvalueState::Closed(value) => Ok(value),
    }
}

/// Assign a captured variable, wherever it currently lives
pub fn write(
    heap: &mut Heap,
    stack: &mut [Value],
    upvalue: ObjRef,
    value: Value,
) -> Result<(), Fault> {
    let upvalue = heap.upvalue_mut(upvalue).ok_or(Fault::BadObject(upvalue))?;
    match &mut upvalue.state {
        UpvalueState::Open(slot) => {
            let slot = *slot;
            *stack.get_mut(slot).ok_or(Fault::BadSlot(slot))? = value;
        }
        UpvalueState::Closed(closed) => *closed = value,
    }
    Ok(())
}
