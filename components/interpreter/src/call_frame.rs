//! Call frame for function call stack management

use core_types::ObjRef;

/// Maximum call depth. Pushing one more frame is a stack overflow.
pub const FRAMES_MAX: usize = 64;

/// One in-progress function call
///
/// Frames share the VM's value stack; `base` is the absolute index of slot 0,
/// which holds the callee itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallFrame {
    /// Closure being executed
    pub closure: ObjRef,
    /// The closure's function, cached to skip a lookup per instruction
    pub function: ObjRef,
    /// Offset of the next byte to execute in the function's chunk
    pub ip: usize,
    /// Stack index of slot 0
    pub base: usize,
}

impl CallFrame {
    /// A frame positioned at the function's first instruction
    pub fn new(closure: ObjRef, function: ObjRef, base: usize) -> Self {
        Self {
            closure,
            function,
            ip: 0,
            base,
        }
    }
}
