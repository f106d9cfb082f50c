//! Traceback entries for runtime errors.

use std::fmt;

/// One active call frame at the time a runtime error was raised.
///
/// # Examples
///
/// ```
/// use core_types::StackFrame;
///
/// let frame = StackFrame::new(Some("fib".to_string()), 12);
/// assert_eq!(frame.to_string(), "[line 12] in fib()");
///
/// let top = StackFrame::new(None, 1);
/// assert_eq!(top.to_string(), "[line 1] in script");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Name of the function, or None for the top-level script
    pub function_name: Option<String>,
    /// Source line of the instruction the frame was executing
    pub line: u32,
}

impl StackFrame {
    /// Create a traceback entry.
    pub fn new(function_name: Option<String>, line: u32) -> Self {
        Self {
            function_name,
            line,
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function_name {
            Some(name) => write!(f, "[line {}] in {}()", self.line, name),
            None => write!(f, "[line {}] in script", self.line),
        }
    }
}
