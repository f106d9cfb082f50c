//! VM configuration

/// Debug switches for a [`VM`](crate::VM)
///
/// # Example
///
/// ```
/// use interpreter::VmConfig;
///
/// let config = VmConfig::new().with_trace_execution(true);
/// assert!(config.trace_execution);
/// assert!(!config.print_bytecode);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VmConfig {
    /// Log every instruction with the stack contents at `trace` level
    pub trace_execution: bool,
    /// Write a disassembly of each compiled script to the output writer
    /// before running it
    pub print_bytecode: bool,
}

impl VmConfig {
    /// All switches off
    pub fn new() -> Self {
        Self::default()
    }

    /// Set [`VmConfig::trace_execution`]
    pub fn with_trace_execution(mut self, enabled: bool) -> Self {
        self.trace_execution = enabled;
        self
    }

    /// Set [`VmConfig::print_bytecode`]
    pub fn with_print_bytecode(mut self, enabled: bool) -> Self {
        self.print_bytecode = enabled;
        self
    }
}
