//! Virtual Machine for bytecode execution
//!
//! Main entry point for running Lox source or compiled functions.

use std::fmt;
use std::io::{self, Write};

use arrayvec::ArrayVec;
use bytecode_system::disassemble_chunk;
use core_types::{ErrorKind, LoxError, ObjRef, Value};
use memory_manager::{Heap, NativeFn, Table};
use tracing::{debug, warn};

use crate::call_frame::{CallFrame, FRAMES_MAX};
use crate::config::VmConfig;
use crate::diagnostics::{traceback, Fault};
use crate::natives::DEFAULT_NATIVES;
use crate::upvalue::OpenUpvalues;

/// Virtual Machine for executing Lox bytecode
///
/// The VM owns all execution state:
/// - The object heap and its string intern table
/// - The global variable table
/// - One value stack shared by every call frame
/// - A fixed-capacity call frame stack
/// - The index of open upvalues
///
/// Globals and heap objects persist across [`VM::interpret`] calls, so a
/// REPL can define something on one line and use it on the next.
pub struct VM {
    pub(crate) heap: Heap,
    pub(crate) globals: Table,
    pub(crate) stack: Vec<Value>,
    pub(crate) frames: ArrayVec<CallFrame, FRAMES_MAX>,
    pub(crate) open_upvalues: OpenUpvalues,
    pub(crate) config: VmConfig,
    pub(crate) output: Box<dyn Write>,
    diagnostics: Box<dyn Write>,
}

impl VM {
    /// Create a new VM with default configuration
    ///
    /// Built-in natives such as `clock` are bound as globals.
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    /// Create a new VM with the given configuration
    pub fn with_config(config: VmConfig) -> Self {
        let mut vm = Self {
            heap: Heap::new(),
            globals: Table::new(),
            stack: Vec::with_capacity(FRAMES_MAX * 256),
            frames: ArrayVec::new(),
            open_upvalues: OpenUpvalues::new(),
            config,
            output: Box::new(io::stdout()),
            diagnostics: Box::new(io::stderr()),
        };
        for &(name, function) in DEFAULT_NATIVES {
            vm.define_native(name, function);
        }
        vm
    }

    /// Send `print` output (and bytecode listings) to `output` instead of
    /// stdout
    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Send error reports to `diagnostics` instead of stderr
    pub fn with_diagnostics(mut self, diagnostics: impl Write + 'static) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    /// Compile and run `source`
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The script's result: the value of a trailing
    ///   expression statement, otherwise nil
    /// * `Err(LoxError)` - Compile or runtime error; the report has already
    ///   been written to the diagnostics writer
    ///
    /// # Example
    ///
    /// ```
    /// use interpreter::VM;
    /// use core_types::Value;
    ///
    /// let mut vm = VM::new();
    /// assert_eq!(vm.interpret("1 + 2").unwrap(), Value::Number(3.0));
    /// ```
    pub fn interpret(&mut self, source: &str) -> Result<Value, LoxError> {
        debug!(bytes = source.len(), "interpret");
        self.reset_stack();
        match parser::compile(source, &mut self.heap) {
            Ok(script) => self.execute(script),
            Err(errors) => Err(self.fail(errors.into())),
        }
    }

    /// Run a function already in the heap as a top-level script
    ///
    /// The function is wrapped in a closure and called with no arguments.
    pub fn execute(&mut self, function: ObjRef) -> Result<Value, LoxError> {
        self.reset_stack();
        if self.config.print_bytecode {
            self.print_bytecode(function);
        }

        let result = self.start(function).and_then(|()| self.run());
        match result {
            Ok(value) => {
                debug!(result = %self.heap.repr(value), "interpret finished");
                Ok(value)
            }
            Err(fault) => {
                let error = match fault.category() {
                    ErrorKind::RuntimeError => {
                        LoxError::runtime(fault.to_string(), traceback(&self.heap, &self.frames))
                    }
                    ErrorKind::CompileError => LoxError::compile(fault.to_string()),
                };
                Err(self.fail(error))
            }
        }
    }

    /// Bind a host function as a global
    pub fn define_native(&mut self, name: &str, function: NativeFn) {
        let native = self.heap.new_native(name, function);
        let key = self.heap.intern_str(name);
        self.globals.set(key, Value::Object(native));
    }

    /// Get a global variable by name
    ///
    /// # Returns
    ///
    /// * `Some(Value)` - The value if the global is bound
    /// * `None` - If it is not
    pub fn get_global(&self, name: &str) -> Option<Value> {
        let key = self.heap.find_interned(name.as_bytes())?;
        self.globals.get(key)
    }

    /// The object heap
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Mutable access to the object heap, for assembling functions by hand
    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// Current depth of the value stack
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Number of active call frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Render a value the way `print` does
    pub fn display(&self, value: Value) -> String {
        self.heap.display(value)
    }

    /// Wrap `function` in a closure, push it and call it with no arguments.
    fn start(&mut self, function: ObjRef) -> Result<(), Fault> {
        let closure = self
            .heap
            .new_closure(function)
            .ok_or(Fault::BadObject(function))?;
        self.stack.push(Value::Object(closure));
        self.call_closure(closure, 0)
    }

    /// Write the report, reset the stack and hand the error back.
    fn fail(&mut self, error: LoxError) -> LoxError {
        debug!(kind = ?error.kind, message = %error.message, "interpret failed");
        if let Err(e) = writeln!(self.diagnostics, "{}", error) {
            warn!(error = %e, "could not write diagnostics");
        }
        self.reset_stack();
        error
    }

    /// Empty the stack and frames. Upvalues still open are closed first so
    /// closures that escaped keep the last values they saw.
    pub(crate) fn reset_stack(&mut self) {
        self.open_upvalues.close(&mut self.heap, &self.stack, 0);
        self.stack.clear();
        self.frames.clear();
    }

    fn print_bytecode(&mut self, script: ObjRef) {
        let mut pending = vec![script];
        let mut listing = String::new();
        while let Some(handle) = pending.pop() {
            let Some(function) = self.heap.function(handle) else {
                continue;
            };
            let name = self
                .heap
                .function_name(handle)
                .unwrap_or_else(|| "<script>".to_string());
            listing.push_str(&disassemble_chunk(&function.chunk, &name, &self.heap));
            pending.extend(
                function
                    .chunk
                    .constants
                    .iter()
                    .rev()
                    .filter_map(Value::as_object)
                    .filter(|r| self.heap.function(*r).is_some()),
            );
        }
        if let Err(e) = self.output.write_all(listing.as_bytes()) {
            warn!(error = %e, "could not write bytecode listing");
        }
    }
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VM")
            .field("objects", &self.heap.object_count())
            .field("globals", &self.globals.len())
            .field("stack_depth", &self.stack.len())
            .field("frames", &self.frames.len())
            .field("open_upvalues", &self.open_upvalues.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Drop for VM {
    fn drop(&mut self) {
        self.reset_stack();
        let stats = self.heap.release_all();
        self.globals.clear();
        debug!(
            objects = stats.objects,
            bytes = stats.bytes,
            "vm torn down"
        );
    }
}
