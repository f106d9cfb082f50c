//! Runtime orchestration for Lox execution
//!
//! The Runtime owns one VM for its whole life, so globals defined by one
//! call (or one REPL line) are visible to the next.

use std::fs;
use std::path::Path;

use core_types::Value;
use interpreter::{VmConfig, VM};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Persistent VM plus the file and REPL entry points around it
#[derive(Debug)]
pub struct Runtime {
    vm: VM,
}

impl Runtime {
    /// Create a runtime whose VM uses `config`
    ///
    /// # Example
    /// ```
    /// use interpreter::VmConfig;
    /// use lox_cli::Runtime;
    ///
    /// let runtime = Runtime::new(VmConfig::default());
    /// ```
    pub fn new(config: VmConfig) -> Self {
        Self::from_vm(VM::with_config(config))
    }

    /// Wrap an already configured VM, e.g. one with redirected output
    pub fn from_vm(vm: VM) -> Self {
        Self { vm }
    }

    /// Execute a Lox file
    ///
    /// # Errors
    /// `CliError::Io` if the file cannot be read, `CliError::Lox` if it
    /// fails to compile or run
    ///
    /// # Example
    /// ```no_run
    /// use interpreter::VmConfig;
    /// use lox_cli::Runtime;
    ///
    /// let mut runtime = Runtime::new(VmConfig::default());
    /// let result = runtime.execute_file("example.lox").unwrap();
    /// ```
    pub fn execute_file(&mut self, path: impl AsRef<Path>) -> CliResult<Value> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = source.len(), "loaded script");
        self.execute_string(&source)
    }

    /// Execute a Lox source string
    ///
    /// # Example
    /// ```
    /// use core_types::Value;
    /// use interpreter::VmConfig;
    /// use lox_cli::Runtime;
    ///
    /// let mut runtime = Runtime::new(VmConfig::default());
    /// let result = runtime.execute_string("var x = 40; x + 2").unwrap();
    /// assert_eq!(result, Value::Number(42.0));
    /// ```
    pub fn execute_string(&mut self, source: &str) -> CliResult<Value> {
        Ok(self.vm.interpret(source)?)
    }

    /// Render a value the way `print` does
    pub fn display(&self, value: Value) -> String {
        self.vm.display(value)
    }

    /// The underlying VM
    pub fn vm(&self) -> &VM {
        &self.vm
    }

    /// Start the interactive REPL
    pub fn repl(&mut self) -> CliResult<()> {
        crate::repl::run_repl(self)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(VmConfig::default())
    }
}
