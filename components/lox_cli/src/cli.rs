//! Command-line arguments

use std::path::PathBuf;

use clap::Parser as ClapParser;
use interpreter::VmConfig;

/// Lox bytecode virtual machine
///
/// With no `--file` or `--eval` the interactive REPL starts.
#[derive(Debug, Clone, ClapParser)]
#[command(name = "lox", version, about)]
pub struct Cli {
    /// Lox script to run
    #[arg(short, long, value_name = "FILE", conflicts_with = "eval")]
    pub file: Option<PathBuf>,

    /// Source code to evaluate; a non-nil result is printed
    #[arg(short, long, value_name = "CODE")]
    pub eval: Option<String>,

    /// Start the interactive REPL
    #[arg(short, long, conflicts_with_all = ["file", "eval"])]
    pub repl: bool,

    /// Print the disassembled bytecode of each script before running it
    #[arg(long)]
    pub print_bytecode: bool,

    /// Log every executed instruction (needs RUST_LOG=trace)
    #[arg(long)]
    pub trace: bool,
}

impl Cli {
    /// VM settings selected by the flags
    pub fn config(&self) -> VmConfig {
        VmConfig::new()
            .with_print_bytecode(self.print_bytecode)
            .with_trace_execution(self.trace)
    }
}
