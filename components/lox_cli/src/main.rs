//! Lox CLI
//!
//! Entry point for the Lox VM. Parses CLI arguments and delegates to the
//! Runtime for execution.

use std::process::ExitCode;
use std::sync::Once;

use clap::Parser as ClapParser;
use core_types::Value;
use lox_cli::{Cli, CliResult, Runtime};

static TRACING_INIT: Once = Once::new();

/// Install the log subscriber when `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

fn run(cli: Cli) -> CliResult<()> {
    let mut runtime = Runtime::new(cli.config());

    if let Some(file) = &cli.file {
        runtime.execute_file(file)?;
    } else if let Some(code) = &cli.eval {
        let result = runtime.execute_string(code)?;
        if result != Value::Nil {
            println!("{}", runtime.display(result));
        }
    } else {
        runtime.repl()?;
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.is_reported() {
                eprintln!("Error: {}", e);
            }
            ExitCode::from(e.exit_code())
        }
    }
}
