//! REPL (Read-Eval-Print Loop) implementation

use core_types::Value;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::{CliError, CliResult};
use crate::runtime::Runtime;

/// Run the interactive REPL
///
/// Lines are accumulated until braces and parentheses balance, then run as
/// one script. Compile and runtime errors are reported by the VM and the
/// loop carries on; globals persist between entries.
pub fn run_repl(runtime: &mut Runtime) -> CliResult<()> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Repl(format!("Failed to initialize editor: {}", e)))?;

    println!("Lox v{}", env!("CARGO_PKG_VERSION"));
    println!("Type .help for commands, .exit to quit.");

    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { "> " } else { "... " };

        match editor.readline(prompt) {
            Ok(line) => {
                if buffer.is_empty() {
                    match line.trim() {
                        ".exit" | "exit" | "quit" => break,
                        ".help" => {
                            print_help();
                            continue;
                        }
                        "" => continue,
                        command if command.starts_with('.') => {
                            println!("Unknown command: {}", command);
                            println!("Type .help for available commands");
                            continue;
                        }
                        _ => {}
                    }
                } else {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                if !is_input_complete(&buffer) {
                    continue;
                }

                let _ = editor.add_history_entry(buffer.as_str());
                match runtime.execute_string(&buffer) {
                    Ok(Value::Nil) => {}
                    Ok(value) => println!("{}", runtime.display(value)),
                    // Already written to stderr by the VM.
                    Err(e) if e.is_reported() => {}
                    Err(e) => eprintln!("Error: {}", e),
                }
                buffer.clear();
            }
            Err(ReadlineError::Interrupted) => {
                if buffer.is_empty() {
                    println!("Press Ctrl-D or type .exit to quit");
                } else {
                    println!("^C");
                    buffer.clear();
                }
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                return Err(CliError::Repl(format!("Readline error: {}", err)));
            }
        }
    }

    Ok(())
}

fn print_help() {
    println!("REPL Commands:");
    println!("  .help     - Show this help message");
    println!("  .exit     - Exit the REPL");
}

/// Check if the input appears to be complete
///
/// Braces and parentheses must balance outside string literals and
/// comments, and any string literal must be closed.
pub fn is_input_complete(input: &str) -> bool {
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        break;
                    }
                }
            }
            '{' | '(' => depth += 1,
            '}' | ')' => depth -= 1,
            _ => {}
        }
    }

    // Too many closers is an error the compiler should report now.
    depth <= 0 && !in_string
}
