//! Built-in native capabilities registered in every VM

use std::time::{SystemTime, UNIX_EPOCH};

use core_types::Value;
use memory_manager::NativeFn;

/// Natives bound as globals when a VM is constructed
///
/// `GetSystemTimeInSeconds` and `clock` are the same capability under two
/// names.
pub const DEFAULT_NATIVES: &[(&str, NativeFn)] = &[
    ("GetSystemTimeInSeconds", clock),
    ("clock", clock),
];

/// Wall-clock seconds since the Unix epoch. Ignores its arguments.
pub fn clock(_args: &[Value]) -> Value {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0);
    Value::Number(seconds)
}
