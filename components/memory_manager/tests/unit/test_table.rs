//! Tests for Table

use core_types::Value;
use memory_manager::{Heap, Table};

#[test]
fn test_keys_are_interned_strings() {
    let mut heap = Heap::new();
    let mut table = Table::new();
    let key = heap.intern_str("answer");

    assert!(table.set(key, Value::Number(42.0)));
    let lookup = heap.intern_str("answer");
    assert_eq!(table.get(lookup), Some(Value::Number(42.0)));
}

#[test]
fn test_iter_visits_every_binding() {
    let mut heap = Heap::new();
    let mut table = Table::new();
    for name in ["a", "b", "c"] {
        let key = heap.intern_str(name);
        table.set(key, Value::Bool(true));
    }
    assert_eq!(table.iter().count(), 3);
    table.clear();
    assert!(table.is_empty());
}
