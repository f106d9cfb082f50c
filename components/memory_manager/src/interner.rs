//! String interning index.
//!
//! Maps content hashes to the string objects carrying them. Lookup compares
//! (hash, length, bytes) so hash collisions never alias distinct strings.

use core_types::ObjRef;
use rustc_hash::FxHashMap;

use crate::object::Object;

/// 32-bit FNV-1a over raw bytes.
///
/// ```
/// use memory_manager::fnv1a;
///
/// assert_eq!(fnv1a(b""), 2166136261);
/// assert_eq!(fnv1a(b"a"), 0xe40c292c);
/// ```
pub fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 2166136261;
    for &byte in bytes {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}

#[derive(Debug, Default)]
pub(crate) struct InternTable {
    buckets: FxHashMap<u32, Vec<ObjRef>>,
    count: usize,
}

impl InternTable {
    pub(crate) fn find(&self, objects: &[Object], hash: u32, bytes: &[u8]) -> Option<ObjRef> {
        self.buckets.get(&hash)?.iter().copied().find(|r| {
            matches!(
                objects.get(r.index()),
                Some(Object::String(s)) if s.len() == bytes.len() && s.as_bytes() == bytes
            )
        })
    }

    pub(crate) fn insert(&mut self, hash: u32, string: ObjRef) {
        self.buckets.entry(hash).or_default().push(string);
        self.count += 1;
    }

    pub(crate) fn len(&self) -> usize {
        self.count
    }

    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
        self.count = 0;
    }
}
