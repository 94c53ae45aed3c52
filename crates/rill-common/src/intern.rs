//! String interning.
//!
//! Identifiers and string literals are deduplicated into a pool owned by
//! the [`Database`](crate::db::Database); equality on [`StringId`] is
//! identifier equality.

use rustc_hash::FxHashMap;
use serde::Serialize;

/// A dense id into the string pool. Equal strings intern to equal ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StringId(pub u32);

/// The string pool. Interning is idempotent; lookup borrows pool storage.
#[derive(Debug, Default)]
pub struct Interner {
    map: FxHashMap<String, StringId>,
    strings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning the id it deduplicates to.
    pub fn intern(&mut self, string: &str) -> StringId {
        if let Some(&id) = self.map.get(string) {
            return id;
        }
        let id = StringId(self.strings.len() as u32);
        self.strings.push(string.to_owned());
        self.map.insert(string.to_owned(), id);
        id
    }

    /// The string an id was interned from.
    pub fn lookup(&self, id: StringId) -> &str {
        &self.strings[id.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strings_deduplicate() {
        let mut interner = Interner::new();
        let a = interner.intern("hello");
        let b = interner.intern("hello");
        let c = interner.intern("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn lookup_round_trips() {
        let mut interner = Interner::new();
        let id = interner.intern("vector");
        assert_eq!(interner.lookup(id), "vector");
    }
}
