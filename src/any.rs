//! Representation selection.

use crate::contract::Trie;
use crate::error::{Error, Result};
use crate::pointer::PointerTrie;
use crate::succinct::{SuccinctBuilder, SuccinctTrie};

/// Which representation [`AnyTrie`] should hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TrieKind {
    /// Mutable node graph.
    #[default]
    Pointer,
    /// Frozen rank/select encoding.
    Succinct,
}

/// A trie of either representation, chosen by the caller.
///
/// Mutation through [`put`](AnyTrie::put) and [`delete`](AnyTrie::delete)
/// fails with [`Error::ReadOnly`] on the succinct representation. Mutate a
/// pointer trie and call [`freeze`](AnyTrie::freeze) once the data settles.
#[derive(Debug)]
pub enum AnyTrie<V> {
    Pointer(PointerTrie<V>),
    Succinct(SuccinctTrie<V>),
}

impl<V> AnyTrie<V> {
    /// An empty trie of the given kind.
    pub fn new(kind: TrieKind) -> Self {
        match kind {
            TrieKind::Pointer => Self::Pointer(PointerTrie::new()),
            TrieKind::Succinct => Self::Succinct(SuccinctTrie::empty()),
        }
    }

    /// A trie of the given kind holding `entries`. Later duplicates win.
    pub fn from_entries<K, I>(kind: TrieKind, entries: I) -> Result<Self>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let trie: PointerTrie<V> = entries.into_iter().collect();
        match kind {
            TrieKind::Pointer => Ok(Self::Pointer(trie)),
            TrieKind::Succinct => Ok(Self::Succinct(SuccinctBuilder::from_pointer(trie)?)),
        }
    }

    pub fn kind(&self) -> TrieKind {
        match self {
            Self::Pointer(_) => TrieKind::Pointer,
            Self::Succinct(_) => TrieKind::Succinct,
        }
    }

    /// Store `value` at `key`. Returns true if `key` held no value before.
    pub fn put(&mut self, key: &str, value: V) -> Result<bool> {
        match self {
            Self::Pointer(t) => Ok(t.put(key, value)),
            Self::Succinct(_) => Err(Error::ReadOnly),
        }
    }

    /// Remove the value at `key`. Returns true if a value was removed.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        match self {
            Self::Pointer(t) => Ok(t.delete(key)),
            Self::Succinct(_) => Err(Error::ReadOnly),
        }
    }

    pub fn as_pointer_mut(&mut self) -> Option<&mut PointerTrie<V>> {
        match self {
            Self::Pointer(t) => Some(t),
            Self::Succinct(_) => None,
        }
    }

    /// Rebuild as a succinct trie. Already-succinct tries pass through.
    pub fn freeze(self) -> Result<Self> {
        match self {
            Self::Pointer(t) => Ok(Self::Succinct(SuccinctBuilder::from_pointer(t)?)),
            succinct @ Self::Succinct(_) => Ok(succinct),
        }
    }
}

impl<V> Default for AnyTrie<V> {
    fn default() -> Self {
        Self::new(TrieKind::default())
    }
}

impl<V> From<PointerTrie<V>> for AnyTrie<V> {
    fn from(t: PointerTrie<V>) -> Self {
        Self::Pointer(t)
    }
}

impl<V> From<SuccinctTrie<V>> for AnyTrie<V> {
    fn from(t: SuccinctTrie<V>) -> Self {
        Self::Succinct(t)
    }
}

impl<V> Trie<V> for AnyTrie<V> {
    fn get(&self, key: &str) -> Option<&V> {
        match self {
            Self::Pointer(t) => t.get(key),
            Self::Succinct(t) => t.get(key),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Pointer(t) => t.len(),
            Self::Succinct(t) => t.len(),
        }
    }

    fn iterate<E, F>(&self, key: &str, cb: F) -> std::result::Result<(), E>
    where
        F: FnMut(&str, &V) -> std::result::Result<(), E>,
    {
        match self {
            Self::Pointer(t) => t.iterate(key, cb),
            Self::Succinct(t) => t.iterate(key, cb),
        }
    }

    fn iterate_all<E, F>(&self, cb: F) -> std::result::Result<(), E>
    where
        F: FnMut(&str, &V) -> std::result::Result<(), E>,
    {
        match self {
            Self::Pointer(t) => t.iterate_all(cb),
            Self::Succinct(t) => t.iterate_all(cb),
        }
    }

    fn walk_prefix<E, F>(&self, prefix: &str, cb: F) -> std::result::Result<(), E>
    where
        F: FnMut(&str, &V) -> std::result::Result<(), E>,
    {
        match self {
            Self::Pointer(t) => t.walk_prefix(prefix, cb),
            Self::Succinct(t) => t.walk_prefix(prefix, cb),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pointer() {
        let t: AnyTrie<u64> = AnyTrie::default();
        assert_eq!(t.kind(), TrieKind::Pointer);
        assert_eq!(TrieKind::default(), TrieKind::Pointer);
    }

    #[test]
    fn test_succinct_rejects_mutation() {
        let mut t: AnyTrie<u64> = AnyTrie::new(TrieKind::Succinct);
        assert!(matches!(t.put("a", 1), Err(Error::ReadOnly)));
        assert!(matches!(t.delete("a"), Err(Error::ReadOnly)));
        assert!(t.as_pointer_mut().is_none());
        assert!(t.is_empty());
    }

    #[test]
    fn test_freeze() {
        let mut t: AnyTrie<u64> = AnyTrie::new(TrieKind::Pointer);
        assert!(t.put("cat", 1).unwrap());
        assert!(t.put("dog", 2).unwrap());
        assert!(!t.put("cat", 3).unwrap());

        let frozen = t.freeze().unwrap();
        assert_eq!(frozen.kind(), TrieKind::Succinct);
        assert_eq!(frozen.get("cat"), Some(&3));
        assert_eq!(frozen.len(), 2);

        let again = frozen.freeze().unwrap();
        assert_eq!(again.kind(), TrieKind::Succinct);
    }

    #[test]
    fn test_from_entries_both_kinds() {
        let entries = [("a", 1u64), ("ab", 2), ("a", 3)];
        for kind in [TrieKind::Pointer, TrieKind::Succinct] {
            let t = AnyTrie::from_entries(kind, entries).unwrap();
            assert_eq!(t.kind(), kind);
            assert_eq!(t.len(), 2);
            assert_eq!(t.get("a"), Some(&3));
            assert_eq!(t.prefix_search("a"), vec!["a", "ab"]);
        }
    }
}
