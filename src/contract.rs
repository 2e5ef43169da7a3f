//! Behavior shared by every trie representation.

use crate::pointer::PointerTrie;
use crate::succinct::SuccinctTrie;

/// Read access common to all representations.
///
/// Traversal callbacks receive the key of each visited node and its value.
/// Returning `Err(e)` stops the traversal at once and the same `e` is
/// returned to the caller; callbacks already made are not undone.
///
/// Result order of [`iterate_all`](Trie::iterate_all) and
/// [`prefix_search`](Trie::prefix_search) is representation-specific; only
/// the set of visited keys is part of the contract.
pub trait Trie<V> {
    /// Value stored at `key`. The empty key addresses the root.
    fn get(&self, key: &str) -> Option<&V>;

    /// Number of stored keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Visit the value-holding nodes on the root-to-`key` path, shortest
    /// prefix first, stopping quietly at the first missing edge.
    fn iterate<E, F>(&self, key: &str, cb: F) -> Result<(), E>
    where
        F: FnMut(&str, &V) -> Result<(), E>;

    /// Visit every stored key exactly once.
    fn iterate_all<E, F>(&self, cb: F) -> Result<(), E>
    where
        F: FnMut(&str, &V) -> Result<(), E>;

    /// Visit every stored key that starts with `prefix`.
    fn walk_prefix<E, F>(&self, prefix: &str, cb: F) -> Result<(), E>
    where
        F: FnMut(&str, &V) -> Result<(), E>;

    /// Every stored key that starts with `prefix`; empty if there is none.
    fn prefix_search(&self, prefix: &str) -> Vec<String> {
        let mut keys = Vec::new();
        let walked = self.walk_prefix(prefix, |key, _| {
            keys.push(key.to_owned());
            Ok::<(), std::convert::Infallible>(())
        });
        if let Err(never) = walked {
            match never {}
        }
        keys
    }
}

/// Mutation, available only on representations that support it.
pub trait TrieMut<V>: Trie<V> {
    /// Store `value` at `key`, returning the previous value.
    fn insert(&mut self, key: &str, value: V) -> Option<V>;

    /// Remove and return the value at `key`, pruning emptied nodes.
    fn remove(&mut self, key: &str) -> Option<V>;

    /// Store `value` at `key`. Returns true if `key` held no value before.
    fn put(&mut self, key: &str, value: V) -> bool {
        self.insert(key, value).is_none()
    }

    /// Remove the value at `key`. Returns true if a value was removed.
    fn delete(&mut self, key: &str) -> bool {
        self.remove(key).is_some()
    }
}

impl<V> Trie<V> for PointerTrie<V> {
    fn get(&self, key: &str) -> Option<&V> {
        PointerTrie::get(self, key)
    }

    fn len(&self) -> usize {
        PointerTrie::len(self)
    }

    fn iterate<E, F>(&self, key: &str, cb: F) -> Result<(), E>
    where
        F: FnMut(&str, &V) -> Result<(), E>,
    {
        PointerTrie::iterate(self, key, cb)
    }

    fn iterate_all<E, F>(&self, cb: F) -> Result<(), E>
    where
        F: FnMut(&str, &V) -> Result<(), E>,
    {
        PointerTrie::iterate_all(self, cb)
    }

    fn walk_prefix<E, F>(&self, prefix: &str, cb: F) -> Result<(), E>
    where
        F: FnMut(&str, &V) -> Result<(), E>,
    {
        PointerTrie::walk_prefix(self, prefix, cb)
    }
}

impl<V> TrieMut<V> for PointerTrie<V> {
    fn insert(&mut self, key: &str, value: V) -> Option<V> {
        PointerTrie::insert(self, key, value)
    }

    fn remove(&mut self, key: &str) -> Option<V> {
        PointerTrie::remove(self, key)
    }
}

impl<V> Trie<V> for SuccinctTrie<V> {
    fn get(&self, key: &str) -> Option<&V> {
        SuccinctTrie::get(self, key)
    }

    fn len(&self) -> usize {
        SuccinctTrie::len(self)
    }

    fn iterate<E, F>(&self, key: &str, cb: F) -> Result<(), E>
    where
        F: FnMut(&str, &V) -> Result<(), E>,
    {
        SuccinctTrie::iterate(self, key, cb)
    }

    fn iterate_all<E, F>(&self, cb: F) -> Result<(), E>
    where
        F: FnMut(&str, &V) -> Result<(), E>,
    {
        SuccinctTrie::iterate_all(self, cb)
    }

    fn walk_prefix<E, F>(&self, prefix: &str, cb: F) -> Result<(), E>
    where
        F: FnMut(&str, &V) -> Result<(), E>,
    {
        SuccinctTrie::walk_prefix(self, prefix, cb)
    }
}
