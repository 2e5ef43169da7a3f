//! Mutable trie over Unicode code points.
//!
//! Every node owns its children outright; one node exists per code point on
//! every stored key's path. Nodes are created lazily on insert and pruned
//! eagerly on removal, so no reachable non-root node is ever both valueless
//! and childless.

mod node;

use std::collections::btree_map;

use serde::de::{DeserializeSeed, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::contract::Trie;
use crate::error::{Error, Result};

pub(crate) use node::{Node, NodeSeed};

/// Mutable, pointer-based trie keyed by code-point sequences.
///
/// Lookup, mutation, traversal, `Clone`, `PartialEq` and `Drop` all use
/// explicit stacks, so key length is bounded by memory only. The plain
/// `Serialize`/`Deserialize` impls recurse once per code point through the
/// serializer in use; encode and decode deep tries with
/// [`DocumentAdapter`](crate::DocumentAdapter), which grows the stack on
/// demand.
#[derive(Clone, PartialEq, Eq)]
pub struct PointerTrie<V> {
    root: Node<V>,
    len: usize,
}

impl<V> PointerTrie<V> {
    pub fn new() -> Self {
        Self {
            root: Node::default(),
            len: 0,
        }
    }

    /// Adopt a decoded root, normalizing empty child mappings and rejecting
    /// non-root nodes that hold neither a value nor children.
    pub(crate) fn from_root(mut root: Node<V>) -> Result<Self> {
        let mut len = 0;
        {
            let mut stack: Vec<(String, &mut Node<V>)> = vec![(String::new(), &mut root)];
            while let Some((path, node)) = stack.pop() {
                if node.children.as_ref().is_some_and(|c| c.is_empty()) {
                    node.children = None;
                }
                if node.value.is_some() {
                    len += 1;
                } else if node.is_leaf() && !path.is_empty() {
                    return Err(Error::InvalidDocument(format!(
                        "node {path:?} has neither a value nor children"
                    )));
                }
                if let Some(children) = node.children.as_mut() {
                    for (&label, child) in children.iter_mut() {
                        let mut child_path = path.clone();
                        child_path.push(label);
                        stack.push((child_path, child));
                    }
                }
            }
        }
        Ok(Self { root, len })
    }

    pub(crate) fn root(&self) -> &Node<V> {
        &self.root
    }

    pub(crate) fn into_root(self) -> Node<V> {
        self.root
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated nodes, root included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += 1;
            if let Some(children) = &node.children {
                stack.extend(children.values());
            }
        }
        count
    }

    fn find(&self, key: &str) -> Option<&Node<V>> {
        let mut node = &self.root;
        for c in key.chars() {
            node = node.child(c)?;
        }
        Some(node)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.find(key)?.value.as_ref()
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let mut node = &mut self.root;
        for c in key.chars() {
            node = node.child_mut(c)?;
        }
        node.value.as_mut()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Store `value` at `key`, creating missing nodes along the path.
    ///
    /// Returns the value previously stored at `key`.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let mut node = &mut self.root;
        for c in key.chars() {
            node = node.child_or_insert(c);
        }
        let old = node.value.replace(value);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    /// Store `value` at `key`. Returns true if `key` held no value before.
    pub fn put(&mut self, key: &str, value: V) -> bool {
        self.insert(key, value).is_none()
    }

    /// Remove the value at `key` and prune the branch that held only it.
    ///
    /// Pruning stops at the deepest ancestor that still holds a value or has
    /// another child. The root is cleared, never removed. A key whose path is
    /// missing, or whose node holds no value, leaves the trie untouched.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        // Depth of the deepest path node that must survive the removal.
        let mut keep_depth = 0;
        let mut depth = 0;
        let mut node = &self.root;
        for c in key.chars() {
            if node.value.is_some() || node.degree() > 1 {
                keep_depth = depth;
            }
            node = node.child(c)?;
            depth += 1;
        }
        node.value.as_ref()?;
        let prune = depth > 0 && node.is_leaf();

        let mut chars = key.chars();
        let mut node = &mut self.root;
        let value = if prune {
            for _ in 0..keep_depth {
                node = node.child_mut(chars.next()?)?;
            }
            let mut detached = node.detach(chars.next()?)?;
            log::trace!(
                "pruned {} node(s) below depth {keep_depth}",
                depth - keep_depth
            );
            let mut bottom = &mut detached;
            for c in chars {
                bottom = bottom.child_mut(c)?;
            }
            bottom.value.take()
        } else {
            for c in chars {
                node = node.child_mut(c)?;
            }
            node.value.take()
        };

        if value.is_some() {
            self.len -= 1;
        }
        value
    }

    /// Remove the value at `key`. Returns true if a value was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove(key).is_some()
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        self.root = Node::default();
        self.len = 0;
    }

    /// Visit the value-holding nodes on the path from the root to `key`,
    /// shortest prefix first.
    ///
    /// Stops quietly at the first code point without a matching child. The
    /// first `Err` from `cb` ends the walk and is returned as is.
    pub fn iterate<E, F>(&self, key: &str, mut cb: F) -> std::result::Result<(), E>
    where
        F: FnMut(&str, &V) -> std::result::Result<(), E>,
    {
        let mut node = &self.root;
        if let Some(value) = &node.value {
            cb("", value)?;
        }
        for (idx, c) in key.char_indices() {
            node = match node.child(c) {
                Some(child) => child,
                None => return Ok(()),
            };
            if let Some(value) = &node.value {
                cb(&key[..idx + c.len_utf8()], value)?;
            }
        }
        Ok(())
    }

    /// Visit every stored key in code-point order.
    ///
    /// The first `Err` from `cb` ends the walk and is returned as is; values
    /// already delivered stay delivered.
    pub fn iterate_all<E, F>(&self, mut cb: F) -> std::result::Result<(), E>
    where
        F: FnMut(&str, &V) -> std::result::Result<(), E>,
    {
        walk(&self.root, String::new(), &mut cb)
    }

    /// Visit every stored key starting with `prefix`, the prefix itself
    /// included. A missing prefix visits nothing.
    pub fn walk_prefix<E, F>(&self, prefix: &str, mut cb: F) -> std::result::Result<(), E>
    where
        F: FnMut(&str, &V) -> std::result::Result<(), E>,
    {
        match self.find(prefix) {
            Some(node) => walk(node, prefix.to_owned(), &mut cb),
            None => Ok(()),
        }
    }

    /// Keys starting with `prefix`, in code-point order.
    pub fn prefix_search(&self, prefix: &str) -> Vec<String> {
        <Self as Trie<V>>::prefix_search(self, prefix)
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            root_value: self.root.value.as_ref(),
            stack: self.root.children.iter().map(|c| c.iter()).collect(),
            key: String::new(),
        }
    }
}

/// Depth-first walk below `start`, whose own key is `key`.
///
/// Uses an explicit stack of child iterators, so depth is bounded by heap
/// rather than by the call stack.
fn walk<V, E, F>(start: &Node<V>, mut key: String, cb: &mut F) -> std::result::Result<(), E>
where
    F: FnMut(&str, &V) -> std::result::Result<(), E>,
{
    if let Some(value) = &start.value {
        cb(&key, value)?;
    }
    let mut stack: Vec<btree_map::Iter<'_, char, Node<V>>> = Vec::new();
    if let Some(children) = &start.children {
        stack.push(children.iter());
    }
    while let Some(top) = stack.last_mut() {
        let Some((&label, child)) = top.next() else {
            stack.pop();
            if !stack.is_empty() {
                key.pop();
            }
            continue;
        };
        key.push(label);
        if let Some(value) = &child.value {
            cb(&key, value)?;
        }
        match &child.children {
            Some(children) => stack.push(children.iter()),
            None => {
                key.pop();
            }
        }
    }
    Ok(())
}

impl<V> Default for PointerTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for PointerTrie<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: AsRef<str>, V> FromIterator<(K, V)> for PointerTrie<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<K: AsRef<str>, V> Extend<(K, V)> for PointerTrie<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key.as_ref(), value);
        }
    }
}

impl<V: Serialize> Serialize for PointerTrie<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for PointerTrie<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let root = NodeSeed::new(false).deserialize(deserializer)?;
        Self::from_root(root).map_err(D::Error::custom)
    }
}

/// Iterator over `(key, &value)` pairs in code-point order.
#[derive(Debug)]
pub struct Iter<'a, V> {
    root_value: Option<&'a V>,
    stack: Vec<btree_map::Iter<'a, char, Node<V>>>,
    key: String,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (String, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(value) = self.root_value.take() {
            return Some((String::new(), value));
        }
        while let Some(top) = self.stack.last_mut() {
            let Some((&label, child)) = top.next() else {
                self.stack.pop();
                self.key.pop();
                continue;
            };
            self.key.push(label);
            let item = child.value.as_ref().map(|value| (self.key.clone(), value));
            match &child.children {
                Some(children) => self.stack.push(children.iter()),
                None => {
                    self.key.pop();
                }
            }
            if item.is_some() {
                return item;
            }
        }
        None
    }
}

impl<'a, V> IntoIterator for &'a PointerTrie<V> {
    type Item = (String, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
