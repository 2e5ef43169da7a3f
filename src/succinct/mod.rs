//! Frozen trie encoded as LOUDS bit vectors.
//!
//! Nodes are numbered breadth-first from the root (node 0), children in
//! ascending code-point order. The encoding consists of:
//!
//! - `louds`: for each node, one set bit per child followed by one unset bit
//!   (2N-1 bits for N nodes)
//! - `labels`: the code point of every edge, in set-bit order
//! - `leaves`: one bit per node, set when the node holds a value
//! - `values`: the values, in `leaves` set-bit order
//!
//! Navigation never follows a pointer:
//!
//! - edge `e` (the e-th set bit of `louds`) leads to node `e + 1` and carries
//!   `labels[e]`
//! - node `n` spans `louds[select0(n - 1) + 1 .. select0(n)]`; its first edge
//!   is `rank1` of its start, so its labels form one sorted slice
//! - the parent of node `n > 0` is `rank0(select1(n - 1))`
//! - the value of node `n` is `values[leaves.rank1(n)]`
//!
//! The structure is immutable. Changing the key set means rebuilding it from
//! a [`PointerTrie`](crate::PointerTrie) through [`SuccinctBuilder`].

mod bitvec;
mod builder;

use std::ops::Range;

use crate::contract::Trie;
use crate::error::{Error, Result};

pub use bitvec::{BitVecBuilder, BitVector};
pub use builder::SuccinctBuilder;

/// Memory statistics for a [`SuccinctTrie`].
#[derive(Debug, Clone, Default)]
pub struct SuccinctStats {
    /// Number of stored keys.
    pub key_count: usize,
    /// Number of encoded nodes, root included.
    pub node_count: usize,
    /// Length of the LOUDS label bitmap in bits.
    pub label_bitmap_bits: usize,
    /// Bytes used by the two bit vectors and their rank/select directories.
    pub bitmap_bytes: usize,
    /// Bytes used by the edge labels.
    pub label_bytes: usize,
}

/// Read-only trie over code-point keys backed by rank/select bit vectors.
pub struct SuccinctTrie<V> {
    louds: BitVector,
    labels: Vec<char>,
    leaves: BitVector,
    values: Vec<V>,
}

impl<V> SuccinctTrie<V> {
    /// A trie holding only a valueless root.
    pub fn empty() -> Self {
        let mut louds = BitVecBuilder::new();
        louds.push(false);
        let mut leaves = BitVecBuilder::new();
        leaves.push(false);
        Self {
            louds: louds.finish(),
            labels: Vec::new(),
            leaves: leaves.finish(),
            values: Vec::new(),
        }
    }

    /// Assemble a trie from finished vectors, checking that they agree.
    pub(crate) fn from_parts(
        louds: BitVector,
        labels: Vec<char>,
        leaves: BitVector,
        values: Vec<V>,
    ) -> Result<Self> {
        let nodes = leaves.len();
        if nodes == 0 || louds.count_zeros() != nodes {
            return Err(Error::Build(format!(
                "label bitmap encodes {} nodes, leaf bitmap has {}",
                louds.count_zeros(),
                nodes
            )));
        }
        if louds.count_ones() != labels.len() || labels.len() + 1 != nodes {
            return Err(Error::Build(format!(
                "{} edges and {} labels for {} nodes",
                louds.count_ones(),
                labels.len(),
                nodes
            )));
        }
        if leaves.count_ones() != values.len() {
            return Err(Error::Build(format!(
                "{} value bits for {} values",
                leaves.count_ones(),
                values.len()
            )));
        }
        Ok(Self {
            louds,
            labels,
            leaves,
            values,
        })
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of encoded nodes, root included.
    pub fn node_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn stats(&self) -> SuccinctStats {
        SuccinctStats {
            key_count: self.len(),
            node_count: self.node_count(),
            label_bitmap_bits: self.louds.len(),
            bitmap_bytes: self.louds.heap_bytes() + self.leaves.heap_bytes(),
            label_bytes: self.labels.capacity() * std::mem::size_of::<char>(),
        }
    }

    /// Edge indices of `node`'s children.
    fn edges(&self, node: usize) -> Range<usize> {
        let Some(end) = self.louds.select0(node) else {
            return 0..0;
        };
        let start = match node {
            0 => 0,
            _ => self.louds.select0(node - 1).map_or(end, |pos| pos + 1),
        };
        let first = self.louds.rank1(start);
        first..first + (end - start)
    }

    fn child(&self, node: usize, label: char) -> Option<usize> {
        let edges = self.edges(node);
        let offset = self.labels[edges.clone()].binary_search(&label).ok()?;
        Some(edges.start + offset + 1)
    }

    fn parent(&self, node: usize) -> Option<usize> {
        let pos = self.louds.select1(node.checked_sub(1)?)?;
        Some(self.louds.rank0(pos))
    }

    fn value(&self, node: usize) -> Option<&V> {
        if !self.leaves.get(node) {
            return None;
        }
        self.values.get(self.leaves.rank1(node))
    }

    fn find(&self, key: &str) -> Option<usize> {
        let mut node = 0;
        for c in key.chars() {
            node = self.child(node, c)?;
        }
        Some(node)
    }

    /// Write the key of `node` into `key`, replacing its contents.
    fn key_of(&self, mut node: usize, scratch: &mut Vec<char>, key: &mut String) {
        scratch.clear();
        while let Some(parent) = self.parent(node) {
            scratch.push(self.labels[node - 1]);
            node = parent;
        }
        key.clear();
        key.extend(scratch.iter().rev());
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.value(self.find(key)?)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Visit the value-holding nodes on the path from the root to `key`,
    /// shortest prefix first, stopping quietly at the first missing edge.
    pub fn iterate<E, F>(&self, key: &str, mut cb: F) -> std::result::Result<(), E>
    where
        F: FnMut(&str, &V) -> std::result::Result<(), E>,
    {
        let mut node = 0;
        if let Some(value) = self.value(node) {
            cb("", value)?;
        }
        for (idx, c) in key.char_indices() {
            node = match self.child(node, c) {
                Some(child) => child,
                None => return Ok(()),
            };
            if let Some(value) = self.value(node) {
                cb(&key[..idx + c.len_utf8()], value)?;
            }
        }
        Ok(())
    }

    /// Visit every stored key.
    ///
    /// Values are enumerated in storage order, i.e. breadth-first: shorter
    /// keys first, equal lengths in code-point order. Each key is rebuilt by
    /// following parent links.
    pub fn iterate_all<E, F>(&self, mut cb: F) -> std::result::Result<(), E>
    where
        F: FnMut(&str, &V) -> std::result::Result<(), E>,
    {
        let mut scratch = Vec::new();
        let mut key = String::new();
        for (k, value) in self.values.iter().enumerate() {
            let Some(node) = self.leaves.select1(k) else {
                break;
            };
            self.key_of(node, &mut scratch, &mut key);
            cb(&key, value)?;
        }
        Ok(())
    }

    /// Visit every stored key starting with `prefix`, depth-first in
    /// code-point order.
    pub fn walk_prefix<E, F>(&self, prefix: &str, mut cb: F) -> std::result::Result<(), E>
    where
        F: FnMut(&str, &V) -> std::result::Result<(), E>,
    {
        let Some(start) = self.find(prefix) else {
            return Ok(());
        };
        let mut key = prefix.to_owned();
        if let Some(value) = self.value(start) {
            cb(&key, value)?;
        }

        let mut stack = vec![self.edges(start)];
        while let Some(edges) = stack.last_mut() {
            let Some(edge) = edges.next() else {
                stack.pop();
                if !stack.is_empty() {
                    key.pop();
                }
                continue;
            };
            key.push(self.labels[edge]);
            let child = edge + 1;
            if let Some(value) = self.value(child) {
                cb(&key, value)?;
            }
            let grandchildren = self.edges(child);
            if grandchildren.is_empty() {
                key.pop();
            } else {
                stack.push(grandchildren);
            }
        }
        Ok(())
    }

    /// Keys starting with `prefix`, in code-point order.
    pub fn prefix_search(&self, prefix: &str) -> Vec<String> {
        <Self as Trie<V>>::prefix_search(self, prefix)
    }
}

impl<V> Default for SuccinctTrie<V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V> std::fmt::Debug for SuccinctTrie<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuccinctTrie")
            .field("keys", &self.len())
            .field("nodes", &self.node_count())
            .field("louds", &self.louds)
            .finish()
    }
}
