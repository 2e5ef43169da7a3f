//! One-shot construction of a [`SuccinctTrie`].

use std::collections::VecDeque;
use std::ops::Range;

use super::bitvec::BitVecBuilder;
use super::SuccinctTrie;
use crate::error::{Error, Result};
use crate::pointer::{Node, PointerTrie};

/// Breadth-first LOUDS encoder shared by the borrowed and owned build paths.
struct Encoder<V> {
    louds: BitVecBuilder,
    labels: Vec<char>,
    leaves: BitVecBuilder,
    values: Vec<V>,
}

impl<V> Encoder<V> {
    fn new() -> Self {
        Self {
            louds: BitVecBuilder::new(),
            labels: Vec::new(),
            leaves: BitVecBuilder::new(),
            values: Vec::new(),
        }
    }

    fn node(&mut self, value: Option<V>) {
        self.leaves.push(value.is_some());
        self.values.extend(value);
    }

    fn edge(&mut self, label: char) {
        self.louds.push(true);
        self.labels.push(label);
    }

    fn end_node(&mut self) {
        self.louds.push(false);
    }

    fn finish(self, expected_keys: usize) -> Result<SuccinctTrie<V>> {
        if self.values.len() != expected_keys {
            return Err(Error::Build(format!(
                "source reports {expected_keys} keys but {} values were encoded",
                self.values.len()
            )));
        }
        let trie = SuccinctTrie::from_parts(
            self.louds.finish(),
            self.labels,
            self.leaves.finish(),
            self.values,
        )?;
        log::debug!(
            "built succinct trie: {} keys, {} nodes, {} bitmap bytes",
            trie.len(),
            trie.node_count(),
            trie.stats().bitmap_bytes
        );
        Ok(trie)
    }
}

/// Builds a [`SuccinctTrie`] from a populated [`PointerTrie`] or from a
/// stream of `(key, value)` pairs in strictly increasing key order.
///
/// Sorted pairs are encoded level by level straight from the key list, so no
/// intermediate pointer trie is built.
///
/// ```rust
/// use codepoint_trie::SuccinctBuilder;
///
/// let mut builder = SuccinctBuilder::new();
/// builder.insert("apple", 1).unwrap();
/// builder.insert("apricot", 2).unwrap();
/// assert!(builder.insert("another", 3).is_err());
///
/// let trie = builder.finish().unwrap();
/// assert_eq!(trie.get("apricot"), Some(&2));
/// ```
#[derive(Debug)]
pub struct SuccinctBuilder<V> {
    keys: Vec<String>,
    values: Vec<Option<V>>,
}

impl<V> SuccinctBuilder<V> {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Add a key-value pair.
    ///
    /// **Keys must be inserted in strictly increasing order.** Code-point
    /// order and `str` order agree, so sorting `String` keys suffices.
    pub fn insert(&mut self, key: &str, value: V) -> Result<()> {
        if let Some(last) = self.keys.last() {
            if key <= last.as_str() {
                return Err(Error::Build(format!(
                    "key {key:?} does not sort after {last:?}"
                )));
            }
        }
        self.keys.push(key.to_owned());
        self.values.push(Some(value));
        Ok(())
    }

    /// Number of pairs accepted so far.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Encode the accepted pairs.
    ///
    /// Each queued node is the run of keys sharing its path, plus the byte
    /// length of that path. Within a run only the first key can end at the
    /// node, and the keys under each child label are contiguous.
    pub fn finish(mut self) -> Result<SuccinctTrie<V>> {
        let mut enc = Encoder::new();
        let mut queue: VecDeque<(Range<usize>, usize)> =
            VecDeque::from([(0..self.keys.len(), 0)]);
        while let Some((run, depth)) = queue.pop_front() {
            let mut start = run.start;
            let mut value = None;
            if start < run.end && self.keys[start].len() == depth {
                value = self.values[start].take();
                start += 1;
            }
            enc.node(value);

            while start < run.end {
                let Some(label) = self.keys[start][depth..].chars().next() else {
                    break;
                };
                let stop = start
                    + self.keys[start..run.end]
                        .partition_point(|k| k[depth..].starts_with(label));
                enc.edge(label);
                queue.push_back((start..stop, depth + label.len_utf8()));
                start = stop;
            }
            enc.end_node();
        }
        enc.finish(self.keys.len())
    }

    /// Build from pairs in strictly increasing key order.
    pub fn from_sorted_iter<K, I>(iter: I) -> Result<SuccinctTrie<V>>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut builder = Self::new();
        for (key, value) in iter {
            builder.insert(key.as_ref(), value)?;
        }
        builder.finish()
    }

    /// Build by consuming `source`, moving its values.
    pub fn from_pointer(source: PointerTrie<V>) -> Result<SuccinctTrie<V>> {
        let expected = source.len();
        let mut enc = Encoder::new();
        let mut queue: VecDeque<Node<V>> = VecDeque::from([source.into_root()]);
        while let Some(mut node) = queue.pop_front() {
            enc.node(node.value.take());
            if let Some(children) = node.children.take() {
                for (label, child) in children {
                    enc.edge(label);
                    queue.push_back(child);
                }
            }
            enc.end_node();
        }
        enc.finish(expected)
    }
}

impl<V: Clone> SuccinctBuilder<V> {
    /// Build from a snapshot of `source`, cloning its values.
    pub fn build(source: &PointerTrie<V>) -> Result<SuccinctTrie<V>> {
        let mut enc = Encoder::new();
        let mut queue: VecDeque<&Node<V>> = VecDeque::from([source.root()]);
        while let Some(node) = queue.pop_front() {
            enc.node(node.value.clone());
            if let Some(children) = &node.children {
                for (&label, child) in children {
                    enc.edge(label);
                    queue.push_back(child);
                }
            }
            enc.end_node();
        }
        enc.finish(source.len())
    }
}

impl<V> Default for SuccinctBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_matches_source() {
        let source: PointerTrie<u64> = [("cat", 1), ("cats", 3), ("caterpillar", 4), ("dog", 2)]
            .into_iter()
            .collect();
        let frozen = SuccinctBuilder::build(&source).unwrap();
        assert_eq!(frozen.len(), source.len());
        assert_eq!(frozen.node_count(), source.node_count());
        for (key, value) in &source {
            assert_eq!(frozen.get(&key), Some(value));
        }
        // The source is untouched by a snapshot build.
        assert_eq!(source.get("dog"), Some(&2));
    }

    #[test]
    fn test_empty_source() {
        let frozen = SuccinctBuilder::build(&PointerTrie::<u64>::new()).unwrap();
        assert!(frozen.is_empty());
        assert_eq!(frozen.node_count(), 1);
        assert_eq!(frozen.get(""), None);
    }

    #[test]
    fn test_from_sorted_iter() {
        let frozen =
            SuccinctBuilder::from_sorted_iter([("", 0u64), ("a", 1), ("ab", 2), ("b", 3)]).unwrap();
        assert_eq!(frozen.len(), 4);
        assert_eq!(frozen.get(""), Some(&0));
        assert_eq!(frozen.get("ab"), Some(&2));
    }

    #[test]
    fn test_from_sorted_iter_rejects_unsorted() {
        let res = SuccinctBuilder::from_sorted_iter([("b", 1u64), ("a", 2)]);
        assert!(matches!(res, Err(Error::Build(_))));
    }

    #[test]
    fn test_from_sorted_iter_rejects_duplicates() {
        let res = SuccinctBuilder::from_sorted_iter([("a", 1u64), ("a", 2)]);
        assert!(matches!(res, Err(Error::Build(_))));
    }

    #[test]
    fn test_sorted_matches_pointer_layout() {
        let entries = [
            ("", 0u64),
            ("a", 1),
            ("ab", 2),
            ("abc", 3),
            ("ac", 4),
            ("b", 5),
            ("é", 6),
            ("éa", 7),
            ("日本", 8),
            ("日本語", 9),
            ("🦀", 10),
        ];
        let pointer: PointerTrie<u64> = entries.into_iter().collect();
        let expected = SuccinctBuilder::build(&pointer).unwrap();

        let mut builder = SuccinctBuilder::new();
        for (k, v) in entries {
            builder.insert(k, v).unwrap();
        }
        assert_eq!(builder.len(), entries.len());
        let sorted = builder.finish().unwrap();

        assert_eq!(sorted.node_count(), expected.node_count());
        assert_eq!(sorted.node_count(), pointer.node_count());
        assert_eq!(
            sorted.stats().label_bitmap_bits,
            expected.stats().label_bitmap_bits
        );

        let collect = |t: &SuccinctTrie<u64>| {
            let mut out = Vec::new();
            t.iterate_all(|k, v| {
                out.push((k.to_owned(), *v));
                Ok::<_, std::convert::Infallible>(())
            })
            .unwrap();
            out
        };
        assert_eq!(collect(&sorted), collect(&expected));
        for (k, v) in entries {
            assert_eq!(sorted.get(k), Some(&v), "{k}");
        }
        assert_eq!(sorted.get("日"), None);
    }

    #[test]
    fn test_finish_without_pairs() {
        let builder: SuccinctBuilder<u64> = SuccinctBuilder::default();
        assert!(builder.is_empty());
        let frozen = builder.finish().unwrap();
        assert!(frozen.is_empty());
        assert_eq!(frozen.node_count(), 1);
    }

    #[test]
    fn test_non_clone_values_move() {
        struct Opaque(u32);
        let mut source = PointerTrie::new();
        source.insert("x", Opaque(7));
        let frozen = SuccinctBuilder::from_pointer(source).unwrap();
        assert_eq!(frozen.get("x").map(|o| o.0), Some(7));
    }
}
