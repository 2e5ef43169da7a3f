//! # codepoint-trie
//!
//! An associative structure keyed by sequences of Unicode code points, with
//! prefix-oriented queries, in two representations sharing one contract:
//!
//! - [`PointerTrie`]: a mutable node graph for the write-heavy phase. One node
//!   per code point, created on insert and pruned on removal.
//! - [`SuccinctTrie`]: an immutable LOUDS encoding (bit vectors plus
//!   rank/select directories, no pointers) for the read-heavy phase, built
//!   once by [`SuccinctBuilder`].
//!
//! Both implement [`Trie`]; only the pointer trie implements [`TrieMut`].
//! [`AnyTrie`] selects a representation at runtime through [`TrieKind`], and
//! [`DocumentAdapter`] converts a pointer trie to and from a JSON tree
//! document.
//!
//! ## Example
//!
//! ```rust
//! use codepoint_trie::{PointerTrie, SuccinctBuilder, Trie};
//!
//! let mut trie: PointerTrie<u64> = PointerTrie::new();
//! assert!(trie.put("cat", 1));
//! trie.put("cats", 3);
//! trie.put("caterpillar", 4);
//! trie.put("dog", 2);
//!
//! assert!(trie.delete("cats"));
//! assert_eq!(trie.get("cat"), Some(&1));
//! assert_eq!(trie.prefix_search("cat"), vec!["cat", "caterpillar"]);
//!
//! let frozen = SuccinctBuilder::build(&trie).unwrap();
//! assert_eq!(frozen.get("caterpillar"), Some(&4));
//! assert_eq!(Trie::len(&frozen), 3);
//! ```
//!
//! ## Traversal
//!
//! `iterate`, `iterate_all` and `walk_prefix` take a callback returning
//! `Result<(), E>` for any `E`. The first `Err` stops the walk and is handed
//! back unchanged. Walks use explicit stacks, so key length is not bounded by
//! the call stack.
//!
//! Neither representation synchronizes internally; share one across threads
//! only behind the caller's own lock.

#![warn(missing_debug_implementations)]
#![warn(clippy::all)]

mod any;
mod contract;
pub mod document;
pub mod error;
mod pointer;
pub mod succinct;

pub use any::{AnyTrie, TrieKind};
pub use contract::{Trie, TrieMut};
pub use document::{DocumentAdapter, DocumentOptions};
pub use error::{Error, Result};
pub use pointer::{Iter, PointerTrie};
pub use succinct::{SuccinctBuilder, SuccinctStats, SuccinctTrie};

#[cfg(test)]
mod proptests;
