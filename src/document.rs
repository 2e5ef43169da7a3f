//! Conversion between [`PointerTrie`] and its JSON tree document.
//!
//! Every node becomes an object with an optional `value` and an optional
//! `children` object keyed by single-code-point strings. Absent fields are
//! omitted, never written as `null` or `{}`:
//!
//! ```json
//! {"children":{"a":{"children":{"b":{"value":1},"c":{"value":2}}}}}
//! ```
//!
//! Children are written in code-point order, so equal tries always encode to
//! the same bytes.

use std::io;

use serde::de::{DeserializeOwned, DeserializeSeed};
use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::Result;
use crate::pointer::{Node, NodeSeed, PointerTrie};

/// Decode-side behavior of a [`DocumentAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Narrow every decoded number that has no fractional part (`3.0`) to an
    /// integer before values are deserialized.
    ///
    /// This is a heuristic: a value written as a float with a zero fraction
    /// comes back as an integer. Disable it when floats must round-trip as
    /// floats.
    pub normalize_integral_numbers: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            normalize_integral_numbers: true,
        }
    }
}

/// Encodes and decodes pointer tries as JSON tree documents.
///
/// Nesting depth equals key length, so every encode and decode runs through
/// `serde_stacker`, which moves to a fresh stack segment when the current one
/// runs low. Keys of any length round-trip, and a malformed document fails
/// with [`Error::Json`](crate::Error::Json) however deep it is.
#[derive(Debug, Clone, Default)]
pub struct DocumentAdapter {
    options: DocumentOptions,
}

impl DocumentAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DocumentOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> DocumentOptions {
        self.options
    }

    /// Encode as an in-memory JSON tree.
    ///
    /// `serde_json` drops a [`Value`] recursively; for tries with very long
    /// keys prefer [`to_writer`](Self::to_writer) or
    /// [`to_string`](Self::to_string).
    pub fn to_value<V: Serialize>(&self, trie: &PointerTrie<V>) -> Result<Value> {
        Ok(trie.serialize(serde_stacker::Serializer::new(
            serde_json::value::Serializer,
        ))?)
    }

    pub fn to_writer<W: io::Write, V: Serialize>(
        &self,
        writer: W,
        trie: &PointerTrie<V>,
    ) -> Result<()> {
        let mut ser = serde_json::Serializer::new(writer);
        trie.serialize(serde_stacker::Serializer::new(&mut ser))?;
        Ok(())
    }

    pub fn to_vec<V: Serialize>(&self, trie: &PointerTrie<V>) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.to_writer(&mut out, trie)?;
        Ok(out)
    }

    pub fn to_string<V: Serialize>(&self, trie: &PointerTrie<V>) -> Result<String> {
        Ok(utf8(self.to_vec(trie)?))
    }

    pub fn to_string_pretty<V: Serialize>(&self, trie: &PointerTrie<V>) -> Result<String> {
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::pretty(&mut out);
        trie.serialize(serde_stacker::Serializer::new(&mut ser))?;
        Ok(utf8(out))
    }

    /// Decode a parsed document.
    ///
    /// Fails with [`Error::Json`](crate::Error::Json) when the shape or a
    /// value cannot be decoded, and with
    /// [`Error::InvalidDocument`](crate::Error::InvalidDocument) when a
    /// non-root node holds neither a value nor children.
    pub fn from_value<V: DeserializeOwned>(&self, doc: Value) -> Result<PointerTrie<V>> {
        let root = self
            .seed()
            .deserialize(serde_stacker::Deserializer::new(doc))?;
        self.adopt(root)
    }

    /// Parse and decode a document straight from text; only values are
    /// buffered, never the node structure.
    pub fn from_str<V: DeserializeOwned>(&self, s: &str) -> Result<PointerTrie<V>> {
        let mut de = serde_json::Deserializer::from_str(s);
        de.disable_recursion_limit();
        let root = self
            .seed()
            .deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        self.adopt(root)
    }

    pub fn from_slice<V: DeserializeOwned>(&self, bytes: &[u8]) -> Result<PointerTrie<V>> {
        let mut de = serde_json::Deserializer::from_slice(bytes);
        de.disable_recursion_limit();
        let root = self
            .seed()
            .deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        self.adopt(root)
    }

    fn seed<V>(&self) -> NodeSeed<V> {
        NodeSeed::new(self.options.normalize_integral_numbers)
    }

    fn adopt<V>(&self, root: Node<V>) -> Result<PointerTrie<V>> {
        let trie = PointerTrie::from_root(root)?;
        log::debug!("decoded trie document with {} keys", trie.len());
        Ok(trie)
    }
}

// serde_json only ever writes UTF-8.
fn utf8(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Replace every float with a zero fractional part by the equal integer.
pub(crate) fn normalize_numbers(doc: &mut Value) {
    let mut pending = vec![doc];
    while let Some(value) = pending.pop() {
        match value {
            Value::Number(n) => {
                if let Some(narrowed) = narrow_integral(n) {
                    *n = narrowed;
                }
            }
            Value::Array(items) => pending.extend(items.iter_mut()),
            Value::Object(map) => pending.extend(map.values_mut()),
            _ => {}
        }
    }
}

fn narrow_integral(n: &Number) -> Option<Number> {
    if n.is_i64() || n.is_u64() {
        return None;
    }
    let f = n.as_f64()?;
    if !f.is_finite() || f.fract() != 0.0 {
        return None;
    }
    // 2^63 and 2^64 are exact as f64; the casts below cannot saturate.
    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(Number::from(f as i64))
    } else if f >= 0.0 && f < u64::MAX as f64 {
        Some(Number::from(f as u64))
    } else {
        None
    }
}
