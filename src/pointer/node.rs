//! Node type for the pointer trie.

use std::collections::{btree_map, BTreeMap};
use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, DeserializeSeed, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::document::normalize_numbers;

/// Child mapping. Ordered by code point so traversal and encoding are
/// deterministic and the succinct encoder sees labels already sorted.
pub(crate) type Children<V> = BTreeMap<char, Node<V>>;

/// An exclusively owned subtree.
///
/// An empty mapping is always stored as `children: None`, so a node is a leaf
/// exactly when `children` is `None`. The serde shape is the interchange
/// document: `{"value": .., "children": {"a": {..}}}` with absent fields
/// omitted. Decoding goes through [`NodeSeed`].
#[derive(Debug, Serialize)]
pub(crate) struct Node<V> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) value: Option<V>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) children: Option<Children<V>>,
}

impl<V> Default for Node<V> {
    fn default() -> Self {
        Self {
            value: None,
            children: None,
        }
    }
}

impl<V: Clone> Clone for Node<V> {
    // Rebuilt bottom-up from an explicit stack.
    fn clone(&self) -> Self {
        struct Frame<'a, V> {
            label: char,
            value: Option<V>,
            pending: Option<btree_map::Iter<'a, char, Node<V>>>,
            done: Children<V>,
        }

        fn open<V: Clone>(label: char, node: &Node<V>) -> Frame<'_, V> {
            Frame {
                label,
                value: node.value.clone(),
                pending: node.children.as_ref().map(|c| c.iter()),
                done: BTreeMap::new(),
            }
        }

        let mut stack = vec![open('\0', self)];
        while let Some(top) = stack.last_mut() {
            if let Some((&label, child)) = top.pending.as_mut().and_then(Iterator::next) {
                stack.push(open(label, child));
                continue;
            }
            let Some(frame) = stack.pop() else { break };
            let node = Node {
                value: frame.value,
                children: (!frame.done.is_empty()).then_some(frame.done),
            };
            match stack.last_mut() {
                Some(parent) => {
                    parent.done.insert(frame.label, node);
                }
                None => return node,
            }
        }
        Node::default()
    }
}

impl<V: PartialEq> PartialEq for Node<V> {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.value != b.value || a.degree() != b.degree() {
                return false;
            }
            if let (Some(ac), Some(bc)) = (&a.children, &b.children) {
                for ((la, ca), (lb, cb)) in ac.iter().zip(bc) {
                    if la != lb {
                        return false;
                    }
                    stack.push((ca, cb));
                }
            }
        }
        true
    }
}

impl<V: Eq> Eq for Node<V> {}

impl<V> Drop for Node<V> {
    // Flatten the subtree first so dropping a long chain does not recurse.
    fn drop(&mut self) {
        let Some(children) = self.children.take() else {
            return;
        };
        let mut pending: Vec<Node<V>> = children.into_values().collect();
        while let Some(mut node) = pending.pop() {
            if let Some(children) = node.children.take() {
                pending.extend(children.into_values());
            }
        }
    }
}

impl<V> Node<V> {
    #[inline]
    pub(crate) fn child(&self, label: char) -> Option<&Node<V>> {
        self.children.as_ref()?.get(&label)
    }

    #[inline]
    pub(crate) fn child_mut(&mut self, label: char) -> Option<&mut Node<V>> {
        self.children.as_mut()?.get_mut(&label)
    }

    /// Child for `label`, created valueless and childless if missing.
    #[inline]
    pub(crate) fn child_or_insert(&mut self, label: char) -> &mut Node<V> {
        self.children
            .get_or_insert_with(BTreeMap::new)
            .entry(label)
            .or_default()
    }

    #[inline]
    pub(crate) fn degree(&self) -> usize {
        self.children.as_ref().map_or(0, BTreeMap::len)
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Detach the child for `label`, collapsing the mapping to `None` once it
    /// empties.
    pub(crate) fn detach(&mut self, label: char) -> Option<Node<V>> {
        let children = self.children.as_mut()?;
        let child = children.remove(&label);
        if children.is_empty() {
            self.children = None;
        }
        child
    }
}

/// Decodes a [`Node`] and its subtree.
///
/// With `normalize` set, each value is read into a [`Value`] first and its
/// integral floats are narrowed before `V` is decoded from it. The node
/// structure itself is never buffered.
pub(crate) struct NodeSeed<V> {
    normalize: bool,
    marker: PhantomData<fn() -> V>,
}

impl<V> NodeSeed<V> {
    pub(crate) fn new(normalize: bool) -> Self {
        Self {
            normalize,
            marker: PhantomData,
        }
    }
}

impl<V> Clone for NodeSeed<V> {
    fn clone(&self) -> Self {
        Self::new(self.normalize)
    }
}

impl<V> Copy for NodeSeed<V> {}

const FIELDS: &[&str] = &["value", "children"];

impl<'de, V: Deserialize<'de>> DeserializeSeed<'de> for NodeSeed<V> {
    type Value = Node<V>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node<V>, D::Error> {
        deserializer.deserialize_struct("Node", FIELDS, self)
    }
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for NodeSeed<V> {
    type Value = Node<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a trie node object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node<V>, A::Error> {
        let mut node = Node::default();
        let mut seen_value = false;
        let mut seen_children = false;
        while let Some(field) = map.next_key::<String>()? {
            match field.as_str() {
                "value" => {
                    if std::mem::replace(&mut seen_value, true) {
                        return Err(de::Error::duplicate_field("value"));
                    }
                    node.value = map.next_value_seed(ValueSeed(self))?;
                }
                "children" => {
                    if std::mem::replace(&mut seen_children, true) {
                        return Err(de::Error::duplicate_field("children"));
                    }
                    node.children = map.next_value_seed(ChildrenSeed(self))?;
                }
                other => return Err(de::Error::unknown_field(other, FIELDS)),
            }
        }
        Ok(node)
    }
}

/// `value` field: `null` or absent means no value.
struct ValueSeed<V>(NodeSeed<V>);

impl<'de, V: Deserialize<'de>> DeserializeSeed<'de> for ValueSeed<V> {
    type Value = Option<V>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Option<V>, D::Error> {
        deserializer.deserialize_option(self)
    }
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for ValueSeed<V> {
    type Value = Option<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a value or null")
    }

    fn visit_none<E: de::Error>(self) -> Result<Option<V>, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Option<V>, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Option<V>, D::Error> {
        if !self.0.normalize {
            return V::deserialize(deserializer).map(Some);
        }
        let mut value = Value::deserialize(deserializer)?;
        normalize_numbers(&mut value);
        V::deserialize(value).map(Some).map_err(de::Error::custom)
    }
}

/// `children` field: `null` or absent means no children.
struct ChildrenSeed<V>(NodeSeed<V>);

impl<'de, V: Deserialize<'de>> DeserializeSeed<'de> for ChildrenSeed<V> {
    type Value = Option<Children<V>>;

    fn deserialize<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Option<Children<V>>, D::Error> {
        deserializer.deserialize_option(self)
    }
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for ChildrenSeed<V> {
    type Value = Option<Children<V>>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object of single-code-point labels")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(self)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut children = BTreeMap::new();
        while let Some(label) = map.next_key::<char>()? {
            let child = map.next_value_seed(self.0)?;
            children.insert(label, child);
        }
        Ok(Some(children))
    }
}
