//! Nested message trees and the store-over-bundle merge.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::Value;
use tracing::debug;

/// A node in a locale's message tree.
///
/// Leaves hold display strings; maps hold child segments. Keys are kept in a
/// `BTreeMap` so serialisation and comparison do not depend on insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTree {
    Leaf(String),
    Map(BTreeMap<String, MessageTree>),
}

impl Default for MessageTree {
    fn default() -> Self {
        MessageTree::empty()
    }
}

impl MessageTree {
    pub fn empty() -> Self {
        MessageTree::Map(BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MessageTree::Map(children) => children.is_empty(),
            MessageTree::Leaf(_) => false,
        }
    }

    /// Build a tree from `(dotted key, value)` pairs.
    ///
    /// A nested mapping always beats a leaf at the same path, so the result is
    /// the same for any ordering of the input.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tree = MessageTree::empty();
        for (key, value) in entries {
            tree.insert(key, value.to_string());
        }
        tree
    }

    /// Insert `value` at the dot-delimited `key`.
    pub fn insert(&mut self, key: &str, value: String) {
        let segments: Vec<&str> = key.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            debug!(key, "Skipping message key with empty segment");
            return;
        }
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut current = self;
        for segment in parents {
            let children = current.ensure_map();
            current = children
                .entry((*segment).to_string())
                .or_insert_with(MessageTree::empty);
        }

        let children = current.ensure_map();
        if matches!(children.get(*last), Some(MessageTree::Map(_))) {
            debug!(key, "Leaf shadowed by nested messages; keeping the mapping");
            return;
        }
        children.insert((*last).to_string(), MessageTree::Leaf(value));
    }

    fn ensure_map(&mut self) -> &mut BTreeMap<String, MessageTree> {
        if let MessageTree::Leaf(_) = self {
            *self = MessageTree::empty();
        }
        match self {
            MessageTree::Map(children) => children,
            MessageTree::Leaf(_) => unreachable!("leaf replaced with map above"),
        }
    }

    /// Look up a leaf by dot-delimited key.
    pub fn get(&self, key: &str) -> Option<&str> {
        let mut current = self;
        for segment in key.split('.') {
            match current {
                MessageTree::Map(children) => current = children.get(segment)?,
                MessageTree::Leaf(_) => return None,
            }
        }
        match current {
            MessageTree::Leaf(value) => Some(value.as_str()),
            MessageTree::Map(_) => None,
        }
    }

    /// Flatten back into sorted `(dotted key, value)` pairs.
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.flatten_into(String::new(), &mut out);
        out
    }

    fn flatten_into(&self, prefix: String, out: &mut Vec<(String, String)>) {
        match self {
            MessageTree::Leaf(value) => out.push((prefix, value.clone())),
            MessageTree::Map(children) => {
                for (segment, child) in children {
                    let key = if prefix.is_empty() {
                        segment.clone()
                    } else {
                        format!("{prefix}.{segment}")
                    };
                    child.flatten_into(key, out);
                }
            }
        }
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            MessageTree::Leaf(_) => 1,
            MessageTree::Map(children) => children.values().map(MessageTree::leaf_count).sum(),
        }
    }

    /// Convert a JSON document into a tree.
    ///
    /// Strings become leaves, numbers and booleans are stringified, objects
    /// become maps. Nulls and arrays carry no message and are dropped.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(MessageTree::Leaf(text.clone())),
            Value::Number(number) => Some(MessageTree::Leaf(number.to_string())),
            Value::Bool(flag) => Some(MessageTree::Leaf(flag.to_string())),
            Value::Object(object) => {
                let children = object
                    .iter()
                    .filter_map(|(key, child)| {
                        MessageTree::from_json(child).map(|tree| (key.clone(), tree))
                    })
                    .collect();
                Some(MessageTree::Map(children))
            }
            Value::Null | Value::Array(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            MessageTree::Leaf(value) => Value::String(value.clone()),
            MessageTree::Map(children) => Value::Object(
                children
                    .iter()
                    .map(|(key, child)| (key.clone(), child.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Merge a store-derived tree over a bundle tree.
///
/// Where both sides hold a mapping the merge recurses; everywhere else the
/// store side wins when present and the bundle side fills the gap. Keys from
/// either side are never dropped.
pub fn merge_over(bundle: &MessageTree, overrides: &MessageTree) -> MessageTree {
    match (bundle, overrides) {
        (MessageTree::Map(base), MessageTree::Map(top)) => {
            let mut merged = base.clone();
            for (key, top_child) in top {
                let next = match base.get(key) {
                    Some(base_child) => merge_over(base_child, top_child),
                    None => top_child.clone(),
                };
                merged.insert(key.clone(), next);
            }
            MessageTree::Map(merged)
        }
        (_, top) => top.clone(),
    }
}

impl Serialize for MessageTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MessageTree::Leaf(value) => serializer.serialize_str(value),
            MessageTree::Map(children) => {
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (key, child) in children {
                    map.serialize_entry(key, child)?;
                }
                map.end()
            }
        }
    }
}
