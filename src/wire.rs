//! Parsed wire data.
//!
//! A [`WireNode`] is one node of already-parsed structured data. The engine
//! only inspects nodes; it never mutates them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// Keyed mapping of a wire record, in wire order.
pub type WireMap = IndexMap<String, WireNode>;

/// One node of parsed wire data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(untagged)]
pub enum WireNode {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<WireNode>),
    Keyed(WireMap),
}

impl WireNode {
    /// Parse a node from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, WireNode::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            WireNode::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            WireNode::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireNode::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[WireNode]> {
        match self {
            WireNode::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_keyed(&self) -> Option<&WireMap> {
        match self {
            WireNode::Keyed(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` when this node is keyed.
    pub fn get(&self, key: &str) -> Option<&WireNode> {
        self.as_keyed().and_then(|map| map.get(key))
    }

    /// Short name of the node's shape, used in log and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            WireNode::Null => "null",
            WireNode::Bool(_) => "bool",
            WireNode::Number(_) => "number",
            WireNode::String(_) => "string",
            WireNode::Sequence(_) => "sequence",
            WireNode::Keyed(_) => "keyed",
        }
    }
}

impl fmt::Display for WireNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireNode::Null => write!(f, "null"),
            WireNode::Bool(b) => write!(f, "{}", b),
            WireNode::Number(n) => write!(f, "{}", n),
            WireNode::String(s) => write!(f, "{}", s),
            WireNode::Sequence(_) | WireNode::Keyed(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                write!(f, "{}", json)
            }
        }
    }
}

impl From<serde_json::Value> for WireNode {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => WireNode::Null,
            serde_json::Value::Bool(b) => WireNode::Bool(b),
            serde_json::Value::Number(n) => WireNode::Number(n),
            serde_json::Value::String(s) => WireNode::String(s),
            serde_json::Value::Array(arr) => {
                WireNode::Sequence(arr.into_iter().map(WireNode::from).collect())
            }
            serde_json::Value::Object(map) => WireNode::Keyed(
                map.into_iter().map(|(k, v)| (k, WireNode::from(v))).collect(),
            ),
        }
    }
}

impl From<&WireNode> for serde_json::Value {
    fn from(node: &WireNode) -> Self {
        match node {
            WireNode::Null => serde_json::Value::Null,
            WireNode::Bool(b) => serde_json::Value::Bool(*b),
            WireNode::Number(n) => serde_json::Value::Number(n.clone()),
            WireNode::String(s) => serde_json::Value::String(s.clone()),
            WireNode::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            WireNode::Keyed(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for WireNode {
    fn from(b: bool) -> Self {
        WireNode::Bool(b)
    }
}

impl From<i64> for WireNode {
    fn from(i: i64) -> Self {
        WireNode::Number(Number::from(i))
    }
}

impl From<u64> for WireNode {
    fn from(u: u64) -> Self {
        WireNode::Number(Number::from(u))
    }
}

/// Non-finite floats have no wire form and become `Null`.
impl From<f64> for WireNode {
    fn from(f: f64) -> Self {
        Number::from_f64(f).map(WireNode::Number).unwrap_or(WireNode::Null)
    }
}

impl From<String> for WireNode {
    fn from(s: String) -> Self {
        WireNode::String(s)
    }
}

impl From<&str> for WireNode {
    fn from(s: &str) -> Self {
        WireNode::String(s.to_string())
    }
}

impl From<WireMap> for WireNode {
    fn from(map: WireMap) -> Self {
        WireNode::Keyed(map)
    }
}

impl From<Vec<WireNode>> for WireNode {
    fn from(items: Vec<WireNode>) -> Self {
        WireNode::Sequence(items)
    }
}
