//! Named wire transforms for schema-driven fields.
//!
//! A schema field may name a transform; the normalizer installs it as the
//! field's custom decode. Transforms map a wire node to a wire node and
//! return `None` to defer to the field's standard decode.

use crate::transforms::{timestamp, unix_seconds};
use crate::wire::WireNode;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Error type for transform lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    NotFound(String),
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::NotFound(name) => write!(f, "Transform not found: {}", name),
        }
    }
}

impl std::error::Error for TransformError {}

/// Trait for wire transforms
pub trait TransformFn: Send + Sync {
    /// Apply the transform.
    ///
    /// # Returns
    ///
    /// * `Some(node)` - Transformed value
    /// * `None` - Not applicable to this node; defer to standard decode
    fn apply(&self, node: &WireNode) -> Option<WireNode>;
}

/// Simple function-based implementation of TransformFn
impl<F> TransformFn for F
where
    F: Fn(&WireNode) -> Option<WireNode> + Send + Sync,
{
    fn apply(&self, node: &WireNode) -> Option<WireNode> {
        self(node)
    }
}

/// Registry of named transforms
#[derive(Clone)]
pub struct TransformRegistry {
    transforms: BTreeMap<String, Arc<dyn TransformFn>>,
}

impl TransformRegistry {
    /// Create a new empty transform registry
    pub fn new() -> Self {
        Self {
            transforms: BTreeMap::new(),
        }
    }

    /// Create a registry holding the builtin transforms:
    ///
    /// * `timestamp` - any accepted timestamp form → RFC 3339 string
    /// * `unix_seconds` - any accepted timestamp form → integer seconds
    /// * `trim` - strings with surrounding whitespace removed
    /// * `lowercase` / `uppercase` - case-folded strings
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("timestamp", |node: &WireNode| {
            timestamp::decode(node).and_then(|dt| timestamp::encode(&dt))
        });
        registry.register("unix_seconds", |node: &WireNode| {
            unix_seconds::decode(node).and_then(|dt| unix_seconds::encode(&dt))
        });
        registry.register("trim", |node: &WireNode| {
            node.as_str().map(|s| WireNode::from(s.trim()))
        });
        registry.register("lowercase", |node: &WireNode| {
            node.as_str().map(|s| WireNode::from(s.to_lowercase()))
        });
        registry.register("uppercase", |node: &WireNode| {
            node.as_str().map(|s| WireNode::from(s.to_uppercase()))
        });
        registry
    }

    /// Register a transform, replacing any previous one with the same name
    ///
    /// # Example
    ///
    /// ```
    /// use wirefield::{TransformRegistry, WireNode};
    ///
    /// let mut registry = TransformRegistry::new();
    /// registry.register("reverse", |node: &WireNode| {
    ///     node.as_str().map(|s| WireNode::from(s.chars().rev().collect::<String>()))
    /// });
    /// assert!(registry.has_transform("reverse"));
    /// ```
    pub fn register(&mut self, name: impl Into<String>, func: impl TransformFn + 'static) {
        self.transforms.insert(name.into(), Arc::new(func));
    }

    /// Get a registered transform
    pub fn get(&self, name: &str) -> Result<Arc<dyn TransformFn>, TransformError> {
        self.transforms
            .get(name)
            .cloned()
            .ok_or_else(|| TransformError::NotFound(name.to_string()))
    }

    /// Apply a registered transform to `node`
    pub fn apply(&self, name: &str, node: &WireNode) -> Result<Option<WireNode>, TransformError> {
        Ok(self.get(name)?.apply(node))
    }

    /// Check if a transform is registered
    pub fn has_transform(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Get list of all registered transform names, sorted
    pub fn list_transforms(&self) -> Vec<String> {
        self.transforms.keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.transforms.len()
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("transforms", &self.list_transforms())
            .finish()
    }
}
