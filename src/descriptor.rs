//! Field descriptors: how one logical field is read from and written to wire data.

use crate::wire::WireNode;
use convert_case::{Case, Casing};
use std::fmt;
use std::sync::Arc;

type MissingFn<V> = Arc<dyn Fn() -> V + Send + Sync>;
type DecodeFn<V> = Arc<dyn Fn(&WireNode) -> Option<V> + Send + Sync>;
type EncodeFn<V> = Arc<dyn Fn(&V) -> Option<WireNode> + Send + Sync>;

/// Error raised when a descriptor is built with an unusable configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    NoAliases,
    BlankAlias { position: usize },
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorError::NoAliases => write!(f, "Field descriptor needs at least one alias"),
            DescriptorError::BlankAlias { position } => {
                write!(f, "Alias at position {} is blank", position)
            }
        }
    }
}

impl std::error::Error for DescriptorError {}

/// Declares how a field of type `V` is resolved from and emitted to wire data.
///
/// The first alias is the primary key: it is tried first on decode and is
/// the only key written on encode. `on_missing` supplies the value whenever no
/// alias yields usable data. The optional transforms run before the standard
/// codec and return `None` to defer to it.
///
/// All callbacks must be pure; a descriptor is built once per field and can
/// be shared across threads.
///
/// # Example
///
/// ```
/// use wirefield::FieldDescriptor;
///
/// let age = FieldDescriptor::new(["age", "Age"], || 0u32).unwrap();
/// assert_eq!(age.primary_key(), "age");
/// assert_eq!(age.missing_value(), 0);
/// ```
pub struct FieldDescriptor<V> {
    aliases: Vec<String>,
    on_missing: MissingFn<V>,
    on_decode: Option<DecodeFn<V>>,
    on_encode: Option<EncodeFn<V>>,
}

impl<V> FieldDescriptor<V> {
    /// Create a descriptor with the given aliases and fallback producer.
    ///
    /// Fails when `aliases` is empty or contains a blank entry.
    pub fn new<I, S, F>(aliases: I, on_missing: F) -> Result<Self, DescriptorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn() -> V + Send + Sync + 'static,
    {
        let aliases: Vec<String> = aliases.into_iter().map(Into::into).collect();
        if aliases.is_empty() {
            return Err(DescriptorError::NoAliases);
        }
        if let Some(position) = aliases.iter().position(|a| a.trim().is_empty()) {
            return Err(DescriptorError::BlankAlias { position });
        }

        Ok(Self {
            aliases: dedup(aliases),
            on_missing: Arc::new(on_missing),
            on_decode: None,
            on_encode: None,
        })
    }

    /// Create a descriptor whose fallback is a clone of `value`.
    pub fn with_default<I, S>(aliases: I, value: V) -> Result<Self, DescriptorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        V: Clone + Send + Sync + 'static,
    {
        Self::new(aliases, move || value.clone())
    }

    /// Install a custom decode transform.
    pub fn decode_with<F>(mut self, on_decode: F) -> Self
    where
        F: Fn(&WireNode) -> Option<V> + Send + Sync + 'static,
    {
        self.on_decode = Some(Arc::new(on_decode));
        self
    }

    /// Install a custom encode transform.
    pub fn encode_with<F>(mut self, on_encode: F) -> Self
    where
        F: Fn(&V) -> Option<WireNode> + Send + Sync + 'static,
    {
        self.on_encode = Some(Arc::new(on_encode));
        self
    }

    /// Append a fallback alias. Blank or duplicate aliases are ignored.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if !alias.trim().is_empty() && !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
        self
    }

    /// Append the camelCase, PascalCase, snake_case and kebab-case spellings
    /// of the primary key as fallback aliases.
    pub fn with_case_variants(mut self) -> Self {
        for variant in case_variants(self.primary_key()) {
            if !self.aliases.contains(&variant) {
                self.aliases.push(variant);
            }
        }
        self
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Key used for emission.
    pub fn primary_key(&self) -> &str {
        // Construction guarantees at least one alias.
        &self.aliases[0]
    }

    pub fn missing_value(&self) -> V {
        (self.on_missing)()
    }

    /// Run the custom decode transform, if any.
    pub fn custom_decode(&self, node: &WireNode) -> Option<V> {
        self.on_decode.as_ref().and_then(|decode| decode(node))
    }

    /// Run the custom encode transform, if any.
    pub fn custom_encode(&self, value: &V) -> Option<WireNode> {
        self.on_encode.as_ref().and_then(|encode| encode(value))
    }

    pub fn has_custom_decode(&self) -> bool {
        self.on_decode.is_some()
    }

    pub fn has_custom_encode(&self) -> bool {
        self.on_encode.is_some()
    }
}

impl<V> Clone for FieldDescriptor<V> {
    fn clone(&self) -> Self {
        Self {
            aliases: self.aliases.clone(),
            on_missing: Arc::clone(&self.on_missing),
            on_decode: self.on_decode.clone(),
            on_encode: self.on_encode.clone(),
        }
    }
}

impl<V> fmt::Debug for FieldDescriptor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("aliases", &self.aliases)
            .field("custom_decode", &self.on_decode.is_some())
            .field("custom_encode", &self.on_encode.is_some())
            .finish()
    }
}

/// Case spellings of `key`, in a fixed order, without duplicates of `key`.
pub fn case_variants(key: &str) -> Vec<String> {
    let mut variants = Vec::new();
    for case in [Case::Camel, Case::Pascal, Case::Snake, Case::Kebab] {
        let variant = key.to_case(case);
        if variant != key && !variants.contains(&variant) {
            variants.push(variant);
        }
    }
    variants
}

fn dedup(aliases: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(aliases.len());
    for alias in aliases {
        if !unique.contains(&alias) {
            unique.push(alias);
        }
    }
    unique
}
