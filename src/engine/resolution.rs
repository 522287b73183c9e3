//! Decode side: decide the value a field holds.
//!
//! For each alias in order, the first usable interpretation wins:
//!
//! 1. the alias is absent → next alias
//! 2. the custom decode transform returns a value → done
//! 3. the standard decode succeeds → done
//! 4. the bridge coercion for the target type succeeds → done
//! 5. otherwise → next alias
//!
//! When no alias produces a value, the descriptor's fallback is used.
//! Resolution is total: it never fails.

use crate::bridge::{BridgeRegistry, Coercion};
use crate::codec::StandardDecode;
use crate::descriptor::FieldDescriptor;
use crate::wire::{WireMap, WireNode};

/// How a field's value was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Custom { alias: String },
    Standard { alias: String },
    Bridged { alias: String },
    Missing,
}

impl Source {
    /// Alias whose data produced the value, if any.
    pub fn alias(&self) -> Option<&str> {
        match self {
            Source::Custom { alias } | Source::Standard { alias } | Source::Bridged { alias } => {
                Some(alias.as_str())
            }
            Source::Missing => None,
        }
    }
}

/// Resolved value together with where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<V> {
    pub value: V,
    pub source: Source,
}

/// Resolve a field from `record` with the bridge chosen for `V` by
/// [`BridgeRegistry::lookup`].
///
/// # Example
///
/// ```
/// use wirefield::{resolve, FieldDescriptor, SerdeCodec, WireNode};
///
/// let age = FieldDescriptor::new(["age", "Age"], || 0i64).unwrap();
/// let record = WireNode::from_json_str(r#"{"Age": "17"}"#).unwrap();
///
/// let value = resolve(&age, record.as_keyed().unwrap(), &SerdeCodec::new());
/// assert_eq!(value, 17);
/// ```
pub fn resolve<V, D>(descriptor: &FieldDescriptor<V>, record: &WireMap, decode: &D) -> V
where
    V: 'static,
    D: StandardDecode<V> + ?Sized,
{
    resolve_traced(descriptor, record, decode).value
}

/// Like [`resolve`], also reporting which step produced the value.
pub fn resolve_traced<V, D>(
    descriptor: &FieldDescriptor<V>,
    record: &WireMap,
    decode: &D,
) -> Resolution<V>
where
    V: 'static,
    D: StandardDecode<V> + ?Sized,
{
    resolve_with_bridge(descriptor, record, decode, BridgeRegistry::lookup::<V>())
}

/// Resolve with an explicit bridge, or none.
pub fn resolve_with_bridge<V, D>(
    descriptor: &FieldDescriptor<V>,
    record: &WireMap,
    decode: &D,
    bridge: Option<Coercion<V>>,
) -> Resolution<V>
where
    D: StandardDecode<V> + ?Sized,
{
    for alias in descriptor.aliases() {
        let Some(node) = record.get(alias) else {
            tracing::trace!(alias = %alias, "alias absent");
            continue;
        };

        if let Some(source) = interpret(descriptor, alias, node, decode, bridge.as_ref()) {
            return source;
        }
    }

    tracing::debug!(
        field = %descriptor.primary_key(),
        "no usable wire data, using fallback value"
    );
    Resolution {
        value: descriptor.missing_value(),
        source: Source::Missing,
    }
}

fn interpret<V, D>(
    descriptor: &FieldDescriptor<V>,
    alias: &str,
    node: &WireNode,
    decode: &D,
    bridge: Option<&Coercion<V>>,
) -> Option<Resolution<V>>
where
    D: StandardDecode<V> + ?Sized,
{
    if let Some(value) = descriptor.custom_decode(node) {
        return Some(Resolution {
            value,
            source: Source::Custom {
                alias: alias.to_string(),
            },
        });
    }

    // Any standard decode failure is bridge-eligible, not only shape mismatches.
    let err = match decode.decode(node) {
        Ok(value) => {
            return Some(Resolution {
                value,
                source: Source::Standard {
                    alias: alias.to_string(),
                },
            })
        }
        Err(err) => err,
    };
    tracing::trace!(alias = %alias, error = %err, "standard decode failed");

    let bridge = bridge?;
    match bridge.coerce(node) {
        Some(value) => Some(Resolution {
            value,
            source: Source::Bridged {
                alias: alias.to_string(),
            },
        }),
        None => {
            tracing::trace!(
                alias = %alias,
                target = %bridge.tag(),
                kind = node.kind(),
                "bridge coercion failed"
            );
            None
        }
    }
}
