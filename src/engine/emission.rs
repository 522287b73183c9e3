//! Encode side: decide what a field writes back out.

use crate::codec::StandardEncode;
use crate::descriptor::FieldDescriptor;
use crate::wire::{WireMap, WireNode};

/// One field's contribution to an outgoing keyed record
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub key: String,
    pub node: WireNode,
}

impl Emission {
    pub fn new(key: impl Into<String>, node: WireNode) -> Self {
        Self {
            key: key.into(),
            node,
        }
    }
}

/// Produce the `(primary key, node)` pair for `value`.
///
/// The custom encode transform runs first; otherwise the standard encode is
/// used. When the standard encode fails the field is omitted (`None`). There
/// is no bridging on encode: values are always written in canonical form.
pub fn emit<V, E>(descriptor: &FieldDescriptor<V>, value: &V, encode: &E) -> Option<Emission>
where
    E: StandardEncode<V> + ?Sized,
{
    let key = descriptor.primary_key();

    if let Some(node) = descriptor.custom_encode(value) {
        return Some(Emission::new(key, node));
    }

    match encode.encode(value) {
        Ok(node) => Some(Emission::new(key, node)),
        Err(err) => {
            tracing::debug!(field = %key, error = %err, "encode failed, omitting field");
            None
        }
    }
}

/// Merge emissions into one keyed record. Later pairs for the same key
/// replace earlier ones but keep the key's first position.
pub fn assemble<I>(emissions: I) -> WireNode
where
    I: IntoIterator<Item = Emission>,
{
    let mut map = WireMap::new();
    for Emission { key, node } in emissions {
        map.insert(key, node);
    }
    WireNode::Keyed(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{EncodeError, SerdeCodec, StandardEncode};
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_emit_uses_primary_key() {
        let descriptor = FieldDescriptor::new(["age", "Age"], || 0i64).unwrap();
        let emission = emit(&descriptor, &17, &SerdeCodec::new()).unwrap();
        assert_eq!(emission, Emission::new("age", WireNode::from(17i64)));
    }

    #[test]
    fn test_custom_encode_takes_precedence() {
        let descriptor = FieldDescriptor::new(["flag"], || false)
            .unwrap()
            .encode_with(|b| Some(WireNode::from(if *b { "Y" } else { "N" })));
        let emission = emit(&descriptor, &true, &SerdeCodec::new()).unwrap();
        assert_eq!(emission.node, WireNode::from("Y"));
    }

    #[test]
    fn test_custom_encode_none_defers_to_standard() {
        let descriptor = FieldDescriptor::new(["n"], || 0u8)
            .unwrap()
            .encode_with(|n| (*n > 100).then(|| WireNode::from("big")));
        assert_eq!(
            emit(&descriptor, &5, &SerdeCodec::new()).map(|e| e.node),
            Some(WireNode::from(5u64))
        );
        assert_eq!(
            emit(&descriptor, &200, &SerdeCodec::new()).map(|e| e.node),
            Some(WireNode::from("big"))
        );
    }

    #[test]
    fn test_encode_failure_omits_field() {
        let descriptor = FieldDescriptor::new(["x"], || 0i32).unwrap();
        let failing = |_: &i32| -> Result<WireNode, EncodeError> {
            Err(EncodeError::Invalid("x".to_string()))
        };
        assert_eq!(emit(&descriptor, &1, &failing), None);
    }

    #[test]
    fn test_unencodable_value_omits_field() {
        let descriptor = FieldDescriptor::new(["grid"], BTreeMap::new).unwrap();
        let mut grid: BTreeMap<(i32, i32), i32> = BTreeMap::new();
        grid.insert((0, 1), 5);

        assert!(matches!(
            SerdeCodec::<BTreeMap<(i32, i32), i32>>::new().encode(&grid),
            Err(EncodeError::Invalid(_))
        ));
        assert_eq!(emit(&descriptor, &grid, &SerdeCodec::new()), None);
    }

    #[test]
    fn test_no_bridging_on_encode() {
        let descriptor = FieldDescriptor::new(["count"], || 0i64).unwrap();
        let emission = emit(&descriptor, &3, &SerdeCodec::new()).unwrap();
        assert_eq!(emission.node.as_str(), None);
        assert_eq!(emission.node, WireNode::from(3i64));
    }

    #[test]
    fn test_assemble_last_field_wins() {
        let node = assemble(vec![
            Emission::new("a", WireNode::from(1i64)),
            Emission::new("b", WireNode::from(2i64)),
            Emission::new("a", WireNode::from(3i64)),
        ]);
        assert_eq!(node, WireNode::from(json!({"a": 3, "b": 2})));

        let keys: Vec<&String> = node.as_keyed().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_assemble_empty() {
        assert_eq!(assemble(Vec::new()), WireNode::Keyed(WireMap::new()));
    }
}
