//! Standard decode/encode capabilities.
//!
//! The resolution engine is generic over how a value is normally read from and
//! written to a wire node. [`SerdeCodec`] is the default structural mapping;
//! any closure with the right signature also works.

use crate::wire::WireNode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;

/// Standard decode failed for one node
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The node has a shape the target type cannot be read from
    UnexpectedShape {
        expected: &'static str,
        actual: &'static str,
    },
    /// Structural decode failed for another reason
    Invalid(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnexpectedShape { expected, actual } => {
                write!(f, "Expected {}, found {}", expected, actual)
            }
            DecodeError::Invalid(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Invalid(err.to_string())
    }
}

/// Standard encode failed for one value
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeError {
    Invalid(String),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::Invalid(msg) => write!(f, "Encode error: {}", msg),
        }
    }
}

impl std::error::Error for EncodeError {}

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        EncodeError::Invalid(err.to_string())
    }
}

/// Capability: read a `V` from a node using its normal structural mapping
pub trait StandardDecode<V> {
    fn decode(&self, node: &WireNode) -> Result<V, DecodeError>;
}

impl<V, F> StandardDecode<V> for F
where
    F: Fn(&WireNode) -> Result<V, DecodeError>,
{
    fn decode(&self, node: &WireNode) -> Result<V, DecodeError> {
        self(node)
    }
}

/// Capability: write a `V` as its canonical node
pub trait StandardEncode<V> {
    fn encode(&self, value: &V) -> Result<WireNode, EncodeError>;
}

impl<V, F> StandardEncode<V> for F
where
    F: Fn(&V) -> Result<WireNode, EncodeError>,
{
    fn encode(&self, value: &V) -> Result<WireNode, EncodeError> {
        self(value)
    }
}

/// Standard codec backed by serde through `serde_json::Value`.
pub struct SerdeCodec<V>(PhantomData<fn() -> V>);

impl<V> SerdeCodec<V> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<V> Default for SerdeCodec<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for SerdeCodec<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for SerdeCodec<V> {}

impl<V: DeserializeOwned> StandardDecode<V> for SerdeCodec<V> {
    fn decode(&self, node: &WireNode) -> Result<V, DecodeError> {
        Ok(serde_json::from_value(serde_json::Value::from(node))?)
    }
}

impl<V: Serialize> StandardEncode<V> for SerdeCodec<V> {
    fn encode(&self, value: &V) -> Result<WireNode, EncodeError> {
        Ok(WireNode::from(serde_json::to_value(value)?))
    }
}
