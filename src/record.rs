//! Record-level glue: attaching field resolution to a host struct.
//!
//! A type implementing [`Record`] reads each of its fields through a
//! [`RecordReader`] and writes them through a [`RecordWriter`]. The reader
//! and writer own the per-record concerns (the record must be keyed, emitted
//! pairs are merged once at the end); every field goes through the engine
//! independently.

use crate::cell::FieldCell;
use crate::codec::{SerdeCodec, StandardDecode, StandardEncode};
use crate::descriptor::FieldDescriptor;
use crate::engine::{assemble, emit, Emission};
use crate::wire::{WireMap, WireNode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Error type for record operations
#[derive(Debug)]
pub enum RecordError {
    /// The record node is not a keyed mapping
    NotKeyed { record: String, actual: &'static str },
    JsonError(serde_json::Error),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::NotKeyed { record, actual } => {
                write!(f, "Record '{}' must be a keyed node, got {}", record, actual)
            }
            RecordError::JsonError(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for RecordError {}

impl From<serde_json::Error> for RecordError {
    fn from(err: serde_json::Error) -> Self {
        RecordError::JsonError(err)
    }
}

/// Read access to one keyed record during a decode pass
#[derive(Debug, Clone, Copy)]
pub struct RecordReader<'a> {
    fields: &'a WireMap,
}

impl<'a> RecordReader<'a> {
    /// Wrap `node`, which must be keyed.
    pub fn new(name: &str, node: &'a WireNode) -> Result<Self, RecordError> {
        match node {
            WireNode::Keyed(fields) => Ok(Self { fields }),
            other => Err(RecordError::NotKeyed {
                record: name.to_string(),
                actual: other.kind(),
            }),
        }
    }

    pub fn from_map(fields: &'a WireMap) -> Self {
        Self { fields }
    }

    /// Resolve a field with the serde codec.
    pub fn field<V>(&self, descriptor: &FieldDescriptor<V>) -> FieldCell<V>
    where
        V: DeserializeOwned + 'static,
    {
        self.field_with(descriptor, &SerdeCodec::new())
    }

    /// Resolve a field with a caller-supplied standard decode.
    pub fn field_with<V, D>(&self, descriptor: &FieldDescriptor<V>, decode: &D) -> FieldCell<V>
    where
        V: 'static,
        D: StandardDecode<V> + ?Sized,
    {
        FieldCell::resolve(descriptor, self.fields, decode)
    }

    pub fn fields(&self) -> &'a WireMap {
        self.fields
    }
}

/// Collects field emissions for one outgoing record
#[derive(Debug, Default)]
pub struct RecordWriter {
    emissions: Vec<Emission>,
}

impl RecordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a field with the serde codec.
    pub fn field<V: Serialize>(&mut self, descriptor: &FieldDescriptor<V>, value: &V) {
        self.field_with(descriptor, value, &SerdeCodec::new());
    }

    /// Emit a field with a caller-supplied standard encode.
    pub fn field_with<V, E>(&mut self, descriptor: &FieldDescriptor<V>, value: &V, encode: &E)
    where
        E: StandardEncode<V> + ?Sized,
    {
        if let Some(emission) = emit(descriptor, value, encode) {
            self.emissions.push(emission);
        }
    }

    /// Add an already-built pair.
    pub fn push(&mut self, emission: Emission) {
        self.emissions.push(emission);
    }

    pub fn len(&self) -> usize {
        self.emissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emissions.is_empty()
    }

    /// Merge all emissions into the outgoing keyed node.
    pub fn finish(self) -> WireNode {
        assemble(self.emissions)
    }
}

/// A host struct whose fields are resolved from a keyed wire record.
///
/// # Example
///
/// ```
/// use std::sync::OnceLock;
/// use wirefield::{FieldCell, FieldDescriptor, Record, RecordReader, RecordWriter};
///
/// struct Person {
///     age: FieldCell<u32>,
/// }
///
/// fn age() -> &'static FieldDescriptor<u32> {
///     static AGE: OnceLock<FieldDescriptor<u32>> = OnceLock::new();
///     AGE.get_or_init(|| FieldDescriptor::new(["age", "Age"], || 0).unwrap())
/// }
///
/// impl Record for Person {
///     const NAME: &'static str = "Person";
///
///     fn decode_fields(reader: &RecordReader<'_>) -> Self {
///         Person { age: reader.field(age()) }
///     }
///
///     fn encode_fields(&self, writer: &mut RecordWriter) {
///         writer.field(age(), self.age.get());
///     }
/// }
///
/// let person = Person::from_json_str(r#"{"Age": "41"}"#).unwrap();
/// assert_eq!(*person.age, 41);
/// assert_eq!(person.to_json().unwrap(), r#"{"age":41}"#);
/// ```
pub trait Record: Sized {
    /// The name of this record type
    const NAME: &'static str;

    /// Build the record from its fields. Never fails: each field falls back
    /// independently.
    fn decode_fields(reader: &RecordReader<'_>) -> Self;

    /// Emit each field into `writer`.
    fn encode_fields(&self, writer: &mut RecordWriter);

    /// Decode from a wire node, which must be keyed.
    fn from_node(node: &WireNode) -> Result<Self, RecordError> {
        let reader = RecordReader::new(Self::NAME, node)?;
        Ok(Self::decode_fields(&reader))
    }

    /// Decode from JSON text.
    fn from_json_str(text: &str) -> Result<Self, RecordError> {
        let node = WireNode::from_json_str(text)?;
        Self::from_node(&node)
    }

    /// Encode to a keyed wire node.
    fn to_node(&self) -> WireNode {
        let mut writer = RecordWriter::new();
        self.encode_fields(&mut writer);
        writer.finish()
    }

    /// Convert record to JSON string
    fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string(&self.to_node())?)
    }

    /// Convert record to pretty-printed JSON string
    fn to_json_pretty(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(&self.to_node())?)
    }

    /// Convert record to NDJSON line (newline-delimited JSON)
    fn to_ndjson_line(&self) -> Result<String, RecordError> {
        let json = self.to_json()?;
        Ok(format!("{}\n", json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Pair {
        left: FieldCell<i64>,
        right: FieldCell<String>,
    }

    fn left() -> FieldDescriptor<i64> {
        FieldDescriptor::new(["left", "l"], || -1).unwrap()
    }

    fn right() -> FieldDescriptor<String> {
        FieldDescriptor::new(["right"], || "none".to_string()).unwrap()
    }

    impl Record for Pair {
        const NAME: &'static str = "Pair";

        fn decode_fields(reader: &RecordReader<'_>) -> Self {
            Pair {
                left: reader.field(&left()),
                right: reader.field(&right()),
            }
        }

        fn encode_fields(&self, writer: &mut RecordWriter) {
            writer.field(&left(), self.left.get());
            writer.field(&right(), self.right.get());
        }
    }

    #[test]
    fn test_record_decode() {
        let pair = Pair::from_node(&WireNode::from(json!({"l": "3", "right": 4}))).unwrap();
        assert_eq!(*pair.left, 3);
        assert_eq!(pair.right.get(), "4");
    }

    #[test]
    fn test_record_decode_non_keyed() {
        let err = Pair::from_node(&WireNode::from(json!([1, 2]))).err().unwrap();
        assert!(matches!(
            err,
            RecordError::NotKeyed { ref record, actual: "sequence" } if record == "Pair"
        ));
    }

    #[test]
    fn test_record_decode_bad_json() {
        assert!(matches!(
            Pair::from_json_str("{not json"),
            Err(RecordError::JsonError(_))
        ));
    }

    #[test]
    fn test_record_encode_uses_primary_keys_in_order() {
        let pair = Pair::from_json_str("{}").unwrap();
        assert_eq!(pair.to_json().unwrap(), r#"{"left":-1,"right":"none"}"#);
        assert!(pair.to_ndjson_line().unwrap().ends_with('\n'));
    }

    #[test]
    fn test_writer_tolerates_omitted_fields() {
        let descriptor = FieldDescriptor::new(["x"], || 0i32).unwrap();
        let fail = |_: &i32| -> Result<WireNode, crate::codec::EncodeError> {
            Err(crate::codec::EncodeError::Invalid("nope".to_string()))
        };

        let mut writer = RecordWriter::new();
        writer.field_with(&descriptor, &1, &fail);
        assert!(writer.is_empty());
        assert_eq!(writer.finish(), WireNode::from(json!({})));
    }
}
