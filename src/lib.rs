//! # Wirefield: Lenient Field Resolution for Structured Wire Data
//!
//! Wirefield decides what value each field of a record holds when the wire
//! data doesn't match the field exactly, and what gets written back out.
//!
//! ## Features
//!
//! - **Aliases**: a field may appear under several keys; the first key with a
//!   usable value wins, so a malformed primary key falls through to a legacy one
//! - **Fallback values**: absent or malformed data resolves to a per-field
//!   default instead of failing the whole record
//! - **Custom transforms**: per-field decode/encode hooks (e.g. timestamps)
//! - **Primitive bridging**: numbers, strings and booleans coerce losslessly
//!   into each other when the wire type differs from the target type
//! - **Schema runtime**: YAML schemas normalize records whose shape is only
//!   known at runtime
//!
//! ## Resolution order
//!
//! For each alias, in order: custom transform, then standard decode, then
//! bridging. The first success wins; if none succeeds for any alias, the
//! field's fallback is used. Resolution never fails.
//!
//! ## Example
//!
//! ```
//! use wirefield::{resolve, FieldDescriptor, SerdeCodec, WireNode};
//!
//! let age = FieldDescriptor::new(["age", "Age"], || 0i64).unwrap();
//! let codec = SerdeCodec::new();
//!
//! let record = WireNode::from_json_str(r#"{"Age": "17"}"#).unwrap();
//! assert_eq!(resolve(&age, record.as_keyed().unwrap(), &codec), 17);
//!
//! let record = WireNode::from_json_str(r#"{"age": true}"#).unwrap();
//! assert_eq!(resolve(&age, record.as_keyed().unwrap(), &codec), 0);
//! ```
//!
//! ## Example: schema
//!
//! ```yaml
//! name: person
//! fields:
//!   age:
//!     type: int
//!     aliases: [age, Age]
//!     default: 0
//!   created:
//!     type: string
//!     transform: timestamp
//! ```

// Core modules
pub mod bridge;
pub mod cell;
pub mod codec;
pub mod descriptor;
pub mod engine;
pub mod wire;

// Host glue
pub mod record;
pub mod serialization;
pub mod transforms;

// Schema-driven runtime
pub mod runtime;

// Re-export key types
pub use bridge::{BridgeRegistry, BridgeType, Coercion};
pub use cell::FieldCell;
pub use codec::{DecodeError, EncodeError, SerdeCodec, StandardDecode, StandardEncode};
pub use descriptor::{DescriptorError, FieldDescriptor};
pub use engine::{assemble, emit, resolve, resolve_traced, Emission, Resolution, Source};
pub use record::{Record, RecordError, RecordReader, RecordWriter};
pub use serialization::{JsonArrayWriter, NdjsonWriter, SerializationError};
pub use wire::{WireMap, WireNode};

// Re-export runtime types
pub use runtime::{
    FieldSchema, FieldType, Normalized, RecordNormalizer, RecordSchema, SchemaError,
    TransformRegistry,
};
