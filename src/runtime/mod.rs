//! Schema-driven runtime for records whose shape is only known at runtime.
//!
//! Field types, aliases, defaults and transforms come from a YAML
//! [`RecordSchema`]; each field resolves through the same engine as typed
//! records, with values kept as [`WireNode`](crate::WireNode)s.

pub mod normalizer;
pub mod schema;
pub mod transform_registry;

// Re-export key types
pub use normalizer::{Normalized, RecordNormalizer};
pub use schema::{FieldSchema, FieldType, RecordSchema, SchemaError};
pub use transform_registry::{TransformError, TransformFn, TransformRegistry};
