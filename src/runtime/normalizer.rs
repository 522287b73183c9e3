//! Schema-driven record normalization.
//!
//! Runs every field of a [`RecordSchema`] through the resolution engine and
//! emits the normalized record: one key per field (its primary alias), each
//! value in its canonical form or the field's default.

use crate::codec::EncodeError;
use crate::descriptor::FieldDescriptor;
use crate::engine::{assemble, emit, resolve_with_bridge, Source};
use crate::record::{RecordError, RecordReader};
use crate::runtime::schema::{FieldType, RecordSchema, SchemaError};
use crate::runtime::transform_registry::TransformRegistry;
use crate::wire::WireNode;

/// One compiled schema field
#[derive(Debug, Clone)]
struct CompiledField {
    name: String,
    field_type: FieldType,
    descriptor: FieldDescriptor<WireNode>,
}

/// Result of normalizing one record
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub record: WireNode,
    /// Where each field's value came from, in schema order
    pub sources: Vec<(String, Source)>,
}

impl Normalized {
    /// Number of fields that fell back to their default.
    pub fn missing_count(&self) -> usize {
        self.sources
            .iter()
            .filter(|(_, source)| *source == Source::Missing)
            .count()
    }
}

/// Normalizes records of one schema.
///
/// # Example Flow
/// 1. Load a record schema (fields, aliases, defaults, transforms)
/// 2. Compile it against a transform registry
/// 3. Normalize records one at a time; each field resolves independently
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    schema_name: String,
    fields: Vec<CompiledField>,
}

impl RecordNormalizer {
    /// Compile `schema` against `registry`.
    ///
    /// # Errors
    /// Returns error if a field has blank aliases, an unknown transform or
    /// a default that doesn't match its type
    pub fn new(schema: &RecordSchema, registry: &TransformRegistry) -> Result<Self, SchemaError> {
        let fields = schema
            .descriptors(registry)?
            .into_iter()
            .map(|(name, descriptor)| {
                let field_type = schema
                    .get_field(&name)
                    .map(|field| field.field_type)
                    .unwrap_or_default();
                CompiledField {
                    name,
                    field_type,
                    descriptor,
                }
            })
            .collect();

        Ok(Self {
            schema_name: schema.name.clone(),
            fields,
        })
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Output keys, in schema order.
    pub fn output_keys(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(|field| field.descriptor.primary_key())
            .collect()
    }

    /// Normalize one record.
    ///
    /// # Errors
    /// Returns error if `record` is not a keyed node. Individual fields never
    /// fail.
    pub fn normalize(&self, record: &WireNode) -> Result<WireNode, RecordError> {
        Ok(self.normalize_traced(record)?.record)
    }

    /// Normalize one record, also reporting where each value came from.
    pub fn normalize_traced(&self, record: &WireNode) -> Result<Normalized, RecordError> {
        let reader = RecordReader::new(&self.schema_name, record)?;
        let identity = |node: &WireNode| -> Result<WireNode, EncodeError> { Ok(node.clone()) };

        let mut sources = Vec::with_capacity(self.fields.len());
        let mut emissions = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let field_type = field.field_type;
            let resolution = resolve_with_bridge(
                &field.descriptor,
                reader.fields(),
                &|node: &WireNode| field_type.decode(node),
                field_type.coercion(),
            );
            tracing::trace!(field = %field.name, source = ?resolution.source, "field resolved");

            emissions.extend(emit(&field.descriptor, &resolution.value, &identity));
            sources.push((field.name.clone(), resolution.source));
        }

        Ok(Normalized {
            record: assemble(emissions),
            sources,
        })
    }
}
