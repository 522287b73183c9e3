//! Record schemas loaded from YAML.
//!
//! A schema names the fields of one record type, their primitive type, the
//! wire keys they may appear under, their fallback value and an optional
//! named transform:
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
//!   nickname:
//! ```
//!
//! A field with no body is an `any` field keyed by its own name.

use crate::bridge::{BridgeType, Coercion};
use crate::codec::DecodeError;
use crate::descriptor::{DescriptorError, FieldDescriptor};
use crate::runtime::transform_registry::{TransformError, TransformRegistry};
use crate::wire::WireNode;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for schema loading and validation
#[derive(Debug)]
pub enum SchemaError {
    Io { path: PathBuf, source: std::io::Error },
    Yaml(serde_yaml::Error),
    NoFields { schema: String },
    Descriptor { field: String, source: DescriptorError },
    Transform { field: String, source: TransformError },
    InvalidDefault { field: String, expected: FieldType, actual: &'static str },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Io { path, source } => {
                write!(f, "Failed to read schema file {}: {}", path.display(), source)
            }
            SchemaError::Yaml(e) => write!(f, "Failed to parse YAML: {}", e),
            SchemaError::NoFields { schema } => write!(f, "Schema '{}' declares no fields", schema),
            SchemaError::Descriptor { field, source } => {
                write!(f, "Field '{}': {}", field, source)
            }
            SchemaError::Transform { field, source } => {
                write!(f, "Field '{}': {}", field, source)
            }
            SchemaError::InvalidDefault { field, expected, actual } => write!(
                f,
                "Field '{}': default must be {} or null, got {}",
                field, expected, actual
            ),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemaError::Io { source, .. } => Some(source),
            SchemaError::Yaml(e) => Some(e),
            SchemaError::Descriptor { source, .. } => Some(source),
            SchemaError::Transform { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for SchemaError {
    fn from(err: serde_yaml::Error) -> Self {
        SchemaError::Yaml(err)
    }
}

/// Primitive type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    Float,
    Bool,
    String,
    /// Any non-null node, kept as is
    #[default]
    Any,
}

impl FieldType {
    /// Strict shape check used as the field's standard decode.
    pub fn decode(&self, node: &WireNode) -> Result<WireNode, DecodeError> {
        let accepted = match (self, node) {
            (FieldType::Int, WireNode::Number(n)) => n.is_i64() || n.is_u64(),
            (FieldType::Float, WireNode::Number(_)) => true,
            (FieldType::Bool, WireNode::Bool(_)) => true,
            (FieldType::String, WireNode::String(_)) => true,
            (FieldType::Any, other) => !other.is_null(),
            _ => false,
        };
        if accepted {
            Ok(node.clone())
        } else {
            Err(DecodeError::UnexpectedShape {
                expected: self.name(),
                actual: node.kind(),
            })
        }
    }

    /// Bridge coercion into this type, producing the canonical node.
    pub fn coercion(&self) -> Option<Coercion<WireNode>> {
        match self {
            FieldType::Int => Some(Coercion::new(BridgeType::I64, |node| {
                BridgeType::I64.coerce_node(node)
            })),
            FieldType::Float => Some(Coercion::new(BridgeType::F64, |node| {
                BridgeType::F64.coerce_node(node)
            })),
            FieldType::Bool => Some(Coercion::new(BridgeType::Bool, |node| {
                BridgeType::Bool.coerce_node(node)
            })),
            FieldType::String => Some(Coercion::new(BridgeType::String, |node| {
                BridgeType::String.coerce_node(node)
            })),
            FieldType::Any => None,
        }
    }

    /// `node` in this type's canonical form, bridging when the shape differs.
    pub fn canonicalize(&self, node: &WireNode) -> Option<WireNode> {
        match self.decode(node) {
            Ok(node) => Some(node),
            Err(_) => self.coercion().and_then(|bridge| bridge.coerce(node)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::String => "string",
            FieldType::Any => "any",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One field of a record schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSchema {
    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Wire keys in priority order; empty means the field's own name
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Fallback value when no alias yields usable data
    #[serde(default)]
    pub default: WireNode,

    /// Name of a transform in the registry, used as the custom decode
    #[serde(default)]
    pub transform: Option<String>,

    /// Also accept case spellings of the primary alias
    #[serde(default)]
    pub case_variants: bool,
}

impl FieldSchema {
    /// Effective aliases for a field called `name`.
    pub fn aliases_for(&self, name: &str) -> Vec<String> {
        if self.aliases.is_empty() {
            vec![name.to_string()]
        } else {
            self.aliases.clone()
        }
    }

    /// Build the field's descriptor, checking aliases, default and transform.
    pub fn descriptor(
        &self,
        name: &str,
        registry: &TransformRegistry,
    ) -> Result<FieldDescriptor<WireNode>, SchemaError> {
        let default = self.canonical_default(name)?;
        let mut descriptor = FieldDescriptor::with_default(self.aliases_for(name), default)
            .map_err(|source| SchemaError::Descriptor {
                field: name.to_string(),
                source,
            })?;

        if let Some(transform_name) = &self.transform {
            let transform = registry
                .get(transform_name)
                .map_err(|source| SchemaError::Transform {
                    field: name.to_string(),
                    source,
                })?;
            let field_type = self.field_type;
            descriptor = descriptor.decode_with(move |node| {
                let output = transform.apply(node)?;
                field_type.canonicalize(&output)
            });
        }

        if self.case_variants {
            descriptor = descriptor.with_case_variants();
        }
        Ok(descriptor)
    }

    fn canonical_default(&self, name: &str) -> Result<WireNode, SchemaError> {
        if self.default.is_null() {
            return Ok(WireNode::Null);
        }
        self.field_type
            .canonicalize(&self.default)
            .ok_or_else(|| SchemaError::InvalidDefault {
                field: name.to_string(),
                expected: self.field_type,
                actual: self.default.kind(),
            })
    }
}

/// Schema of one record type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordSchema {
    pub name: String,

    /// Fields in declaration order
    #[serde(deserialize_with = "fields_allowing_empty")]
    pub fields: IndexMap<String, FieldSchema>,
}

impl RecordSchema {
    /// Load a record schema from a YAML file.
    ///
    /// # Errors
    /// Returns error if the file can't be read, isn't valid YAML, or declares
    /// no fields. Aliases, defaults and transforms are checked by
    /// [`validate`](Self::validate).
    ///
    /// # Example
    /// ```ignore
    /// use wirefield::runtime::RecordSchema;
    ///
    /// let schema = RecordSchema::load_from_file("schemas/person.yaml")?;
    /// println!("Fields: {:?}", schema.field_names());
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parse a record schema from YAML text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, SchemaError> {
        let schema: RecordSchema = serde_yaml::from_str(contents)?;
        if schema.fields.is_empty() {
            return Err(SchemaError::NoFields {
                schema: schema.name,
            });
        }
        Ok(schema)
    }

    /// Check every field against `registry`.
    pub fn validate(&self, registry: &TransformRegistry) -> Result<(), SchemaError> {
        self.descriptors(registry).map(|_| ())
    }

    /// Build one descriptor per field, in declaration order.
    pub fn descriptors(
        &self,
        registry: &TransformRegistry,
    ) -> Result<Vec<(String, FieldDescriptor<WireNode>)>, SchemaError> {
        self.fields
            .iter()
            .map(|(name, field)| Ok((name.clone(), field.descriptor(name, registry)?)))
            .collect()
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> Vec<&String> {
        self.fields.keys().collect()
    }
}

fn fields_allowing_empty<'de, D>(deserializer: D) -> Result<IndexMap<String, FieldSchema>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: IndexMap<String, Option<FieldSchema>> = IndexMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, field)| (name, field.unwrap_or_default()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PERSON: &str = r#"
name: person
fields:
  age:
    type: int
    aliases: [age, Age]
    default: 0
  created:
    type: string
    transform: timestamp
  nickname:
"#;

    #[test]
    fn test_parse_schema() {
        let schema = RecordSchema::from_yaml_str(PERSON).unwrap();

        assert_eq!(schema.name, "person");
        assert_eq!(schema.field_names(), vec!["age", "created", "nickname"]);

        let age = schema.get_field("age").unwrap();
        assert_eq!(age.field_type, FieldType::Int);
        assert_eq!(age.default, WireNode::from(0i64));

        let nickname = schema.get_field("nickname").unwrap();
        assert_eq!(nickname, &FieldSchema::default());
        assert_eq!(nickname.aliases_for("nickname"), vec!["nickname"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(PERSON.as_bytes()).unwrap();

        let schema = RecordSchema::load_from_file(file.path()).unwrap();
        assert_eq!(schema.fields.len(), 3);
        assert!(schema.validate(&TransformRegistry::with_builtins()).is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let result = RecordSchema::load_from_file("/nonexistent/schema.yaml");
        assert!(matches!(result, Err(SchemaError::Io { .. })));
    }

    #[test]
    fn test_schema_without_fields() {
        let result = RecordSchema::from_yaml_str("name: empty\nfields: {}\n");
        assert!(matches!(result, Err(SchemaError::NoFields { .. })));
    }

    #[test]
    fn test_unknown_transform_rejected() {
        let schema = RecordSchema::from_yaml_str(PERSON).unwrap();
        let result = schema.validate(&TransformRegistry::new());
        assert!(matches!(
            result,
            Err(SchemaError::Transform { ref field, .. }) if field == "created"
        ));
    }

    #[test]
    fn test_blank_alias_rejected() {
        let schema =
            RecordSchema::from_yaml_str("name: r\nfields:\n  a:\n    aliases: [\"\"]\n").unwrap();
        let result = schema.validate(&TransformRegistry::new());
        assert!(matches!(result, Err(SchemaError::Descriptor { .. })));
    }

    #[test]
    fn test_default_coerced_to_type() {
        let field = FieldSchema {
            field_type: FieldType::Int,
            default: WireNode::from("12"),
            ..FieldSchema::default()
        };
        let descriptor = field.descriptor("n", &TransformRegistry::new()).unwrap();
        assert_eq!(descriptor.missing_value(), WireNode::from(12i64));
    }

    #[test]
    fn test_default_of_wrong_type_rejected() {
        let field = FieldSchema {
            field_type: FieldType::Bool,
            default: WireNode::from(json!([true])),
            ..FieldSchema::default()
        };
        let result = field.descriptor("flag", &TransformRegistry::new());
        assert!(matches!(result, Err(SchemaError::InvalidDefault { .. })));
    }

    #[test]
    fn test_case_variants_extend_aliases() {
        let field = FieldSchema {
            case_variants: true,
            ..FieldSchema::default()
        };
        let descriptor = field.descriptor("user_id", &TransformRegistry::new()).unwrap();
        assert_eq!(descriptor.aliases()[0], "user_id");
        assert!(descriptor.aliases().contains(&"userId".to_string()));
    }

    #[test]
    fn test_field_type_decode() {
        assert!(FieldType::Int.decode(&WireNode::from(3i64)).is_ok());
        assert!(FieldType::Int.decode(&WireNode::from(3.5)).is_err());
        assert!(FieldType::Float.decode(&WireNode::from(3i64)).is_ok());
        assert!(FieldType::String.decode(&WireNode::from(3i64)).is_err());
        assert!(FieldType::Any.decode(&WireNode::from(json!({"a": 1}))).is_ok());
        assert!(FieldType::Any.decode(&WireNode::Null).is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let result = RecordSchema::from_yaml_str(
            "name: r\nfields:\n  age:\n    type: int\n    alias: [Age]\n    defualt: 5\n",
        );
        assert!(matches!(result, Err(SchemaError::Yaml(_))));

        let result = RecordSchema::from_yaml_str("name: r\nfeilds: {}\nfields:\n  a:\n");
        assert!(matches!(result, Err(SchemaError::Yaml(_))));
    }

    #[test]
    fn test_transform_output_checked_against_type() {
        let field = FieldSchema {
            field_type: FieldType::Int,
            transform: Some("trim".to_string()),
            ..FieldSchema::default()
        };
        let descriptor = field.descriptor("n", &TransformRegistry::with_builtins()).unwrap();

        assert_eq!(descriptor.custom_decode(&WireNode::from(" 7 ")), Some(WireNode::from(7i64)));
        assert_eq!(descriptor.custom_decode(&WireNode::from("abc")), None);
    }

    #[test]
    fn test_field_type_canonicalize() {
        assert_eq!(
            FieldType::Float.canonicalize(&WireNode::from("2.5")),
            Some(WireNode::from(2.5))
        );
        assert_eq!(FieldType::Bool.canonicalize(&WireNode::from("yes")), None);
        assert_eq!(FieldType::Any.canonicalize(&WireNode::Null), None);
    }

    #[test]
    fn test_field_type_coercion() {
        let int = FieldType::Int.coercion().unwrap();
        assert_eq!(int.coerce(&WireNode::from("7")), Some(WireNode::from(7i64)));
        assert!(FieldType::Any.coercion().is_none());
    }
}
