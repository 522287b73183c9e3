//! Tests against the sample schema and data shipped in config/

use serde_json::json;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use wirefield::serialization::{read_nodes, NdjsonWriter};
use wirefield::{RecordError, RecordNormalizer, RecordSchema, TransformRegistry, WireNode};

fn config_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config").join(relative)
}

fn person_normalizer() -> RecordNormalizer {
    let schema = RecordSchema::load_from_file(config_path("schemas/person.yaml")).unwrap();
    RecordNormalizer::new(&schema, &TransformRegistry::with_builtins()).unwrap()
}

fn people() -> Vec<WireNode> {
    let file = File::open(config_path("data/people.ndjson")).unwrap();
    read_nodes(BufReader::new(file)).unwrap()
}

#[test]
fn test_sample_schema_is_valid() {
    let schema = RecordSchema::load_from_file(config_path("schemas/person.yaml")).unwrap();
    assert_eq!(schema.name, "person");
    assert!(schema.validate(&TransformRegistry::with_builtins()).is_ok());
    assert_eq!(
        person_normalizer().output_keys(),
        vec!["id", "name", "age", "active", "score", "created", "tags"]
    );
}

#[test]
fn test_clean_record_passes_through() {
    let normalized = person_normalizer().normalize(&people()[0]).unwrap();
    assert_eq!(
        normalized,
        WireNode::from(json!({
            "id": 1,
            "name": "Ada",
            "age": 36,
            "active": true,
            "score": 9.5,
            "created": "2024-03-01T08:00:00Z",
            "tags": ["math"]
        }))
    );
}

#[test]
fn test_legacy_record_is_bridged() {
    let normalized = person_normalizer().normalize(&people()[1]).unwrap();
    assert_eq!(
        normalized,
        WireNode::from(json!({
            "id": 2,
            "name": "Grace Hopper",
            "age": 85,
            "active": true,
            "score": 0.0,
            "created": "2024-03-01T08:00:00Z",
            "tags": null
        }))
    );
}

#[test]
fn test_malformed_record_falls_back() {
    let normalized = person_normalizer().normalize_traced(&people()[2]).unwrap();
    assert_eq!(
        normalized.record,
        WireNode::from(json!({
            "id": 3,
            "name": null,
            "age": 0,
            "active": false,
            "score": 0.0,
            "created": null,
            "tags": null
        }))
    );
    assert_eq!(normalized.missing_count(), 6);
}

#[test]
fn test_non_keyed_line_is_rejected() {
    let result = person_normalizer().normalize(&people()[3]);
    assert!(matches!(
        result,
        Err(RecordError::NotKeyed { actual: "sequence", .. })
    ));
}

#[test]
fn test_normalized_output_is_ndjson() {
    let normalizer = person_normalizer();
    let mut buf = Vec::new();
    let mut writer = NdjsonWriter::new(&mut buf);
    for node in people().iter().take(2) {
        writer.write(&normalizer.normalize(node).unwrap()).unwrap();
    }
    writer.flush().unwrap();

    let output = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with(r#"{"id":2,"name":"Grace Hopper""#));
}
