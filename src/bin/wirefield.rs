//! wirefield CLI - normalize JSON records against a YAML record schema
//!
//! Each record is resolved field by field: aliases, defaults, transforms and
//! primitive bridging come from the schema.

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use wirefield::serialization::{read_nodes, JsonArrayWriter, NdjsonWriter};
use wirefield::{RecordError, RecordNormalizer, RecordSchema, TransformRegistry, WireNode};

#[derive(Parser)]
#[command(name = "wirefield")]
#[command(version, about = "Normalize JSON records against a YAML record schema", long_about = None)]
struct Cli {
    /// Log field resolution decisions (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize NDJSON or JSON-array records
    Normalize {
        /// Path to the record schema YAML
        #[arg(short, long)]
        schema: PathBuf,

        /// Input file ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output file ("-" for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Write a pretty-printed JSON array instead of NDJSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Validate a record schema without normalizing anything
    Validate {
        /// Path to the record schema YAML
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// List the builtin transforms a schema may reference
    Transforms,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Normalize {
            schema,
            input,
            output,
            pretty,
        } => normalize(&schema, &input, &output, pretty),
        Commands::Validate { schema } => validate(&schema),
        Commands::Transforms => {
            list_transforms();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead>, String> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path)
        .map_err(|e| format!("Failed to open input {}: {}", path.display(), e))?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_output(path: &Path) -> Result<Box<dyn Write>, String> {
    if is_stdio(path) {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }
    let file = File::create(path)
        .map_err(|e| format!("Failed to create output {}: {}", path.display(), e))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn load_normalizer(schema_path: &Path) -> Result<RecordNormalizer, String> {
    let schema = RecordSchema::load_from_file(schema_path).map_err(|e| e.to_string())?;
    RecordNormalizer::new(&schema, &TransformRegistry::with_builtins()).map_err(|e| e.to_string())
}

/// Normalize every record from `input` into `output`
fn normalize(schema: &Path, input: &Path, output: &Path, pretty: bool) -> Result<(), String> {
    let normalizer = load_normalizer(schema)?;
    tracing::info!(
        schema = normalizer.schema_name(),
        fields = ?normalizer.output_keys(),
        "schema loaded"
    );

    let nodes = read_nodes(open_input(input)?).map_err(|e| e.to_string())?;
    let mut written = 0usize;
    let mut skipped = 0usize;
    let mut records: Vec<WireNode> = Vec::with_capacity(nodes.len());

    for (index, node) in nodes.iter().enumerate() {
        match normalizer.normalize_traced(node) {
            Ok(normalized) => {
                if normalized.missing_count() > 0 {
                    tracing::debug!(
                        record = index,
                        missing = normalized.missing_count(),
                        "fields fell back to defaults"
                    );
                }
                records.push(normalized.record);
            }
            Err(RecordError::NotKeyed { actual, .. }) => {
                tracing::warn!(record = index, kind = actual, "skipping non-keyed record");
                skipped += 1;
            }
            Err(e) => return Err(e.to_string()),
        }
    }

    let sink = open_output(output)?;
    if pretty {
        let mut writer = JsonArrayWriter::pretty(sink).map_err(|e| e.to_string())?;
        for record in &records {
            writer.write(record).map_err(|e| e.to_string())?;
            written += 1;
        }
        writer.finish().map_err(|e| e.to_string())?;
    } else {
        let mut writer = NdjsonWriter::new(sink);
        for record in &records {
            writer.write(record).map_err(|e| e.to_string())?;
            written += 1;
        }
        writer.flush().map_err(|e| e.to_string())?;
    }

    tracing::info!(written, skipped, "normalization finished");
    Ok(())
}

/// Validate a schema and print its fields
fn validate(schema_path: &Path) -> Result<(), String> {
    let schema = RecordSchema::load_from_file(schema_path).map_err(|e| e.to_string())?;
    schema
        .validate(&TransformRegistry::with_builtins())
        .map_err(|e| e.to_string())?;

    println!("✓ Schema '{}' is valid ({} fields)", schema.name, schema.fields.len());
    for (name, field) in &schema.fields {
        let mut line = format!(
            "  {} : {} <- [{}]",
            name,
            field.field_type,
            field.aliases_for(name).join(", ")
        );
        if let Some(transform) = &field.transform {
            line.push_str(&format!(" via {}", transform));
        }
        if !field.default.is_null() {
            line.push_str(&format!(" (default {})", field.default));
        }
        println!("{}", line);
    }
    Ok(())
}

fn list_transforms() {
    for name in TransformRegistry::with_builtins().list_transforms() {
        println!("{}", name);
    }
}
