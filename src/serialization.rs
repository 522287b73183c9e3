//! Reading and writing streams of records.
//!
//! Input is either NDJSON (one JSON value per line) or a single JSON array.
//! Output is NDJSON or a JSON array.

use crate::record::{Record, RecordError};
use crate::wire::WireNode;
use std::io::{BufRead, Write};

/// Error type for serialization operations
#[derive(Debug)]
pub enum SerializationError {
    JsonError(serde_json::Error),
    IoError(std::io::Error),
    RecordError(RecordError),
    /// A line of NDJSON input is not valid JSON
    InvalidLine { line: usize, source: serde_json::Error },
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        SerializationError::JsonError(err)
    }
}

impl From<std::io::Error> for SerializationError {
    fn from(err: std::io::Error) -> Self {
        SerializationError::IoError(err)
    }
}

impl From<RecordError> for SerializationError {
    fn from(err: RecordError) -> Self {
        SerializationError::RecordError(err)
    }
}

impl std::fmt::Display for SerializationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializationError::JsonError(e) => write!(f, "JSON error: {}", e),
            SerializationError::IoError(e) => write!(f, "IO error: {}", e),
            SerializationError::RecordError(e) => write!(f, "{}", e),
            SerializationError::InvalidLine { line, source } => {
                write!(f, "Invalid JSON on line {}: {}", line, source)
            }
        }
    }
}

impl std::error::Error for SerializationError {}

/// Read all nodes from `reader`.
///
/// Input whose first non-blank character is `[` is read as one JSON array;
/// anything else is read as NDJSON, skipping blank lines.
pub fn read_nodes<R: BufRead>(mut reader: R) -> Result<Vec<WireNode>, SerializationError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_nodes(&text)
}

/// Parse nodes from NDJSON or JSON array text. See [`read_nodes`].
pub fn parse_nodes(text: &str) -> Result<Vec<WireNode>, SerializationError> {
    if text.trim_start().starts_with('[') {
        let node = WireNode::from_json_str(text)?;
        return Ok(match node {
            WireNode::Sequence(items) => items,
            other => vec![other],
        });
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            WireNode::from_json_str(line).map_err(|source| SerializationError::InvalidLine {
                line: index + 1,
                source,
            })
        })
        .collect()
}

/// NDJSON (Newline Delimited JSON) writer
///
/// Writes nodes as NDJSON, one JSON value per line.
pub struct NdjsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> NdjsonWriter<W> {
    /// Create a new NDJSON writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a single node as an NDJSON line
    pub fn write(&mut self, node: &WireNode) -> Result<(), SerializationError> {
        let json = serde_json::to_string(node)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    /// Encode and write a record
    pub fn write_record<R: Record>(&mut self, record: &R) -> Result<(), SerializationError> {
        self.write(&record.to_node())
    }

    /// Write multiple nodes
    pub fn write_all(&mut self, nodes: &[WireNode]) -> Result<(), SerializationError> {
        for node in nodes {
            self.write(node)?;
        }
        Ok(())
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<(), SerializationError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// JSON array writer
///
/// Writes nodes as a JSON array, optionally one pretty-printed element per
/// entry.
pub struct JsonArrayWriter<W: Write> {
    writer: W,
    first: bool,
    pretty: bool,
}

impl<W: Write> JsonArrayWriter<W> {
    /// Create a new JSON array writer and write the opening bracket
    pub fn new(writer: W) -> Result<Self, SerializationError> {
        Self::with_pretty(writer, false)
    }

    pub fn pretty(writer: W) -> Result<Self, SerializationError> {
        Self::with_pretty(writer, true)
    }

    fn with_pretty(mut writer: W, pretty: bool) -> Result<Self, SerializationError> {
        write!(writer, "[")?;
        Ok(Self {
            writer,
            first: true,
            pretty,
        })
    }

    /// Write a single node to the JSON array
    pub fn write(&mut self, node: &WireNode) -> Result<(), SerializationError> {
        if !self.first {
            write!(self.writer, ",")?;
        }
        self.first = false;

        if self.pretty {
            let json = serde_json::to_string_pretty(node)?;
            write!(self.writer, "\n{}", json)?;
        } else {
            let json = serde_json::to_string(node)?;
            write!(self.writer, "{}", json)?;
        }
        Ok(())
    }

    /// Encode and write a record
    pub fn write_record<R: Record>(&mut self, record: &R) -> Result<(), SerializationError> {
        self.write(&record.to_node())
    }

    /// Finish writing the array and close the bracket
    pub fn finish(mut self) -> Result<(), SerializationError> {
        if self.pretty && !self.first {
            writeln!(self.writer)?;
        }
        write!(self.writer, "]")?;
        self.writer.flush()?;
        Ok(())
    }
}
