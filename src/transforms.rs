//! Ready-made custom transforms for [`FieldDescriptor`](crate::FieldDescriptor).
//!
//! Each function has the shape expected by `decode_with` / `encode_with` and
//! is pure.

use crate::wire::WireNode;

/// Timestamps as `chrono::DateTime<Utc>`.
///
/// Decoding accepts RFC 3339 strings, `YYYY-MM-DD HH:MM:SS[.fff]` strings
/// (read as UTC), bare `YYYY-MM-DD` dates (midnight UTC) and Unix seconds as
/// integers, floats or numeric strings. Encoding writes RFC 3339.
///
/// # Example
///
/// ```
/// use chrono::{DateTime, Utc};
/// use wirefield::{transforms::timestamp, FieldDescriptor};
///
/// let created = FieldDescriptor::new(["created_at"], || DateTime::<Utc>::UNIX_EPOCH)
///     .unwrap()
///     .decode_with(timestamp::decode)
///     .encode_with(timestamp::encode);
/// # let _ = created;
/// ```
pub mod timestamp {
    use super::WireNode;
    use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    pub fn decode(node: &WireNode) -> Option<DateTime<Utc>> {
        match node {
            WireNode::String(s) => parse(s.trim()),
            WireNode::Number(n) => n
                .as_i64()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .or_else(|| n.as_f64().and_then(from_fractional_seconds)),
            _ => None,
        }
    }

    pub fn encode(value: &DateTime<Utc>) -> Option<WireNode> {
        Some(WireNode::String(
            value.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        ))
    }

    /// Parse one timestamp string in any accepted form.
    pub fn parse(text: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc));
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return Some(naive.and_utc());
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
        if let Ok(secs) = text.parse::<i64>() {
            return DateTime::from_timestamp(secs, 0);
        }
        text.parse::<f64>().ok().and_then(from_fractional_seconds)
    }

    fn from_fractional_seconds(secs: f64) -> Option<DateTime<Utc>> {
        if !secs.is_finite() {
            return None;
        }
        let whole = secs.floor();
        let nanos = ((secs - whole) * 1e9).round() as u32;
        if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
            return None;
        }
        DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
    }
}

/// Timestamps written as integer Unix seconds.
///
/// Decoding is identical to [`timestamp::decode`].
pub mod unix_seconds {
    use super::WireNode;
    use chrono::{DateTime, Utc};

    pub fn decode(node: &WireNode) -> Option<DateTime<Utc>> {
        super::timestamp::decode(node)
    }

    pub fn encode(value: &DateTime<Utc>) -> Option<WireNode> {
        Some(WireNode::from(value.timestamp()))
    }
}

/// Strings with surrounding whitespace removed. Blank strings decode to
/// `None`, letting the remaining aliases or the fallback apply.
pub mod trimmed {
    use super::WireNode;

    pub fn decode(node: &WireNode) -> Option<String> {
        node.as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}
