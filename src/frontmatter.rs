//! YAML front matter handling.
//!
//! Articles may start with a `---` delimited YAML header carrying metadata
//! (title, subtitle, author call sign, ...). The header is split off before
//! conversion and parsed into a plain string map; the rest of the document
//! is returned untouched.

use std::collections::HashMap;

use crate::error::{ParseError, Result};

const DELIMITER: &str = "---";

/// Front matter metadata as a flat string map.
pub type Metadata = HashMap<String, String>;

/// Split an optional YAML front matter header off `input`.
///
/// Returns the parsed metadata and the remaining body. If the document does
/// not start with a `---` line the metadata is empty and the body is the
/// whole input.
pub fn split(input: &str) -> Result<(Metadata, &str)> {
    let trimmed = input.trim_start();

    if !trimmed.starts_with(DELIMITER) {
        return Ok((Metadata::new(), input));
    }

    let after_open = &trimmed[DELIMITER.len()..];
    let close = after_open.find("\n---").ok_or_else(|| {
        ParseError::FrontMatter("unclosed front matter (missing closing ---)".into())
    })?;

    let header = &after_open[..close];
    let body_start = close + 1 + DELIMITER.len();
    let body = after_open[body_start..].trim_start_matches('\n');

    let metadata = parse_header(header)?;
    Ok((metadata, body))
}

/// Parse the YAML header into a string map.
///
/// Scalar values (string, number, bool) are stringified; `null` becomes the
/// empty string. Anything nested is rejected as malformed.
fn parse_header(header: &str) -> Result<Metadata> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(header).map_err(|e| ParseError::FrontMatter(e.to_string()))?;

    let mapping = match value {
        serde_yaml::Value::Null => return Ok(Metadata::new()),
        serde_yaml::Value::Mapping(mapping) => mapping,
        _ => {
            return Err(ParseError::FrontMatter(
                "front matter is not a key-value mapping".into(),
            ))
        }
    };

    let mut metadata = Metadata::new();
    for (key, value) in mapping {
        let key = scalar_to_string(&key)
            .ok_or_else(|| ParseError::FrontMatter("non-scalar key in front matter".into()))?;
        let value =
            scalar_to_string(&value).ok_or_else(|| ParseError::NonScalarValue { key: key.clone() })?;
        metadata.insert(key, value);
    }
    Ok(metadata)
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Null => Some(String::new()),
        _ => None,
    }
}
