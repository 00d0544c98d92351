//! Error types for the markdown-typst library.

use thiserror::Error;

/// Result type alias for this library.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that occur while reading a document.
///
/// The conversion step itself never fails: malformed Markdown is normalized
/// on a best-effort basis (unmatched delimiters are escaped, unterminated
/// blocks are flushed at end of input). The only failure mode is front
/// matter that is present but not valid YAML.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid front matter: {0}")]
    FrontMatter(String),

    #[error("front matter value for `{key}` is not a scalar")]
    NonScalarValue { key: String },
}
