//! # markdown-typst
//!
//! Converts hand-written Markdown articles into Typst markup targeting a
//! magazine template, so pre-converted article fragments can be assembled
//! into a paginated magazine and compiled to PDF by an external Typst
//! compiler.
//!
//! The converter is a single-pass, line-oriented state machine. Multi-line
//! structures (box admonitions, blockquotes, tables) accumulate until a
//! closing condition; everything else is rewritten in place. Malformed
//! Markdown never fails the conversion: unmatched emphasis delimiters are
//! escaped and unterminated blocks are flushed at end of input, so the
//! emitted markup is always syntactically valid for the compiler.
//!
//! ## Syntax mapping
//!
//! ```text
//! Markdown                      Typst (magazine template)
//! ──────────────────────────    ─────────────────────────────────────────
//! # Heading                     == Heading  (level shifted +1)
//! **bold**                      *bold*
//! *italic*                      _italic_
//! [text](url)                   #link-geko("url", testo: "text")
//! https://bare.url              #link-geko("https://bare.url")
//! ![alt](path){width=80%}       #figura("path", didascalia: "alt", larghezza: 80%)
//! * bullet                      - bullet
//! 1. numbered                   + numbered
//! > blockquote                  #quote[text]
//! | table | row |               #tabella-geko((headers,), (rows))
//! !!! tipo "titolo" ... !!!     #box-evidenza(titolo: "titolo")[content]
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use markdown_typst::convert;
//!
//! let input = "---\ntitolo: Antenne QRP\n---\n\n# Materiali\n\nTesto **importante**.";
//! let (metadata, typst) = convert(input).unwrap();
//!
//! assert_eq!(metadata.get("titolo").unwrap(), "Antenne QRP");
//! assert!(typst.contains("== Materiali"));
//! assert!(typst.contains("*importante*"));
//! ```
//!
//! Front matter is an optional `---` delimited YAML header; the only error
//! the crate reports is a header that is present but malformed. Each call
//! operates on its own local state, so conversions can run concurrently
//! without coordination.

pub mod article;
pub mod convert;
pub mod error;
pub mod frontmatter;

pub use article::{generate_article, ArticleMeta};
pub use convert::convert_body;
pub use error::{ParseError, Result};
pub use frontmatter::Metadata;

/// Convert a Markdown document (with optional YAML front matter) to Typst.
///
/// Returns the front matter metadata and the converted body markup. Fails
/// only when front matter is present but malformed.
pub fn convert(markdown_text: &str) -> Result<(Metadata, String)> {
    let (metadata, body) = frontmatter::split(markdown_text)?;
    Ok((metadata, convert_body(body)))
}

/// Convert a Markdown document and wrap it into the full article markup in
/// one step, reading title/subtitle/author from the front matter.
pub fn convert_article(markdown_text: &str) -> Result<String> {
    let (metadata, body) = convert(markdown_text)?;
    let meta = ArticleMeta::from_front_matter(&metadata);
    Ok(meta.render(&body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_pipeline() {
        let input = "---\ntitolo: Antenne QRP\nsottotitolo: Esperienze sul campo\nautore: IK2ABC\nnome: Mario\n---\n\n# Materiali\n\nServe filo di **rame** e un *balun*.\n\n> Meno potenza, piu divertimento.\n";

        let article = convert_article(input).unwrap();

        assert!(article.starts_with("= Antenne QRP\n"));
        assert!(article.contains("#sottotitolo-sezione[Esperienze sul campo]"));
        assert!(article.contains("#autore(\"IK2ABC\", nome: \"Mario\")"));
        assert!(article.contains("== Materiali"));
        assert!(article.contains("*rame*"));
        assert!(article.contains("_balun_"));
        assert!(article.contains("#quote[Meno potenza, piu divertimento.]"));
        assert!(article.ends_with("#separatore()"));
    }

    #[test]
    fn document_without_front_matter() {
        let (metadata, typst) = convert("# Solo corpo\n\ntesto").unwrap();
        assert!(metadata.is_empty());
        assert!(typst.contains("== Solo corpo"));
    }

    #[test]
    fn malformed_front_matter_is_reported() {
        let err = convert("---\ntitolo: [rotto\n---\ncorpo").unwrap_err();
        assert!(matches!(err, ParseError::FrontMatter(_)));
    }

    #[test]
    fn conversion_itself_never_fails() {
        // Unbalanced emphasis, unterminated blocks: normalized, not rejected.
        let (_, typst) = convert("testo* rotto\n> quote mai chiusa").unwrap();
        assert!(typst.contains("\\*"));
        assert!(typst.contains("#quote[quote mai chiusa]"));
    }
}
