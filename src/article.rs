//! Article wrapper.
//!
//! Wraps a converted body into the full article structure the magazine
//! template expects: the title as the only level-1 heading, an optional
//! subtitle and author call, the body, and a closing separator.

use crate::frontmatter::Metadata;

/// Article metadata as consumed by the wrapper, extracted from front matter
/// with Italian/English key fallbacks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleMeta {
    /// Article title.
    pub title: String,
    /// Optional subtitle.
    pub subtitle: Option<String>,
    /// Author call sign (e.g. `IK2ABC`).
    pub author_call: Option<String>,
    /// Author real name.
    pub author_name: Option<String>,
}

impl ArticleMeta {
    /// Extract article fields from a front matter map. Italian keys take
    /// precedence over their English equivalents; empty values count as
    /// absent.
    pub fn from_front_matter(metadata: &Metadata) -> Self {
        ArticleMeta {
            title: lookup(metadata, &["titolo", "title"]).unwrap_or_default(),
            subtitle: lookup(metadata, &["sottotitolo", "subtitle"]),
            author_call: lookup(metadata, &["autore", "author"]),
            author_name: lookup(metadata, &["nome", "name"]),
        }
    }

    /// Wrap an already-converted body into the full article markup.
    pub fn render(&self, body: &str) -> String {
        generate_article(
            &self.title,
            self.subtitle.as_deref(),
            self.author_call.as_deref(),
            self.author_name.as_deref(),
            body,
        )
    }
}

fn lookup(metadata: &Metadata, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| metadata.get(*key))
        .filter(|value| !value.is_empty())
        .cloned()
}

/// Assemble the article markup around a converted body. Pure string
/// assembly; always succeeds. Empty optional strings are treated as absent.
pub fn generate_article(
    title: &str,
    subtitle: Option<&str>,
    author_call: Option<&str>,
    author_name: Option<&str>,
    body: &str,
) -> String {
    let subtitle = subtitle.filter(|s| !s.is_empty());
    let author_call = author_call.filter(|s| !s.is_empty());
    let author_name = author_name.filter(|s| !s.is_empty());

    let mut parts: Vec<String> = Vec::new();

    parts.push(format!("= {}", title));
    parts.push(String::new());

    if let Some(subtitle) = subtitle {
        parts.push(format!("#sottotitolo-sezione[{}]", subtitle));
    }
    if let Some(call) = author_call {
        match author_name {
            Some(name) => parts.push(format!("#autore(\"{}\", nome: \"{}\")", call, name)),
            None => parts.push(format!("#autore(\"{}\")", call)),
        }
    }
    parts.push(String::new());

    parts.push(body.to_string());
    parts.push(String::new());
    parts.push("#separatore()".to_string());

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn full_wrapper() {
        let out = generate_article(
            "Antenne QRP",
            Some("Esperienze sul campo"),
            Some("IK2ABC"),
            Some("Mario"),
            "corpo",
        );
        assert_eq!(
            out,
            "= Antenne QRP\n\n#sottotitolo-sezione[Esperienze sul campo]\n#autore(\"IK2ABC\", nome: \"Mario\")\n\ncorpo\n\n#separatore()"
        );
    }

    #[test]
    fn minimal_wrapper() {
        let out = generate_article("Titolo", None, None, None, "corpo");
        assert_eq!(out, "= Titolo\n\n\ncorpo\n\n#separatore()");
    }

    #[test]
    fn author_without_name() {
        let out = generate_article("T", None, Some("IK2ABC"), None, "b");
        assert!(out.contains("#autore(\"IK2ABC\")"));
        assert!(!out.contains("nome:"));
    }

    #[test]
    fn empty_optionals_are_absent() {
        let out = generate_article("T", Some(""), Some(""), Some(""), "b");
        assert!(!out.contains("#sottotitolo-sezione"));
        assert!(!out.contains("#autore"));
    }

    #[test]
    fn meta_key_fallbacks() {
        let mut metadata = Metadata::new();
        metadata.insert("title".into(), "English".into());
        metadata.insert("titolo".into(), "Italiano".into());
        metadata.insert("author".into(), "IZ1XYZ".into());

        let meta = ArticleMeta::from_front_matter(&metadata);
        assert_eq!(meta.title, "Italiano");
        assert_eq!(meta.author_call.as_deref(), Some("IZ1XYZ"));
        assert_eq!(meta.subtitle, None);
    }
}
