//! Inline rewrite pipeline.
//!
//! Regular text lines go through a fixed sequence of rewrite steps. Order
//! matters: list markers are rewritten before emphasis so a leading `*` is
//! never read as an italic delimiter, bold is protected behind a placeholder
//! while the italic rule runs, and the escape pass runs after emphasis so
//! the emitted line never carries an unbalanced `*` delimiter.

use once_cell::sync::Lazy;
use regex::Regex;

/// Bullet list marker: `* item` → `- item`.
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)\*\s+").unwrap());

/// Numbered list marker: `1. item` → `+ item`.
static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)\d+\.\s+").unwrap());

/// Bold span: `**text**`.
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());

/// Markdown link: `[text](url)`.
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// Bare URL; quotes and closing parens terminate the match so URLs already
/// inside a `#link-geko("...")` argument are not picked up twice.
static BARE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"https?://[^\s<>")]+"#).unwrap());

// Sentinels keeping bold spans out of reach of the italic rule. NUL never
// occurs in article text.
const BOLD_OPEN: &str = "\u{0}BOLD\u{0}";
const BOLD_CLOSE: &str = "\u{0}/BOLD\u{0}";

/// The pipeline, in application order.
const PIPELINE: &[fn(&str) -> String] = &[
    rewrite_bullets,
    rewrite_numbered,
    protect_bold,
    rewrite_italic,
    restore_bold,
    escape_lone_asterisks,
    rewrite_links,
    rewrite_bare_urls,
];

/// Apply the full inline pipeline to one line.
pub(crate) fn rewrite_inline(line: &str) -> String {
    PIPELINE.iter().fold(line.to_string(), |line, step| step(&line))
}

fn rewrite_bullets(line: &str) -> String {
    BULLET.replace(line, "$1- ").into_owned()
}

fn rewrite_numbered(line: &str) -> String {
    NUMBERED.replace(line, "$1+ ").into_owned()
}

fn protect_bold(line: &str) -> String {
    BOLD.replace_all(line, format!("{BOLD_OPEN}${{1}}{BOLD_CLOSE}"))
        .into_owned()
}

fn restore_bold(line: &str) -> String {
    line.replace(BOLD_OPEN, "*").replace(BOLD_CLOSE, "*")
}

/// Italic: a `*text*` span whose delimiters are not adjacent to another `*`
/// becomes `_text_`. Hand-rolled scan; the `regex` crate has no lookaround.
pub(crate) fn rewrite_italic(line: &str) -> String {
    let bytes = line.as_bytes();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;

    while let Some(offset) = line[i..].find('*') {
        let open = i + offset;
        out.push_str(&line[i..open]);

        let prev_is_star = open > 0 && bytes[open - 1] == b'*';
        let close = line[open + 1..].find('*').map(|o| open + 1 + o);
        match close {
            Some(close)
                if !prev_is_star
                    && close > open + 1
                    && bytes.get(close + 1) != Some(&b'*') =>
            {
                out.push('_');
                out.push_str(&line[open + 1..close]);
                out.push('_');
                i = close + 1;
            }
            _ => {
                out.push('*');
                i = open + 1;
            }
        }
    }
    out.push_str(&line[i..]);
    out
}

fn rewrite_links(line: &str) -> String {
    LINK.replace_all(line, r#"#link-geko("$2", testo: "$1")"#)
        .into_owned()
}

/// Wrap bare URLs in `#link-geko(...)`, skipping any URL directly adjacent
/// to a double quote: those are already an argument of a link call.
fn rewrite_bare_urls(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;

    for m in BARE_URL.find_iter(line) {
        out.push_str(&line[last..m.start()]);
        let quoted_before = line[..m.start()].ends_with('"');
        let quoted_after = line[m.end()..].starts_with('"');
        if quoted_before || quoted_after {
            out.push_str(m.as_str());
        } else {
            out.push_str("#link-geko(\"");
            out.push_str(m.as_str());
            out.push_str("\")");
        }
        last = m.end();
    }
    out.push_str(&line[last..]);
    out
}

/// Escape unmatched `*` characters that would otherwise be an unclosed
/// emphasis delimiter in the emitted Typst, a hard compile error downstream.
///
/// Walks the line pairing asterisks greedily: a `*` with a later unescaped
/// `*` and a non-empty span between them is a matched pair and is copied
/// verbatim; a lone `*` is emitted as `\*`. An existing `\*` is copied
/// untouched, so the pass is idempotent.
pub(crate) fn escape_lone_asterisks(line: &str) -> String {
    if !line.contains('*') {
        return line.to_string();
    }

    let bytes = line.as_bytes();
    let mut out = String::with_capacity(line.len() + 2);
    let mut escaped = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                out.push('\\');
                i += 1;
                if bytes.get(i) == Some(&b'*') {
                    out.push('*');
                    i += 1;
                }
            }
            b'*' => match find_unescaped_star(line, i + 1) {
                Some(close) if close - i > 1 => {
                    out.push_str(&line[i..=close]);
                    i = close + 1;
                }
                _ => {
                    out.push_str("\\*");
                    escaped += 1;
                    i += 1;
                }
            },
            _ => {
                let stop = line[i..]
                    .find(['*', '\\'])
                    .map(|o| i + o)
                    .unwrap_or(line.len());
                out.push_str(&line[i..stop]);
                i = stop;
            }
        }
    }

    if escaped > 0 {
        // Malformed source worth surfacing to an editor, but never worth
        // failing the build over.
        log::warn!("escaped {} unmatched asterisk(s) in line: {:?}", escaped, line);
    }
    out
}

/// Position of the next `*` at or after `from` that is not preceded by `\`.
fn find_unescaped_star(line: &str, from: usize) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut i = from;
    while let Some(offset) = line[i..].find('*') {
        let pos = i + offset;
        if pos == 0 || bytes[pos - 1] != b'\\' {
            return Some(pos);
        }
        i = pos + 1;
    }
    None
}
