//! Markdown body conversion.
//!
//! A single-pass, line-oriented state machine. Multi-line structures (box
//! admonitions, blockquotes, tables) accumulate while their mode is active;
//! everything else is converted line by line: headings shift one level down
//! (the article title added by the wrapper stays the only `=` heading),
//! images become `#figura(...)` calls, and plain text goes through the
//! inline pipeline.
//!
//! Exactly one mode is active at a time. A line that ends a block is
//! re-examined in `Normal` mode, so block closers never swallow content,
//! and any block still open at end of input is flushed.

mod inline;
mod table;

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker opening and closing a box admonition.
const BOX_MARKER: &str = "!!!";

/// Web upload prefix remapped for the Typst compiler, which resolves image
/// paths against a different root than the web server.
const UPLOAD_WEB_PREFIX: &str = "/uploads/";
const COMPILER_ROOT: &str = "/data";

/// Box opener with a title: `!!! nota "Titolo"` or `!!! "Titolo"`.
static BOX_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^!!!\s*(?:\w+\s*)?"([^"]*)""#).unwrap());

/// Image line: `![alt](path){width=50%}`, attributes optional.
static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!\[([^\]]*)\]\(([^)]+)\)(?:\{([^}]+)\})?").unwrap());

/// `width=...` attribute inside the image attribute block.
static WIDTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"width=(\d+%?)").unwrap());

/// Active multi-line block, if any.
enum BlockState {
    Normal,
    Box { title: String, lines: Vec<String> },
    Quote { lines: Vec<String> },
    Table { headers: Vec<String>, rows: Vec<Vec<String>> },
}

/// Convert a Markdown body (front matter already removed) to Typst.
pub fn convert_body(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut out: Vec<String> = Vec::new();
    let mut state = BlockState::Normal;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        // Box content. The close check comes first so the closing marker is
        // never mistaken for a new opener.
        if matches!(state, BlockState::Box { .. }) {
            if trimmed == BOX_MARKER {
                flush(&mut state, &mut out, true);
            } else if let BlockState::Box { lines, .. } = &mut state {
                lines.push(line.to_string());
            }
            i += 1;
            continue;
        }

        // Box opener: bare `!!!`, or `!!!` with an optional bare word and a
        // quoted title. A marker line matching neither form is consumed
        // without opening a box.
        if trimmed.starts_with(BOX_MARKER) {
            flush(&mut state, &mut out, true);
            if trimmed == BOX_MARKER {
                state = BlockState::Box {
                    title: String::new(),
                    lines: Vec::new(),
                };
            } else if let Some(caps) = BOX_OPEN.captures(trimmed) {
                state = BlockState::Box {
                    title: caps[1].to_string(),
                    lines: Vec::new(),
                };
            }
            i += 1;
            continue;
        }

        // Blockquote lines accumulate with the `>` and one following space
        // stripped.
        if let Some(rest) = trimmed.strip_prefix('>') {
            let text = rest.strip_prefix(' ').unwrap_or(rest).to_string();
            if !matches!(state, BlockState::Quote { .. }) {
                flush(&mut state, &mut out, true);
                state = BlockState::Quote { lines: Vec::new() };
            }
            if let BlockState::Quote { lines } = &mut state {
                lines.push(text);
            }
            i += 1;
            continue;
        }
        if matches!(state, BlockState::Quote { .. }) {
            // First non-quote line closes the block; the line itself is
            // processed normally below.
            flush(&mut state, &mut out, true);
        }

        // Table rows. The first row is the header; a separator row directly
        // after it is skipped.
        if table::is_row(trimmed) {
            let cells = table::split_cells(trimmed);
            if let BlockState::Table { rows, .. } = &mut state {
                rows.push(cells);
                i += 1;
                continue;
            }
            // First row opens the table as its header.
            state = BlockState::Table {
                headers: cells,
                rows: Vec::new(),
            };
            if lines.get(i + 1).is_some_and(|next| table::is_separator(next.trim())) {
                i += 1;
            }
            i += 1;
            continue;
        }
        if matches!(state, BlockState::Table { .. }) {
            flush(&mut state, &mut out, true);
        }

        // Headings: `#` count + 1 equals signs, so the wrapper's article
        // title remains the only level-1 heading.
        if line.starts_with('#') {
            let level = line.chars().take_while(|&c| c == '#').count();
            let text = line.trim_start_matches('#').trim();
            out.push(format!("{} {}", "=".repeat(level + 1), text));
            i += 1;
            continue;
        }

        if let Some(figure) = rewrite_image(trimmed) {
            out.push(figure);
            i += 1;
            continue;
        }

        out.push(inline::rewrite_inline(line));
        i += 1;
    }

    // Unterminated blocks are flushed rather than dropped.
    flush(&mut state, &mut out, false);

    out.join("\n")
}

/// Emit whatever block is open and return to `Normal`. Mid-document closes
/// add a blank separator line after the block.
fn flush(state: &mut BlockState, out: &mut Vec<String>, trailing_blank: bool) {
    match std::mem::replace(state, BlockState::Normal) {
        BlockState::Normal => return,
        BlockState::Box { title, lines } => emit_box(out, &title, &lines),
        BlockState::Quote { lines } => out.push(format!("#quote[{}]", lines.join("\n"))),
        BlockState::Table { headers, rows } => out.push(table::format(&headers, &rows)),
    }
    if trailing_blank {
        out.push(String::new());
    }
}

/// Emit a `#box-evidenza(...)` call. Blank lines are dropped and each
/// remaining source line becomes its own paragraph.
fn emit_box(out: &mut Vec<String>, title: &str, lines: &[String]) {
    let content = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n\n");
    out.push(format!("#box-evidenza(titolo: \"{}\")[", title));
    out.push(format!("  {}", content));
    out.push("]".to_string());
}

/// Rewrite an image line to a `#figura(...)` call, remapping web upload
/// paths to the compiler's filesystem root.
fn rewrite_image(trimmed: &str) -> Option<String> {
    let caps = IMAGE.captures(trimmed)?;
    let alt = &caps[1];
    let mut path = caps[2].to_string();

    if path.starts_with(UPLOAD_WEB_PREFIX) {
        path.insert_str(0, COMPILER_ROOT);
    }

    let width = caps
        .get(3)
        .and_then(|attrs| WIDTH.captures(attrs.as_str()))
        .map(|w| w[1].to_string());

    let mut args = vec![format!("\"{}\"", path)];
    if !alt.is_empty() {
        args.push(format!("didascalia: \"{}\"", alt));
    }
    if let Some(width) = width {
        args.push(format!("larghezza: {}", width));
    }
    Some(format!("#figura({})", args.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn heading_shift() {
        for level in 1..=6 {
            let input = format!("{} Titolo", "#".repeat(level));
            let expected = format!("{} Titolo", "=".repeat(level + 1));
            assert_eq!(convert_body(&input), expected);
        }
    }

    #[test]
    fn box_round_trip() {
        let input = "!!! nota \"Titolo\"\nriga uno\n\nriga due\n!!!";
        assert_eq!(
            convert_body(input),
            "#box-evidenza(titolo: \"Titolo\")[\n  riga uno\n\nriga due\n]\n"
        );
    }

    #[test]
    fn bare_box_marker_opens_untitled_box() {
        let out = convert_body("!!!\ncontenuto\n!!!");
        assert!(out.starts_with("#box-evidenza(titolo: \"\")["));
        assert!(out.contains("contenuto"));
    }

    #[test]
    fn malformed_box_opener_is_consumed() {
        // No quoted title: the line is dropped and no box opens.
        let out = convert_body("!!! avviso\ntesto dopo");
        assert_eq!(out, "testo dopo");
    }

    #[test]
    fn box_content_is_not_inline_converted() {
        let out = convert_body("!!! \"T\"\n**grassetto**\n!!!");
        assert!(out.contains("**grassetto**"));
    }

    #[test]
    fn blockquote() {
        let input = "> prima riga\n> seconda riga\ndopo";
        assert_eq!(
            convert_body(input),
            "#quote[prima riga\nseconda riga]\n\ndopo"
        );
    }

    #[test]
    fn blockquote_closing_line_is_reprocessed() {
        let input = "> citazione\n# Sezione";
        assert_eq!(convert_body(input), "#quote[citazione]\n\n== Sezione");
    }

    #[test]
    fn unterminated_blockquote_is_flushed() {
        assert_eq!(convert_body("> solo citazione"), "#quote[solo citazione]");
    }

    #[test]
    fn table_two_by_two() {
        let input = "| Banda | Potenza |\n|---|---|\n| 40m | 5W |\n| 20m | 10W |\ndopo";
        let expected = "#tabella-geko(\n  ([Banda], [Potenza],),\n  (\n    ([40m], [5W]),\n    ([20m], [10W]),\n  )\n)\n\ndopo";
        assert_eq!(convert_body(input), expected);
    }

    #[test]
    fn separator_row_is_not_data() {
        let out = convert_body("| A | B |\n|---|---|\n| 1 | 2 |\n");
        assert!(!out.contains("---"));
        assert_eq!(out.matches("([").count(), 2);
    }

    #[test]
    fn unterminated_box_is_flushed() {
        let out = convert_body("!!! \"T\"\nmai chiuso");
        assert_eq!(out, "#box-evidenza(titolo: \"T\")[\n  mai chiuso\n]");
    }

    #[test]
    fn unterminated_table_is_flushed() {
        let out = convert_body("| A | B |\n| 1 | 2 |");
        assert!(out.contains("#tabella-geko"));
        assert!(out.contains("([1], [2]),"));
    }

    #[test]
    fn image_with_remap_and_width() {
        assert_eq!(
            convert_body("![alt](/uploads/x.png){width=50%}"),
            "#figura(\"/data/uploads/x.png\", didascalia: \"alt\", larghezza: 50%)"
        );
    }

    #[test]
    fn image_without_attrs_or_alt() {
        assert_eq!(
            convert_body("![](assets/logo.png)"),
            "#figura(\"assets/logo.png\")"
        );
    }

    #[test]
    fn non_upload_path_is_untouched() {
        assert_eq!(
            convert_body("![logo](assets/logo.png){width=30%}"),
            "#figura(\"assets/logo.png\", didascalia: \"logo\", larghezza: 30%)"
        );
    }

    #[test]
    fn quote_then_table() {
        let out = convert_body("> nota\n| A | B |\n| 1 | 2 |\n");
        let quote = out.find("#quote").unwrap();
        let table = out.find("#tabella-geko").unwrap();
        assert!(quote < table);
    }

    #[test]
    fn box_opener_closes_pending_quote() {
        let out = convert_body("> nota\n!!! \"T\"\ndentro\n!!!");
        let quote = out.find("#quote[nota]").unwrap();
        let boxed = out.find("#box-evidenza").unwrap();
        assert!(quote < boxed);
    }

    #[test]
    fn plain_lines_pass_through_inline_pipeline() {
        assert_eq!(convert_body("* punto **forte**"), "- punto *forte*");
    }
}
