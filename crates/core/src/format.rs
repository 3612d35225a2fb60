//! Rendering a located subtree into Markdown-like plain text.
//!
//! Walks block-level descendants in document order and renders headings,
//! paragraphs, blockquotes, lists, code blocks, tables, and figures into
//! text blocks joined by blank lines. Also provides the whole-page
//! rendering used when no main-content subtree was located.

use std::collections::HashSet;

use crate::parse::{Document, Element};

/// Block-level tags the formatter renders. `ul`/`ol` are covered through
/// their `li` children.
const BLOCK_SELECTOR: &str =
    "h1, h2, h3, h4, h5, h6, p, blockquote, li, pre, code, table, figure, div";

/// Tags that disqualify a div from being emitted as raw text.
const DIV_DISQUALIFYING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, p, blockquote, ul, ol";

/// Divs are emitted as raw text only above this many characters.
const MIN_DIV_TEXT_CHARS: usize = 200;

/// Headings shorter than this are dropped in full-page rendering.
const MIN_FULL_PAGE_HEADING_CHARS: usize = 5;

/// Paragraphs shorter than this are dropped in full-page rendering.
const MIN_FULL_PAGE_PARAGRAPH_CHARS: usize = 20;

/// Renders a located subtree (serialized HTML) into formatted text.
///
/// Returns the subtree's flattened text when no block rendered, and an
/// empty string for empty input.
pub fn format_subtree(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let doc = Document::parse(html);
    let Ok(Some(root)) = doc.select_first("body > *") else {
        return String::new();
    };

    let Ok(blocks) = root.select(BLOCK_SELECTOR) else {
        return root.text_stripped();
    };

    let mut rendered: Vec<String> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for block in blocks {
        if let Some(id) = block.attr("id") {
            if seen_ids.contains(id) {
                continue;
            }
            seen_ids.insert(id.to_string());
        }

        let text = block.text_stripped();
        if text.is_empty() {
            continue;
        }

        if let Some(piece) = render_block(&block, &text) {
            rendered.push(piece);
        }
    }

    if rendered.is_empty() {
        return root.text_stripped();
    }

    rendered.join("\n\n")
}

fn render_block(block: &Element<'_>, text: &str) -> Option<String> {
    let tag = block.tag_name();
    match tag.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<usize>().ok()?;
            Some(format!("\n{} {}\n", "#".repeat(level), text))
        }
        "p" => Some(text.to_string()),
        "blockquote" => {
            let quoted: Vec<String> = text.lines().map(|line| format!("> {line}")).collect();
            Some(quoted.join("\n"))
        }
        "li" => {
            let ordered = block.parent().is_some_and(|p| p.tag_name() == "ol");
            if ordered {
                let index = block.preceding_siblings_named("li") + 1;
                Some(format!("{index}. {text}"))
            } else {
                Some(format!("• {text}"))
            }
        }
        "pre" => Some(format!("\n```\n{text}\n```\n")),
        "code" => {
            // A code element inside pre is already covered by the fence.
            if inside_pre(block) {
                None
            } else {
                Some(format!("\n```\n{text}\n```\n"))
            }
        }
        "table" => {
            let rendered = format_table(block);
            if rendered.is_empty() { None } else { Some(rendered) }
        }
        "figure" => {
            let caption = block.select_first("figcaption").ok()??;
            let caption_text = caption.text_stripped();
            if caption_text.is_empty() {
                None
            } else {
                Some(format!("[figure: {caption_text}]"))
            }
        }
        "div" => {
            if text.chars().count() > MIN_DIV_TEXT_CHARS
                && block
                    .select(DIV_DISQUALIFYING_SELECTOR)
                    .map(|m| m.is_empty())
                    .unwrap_or(false)
            {
                Some(text.to_string())
            } else {
                None
            }
        }
        _ => None,
    }
}

fn inside_pre(block: &Element<'_>) -> bool {
    let mut current = block.parent();
    while let Some(el) = current {
        if el.tag_name() == "pre" {
            return true;
        }
        current = el.parent();
    }
    false
}

fn pad_cell(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    let mut out = String::from(cell);
    if len < width {
        out.push_str(&" ".repeat(width - len));
    }
    out
}

/// Renders a table element as a fixed-width pipe table.
///
/// Column widths are the longest cell per column across all rows plus two;
/// cells are left-justified. Rows consisting only of header cells are
/// rendered once, as the header.
pub fn format_table(table: &Element<'_>) -> String {
    let headers: Vec<String> = table
        .select("th")
        .unwrap_or_default()
        .iter()
        .map(|th| th.text_stripped())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    if !headers.is_empty() {
        rows.push(headers.clone());
    }

    for tr in table.select("tr").unwrap_or_default() {
        let mut row: Vec<String> = Vec::new();
        let mut all_header_cells = true;
        for cell in tr.select("td, th").unwrap_or_default() {
            if cell.tag_name() != "th" {
                all_header_cells = false;
            }
            row.push(cell.text_stripped());
        }
        if row.is_empty() || row.iter().all(|c| c.is_empty()) {
            continue;
        }
        // The header <tr> is already emitted via the th pass.
        if !headers.is_empty() && all_header_cells {
            continue;
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return String::new();
    }

    let columns = rows[0].len();
    let mut col_widths = Vec::with_capacity(columns);
    for i in 0..columns {
        let width = rows
            .iter()
            .map(|row| row.get(i).map(|c| c.chars().count()).unwrap_or(0))
            .max()
            .unwrap_or(0)
            + 2;
        col_widths.push(width);
    }

    let render_row = |row: &[String]| -> String {
        let cells: Vec<String> = row
            .iter()
            .zip(&col_widths)
            .map(|(cell, width)| pad_cell(cell, width - 2))
            .collect();
        format!("| {} |", cells.join(" | "))
    };

    let mut lines: Vec<String> = Vec::new();
    if headers.is_empty() {
        for row in &rows {
            lines.push(render_row(row));
        }
    } else {
        lines.push(render_row(&rows[0]));
        let separator: Vec<String> =
            col_widths.iter().map(|width| "-".repeat(width - 2)).collect();
        lines.push(format!("| {} |", separator.join(" | ")));
        for row in &rows[1..] {
            lines.push(render_row(row));
        }
    }

    lines.join("\n")
}

/// Renders the whole page when no main-content subtree was located.
///
/// Emits headings (sorted by level, shortest-level first) followed by every
/// paragraph long enough to plausibly be content.
pub fn format_full_page(doc: &Document) -> String {
    let mut headings: Vec<(usize, String)> = Vec::new();
    if let Ok(elements) = doc.select("h1, h2, h3, h4, h5, h6") {
        for h in elements {
            let text = h.text_stripped();
            if text.chars().count() > MIN_FULL_PAGE_HEADING_CHARS
                && let Ok(level) = h.tag_name()[1..].parse::<usize>()
            {
                headings.push((level, text));
            }
        }
    }
    headings.sort_by_key(|(level, _)| *level);

    let mut result: Vec<String> = Vec::new();
    for (level, text) in headings {
        result.push(format!("\n{} {}\n", "#".repeat(level), text));
    }

    if let Ok(paragraphs) = doc.select("p") {
        for p in paragraphs {
            let text = p.text_stripped();
            if text.chars().count() > MIN_FULL_PAGE_PARAGRAPH_CHARS {
                result.push(text);
            }
        }
    }

    result.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_and_paragraphs() {
        let html = "<article><h1>Title</h1><p>First paragraph.</p><h2>Section</h2><p>Second.</p></article>";
        let text = format_subtree(html);

        assert!(text.contains("\n# Title\n"));
        assert!(text.contains("\n## Section\n"));
        assert!(text.contains("First paragraph."));
        assert!(text.contains("Second."));
    }

    #[test]
    fn test_blockquote_prefixing() {
        let html = "<article><blockquote>quoted words</blockquote></article>";
        let text = format_subtree(html);
        assert!(text.contains("> quoted words"));
    }

    #[test]
    fn test_list_items() {
        let html = "<article>\
            <ul><li>alpha</li><li>beta</li></ul>\
            <ol><li>one</li><li>two</li><li>three</li></ol>\
            </article>";
        let text = format_subtree(html);

        assert!(text.contains("• alpha"));
        assert!(text.contains("• beta"));
        assert!(text.contains("1. one"));
        assert!(text.contains("2. two"));
        assert!(text.contains("3. three"));
    }

    #[test]
    fn test_code_inside_pre_fenced_once() {
        let html = "<article><pre><code>let x = 1;</code></pre></article>";
        let text = format_subtree(html);
        assert_eq!(text.matches("```").count(), 2);
        assert!(text.contains("let x = 1;"));
    }

    #[test]
    fn test_figure_caption() {
        let html = "<article><figure><img src=\"x.png\"><figcaption>A chart</figcaption></figure></article>";
        let text = format_subtree(html);
        assert!(text.contains("[figure: A chart]"));
    }

    #[test]
    fn test_figure_without_caption_skipped() {
        let html = "<article><figure><img src=\"x.png\"></figure><p>Body</p></article>";
        let text = format_subtree(html);
        assert!(!text.contains("[figure"));
        assert!(text.contains("Body"));
    }

    #[test]
    fn test_duplicate_id_guard() {
        let html = "<article><p id=\"p1\">once</p><p id=\"p1\">twice</p></article>";
        let text = format_subtree(html);
        assert_eq!(text.matches("once").count(), 1);
        assert!(!text.contains("twice"));
    }

    #[test]
    fn test_table_widths_and_separator() {
        let html = "<article><table>\
            <tr><th>Name</th><th>Qty</th></tr>\
            <tr><td>apple</td><td>3</td></tr>\
            <tr><td>fig</td><td>12</td></tr>\
            </table></article>";
        let text = format_subtree(html);

        // Widest cells: "apple" (5) and "Name"/"Qty" columns pad to the max.
        assert!(text.contains("| Name  | Qty |"));
        assert!(text.contains("| ----- | --- |"));
        assert!(text.contains("| apple | 3   |"));
        assert!(text.contains("| fig   | 12  |"));
    }

    #[test]
    fn test_empty_subtree() {
        assert_eq!(format_subtree(""), "");
        assert_eq!(format_subtree("<article></article>"), "");
    }

    #[test]
    fn test_fallback_to_flat_text() {
        let html = "<section><span>just inline text</span></section>";
        let text = format_subtree(html);
        assert_eq!(text, "just inline text");
    }

    #[test]
    fn test_full_page_rendering() {
        let html = "<html><body>\
            <h2>Second heading</h2>\
            <h1>Primary heading</h1>\
            <p>short</p>\
            <p>This paragraph is long enough to be kept in the output.</p>\
            </body></html>";
        let doc = Document::parse(html);
        let text = format_full_page(&doc);

        let h1_pos = text.find("# Primary heading").unwrap();
        let h2_pos = text.find("## Second heading").unwrap();
        assert!(h1_pos < h2_pos);
        assert!(!text.contains("\nshort"));
        assert!(text.contains("long enough"));
    }
}
