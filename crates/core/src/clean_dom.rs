//! Structural cleaning of raw HTML before content location.
//!
//! Removes tags that never carry body text, elements whose class/id match
//! boilerplate keywords, HTML comments, inline style/onclick attributes,
//! and divs that contain no meaningful children. Operates on the HTML
//! string; the cleaned string is re-parsed downstream.
//!
//! Metadata extraction must run on the raw document before cleaning, since
//! cleaning drops `<meta>` and `<link>` tags.

use regex::Regex;
use std::sync::LazyLock;

use crate::parse::Document;
use crate::rules::{EXCLUDE_KEYWORDS, EXCLUDE_TAGS, SAFE_TAGS};

/// Divs with fewer stripped-text characters than this and no meaningful
/// child elements are dropped.
const MIN_DIV_TEXT_CHARS: usize = 50;

/// Child tags that make a div worth keeping regardless of text length.
const MEANINGFUL_CHILD_SELECTOR: &str =
    "p, h1, h2, h3, h4, h5, h6, ul, ol, table, blockquote, pre, img";

/// Upper bound on hollow-div removal passes; nesting deeper than this is
/// left in place.
const MAX_HOLLOW_PASSES: usize = 25;

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Cleans raw HTML for content location.
pub fn clean_html(html: &str) -> String {
    let cleaned = remove_excluded_elements(html);
    let cleaned = COMMENT_RE.replace_all(&cleaned, "").to_string();
    remove_hollow_divs(&cleaned)
}

fn keyword_matches(value: &str) -> bool {
    let value = value.to_lowercase();
    EXCLUDE_KEYWORDS.iter().any(|kw| value.contains(&kw.to_lowercase()))
}

/// Drops excluded tags, keyword-matched class/id elements, and inline
/// style/onclick attributes in a single streaming rewrite.
fn remove_excluded_elements(html: &str) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("*", |el| {
                let tag = el.tag_name().to_ascii_lowercase();

                if EXCLUDE_TAGS.contains(&tag.as_str()) {
                    el.remove();
                    return Ok(());
                }

                if !SAFE_TAGS.contains(&tag.as_str()) {
                    if let Some(class) = el.get_attribute("class")
                        && keyword_matches(&class)
                    {
                        el.remove();
                        return Ok(());
                    }
                    if let Some(id) = el.get_attribute("id")
                        && keyword_matches(&id)
                    {
                        el.remove();
                        return Ok(());
                    }
                }

                el.remove_attribute("style");
                el.remove_attribute("onclick");
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    match rewriter.write(html.as_bytes()) {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match rewriter.end() {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    if output.is_empty() { html.to_string() } else { output }
}

/// Iteratively removes divs with no meaningful children and almost no text.
///
/// Each pass serializes through the parser so removal targets can be matched
/// as exact substrings; removing an inner div can hollow out its parent, so
/// passes repeat until a fixed point or [`MAX_HOLLOW_PASSES`].
fn remove_hollow_divs(html: &str) -> String {
    let mut current = Document::parse(html).as_string();

    for _ in 0..MAX_HOLLOW_PASSES {
        let targets: Vec<String> = {
            let doc = Document::parse(&current);
            let Ok(divs) = doc.select("div") else { break };
            divs.iter()
                .filter(|div| {
                    let meaningful = div
                        .select(MEANINGFUL_CHILD_SELECTOR)
                        .map(|m| !m.is_empty())
                        .unwrap_or(true);
                    !meaningful && div.text_stripped().chars().count() < MIN_DIV_TEXT_CHARS
                })
                .map(|div| div.outer_html())
                .collect()
        };

        if targets.is_empty() {
            break;
        }

        let mut next = current.clone();
        for target in &targets {
            next = next.replacen(target.as_str(), "", 1);
        }

        if next == current {
            break;
        }
        current = next;
    }

    current
}
