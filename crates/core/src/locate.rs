//! Main-content location: site overrides, generic selectors, and the
//! scoring fallback.
//!
//! `locate` returns the serialized HTML of the chosen subtree, or `None`
//! when the page should be rendered via the full-page path instead. Input
//! is expected to be cleaned first (see [`crate::clean_dom`]).

use crate::options::ExtractionMode;
use crate::parse::{Document, Element};
use crate::rules::{
    self, BOILERPLATE_PATTERNS, CONTENT_SELECTORS, CONTENT_TERMS, MIN_SELECTOR_TEXT_CHARS,
    SiteRule,
};
use crate::urlnorm;

/// Paragraphs shorter than this do not nominate their parent as a candidate.
const MIN_PARAGRAPH_CHARS: usize = 100;

/// Text length a div must exceed to enter the fallback candidate pool.
const MIN_DIV_FALLBACK_CHARS: usize = 500;

/// Locates the main content subtree of a cleaned document.
///
/// Precedence under `Auto`/`Readability`: per-site rule, then the generic
/// selector list, then scoring. `Selectors` skips the site rule and
/// scoring; `FullPage` always declines so the caller renders the whole
/// page.
pub fn locate(doc: &Document, url: &str, mode: ExtractionMode) -> Option<String> {
    match mode {
        ExtractionMode::FullPage => None,
        ExtractionMode::Auto | ExtractionMode::Readability => {
            locate_by_site_rule(doc, url)
                .or_else(|| locate_by_selectors(doc))
                .or_else(|| locate_by_scoring(doc))
        }
        ExtractionMode::Selectors => locate_by_selectors(doc),
    }
}

/// Applies the per-site override for the URL's host, if one exists.
fn locate_by_site_rule(doc: &Document, url: &str) -> Option<String> {
    let host = urlnorm::host(url)?;
    let rule = rules::site_rule_for(&host)?;

    for selector in rule.content_selectors {
        if let Ok(Some(element)) = doc.select_first(selector) {
            tracing::debug!(host = %host, selector, "site rule matched");
            let stripped = apply_strip_selectors(&element.outer_html(), rule);
            return Some(apply_purge_texts(stripped, rule));
        }
    }
    None
}

/// Erases the rule's literal text snippets from a located subtree.
fn apply_purge_texts(html: String, rule: &SiteRule) -> String {
    let mut html = html;
    for text in rule.purge_texts {
        if html.contains(text) {
            html = html.replace(text, "");
        }
    }
    html
}

/// Removes the rule's strip-selector matches from a located subtree.
fn apply_strip_selectors(html: &str, rule: &SiteRule) -> String {
    let mut output = String::new();
    let handlers = rule
        .strip_selectors
        .iter()
        .map(|sel| {
            lol_html::element!(*sel, |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings { element_content_handlers: handlers, ..Default::default() },
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

/// Tries the generic selector list, returning the first match with enough
/// visible text.
fn locate_by_selectors(doc: &Document) -> Option<String> {
    for selector in CONTENT_SELECTORS {
        let Ok(elements) = doc.select(selector) else {
            continue;
        };
        for element in elements {
            if element.text_stripped().chars().count() > MIN_SELECTOR_TEXT_CHARS {
                return Some(element.outer_html());
            }
        }
    }
    None
}

struct Candidate<'a> {
    element: Element<'a>,
    paragraphs: usize,
    text_length: usize,
    depth: usize,
}

/// Scores paragraph ancestors and returns the best-scoring subtree.
///
/// Comparison is strict `>` against a floor of zero, so ties go to the
/// first candidate in document order and a pool of non-positive scores
/// locates nothing.
fn locate_by_scoring(doc: &Document) -> Option<String> {
    let mut candidates: Vec<Candidate<'_>> = Vec::new();

    for p in doc.select("p").ok()? {
        let text_length = p.text_stripped().chars().count();
        if text_length <= MIN_PARAGRAPH_CHARS {
            continue;
        }
        let Some(parent) = p.parent() else {
            continue;
        };

        if let Some(existing) =
            candidates.iter_mut().find(|c| c.element.node_id() == parent.node_id())
        {
            existing.paragraphs += 1;
            existing.text_length += text_length;
        } else {
            let depth = parent.depth();
            candidates.push(Candidate { element: parent, paragraphs: 1, text_length, depth });
        }
    }

    if candidates.is_empty() {
        for div in doc.select("div").ok()? {
            let text_length = div.text_stripped().chars().count();
            if text_length > MIN_DIV_FALLBACK_CHARS {
                let depth = div.depth();
                candidates.push(Candidate { element: div, paragraphs: 1, text_length, depth });
            }
        }
    }

    let mut best: Option<&Candidate<'_>> = None;
    let mut best_score = 0.0_f64;

    for candidate in &candidates {
        let score = score_candidate(candidate);
        if score > best_score {
            best_score = score;
            best = Some(candidate);
        }
    }

    best.map(|c| {
        tracing::debug!(score = best_score, "scoring fallback selected candidate");
        c.element.outer_html()
    })
}

fn count_matches(element: &Element<'_>, selector: &str) -> usize {
    element.select(selector).map(|v| v.len()).unwrap_or(0)
}

fn score_candidate(candidate: &Candidate<'_>) -> f64 {
    let mut score =
        candidate.text_length as f64 * 0.5 + candidate.paragraphs as f64 * 100.0;

    if candidate.depth < 3 {
        score *= 0.5;
    } else if candidate.depth > 10 {
        score *= 0.8;
    }

    let headings = count_matches(&candidate.element, "h1, h2, h3, h4, h5, h6");
    score += headings as f64 * 50.0;

    let images = count_matches(&candidate.element, "img");
    if (1..=3).contains(&images) {
        score += images as f64 * 30.0;
    } else if images > 5 {
        score -= (images - 5) as f64 * 20.0;
    }

    if count_matches(&candidate.element, "form") > 0 {
        score -= 300.0;
    }

    let links = count_matches(&candidate.element, "a");
    if links > 10 {
        score -= (links - 10) as f64 * 5.0;
    }

    if candidate.element.attr("style").is_some() {
        score -= 50.0;
    }

    let id = candidate.element.attr("id").unwrap_or("").to_lowercase();
    let classes: Vec<String> =
        candidate.element.classes().iter().map(|c| c.to_lowercase()).collect();
    for term in CONTENT_TERMS {
        if classes.iter().any(|c| c.contains(term)) || id.contains(term) {
            score += 100.0;
        }
    }

    let html = candidate.element.outer_html();
    for pattern in BOILERPLATE_PATTERNS.iter() {
        if pattern.is_match(&html) {
            score -= 100.0;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_text(n: usize) -> String {
        "長い本文のテキストです。".chars().cycle().take(n).collect()
    }

    #[test]
    fn test_site_rule_overrides_everything() {
        let html = format!(
            r#"<html><body>
                <div id="mw-content-text">
                    <p>{}</p>
                    <span class="mw-editsection">edit</span>
                </div>
                <article><p>{}</p></article>
            </body></html>"#,
            long_text(150),
            long_text(400),
        );
        let doc = Document::parse(&html);

        let located =
            locate(&doc, "https://en.wikipedia.org/wiki/Rust", ExtractionMode::Auto).unwrap();
        assert!(located.contains("mw-content-text"));
        assert!(!located.contains("edit"));
    }

    #[test]
    fn test_site_rule_purges_literal_snippets() {
        let html = format!(
            r#"<html><body>
                <div class="it-MdContent">
                    <p>{}</p>
                    <p>あとで読む</p>
                </div>
            </body></html>"#,
            long_text(300),
        );
        let doc = Document::parse(&html);

        let located =
            locate(&doc, "https://qiita.com/taro/items/abc123", ExtractionMode::Auto).unwrap();
        assert!(!located.contains("あとで読む"));
        assert!(located.contains("長い本文"));
    }

    #[test]
    fn test_every_site_rule_purge_text_is_erased() {
        for rule in rules::SITE_RULES {
            let selector = rule.content_selectors[0];
            let attr = match selector.strip_prefix('#') {
                Some(id) => format!(r#"id="{id}""#),
                None => format!(r#"class="{}""#, selector.trim_start_matches('.')),
            };
            let html = format!(
                "<html><body><div {attr}><p>{}</p><p>{}</p></div></body></html>",
                long_text(300),
                rule.purge_texts.join("</p><p>"),
            );
            let doc = Document::parse(&html);
            let url = format!("https://{}/page", rule.domain);

            let located = locate(&doc, &url, ExtractionMode::Auto).unwrap();
            for text in rule.purge_texts {
                assert!(!located.contains(text), "{} survived on {}", text, rule.domain);
            }
        }
    }

    #[test]
    fn test_generic_selector_needs_enough_text() {
        let short = format!("<html><body><article><p>{}</p></article></body></html>", long_text(50));
        let doc = Document::parse(&short);
        assert!(locate_by_selectors(&doc).is_none());

        let long = format!("<html><body><article><p>{}</p></article></body></html>", long_text(300));
        let doc = Document::parse(&long);
        assert!(locate_by_selectors(&doc).unwrap().contains("<article>"));
    }

    #[test]
    fn test_scoring_picks_denser_container() {
        let html = format!(
            r#"<html><body>
                <div class="a"><div><p>{}</p></div></div>
                <div class="b"><div><p>{p}</p><p>{p}</p><p>{p}</p></div></div>
            </body></html>"#,
            long_text(120),
            p = long_text(120),
        );
        let doc = Document::parse(&html);
        let located = locate_by_scoring(&doc).unwrap();
        assert_eq!(located.matches("<p>").count(), 3);
    }

    #[test]
    fn test_scoring_tie_goes_to_first_in_document_order() {
        let para = long_text(150);
        let html = format!(
            r#"<html><body>
                <div><div><p>first: {para}</p></div></div>
                <div><div><p>other: {para}</p></div></div>
            </body></html>"#
        );
        let doc = Document::parse(&html);
        let located = locate_by_scoring(&doc).unwrap();
        assert!(located.contains("first:"));
        assert!(!located.contains("other:"));
    }

    #[test]
    fn test_scoring_rejects_non_positive_scores() {
        // Depth penalty halves the base, then the form penalty sinks it.
        let html = format!(
            "<html><body><div><p>{}</p><form><input></form></div></body></html>",
            long_text(101)
        );
        let doc = Document::parse(&html);
        assert!(locate_by_scoring(&doc).is_none());
    }

    #[test]
    fn test_div_fallback_when_no_paragraphs() {
        let html = format!("<html><body><div>{}</div></body></html>", long_text(600));
        let doc = Document::parse(&html);
        let located = locate_by_scoring(&doc);
        assert!(located.is_some());
    }

    #[test]
    fn test_full_page_mode_declines() {
        let html = format!("<html><body><article><p>{}</p></article></body></html>", long_text(300));
        let doc = Document::parse(&html);
        assert!(locate(&doc, "https://example.com/a", ExtractionMode::FullPage).is_none());
    }
}
