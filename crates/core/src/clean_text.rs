//! Post-formatting text cleaning.
//!
//! Applies the option-gated boilerplate removal passes, then whitespace
//! normalization, then Markdown-style wrapping of bare URLs. Removal runs
//! before whitespace collapsing so the gaps left by removed text are
//! closed.

use regex::Regex;
use std::sync::LazyLock;

use crate::options::ExtractOptions;
use crate::rules::{
    AD_PATTERNS, BOILERPLATE_PATTERNS, FOOTER_PATTERNS, NAVIGATION_PATTERNS, RELATED_PATTERNS,
};

static EXCESS_NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static EXCESS_SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());
static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://(?:[-\w.]|%[\da-fA-F]{2})+").unwrap());

fn apply_patterns(text: String, patterns: &[Regex]) -> String {
    let mut text = text;
    for pattern in patterns {
        text = pattern.replace_all(&text, "").into_owned();
    }
    text
}

/// Wraps every bare URL as a Markdown link `[url](url)`.
///
/// Occurrences already preceded by `[` or `(` are left alone, which makes
/// the wrapping (and the whole cleaning pass) idempotent.
fn wrap_bare_urls(text: &str) -> String {
    BARE_URL_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let m = caps.get(0).unwrap();
            let preceding = text[..m.start()].chars().next_back();
            if matches!(preceding, Some('[') | Some('(')) {
                m.as_str().to_string()
            } else {
                format!("[{0}]({0})", m.as_str())
            }
        })
        .into_owned()
}

/// Cleans formatted text according to the enabled options.
pub fn clean(text: &str, options: &ExtractOptions) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut text = text.to_string();

    if options.remove_ads {
        text = apply_patterns(text, &AD_PATTERNS);
    }
    if options.remove_navigation {
        text = apply_patterns(text, &NAVIGATION_PATTERNS);
    }
    if options.remove_footer {
        text = apply_patterns(text, &FOOTER_PATTERNS);
    }
    if options.remove_related {
        text = apply_patterns(text, &RELATED_PATTERNS);
    }

    text = apply_patterns(text, &BOILERPLATE_PATTERNS);

    text = EXCESS_NEWLINES_RE.replace_all(&text, "\n\n").into_owned();

    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    text = lines.join("\n");

    if options.normalize_spaces {
        text = EXCESS_SPACES_RE.replace_all(&text, " ").into_owned();
    }

    if options.remove_empty_lines {
        text = EXCESS_NEWLINES_RE.replace_all(&text, "\n\n").into_owned();
    }

    text = text.trim().to_string();

    wrap_bare_urls(&text)
}
