//! Page metadata, image, and link extraction.
//!
//! Runs on the raw document before structural cleaning, since cleaning
//! drops `<meta>`, `<link>`, and `<script>` tags. Title and description
//! resolution follow fixed priority chains; everything else is collected
//! into [`PageMetadata`].

use serde::{Deserialize, Serialize};

use crate::parse::Document;
use crate::urlnorm;

/// Separators commonly used between article title and site name.
const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " :: ", " » ", " / ", " > "];

/// Title segments at or below this length are assumed to be too short to
/// be the article title, and separator stripping is skipped for them.
const MIN_TITLE_SEGMENT_CHARS: usize = 5;

/// Description fallback paragraphs must fall in this length band.
const DESCRIPTION_RANGE: std::ops::RangeInclusive<usize> = 50..=300;

/// Collected page-level metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub published_date: Option<String>,
    pub modified_date: Option<String>,
    pub keywords: Option<String>,
    /// The OpenGraph `og:type` value.
    pub page_type: Option<String>,
    pub language: Option<String>,
    /// The OpenGraph `og:image` URL.
    pub image: Option<String>,
    pub canonical_url: Option<String>,
    pub favicon: Option<String>,
    /// Parsed JSON-LD blocks, in document order.
    pub structured_data: Vec<serde_json::Value>,
}

/// An image found inside the located content subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    pub url: String,
    pub alt: String,
    pub title: String,
    pub width: Option<String>,
    pub height: Option<String>,
}

/// A link found inside the located content subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkInfo {
    pub url: String,
    pub text: String,
    pub title: String,
    pub target: Option<String>,
    pub rel: Option<String>,
}

fn meta_content(doc: &Document, selector: &str) -> Option<String> {
    let element = doc.select_first(selector).ok()??;
    let content = element.attr("content")?.trim();
    if content.is_empty() { None } else { Some(content.to_string()) }
}

fn first_meta_content(doc: &Document, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|sel| meta_content(doc, sel))
}

fn link_href(doc: &Document, selector: &str) -> Option<String> {
    let element = doc.select_first(selector).ok()??;
    let href = element.attr("href")?.trim();
    if href.is_empty() { None } else { Some(href.to_string()) }
}

/// Extracts the page title.
///
/// Priority: OpenGraph title, Twitter-card title, the first `h1`, then the
/// `<title>` element with separator-based site-name stripping.
pub fn extract_title(doc: &Document) -> Option<String> {
    if let Some(title) = meta_content(doc, r#"meta[property="og:title"]"#) {
        return Some(title);
    }
    if let Some(title) = meta_content(doc, r#"meta[name="twitter:title"]"#) {
        return Some(title);
    }

    if let Ok(Some(h1)) = doc.select_first("h1") {
        let text = h1.text_stripped();
        if !text.is_empty() {
            return Some(text);
        }
    }

    let title_text = doc.title()?.trim().to_string();
    if title_text.is_empty() {
        return None;
    }

    for separator in TITLE_SEPARATORS {
        if let Some((first, _)) = title_text.split_once(separator) {
            let first = first.trim();
            if first.chars().count() > MIN_TITLE_SEGMENT_CHARS {
                return Some(first.to_string());
            }
        }
    }

    Some(title_text)
}

/// Extracts the page description.
///
/// Priority: meta description, OpenGraph description, Twitter-card
/// description, then the first paragraph whose length looks like a teaser.
pub fn extract_description(doc: &Document) -> Option<String> {
    let from_meta = first_meta_content(
        doc,
        &[
            r#"meta[name="description"]"#,
            r#"meta[property="og:description"]"#,
            r#"meta[name="twitter:description"]"#,
        ],
    );
    if from_meta.is_some() {
        return from_meta;
    }

    let first_para = doc.select_first("p").ok()??;
    let text = first_para.text_stripped();
    if DESCRIPTION_RANGE.contains(&text.chars().count()) { Some(text) } else { None }
}

/// Extracts the full metadata map from the raw document.
pub fn extract_metadata(doc: &Document) -> PageMetadata {
    let mut metadata = PageMetadata {
        title: extract_title(doc),
        description: extract_description(doc),
        ..Default::default()
    };

    metadata.author = first_meta_content(
        doc,
        &[r#"meta[name="author"]"#, r#"meta[property="article:author"]"#],
    );
    metadata.published_date = first_meta_content(
        doc,
        &[
            r#"meta[property="article:published_time"]"#,
            r#"meta[name="pubdate"]"#,
            r#"meta[name="date"]"#,
        ],
    );
    metadata.modified_date = first_meta_content(
        doc,
        &[r#"meta[property="article:modified_time"]"#, r#"meta[name="lastmod"]"#],
    );
    metadata.keywords = meta_content(doc, r#"meta[name="keywords"]"#);
    metadata.page_type = meta_content(doc, r#"meta[property="og:type"]"#);
    metadata.image = meta_content(doc, r#"meta[property="og:image"]"#);

    if let Ok(Some(html_el)) = doc.select_first("html") {
        metadata.language = html_el
            .attr("lang")
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string);
    }

    metadata.canonical_url = link_href(doc, r#"link[rel="canonical"]"#);
    metadata.favicon = [
        r#"link[rel="icon"]"#,
        r#"link[rel="shortcut icon"]"#,
        r#"link[rel="apple-touch-icon"]"#,
    ]
    .iter()
    .find_map(|sel| link_href(doc, sel));

    if let Ok(scripts) = doc.select(r#"script[type="application/ld+json"]"#) {
        for script in scripts {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&script.text()) {
                metadata.structured_data.push(value);
            }
        }
    }

    metadata
}

/// Extracts image info from a located subtree, resolving relative URLs
/// against the page URL.
pub fn extract_images(subtree_html: &str, base_url: &str) -> Vec<ImageInfo> {
    let doc = Document::parse(subtree_html);
    let Ok(images) = doc.select("img") else {
        return Vec::new();
    };

    images
        .iter()
        .filter_map(|img| {
            let src = img.attr("src")?.trim();
            if src.is_empty() {
                return None;
            }
            let url = urlnorm::resolve_relative(base_url, src)?;
            Some(ImageInfo {
                url,
                alt: img.attr("alt").unwrap_or("").to_string(),
                title: img.attr("title").unwrap_or("").to_string(),
                width: img.attr("width").map(str::to_string),
                height: img.attr("height").map(str::to_string),
            })
        })
        .collect()
}

/// Extracts link info from a located subtree, resolving relative URLs
/// against the page URL.
pub fn extract_links(subtree_html: &str, base_url: &str) -> Vec<LinkInfo> {
    let doc = Document::parse(subtree_html);
    let Ok(links) = doc.select("a[href]") else {
        return Vec::new();
    };

    links
        .iter()
        .filter_map(|a| {
            let href = a.attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            let url = urlnorm::resolve_relative(base_url, href)?;
            Some(LinkInfo {
                url,
                text: a.text_stripped(),
                title: a.attr("title").unwrap_or("").to_string(),
                target: a.attr("target").map(str::to_string),
                rel: a.attr("rel").map(str::to_string),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_prefers_open_graph() {
        let html = r#"<html><head>
            <meta property="og:title" content="OG Title">
            <title>Tag Title</title>
            </head><body><h1>H1 Title</h1></body></html>"#;
        let doc = Document::parse(html);
        assert_eq!(extract_title(&doc), Some("OG Title".to_string()));
    }

    #[test]
    fn test_title_falls_back_to_h1_then_title_tag() {
        let html = "<html><head><title>Tag Title</title></head><body><h1>H1 Title</h1></body></html>";
        let doc = Document::parse(html);
        assert_eq!(extract_title(&doc), Some("H1 Title".to_string()));

        let html = "<html><head><title>Article Name | Site Name</title></head><body></body></html>";
        let doc = Document::parse(html);
        assert_eq!(extract_title(&doc), Some("Article Name".to_string()));
    }

    #[test]
    fn test_title_keeps_full_text_when_segment_too_short() {
        let html = "<html><head><title>News | The Example Times</title></head><body></body></html>";
        let doc = Document::parse(html);
        assert_eq!(extract_title(&doc), Some("News | The Example Times".to_string()));
    }

    #[test]
    fn test_description_priority_and_fallback() {
        let html = r#"<html><head>
            <meta name="description" content="Meta description">
            <meta property="og:description" content="OG description">
            </head><body></body></html>"#;
        let doc = Document::parse(html);
        assert_eq!(extract_description(&doc), Some("Meta description".to_string()));

        let para = "a".repeat(120);
        let html = format!("<html><body><p>{para}</p></body></html>");
        let doc = Document::parse(&html);
        assert_eq!(extract_description(&doc), Some(para));

        let html = "<html><body><p>too short</p></body></html>";
        let doc = Document::parse(html);
        assert_eq!(extract_description(&doc), None);
    }

    #[test]
    fn test_metadata_fields() {
        let html = r#"<html lang="ja"><head>
            <meta name="author" content="Writer">
            <meta property="article:published_time" content="2024-03-01T00:00:00Z">
            <meta name="keywords" content="a,b,c">
            <meta property="og:type" content="article">
            <meta property="og:image" content="https://example.com/hero.png">
            <link rel="canonical" href="https://example.com/post">
            <link rel="icon" href="/favicon.ico">
            <script type="application/ld+json">{"@type": "Article"}</script>
            </head><body></body></html>"#;
        let doc = Document::parse(html);
        let metadata = extract_metadata(&doc);

        assert_eq!(metadata.author.as_deref(), Some("Writer"));
        assert_eq!(metadata.published_date.as_deref(), Some("2024-03-01T00:00:00Z"));
        assert_eq!(metadata.keywords.as_deref(), Some("a,b,c"));
        assert_eq!(metadata.page_type.as_deref(), Some("article"));
        assert_eq!(metadata.language.as_deref(), Some("ja"));
        assert_eq!(metadata.image.as_deref(), Some("https://example.com/hero.png"));
        assert_eq!(metadata.canonical_url.as_deref(), Some("https://example.com/post"));
        assert_eq!(metadata.favicon.as_deref(), Some("/favicon.ico"));
        assert_eq!(metadata.structured_data.len(), 1);
        assert_eq!(metadata.structured_data[0]["@type"], "Article");
    }

    #[test]
    fn test_image_extraction_resolves_relative_urls() {
        let html = r#"<div><img src="pic.jpg" alt="A picture" width="640"><img></div>"#;
        let images = extract_images(html, "https://example.com/posts/1");

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url, "https://example.com/posts/pic.jpg");
        assert_eq!(images[0].alt, "A picture");
        assert_eq!(images[0].width.as_deref(), Some("640"));
        assert_eq!(images[0].height, None);
    }

    #[test]
    fn test_link_extraction() {
        let html = r#"<div><a href="/about" title="About us" rel="nofollow">About</a></div>"#;
        let links = extract_links(html, "https://example.com/posts/1");

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://example.com/about");
        assert_eq!(links[0].text, "About");
        assert_eq!(links[0].title, "About us");
        assert_eq!(links[0].rel.as_deref(), Some("nofollow"));
        assert_eq!(links[0].target, None);
    }
}
