//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! HTML and walking the DOM tree with CSS selectors. They wrap `scraper`
//! and add the pieces content location needs: stripped text, element depth,
//! parent access, and stable node identity.
//!
//! # Example
//!
//! ```rust
//! use excerpo_core::parse::Document;
//!
//! let html = r#"<html><body><p class="content">Hello</p></body></html>"#;
//! let doc = Document::parse(html);
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs[0].text_stripped(), "Hello");
//! ```

use scraper::{Html, Selector};

use crate::{ExcerpoError, Result};

/// A parsed HTML document.
///
/// Wraps an HTML page and provides CSS-selector queries over it. The
/// document is immutable; structural cleaning happens on the HTML string
/// before parsing.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// `scraper` recovers from malformed markup the way browsers do, so
    /// this never fails; selector errors surface at query time instead.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Gets the raw HTML representation.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Gets the entire document serialized back to HTML.
    pub fn as_string(&self) -> String {
        self.html.html()
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`ExcerpoError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first element matching a CSS selector.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Gets the content of the `<title>` element, if present.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html.select(&selector).next().map(|el| el.text().collect::<String>())
    }

    /// Gets all text content of the document, each text node stripped.
    pub fn text_stripped(&self) -> String {
        self.html
            .root_element()
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ExcerpoError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// A single element in the parsed document tree.
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Wraps a raw `scraper` element reference.
    pub fn from_ref(element: scraper::ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Gets the HTML content inside this element, excluding its own tags.
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    /// Gets the HTML content including this element's own tags.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the text content with every text node whitespace-stripped.
    ///
    /// Length thresholds throughout extraction are defined over this form,
    /// counted in characters rather than bytes so Japanese text is not
    /// penalized.
    pub fn text_stripped(&self) -> String {
        self.element.text().map(str::trim).filter(|t| !t.is_empty()).collect()
    }

    /// Gets the value of an attribute, or `None` if absent.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Gets the class attribute split into individual class names.
    pub fn classes(&self) -> Vec<&str> {
        self.attr("class").map(|c| c.split_whitespace().collect()).unwrap_or_default()
    }

    /// Selects descendant elements using a CSS selector, in document order.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first descendant matching a CSS selector.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Gets the parent element, if this element has one.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element
            .parent()
            .and_then(scraper::ElementRef::wrap)
            .map(|element| Element { element })
    }

    /// Counts element ancestors up to (excluding) the `<html>` root,
    /// including this element itself.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = Some(self.element);
        while let Some(el) = current {
            if el.value().name().eq_ignore_ascii_case("html") {
                break;
            }
            depth += 1;
            current = el.parent().and_then(scraper::ElementRef::wrap);
        }
        depth
    }

    /// Stable identity of the underlying tree node.
    ///
    /// Two `Element`s from the same `Document` refer to the same node iff
    /// their ids are equal.
    pub fn node_id(&self) -> ego_tree::NodeId {
        self.element.id()
    }

    /// Counts preceding sibling elements with the given tag name.
    pub fn preceding_siblings_named(&self, tag: &str) -> usize {
        self.element
            .prev_siblings()
            .filter_map(scraper::ElementRef::wrap)
            .filter(|el| el.value().name().eq_ignore_ascii_case(tag))
            .count()
    }
}
