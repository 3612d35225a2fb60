//! PDF text extraction seam.
//!
//! PDF parsing itself is an external capability: callers wire in a
//! [`PdfTextExtractor`] implementation, and the pipeline converts its page
//! text into HTML-equivalent input for the normal extraction path. The
//! default [`NoPdfSupport`] implementation fails every request, which the
//! pipeline reports as unsupported content.

use crate::{ExcerpoError, Result};

/// Minimum non-whitespace characters a PDF must yield to count as having a
/// text layer. Below this the document is treated as scanned.
pub const MIN_PDF_TEXT_CHARS: usize = 100;

/// Per-page text extraction from PDF bytes.
pub trait PdfTextExtractor: Send + Sync {
    /// Extracts the text of each page, in order.
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>>;

    /// Whether this backend can extract at all. The pipeline checks this
    /// before downloading a PDF.
    fn is_available(&self) -> bool {
        true
    }
}

/// Placeholder extractor used when no PDF backend is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPdfSupport;

impl PdfTextExtractor for NoPdfSupport {
    fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<String>> {
        Err(ExcerpoError::PdfError("no PDF extractor configured".to_string()))
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Joins page texts with a blank line, skipping empty pages.
pub fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Runs an extractor over PDF bytes and enforces the text-layer threshold.
pub fn extract_text(extractor: &dyn PdfTextExtractor, bytes: &[u8]) -> Result<String> {
    let pages = extractor.extract_pages(bytes)?;
    let text = join_pages(&pages);

    let visible = text.chars().filter(|c| !c.is_whitespace()).count();
    if visible < MIN_PDF_TEXT_CHARS {
        return Err(ExcerpoError::PdfError(format!(
            "only {visible} characters recovered; document appears to have no text layer"
        )));
    }

    Ok(text)
}

/// Wraps extracted PDF text as a minimal HTML document so it can flow
/// through the normal content-location and formatting path.
pub fn to_html(text: &str) -> String {
    let mut body = String::new();
    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        body.push_str("<p>");
        body.push_str(&escape(paragraph));
        body.push_str("</p>");
    }
    format!("<html><body><article>{body}</article></body></html>")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPages(Vec<String>);

    impl PdfTextExtractor for FixedPages {
        fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_join_pages_skips_empty() {
        let pages = vec!["page one".to_string(), "  ".to_string(), "page two".to_string()];
        assert_eq!(join_pages(&pages), "page one\n\npage two");
    }

    #[test]
    fn test_extract_text_enforces_threshold() {
        let short = FixedPages(vec!["tiny".to_string()]);
        assert!(matches!(
            extract_text(&short, b""),
            Err(ExcerpoError::PdfError(_))
        ));

        let long = FixedPages(vec!["x".repeat(150)]);
        assert_eq!(extract_text(&long, b"").unwrap(), "x".repeat(150));
    }

    #[test]
    fn test_no_pdf_support_always_fails() {
        assert!(extract_text(&NoPdfSupport, b"%PDF-1.4").is_err());
    }

    #[test]
    fn test_to_html_escapes_and_paragraphs() {
        let html = to_html("1 < 2 & 3 > 2\n\nsecond page");
        assert!(html.contains("<p>1 &lt; 2 &amp; 3 &gt; 2</p>"));
        assert!(html.contains("<p>second page</p>"));
        assert!(html.starts_with("<html>"));
    }
}
