pub mod cache;
pub mod clean_dom;
pub mod clean_text;
pub mod error;
pub mod fetch;
pub mod format;
pub mod locate;
pub mod meta;
pub mod options;
pub mod parse;
pub mod pdf;
pub mod pipeline;
pub mod result;
pub mod rules;
pub mod urlnorm;

pub use cache::ResponseCache;
pub use clean_dom::clean_html;
pub use error::{ExcerpoError, FailureKind, Result};
pub use fetch::DocumentFetcher;
pub use format::{format_full_page, format_subtree};
pub use locate::locate;
pub use meta::{ImageInfo, LinkInfo, PageMetadata};
pub use options::{ExtractOptions, ExtractOptionsBuilder, ExtractionMode};
pub use parse::{Document, Element};
pub use pdf::{NoPdfSupport, PdfTextExtractor};
pub use pipeline::{ExtractEvent, Extractor};
pub use result::{CategoryStats, ContentRecord, ExtractionResult, FailureInfo};
pub use rules::{SiteRule, site_rule_for};
pub use urlnorm::UrlCategory;
