//! Per-URL result records and batch category statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::FailureKind;
use crate::meta::{ImageInfo, LinkInfo, PageMetadata};
use crate::urlnorm::UrlCategory;

/// The extracted content of one successfully processed page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Cleaned body text.
    pub content: String,
    /// Title, description, and body joined for direct display.
    pub formatted_text: String,
    pub metadata: Option<PageMetadata>,
    pub images: Option<Vec<ImageInfo>>,
    pub links: Option<Vec<LinkInfo>>,
}

impl ContentRecord {
    /// Builds the display text from title, description, and body.
    pub fn build_formatted_text(
        title: Option<&str>,
        description: Option<&str>,
        content: &str,
    ) -> String {
        let mut formatted = String::new();
        if let Some(title) = title {
            formatted.push_str(title);
            formatted.push_str("\n\n");
        }
        if let Some(description) = description {
            formatted.push_str(description);
            formatted.push_str("\n\n");
        }
        formatted.push_str(content);
        formatted
    }
}

/// Details of a failed extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureInfo {
    pub kind: FailureKind,
    pub message: String,
}

/// The outcome of processing one URL. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// The normalized URL where normalization succeeded, else the raw input.
    pub url: String,
    pub success: bool,
    pub category: UrlCategory,
    pub timestamp: DateTime<Utc>,
    pub record: Option<ContentRecord>,
    pub failure: Option<FailureInfo>,
}

impl ExtractionResult {
    /// Creates a successful result.
    pub fn success(url: impl Into<String>, category: UrlCategory, record: ContentRecord) -> Self {
        Self {
            url: url.into(),
            success: true,
            category,
            timestamp: Utc::now(),
            record: Some(record),
            failure: None,
        }
    }

    /// Creates a failed result.
    pub fn failure(
        url: impl Into<String>,
        category: UrlCategory,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            success: false,
            category,
            timestamp: Utc::now(),
            record: None,
            failure: Some(FailureInfo { kind, message: message.into() }),
        }
    }
}

/// Category membership accumulated across a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryStats {
    categories: HashMap<UrlCategory, HashSet<String>>,
}

impl CategoryStats {
    /// Records a URL under a category. Re-recording the same pair is a no-op.
    pub fn record(&mut self, category: UrlCategory, url: &str) {
        self.categories.entry(category).or_default().insert(url.to_string());
    }

    /// Number of distinct URLs recorded under a category.
    pub fn count(&self, category: UrlCategory) -> usize {
        self.categories.get(&category).map(HashSet::len).unwrap_or(0)
    }

    /// The URLs recorded under a category.
    pub fn urls(&self, category: UrlCategory) -> impl Iterator<Item = &str> {
        self.categories.get(&category).into_iter().flatten().map(String::as_str)
    }

    /// All categories with at least one URL.
    pub fn categories(&self) -> impl Iterator<Item = UrlCategory> + '_ {
        self.categories
            .iter()
            .filter(|(_, urls)| !urls.is_empty())
            .map(|(category, _)| *category)
    }
}
