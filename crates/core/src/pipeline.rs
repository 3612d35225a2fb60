//! The extraction pipeline.
//!
//! [`Extractor`] ties the other modules together: it classifies each URL,
//! applies exclusion and duplicate filters, fetches through the cache, and
//! runs the HTML through cleaning, content location, formatting, and text
//! cleanup. [`Extractor::extract_batch`] runs many URLs concurrently and
//! reports progress over a channel.
//!
//! Per-URL failures are captured in the returned [`ExtractionResult`]
//! rather than bubbling out, so one bad URL never sinks a batch unless
//! `continue_on_error` is off.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;

use crate::cache::ResponseCache;
use crate::error::{ExcerpoError, FailureKind, Result};
use crate::fetch::DocumentFetcher;
use crate::options::ExtractOptions;
use crate::parse::Document;
use crate::pdf::{self, PdfTextExtractor};
use crate::result::{CategoryStats, ContentRecord, ExtractionResult};
use crate::urlnorm::{self, UrlCategory};
use crate::{clean_dom, clean_text, format, locate, meta};

/// Progress and outcome notifications emitted during a batch run.
#[derive(Debug, Clone)]
pub enum ExtractEvent {
    /// A URL finished successfully.
    Success(ExtractionResult),
    /// A URL finished with a failure result.
    Error(ExtractionResult),
    /// Counters for display. `stats` is populated on the final event only.
    Progress {
        url: Option<String>,
        completed: usize,
        total: usize,
        status: String,
        stats: Option<CategoryStats>,
    },
}

/// Batch content extractor.
///
/// One `Extractor` holds the options, HTTP clients, response cache, and
/// duplicate-tracking state for a run. Wrap it in an [`Arc`] to share it
/// with [`extract_batch`](Extractor::extract_batch).
pub struct Extractor {
    options: ExtractOptions,
    fetcher: DocumentFetcher,
    cache: Option<ResponseCache>,
    pdf: Arc<dyn PdfTextExtractor>,
    seen: Mutex<HashSet<String>>,
    stats: Mutex<CategoryStats>,
    cancelled: AtomicBool,
}

impl Extractor {
    /// Creates an extractor from validated options.
    ///
    /// The cache opens at its default platform location when enabled; no
    /// PDF backend is wired in by default.
    pub fn new(options: ExtractOptions) -> Result<Self> {
        options.validate()?;
        let cache = if options.cache_enabled {
            ResponseCache::default_path().map(ResponseCache::open)
        } else {
            None
        };
        let fetcher = DocumentFetcher::new(options.timeout, options.user_agent_rotation)?;

        Ok(Self {
            options,
            fetcher,
            cache,
            pdf: Arc::new(pdf::NoPdfSupport),
            seen: Mutex::new(HashSet::new()),
            stats: Mutex::new(CategoryStats::default()),
            cancelled: AtomicBool::new(false),
        })
    }

    /// Replaces the response cache. `None` disables caching for this run.
    pub fn with_cache(mut self, cache: Option<ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Wires in a PDF text-extraction backend.
    pub fn with_pdf_extractor(mut self, extractor: Arc<dyn PdfTextExtractor>) -> Self {
        self.pdf = extractor;
        self
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// A snapshot of the category statistics accumulated so far.
    pub fn stats(&self) -> CategoryStats {
        self.stats.lock().map(|stats| stats.clone()).unwrap_or_default()
    }

    /// Requests cancellation: queued batch URLs are skipped, in-flight
    /// fetches run to completion.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn record_category(&self, category: UrlCategory, url: &str) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.record(category, url);
        }
    }

    /// Marks a normalized URL as seen. Returns `false` if it was already
    /// recorded, atomically under one lock so concurrent submissions of
    /// the same URL yield exactly one non-duplicate.
    fn mark_seen(&self, normalized: &str) -> bool {
        self.seen
            .lock()
            .map(|mut seen| seen.insert(urlnorm::url_hash(normalized)))
            .unwrap_or(true)
    }

    /// Processes one URL end to end.
    ///
    /// All failures are folded into the result; this never returns `Err`.
    pub async fn extract(&self, raw_url: &str) -> ExtractionResult {
        let Some(url) = urlnorm::normalize(raw_url) else {
            self.record_category(UrlCategory::Invalid, raw_url);
            return ExtractionResult::failure(
                raw_url,
                UrlCategory::Invalid,
                FailureKind::InvalidUrl,
                format!("could not normalize {raw_url:?}"),
            );
        };

        if self.options.exclude_duplicates && !self.mark_seen(&url) {
            self.record_category(UrlCategory::Duplicate, &url);
            return ExtractionResult::failure(
                &url,
                UrlCategory::Duplicate,
                FailureKind::Duplicate,
                "URL already processed in this run",
            );
        }

        if self.options.exclude_ecommerce && urlnorm::is_ecommerce(&url) {
            self.record_category(UrlCategory::Ecommerce, &url);
            return ExtractionResult::failure(
                &url,
                UrlCategory::Ecommerce,
                FailureKind::Excluded,
                "e-commerce host excluded by options",
            );
        }
        if self.options.exclude_adult && urlnorm::is_adult(&url) {
            self.record_category(UrlCategory::Adult, &url);
            return ExtractionResult::failure(
                &url,
                UrlCategory::Adult,
                FailureKind::Excluded,
                "adult host excluded by options",
            );
        }

        // Extension wins over the network probe so media URLs are settled
        // without a request.
        let mut probed_type = None;
        let category = match urlnorm::categorize_by_extension(&url) {
            Some(category) => category,
            None => {
                probed_type = self.fetcher.probe_content_type(&url).await;
                probed_type
                    .as_deref()
                    .and_then(urlnorm::categorize_content_type)
                    .unwrap_or(UrlCategory::Html)
            }
        };
        self.record_category(category, &url);

        let is_pdf = urlnorm::is_pdf_extension(&url)
            || probed_type.as_deref().is_some_and(|ct| ct.contains("application/pdf"));

        let outcome = if category == UrlCategory::Document && is_pdf {
            self.record_category(UrlCategory::Pdf, &url);
            self.extract_pdf_url(&url).await
        } else if matches!(category, UrlCategory::Html | UrlCategory::Document) {
            self.extract_html_url(&url).await
        } else {
            Err(ExcerpoError::UnsupportedContent(format!("{category} content has no text body")))
        };

        match outcome {
            Ok(record) => ExtractionResult::success(&url, category, record),
            Err(err) => {
                ExtractionResult::failure(&url, category, err.failure_kind(), err.to_string())
            }
        }
    }

    async fn extract_pdf_url(&self, url: &str) -> Result<ContentRecord> {
        if !self.options.extract_pdf_text || !self.pdf.is_available() {
            return Err(ExcerpoError::UnsupportedContent(
                "PDF text extraction is disabled".to_string(),
            ));
        }

        let hash = urlnorm::url_hash(url);
        let text = match self.cache.as_ref().and_then(|cache| cache.get(&hash)) {
            Some(cached) => cached,
            None => {
                let bytes = self.fetcher.fetch_bytes(url).await?;
                let text = pdf::extract_text(self.pdf.as_ref(), &bytes)?;
                if let Some(cache) = &self.cache {
                    cache.put(&hash, &text, Utc::now());
                }
                text
            }
        };

        self.extract_html(&pdf::to_html(&text), url)
    }

    async fn extract_html_url(&self, url: &str) -> Result<ContentRecord> {
        let hash = urlnorm::url_hash(url);
        let html = match self.cache.as_ref().and_then(|cache| cache.get(&hash)) {
            Some(cached) => {
                tracing::debug!(url, "serving from cache");
                cached
            }
            None => {
                let html = self.fetcher.fetch_html(url).await?;
                if html.trim().is_empty() {
                    return Err(ExcerpoError::EmptyBody(url.to_string()));
                }
                if let Some(cache) = &self.cache {
                    cache.put(&hash, &html, Utc::now());
                }
                html
            }
        };

        self.extract_html(&html, url)
    }

    /// Extracts a content record from already-fetched HTML.
    ///
    /// Metadata comes off the raw document; the cleaning pass strips the
    /// `head` elements it reads.
    pub fn extract_html(&self, html: &str, url: &str) -> Result<ContentRecord> {
        let raw_doc = Document::parse(html);
        let title = meta::extract_title(&raw_doc);
        let metadata = self.options.extract_metadata.then(|| meta::extract_metadata(&raw_doc));
        let description = metadata
            .as_ref()
            .and_then(|m| m.description.clone())
            .or_else(|| meta::extract_description(&raw_doc));

        let cleaned = clean_dom::clean_html(html);
        let cleaned_doc = Document::parse(&cleaned);
        let located = locate::locate(&cleaned_doc, url, self.options.extraction_mode);

        let text = match &located {
            Some(subtree) => format::format_subtree(subtree),
            None => format::format_full_page(&cleaned_doc),
        };
        let content = clean_text::clean(&text, &self.options);
        if content.is_empty() {
            return Err(ExcerpoError::NoContent);
        }

        let images = match (&located, self.options.extract_images) {
            (Some(subtree), true) => Some(meta::extract_images(subtree, url)),
            _ => None,
        };
        let links = match (&located, self.options.extract_links) {
            (Some(subtree), true) => Some(meta::extract_links(subtree, url)),
            _ => None,
        };

        let formatted_text =
            ContentRecord::build_formatted_text(title.as_deref(), description.as_deref(), &content);

        Ok(ContentRecord { title, description, content, formatted_text, metadata, images, links })
    }

    /// Processes a batch of URLs concurrently.
    ///
    /// At most `max_connections` URLs are in flight at once. Outcomes and
    /// progress counts are sent over `events`; a dropped receiver is
    /// ignored. Results come back in completion order.
    ///
    /// With `continue_on_error` off, the first failed result cancels the
    /// remaining URLs and the batch returns `Err`.
    pub async fn extract_batch(
        self: &Arc<Self>,
        urls: &[String],
        events: mpsc::Sender<ExtractEvent>,
    ) -> Result<Vec<ExtractionResult>> {
        let total = urls.len();
        let _ = events
            .send(ExtractEvent::Progress {
                url: None,
                completed: 0,
                total,
                status: "starting".to_string(),
                stats: None,
            })
            .await;

        let semaphore = Arc::new(Semaphore::new(self.options.max_connections));
        let mut tasks = JoinSet::new();
        for url in urls {
            let extractor = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            let url = url.clone();
            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return (url, None);
                };
                if extractor.is_cancelled() {
                    return (url, None);
                }
                let result = extractor.extract(&url).await;
                (url, Some(result))
            });
        }

        let mut results = Vec::with_capacity(total);
        let mut completed = 0;
        let mut abort: Option<ExcerpoError> = None;
        while let Some(joined) = tasks.join_next().await {
            let Ok((url, outcome)) = joined else {
                continue;
            };
            completed += 1;

            let status = match &outcome {
                Some(result) if result.success => "ok".to_string(),
                Some(result) => result
                    .failure
                    .as_ref()
                    .map(|f| f.kind.to_string())
                    .unwrap_or_else(|| "failed".to_string()),
                None => "cancelled".to_string(),
            };

            if let Some(result) = outcome {
                let event = if result.success {
                    ExtractEvent::Success(result.clone())
                } else {
                    ExtractEvent::Error(result.clone())
                };
                let _ = events.send(event).await;

                if !result.success
                    && !self.options.continue_on_error
                    && abort.is_none()
                {
                    let message = result
                        .failure
                        .as_ref()
                        .map(|f| format!("{}: {}", result.url, f.message))
                        .unwrap_or_else(|| result.url.clone());
                    self.cancel();
                    abort = Some(ExcerpoError::BatchFailed(message));
                }
                results.push(result);
            }

            let _ = events
                .send(ExtractEvent::Progress {
                    url: Some(url),
                    completed,
                    total,
                    status,
                    stats: None,
                })
                .await;
        }

        let _ = events
            .send(ExtractEvent::Progress {
                url: None,
                completed: total,
                total,
                status: "done".to_string(),
                stats: Some(self.stats()),
            })
            .await;

        match abort {
            Some(err) => Err(err),
            None => Ok(results),
        }
    }
}
