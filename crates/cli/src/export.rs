//! Combined report rendering for batch results.
//!
//! All results of one run are written into a single file in one of four
//! formats. Text, Markdown, and HTML reports group results by category in a
//! fixed display order; JSON is the raw result list.

use std::fmt::Write;

use excerpo_core::{ExtractionResult, UrlCategory};

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Markdown,
    Html,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {s}. Valid options: text, markdown, html, json")),
        }
    }
}

/// Report rendering switches.
#[derive(Debug, Clone, Copy)]
pub struct ExportConfig {
    pub format: ExportFormat,
    /// Prefix each result with its URL, title, and timestamp.
    pub include_headers: bool,
    /// Keep failed results in the report.
    pub include_errors: bool,
    /// Group results into per-category sections.
    pub separate_sections: bool,
}

/// Categories in report display order: real content first, then the
/// skipped and failed buckets.
const CATEGORY_ORDER: &[UrlCategory] = &[
    UrlCategory::Html,
    UrlCategory::Document,
    UrlCategory::Pdf,
    UrlCategory::Image,
    UrlCategory::Video,
    UrlCategory::Audio,
    UrlCategory::Archive,
    UrlCategory::Ecommerce,
    UrlCategory::Adult,
    UrlCategory::Duplicate,
    UrlCategory::Invalid,
];

fn category_label(category: UrlCategory) -> String {
    let name = category.to_string();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => name,
    }
}

/// Renders all results into one report string.
pub fn build_report(results: &[ExtractionResult], config: &ExportConfig) -> serde_json::Result<String> {
    if config.format == ExportFormat::Json {
        let kept: Vec<&ExtractionResult> =
            results.iter().filter(|r| r.success || config.include_errors).collect();
        return serde_json::to_string_pretty(&kept);
    }

    let mut out = String::new();
    let timestamp = chrono_now();

    match config.format {
        ExportFormat::Html => {
            let _ = write!(
                out,
                "<!DOCTYPE html>\n<html>\n<head>\n<title>Extraction report</title>\n\
                 <meta charset=\"utf-8\">\n</head>\n<body>\n<h1>Extraction report</h1>\n\
                 <p>Generated: {timestamp}</p>\n<p>URLs: {}</p>\n",
                results.len()
            );
        }
        ExportFormat::Markdown => {
            let _ = write!(
                out,
                "# Extraction report\n\nGenerated: {timestamp}\n\nURLs: {}\n\n",
                results.len()
            );
        }
        _ => {
            let _ = write!(
                out,
                "=== Extraction report ===\n\nGenerated: {timestamp}\nURLs: {}\n\n{}\n\n",
                results.len(),
                "=".repeat(60)
            );
        }
    }

    let kept: Vec<&ExtractionResult> =
        results.iter().filter(|r| r.success || config.include_errors).collect();

    if config.separate_sections {
        for category in CATEGORY_ORDER {
            let section: Vec<&&ExtractionResult> =
                kept.iter().filter(|r| r.category == *category).collect();
            if section.is_empty() {
                continue;
            }

            let label = category_label(*category);
            match config.format {
                ExportFormat::Html => {
                    let _ = write!(
                        out,
                        "<section class=\"category\">\n<h2>{label} ({})</h2>\n",
                        section.len()
                    );
                }
                ExportFormat::Markdown => {
                    let _ = write!(out, "## {label} ({})\n\n", section.len());
                }
                _ => {
                    let _ = write!(out, "=== {label} ({}) ===\n\n", section.len());
                }
            }

            for result in &section {
                out.push_str(&format_single(result, config));
            }

            match config.format {
                ExportFormat::Html => out.push_str("</section>\n"),
                ExportFormat::Markdown => out.push_str("\n---\n\n"),
                _ => {
                    let _ = write!(out, "\n{}\n\n", "=".repeat(60));
                }
            }
        }
    } else {
        for result in &kept {
            out.push_str(&format_single(result, config));
            match config.format {
                ExportFormat::Html => out.push_str("<hr>\n"),
                ExportFormat::Markdown => out.push_str("\n---\n\n"),
                _ => {
                    let _ = write!(out, "\n{}\n\n", "=".repeat(60));
                }
            }
        }
    }

    if config.format == ExportFormat::Html {
        out.push_str("</body>\n</html>\n");
    }

    Ok(out)
}

fn chrono_now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn format_single(result: &ExtractionResult, config: &ExportConfig) -> String {
    let mut out = String::new();
    let url = &result.url;
    let timestamp = result.timestamp.format("%Y-%m-%d %H:%M:%S");

    if result.success {
        let record = result.record.as_ref();
        let content = record.map(|r| r.content.as_str()).unwrap_or("");
        let title = record.and_then(|r| r.title.as_deref()).unwrap_or("");

        if config.include_headers {
            match config.format {
                ExportFormat::Html => {
                    let _ = write!(
                        out,
                        "<div class=\"result\">\n<h2><a href=\"{url}\">{url}</a></h2>\n"
                    );
                    if !title.is_empty() {
                        let _ = write!(out, "<h3>{title}</h3>\n");
                    }
                    let _ = write!(
                        out,
                        "<p class=\"timestamp\">Extracted: {timestamp}</p>\n\
                         <div class=\"content\">\n<pre>{content}</pre>\n</div>\n</div>\n"
                    );
                }
                ExportFormat::Markdown => {
                    let _ = write!(out, "### [{url}]({url})\n\n");
                    if !title.is_empty() {
                        let _ = write!(out, "#### {title}\n\n");
                    }
                    let _ = write!(out, "Extracted: {timestamp}\n\n{content}\n\n");
                }
                _ => {
                    let _ = write!(out, "URL: {url}\n");
                    if !title.is_empty() {
                        let _ = write!(out, "Title: {title}\n");
                    }
                    let _ = write!(out, "Extracted: {timestamp}\n\n{content}\n\n");
                }
            }
        } else {
            match config.format {
                ExportFormat::Html => {
                    let _ = write!(out, "<div class=\"content\">\n<pre>{content}</pre>\n</div>\n");
                }
                _ => {
                    let _ = write!(out, "{content}\n\n");
                }
            }
        }
    } else {
        let message = result
            .failure
            .as_ref()
            .map(|f| format!("{}: {}", f.kind, f.message))
            .unwrap_or_else(|| "unknown error".to_string());

        match config.format {
            ExportFormat::Html => {
                let _ = write!(
                    out,
                    "<div class=\"result error\">\n<h2><a href=\"{url}\">{url}</a></h2>\n\
                     <p class=\"timestamp\">Extracted: {timestamp}</p>\n\
                     <p class=\"error-message\">Error: {message}</p>\n</div>\n"
                );
            }
            ExportFormat::Markdown => {
                let _ = write!(
                    out,
                    "### [{url}]({url})\n\nExtracted: {timestamp}\n\n**Error**: {message}\n\n"
                );
            }
            _ => {
                let _ = write!(out, "URL: {url}\nExtracted: {timestamp}\nError: {message}\n\n");
            }
        }
    }

    out
}
