//! URL normalization, validation, hashing, and content-category
//! classification.
//!
//! Normalization produces the canonical form used for deduplication: two
//! URLs are the same page iff their normalized strings are byte-identical.
//!
//! # Example
//!
//! ```rust
//! use excerpo_core::urlnorm;
//!
//! let url = urlnorm::normalize("WWW.Example.com/a//b/").unwrap();
//! assert_eq!(url, "https://example.com/a/b");
//! assert!(urlnorm::is_same_url("https://example.com/", "https://www.example.com"));
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::rules::{ADULT_PATTERNS, ECOMMERCE_HOST_PATTERNS};

/// Content-category classification of a URL.
///
/// Exactly one category is recorded per processed URL per batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlCategory {
    Html,
    Document,
    Pdf,
    Image,
    Video,
    Audio,
    Archive,
    Ecommerce,
    Adult,
    Invalid,
    Duplicate,
}

impl std::fmt::Display for UrlCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            UrlCategory::Html => "html",
            UrlCategory::Document => "document",
            UrlCategory::Pdf => "pdf",
            UrlCategory::Image => "image",
            UrlCategory::Video => "video",
            UrlCategory::Audio => "audio",
            UrlCategory::Archive => "archive",
            UrlCategory::Ecommerce => "ecommerce",
            UrlCategory::Adult => "adult",
            UrlCategory::Invalid => "invalid",
            UrlCategory::Duplicate => "duplicate",
        };
        f.write_str(label)
    }
}

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "odt", "ods", "odp",
];
const IMAGE_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "ico", "tiff"];
const VIDEO_EXTENSIONS: &[&str] =
    &["mp4", "avi", "mov", "wmv", "flv", "mkv", "webm", "m4v", "mpg", "mpeg"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "aac", "wma", "m4a"];
const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz", "bz2", "tgz", "xz"];

/// Normalizes a raw URL string into its canonical form.
///
/// Trims whitespace, prefixes `https://` when no scheme is present,
/// lower-cases the host and strips its trailing dot and leading `www.`,
/// collapses repeated path slashes, strips the trailing slash (except root),
/// removes `utm_*` tracking parameters, and drops the fragment.
///
/// Returns `None` on unparseable input; never panics.
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let mut url = Url::parse(&with_scheme).ok()?;

    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.trim_end_matches('.');
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        return None;
    }
    url.set_host(Some(host)).ok()?;

    let mut path = String::with_capacity(url.path().len());
    let mut prev_slash = false;
    for ch in url.path().chars() {
        if ch == '/' {
            if !prev_slash {
                path.push(ch);
            }
            prev_slash = true;
        } else {
            path.push(ch);
            prev_slash = false;
        }
    }
    if path.is_empty() {
        path.push('/');
    } else if path.len() > 1 && path.ends_with('/') {
        path.truncate(path.len() - 1);
    }
    url.set_path(&path);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !k.to_ascii_lowercase().starts_with("utm_"))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    url.set_fragment(None);

    Some(url.to_string())
}

/// Returns true when the URL parses with an `http`/`https` scheme and a host.
pub fn is_valid(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}

/// Extracts the host of a URL, if any.
pub fn host(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_string)
}

/// Resolves a possibly-relative URL against a base.
pub fn resolve_relative(base: &str, relative: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(relative).ok().map(|u| u.to_string())
}

/// Computes the deduplication key for a URL: the SHA-256 digest of its
/// string form, as lowercase hex.
pub fn url_hash(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Returns true when both URLs normalize to the same canonical form.
pub fn is_same_url(a: &str, b: &str) -> bool {
    match (normalize(a), normalize(b)) {
        (Some(na), Some(nb)) => na == nb,
        _ => false,
    }
}

fn path_extension(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?.to_ascii_lowercase();
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_string())
}

/// Classifies a URL by its path's file extension alone.
///
/// Returns `None` for extension-less paths and unknown extensions; the
/// caller falls back to a content-type probe or the `html` default.
pub fn categorize_by_extension(url: &str) -> Option<UrlCategory> {
    let ext = path_extension(url)?;
    let ext = ext.as_str();
    if DOCUMENT_EXTENSIONS.contains(&ext) {
        Some(UrlCategory::Document)
    } else if IMAGE_EXTENSIONS.contains(&ext) {
        Some(UrlCategory::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        Some(UrlCategory::Video)
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        Some(UrlCategory::Audio)
    } else if ARCHIVE_EXTENSIONS.contains(&ext) {
        Some(UrlCategory::Archive)
    } else {
        None
    }
}

/// Maps a `Content-Type` header value onto a category.
pub fn categorize_content_type(content_type: &str) -> Option<UrlCategory> {
    let ct = content_type.to_ascii_lowercase();
    if ct.contains("text/html") {
        Some(UrlCategory::Html)
    } else if ct.contains("application/pdf") {
        Some(UrlCategory::Document)
    } else if ct.starts_with("image/") {
        Some(UrlCategory::Image)
    } else if ct.starts_with("video/") {
        Some(UrlCategory::Video)
    } else if ct.starts_with("audio/") {
        Some(UrlCategory::Audio)
    } else if ct.contains("application/x-zip") || ct.contains("application/x-rar") {
        Some(UrlCategory::Archive)
    } else {
        None
    }
}

/// Returns true when the URL's path names a PDF file.
pub fn is_pdf_extension(url: &str) -> bool {
    path_extension(url).is_some_and(|ext| ext == "pdf")
}

/// Returns true when the host matches a storefront/marketplace signature.
pub fn is_ecommerce(url: &str) -> bool {
    let Some(host) = host(url) else {
        return false;
    };
    ECOMMERCE_HOST_PATTERNS.iter().any(|p| host.contains(p))
}

/// Returns true when the host or path matches an adult-site signature.
pub fn is_adult(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let path = parsed.path();
    ADULT_PATTERNS.iter().any(|p| host.contains(p) || path.contains(p))
}
