//! HTTP fetching with certificate-failure retry and charset resolution.
//!
//! The fetcher keeps two clients: a strict one and one that skips TLS
//! verification. A request is retried exactly once, on certificate
//! failures only, through the permissive client. Response bodies are
//! decoded from the header charset, a sniffed `<meta>` charset, or UTF-8
//! in that order.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::{ExcerpoError, Result};

/// Browser user-agent pool for rotation.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:90.0) Gecko/20100101 Firefox/90.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Mobile/15E148 Safari/604.1",
];

/// Bytes inspected when sniffing a `<meta>` charset declaration.
const CHARSET_SNIFF_BYTES: usize = 1024;

static META_CHARSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([A-Za-z0-9_\-]+)"#).unwrap());

fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("ja,en-US;q=0.9,en;q=0.8"),
    );
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
    headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("document"));
    headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("navigate"));
    headers.insert("Sec-Fetch-Site", HeaderValue::from_static("none"));
    headers.insert("Sec-Fetch-User", HeaderValue::from_static("?1"));
    headers
}

/// Retrieves raw page content for normalized URLs.
pub struct DocumentFetcher {
    strict: reqwest::Client,
    permissive: reqwest::Client,
    timeout: u64,
    user_agent_rotation: bool,
    next_agent: AtomicUsize,
}

impl DocumentFetcher {
    /// Creates a fetcher with the given request timeout in seconds.
    pub fn new(timeout_seconds: u64, user_agent_rotation: bool) -> Result<Self> {
        let strict = reqwest::Client::builder()
            .default_headers(base_headers())
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        let permissive = reqwest::Client::builder()
            .default_headers(base_headers())
            .timeout(Duration::from_secs(timeout_seconds))
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            strict,
            permissive,
            timeout: timeout_seconds,
            user_agent_rotation,
            next_agent: AtomicUsize::new(0),
        })
    }

    fn user_agent(&self) -> &'static str {
        if self.user_agent_rotation {
            let index = self.next_agent.fetch_add(1, Ordering::Relaxed);
            USER_AGENTS[index % USER_AGENTS.len()]
        } else {
            USER_AGENTS[0]
        }
    }

    /// Fetches a page and decodes its body to a string.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.get_with_certificate_retry(url).await?;
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(|e| self.map_error(e, url))?;
        Ok(decode_body(&bytes, content_type.as_deref()))
    }

    /// Fetches a binary body (PDF download path).
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get_with_certificate_retry(url).await?;
        let bytes = response.bytes().await.map_err(|e| self.map_error(e, url))?;
        Ok(bytes.to_vec())
    }

    /// Probes a URL's `Content-Type` with a HEAD request.
    ///
    /// Transport failures yield `None`; classification then falls back to
    /// the `html` default.
    pub async fn probe_content_type(&self, url: &str) -> Option<String> {
        let response = self
            .strict
            .head(url)
            .header(header::USER_AGENT, self.user_agent())
            .send()
            .await
            .ok()?;
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase())
    }

    async fn get_with_certificate_retry(&self, url: &str) -> Result<reqwest::Response> {
        let agent = self.user_agent();
        match send(&self.strict, url, agent).await {
            Ok(response) => Ok(response),
            Err(err) if is_certificate_error(&err) => {
                tracing::warn!(url, "certificate validation failed, retrying without verification");
                send(&self.permissive, url, agent).await.map_err(|e| self.map_error(e, url))
            }
            Err(err) => Err(self.map_error(err, url)),
        }
    }

    fn map_error(&self, err: reqwest::Error, url: &str) -> ExcerpoError {
        if err.is_timeout() {
            ExcerpoError::Timeout { timeout: self.timeout }
        } else if err.is_redirect() {
            ExcerpoError::TooManyRedirects(url.to_string())
        } else {
            ExcerpoError::HttpError(err)
        }
    }
}

async fn send(
    client: &reqwest::Client,
    url: &str,
    agent: &str,
) -> std::result::Result<reqwest::Response, reqwest::Error> {
    let response = client.get(url).header(header::USER_AGENT, agent).send().await?;
    response.error_for_status()
}

fn is_certificate_error(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(current) = source {
        if current.to_string().to_lowercase().contains("certificate") {
            return true;
        }
        source = current.source();
    }
    false
}

fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    let lowered = content_type.to_ascii_lowercase();
    let charset = lowered.split("charset=").nth(1)?;
    let charset = charset.split(';').next()?.trim().trim_matches('"');
    Encoding::for_label(charset.as_bytes())
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(CHARSET_SNIFF_BYTES)];
    let head = String::from_utf8_lossy(head);
    let captures = META_CHARSET_RE.captures(&head)?;
    Encoding::for_label(captures.get(1)?.as_str().as_bytes())
}

/// Decodes response bytes using the header charset, then a sniffed meta
/// charset, then UTF-8.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type
        && let Some(encoding) = charset_from_content_type(ct)
    {
        return encoding.decode(bytes).0.into_owned();
    }
    if let Some(encoding) = sniff_meta_charset(bytes) {
        return encoding.decode(bytes).0.into_owned();
    }
    UTF_8.decode(bytes).0.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_pool() {
        assert_eq!(USER_AGENTS.len(), 5);
        let fetcher = DocumentFetcher::new(30, true).unwrap();
        let first = fetcher.user_agent();
        let second = fetcher.user_agent();
        assert_ne!(first, second);

        let fixed = DocumentFetcher::new(30, false).unwrap();
        assert_eq!(fixed.user_agent(), USER_AGENTS[0]);
        assert_eq!(fixed.user_agent(), USER_AGENTS[0]);
    }

    #[test]
    fn test_decode_body_header_charset() {
        let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode("日本語のテキスト");
        let decoded = decode_body(&encoded, Some("text/html; charset=shift_jis"));
        assert_eq!(decoded, "日本語のテキスト");
    }

    #[test]
    fn test_decode_body_meta_sniff() {
        let (body, _, _) = encoding_rs::EUC_JP.encode("本文");
        let mut bytes = b"<html><head><meta charset=\"euc-jp\"></head><body>".to_vec();
        bytes.extend_from_slice(&body);
        bytes.extend_from_slice(b"</body></html>");

        let decoded = decode_body(&bytes, Some("text/html"));
        assert!(decoded.contains("本文"));
    }

    #[test]
    fn test_decode_body_defaults_to_utf8() {
        let decoded = decode_body("plain utf-8 ✓".as_bytes(), None);
        assert_eq!(decoded, "plain utf-8 ✓");
    }

    #[test]
    fn test_charset_param_parsing() {
        assert_eq!(
            charset_from_content_type("text/html; charset=UTF-8").map(|e| e.name()),
            Some("UTF-8")
        );
        assert_eq!(
            charset_from_content_type("text/html; charset=\"shift_jis\"; foo=bar")
                .map(|e| e.name()),
            Some("Shift_JIS")
        );
        assert!(charset_from_content_type("text/html").is_none());
    }
}
