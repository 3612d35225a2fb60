//! Extraction options.
//!
//! [`ExtractOptions`] controls cleaning passes, exclusion filters, the
//! extraction mode, and batch/network behavior. Options are validated at
//! construction time so misconfiguration surfaces before any network work
//! starts.
//!
//! # Example
//!
//! ```rust
//! use excerpo_core::options::{ExtractOptions, ExtractionMode};
//!
//! let options = ExtractOptions::builder()
//!     .extraction_mode(ExtractionMode::Selectors)
//!     .exclude_ecommerce(true)
//!     .max_connections(4)
//!     .build()
//!     .unwrap();
//! assert!(options.remove_ads);
//! ```

use serde::{Deserialize, Serialize};

use crate::{ExcerpoError, Result};

/// How the main content subtree is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Site rule, then generic selectors, then scoring; whole page as a
    /// last resort.
    #[default]
    Auto,
    /// Same chain as `Auto`, kept as an explicit alias for callers that
    /// want the heuristic path by name.
    Readability,
    /// Generic selector list only.
    Selectors,
    /// Always render the whole page.
    FullPage,
}

impl std::str::FromStr for ExtractionMode {
    type Err = ExcerpoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ExtractionMode::Auto),
            "readability" => Ok(ExtractionMode::Readability),
            "selectors" | "content" => Ok(ExtractionMode::Selectors),
            "fullpage" | "full-page" => Ok(ExtractionMode::FullPage),
            other => Err(ExcerpoError::ConfigError(format!("unknown extraction mode: {other}"))),
        }
    }
}

/// Options controlling one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Remove promotional/sponsored markers from the cleaned text (default: true).
    pub remove_ads: bool,

    /// Remove navigation/login/search chrome from the cleaned text (default: true).
    pub remove_navigation: bool,

    /// Remove footer/copyright boilerplate from the cleaned text (default: true).
    pub remove_footer: bool,

    /// Remove related-content teasers from the cleaned text (default: true).
    pub remove_related: bool,

    /// Collapse runs of blank lines a second time after trimming (default: true).
    pub remove_empty_lines: bool,

    /// Collapse repeated spaces within lines (default: true).
    pub normalize_spaces: bool,

    /// Content location strategy (default: [`ExtractionMode::Auto`]).
    pub extraction_mode: ExtractionMode,

    /// Keep the batch running past individual failures (default: true).
    pub continue_on_error: bool,

    /// Fail storefront/marketplace hosts with `Excluded` (default: false).
    pub exclude_ecommerce: bool,

    /// Fail adult hosts with `Excluded` (default: false).
    pub exclude_adult: bool,

    /// Fail repeated normalized URLs with `Duplicate` (default: true).
    pub exclude_duplicates: bool,

    /// Extract the page metadata map (default: true).
    pub extract_metadata: bool,

    /// Extract image info from the located subtree (default: false).
    pub extract_images: bool,

    /// Extract link info from the located subtree (default: false).
    pub extract_links: bool,

    /// Maximum concurrent fetches in a batch (default: 10).
    pub max_connections: usize,

    /// Per-request timeout in seconds (default: 30).
    pub timeout: u64,

    /// Consult and fill the response cache (default: true).
    pub cache_enabled: bool,

    /// Rotate through the user-agent pool per request instead of always
    /// using the first entry (default: true).
    pub user_agent_rotation: bool,

    /// Extract text from PDF documents when an extractor is wired in
    /// (default: true).
    pub extract_pdf_text: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            remove_ads: true,
            remove_navigation: true,
            remove_footer: true,
            remove_related: true,
            remove_empty_lines: true,
            normalize_spaces: true,
            extraction_mode: ExtractionMode::Auto,
            continue_on_error: true,
            exclude_ecommerce: false,
            exclude_adult: false,
            exclude_duplicates: true,
            extract_metadata: true,
            extract_images: false,
            extract_links: false,
            max_connections: 10,
            timeout: 30,
            cache_enabled: true,
            user_agent_rotation: true,
            extract_pdf_text: true,
        }
    }
}

impl ExtractOptions {
    /// Creates a new builder with default options.
    pub fn builder() -> ExtractOptionsBuilder {
        ExtractOptionsBuilder::new()
    }

    /// Checks option values for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(ExcerpoError::ConfigError(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.timeout == 0 {
            return Err(ExcerpoError::ConfigError("timeout must be at least 1 second".to_string()));
        }
        Ok(())
    }
}

/// Builder for [`ExtractOptions`].
///
/// `build` validates the assembled options and rejects impossible values.
pub struct ExtractOptionsBuilder {
    options: ExtractOptions,
}

impl ExtractOptionsBuilder {
    /// Creates a new builder with default options.
    pub fn new() -> Self {
        Self { options: ExtractOptions::default() }
    }

    pub fn remove_ads(mut self, value: bool) -> Self {
        self.options.remove_ads = value;
        self
    }

    pub fn remove_navigation(mut self, value: bool) -> Self {
        self.options.remove_navigation = value;
        self
    }

    pub fn remove_footer(mut self, value: bool) -> Self {
        self.options.remove_footer = value;
        self
    }

    pub fn remove_related(mut self, value: bool) -> Self {
        self.options.remove_related = value;
        self
    }

    pub fn remove_empty_lines(mut self, value: bool) -> Self {
        self.options.remove_empty_lines = value;
        self
    }

    pub fn normalize_spaces(mut self, value: bool) -> Self {
        self.options.normalize_spaces = value;
        self
    }

    pub fn extraction_mode(mut self, mode: ExtractionMode) -> Self {
        self.options.extraction_mode = mode;
        self
    }

    pub fn continue_on_error(mut self, value: bool) -> Self {
        self.options.continue_on_error = value;
        self
    }

    pub fn exclude_ecommerce(mut self, value: bool) -> Self {
        self.options.exclude_ecommerce = value;
        self
    }

    pub fn exclude_adult(mut self, value: bool) -> Self {
        self.options.exclude_adult = value;
        self
    }

    pub fn exclude_duplicates(mut self, value: bool) -> Self {
        self.options.exclude_duplicates = value;
        self
    }

    pub fn extract_metadata(mut self, value: bool) -> Self {
        self.options.extract_metadata = value;
        self
    }

    pub fn extract_images(mut self, value: bool) -> Self {
        self.options.extract_images = value;
        self
    }

    pub fn extract_links(mut self, value: bool) -> Self {
        self.options.extract_links = value;
        self
    }

    pub fn max_connections(mut self, value: usize) -> Self {
        self.options.max_connections = value;
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.options.timeout = seconds;
        self
    }

    pub fn cache_enabled(mut self, value: bool) -> Self {
        self.options.cache_enabled = value;
        self
    }

    pub fn user_agent_rotation(mut self, value: bool) -> Self {
        self.options.user_agent_rotation = value;
        self
    }

    pub fn extract_pdf_text(mut self, value: bool) -> Self {
        self.options.extract_pdf_text = value;
        self
    }

    /// Validates and returns the assembled options.
    pub fn build(self) -> Result<ExtractOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}

impl Default for ExtractOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExtractOptions::default();
        assert!(options.remove_ads);
        assert!(!options.exclude_ecommerce);
        assert!(options.exclude_duplicates);
        assert_eq!(options.max_connections, 10);
        assert_eq!(options.timeout, 30);
        assert_eq!(options.extraction_mode, ExtractionMode::Auto);
    }

    #[test]
    fn test_builder_sets_fields() {
        let options = ExtractOptions::builder()
            .exclude_adult(true)
            .extract_images(true)
            .max_connections(3)
            .timeout(5)
            .build()
            .unwrap();

        assert!(options.exclude_adult);
        assert!(options.extract_images);
        assert_eq!(options.max_connections, 3);
        assert_eq!(options.timeout, 5);
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        assert!(ExtractOptions::builder().max_connections(0).build().is_err());
        assert!(ExtractOptions::builder().timeout(0).build().is_err());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("auto".parse::<ExtractionMode>().unwrap(), ExtractionMode::Auto);
        assert_eq!("FULLPAGE".parse::<ExtractionMode>().unwrap(), ExtractionMode::FullPage);
        assert!("bogus".parse::<ExtractionMode>().is_err());
    }
}
