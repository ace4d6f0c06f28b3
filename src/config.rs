//! Run configuration.
//!
//! The core pipeline treats all of this as opaque parameters: URL template
//! parts, request headers, the identifier range, the missing-value tokens,
//! and output/log paths. Values live in a JSON file next to the binary and
//! every field has a working default for the live site.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::page::Page;

/// The two fixed halves of the per-page URL template.
///
/// A page URL is `part1 + page_id + part2 + school_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlParts {
    pub part1: String,
    pub part2: String,
}

impl Default for UrlParts {
    fn default() -> Self {
        UrlParts {
            part1: "https://www.collegedata.com/cs/data/college/college_pg0".to_string(),
            part2: "_tmpl.jhtml?schoolId=".to_string(),
        }
    }
}

/// Inclusive school-identifier range to process.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct IdRange {
    pub start: u32,
    pub end: u32,
}

impl Default for IdRange {
    fn default() -> Self {
        // No-school pages dominate above 1000; none known over 5000.
        IdRange { start: 1, end: 5000 }
    }
}

/// Output and log locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub output: String,
    pub error_log: String,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            output: "scraped.csv".to_string(),
            error_log: "scrape_errors.log".to_string(),
        }
    }
}

/// Full run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub url: UrlParts,
    /// Request headers sent with every fetch.
    pub headers: BTreeMap<String, String>,
    /// Heading string that marks a page with no school behind it.
    pub empty_h1: String,
    /// Cell strings treated as absent values during extraction.
    pub na_vals: Vec<String>,
    pub school_id: IdRange,
    pub paths: Paths,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Bounded retry count for transient fetch failures.
    pub retries: u32,
    /// Worker threads; each worker owns one school at a time.
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        // The site answers bare requests fine; send a browser UA anyway.
        headers.insert(
            "User-Agent".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14) \
             AppleWebKit/605.1.15 (KHTML, like Gecko) \
             Version/12.0 Safari/605.1.15"
                .to_string(),
        );
        Config {
            url: UrlParts::default(),
            headers,
            empty_h1: "Retrieve a Saved Search".to_string(),
            na_vals: vec!["Not reported".to_string(), "Not Reported".to_string()],
            school_id: IdRange::default(),
            paths: Paths::default(),
            timeout_secs: 30,
            retries: 2,
            workers: 4,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Config> {
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Load from `path` if the file exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Config> {
        if path.exists() {
            Config::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Build the URL for one (school, page) pair.
    #[must_use]
    pub fn page_url(&self, school_id: u32, page: Page) -> String {
        format!(
            "{}{}{}{}",
            self.url.part1,
            page.id(),
            self.url.part2,
            school_id
        )
    }

    /// True if a cell string is one of the recognized missing-value tokens.
    #[must_use]
    pub fn is_na(&self, text: &str) -> bool {
        self.na_vals.iter().any(|na| na == text)
    }
}

/// Resolve the effective id range from CLI parameters and config defaults.
///
/// Mirrors the historical CLI semantics: both bounds given means that range;
/// only a start means that single id; only an end means `1..=end`; neither
/// falls back to the configured range.
pub fn resolve_range(config: &Config, start: Option<u32>, end: Option<u32>) -> Result<(u32, u32)> {
    let (start_id, end_id) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        (Some(s), None) => (s, s),
        (None, Some(e)) => (1, e),
        (None, None) => (config.school_id.start, config.school_id.end),
    };
    if start_id > end_id {
        return Err(Error::InvalidRange {
            start: start_id,
            end: end_id,
        });
    }
    Ok((start_id, end_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_url_matches_site_scheme() {
        let config = Config::default();
        assert_eq!(
            config.page_url(59, Page::Admissions),
            "https://www.collegedata.com/cs/data/college/college_pg02_tmpl.jhtml?schoolId=59"
        );
    }

    #[test]
    fn na_tokens_cover_both_case_variants() {
        let config = Config::default();
        assert!(config.is_na("Not reported"));
        assert!(config.is_na("Not Reported"));
        assert!(!config.is_na("not reported"));
        assert!(!config.is_na("42"));
    }

    #[test]
    fn range_resolution_semantics() {
        let config = Config::default();
        assert_eq!(resolve_range(&config, Some(5), Some(9)).unwrap(), (5, 9));
        assert_eq!(resolve_range(&config, Some(5), None).unwrap(), (5, 5));
        assert_eq!(resolve_range(&config, None, Some(9)).unwrap(), (1, 9));
        assert_eq!(
            resolve_range(&config, None, None).unwrap(),
            (config.school_id.start, config.school_id.end)
        );
        assert!(matches!(
            resolve_range(&config, Some(9), Some(5)),
            Err(Error::InvalidRange { start: 9, end: 5 })
        ));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.empty_h1, config.empty_h1);
        assert_eq!(back.na_vals, config.na_vals);
        assert_eq!(back.url.part1, config.url.part1);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let partial = r#"{ "school_id": { "start": 10, "end": 20 } }"#;
        let config: Config = serde_json::from_str(partial).unwrap();
        assert_eq!(config.school_id.start, 10);
        assert_eq!(config.school_id.end, 20);
        assert_eq!(config.empty_h1, "Retrieve a Saved Search");
    }
}
