//! Run configuration

use crate::browser::BrowserConfig;
use crate::locator::DEFAULT_POLL_INTERVAL_MS;
use crate::page_object::{UploadPage, DEFAULT_ELEMENT_TIMEOUT_MS};
use crate::result::{ProbeError, ProbeResult};
use std::path::PathBuf;
use std::time::Duration;

/// Default address of the application under test
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding [`ProbeConfig::base_url`]
pub const ENV_BASE_URL: &str = "UPLOAD_PROBE_BASE_URL";
/// Environment variable overriding [`ProbeConfig::data_dir`]
pub const ENV_DATA_DIR: &str = "UPLOAD_PROBE_DATA_DIR";
/// Environment variable overriding [`ProbeConfig::element_timeout`] (ms)
pub const ENV_TIMEOUT_MS: &str = "UPLOAD_PROBE_TIMEOUT_MS";
/// Environment variable overriding [`ProbeConfig::concurrency`]
pub const ENV_CONCURRENCY: &str = "UPLOAD_PROBE_CONCURRENCY";
/// Environment variable that shows the browser window when set to `1`/`true`
pub const ENV_HEADFUL: &str = "UPLOAD_PROBE_HEADFUL";
/// Environment variable naming the Chromium binary
pub const ENV_CHROMIUM_PATH: &str = "CHROMIUM_PATH";

/// Settings for one run of the upload suite
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Base URL of the application under test
    pub base_url: String,
    /// Directory holding `expected_results.json` and the CSV inputs
    pub data_dir: PathBuf,
    /// Wait applied to every element
    pub element_timeout: Duration,
    /// Polling interval of element waits
    pub poll_interval: Duration,
    /// Cases run at the same time (each in its own browser)
    pub concurrency: usize,
    /// Browser settings
    pub browser: BrowserConfig,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: PathBuf::from("data"),
            element_timeout: Duration::from_millis(DEFAULT_ELEMENT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            concurrency: 1,
            browser: BrowserConfig::default(),
        }
    }
}

impl ProbeConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the fixture directory
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the element wait timeout
    #[must_use]
    pub const fn with_element_timeout(mut self, timeout: Duration) -> Self {
        self.element_timeout = timeout;
        self
    }

    /// Set the number of cases run at once (at least one)
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set browser options
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }

    /// Page model for the configured application
    #[must_use]
    pub fn page(&self) -> UploadPage {
        UploadPage::new(self.base_url.clone()).with_element_timeout(self.element_timeout)
    }

    /// Overlay values from the process environment
    pub fn from_env(self) -> ProbeResult<Self> {
        self.overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable source
    pub fn overlay(mut self, var: impl Fn(&str) -> Option<String>) -> ProbeResult<Self> {
        if let Some(url) = var(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(dir) = var(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(ms) = var(ENV_TIMEOUT_MS) {
            self.element_timeout = Duration::from_millis(parse_number(ENV_TIMEOUT_MS, &ms)?);
        }
        if let Some(n) = var(ENV_CONCURRENCY) {
            let n = parse_number(ENV_CONCURRENCY, &n)?;
            if n == 0 {
                return Err(ProbeError::config(format!("{ENV_CONCURRENCY} must be at least 1")));
            }
            self.concurrency = n as usize;
        }
        if let Some(flag) = var(ENV_HEADFUL) {
            self.browser.headless = !matches!(flag.as_str(), "1" | "true" | "yes");
        }
        if let Some(path) = var(ENV_CHROMIUM_PATH) {
            self.browser.chromium_path = Some(PathBuf::from(path));
        }
        Ok(self)
    }
}

fn parse_number(key: &str, value: &str) -> ProbeResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| ProbeError::config(format!("{key} must be a non-negative integer, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_object::PageObject;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.element_timeout, Duration::from_secs(30));
        assert_eq!(config.concurrency, 1);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_builder() {
        let config = ProbeConfig::new()
            .with_base_url("http://127.0.0.1:9000")
            .with_data_dir("fixtures")
            .with_element_timeout(Duration::from_secs(5))
            .with_concurrency(0);
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.data_dir, PathBuf::from("fixtures"));
        assert_eq!(config.element_timeout, Duration::from_secs(5));
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_overlay() {
        let config = ProbeConfig::new()
            .overlay(vars(&[
                (ENV_BASE_URL, "http://app:8000"),
                (ENV_DATA_DIR, "/srv/data"),
                (ENV_TIMEOUT_MS, "1500"),
                (ENV_CONCURRENCY, "4"),
                (ENV_HEADFUL, "1"),
                (ENV_CHROMIUM_PATH, "/opt/chrome"),
            ]))
            .unwrap();
        assert_eq!(config.base_url, "http://app:8000");
        assert_eq!(config.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(config.element_timeout, Duration::from_millis(1500));
        assert_eq!(config.concurrency, 4);
        assert!(!config.browser.headless);
        assert_eq!(config.browser.chromium_path, Some(PathBuf::from("/opt/chrome")));
    }

    #[test]
    fn test_page_uses_base_url() {
        let config = ProbeConfig::new().with_element_timeout(Duration::from_secs(2));
        let page = config.page();
        assert_eq!(page.url(), DEFAULT_BASE_URL);
        assert_eq!(page.element_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_overlay_empty_keeps_defaults() {
        let config = ProbeConfig::new().overlay(vars(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_overlay_rejects_bad_numbers() {
        let err = ProbeConfig::new()
            .overlay(vars(&[(ENV_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, ProbeError::Config { .. }));

        let err = ProbeConfig::new()
            .overlay(vars(&[(ENV_CONCURRENCY, "0")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_CONCURRENCY));
    }
}
