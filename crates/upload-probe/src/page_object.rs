//! Page object for the CSV upload page.
//!
//! The page object owns only locators and the base URL. The driver is passed
//! into every operation, so a page object can be shared freely between
//! concurrently running cases.

use crate::driver::UploadDriver;
use crate::locator::Locator;
use crate::result::ProbeResult;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Default wait for elements (the automation engine's usual 30 seconds)
pub const DEFAULT_ELEMENT_TIMEOUT_MS: u64 = 30_000;

/// Trait for page objects representing a page in the UI
pub trait PageObject {
    /// URL the page lives at
    fn url(&self) -> &str;

    /// How long element waits may take
    fn element_timeout(&self) -> Duration {
        Duration::from_millis(DEFAULT_ELEMENT_TIMEOUT_MS)
    }

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// The application's upload form and its result container
#[derive(Debug, Clone)]
pub struct UploadPage {
    url: String,
    file_input: Locator,
    submit_button: Locator,
    results: Locator,
    element_timeout: Duration,
}

impl UploadPage {
    /// Create the page object for an application at `url`
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file_input: Locator::new("input[type='file']"),
            submit_button: Locator::new("button[type='submit']"),
            results: Locator::new("#results"),
            element_timeout: Duration::from_millis(DEFAULT_ELEMENT_TIMEOUT_MS),
        }
    }

    /// Set the element wait timeout
    #[must_use]
    pub const fn with_element_timeout(mut self, timeout: Duration) -> Self {
        self.element_timeout = timeout;
        self
    }

    /// File input locator
    #[must_use]
    pub const fn file_input(&self) -> &Locator {
        &self.file_input
    }

    /// Submit button locator
    #[must_use]
    pub const fn submit_button(&self) -> &Locator {
        &self.submit_button
    }

    /// Result container locator
    #[must_use]
    pub const fn results(&self) -> &Locator {
        &self.results
    }

    /// Navigate to the page and wait for the file input
    pub async fn open<D: UploadDriver>(&self, driver: &mut D) -> ProbeResult<()> {
        driver.navigate(&self.url).await?;
        driver.wait_for(&self.file_input, self.element_timeout).await
    }

    /// Put `file` into the file input and submit the form
    ///
    /// The server round-trip is still pending when this returns; await it with
    /// [`UploadPage::read_result`].
    pub async fn upload<D: UploadDriver>(&self, driver: &mut D, file: &Path) -> ProbeResult<()> {
        debug!(file = %file.display(), "uploading");
        driver
            .set_input_files(&self.file_input, &[file.to_path_buf()])
            .await?;
        driver.click(&self.submit_button).await
    }

    /// Wait for the result container and return its trimmed text
    pub async fn read_result<D: UploadDriver>(&self, driver: &mut D) -> ProbeResult<String> {
        driver.wait_for(&self.results, self.element_timeout).await?;
        let text = driver.inner_text(&self.results).await?;
        Ok(text.trim().to_string())
    }
}

impl PageObject for UploadPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn element_timeout(&self) -> Duration {
        self.element_timeout
    }

    fn page_name(&self) -> &str {
        "UploadPage"
    }
}
