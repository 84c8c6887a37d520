//! Driver seam between the page model and a browser.
//!
//! The page model never holds a browser handle. Every operation receives the
//! driver explicitly, so one driver belongs to exactly one test case.
//!
//! # Implementations
//!
//! - `ChromiumDriver` - real Chromium over CDP (feature `browser`)
//! - `MockDriver` - scripted in-memory page for unit and workflow tests

use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Browser automation primitives the upload page needs
#[async_trait]
pub trait UploadDriver: Send {
    /// Navigate to URL
    async fn navigate(&mut self, url: &str) -> ProbeResult<()>;

    /// Wait until the located element reaches its required state
    async fn wait_for(&mut self, locator: &Locator, timeout: Duration) -> ProbeResult<()>;

    /// Set the files of a file-input element
    async fn set_input_files(&mut self, locator: &Locator, files: &[PathBuf]) -> ProbeResult<()>;

    /// Click element
    async fn click(&mut self, locator: &Locator) -> ProbeResult<()>;

    /// Rendered text of the element
    async fn inner_text(&mut self, locator: &Locator) -> ProbeResult<String>;

    /// Release the browser context
    async fn close(&mut self) -> ProbeResult<()>;
}

/// Source of fresh, isolated browser contexts
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Driver handed out per launch
    type Driver: UploadDriver;

    /// Acquire a new context that shares no state with earlier ones
    async fn launch(&self) -> ProbeResult<Self::Driver>;
}

/// Shared record of the calls made against mock drivers
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    /// Snapshot of recorded calls
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of calls starting with `method`
    #[must_use]
    pub fn count(&self, method: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(':').next() == Some(method))
            .count()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.count(method) > 0
    }
}

/// Scripted driver for tests
///
/// Elements are keyed by selector text. Elements registered with
/// [`MockDriver::reveal_on_click`] appear only after the named control is
/// clicked, the way a result container appears after a form round-trip.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    /// Current URL
    pub current_url: String,
    elements: HashMap<String, String>,
    pending: HashMap<String, Vec<(String, String)>>,
    files: Vec<PathBuf>,
    navigation_error: Option<String>,
    log: CallLog,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element present as soon as the page loads
    #[must_use]
    pub fn with_element(mut self, selector: impl Into<String>, text: impl Into<String>) -> Self {
        let _ = self.elements.insert(selector.into(), text.into());
        self
    }

    /// Make `selector` appear with `text` once `trigger` is clicked
    #[must_use]
    pub fn reveal_on_click(
        mut self,
        trigger: impl Into<String>,
        selector: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.pending
            .entry(trigger.into())
            .or_default()
            .push((selector.into(), text.into()));
        self
    }

    /// Fail every navigation with `message`
    #[must_use]
    pub fn with_navigation_error(mut self, message: impl Into<String>) -> Self {
        self.navigation_error = Some(message.into());
        self
    }

    /// Files currently set on the page
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Call log shared with clones of this driver
    #[must_use]
    pub fn log(&self) -> &CallLog {
        &self.log
    }

    fn require(&self, locator: &Locator) -> ProbeResult<&str> {
        let key = locator.selector().as_css();
        self.elements
            .get(&key)
            .map(String::as_str)
            .ok_or(ProbeError::ElementNotFound { selector: key })
    }
}

#[async_trait]
impl UploadDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        self.log.push(format!("navigate:{url}"));
        if let Some(ref message) = self.navigation_error {
            return Err(ProbeError::Navigation {
                url: url.to_string(),
                message: message.clone(),
            });
        }
        self.current_url = url.to_string();
        Ok(())
    }

    async fn wait_for(&mut self, locator: &Locator, timeout: Duration) -> ProbeResult<()> {
        self.log.push(format!("wait_for:{locator}"));
        self.require(locator)
            .map(|_| ())
            .map_err(|_| ProbeError::timeout(locator.to_string(), timeout, None))
    }

    async fn set_input_files(&mut self, locator: &Locator, files: &[PathBuf]) -> ProbeResult<()> {
        self.log.push(format!("set_input_files:{locator}"));
        let _ = self.require(locator)?;
        self.files = files.to_vec();
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> ProbeResult<()> {
        self.log.push(format!("click:{locator}"));
        let _ = self.require(locator)?;
        if let Some(revealed) = self.pending.remove(&locator.selector().as_css()) {
            self.elements.extend(revealed);
        }
        Ok(())
    }

    async fn inner_text(&mut self, locator: &Locator) -> ProbeResult<String> {
        self.log.push(format!("inner_text:{locator}"));
        self.require(locator).map(str::to_string)
    }

    async fn close(&mut self) -> ProbeResult<()> {
        self.log.push("close".to_string());
        Ok(())
    }
}

/// Launcher handing out copies of a scripted page
///
/// Every launch starts from the same template, so state set by one case never
/// reaches the next. All copies share the template's call log.
#[derive(Debug, Clone)]
pub struct MockLauncher {
    template: MockDriver,
    launch_error: Option<String>,
}

impl MockLauncher {
    /// Create a launcher from a page template
    #[must_use]
    pub fn new(template: MockDriver) -> Self {
        Self {
            template,
            launch_error: None,
        }
    }

    /// Fail every launch with `message`
    #[must_use]
    pub fn with_launch_error(mut self, message: impl Into<String>) -> Self {
        self.launch_error = Some(message.into());
        self
    }

    /// Call log shared by every launched driver
    #[must_use]
    pub fn log(&self) -> &CallLog {
        self.template.log()
    }
}

#[async_trait]
impl BrowserLauncher for MockLauncher {
    type Driver = MockDriver;

    async fn launch(&self) -> ProbeResult<MockDriver> {
        self.template.log.push("launch".to_string());
        if let Some(ref message) = self.launch_error {
            return Err(ProbeError::BrowserLaunch {
                message: message.clone(),
            });
        }
        Ok(self.template.clone())
    }
}
