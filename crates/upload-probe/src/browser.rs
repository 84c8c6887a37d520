//! Browser control for headless upload runs.
//!
//! With the `browser` feature this module drives a real Chromium over the
//! Chrome `DevTools` Protocol via chromiumoxide. Every launch starts a new
//! browser process, so no cookies or storage leak between test cases.

use std::path::PathBuf;
use std::time::Duration;

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// How long to wait for the browser process to come up
    pub launch_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
            launch_timeout: Duration::from_secs(20),
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set the launch timeout
    #[must_use]
    pub const fn with_launch_timeout(mut self, timeout: Duration) -> Self {
        self.launch_timeout = timeout;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::{BrowserLauncher, UploadDriver};
    use crate::locator::{Locator, PollStep, ReadinessPoll, DEFAULT_POLL_INTERVAL_MS};
    use crate::result::{ProbeError, ProbeResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
    use chromiumoxide::element::Element;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};
    use tokio::task::JoinHandle;
    use tracing::debug;

    /// Launches one Chromium process per test case
    #[derive(Debug, Clone)]
    pub struct ChromiumLauncher {
        config: BrowserConfig,
        poll_interval: Duration,
    }

    impl ChromiumLauncher {
        /// Create a launcher
        #[must_use]
        pub fn new(config: BrowserConfig) -> Self {
            Self {
                config,
                poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            }
        }

        /// Set the polling interval used by waits
        #[must_use]
        pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
            self.poll_interval = interval;
            self
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        fn cdp_config(&self) -> ProbeResult<CdpConfig> {
            let mut builder = CdpConfig::builder()
                .window_size(self.config.viewport_width, self.config.viewport_height)
                .launch_timeout(self.config.launch_timeout);

            if !self.config.headless {
                builder = builder.with_head();
            }

            if !self.config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = self.config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            builder
                .build()
                .map_err(|message| ProbeError::BrowserLaunch { message })
        }
    }

    #[async_trait]
    impl BrowserLauncher for ChromiumLauncher {
        type Driver = ChromiumDriver;

        async fn launch(&self) -> ProbeResult<ChromiumDriver> {
            let (mut browser, mut handler) = CdpBrowser::launch(self.cdp_config()?)
                .await
                .map_err(|e| ProbeError::BrowserLaunch {
                    message: e.to_string(),
                })?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page = match browser.new_page("about:blank").await {
                Ok(page) => page,
                Err(e) => {
                    let _ = shutdown(&mut browser, &handle).await;
                    return Err(ProbeError::BrowserLaunch {
                        message: e.to_string(),
                    });
                }
            };

            debug!("browser launched");
            Ok(ChromiumDriver {
                browser,
                page,
                handle,
                poll_interval: self.poll_interval,
                closed: false,
            })
        }
    }

    /// Teardown steps of a launched browser process
    #[async_trait]
    trait BrowserProcess: Send {
        async fn close(&mut self) -> Result<(), String>;
        async fn wait(&mut self) -> Result<(), String>;
    }

    #[async_trait]
    impl BrowserProcess for CdpBrowser {
        async fn close(&mut self) -> Result<(), String> {
            CdpBrowser::close(self)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        }

        async fn wait(&mut self) -> Result<(), String> {
            CdpBrowser::wait(self)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        }
    }

    /// Close the browser, reap the child process and stop the CDP handler
    ///
    /// The child is waited on even when `close` fails.
    async fn shutdown<B: BrowserProcess>(
        browser: &mut B,
        handle: &JoinHandle<()>,
    ) -> ProbeResult<()> {
        let closed = browser
            .close()
            .await
            .map_err(|e| ProbeError::page(format!("browser close failed: {e}")));
        if let Err(e) = browser.wait().await {
            debug!(error = %e, "browser process wait failed");
        }
        handle.abort();
        closed
    }

    /// A single page in its own Chromium process
    #[derive(Debug)]
    pub struct ChromiumDriver {
        browser: CdpBrowser,
        page: CdpPage,
        handle: JoinHandle<()>,
        poll_interval: Duration,
        closed: bool,
    }

    impl ChromiumDriver {
        async fn element(&self, locator: &Locator) -> ProbeResult<Element> {
            let selector = locator.selector().as_css();
            self.page
                .find_element(selector.clone())
                .await
                .map_err(|_| ProbeError::ElementNotFound { selector })
        }

        async fn is_ready(&self, locator: &Locator) -> ProbeResult<bool> {
            self.page
                .evaluate(locator.to_ready_probe())
                .await
                .map_err(|e| ProbeError::page(e.to_string()))?
                .into_value::<bool>()
                .map_err(|e| ProbeError::page(e.to_string()))
        }
    }

    #[async_trait]
    impl UploadDriver for ChromiumDriver {
        async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
            debug!(url, "navigate");
            self.page
                .goto(url)
                .await
                .map_err(|e| ProbeError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn wait_for(&mut self, locator: &Locator, timeout: Duration) -> ProbeResult<()> {
            debug!(selector = %locator, "wait_for");
            let mut poll = ReadinessPoll::new(locator, timeout, Instant::now());
            loop {
                let probe = self.is_ready(locator).await;
                if let Err(ref e) = probe {
                    debug!(selector = %locator, error = %e, "readiness probe failed, retrying");
                }
                match poll.observe(probe, Instant::now()) {
                    PollStep::Ready => return Ok(()),
                    PollStep::TimedOut(e) => return Err(e),
                    PollStep::Retry => tokio::time::sleep(self.poll_interval).await,
                }
            }
        }

        async fn set_input_files(
            &mut self,
            locator: &Locator,
            files: &[PathBuf],
        ) -> ProbeResult<()> {
            debug!(selector = %locator, count = files.len(), "set_input_files");
            let element = self.element(locator).await?;
            let files = files
                .iter()
                .map(|p| {
                    std::fs::canonicalize(p)
                        .map(|abs| abs.to_string_lossy().to_string())
                        .map_err(ProbeError::from)
                })
                .collect::<ProbeResult<Vec<_>>>()?;
            let params = SetFileInputFilesParams::builder()
                .files(files)
                .backend_node_id(element.backend_node_id)
                .build()
                .map_err(ProbeError::input)?;
            self.page
                .execute(params)
                .await
                .map_err(|e| ProbeError::input(e.to_string()))?;
            Ok(())
        }

        async fn click(&mut self, locator: &Locator) -> ProbeResult<()> {
            debug!(selector = %locator, "click");
            let element = self.element(locator).await?;
            element
                .click()
                .await
                .map_err(|e| ProbeError::input(e.to_string()))?;
            Ok(())
        }

        async fn inner_text(&mut self, locator: &Locator) -> ProbeResult<String> {
            let element = self.element(locator).await?;
            let text = element
                .inner_text()
                .await
                .map_err(|e| ProbeError::page(e.to_string()))?;
            Ok(text.unwrap_or_default())
        }

        async fn close(&mut self) -> ProbeResult<()> {
            if self.closed {
                return Ok(());
            }
            self.closed = true;
            let closed = shutdown(&mut self.browser, &self.handle).await;
            debug!("browser closed");
            closed
        }
    }

}

#[cfg(feature = "browser")]
pub use cdp::{ChromiumDriver, ChromiumLauncher};
