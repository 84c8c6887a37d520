//! One upload-and-observe cycle in its own browser context.

use crate::driver::{BrowserLauncher, UploadDriver};
use crate::page_object::UploadPage;
use crate::result::ProbeResult;
use crate::upload::UploadResult;
use std::path::Path;
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

/// Runs the page model through open → upload → read for a single file
#[derive(Debug, Clone)]
pub struct UploadWorkflow<L> {
    launcher: L,
    page: UploadPage,
}

impl<L: BrowserLauncher> UploadWorkflow<L> {
    /// Create a workflow from a launcher and page model
    #[must_use]
    pub const fn new(launcher: L, page: UploadPage) -> Self {
        Self { launcher, page }
    }

    /// Get the launcher
    #[must_use]
    pub const fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Get the page model
    #[must_use]
    pub const fn page(&self) -> &UploadPage {
        &self.page
    }

    /// Upload `csv_path` in a fresh browser context and parse the response
    ///
    /// The context is closed before returning on every path. A failure while
    /// driving the page wins over a failure while closing; the latter is only
    /// logged in that case.
    pub async fn run(&self, csv_path: &Path) -> ProbeResult<UploadResult> {
        let session = Uuid::new_v4();
        let span = tracing::info_span!("upload", %session, file = %csv_path.display());
        async move {
            let mut driver = self.launcher.launch().await?;
            let raw = self.drive(&mut driver, csv_path).await;
            let closed = driver.close().await;

            let raw = match (raw, closed) {
                (Ok(raw), Ok(())) => raw,
                (Ok(_), Err(close_err)) => return Err(close_err),
                (Err(e), Ok(())) => return Err(e),
                (Err(e), Err(close_err)) => {
                    warn!(error = %close_err, "browser context did not close cleanly");
                    return Err(e);
                }
            };
            debug!(bytes = raw.len(), "result read");
            UploadResult::parse(&raw)
        }
        .instrument(span)
        .await
    }

    async fn drive(&self, driver: &mut L::Driver, csv_path: &Path) -> ProbeResult<String> {
        self.page.open(driver).await?;
        self.page.upload(driver, csv_path).await?;
        self.page.read_result(driver).await
    }
}
