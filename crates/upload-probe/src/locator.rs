//! Locator abstraction for the elements the upload page exposes.
//!
//! A locator names an element by CSS selector. An element is ready once it is
//! rendered with a non-empty box. Drivers that talk to a real browser turn
//! locators into JavaScript probes; scripted drivers match on the selector
//! text.

use crate::result::{ProbeError, ProbeResult};
use std::fmt;
use std::time::{Duration, Instant};

/// Default polling interval for waits (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// CSS selector for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector(String);

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    /// CSS form of the selector, usable with `querySelector`
    #[must_use]
    pub fn as_css(&self) -> String {
        self.0.clone()
    }

    /// JavaScript expression yielding the first matching element (or null)
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("document.querySelector({:?})", self.0)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named element on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: Selector::css(selector),
        }
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// JavaScript expression that evaluates to `true` once the element is
    /// present, not hidden, and has a non-empty box
    #[must_use]
    pub fn to_ready_probe(&self) -> String {
        let query = self.selector.to_query();
        format!(
            "(() => {{ const el = {query}; if (!el) return false; \
             const style = window.getComputedStyle(el); \
             if (style.visibility === 'hidden' || style.display === 'none') return false; \
             const r = el.getBoundingClientRect(); \
             return r.width > 0 && r.height > 0; }})()"
        )
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.selector.fmt(f)
    }
}

/// Next move of a readiness wait
#[derive(Debug)]
pub enum PollStep {
    /// The element is ready
    Ready,
    /// Sleep one interval and probe again
    Retry,
    /// The deadline passed
    TimedOut(ProbeError),
}

/// Deadline bookkeeping for polling a locator's readiness probe
///
/// A failed probe counts as "not ready yet": evaluation errors while the page
/// navigates after a submit are retried until the deadline, and the last one
/// is reported with the timeout.
#[derive(Debug)]
pub struct ReadinessPoll {
    selector: String,
    timeout: Duration,
    deadline: Instant,
    last_error: Option<String>,
}

impl ReadinessPoll {
    /// Start waiting for `locator` at `start`
    #[must_use]
    pub fn new(locator: &Locator, timeout: Duration, start: Instant) -> Self {
        Self {
            selector: locator.to_string(),
            timeout,
            deadline: start + timeout,
            last_error: None,
        }
    }

    /// Record one probe result observed at `now`
    pub fn observe(&mut self, probe: ProbeResult<bool>, now: Instant) -> PollStep {
        match probe {
            Ok(true) => return PollStep::Ready,
            Ok(false) => {}
            Err(e) => self.last_error = Some(e.to_string()),
        }
        if now >= self.deadline {
            PollStep::TimedOut(ProbeError::timeout(
                self.selector.clone(),
                self.timeout,
                self.last_error.take(),
            ))
        } else {
            PollStep::Retry
        }
    }
}
