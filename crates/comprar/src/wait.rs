//! State-based wait mechanisms.
//!
//! Every wait here is a condition poll with a deadline: load states, URL
//! predicates, element states. The suite carries no fixed-duration waits;
//! the only sleeping is the poll interval between condition checks.

use std::time::{Duration, Instant};

use crate::driver::Driver;
use crate::locator::{resolve, LocatorSpec, ResolvedElement};
use crate::result::{ComprarError, ComprarResult};

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadState {
    /// The `load` event has fired
    Load,
    /// The `DOMContentLoaded` event has fired
    DomContentLoaded,
    /// No network activity for a settling interval
    NetworkIdle,
}

impl LoadState {
    /// Event name as the page reports it
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "domcontentloaded",
            Self::NetworkIdle => "networkidle",
        }
    }
}

impl Default for LoadState {
    fn default() -> Self {
        Self::Load
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

/// Element states a wait can require; disappearance is [`wait_for_hidden`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    /// Present in the page tree
    Attached,
    /// Present and visible
    Visible,
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Attached => "attached",
            Self::Visible => "visible",
        };
        write!(f, "{s}")
    }
}

/// Options for wait operations
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Poll interval as a [`Duration`]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// URL predicate for navigation waits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern),
            Self::Contains(pattern) => url.contains(pattern),
            Self::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(url))
                .unwrap_or(false),
            Self::Any => true,
        }
    }
}

impl std::fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(p) => write!(f, "url == {p}"),
            Self::Prefix(p) => write!(f, "url starting with {p}"),
            Self::Contains(p) => write!(f, "url containing {p}"),
            Self::Regex(p) => write!(f, "url matching /{p}/"),
            Self::Any => write!(f, "any url"),
        }
    }
}

/// Wait until the element resolves attached or visible.
///
/// Re-resolves the spec on every poll: the page may re-render between
/// checks, and a handle from an earlier snapshot would be stale. For
/// disappearance use [`wait_for_hidden`].
///
/// # Errors
///
/// Returns [`ComprarError::Timeout`] if the state is not reached before the
/// deadline. Driver failures other than `ElementNotFound` propagate
/// immediately.
pub async fn wait_for_element<D: Driver>(
    driver: &D,
    spec: &LocatorSpec,
    state: ElementState,
    options: &WaitOptions,
) -> ComprarResult<ResolvedElement> {
    let start = Instant::now();
    loop {
        match resolve(spec, driver).await {
            Ok(resolved) => match state {
                ElementState::Attached => return Ok(resolved),
                ElementState::Visible => {
                    if driver.is_visible(&resolved.handle).await? {
                        return Ok(resolved);
                    }
                }
            },
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }

        if start.elapsed() >= options.timeout() {
            return Err(ComprarError::Timeout {
                ms: options.timeout_ms,
                waiting_for: format!("'{}' to be {state}", spec.role()),
            });
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// Wait until the element is absent from the page or not visible.
///
/// # Errors
///
/// Returns [`ComprarError::Timeout`] if the element is still visible at the
/// deadline.
pub async fn wait_for_hidden<D: Driver>(
    driver: &D,
    spec: &LocatorSpec,
    options: &WaitOptions,
) -> ComprarResult<()> {
    let start = Instant::now();
    loop {
        match resolve(spec, driver).await {
            Ok(resolved) => {
                if !driver.is_visible(&resolved.handle).await? {
                    return Ok(());
                }
            }
            Err(err) if err.is_not_found() => return Ok(()),
            Err(err) => return Err(err),
        }

        if start.elapsed() >= options.timeout() {
            return Err(ComprarError::Timeout {
                ms: options.timeout_ms,
                waiting_for: format!("'{}' to be hidden", spec.role()),
            });
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// Wait until the page URL satisfies the pattern.
///
/// # Errors
///
/// Returns [`ComprarError::Timeout`] if no matching URL is observed before
/// the deadline.
pub async fn wait_for_url<D: Driver>(
    driver: &D,
    pattern: &UrlPattern,
    options: &WaitOptions,
) -> ComprarResult<()> {
    let start = Instant::now();
    loop {
        let url = driver.current_url().await?;
        if pattern.matches(&url) {
            return Ok(());
        }
        if start.elapsed() >= options.timeout() {
            return Err(ComprarError::Timeout {
                ms: options.timeout_ms,
                waiting_for: pattern.to_string(),
            });
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}
