//! Comprar: Rust-native end-to-end test suite for a WooCommerce storefront.
//!
//! Drives the storefront through login, product browsing, checkout, and
//! order-viewing flows over the Chrome DevTools Protocol.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    COMPRAR Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Flows      │    │ Page       │    │ Headless   │            │
//! │   │ (Rust)     │───►│ Objects +  │───►│ Browser    │            │
//! │   │            │    │ Resolver   │    │ (chromium) │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The structural core is the resilient locator resolver in [`mod@locator`]:
//! each logical UI target carries an ordered fallback chain of selector
//! strategies, and the first strategy matching a live element wins. Page
//! objects in [`pages`] are thin declarations of those chains plus action
//! sequencing; [`flows`] strings the actions into the end-to-end scenarios.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod config;
mod driver;
mod harness;
mod logging;
mod reporter;
mod result;
mod session;

/// Resilient locator resolution (the core abstraction)
pub mod locator;

/// Chromium control over CDP (`browser` feature)
pub mod browser;

/// End-to-end flow sequences
pub mod flows;

/// Page objects for the storefront under test
pub mod pages;

/// State-based wait mechanisms
pub mod wait;

pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::CdpDriver;
pub use config::SuiteConfig;
pub use driver::{BoundingBox, Driver, ElementHandle, MockDriver, MockElement, MockPage};
pub use harness::{run_case, TestCase, TestResult, DEFAULT_CASE_TIMEOUT_MS};
pub use locator::{
    resolve, ElementSource, LocatorSpec, Pick, ResolvedElement, Strategy,
};
pub use logging::try_init_logging;
pub use pages::{
    BillingDetails, LoginPage, StorefrontPage, DASHBOARD_FRAGMENT, ORDER_CONFIRMATION_TEXT,
    SSO_URL,
};
pub use reporter::{Reporter, TestResultEntry, TestStatus};
pub use result::{ComprarError, ComprarResult};
pub use session::{Cookie, SameSite, StorageState};
pub use wait::{
    wait_for_element, wait_for_hidden, wait_for_url, ElementState, LoadState, UrlPattern,
    WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};
