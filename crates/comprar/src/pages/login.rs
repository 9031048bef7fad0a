//! SSO login page.
//!
//! The storefront authenticates through a two-step WordPress.com SSO: fill
//! credentials and Continue, then confirm on the Log In screen. The sequence
//! ends when the browser lands back on the dashboard and session cookies are
//! set; both are awaited as states, not timed.

use std::time::Instant;

use crate::config::SuiteConfig;
use crate::driver::Driver;
use crate::locator::{resolve, LocatorSpec, Strategy};
use crate::pages::{click_target, fill_target};
use crate::result::{ComprarError, ComprarResult};
use crate::session::StorageState;
use crate::wait::{wait_for_url, LoadState, UrlPattern, WaitOptions};

/// SSO entry point
pub const SSO_URL: &str = "https://woocommerce.com/sso";

/// Path fragment of the post-login landing page
pub const DASHBOARD_FRAGMENT: &str = "my-dashboard";

/// Page object for the SSO login sequence.
#[derive(Debug, Clone)]
pub struct LoginPage {
    email_input: LocatorSpec,
    password_input: LocatorSpec,
    continue_button: LocatorSpec,
    log_in_button: LocatorSpec,
    login_control: LocatorSpec,
    action: WaitOptions,
    navigation: WaitOptions,
}

impl LoginPage {
    /// Build the page's locator specs from suite timeouts.
    #[must_use]
    pub fn new(config: &SuiteConfig) -> Self {
        Self {
            email_input: LocatorSpec::new("email input", Strategy::css("input[name=\"email\"]"))
                .or(Strategy::css("input[type=\"email\"]"))
                .or(Strategy::css("input[id=\"usernameOrEmail\"]")),
            password_input: LocatorSpec::new(
                "password input",
                Strategy::css("input[name=\"password\"]"),
            )
            .or(Strategy::css("input[type=\"password\"]"))
            .or(Strategy::css("input[id=\"password\"]")),
            continue_button: LocatorSpec::new(
                "continue button",
                Strategy::css_with_text("button[type=\"submit\"]", "Continue"),
            )
            .or(Strategy::role("button", "continue")),
            log_in_button: LocatorSpec::new(
                "log in button",
                Strategy::role("button", "log in"),
            )
            .or(Strategy::css_with_text("button", "Log In")),
            login_control: LocatorSpec::new("login control", Strategy::test_id("login-button"))
                .or(Strategy::role("link", "log in")),
            action: WaitOptions::new().with_timeout(config.default_timeout_ms),
            navigation: WaitOptions::new().with_timeout(config.navigation_timeout_ms),
        }
    }

    /// Run the full sign-in sequence and return the authenticated storage
    /// state.
    ///
    /// # Errors
    ///
    /// Fails with `Config` when credentials are missing, otherwise with the
    /// underlying resolution, wait, or navigation error.
    pub async fn sign_in<D: Driver>(
        &self,
        driver: &D,
        config: &SuiteConfig,
    ) -> ComprarResult<StorageState> {
        if !config.has_credentials() {
            return Err(ComprarError::Config {
                message: "TEST_USERNAME and TEST_PASSWORD must be set for the login flow"
                    .to_string(),
            });
        }

        tracing::info!(url = SSO_URL, "authenticating");
        driver.navigate(SSO_URL).await?;

        fill_target(driver, &self.email_input, &config.username, &self.action).await?;
        fill_target(driver, &self.password_input, &config.password, &self.action).await?;
        click_target(driver, &self.continue_button, &self.action).await?;

        driver
            .wait_for_load_state(LoadState::NetworkIdle, &self.navigation)
            .await?;
        click_target(driver, &self.log_in_button, &self.action).await?;

        wait_for_url(
            driver,
            &UrlPattern::Contains(DASHBOARD_FRAGMENT.to_string()),
            &self.navigation,
        )
        .await?;
        driver
            .wait_for_load_state(LoadState::DomContentLoaded, &self.navigation)
            .await?;

        let state = self.wait_for_session_cookies(driver).await?;
        tracing::info!(cookies = state.cookies.len(), "authentication succeeded");
        Ok(state)
    }

    /// Whether the unauthenticated login control is visible.
    ///
    /// An authenticated context shows no login control at all; absence
    /// counts as not visible rather than an error.
    pub async fn is_login_visible<D: Driver>(&self, driver: &D) -> ComprarResult<bool> {
        match resolve(&self.login_control, driver).await {
            Ok(resolved) => driver.is_visible(&resolved.handle).await,
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Poll until the context carries session cookies.
    ///
    /// The dashboard renders before its cookies settle; waiting on the
    /// cookie state replaces the fixed post-login delay the site otherwise
    /// needs.
    async fn wait_for_session_cookies<D: Driver>(&self, driver: &D) -> ComprarResult<StorageState> {
        let start = Instant::now();
        loop {
            let state = driver.storage_state().await?;
            if !state.cookies.is_empty() {
                return Ok(state);
            }
            if start.elapsed() >= self.action.timeout() {
                return Err(ComprarError::Timeout {
                    ms: self.action.timeout_ms,
                    waiting_for: "session cookies after login".to_string(),
                });
            }
            tokio::time::sleep(self.action.poll_interval()).await;
        }
    }
}
