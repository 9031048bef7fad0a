//! Page objects for the storefront under test.
//!
//! Each page holds the locator specs for its logical UI targets and exposes
//! named actions over a [`Driver`]. Actions follow one shape: wait for the
//! target to be actionable, then interact; waiting is always state-based.

mod login;
mod storefront;

pub use login::{LoginPage, DASHBOARD_FRAGMENT, SSO_URL};
pub use storefront::{BillingDetails, StorefrontPage, ORDER_CONFIRMATION_TEXT};

use crate::driver::Driver;
use crate::locator::LocatorSpec;
use crate::result::ComprarResult;
use crate::wait::{wait_for_element, ElementState, WaitOptions};

/// Wait for the target to be visible, scroll to it, and click it.
pub(crate) async fn click_target<D: Driver>(
    driver: &D,
    spec: &LocatorSpec,
    options: &WaitOptions,
) -> ComprarResult<()> {
    let resolved = wait_for_element(driver, spec, ElementState::Visible, options).await?;
    driver.scroll_into_view(&resolved.handle).await?;
    tracing::debug!(role = spec.role(), strategy = resolved.strategy_index, "click");
    driver.click(&resolved.handle).await
}

/// Wait for the target to be visible and fill it with text.
pub(crate) async fn fill_target<D: Driver>(
    driver: &D,
    spec: &LocatorSpec,
    text: &str,
    options: &WaitOptions,
) -> ComprarResult<()> {
    let resolved = wait_for_element(driver, spec, ElementState::Visible, options).await?;
    driver.fill(&resolved.handle, text).await
}
