//! Storefront page object: navigation, cart, checkout, and orders.
//!
//! Every locator is a healing-fallback chain: the first strategy anchors on
//! the most stable markup (tracking keys, aria attributes, exact text), the
//! later ones progressively relax toward role and substring queries so the
//! suite survives markup drift.

use crate::config::SuiteConfig;
use crate::driver::Driver;
use crate::locator::{LocatorSpec, Strategy};
use crate::pages::{click_target, fill_target};
use crate::result::{ComprarError, ComprarResult};
use crate::wait::{wait_for_element, ElementState, LoadState, WaitOptions};

/// Confirmation heading shown after a completed order
pub const ORDER_CONFIRMATION_TEXT: &str = "Thanks for your order!";

/// Billing details for the checkout form.
#[derive(Debug, Clone, Default)]
pub struct BillingDetails {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Street address
    pub street_address: String,
    /// Town or city
    pub town_city: String,
    /// District dropdown option
    pub district: String,
    /// Product-usage dropdown option
    pub product_usage: String,
}

/// Page object for the authenticated storefront.
#[derive(Debug, Clone)]
pub struct StorefrontPage {
    base_url: String,
    extensions_button: LocatorSpec,
    free_filter: LocatorSpec,
    woopayments_link: LocatorSpec,
    add_to_cart_button: LocatorSpec,
    cart_popover: LocatorSpec,
    cart_icon: LocatorSpec,
    proceed_to_checkout: LocatorSpec,
    first_name_input: LocatorSpec,
    last_name_input: LocatorSpec,
    street_address_input: LocatorSpec,
    town_city_input: LocatorSpec,
    district_dropdown: LocatorSpec,
    product_use_dropdown: LocatorSpec,
    place_order_button: LocatorSpec,
    order_success_heading: LocatorSpec,
    orders_link: LocatorSpec,
    first_view_button: LocatorSpec,
    action: WaitOptions,
    navigation: WaitOptions,
}

impl StorefrontPage {
    /// Build the page's locator specs from suite configuration.
    #[must_use]
    pub fn new(config: &SuiteConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            extensions_button: LocatorSpec::new(
                "extensions button",
                Strategy::xpath("//button[@data-tracks-key=\"extensions\"]//span"),
            )
            .or(Strategy::css("button[data-tracks-key=\"extensions\"] span"))
            .or(Strategy::role("button", "extensions")),
            free_filter: LocatorSpec::new(
                "free filter",
                Strategy::xpath("//a[@data-tracks-key=\"free\"]"),
            )
            .or(Strategy::css("a[data-tracks-key=\"free\"]"))
            .or(Strategy::role("link", "free")),
            woopayments_link: LocatorSpec::new(
                "woopayments link",
                Strategy::xpath("//a[normalize-space(text())=\"WooPayments\"]"),
            )
            .or(Strategy::role("link", "WooPayments"))
            .or(Strategy::attr_contains("href", "woopayments")),
            // Second "Add to Cart" on the product page is the purchasable
            // variant; the first belongs to the sticky header.
            add_to_cart_button: LocatorSpec::new(
                "add to cart button",
                Strategy::xpath("//a[@aria-controls=\"cart-added-popover\"]"),
            )
            .or(Strategy::css("a[aria-controls=\"cart-added-popover\"]"))
            .or(Strategy::role("link", "add to cart"))
            .nth(1),
            cart_popover: LocatorSpec::new(
                "cart added popover",
                Strategy::css("#cart-added-popover"),
            )
            .or(Strategy::test_id("cart-added-popover")),
            cart_icon: LocatorSpec::new(
                "cart icon",
                Strategy::xpath("//a[@data-tracks-placement=\"header-cart\"]"),
            )
            .or(Strategy::css("a[data-tracks-placement=\"header-cart\"]"))
            .or(Strategy::test_id("cart-icon")),
            proceed_to_checkout: LocatorSpec::new(
                "proceed to checkout",
                Strategy::xpath("//div[normalize-space(text())=\"Proceed to Checkout\"]"),
            )
            .or(Strategy::role("link", "proceed to checkout"))
            .or(Strategy::css_with_text("a", "Proceed to checkout"))
            .or(Strategy::css_with_text("button", "Proceed to checkout")),
            first_name_input: LocatorSpec::new(
                "first name input",
                Strategy::xpath("//label[contains(.,\"First name *\")]/following::input[1]"),
            )
            .or(Strategy::css("input[name=\"firstName\"]"))
            .or(Strategy::css("input#billing_first_name")),
            last_name_input: LocatorSpec::new(
                "last name input",
                Strategy::xpath("//label[contains(.,\"Last name *\")]/following::input[1]"),
            )
            .or(Strategy::css("input[name=\"lastName\"]"))
            .or(Strategy::css("input#billing_last_name")),
            street_address_input: LocatorSpec::new(
                "street address input",
                Strategy::xpath("//label[contains(.,\"Street address *\")]/following::input[1]"),
            )
            .or(Strategy::css("input[name=\"streetAddress\"]"))
            .or(Strategy::css("input#billing_address_1")),
            town_city_input: LocatorSpec::new(
                "town/city input",
                Strategy::xpath("//label[contains(.,\"Town / City *\")]/following::input[1]"),
            )
            .or(Strategy::css("input[name=\"city\"]"))
            .or(Strategy::css("input#billing_city")),
            district_dropdown: LocatorSpec::new(
                "district dropdown",
                Strategy::xpath("//span[@aria-label=\"District\"]"),
            )
            .or(Strategy::css("span[aria-label=\"District\"]"))
            .or(Strategy::test_id("district-dropdown")),
            // Third combobox on the checkout page selects product usage.
            product_use_dropdown: LocatorSpec::new(
                "product use dropdown",
                Strategy::xpath("//span[@role=\"combobox\"]"),
            )
            .or(Strategy::css("span[role=\"combobox\"]"))
            .nth(2),
            place_order_button: LocatorSpec::new(
                "place order button",
                Strategy::xpath("//button[normalize-space(text())=\"Place free order\"]"),
            )
            .or(Strategy::xpath("//div[@class=\"form-row place-order\"]//button[1]"))
            .or(Strategy::role("button", "place free order"))
            .or(Strategy::css_with_text("button", "Place free order")),
            order_success_heading: LocatorSpec::new(
                "order confirmation heading",
                Strategy::xpath("//h1[normalize-space(text())=\"Thanks for your order!\"]"),
            )
            .or(Strategy::role("heading", "thanks for your order"))
            .or(Strategy::test_id("order-success")),
            orders_link: LocatorSpec::new("orders link", Strategy::role("link", "Orders"))
                .or(Strategy::attr_contains("href", "/my-account/orders"))
                .or(Strategy::xpath("//span[normalize-space(text())=\"Orders\"]/..")),
            first_view_button: LocatorSpec::new(
                "first view button",
                Strategy::xpath("//a[contains(@class,\"wccom-button view\")]"),
            )
            .or(Strategy::css("a.wccom-button.view"))
            .or(Strategy::role("link", "View")),
            action: WaitOptions::new().with_timeout(config.default_timeout_ms),
            navigation: WaitOptions::new().with_timeout(config.navigation_timeout_ms),
        }
    }

    /// Navigate to the storefront root and wait for it to settle.
    pub async fn open<D: Driver>(&self, driver: &D) -> ComprarResult<()> {
        driver.navigate(&self.base_url).await?;
        driver
            .wait_for_load_state(LoadState::NetworkIdle, &self.navigation)
            .await
    }

    /// Open the Extensions marketplace.
    pub async fn click_extensions<D: Driver>(&self, driver: &D) -> ComprarResult<()> {
        click_target(driver, &self.extensions_button, &self.action).await?;
        self.settle(driver).await
    }

    /// Filter the marketplace to free extensions.
    pub async fn click_free_filter<D: Driver>(&self, driver: &D) -> ComprarResult<()> {
        click_target(driver, &self.free_filter, &self.action).await?;
        self.settle(driver).await
    }

    /// Open the WooPayments product page.
    pub async fn open_woopayments<D: Driver>(&self, driver: &D) -> ComprarResult<()> {
        click_target(driver, &self.woopayments_link, &self.action).await?;
        self.settle(driver).await
    }

    /// Add the product to the cart and wait for the cart popover to appear.
    pub async fn add_to_cart<D: Driver>(&self, driver: &D) -> ComprarResult<()> {
        click_target(driver, &self.add_to_cart_button, &self.action).await?;
        wait_for_element(driver, &self.cart_popover, ElementState::Visible, &self.action)
            .await?;
        Ok(())
    }

    /// Open the cart via the header icon.
    pub async fn open_cart<D: Driver>(&self, driver: &D) -> ComprarResult<()> {
        click_target(driver, &self.cart_icon, &self.action).await?;
        self.settle(driver).await
    }

    /// Proceed from the cart to the checkout page.
    pub async fn proceed_to_checkout<D: Driver>(&self, driver: &D) -> ComprarResult<()> {
        click_target(driver, &self.proceed_to_checkout, &self.action).await?;
        self.settle(driver).await
    }

    /// Whether the billing address is pre-filled: the place-order button is
    /// already actionable without filling the form.
    pub async fn billing_prefilled<D: Driver>(&self, driver: &D) -> ComprarResult<bool> {
        let probe = WaitOptions::new()
            .with_timeout(5_000.min(self.action.timeout_ms))
            .with_poll_interval(self.action.poll_interval_ms);
        match wait_for_element(driver, &self.place_order_button, ElementState::Visible, &probe)
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if err.is_timeout() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Fill the billing form fields.
    pub async fn fill_billing<D: Driver>(
        &self,
        driver: &D,
        details: &BillingDetails,
    ) -> ComprarResult<()> {
        fill_target(driver, &self.first_name_input, &details.first_name, &self.action).await?;
        fill_target(driver, &self.last_name_input, &details.last_name, &self.action).await?;
        fill_target(
            driver,
            &self.street_address_input,
            &details.street_address,
            &self.action,
        )
        .await?;
        fill_target(driver, &self.town_city_input, &details.town_city, &self.action).await
    }

    /// Select a district from the dropdown.
    pub async fn select_district<D: Driver>(&self, driver: &D, district: &str) -> ComprarResult<()> {
        click_target(driver, &self.district_dropdown, &self.action).await?;
        let option = Self::dropdown_option("district option", district);
        click_target(driver, &option, &self.action).await
    }

    /// Select the product-usage answer from the dropdown.
    pub async fn select_product_usage<D: Driver>(
        &self,
        driver: &D,
        usage: &str,
    ) -> ComprarResult<()> {
        click_target(driver, &self.product_use_dropdown, &self.action).await?;
        let option = Self::dropdown_option("product use option", usage);
        click_target(driver, &option, &self.action).await
    }

    /// Click the place-order button.
    pub async fn place_order<D: Driver>(&self, driver: &D) -> ComprarResult<()> {
        click_target(driver, &self.place_order_button, &self.action).await
    }

    /// Wait for the confirmation heading and verify its text.
    pub async fn verify_order_confirmation<D: Driver>(&self, driver: &D) -> ComprarResult<()> {
        let resolved = wait_for_element(
            driver,
            &self.order_success_heading,
            ElementState::Visible,
            &self.navigation,
        )
        .await?;
        let text = resolved.handle.text_content.unwrap_or_default();
        if text.contains(ORDER_CONFIRMATION_TEXT) {
            Ok(())
        } else {
            Err(ComprarError::Assertion {
                message: format!(
                    "order confirmation heading reads '{text}', expected '{ORDER_CONFIRMATION_TEXT}'"
                ),
            })
        }
    }

    /// Whether the confirmation heading is currently visible.
    pub async fn is_order_success_visible<D: Driver>(&self, driver: &D) -> ComprarResult<bool> {
        match crate::locator::resolve(&self.order_success_heading, driver).await {
            Ok(resolved) => driver.is_visible(&resolved.handle).await,
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Open the Orders view from the account navigation.
    ///
    /// The link renders before it is interactable, so attachment is awaited
    /// first, matching the click-when-attached behavior the site needs.
    pub async fn open_orders<D: Driver>(&self, driver: &D) -> ComprarResult<()> {
        let probe = WaitOptions::new()
            .with_timeout(10_000.min(self.action.timeout_ms))
            .with_poll_interval(self.action.poll_interval_ms);
        let resolved =
            wait_for_element(driver, &self.orders_link, ElementState::Attached, &probe).await?;
        driver.click(&resolved.handle).await?;
        self.settle(driver).await
    }

    /// Open the first order's detail view.
    pub async fn view_first_order<D: Driver>(&self, driver: &D) -> ComprarResult<()> {
        click_target(driver, &self.first_view_button, &self.action).await?;
        self.settle(driver).await
    }

    async fn settle<D: Driver>(&self, driver: &D) -> ComprarResult<()> {
        driver
            .wait_for_load_state(LoadState::DomContentLoaded, &self.navigation)
            .await
    }

    fn dropdown_option(role: &str, text: &str) -> LocatorSpec {
        LocatorSpec::new(
            role,
            Strategy::xpath(format!("//li[normalize-space(text())=\"{text}\"]")),
        )
        .or(Strategy::css_with_text("li", text))
        .or(Strategy::css_with_text("option", text))
    }
}
