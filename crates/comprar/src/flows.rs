//! End-to-end flow sequences.
//!
//! Each flow owns the ordering of page-object actions for one scenario and
//! nothing else; element targeting lives in the page objects, waiting policy
//! in [`crate::wait`].

use crate::config::SuiteConfig;
use crate::driver::Driver;
use crate::pages::{BillingDetails, LoginPage, StorefrontPage};
use crate::result::ComprarResult;
use crate::session::StorageState;

/// Run the SSO login sequence and persist the session artifact.
///
/// Later runs call [`restore_session`] instead and skip this entirely.
pub async fn authenticate<D: Driver>(
    driver: &D,
    config: &SuiteConfig,
) -> ComprarResult<StorageState> {
    let login = LoginPage::new(config);
    let state = login.sign_in(driver, config).await?;
    state.save(&config.session_file)?;
    Ok(state)
}

/// Apply a previously persisted session artifact, if one exists.
///
/// Returns whether a stored session was applied.
pub async fn restore_session<D: Driver>(
    driver: &D,
    config: &SuiteConfig,
) -> ComprarResult<bool> {
    match StorageState::load_if_present(&config.session_file)? {
        Some(state) if !state.is_empty() => {
            driver.apply_storage_state(&state).await?;
            tracing::info!(path = %config.session_file.display(), "session restored");
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Browse from the storefront root to WooPayments and complete a free-order
/// checkout, ending on the confirmation view.
///
/// The billing form is only filled when the address is not pre-filled from
/// the account profile.
pub async fn checkout_free_extension<D: Driver>(
    driver: &D,
    page: &StorefrontPage,
    billing: &BillingDetails,
) -> ComprarResult<()> {
    page.open(driver).await?;
    tracing::info!("storefront opened");

    page.click_extensions(driver).await?;
    page.click_free_filter(driver).await?;
    page.open_woopayments(driver).await?;
    page.add_to_cart(driver).await?;
    tracing::info!("product in cart");

    page.open_cart(driver).await?;
    page.proceed_to_checkout(driver).await?;

    if page.billing_prefilled(driver).await? {
        tracing::info!("billing address pre-filled, skipping form");
    } else {
        page.fill_billing(driver, billing).await?;
        page.select_district(driver, &billing.district).await?;
        page.select_product_usage(driver, &billing.product_usage).await?;
    }

    page.place_order(driver).await?;
    page.verify_order_confirmation(driver).await?;
    tracing::info!("order confirmed");
    Ok(())
}

/// Open the Orders view and the first order's details.
pub async fn view_first_order<D: Driver>(
    driver: &D,
    page: &StorefrontPage,
) -> ComprarResult<()> {
    page.open(driver).await?;
    page.open_orders(driver).await?;
    page.view_first_order(driver).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement, MockPage};
    use crate::locator::Strategy;
    use crate::session::Cookie;

    fn config(session_file: std::path::PathBuf) -> SuiteConfig {
        SuiteConfig::default()
            .with_base_url("https://shop.test/")
            .with_credentials("qa@example.com", "hunter2")
            .with_session_file(session_file)
            .with_default_timeout(200)
    }

    /// Scripted storefront covering the whole checkout path with the
    /// billing form present (no pre-filled address).
    fn storefront_driver() -> MockDriver {
        MockDriver::new()
            .with_page(
                MockPage::new("home", "https://shop.test/").with_element(
                    MockElement::new("ext", "button")
                        .matched_by(Strategy::css("button[data-tracks-key=\"extensions\"] span"))
                        .with_text("Extensions")
                        .navigates_to("extensions"),
                ),
            )
            .with_page(
                MockPage::new("extensions", "https://shop.test/extensions").with_element(
                    MockElement::new("free", "a")
                        .matched_by(Strategy::css("a[data-tracks-key=\"free\"]"))
                        .with_text("Free")
                        .navigates_to("free"),
                ),
            )
            .with_page(
                MockPage::new("free", "https://shop.test/extensions/free").with_element(
                    MockElement::new("woopayments", "a")
                        .matched_by(Strategy::role("link", "WooPayments"))
                        .with_text("WooPayments")
                        .navigates_to("product"),
                ),
            )
            .with_page(
                MockPage::new("product", "https://shop.test/products/woopayments")
                    .with_element(
                        MockElement::new("header-add", "a")
                            .matched_by(Strategy::css("a[aria-controls=\"cart-added-popover\"]"))
                            .with_text("Add to Cart"),
                    )
                    .with_element(
                        MockElement::new("main-add", "a")
                            .matched_by(Strategy::css("a[aria-controls=\"cart-added-popover\"]"))
                            .with_text("Add to Cart")
                            .navigates_to("product-carted"),
                    ),
            )
            .with_page(
                MockPage::new("product-carted", "https://shop.test/products/woopayments")
                    .with_element(
                        MockElement::new("popover", "div")
                            .matched_by(Strategy::css("#cart-added-popover"))
                            .with_text("WooPayments was added to your cart"),
                    )
                    .with_element(
                        MockElement::new("cart", "a")
                            .matched_by(Strategy::css("a[data-tracks-placement=\"header-cart\"]"))
                            .navigates_to("cart"),
                    ),
            )
            .with_page(
                MockPage::new("cart", "https://shop.test/cart").with_element(
                    MockElement::new("to-checkout", "a")
                        .matched_by(Strategy::css_with_text("a", "Proceed to checkout"))
                        .with_text("Proceed to checkout")
                        .navigates_to("checkout"),
                ),
            )
            .with_page(
                MockPage::new("checkout", "https://shop.test/checkout")
                    .with_element(
                        MockElement::new("fn", "input")
                            .matched_by(Strategy::css("input[name=\"firstName\"]")),
                    )
                    .with_element(
                        MockElement::new("ln", "input")
                            .matched_by(Strategy::css("input[name=\"lastName\"]")),
                    )
                    .with_element(
                        MockElement::new("street", "input")
                            .matched_by(Strategy::css("input[name=\"streetAddress\"]")),
                    )
                    .with_element(
                        MockElement::new("city", "input")
                            .matched_by(Strategy::css("input[name=\"city\"]")),
                    )
                    .with_element(
                        MockElement::new("district", "span")
                            .matched_by(Strategy::css("span[aria-label=\"District\"]"))
                            .navigates_to("checkout-district-open"),
                    ),
            )
            .with_page(
                MockPage::new("checkout-district-open", "https://shop.test/checkout")
                    .with_element(
                        MockElement::new("district-option", "li")
                            .matched_by(Strategy::css_with_text("li", "Bagerhat"))
                            .with_text("Bagerhat")
                            .navigates_to("checkout-usage"),
                    ),
            )
            .with_page(
                // Three comboboxes render on checkout; the product-usage
                // dropdown is the third.
                MockPage::new("checkout-usage", "https://shop.test/checkout")
                    .with_element(
                        MockElement::new("country", "span")
                            .matched_by(Strategy::css("span[role=\"combobox\"]")),
                    )
                    .with_element(
                        MockElement::new("state", "span")
                            .matched_by(Strategy::css("span[role=\"combobox\"]")),
                    )
                    .with_element(
                        MockElement::new("usage", "span")
                            .matched_by(Strategy::css("span[role=\"combobox\"]"))
                            .navigates_to("checkout-usage-open"),
                    ),
            )
            .with_page(
                MockPage::new("checkout-usage-open", "https://shop.test/checkout")
                    .with_element(
                        MockElement::new("usage-option", "li")
                            .matched_by(Strategy::css_with_text("li", "Other"))
                            .with_text("Other")
                            .navigates_to("checkout-ready"),
                    ),
            )
            .with_page(
                MockPage::new("checkout-ready", "https://shop.test/checkout").with_element(
                    MockElement::new("place-order", "button")
                        .matched_by(Strategy::css_with_text("button", "Place free order"))
                        .with_text("Place free order")
                        .navigates_to("confirmation"),
                ),
            )
            .with_page(
                MockPage::new("confirmation", "https://shop.test/checkout/order-received")
                    .with_element(
                        MockElement::new("heading", "h1")
                            .matched_by(Strategy::role("heading", "thanks for your order"))
                            .with_text("Thanks for your order!"),
                    ),
            )
    }

    mod checkout_tests {
        use super::*;

        #[tokio::test]
        async fn test_checkout_with_billing_form() {
            let dir = tempfile::tempdir().unwrap();
            let config = config(dir.path().join("auth.json"));
            let driver = storefront_driver();
            let page = StorefrontPage::new(&config);
            let billing = BillingDetails {
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                street_address: "123 Main Street".to_string(),
                town_city: "Dhaka".to_string(),
                district: "Bagerhat".to_string(),
                product_usage: "Other".to_string(),
            };

            checkout_free_extension(&driver, &page, &billing)
                .await
                .unwrap();

            assert_eq!(driver.current_page().as_deref(), Some("confirmation"));
            assert_eq!(driver.filled_value("fn").as_deref(), Some("John"));
            assert!(driver.was_called("click:main-add"));
            assert!(driver.was_called("click:place-order"));
        }

        #[tokio::test]
        async fn test_checkout_skips_form_when_prefilled() {
            // Checkout page already shows the place-order button.
            let dir = tempfile::tempdir().unwrap();
            let config = config(dir.path().join("auth.json"));
            let driver = MockDriver::new()
                .with_page(
                    MockPage::new("home", "https://shop.test/").with_element(
                        MockElement::new("ext", "button")
                            .matched_by(Strategy::css(
                                "button[data-tracks-key=\"extensions\"] span",
                            ))
                            .navigates_to("product"),
                    ),
                )
                .with_page(
                    MockPage::new("product", "https://shop.test/products/woopayments")
                        .with_element(
                            MockElement::new("free", "a")
                                .matched_by(Strategy::css("a[data-tracks-key=\"free\"]")),
                        )
                        .with_element(
                            MockElement::new("woopayments", "a")
                                .matched_by(Strategy::role("link", "WooPayments")),
                        )
                        .with_element(
                            MockElement::new("add", "a").matched_by(Strategy::css(
                                "a[aria-controls=\"cart-added-popover\"]",
                            )),
                        )
                        .with_element(
                            MockElement::new("add2", "a")
                                .matched_by(Strategy::css(
                                    "a[aria-controls=\"cart-added-popover\"]",
                                ))
                                .navigates_to("carted"),
                        ),
                )
                .with_page(
                    MockPage::new("carted", "https://shop.test/products/woopayments")
                        .with_element(
                            MockElement::new("popover", "div")
                                .matched_by(Strategy::css("#cart-added-popover")),
                        )
                        .with_element(
                            MockElement::new("cart", "a")
                                .matched_by(Strategy::css(
                                    "a[data-tracks-placement=\"header-cart\"]",
                                ))
                                .navigates_to("cart"),
                        ),
                )
                .with_page(
                    MockPage::new("cart", "https://shop.test/cart").with_element(
                        MockElement::new("to-checkout", "a")
                            .matched_by(Strategy::css_with_text("a", "Proceed to checkout"))
                            .with_text("Proceed to checkout")
                            .navigates_to("checkout"),
                    ),
                )
                .with_page(
                    MockPage::new("checkout", "https://shop.test/checkout").with_element(
                        MockElement::new("place-order", "button")
                            .matched_by(Strategy::css_with_text("button", "Place free order"))
                            .with_text("Place free order")
                            .navigates_to("confirmation"),
                    ),
                )
                .with_page(
                    MockPage::new("confirmation", "https://shop.test/checkout/order-received")
                        .with_element(
                            MockElement::new("heading", "h1")
                                .matched_by(Strategy::role("heading", "thanks for your order"))
                                .with_text("Thanks for your order!"),
                        ),
                );
            let page = StorefrontPage::new(&config);

            checkout_free_extension(&driver, &page, &BillingDetails::default())
                .await
                .unwrap();

            // No form fill happened.
            assert!(!driver.was_called("fill:"));
            assert_eq!(driver.current_page().as_deref(), Some("confirmation"));
        }
    }

    mod session_tests {
        use super::*;

        #[tokio::test]
        async fn test_authenticate_persists_artifact() {
            let dir = tempfile::tempdir().unwrap();
            let config = config(dir.path().join("auth").join("auth.json"));

            let driver = MockDriver::new()
                .with_page(
                    MockPage::new("sso", crate::pages::SSO_URL)
                        .with_element(
                            MockElement::new("email", "input")
                                .matched_by(Strategy::css("input[name=\"email\"]")),
                        )
                        .with_element(
                            MockElement::new("password", "input")
                                .matched_by(Strategy::css("input[type=\"password\"]")),
                        )
                        .with_element(
                            MockElement::new("continue", "button")
                                .matched_by(Strategy::css_with_text(
                                    "button[type=\"submit\"]",
                                    "Continue",
                                ))
                                .with_text("Continue")
                                .navigates_to("wpcom"),
                        ),
                )
                .with_page(
                    MockPage::new("wpcom", "https://wordpress.com/log-in").with_element(
                        MockElement::new("log-in", "button")
                            .matched_by(Strategy::role("button", "log in"))
                            .with_text("Log In")
                            .navigates_to("dashboard"),
                    ),
                )
                .with_page(
                    MockPage::new("dashboard", "https://woocommerce.com/my-dashboard")
                        .with_storage(StorageState::new().with_cookie(Cookie::new(
                            "wordpress_logged_in",
                            "token",
                            ".woocommerce.com",
                        ))),
                );

            let state = authenticate(&driver, &config).await.unwrap();
            assert!(state.has_cookie("wordpress_logged_in"));
            assert!(config.session_file.exists());

            // A fresh driver restores the artifact instead of logging in.
            let fresh = MockDriver::new()
                .with_page(MockPage::new("home", "https://shop.test/"));
            assert!(restore_session(&fresh, &config).await.unwrap());
            assert!(fresh
                .applied_storage()
                .unwrap()
                .has_cookie("wordpress_logged_in"));

            // And the restored context shows no login control.
            let login = LoginPage::new(&config);
            assert!(!login.is_login_visible(&fresh).await.unwrap());
        }

        #[tokio::test]
        async fn test_restore_session_without_artifact() {
            let dir = tempfile::tempdir().unwrap();
            let config = config(dir.path().join("missing.json"));
            let driver = MockDriver::new().with_page(MockPage::new("home", "https://shop.test/"));
            assert!(!restore_session(&driver, &config).await.unwrap());
        }
    }

    mod orders_tests {
        use super::*;

        #[tokio::test]
        async fn test_view_first_order() {
            let dir = tempfile::tempdir().unwrap();
            let config = config(dir.path().join("auth.json"));
            let driver = MockDriver::new()
                .with_page(
                    MockPage::new("home", "https://shop.test/").with_element(
                        MockElement::new("orders", "a")
                            .matched_by(Strategy::attr_contains("href", "/my-account/orders"))
                            .with_text("Orders")
                            .navigates_to("orders"),
                    ),
                )
                .with_page(
                    MockPage::new("orders", "https://shop.test/my-account/orders").with_element(
                        MockElement::new("view-1", "a")
                            .matched_by(Strategy::css("a.wccom-button.view"))
                            .with_text("View")
                            .navigates_to("order-detail"),
                    ),
                )
                .with_page(MockPage::new(
                    "order-detail",
                    "https://shop.test/my-account/orders/1234",
                ));
            let page = StorefrontPage::new(&config);

            view_first_order(&driver, &page).await.unwrap();
            assert_eq!(driver.current_page().as_deref(), Some("order-detail"));
        }
    }
}
