//! Demonstrates healing-fallback locator resolution.
//!
//! Run with: `cargo run --example healing_locators`

use comprar::{resolve, LocatorSpec, MockDriver, MockElement, MockPage, Strategy};

#[tokio::main]
async fn main() -> comprar::ComprarResult<()> {
    comprar::try_init_logging();

    // The page has dropped its tracking attribute; only the role-based
    // fallback still matches.
    let driver = MockDriver::new().with_page(
        MockPage::new("checkout", "https://shop.test/checkout").with_element(
            MockElement::new("order-btn", "button")
                .matched_by(Strategy::role("button", "place free order"))
                .with_text("Place free order"),
        ),
    );

    let place_order = LocatorSpec::new(
        "place order button",
        Strategy::xpath("//button[normalize-space(text())=\"Place free order\"]"),
    )
    .or(Strategy::role("button", "place free order"))
    .or(Strategy::css_with_text("button", "Place free order"));

    let resolved = resolve(&place_order, &driver).await?;
    println!(
        "resolved '{}' via strategy #{}: <{} id={}>",
        place_order.role(),
        resolved.strategy_index,
        resolved.handle.tag_name,
        resolved.handle.id,
    );

    // A spec with no surviving strategy fails with ElementNotFound.
    let ghost = LocatorSpec::new("wishlist button", Strategy::css("#wishlist"))
        .or(Strategy::text("Add to wishlist"));
    match resolve(&ghost, &driver).await {
        Err(err) => println!("as expected: {err}"),
        Ok(_) => unreachable!("the wishlist button is not on this page"),
    }

    Ok(())
}
