//! Checkout flow for game.co.uk.
//!
//! Two entry points: a category listing (the console landing page, where the
//! tile itself is the add-to-basket control) and a regular product page. Both
//! share the checkout steps; they differ in how availability is read and how
//! the item lands in the basket.

use std::time::Duration;

use crate::browser::{PageSession, Selector};
use crate::checkout::{split_expiry, CheckoutContext, Step};
use crate::errors::RestockError;
use crate::models::{CustomerProfile, StepStatus};

use super::{ActionFuture, CheckFuture, SiteDefinition, SiteOptions};

const COOKIE_BANNER: &str = ".cookiePolicy_inner--actions .cookiePolicy_inner-link";
const LISTING_TILE: &str = "#playstation-5 a";
const BUY_BUTTONS: &str = "#mainPDPButtons .btnMint a";
const BUY_BUTTON_LABELS: &str = "#mainPDPButtons .btnMint .btnName";
const BASKET_MODAL: &str = ".modal-content-scroll-wrapper";
const CONTINUE_BUTTON: &str = ".mat-raised-button.mat-accent-cta.game-full-width .mat-button-wrapper";

/// Pause for late-rendering page content (payment iframe, summary totals).
const SETTLE: Duration = Duration::from_secs(2);

pub fn product_definition(options: SiteOptions) -> SiteDefinition {
    SiteDefinition::new(
        "game",
        false,
        Some(Selector::css(COOKIE_BANNER)),
        options,
        |s, o| Box::pin(product_available(s, o)),
        |s| Box::pin(add_product_to_basket(s)),
        |s, o| Box::pin(basket_confirmed(s, o)),
        checkout_steps(),
    )
}

pub fn listing_definition(options: SiteOptions) -> SiteDefinition {
    SiteDefinition::new(
        "game-listing",
        false,
        Some(Selector::css(COOKIE_BANNER)),
        options,
        |s, o| Box::pin(listing_available(s, o)),
        |s| Box::pin(add_listing_to_basket(s)),
        |s, o| Box::pin(basket_confirmed(s, o)),
        checkout_steps(),
    )
}

fn checkout_steps() -> Vec<Step> {
    vec![
        Step::new("guest-checkout", |s, p, c| Box::pin(guest_checkout(s, p, c))),
        Step::new("contact-details", |s, p, c| Box::pin(contact_details(s, p, c))),
        Step::new("delivery-address", |s, p, c| Box::pin(delivery_address(s, p, c))),
        Step::new("delivery-options", |s, p, c| Box::pin(delivery_options(s, p, c))),
        Step::new("payment-details", |s, p, c| Box::pin(payment_details(s, p, c))),
        Step::final_submission("final-confirm", |s, p, c| Box::pin(final_confirm(s, p, c))),
    ]
}

/// On the category page the tile link carries the stock state as text.
/// A missing tile means the page no longer looks like we expect, which the
/// poller escalates rather than treating as out of stock.
async fn listing_available(
    session: &dyn PageSession,
    _options: &SiteOptions,
) -> Result<bool, RestockError> {
    let tile = session.find(&Selector::css(LISTING_TILE)).await?;
    let text = session.text_of(&tile).await?;
    Ok(!text.contains("Out of Stock"))
}

/// On a product page no buy button means no stock, and a "Pre-order" label
/// only counts when the target opts in.
async fn product_available(
    session: &dyn PageSession,
    options: &SiteOptions,
) -> Result<bool, RestockError> {
    let buttons = session.find_all(&Selector::css(BUY_BUTTONS)).await?;
    if buttons.is_empty() {
        return Ok(false);
    }
    if options.preorder_is_available {
        return Ok(true);
    }
    let labels = session.find_all(&Selector::css(BUY_BUTTON_LABELS)).await?;
    if let Some(first) = labels.first() {
        let text = session.text_of(first).await?;
        if text.contains("Pre-order") {
            return Ok(false);
        }
    }
    Ok(true)
}

async fn add_listing_to_basket(session: &dyn PageSession) -> Result<(), RestockError> {
    session.click_on(&Selector::css(LISTING_TILE)).await
}

async fn add_product_to_basket(session: &dyn PageSession) -> Result<(), RestockError> {
    session.click_on(&Selector::css(BUY_BUTTONS)).await
}

/// A same-page modal reports the add-to-basket result.
async fn basket_confirmed(
    session: &dyn PageSession,
    _options: &SiteOptions,
) -> Result<bool, RestockError> {
    let modal = session.find(&Selector::css(BASKET_MODAL)).await?;
    let text = session.text_of(&modal).await?;
    Ok(text.contains("in your basket"))
}

async fn guest_checkout(
    session: &dyn PageSession,
    _profile: &CustomerProfile,
    _context: &mut CheckoutContext,
) -> Result<StepStatus, RestockError> {
    session
        .click_on(&Selector::css(".modal-content-bottom .secure-checkout"))
        .await?;
    session
        .click_on(&Selector::link_text("SECURE CHECKOUT"))
        .await?;
    session
        .click_on(&Selector::link_text("Checkout as Guest"))
        .await?;
    Ok(StepStatus::Completed)
}

/// Open a Material dropdown and take its first option.
async fn pick_first_option(
    session: &dyn PageSession,
    dropdown: &str,
) -> Result<(), RestockError> {
    session.click_on(&Selector::css(dropdown)).await?;
    session
        .click_on(&Selector::css(".mat-select-panel .mat-option"))
        .await
}

async fn contact_details(
    session: &dyn PageSession,
    profile: &CustomerProfile,
    _context: &mut CheckoutContext,
) -> Result<StepStatus, RestockError> {
    pick_first_option(session, "#mat-select-0").await?;
    session
        .fill(&Selector::css("#mat-input-0"), &profile.contact.first_name)
        .await?;
    session
        .fill(&Selector::css("#mat-input-1"), &profile.contact.last_name)
        .await?;
    session
        .fill(&Selector::css("#mat-input-2"), &profile.contact.email)
        .await?;
    session
        .fill(&Selector::css("#mat-input-3"), &profile.contact.phone)
        .await?;
    session.click_on(&Selector::css(CONTINUE_BUTTON)).await?;
    Ok(StepStatus::Completed)
}

async fn delivery_address(
    session: &dyn PageSession,
    profile: &CustomerProfile,
    context: &mut CheckoutContext,
) -> Result<StepStatus, RestockError> {
    session
        .click_on(&Selector::partial_link_text("Address Entry"))
        .await?;
    pick_first_option(session, "#mat-select-1").await?;

    let street = context
        .delivery_address
        .get_or_insert_with(|| profile.street_address())
        .clone();
    session
        .type_into(&Selector::css("#mat-input-5"), &street)
        .await?;
    session
        .type_into(&Selector::css("#mat-input-8"), &profile.contact.county)
        .await?;
    session
        .type_into(&Selector::css("#mat-input-10"), &profile.contact.post_code)
        .await?;
    session.click_on(&Selector::css(CONTINUE_BUTTON)).await?;
    Ok(StepStatus::Completed)
}

async fn delivery_options(
    session: &dyn PageSession,
    _profile: &CustomerProfile,
    _context: &mut CheckoutContext,
) -> Result<StepStatus, RestockError> {
    session
        .execute_script("window.scrollTo(0, document.body.scrollHeight);")
        .await?;
    tokio::time::sleep(SETTLE).await;
    session
        .click_on(&Selector::css(
            ".mat-raised-button.mat-accent-cta .mat-button-wrapper",
        ))
        .await?;
    Ok(StepStatus::Completed)
}

async fn payment_details(
    session: &dyn PageSession,
    profile: &CustomerProfile,
    _context: &mut CheckoutContext,
) -> Result<StepStatus, RestockError> {
    // The card number field lives in a payment-provider iframe; the rest of
    // the form is in the top document.
    let iframe = session
        .find(&Selector::css(
            ".mat-expansion-panel-body .mat-form-field-infix iframe",
        ))
        .await?;
    session.enter_frame(&iframe).await?;
    session
        .type_into(
            &Selector::name("credit-card-number"),
            &profile.payment.card_number,
        )
        .await?;
    session.leave_frame().await?;

    session
        .type_into(
            &Selector::css("#mat-input-15"),
            &profile.payment.name_on_card,
        )
        .await?;
    let expiry = split_expiry(&profile.payment.expiry)?;
    let short_expiry = format!("{}{}", expiry.month, &expiry.year[2..]);
    session
        .type_into(&Selector::css("#mat-input-16"), &short_expiry)
        .await?;
    session
        .type_into(&Selector::css("#mat-input-17"), &profile.payment.cvv)
        .await?;

    session
        .click_on(&Selector::css(".save-card .mat-button-wrapper"))
        .await?;
    session
        .execute_script("window.scrollTo(0, document.body.scrollHeight);")
        .await?;
    tokio::time::sleep(SETTLE).await;
    session
        .click_on(&Selector::css(".game-pt-sm .mat-checkbox-inner-container"))
        .await?;
    Ok(StepStatus::Completed)
}

async fn final_confirm(
    session: &dyn PageSession,
    _profile: &CustomerProfile,
    _context: &mut CheckoutContext,
) -> Result<StepStatus, RestockError> {
    session
        .click_on(&Selector::css("button .game-plr-xxl"))
        .await?;
    Ok(StepStatus::Completed)
}
