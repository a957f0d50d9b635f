//! Checkout flow for argos.co.uk.
//!
//! Argos needs an account: checkout runs through login, an address-book
//! dropdown, delivery-slot tables, and a card-payment iframe. Several hooks
//! only exist as positional XPaths; those paths are the first thing to break
//! when the trolley page changes.

use std::time::Duration;

use tracing::debug;

use crate::browser::{PageSession, SelectBy, Selector};
use crate::checkout::{split_expiry, CheckoutContext, Step};
use crate::errors::RestockError;
use crate::models::{CustomerProfile, StepStatus};

use super::{SiteDefinition, SiteOptions};

const COOKIE_BANNER: &str = ".consent_prompt_footer #consent_prompt_submit";
const TROLLEY_BUTTON: &str = ".xs-8--none button";
const POSTCODE_INPUT: &str = "/html/body/div[1]/div/div[2]/main/div[2]/section[1]/div[2]/div/div/div[2]/div/form/div[2]/div/input";
const POSTCODE_SUBMIT: &str = "/html/body/div[1]/div/div[2]/main/div[2]/section[1]/div[2]/div/div/div[2]/div/form/div[3]/button[2]";
const TROLLEY_POPUP: &str = "/html/body/div[1]/div/div[2]/main/div[2]/section[1]/div[2]/div[1]/div/div[2]/div[2]/button";
const PROCEED_TO_CHECKOUT: &str = "/html/body/div[1]/div/div[2]/main/div[2]/section[3]/div[2]/div[2]/div/div/div/button/span[2]";
const LOGIN_SUBMIT: &str = "/html/body/div[1]/div[2]/main/div/div/form/button/div/div[1]";
const DELIVERY_SLOTS: &str = ".smallItemsSlotTable tbody :not(.noSlot).blockContent";

/// The card iframe takes a moment to accept input after the form settles.
const FINAL_SETTLE: Duration = Duration::from_secs(15);

/// Card-type labels mapped to the values the payment dropdown submits.
const CARD_CODES: [(&str, &str); 6] = [
    ("VISA Credit", "VISAC"),
    ("VISA", "VISAD"),
    ("VISA Electron", "ELECTRON"),
    ("Mastercard", "MASTERCARD"),
    ("Maestro", "MAESTRO"),
    ("American Express", "AMEX"),
];

pub fn card_code(card_type: &str) -> Option<&'static str> {
    CARD_CODES
        .iter()
        .find(|(label, _)| *label == card_type)
        .map(|(_, code)| *code)
}

pub fn definition(options: SiteOptions) -> SiteDefinition {
    SiteDefinition::new(
        "argos",
        true,
        Some(Selector::css(COOKIE_BANNER)),
        options,
        |s, o| Box::pin(trolley_available(s, o)),
        |s| Box::pin(add_to_trolley(s)),
        |s, o| Box::pin(trolley_confirmed(s, o)),
        vec![
            Step::new("checkout-trolley", |s, p, c| Box::pin(checkout_trolley(s, p, c))),
            Step::new("authenticate", |s, p, c| Box::pin(authenticate(s, p, c))),
            Step::new("delivery-details", |s, p, c| Box::pin(delivery_details(s, p, c))),
            Step::new("delivery-slot", |s, p, c| Box::pin(delivery_slot(s, p, c))),
            Step::new("card-type", |s, p, c| Box::pin(card_type(s, p, c))),
            Step::new("payment-details", |s, p, c| Box::pin(payment_details(s, p, c))),
            Step::final_submission("final-confirm", |s, p, c| Box::pin(final_confirm(s, p, c))),
        ],
    )
}

/// Out of stock simply removes the add-to-trolley button, so an empty match
/// is "not yet" rather than a structural problem.
async fn trolley_available(
    session: &dyn PageSession,
    _options: &SiteOptions,
) -> Result<bool, RestockError> {
    let buttons = session.find_all(&Selector::css(TROLLEY_BUTTON)).await?;
    Ok(!buttons.is_empty())
}

async fn add_to_trolley(session: &dyn PageSession) -> Result<(), RestockError> {
    session.click_on(&Selector::css(TROLLEY_BUTTON)).await
}

/// The trolley page offers the insurance upsell once the item is in.
async fn trolley_confirmed(
    session: &dyn PageSession,
    _options: &SiteOptions,
) -> Result<bool, RestockError> {
    match session
        .find(&Selector::link_text("Continue without insurance"))
        .await
    {
        Ok(_) => Ok(true),
        Err(RestockError::ElementNotFound(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

async fn checkout_trolley(
    session: &dyn PageSession,
    profile: &CustomerProfile,
    _context: &mut CheckoutContext,
) -> Result<StepStatus, RestockError> {
    session
        .click_on(&Selector::link_text("Continue without insurance"))
        .await?;
    session
        .type_into(&Selector::xpath(POSTCODE_INPUT), &profile.contact.post_code)
        .await?;
    session.click_on(&Selector::xpath(POSTCODE_SUBMIT)).await?;

    // A fulfilment popup sometimes appears here; dismiss it when present.
    let popups = session.find_all(&Selector::xpath(TROLLEY_POPUP)).await?;
    if let Some(popup) = popups.first() {
        debug!("Dismissing trolley popup");
        session.click(popup).await?;
    }

    session
        .click_on(&Selector::xpath(PROCEED_TO_CHECKOUT))
        .await?;
    Ok(StepStatus::Completed)
}

async fn authenticate(
    session: &dyn PageSession,
    profile: &CustomerProfile,
    _context: &mut CheckoutContext,
) -> Result<StepStatus, RestockError> {
    let login = profile.login.as_ref().ok_or_else(|| {
        RestockError::step("authenticate", "login details missing from profile")
    })?;

    session
        .type_into(
            &Selector::css(".form-group__input-wrapper #email"),
            &login.username,
        )
        .await?;
    session
        .type_into(
            &Selector::css(".form-group__input-wrapper #password"),
            &login.password,
        )
        .await?;
    session.click_on(&Selector::xpath(LOGIN_SUBMIT)).await?;
    session
        .click_on(&Selector::xpath(PROCEED_TO_CHECKOUT))
        .await?;
    Ok(StepStatus::Completed)
}

/// Accounts with a saved address skip straight to the slot picker.
async fn delivery_details(
    session: &dyn PageSession,
    profile: &CustomerProfile,
    context: &mut CheckoutContext,
) -> Result<StepStatus, RestockError> {
    let url = session.current_url().await?;
    if !url.contains("TrolleyYourDetails") {
        return Ok(StepStatus::Skipped);
    }

    session
        .click_on(&Selector::css(
            ".well.border-straight-xs.gutter .btn.btn-block.btn-secondary",
        ))
        .await?;
    session
        .type_into(&Selector::css("#delivery_phone"), &profile.contact.phone)
        .await?;

    let address = context
        .delivery_address
        .get_or_insert_with(|| profile.dropdown_address())
        .clone();
    let results = session.find(&Selector::css("#addressResults")).await?;
    session
        .select(&results, &SelectBy::VisibleText(address))
        .await?;

    session
        .click_on(&Selector::css("#deliveryAddress .btn.btn-block.btn-primary"))
        .await?;
    session
        .click_on(&Selector::css(".panel-body .btn.btn-block.btn-primary"))
        .await?;
    Ok(StepStatus::Completed)
}

async fn delivery_slot(
    session: &dyn PageSession,
    _profile: &CustomerProfile,
    _context: &mut CheckoutContext,
) -> Result<StepStatus, RestockError> {
    let slots = session.find_all(&Selector::css(DELIVERY_SLOTS)).await?;
    let first = slots
        .first()
        .ok_or_else(|| RestockError::step("delivery-slot", "no delivery slots available"))?;
    session.click(first).await?;
    session
        .click_on(&Selector::css("#contextualSubmitContinueEcomm"))
        .await?;
    Ok(StepStatus::Completed)
}

async fn card_type(
    session: &dyn PageSession,
    profile: &CustomerProfile,
    context: &mut CheckoutContext,
) -> Result<StepStatus, RestockError> {
    let code = card_code(&profile.payment.card_type).ok_or_else(|| {
        RestockError::step(
            "card-type",
            format!("unrecognized card type `{}`", profile.payment.card_type),
        )
    })?;
    context.card_code = Some(code.to_string());

    let dropdown = session.find(&Selector::css("#cardTypeSelect")).await?;
    session
        .select(&dropdown, &SelectBy::Value(code.to_string()))
        .await?;
    session
        .click_on(&Selector::css("#continue-to-payment-details"))
        .await?;
    Ok(StepStatus::Completed)
}

/// Everything from here on happens inside the payment-provider iframe; the
/// frame stays active for the final confirmation step.
async fn payment_details(
    session: &dyn PageSession,
    profile: &CustomerProfile,
    _context: &mut CheckoutContext,
) -> Result<StepStatus, RestockError> {
    let iframe = session.find(&Selector::name("iFrame_a")).await?;
    session.enter_frame(&iframe).await?;

    session
        .type_into(&Selector::css("#hps-pan"), &profile.payment.card_number)
        .await?;

    let expiry = split_expiry(&profile.payment.expiry)?;
    let month = session.find(&Selector::css("#expiryDateMonth")).await?;
    session
        .select(&month, &SelectBy::Value(expiry.month))
        .await?;
    let year = session.find(&Selector::css("#expiryDateYear")).await?;
    session.select(&year, &SelectBy::Value(expiry.year)).await?;

    session
        .type_into(&Selector::css("#nameOnCard"), &profile.payment.name_on_card)
        .await?;
    session
        .type_into(&Selector::css("#hps-cvv"), &profile.payment.cvv)
        .await?;
    Ok(StepStatus::Completed)
}

async fn final_confirm(
    session: &dyn PageSession,
    _profile: &CustomerProfile,
    _context: &mut CheckoutContext,
) -> Result<StepStatus, RestockError> {
    tokio::time::sleep(FINAL_SETTLE).await;
    session.click_on(&Selector::css("#hps-continue")).await?;
    Ok(StepStatus::Completed)
}
