pub mod argos;
pub mod game;

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::browser::{PageSession, Selector};
use crate::checkout::Step;
use crate::errors::RestockError;

pub type CheckFuture<'a> = Pin<Box<dyn Future<Output = Result<bool, RestockError>> + Send + 'a>>;
pub type CheckFn = for<'a> fn(&'a dyn PageSession, &'a SiteOptions) -> CheckFuture<'a>;

pub type ActionFuture<'a> = Pin<Box<dyn Future<Output = Result<(), RestockError>> + Send + 'a>>;
pub type ActionFn = for<'a> fn(&'a dyn PageSession) -> ActionFuture<'a>;

/// Per-target knobs a site definition consults.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteOptions {
    /// Whether a "Pre-order" listing counts as stock. Some operators want
    /// pre-orders, most want actual availability.
    pub preorder_is_available: bool,
}

/// The capability set one site supplies: how to tell stock is available, how
/// to put it in the cart, how to confirm the cart took it, and the ordered
/// checkout steps. The surrounding poll/checkout/notify skeleton is shared.
pub struct SiteDefinition {
    pub id: &'static str,
    pub requires_login: bool,
    /// Interstitial to dismiss after the first page load, if any.
    pub cookie_banner: Option<Selector>,
    pub options: SiteOptions,
    availability: CheckFn,
    add_to_cart: ActionFn,
    confirm_cart: CheckFn,
    pub steps: Vec<Step>,
}

impl SiteDefinition {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: &'static str,
        requires_login: bool,
        cookie_banner: Option<Selector>,
        options: SiteOptions,
        availability: CheckFn,
        add_to_cart: ActionFn,
        confirm_cart: CheckFn,
        steps: Vec<Step>,
    ) -> Self {
        Self {
            id,
            requires_login,
            cookie_banner,
            options,
            availability,
            add_to_cart,
            confirm_cart,
            steps,
        }
    }

    pub async fn is_available(&self, session: &dyn PageSession) -> Result<bool, RestockError> {
        (self.availability)(session, &self.options).await
    }

    pub async fn add_to_cart(&self, session: &dyn PageSession) -> Result<(), RestockError> {
        (self.add_to_cart)(session).await
    }

    pub async fn confirm_cart(&self, session: &dyn PageSession) -> Result<bool, RestockError> {
        (self.confirm_cart)(session, &self.options).await
    }
}

impl std::fmt::Debug for SiteDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteDefinition")
            .field("id", &self.id)
            .field("requires_login", &self.requires_login)
            .field("steps", &self.steps.len())
            .finish()
    }
}

/// Built-in site flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteKind {
    /// game.co.uk product page.
    Game,
    /// game.co.uk category listing (e.g. the PS5 landing page).
    GameListing,
    /// argos.co.uk product page.
    Argos,
}

impl SiteKind {
    pub fn all() -> [SiteKind; 3] {
        [Self::Game, Self::GameListing, Self::Argos]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Game => "game",
            Self::GameListing => "game-listing",
            Self::Argos => "argos",
        }
    }

    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Argos)
    }

    pub fn definition(&self, options: SiteOptions) -> SiteDefinition {
        match self {
            Self::Game => game::product_definition(options),
            Self::GameListing => game::listing_definition(options),
            Self::Argos => argos::definition(options),
        }
    }
}

impl std::fmt::Display for SiteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
