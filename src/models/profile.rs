use serde::{Deserialize, Serialize};

/// Contact details used to fill checkout forms.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub post_code: String,
    pub street_number: String,
    pub street_name: String,
    pub county: String,
    pub town: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "UK".to_string()
}

/// Payment card details used on the final checkout pages.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentDetails {
    pub card_type: String,
    pub card_number: String,
    pub name_on_card: String,
    /// Expiry as entered on the card, e.g. "0925" or "09/25".
    pub expiry: String,
    pub cvv: String,
}

/// Some sites require logging in before checkout.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginDetails {
    pub username: String,
    pub password: String,
}

/// Read-only aggregate handed to every agent. Validated up front: any field
/// a site's steps need must be present before that agent starts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomerProfile {
    pub contact: ContactDetails,
    pub payment: PaymentDetails,
    pub login: Option<LoginDetails>,
}

impl CustomerProfile {
    /// The "number, street, TOWN" string some address dropdowns key on.
    pub fn dropdown_address(&self) -> String {
        format!(
            "{}, {}, {}",
            self.contact.street_number,
            self.contact.street_name,
            self.contact.town.to_uppercase()
        )
    }

    /// The single-line street address typed into free-text address fields.
    pub fn street_address(&self) -> String {
        format!("{} {}", self.contact.street_number, self.contact.street_name)
    }
}
