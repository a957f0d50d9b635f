/// State accumulated while a checkout flow advances. Earlier steps leave
/// derived values here for later steps to reuse.
#[derive(Debug, Clone, Default)]
pub struct CheckoutContext {
    /// Site-specific code the card type resolved to.
    pub card_code: Option<String>,
    /// Address string composed for free-text address fields.
    pub delivery_address: Option<String>,
}

impl CheckoutContext {
    pub fn new() -> Self {
        Self::default()
    }
}
