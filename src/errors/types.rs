use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestockError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Page structure mismatch: {0}")]
    StructuralMismatch(String),

    #[error("Interaction intercepted: {0}")]
    Intercepted(String),

    #[error("Checkout step '{step}' failed: {reason}")]
    Step { step: String, reason: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RestockError {
    pub fn step(step: &str, reason: impl Into<String>) -> Self {
        Self::Step {
            step: step.to_string(),
            reason: reason.into(),
        }
    }
}
