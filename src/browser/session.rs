use std::path::Path;

use async_trait::async_trait;

use crate::errors::RestockError;

/// The lookup modes checkout flows key on. Product pages mix stable CSS
/// hooks with link text and the occasional brittle XPath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Css(String),
    Name(String),
    LinkText(String),
    PartialLinkText(String),
    XPath(String),
}

impl Selector {
    pub fn css(value: &str) -> Self {
        Self::Css(value.to_string())
    }

    pub fn name(value: &str) -> Self {
        Self::Name(value.to_string())
    }

    pub fn link_text(value: &str) -> Self {
        Self::LinkText(value.to_string())
    }

    pub fn partial_link_text(value: &str) -> Self {
        Self::PartialLinkText(value.to_string())
    }

    pub fn xpath(value: &str) -> Self {
        Self::XPath(value.to_string())
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Css(v) => format!("css `{}`", v),
            Self::Name(v) => format!("name `{}`", v),
            Self::LinkText(v) => format!("link text `{}`", v),
            Self::PartialLinkText(v) => format!("partial link text `{}`", v),
            Self::XPath(v) => format!("xpath `{}`", v),
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Handle to an element a session has resolved. Interactions re-resolve on
/// use, so a handle never goes stale across page refreshes.
#[derive(Debug, Clone)]
pub struct Element {
    pub selector: Selector,
    pub nth: usize,
}

impl Element {
    pub fn new(selector: Selector, nth: usize) -> Self {
        Self { selector, nth }
    }
}

/// How to pick an option from a `<select>` dropdown.
#[derive(Debug, Clone)]
pub enum SelectBy {
    Value(String),
    VisibleText(String),
}

/// One browser context, exclusively owned by a single agent.
///
/// Every lookup may fail with [`RestockError::ElementNotFound`]; callers
/// treat that as expected at optional checkpoints and as fatal elsewhere.
#[async_trait]
pub trait PageSession: Send + Sync {
    async fn open(&self, url: &str) -> Result<(), RestockError>;

    async fn refresh(&self) -> Result<(), RestockError>;

    async fn current_url(&self) -> Result<String, RestockError>;

    async fn find(&self, selector: &Selector) -> Result<Element, RestockError>;

    /// Resolve every match, possibly none. Absence is not an error here.
    async fn find_all(&self, selector: &Selector) -> Result<Vec<Element>, RestockError>;

    async fn click(&self, element: &Element) -> Result<(), RestockError>;

    async fn clear(&self, element: &Element) -> Result<(), RestockError>;

    async fn type_text(&self, element: &Element, text: &str) -> Result<(), RestockError>;

    async fn select(&self, element: &Element, option: &SelectBy) -> Result<(), RestockError>;

    async fn text_of(&self, element: &Element) -> Result<String, RestockError>;

    /// Scope subsequent lookups to an iframe's document.
    async fn enter_frame(&self, element: &Element) -> Result<(), RestockError>;

    /// Return to the top-level document.
    async fn leave_frame(&self) -> Result<(), RestockError>;

    async fn execute_script(&self, js: &str) -> Result<String, RestockError>;

    async fn screenshot(&self, path: &Path) -> Result<(), RestockError>;

    /// Find-then-click in one go.
    async fn click_on(&self, selector: &Selector) -> Result<(), RestockError> {
        let element = self.find(selector).await?;
        self.click(&element).await
    }

    /// Focus a field, clear it, and type into it.
    async fn fill(&self, selector: &Selector, text: &str) -> Result<(), RestockError> {
        let element = self.find(selector).await?;
        self.click(&element).await?;
        self.clear(&element).await?;
        self.type_text(&element, text).await
    }

    /// Focus a field and type into it without clearing.
    async fn type_into(&self, selector: &Selector, text: &str) -> Result<(), RestockError> {
        let element = self.find(selector).await?;
        self.click(&element).await?;
        self.type_text(&element, text).await
    }
}
