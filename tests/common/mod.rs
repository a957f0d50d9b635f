#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use restock::browser::{Element, PageSession, SelectBy, Selector};
use restock::errors::RestockError;
use restock::models::{ContactDetails, CustomerProfile, LoginDetails, PaymentDetails};
use restock::notify::Notifier;

/// In-memory page session for driving the engine without a browser.
///
/// Selectors resolve to a single element by default; mark them missing to
/// trigger not-found handling, and set texts/counts to shape predicates.
#[derive(Default)]
pub struct ScriptedSession {
    pub refreshes: AtomicU32,
    pub screenshots: AtomicU32,
    pub opened: Mutex<Vec<String>>,
    pub clicks: Mutex<Vec<String>>,
    pub typed: Mutex<Vec<(String, String)>>,
    texts: Mutex<HashMap<String, String>>,
    missing: Mutex<HashSet<String>>,
    counts: Mutex<HashMap<String, usize>>,
    url: Mutex<String>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(selector: &Selector) -> String {
        selector.describe()
    }

    pub fn set_text(&self, selector: &Selector, text: &str) {
        self.texts
            .lock()
            .unwrap()
            .insert(Self::key(selector), text.to_string());
    }

    pub fn set_missing(&self, selector: &Selector) {
        self.missing.lock().unwrap().insert(Self::key(selector));
    }

    pub fn set_count(&self, selector: &Selector, count: usize) {
        self.counts
            .lock()
            .unwrap()
            .insert(Self::key(selector), count);
    }

    pub fn set_url(&self, url: &str) {
        *self.url.lock().unwrap() = url.to_string();
    }

    fn is_missing(&self, selector: &Selector) -> bool {
        self.missing.lock().unwrap().contains(&Self::key(selector))
    }

    fn ensure_present(&self, selector: &Selector) -> Result<(), RestockError> {
        if self.is_missing(selector) {
            Err(RestockError::ElementNotFound(selector.describe()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PageSession for ScriptedSession {
    async fn open(&self, url: &str) -> Result<(), RestockError> {
        self.opened.lock().unwrap().push(url.to_string());
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn refresh(&self) -> Result<(), RestockError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn current_url(&self) -> Result<String, RestockError> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn find(&self, selector: &Selector) -> Result<Element, RestockError> {
        self.ensure_present(selector)?;
        Ok(Element::new(selector.clone(), 0))
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<Element>, RestockError> {
        if self.is_missing(selector) {
            return Ok(Vec::new());
        }
        let count = self
            .counts
            .lock()
            .unwrap()
            .get(&Self::key(selector))
            .copied()
            .unwrap_or(1);
        Ok((0..count)
            .map(|nth| Element::new(selector.clone(), nth))
            .collect())
    }

    async fn click(&self, element: &Element) -> Result<(), RestockError> {
        self.ensure_present(&element.selector)?;
        self.clicks
            .lock()
            .unwrap()
            .push(element.selector.describe());
        Ok(())
    }

    async fn clear(&self, element: &Element) -> Result<(), RestockError> {
        self.ensure_present(&element.selector)
    }

    async fn type_text(&self, element: &Element, text: &str) -> Result<(), RestockError> {
        self.ensure_present(&element.selector)?;
        self.typed
            .lock()
            .unwrap()
            .push((element.selector.describe(), text.to_string()));
        Ok(())
    }

    async fn select(&self, element: &Element, _option: &SelectBy) -> Result<(), RestockError> {
        self.ensure_present(&element.selector)
    }

    async fn text_of(&self, element: &Element) -> Result<String, RestockError> {
        self.ensure_present(&element.selector)?;
        Ok(self
            .texts
            .lock()
            .unwrap()
            .get(&Self::key(&element.selector))
            .cloned()
            .unwrap_or_default())
    }

    async fn enter_frame(&self, element: &Element) -> Result<(), RestockError> {
        self.ensure_present(&element.selector)
    }

    async fn leave_frame(&self) -> Result<(), RestockError> {
        Ok(())
    }

    async fn execute_script(&self, _js: &str) -> Result<String, RestockError> {
        Ok("null".to_string())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), RestockError> {
        self.screenshots.fetch_add(1, Ordering::SeqCst);
        std::fs::write(path, b"png")?;
        Ok(())
    }
}

/// Notifier double that records deliveries and optionally refuses them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub fail_delivery: bool,
    pub events: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_delivery: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_stock_found(&self, label: &str, url: &str) -> Result<(), RestockError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("stock-found {} {}", label, url));
        if self.fail_delivery {
            return Err(RestockError::Notify("delivery refused".into()));
        }
        Ok(())
    }

    async fn notify_final_details(&self) -> Result<(), RestockError> {
        self.events.lock().unwrap().push("final-details".to_string());
        if self.fail_delivery {
            return Err(RestockError::Notify("delivery refused".into()));
        }
        Ok(())
    }
}

pub fn test_profile() -> CustomerProfile {
    CustomerProfile {
        contact: ContactDetails {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "07000000000".into(),
            post_code: "SW1A 1AA".into(),
            street_number: "10".into(),
            street_name: "Downing Street".into(),
            county: "Greater London".into(),
            town: "London".into(),
            country: "UK".into(),
        },
        payment: PaymentDetails {
            card_type: "VISA".into(),
            card_number: "4111111111111111".into(),
            name_on_card: "A LOVELACE".into(),
            expiry: "0929".into(),
            cvv: "123".into(),
        },
        login: Some(LoginDetails {
            username: "ada@example.com".into(),
            password: "hunter2".into(),
        }),
    }
}
