use std::path::Path;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::debug;

use super::session::{Element, PageSession, SelectBy, Selector};
use crate::errors::RestockError;

const NOT_FOUND: &str = "__not_found__";
const NO_FRAME: &str = "__no_frame__";
const INTERCEPTED: &str = "__intercepted__";
const OK: &str = "__ok__";

fn cdp_err(err: impl std::fmt::Display) -> RestockError {
    RestockError::Browser(err.to_string())
}

/// Quote a string as a JS double-quoted literal.
fn js_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// JS that binds `els` to every match for `selector` under `doc`.
fn resolver_js(selector: &Selector) -> String {
    match selector {
        Selector::Css(css) => format!(
            "var els = Array.prototype.slice.call(doc.querySelectorAll({}));",
            js_str(css)
        ),
        Selector::Name(name) => format!(
            "var els = Array.prototype.slice.call(doc.getElementsByName({}));",
            js_str(name)
        ),
        Selector::LinkText(text) => format!(
            "var els = Array.prototype.filter.call(doc.querySelectorAll('a'), \
             function(a) {{ return a.textContent.trim() === {}; }});",
            js_str(text)
        ),
        Selector::PartialLinkText(text) => format!(
            "var els = Array.prototype.filter.call(doc.querySelectorAll('a'), \
             function(a) {{ return a.textContent.indexOf({}) !== -1; }});",
            js_str(text)
        ),
        Selector::XPath(xpath) => format!(
            "var els = []; var it = doc.evaluate({}, doc, null, \
             XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
             for (var i = 0; i < it.snapshotLength; i++) els.push(it.snapshotItem(i));",
            js_str(xpath)
        ),
    }
}

/// Prologue binding `doc` to the active document, honoring an entered frame.
fn doc_js(frame: &Option<Selector>) -> String {
    match frame {
        None => "var doc = document;".to_string(),
        Some(frame_selector) => format!(
            "var doc = document; {} if (els.length < 1 || !els[0].contentDocument) \
             return {}; doc = els[0].contentDocument;",
            resolver_js(frame_selector),
            js_str(NO_FRAME)
        ),
    }
}

/// Wrap an operation body into a self-contained script: resolves `el` for
/// the target element, or returns the not-found marker.
fn op_js(frame: &Option<Selector>, element: &Element, body: &str) -> String {
    format!(
        "(function() {{ {} {} if (els.length <= {}) return {}; var el = els[{}]; {} }})()",
        doc_js(frame),
        resolver_js(&element.selector),
        element.nth,
        js_str(NOT_FOUND),
        element.nth,
        body
    )
}

/// A real Chromium context owned by one agent. Lookups and interactions are
/// resolved in-page so they work identically in the top document and inside
/// payment iframes.
pub struct CdpSession {
    // Held for its lifetime: dropping the Browser tears the process down.
    _browser: Browser,
    page: Page,
    handler: tokio::task::JoinHandle<()>,
    frame: Mutex<Option<Selector>>,
}

impl CdpSession {
    pub async fn launch(headless: bool) -> Result<Self, RestockError> {
        let mut builder = BrowserConfig::builder().no_sandbox();
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(RestockError::Browser)?;

        let (browser, mut events) = Browser::launch(config).await.map_err(cdp_err)?;
        let handler = tokio::spawn(async move { while events.next().await.is_some() {} });
        let page = browser.new_page("about:blank").await.map_err(cdp_err)?;

        debug!(headless, "Browser context launched");
        Ok(Self {
            _browser: browser,
            page,
            handler,
            frame: Mutex::new(None),
        })
    }

    async fn eval(&self, js: String) -> Result<String, RestockError> {
        let result = self.page.evaluate(js).await.map_err(cdp_err)?;
        result.into_value::<String>().map_err(cdp_err)
    }

    /// Run an op script against `element` and translate the marker results.
    async fn run_op(&self, element: &Element, body: &str) -> Result<String, RestockError> {
        let frame = self.frame.lock().await.clone();
        let out = self.eval(op_js(&frame, element, body)).await?;
        match out.as_str() {
            NOT_FOUND => Err(RestockError::ElementNotFound(element.selector.describe())),
            NO_FRAME => Err(RestockError::ElementNotFound("active iframe".to_string())),
            INTERCEPTED => Err(RestockError::Intercepted(format!(
                "overlay covers {}",
                element.selector.describe()
            ))),
            _ => Ok(out),
        }
    }

    async fn count_matches(&self, selector: &Selector) -> Result<usize, RestockError> {
        let frame = self.frame.lock().await.clone();
        let js = format!(
            "(function() {{ {} {} return String(els.length); }})()",
            doc_js(&frame),
            resolver_js(selector)
        );
        let out = self.eval(js).await?;
        if out == NO_FRAME {
            return Err(RestockError::ElementNotFound("active iframe".to_string()));
        }
        out.parse::<usize>()
            .map_err(|_| RestockError::Browser(format!("bad match count `{}`", out)))
    }
}

impl Drop for CdpSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait::async_trait]
impl PageSession for CdpSession {
    async fn open(&self, url: &str) -> Result<(), RestockError> {
        self.page.goto(url).await.map_err(cdp_err)?;
        *self.frame.lock().await = None;
        Ok(())
    }

    async fn refresh(&self) -> Result<(), RestockError> {
        self.page.reload().await.map_err(cdp_err)?;
        *self.frame.lock().await = None;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, RestockError> {
        let url = self.page.url().await.map_err(cdp_err)?;
        Ok(url.unwrap_or_default())
    }

    async fn find(&self, selector: &Selector) -> Result<Element, RestockError> {
        if self.count_matches(selector).await? == 0 {
            return Err(RestockError::ElementNotFound(selector.describe()));
        }
        Ok(Element::new(selector.clone(), 0))
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<Element>, RestockError> {
        let count = self.count_matches(selector).await?;
        Ok((0..count)
            .map(|nth| Element::new(selector.clone(), nth))
            .collect())
    }

    async fn click(&self, element: &Element) -> Result<(), RestockError> {
        // Hit-test before clicking: if another element sits over the target's
        // centre the click would land on the overlay instead.
        let body = format!(
            "el.scrollIntoView({{block: 'center'}}); \
             var r = el.getBoundingClientRect(); \
             var hit = doc.elementFromPoint(r.left + r.width / 2, r.top + r.height / 2); \
             if (hit && hit !== el && !el.contains(hit) && !hit.contains(el)) return {}; \
             el.click(); return {};",
            js_str(INTERCEPTED),
            js_str(OK)
        );
        self.run_op(element, &body).await?;
        Ok(())
    }

    async fn clear(&self, element: &Element) -> Result<(), RestockError> {
        let body = format!(
            "el.value = ''; \
             el.dispatchEvent(new Event('input', {{bubbles: true}})); \
             return {};",
            js_str(OK)
        );
        self.run_op(element, &body).await?;
        Ok(())
    }

    async fn type_text(&self, element: &Element, text: &str) -> Result<(), RestockError> {
        let body = format!(
            "el.focus(); el.value = (el.value || '') + {}; \
             el.dispatchEvent(new Event('input', {{bubbles: true}})); \
             el.dispatchEvent(new Event('change', {{bubbles: true}})); \
             return {};",
            js_str(text),
            js_str(OK)
        );
        self.run_op(element, &body).await?;
        Ok(())
    }

    async fn select(&self, element: &Element, option: &SelectBy) -> Result<(), RestockError> {
        let matcher = match option {
            SelectBy::Value(value) => format!("o.value === {}", js_str(value)),
            SelectBy::VisibleText(text) => format!("o.textContent.trim() === {}", js_str(text)),
        };
        let body = format!(
            "var idx = -1; \
             for (var j = 0; j < el.options.length; j++) {{ \
               var o = el.options[j]; if ({}) {{ idx = j; break; }} \
             }} \
             if (idx === -1) return {}; \
             el.selectedIndex = idx; \
             el.dispatchEvent(new Event('change', {{bubbles: true}})); \
             return {};",
            matcher,
            js_str(NOT_FOUND),
            js_str(OK)
        );
        self.run_op(element, &body).await?;
        Ok(())
    }

    async fn text_of(&self, element: &Element) -> Result<String, RestockError> {
        self.run_op(element, "return el.textContent || '';").await
    }

    async fn enter_frame(&self, element: &Element) -> Result<(), RestockError> {
        // The frame element must exist in the top document before scoping.
        let top = op_js(&None, element, &format!("return {};", js_str(OK)));
        let out = self.eval(top).await?;
        if out == NOT_FOUND {
            return Err(RestockError::ElementNotFound(element.selector.describe()));
        }
        *self.frame.lock().await = Some(element.selector.clone());
        Ok(())
    }

    async fn leave_frame(&self) -> Result<(), RestockError> {
        *self.frame.lock().await = None;
        Ok(())
    }

    async fn execute_script(&self, js: &str) -> Result<String, RestockError> {
        let result = self.page.evaluate(js.to_string()).await.map_err(cdp_err)?;
        let value = result
            .into_value::<serde_json::Value>()
            .unwrap_or(serde_json::Value::Null);
        Ok(value.to_string())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), RestockError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.page
            .save_screenshot(params, path)
            .await
            .map_err(cdp_err)?;
        Ok(())
    }
}
