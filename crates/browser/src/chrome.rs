use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::protocol::cdp::Network::CookieParam;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use fbharvest_core::config::BrowserConfig;
use fbharvest_core::CookieRecord;

use crate::error::BrowserError;
use crate::page::{ElementInfo, PageDriver};
use crate::query::Locator;

/// Resolves a serialized `Locator` to a list of elements. Mirrors the
/// snapshot backend's semantics.
const RESOLVE_JS: &str = r#"
const __norm = s => (s || '').replace(/\s+/g, ' ').trim();
const __text = e => e.innerText !== undefined ? e.innerText : (e.textContent || '');
function __matchIn(root, q) {
  switch (q.kind) {
    case 'css':
      return Array.from(root.querySelectorAll(q.css));
    case 'has_text': {
      const needle = q.text.toLowerCase();
      return Array.from(root.querySelectorAll(q.css))
        .filter(e => __norm(__text(e)).toLowerCase().includes(needle));
    }
    case 'exact_text':
      return Array.from(root.querySelectorAll('*'))
        .filter(e => __norm(__text(e)) === q.text);
    case 'has': {
      const within = (e, s) => e.querySelector(s.trim().startsWith('>') ? ':scope ' + s : s) !== null;
      return Array.from(root.querySelectorAll(q.css))
        .filter(e => q.has.every(s => within(e, s))
                  && q.has_not.every(s => !within(e, s)));
    }
    case 'ancestor': {
      let e = root;
      for (let i = 0; i < q.levels && e; i++) e = e.parentElement;
      return e && e !== root ? [e] : [];
    }
  }
  return [];
}
function __resolve(steps) {
  let roots = [document];
  for (const step of steps) {
    const seen = new Set();
    let next = [];
    for (const r of roots) {
      for (const e of __matchIn(r, step.query)) {
        if (!seen.has(e)) { seen.add(e); next.push(e); }
      }
    }
    if (step.nth !== null && step.nth !== undefined) {
      next = next[step.nth] ? [next[step.nth]] : [];
    }
    roots = next;
  }
  return roots;
}
"#;

/// Script results come back as a JSON string so objects survive the
/// DevTools round trip.
#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    error: Option<String>,
}

/// A launched Chrome process. Dropping it closes the browser.
pub struct ChromeSession {
    browser: Browser,
    config: BrowserConfig,
}

impl ChromeSession {
    pub fn launch(config: &BrowserConfig) -> Result<Self, BrowserError> {
        let mut extra_args: Vec<OsString> = Vec::new();

        // Required for running in Docker containers
        extra_args.push(OsString::from("--no-sandbox"));
        extra_args.push(OsString::from("--disable-dev-shm-usage"));
        extra_args.push(OsString::from("--disable-gpu"));
        extra_args.push(OsString::from("--disable-notifications"));

        let mut builder = LaunchOptionsBuilder::default();
        builder
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            // pacing sleeps can leave the DevTools socket quiet for a while
            .idle_browser_timeout(Duration::from_secs(600))
            .args(extra_args.iter().map(|a| a.as_ref()).collect());

        if let Some(path) = &config.chrome_path {
            builder.path(Some(PathBuf::from(path)));
        }

        let launch_options = builder
            .build()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let browser =
            Browser::new(launch_options).map_err(|e| BrowserError::Launch(e.to_string()))?;

        info!(headless = config.headless, "browser launched");

        Ok(Self {
            browser,
            config: config.clone(),
        })
    }

    /// Opens a tab carrying the given session cookies.
    pub fn new_page(&self, cookies: &[CookieRecord]) -> Result<ChromePage, BrowserError> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        tab.set_default_timeout(Duration::from_secs(self.config.navigation_timeout_seconds));

        let params = cookie_params(cookies);
        if !params.is_empty() {
            let count = params.len();
            tab.set_cookies(params)
                .map_err(|e| BrowserError::Protocol(format!("set cookies: {}", e)))?;
            info!(count, "session cookies injected");
        } else {
            warn!("no session cookies, page will load anonymously");
        }

        Ok(ChromePage { tab })
    }
}

/// Converts sanitized records to DevTools cookie params. Rows without a
/// name or domain would make the whole batch fail, so they are dropped.
fn cookie_params(cookies: &[CookieRecord]) -> Vec<CookieParam> {
    cookies
        .iter()
        .filter(|c| {
            let usable = !c.name.is_empty() && !c.domain.is_empty();
            if !usable {
                debug!(name = %c.name, "skipping cookie without name or domain");
            }
            usable
        })
        .filter_map(|c| {
            let mut raw = json!({
                "name": c.name,
                "value": c.value,
                "domain": c.domain,
                "path": c.path,
                "sameSite": c.same_site.as_str(),
            });
            if let Some(http_only) = c.http_only {
                raw["httpOnly"] = json!(http_only);
            }
            if let Some(secure) = c.secure {
                raw["secure"] = json!(secure);
            }
            if let Some(expires) = c.expires {
                raw["expires"] = json!(expires);
            }

            match serde_json::from_value::<CookieParam>(raw) {
                Ok(param) => Some(param),
                Err(e) => {
                    debug!(name = %c.name, error = %e, "cookie rejected by protocol schema");
                    None
                }
            }
        })
        .collect()
}

pub struct ChromePage {
    tab: Arc<Tab>,
}

impl ChromePage {
    /// Navigate and wait for the load event.
    pub async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        info!(url = %url, "navigating");

        self.tab
            .navigate_to(url)
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;

        info!(final_url = %self.tab.get_url(), "page loaded");
        Ok(())
    }

    pub fn screenshot(&self, path: &Path) -> Result<(), BrowserError> {
        let data = self
            .tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| BrowserError::Protocol(e.to_string()))?;

        std::fs::write(path, data).map_err(|e| BrowserError::Protocol(e.to_string()))?;

        info!(path = %path.display(), "screenshot saved");
        Ok(())
    }

    /// Runs `body` with `els` bound to the resolved elements. `body` must
    /// return the envelope via `JSON.stringify`.
    fn run(&self, locator: &Locator, body: &str) -> Result<Value, BrowserError> {
        let steps = serde_json::to_string(locator.steps())
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;

        let script = format!(
            r#"(() => {{
                {prelude}
                try {{
                    const els = __resolve({steps});
                    {body}
                }} catch (e) {{
                    return JSON.stringify({{ ok: false, error: String(e) }});
                }}
            }})()"#,
            prelude = RESOLVE_JS,
            steps = steps,
            body = body,
        );

        self.eval_envelope(&script, locator)
    }

    fn eval_envelope(&self, script: &str, locator: &Locator) -> Result<Value, BrowserError> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;

        let raw = result
            .value
            .as_ref()
            .and_then(Value::as_str)
            .ok_or_else(|| BrowserError::Evaluation("script returned no value".to_string()))?;

        let envelope: Envelope =
            serde_json::from_str(raw).map_err(|e| BrowserError::Evaluation(e.to_string()))?;

        if envelope.ok {
            Ok(envelope.value)
        } else if envelope.missing {
            Err(BrowserError::ElementNotFound(locator.to_string()))
        } else {
            Err(BrowserError::Evaluation(
                envelope.error.unwrap_or_else(|| "unknown script error".to_string()),
            ))
        }
    }

    fn eval_plain(&self, script: &str) -> Result<(), BrowserError> {
        self.tab
            .evaluate(script, false)
            .map(|_| ())
            .map_err(|e| BrowserError::Evaluation(e.to_string()))
    }
}

const MISSING: &str = "if (!els.length) return JSON.stringify({ ok: false, missing: true });";

#[async_trait(?Send)]
impl PageDriver for ChromePage {
    fn url(&self) -> String {
        self.tab.get_url()
    }

    async fn count(&self, locator: &Locator) -> Result<usize, BrowserError> {
        let value = self.run(locator, "return JSON.stringify({ ok: true, value: els.length });")?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    async fn inner_text(&self, locator: &Locator) -> Result<String, BrowserError> {
        let body = format!(
            "{} return JSON.stringify({{ ok: true, value: __text(els[0]) }});",
            MISSING
        );
        let value = self.run(locator, &body)?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn all_inner_texts(&self, locator: &Locator) -> Result<Vec<String>, BrowserError> {
        let value = self.run(
            locator,
            "return JSON.stringify({ ok: true, value: els.map(e => __text(e)) });",
        )?;
        decode_texts(value, locator)
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, BrowserError> {
        let value = self.run(
            locator,
            r#"
            const e = els[0];
            if (!e) return JSON.stringify({ ok: true, value: false });
            const r = e.getBoundingClientRect();
            const s = window.getComputedStyle(e);
            const visible = r.width > 0 && r.height > 0
                && s.visibility !== 'hidden' && s.display !== 'none';
            return JSON.stringify({ ok: true, value: visible });
            "#,
        )?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn click(&self, locator: &Locator) -> Result<(), BrowserError> {
        let body = format!(
            "{} els[0].scrollIntoView({{ block: 'center' }}); els[0].click(); \
             return JSON.stringify({{ ok: true }});",
            MISSING
        );
        self.run(locator, &body).map(|_| ())
    }

    async fn scroll_into_view(&self, locator: &Locator) -> Result<(), BrowserError> {
        let body = format!(
            "{} els[0].scrollIntoView({{ block: 'center' }}); return JSON.stringify({{ ok: true }});",
            MISSING
        );
        self.run(locator, &body).map(|_| ())
    }

    async fn describe(&self, locator: &Locator) -> Result<ElementInfo, BrowserError> {
        let body = format!(
            r#"{}
            const e = els[0];
            const attrs = {{}};
            for (const a of e.attributes) attrs[a.name] = a.value;
            return JSON.stringify({{ ok: true, value: {{
                tag: e.tagName, text: __text(e), attributes: attrs,
                child_count: e.children.length }} }});
            "#,
            MISSING
        );
        let value = self.run(locator, &body)?;

        Ok(ElementInfo {
            tag: value["tag"].as_str().unwrap_or_default().to_string(),
            text: value["text"].as_str().unwrap_or_default().to_string(),
            attributes: serde_json::from_value(value["attributes"].clone()).unwrap_or_default(),
            child_count: value["child_count"].as_u64().unwrap_or_default() as usize,
        })
    }

    async fn scroll_by(&self, dy: i64) -> Result<(), BrowserError> {
        self.eval_plain(&format!("window.scrollBy(0, {})", dy))
    }

    async fn scroll_to_bottom(&self) -> Result<(), BrowserError> {
        self.eval_plain("window.scrollTo(0, document.body.scrollHeight)")
    }
}

fn decode_texts(value: Value, locator: &Locator) -> Result<Vec<String>, BrowserError> {
    serde_json::from_value(value)
        .map_err(|e| BrowserError::Evaluation(format!("texts of {}: {}", locator, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fbharvest_core::SameSite;

    fn record(name: &str, domain: &str) -> CookieRecord {
        CookieRecord {
            name: name.to_string(),
            value: "v".to_string(),
            domain: domain.to_string(),
            path: "/".to_string(),
            same_site: SameSite::None,
            http_only: Some(true),
            secure: Some(true),
            expires: Some(1_900_000_000.0),
        }
    }

    #[test]
    fn test_cookie_params_skip_unusable_rows() {
        let params = cookie_params(&[
            record("c_user", ".facebook.com"),
            record("", ".facebook.com"),
            record("xs", ""),
        ]);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "c_user");
        assert_eq!(params[0].domain.as_deref(), Some(".facebook.com"));
    }

    #[test]
    fn test_envelope_defaults() {
        let envelope: Envelope = serde_json::from_str(r#"{"ok":false,"missing":true}"#).unwrap();
        assert!(!envelope.ok);
        assert!(envelope.missing);
        assert!(envelope.error.is_none());
    }

    #[test]
    fn test_decode_texts_rejects_malformed_results() {
        let locator = Locator::css("span");

        let texts = decode_texts(json!(["Ana", "Hola"]), &locator).unwrap();
        assert_eq!(texts, vec!["Ana".to_string(), "Hola".to_string()]);

        assert!(matches!(
            decode_texts(json!({"length": 2}), &locator),
            Err(BrowserError::Evaluation(_))
        ));
        assert!(matches!(
            decode_texts(Value::Null, &locator),
            Err(BrowserError::Evaluation(_))
        ));
    }
}
