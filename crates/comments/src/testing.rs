//! Page doubles for unit tests.

use std::cell::{Cell, RefCell};

use async_trait::async_trait;

use fbharvest_browser::{BrowserError, ElementInfo, Locator, PageDriver, SnapshotPage};

/// Scripted page: single-step locators whose query text is registered with
/// `with_present` exist and are visible, everything else is absent.
#[derive(Default)]
pub(crate) struct FakePage {
    present: Vec<(String, usize)>,
    broken_scroll: Vec<String>,
    failing_clicks: bool,
    queries: RefCell<Vec<String>>,
    clicks: RefCell<Vec<String>>,
    into_view: RefCell<Vec<String>>,
    scroll_by_calls: Cell<usize>,
    bottom_calls: Cell<usize>,
}

impl FakePage {
    pub fn with_present(mut self, query: &str, count: usize) -> Self {
        self.present.push((query.to_string(), count));
        self
    }

    pub fn with_broken_scroll(mut self, query: &str) -> Self {
        self.broken_scroll.push(query.to_string());
        self
    }

    pub fn with_failing_clicks(mut self) -> Self {
        self.failing_clicks = true;
        self
    }

    pub fn queried(&self, query: &str) -> bool {
        self.queries.borrow().iter().any(|q| q.starts_with(query))
    }

    pub fn clicks(&self) -> Vec<String> {
        self.clicks.borrow().clone()
    }

    pub fn scrolled_into_view(&self) -> Vec<String> {
        self.into_view.borrow().clone()
    }

    pub fn scrolls_by(&self) -> usize {
        self.scroll_by_calls.get()
    }

    pub fn scrolls_to_bottom(&self) -> usize {
        self.bottom_calls.get()
    }

    fn matches(&self, locator: &Locator) -> usize {
        self.queries.borrow_mut().push(locator.to_string());
        let [step] = locator.steps() else {
            return 0;
        };
        let key = step.query.to_string();
        let total = self
            .present
            .iter()
            .find(|(q, _)| *q == key)
            .map(|(_, n)| *n)
            .unwrap_or(0);
        match step.nth {
            Some(i) if i < total => 1,
            Some(_) => 0,
            None => total,
        }
    }

    fn require(&self, locator: &Locator) -> Result<(), BrowserError> {
        if self.matches(locator) == 0 {
            return Err(BrowserError::ElementNotFound(locator.to_string()));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl PageDriver for FakePage {
    fn url(&self) -> String {
        "https://www.facebook.com/fake".to_string()
    }

    async fn count(&self, locator: &Locator) -> Result<usize, BrowserError> {
        Ok(self.matches(locator))
    }

    async fn inner_text(&self, locator: &Locator) -> Result<String, BrowserError> {
        self.require(locator)?;
        Ok(String::new())
    }

    async fn all_inner_texts(&self, locator: &Locator) -> Result<Vec<String>, BrowserError> {
        Ok(vec![String::new(); self.matches(locator)])
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, BrowserError> {
        Ok(self.matches(locator) > 0)
    }

    async fn click(&self, locator: &Locator) -> Result<(), BrowserError> {
        self.require(locator)?;
        self.clicks.borrow_mut().push(locator.to_string());
        if self.failing_clicks {
            return Err(BrowserError::Protocol("element detached".to_string()));
        }
        Ok(())
    }

    async fn scroll_into_view(&self, locator: &Locator) -> Result<(), BrowserError> {
        self.require(locator)?;
        let target = locator.to_string();
        if self.broken_scroll.iter().any(|q| target.starts_with(q.as_str())) {
            return Err(BrowserError::Protocol("not scrollable".to_string()));
        }
        self.into_view.borrow_mut().push(target);
        Ok(())
    }

    async fn describe(&self, locator: &Locator) -> Result<ElementInfo, BrowserError> {
        self.require(locator)?;
        Ok(ElementInfo::default())
    }

    async fn scroll_by(&self, _dy: i64) -> Result<(), BrowserError> {
        self.scroll_by_calls.set(self.scroll_by_calls.get() + 1);
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<(), BrowserError> {
        self.bottom_calls.set(self.bottom_calls.get() + 1);
        Ok(())
    }
}

/// Saved-page wrapper that records every `count` lookup and fails any
/// operation on locators starting with `fail_prefix`.
pub(crate) struct RecordingPage {
    inner: SnapshotPage,
    fail_prefix: Option<String>,
    counted: RefCell<Vec<String>>,
}

impl RecordingPage {
    pub fn new(html: &str) -> Self {
        Self {
            inner: SnapshotPage::from_html(html, "https://www.facebook.com/snapshot"),
            fail_prefix: None,
            counted: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_under(mut self, prefix: &str) -> Self {
        self.fail_prefix = Some(prefix.to_string());
        self
    }

    pub fn counted(&self) -> Vec<String> {
        self.counted.borrow().clone()
    }

    fn check(&self, locator: &Locator) -> Result<(), BrowserError> {
        match &self.fail_prefix {
            Some(prefix) if locator.to_string().starts_with(prefix.as_str()) => {
                Err(BrowserError::Protocol("execution context was destroyed".to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl PageDriver for RecordingPage {
    fn url(&self) -> String {
        self.inner.url()
    }

    async fn count(&self, locator: &Locator) -> Result<usize, BrowserError> {
        self.counted.borrow_mut().push(locator.to_string());
        self.check(locator)?;
        self.inner.count(locator).await
    }

    async fn inner_text(&self, locator: &Locator) -> Result<String, BrowserError> {
        self.check(locator)?;
        self.inner.inner_text(locator).await
    }

    async fn all_inner_texts(&self, locator: &Locator) -> Result<Vec<String>, BrowserError> {
        self.check(locator)?;
        self.inner.all_inner_texts(locator).await
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, BrowserError> {
        self.check(locator)?;
        self.inner.is_visible(locator).await
    }

    async fn click(&self, locator: &Locator) -> Result<(), BrowserError> {
        self.check(locator)?;
        self.inner.click(locator).await
    }

    async fn scroll_into_view(&self, locator: &Locator) -> Result<(), BrowserError> {
        self.check(locator)?;
        self.inner.scroll_into_view(locator).await
    }

    async fn describe(&self, locator: &Locator) -> Result<ElementInfo, BrowserError> {
        self.check(locator)?;
        self.inner.describe(locator).await
    }

    async fn scroll_by(&self, dy: i64) -> Result<(), BrowserError> {
        self.inner.scroll_by(dy).await
    }

    async fn scroll_to_bottom(&self) -> Result<(), BrowserError> {
        self.inner.scroll_to_bottom().await
    }
}
