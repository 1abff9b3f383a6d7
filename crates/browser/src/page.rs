use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::BrowserError;
use crate::query::Locator;

/// Tag, text and attributes of one element, for structure debugging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementInfo {
    pub tag: String,
    pub text: String,
    pub attributes: BTreeMap<String, String>,
    /// Element children only, text nodes excluded.
    pub child_count: usize,
}

/// Everything the scraping stages need from a rendered page.
///
/// Operations on a locator act on its first match unless stated otherwise.
/// The run owns its page exclusively and drives it from one task, so the
/// futures are not required to be `Send`.
#[async_trait(?Send)]
pub trait PageDriver {
    /// URL after redirects.
    fn url(&self) -> String;

    async fn count(&self, locator: &Locator) -> Result<usize, BrowserError>;

    async fn inner_text(&self, locator: &Locator) -> Result<String, BrowserError>;

    /// Text of every match, in match order.
    async fn all_inner_texts(&self, locator: &Locator) -> Result<Vec<String>, BrowserError>;

    /// False when nothing matches.
    async fn is_visible(&self, locator: &Locator) -> Result<bool, BrowserError>;

    async fn click(&self, locator: &Locator) -> Result<(), BrowserError>;

    async fn scroll_into_view(&self, locator: &Locator) -> Result<(), BrowserError>;

    async fn describe(&self, locator: &Locator) -> Result<ElementInfo, BrowserError>;

    async fn scroll_by(&self, dy: i64) -> Result<(), BrowserError>;

    async fn scroll_to_bottom(&self) -> Result<(), BrowserError>;
}
