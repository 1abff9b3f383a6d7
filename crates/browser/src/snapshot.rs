use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::error::BrowserError;
use crate::page::{ElementInfo, PageDriver};
use crate::query::{Locator, Query};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// A saved HTML page queried offline. Interaction is limited to reads:
/// clicks fail and scrolls do nothing, since there is no script runtime to
/// react to them.
pub struct SnapshotPage {
    document: Html,
    url: String,
}

impl SnapshotPage {
    pub fn from_html(html: &str, url: impl Into<String>) -> Self {
        Self {
            document: Html::parse_document(html),
            url: url.into(),
        }
    }

    pub fn open(path: &Path) -> std::io::Result<Self> {
        let html = std::fs::read_to_string(path)?;
        Ok(Self::from_html(&html, format!("file://{}", path.display())))
    }

    fn resolve(&self, locator: &Locator) -> Result<Vec<ElementRef<'_>>, BrowserError> {
        let mut roots = vec![self.document.root_element()];

        for step in locator.steps() {
            let mut seen = HashSet::new();
            let mut next = Vec::new();

            for root in &roots {
                for el in match_in(*root, &step.query)? {
                    if seen.insert(el.id()) {
                        next.push(el);
                    }
                }
            }

            if let Some(n) = step.nth {
                next = next.into_iter().nth(n).into_iter().collect();
            }
            roots = next;
        }

        Ok(roots)
    }

    fn first(&self, locator: &Locator) -> Result<ElementRef<'_>, BrowserError> {
        self.resolve(locator)?
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::ElementNotFound(locator.to_string()))
    }
}

fn parse_selector(css: &str) -> Result<Selector, BrowserError> {
    Selector::parse(css).map_err(|e| BrowserError::Selector(format!("{}: {:?}", css, e)))
}

/// Matches strictly below `root`, like `querySelectorAll`.
fn select_in<'a>(root: ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>, BrowserError> {
    let selector = parse_selector(css)?;
    Ok(root
        .select(&selector)
        .filter(|el| el.id() != root.id())
        .collect())
}

/// A `has` entry: anywhere in the subtree, or a `>` path from the direct
/// children down.
enum HasPattern {
    Descendant(Selector),
    ChildPath(Vec<Selector>),
}

impl HasPattern {
    fn parse(raw: &str) -> Result<Self, BrowserError> {
        match raw.trim().strip_prefix('>') {
            Some(path) => Ok(HasPattern::ChildPath(
                path.split('>')
                    .map(|part| parse_selector(part.trim()))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            None => Ok(HasPattern::Descendant(parse_selector(raw)?)),
        }
    }

    fn found_in(&self, el: ElementRef<'_>) -> bool {
        match self {
            HasPattern::Descendant(selector) => el.select(selector).any(|d| d.id() != el.id()),
            HasPattern::ChildPath(path) => child_path(el, path),
        }
    }
}

fn child_path(el: ElementRef<'_>, path: &[Selector]) -> bool {
    let Some((head, rest)) = path.split_first() else {
        return true;
    };
    el.children()
        .filter_map(ElementRef::wrap)
        .any(|child| head.matches(&child) && child_path(child, rest))
}

fn match_in<'a>(root: ElementRef<'a>, query: &Query) -> Result<Vec<ElementRef<'a>>, BrowserError> {
    match query {
        Query::Css { css } => select_in(root, css),
        Query::HasText { css, text } => {
            let needle = text.to_lowercase();
            Ok(select_in(root, css)?
                .into_iter()
                .filter(|el| flat_text(*el).to_lowercase().contains(&needle))
                .collect())
        }
        Query::ExactText { text } => Ok(select_in(root, "*")?
            .into_iter()
            .filter(|el| flat_text(*el) == *text)
            .collect()),
        Query::Has { css, has, has_not } => {
            let has = has
                .iter()
                .map(|s| HasPattern::parse(s))
                .collect::<Result<Vec<_>, _>>()?;
            let has_not = has_not
                .iter()
                .map(|s| HasPattern::parse(s))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(select_in(root, css)?
                .into_iter()
                .filter(|el| {
                    has.iter().all(|p| p.found_in(*el))
                        && has_not.iter().all(|p| !p.found_in(*el))
                })
                .collect())
        }
        Query::Ancestor { levels } => {
            let mut current = Some(root);
            for _ in 0..*levels {
                current = current.and_then(|el| el.parent()).and_then(ElementRef::wrap);
            }
            Ok(current.filter(|el| el.id() != root.id()).into_iter().collect())
        }
    }
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                let name = element.name();
                if SKIP_TAGS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }

                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Approximates `innerText`: block elements start new lines, runs of
/// whitespace collapse, blank lines drop.
pub fn inner_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(el, &mut raw);

    raw.split('\n')
        .map(|line| WHITESPACE_RE.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn flat_text(el: ElementRef<'_>) -> String {
    inner_text(el).replace('\n', " ")
}

fn is_hidden(el: ElementRef<'_>) -> bool {
    let mut current = Some(el);
    while let Some(e) = current {
        let v = e.value();
        if v.attr("hidden").is_some()
            || v.attr("aria-hidden") == Some("true")
            || v.attr("type") == Some("hidden")
        {
            return true;
        }
        if let Some(style) = v.attr("style") {
            let compact: String = style
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_lowercase();
            if compact.contains("display:none") || compact.contains("visibility:hidden") {
                return true;
            }
        }
        current = e.parent().and_then(ElementRef::wrap);
    }
    false
}

#[async_trait(?Send)]
impl PageDriver for SnapshotPage {
    fn url(&self) -> String {
        self.url.clone()
    }

    async fn count(&self, locator: &Locator) -> Result<usize, BrowserError> {
        Ok(self.resolve(locator)?.len())
    }

    async fn inner_text(&self, locator: &Locator) -> Result<String, BrowserError> {
        Ok(inner_text(self.first(locator)?))
    }

    async fn all_inner_texts(&self, locator: &Locator) -> Result<Vec<String>, BrowserError> {
        Ok(self.resolve(locator)?.into_iter().map(inner_text).collect())
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, BrowserError> {
        Ok(self
            .resolve(locator)?
            .first()
            .map(|el| !is_hidden(*el))
            .unwrap_or(false))
    }

    async fn click(&self, locator: &Locator) -> Result<(), BrowserError> {
        Err(BrowserError::ReadOnly(format!("cannot click {}", locator)))
    }

    async fn scroll_into_view(&self, locator: &Locator) -> Result<(), BrowserError> {
        self.first(locator).map(|_| ())
    }

    async fn describe(&self, locator: &Locator) -> Result<ElementInfo, BrowserError> {
        let el = self.first(locator)?;
        Ok(ElementInfo {
            tag: el.value().name().to_uppercase(),
            text: inner_text(el),
            attributes: el
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            child_count: el.children().filter_map(ElementRef::wrap).count(),
        })
    }

    async fn scroll_by(&self, _dy: i64) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<(), BrowserError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div id="feed">
            <div role="article" data-id="1">
              <a role="link" href="/profile.php?id=1"><strong>Ana Pérez</strong></a>
              <div><span dir="auto">¡Hola   a todos!</span></div>
              <span>2 h</span>
            </div>
            <div role="article" data-id="2">
              <strong>Luis</strong>
              <div><span dir="auto">Muy <b>bien</b></span></div>
            </div>
            <div style="display: none"><span>See more comments</span></div>
            <span hidden>Ver más</span>
            <span>Comments</span>
          </div>
          <script>var x = "Comments";</script>
        </body></html>
    "#;

    fn page() -> SnapshotPage {
        SnapshotPage::from_html(PAGE, "https://www.facebook.com/post/1")
    }

    #[tokio::test]
    async fn test_count_and_nth() {
        let page = page();
        let articles = Locator::css(r#"div[role="article"]"#);
        assert_eq!(page.count(&articles).await.unwrap(), 2);

        let second_author = articles.clone().nth(1).locate(Query::css("strong")).first();
        assert_eq!(page.inner_text(&second_author).await.unwrap(), "Luis");

        let out_of_range = articles.nth(5);
        assert_eq!(page.count(&out_of_range).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_text_queries() {
        let page = page();

        let has_text = Locator::new(Query::has_text("span", "HOLA A TODOS"));
        assert_eq!(page.count(&has_text).await.unwrap(), 1);

        let exact = Locator::new(Query::exact_text("Comments"));
        assert_eq!(page.count(&exact).await.unwrap(), 1);

        let nested = Locator::css(r#"div[data-id="2"] span[dir="auto"]"#);
        assert_eq!(page.inner_text(&nested).await.unwrap(), "Muy bien");
    }

    #[tokio::test]
    async fn test_has_and_without() {
        let page = page();

        let with_both = Locator::new(Query::has("div", &[r#"span[dir="auto"]"#, "strong"]));
        // the two articles and the feed wrapper
        assert_eq!(page.count(&with_both).await.unwrap(), 3);

        let anchored = Locator::new(Query::has("div", &[r#"> div > span[dir="auto"]"#, "strong"]));
        assert_eq!(page.count(&anchored).await.unwrap(), 2);
        let authors = page
            .all_inner_texts(&anchored.locate(Query::css("strong")).first())
            .await
            .unwrap();
        assert_eq!(authors, vec!["Ana Pérez".to_string()]);

        let two_levels = Locator::new(Query::has("div", &["> div > div > span"]));
        assert_eq!(page.count(&two_levels).await.unwrap(), 1);
        let wrapper = page.describe(&two_levels.first()).await.unwrap();
        assert_eq!(wrapper.attributes.get("id").map(String::as_str), Some("feed"));

        let without_bold = Locator::new(Query::without(r#"span[dir="auto"]"#, &["b"]));
        assert_eq!(page.count(&without_bold).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ancestor_steps() {
        let page = page();
        let stamp = Locator::new(Query::exact_text("2 h")).first();

        let parent = page.describe(&stamp.locate(Query::parent())).await.unwrap();
        assert_eq!(parent.tag, "DIV");
        assert_eq!(parent.attributes.get("data-id").map(String::as_str), Some("1"));

        let grandparent = page.describe(&stamp.locate(Query::ancestor(2))).await.unwrap();
        assert_eq!(grandparent.attributes.get("id").map(String::as_str), Some("feed"));
        assert_eq!(grandparent.child_count, 5);
    }

    #[tokio::test]
    async fn test_inner_text_keeps_block_lines() {
        let page = page();
        let first = Locator::css(r#"div[role="article"]"#).first();
        let text = page.inner_text(&first).await.unwrap();
        assert_eq!(text, "Ana Pérez\n¡Hola a todos!\n2 h");
    }

    #[tokio::test]
    async fn test_visibility_and_read_only() {
        let page = page();

        let hidden = Locator::new(Query::has_text("span", "See more comments"));
        assert_eq!(page.count(&hidden).await.unwrap(), 1);
        assert!(!page.is_visible(&hidden).await.unwrap());
        assert!(!page.is_visible(&Locator::new(Query::has_text("span", "Ver más"))).await.unwrap());
        assert!(!page.is_visible(&Locator::css("table")).await.unwrap());

        let visible = Locator::new(Query::exact_text("Comments"));
        assert!(page.is_visible(&visible).await.unwrap());
        assert!(matches!(
            page.click(&visible).await,
            Err(BrowserError::ReadOnly(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_element_and_bad_selector() {
        let page = page();
        assert!(matches!(
            page.inner_text(&Locator::css("h3 a")).await,
            Err(BrowserError::ElementNotFound(_))
        ));
        assert!(matches!(
            page.count(&Locator::css("div[[")).await,
            Err(BrowserError::Selector(_))
        ));
    }
}
