use async_trait::async_trait;
use tracing::{debug, info};

use fbharvest_browser::{BrowserError, Locator, PageDriver, Query};
use fbharvest_core::{Comment, CommentSet};

use super::{admit, ExtractionStrategy, SkipReason};
use crate::chain::first_present;

/// Comment blocks found through known attribute and layout selectors.
///
/// Only the first block selector with matches is used. Within each block the
/// author is the first non-empty author selector match, and the body joins
/// the distinct text fragments of every text selector.
pub struct StructuralStrategy {
    blocks: Vec<Query>,
    authors: Vec<Query>,
    texts: Vec<Query>,
}

impl Default for StructuralStrategy {
    fn default() -> Self {
        Self {
            blocks: vec![
                Query::css(r#"[data-testid="UFI2Comment/root_depth_0"]"#),
                Query::css(r#"[data-testid="comment"]"#),
                Query::css(r#"div[aria-label="Comment"]"#),
                Query::css(r#"div[role="article"]"#),
                Query::css(r#"[data-ad-preview="message"]"#),
                Query::has("div", &[r#"> div > span[dir="auto"]"#, "strong"]),
                Query::has("div", &["> div > div > strong", r#"span[dir="auto"]"#]),
            ],
            authors: vec![
                Query::css("strong"),
                Query::css(r#"a[role="link"] strong"#),
                Query::css(r#"span[dir="auto"] strong"#),
                Query::css("h3 a"),
                Query::css(r#"a[href*="profile"]"#),
            ],
            texts: vec![
                Query::without(r#"span[dir="auto"]"#, &["strong"]),
                Query::css(r#"div[data-ad-preview="message"]"#),
                Query::css(r#"[dir="auto"]"#),
                Query::css("div > span"),
            ],
        }
    }
}

impl StructuralStrategy {
    pub fn block_selectors(&self) -> &[Query] {
        &self.blocks
    }

    async fn extract_block(
        &self,
        page: &dyn PageDriver,
        block: &Locator,
    ) -> Result<Comment, SkipReason> {
        // virtualized lists drop blocks that scrolled away
        if page.count(block).await? == 0 {
            return Err(BrowserError::ElementNotFound(block.to_string()).into());
        }

        let author = self.author(page, block).await;
        let mut fragments = Vec::new();
        for query in &self.texts {
            let locator = block.locate(query.clone());
            match page.all_inner_texts(&locator).await {
                Ok(texts) => fragments.extend(texts),
                Err(e) => debug!("selector {} failed: {}", locator, e),
            }
        }

        let comment = Comment::new(author.clone(), assemble_body(&fragments, &author));
        if comment.is_meaningful() {
            Ok(comment)
        } else {
            Err(SkipReason::Rejected)
        }
    }

    async fn author(&self, page: &dyn PageDriver, block: &Locator) -> String {
        for query in &self.authors {
            let locator = block.locate(query.clone()).first();
            match page.inner_text(&locator).await {
                Ok(text) if !text.trim().is_empty() => return text.trim().to_string(),
                Ok(_) | Err(BrowserError::ElementNotFound(_)) => {}
                Err(e) => debug!("selector {} failed: {}", locator, e),
            }
        }
        String::new()
    }
}

#[async_trait(?Send)]
impl ExtractionStrategy for StructuralStrategy {
    fn name(&self) -> &'static str {
        "structural"
    }

    async fn extract(&self, page: &dyn PageDriver) -> Vec<Comment> {
        let Some(hit) = first_present(page, &self.blocks).await else {
            debug!("no comment block selector matched");
            return Vec::new();
        };
        info!("found {} blocks with {}", hit.count, hit.locator);

        let mut set = CommentSet::new();
        for i in 0..hit.count {
            let block = hit.locator.clone().nth(i);
            let candidate = self.extract_block(page, &block).await;
            admit(&mut set, candidate, i);
        }
        set.into_vec()
    }
}

/// Joins the distinct fragments longer than one character that are not the
/// author's name, in first-seen order.
fn assemble_body(fragments: &[String], author: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for fragment in fragments {
        let fragment = fragment.trim();
        if fragment.chars().count() > 1 && fragment != author && !kept.contains(&fragment) {
            kept.push(fragment);
        }
    }
    kept.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPage;

    #[test]
    fn test_assemble_body() {
        let fragments: Vec<String> = ["Ana", "Buen día", " x ", "Buen día", "", "Gracias"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(assemble_body(&fragments, "Ana"), "Buen día Gracias");
        assert_eq!(assemble_body(&[], "Ana"), "");
    }

    #[tokio::test]
    async fn test_first_matching_block_selector_wins() {
        let html = r#"
            <html><body>
              <div data-testid="comment"><strong>Ana</strong><span dir="auto">Hola!</span></div>
              <div role="article"><strong>Luis</strong><span dir="auto">Otro texto</span></div>
            </body></html>
        "#;
        let page = RecordingPage::new(html);
        let strategy = StructuralStrategy::default();

        let comments = strategy.extract(&page).await;

        assert_eq!(comments, vec![Comment::new("Ana", "Hola!")]);

        let top_level: Vec<String> = page
            .counted()
            .into_iter()
            .filter(|q| !q.contains(" >> "))
            .collect();
        let selectors: Vec<String> = strategy
            .block_selectors()
            .iter()
            .map(|q| q.to_string())
            .collect();
        assert_eq!(top_level, selectors[..2].to_vec());
    }

    #[tokio::test]
    async fn test_layout_selector_yields_one_comment_per_container() {
        let html = r#"
            <html><body>
              <div id="feed">
                <div class="c"><div><span dir="auto">Hola a todos</span></div><strong>Ana</strong></div>
                <div class="c"><div><span dir="auto">Muy buen punto</span></div><strong>Luis</strong></div>
              </div>
            </body></html>
        "#;
        let page = RecordingPage::new(html);

        let comments = StructuralStrategy::default().extract(&page).await;

        assert_eq!(
            comments,
            vec![
                Comment::new("Ana", "Hola a todos"),
                Comment::new("Luis", "Muy buen punto"),
            ]
        );
    }

    #[tokio::test]
    async fn test_nested_bold_layout_skips_wrappers() {
        let html = r#"
            <html><body>
              <div id="feed">
                <div class="c"><div><div><strong>Ana</strong></div></div><p><span dir="auto">Buen día</span></p></div>
                <div class="c"><div><div><strong>Luis</strong></div></div><p><span dir="auto">Gracias</span></p></div>
              </div>
            </body></html>
        "#;
        let page = RecordingPage::new(html);

        let comments = StructuralStrategy::default().extract(&page).await;

        assert_eq!(
            comments,
            vec![Comment::new("Ana", "Buen día"), Comment::new("Luis", "Gracias")]
        );
    }

    #[tokio::test]
    async fn test_author_name_excluded_from_body() {
        let html = r#"
            <html><body>
              <div role="article">
                <span dir="auto"><strong>Ana</strong></span>
                <span dir="auto">Ana</span>
                <span dir="auto">Buen día</span>
                <span dir="auto">x</span>
              </div>
            </body></html>
        "#;
        let page = RecordingPage::new(html);

        let comments = StructuralStrategy::default().extract(&page).await;

        assert_eq!(comments, vec![Comment::new("Ana", "Buen día")]);
    }

    #[tokio::test]
    async fn test_author_falls_back_to_profile_link() {
        let html = r#"
            <html><body>
              <div aria-label="Comment">
                <a href="/profile.php?id=9">Carlos Ruiz</a>
                <div><span>Totalmente de acuerdo</span></div>
              </div>
            </body></html>
        "#;
        let page = RecordingPage::new(html);

        let comments = StructuralStrategy::default().extract(&page).await;

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author, "Carlos Ruiz");
        assert_eq!(comments[0].text, "Totalmente de acuerdo");
    }
}
