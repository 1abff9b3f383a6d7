//! Turns a fully-expanded page into comments.
//!
//! Strategies run in order and the first one producing anything wins, so a
//! stable structural match always takes precedence over the looser
//! text-shape guesses.

mod bold_container;
mod structural;
mod time_anchor;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, enabled, info, warn, Level};

use fbharvest_browser::{BrowserError, Locator, PageDriver};
use fbharvest_core::config::StrategyKind;
use fbharvest_core::{Comment, CommentSet};

pub use bold_container::BoldContainerStrategy;
pub use structural::StructuralStrategy;
pub use time_anchor::TimeAnchorStrategy;

/// Why a candidate block produced no comment.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("too little author or text")]
    Rejected,

    #[error("same author and text as an earlier comment")]
    Duplicate,

    #[error("page error: {0}")]
    Page(#[from] BrowserError),
}

#[async_trait(?Send)]
pub trait ExtractionStrategy {
    fn name(&self) -> &'static str;

    /// Comments found on the page. An empty vector means the strategy did
    /// not apply.
    async fn extract(&self, page: &dyn PageDriver) -> Vec<Comment>;
}

/// Outcome of a full extraction pass.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Strategy that produced the comments, if any did.
    pub strategy: Option<&'static str>,
    pub comments: Vec<Comment>,
}

pub struct CommentExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl CommentExtractor {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn from_kinds(kinds: &[StrategyKind]) -> Self {
        let strategies = kinds
            .iter()
            .map(|kind| -> Box<dyn ExtractionStrategy> {
                match kind {
                    StrategyKind::Structural => Box::new(StructuralStrategy::default()),
                    StrategyKind::TimeAnchor => Box::new(TimeAnchorStrategy),
                    StrategyKind::BoldContainer => Box::new(BoldContainerStrategy),
                }
            })
            .collect();
        Self::new(strategies)
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn extract(&self, page: &dyn PageDriver) -> Extraction {
        for strategy in &self.strategies {
            let comments = strategy.extract(page).await;
            if !comments.is_empty() {
                info!(
                    "{} strategy extracted {} comments",
                    strategy.name(),
                    comments.len()
                );
                return Extraction {
                    strategy: Some(strategy.name()),
                    comments,
                };
            }
            debug!("{} strategy found nothing", strategy.name());
        }

        warn!("no comments extracted");
        log_page_sample(page).await;
        Extraction::default()
    }
}

impl Default for CommentExtractor {
    fn default() -> Self {
        Self::from_kinds(&[
            StrategyKind::Structural,
            StrategyKind::TimeAnchor,
            StrategyKind::BoldContainer,
        ])
    }
}

/// Records a candidate into `set`, logging why it was dropped if it was.
fn admit(set: &mut CommentSet, candidate: Result<Comment, SkipReason>, index: usize) {
    let outcome = candidate.and_then(|comment| {
        if set.contains(&comment.author, &comment.text) {
            Err(SkipReason::Duplicate)
        } else {
            Ok(comment)
        }
    });

    match outcome {
        Ok(comment) => {
            debug!(
                "comment {}: {} - {}",
                set.len() + 1,
                comment.author,
                truncate_chars(&comment.text, 50)
            );
            set.insert(comment);
        }
        Err(SkipReason::Page(e)) => warn!("block {} skipped: {}", index, e),
        Err(reason) => debug!("block {} skipped: {}", index, reason),
    }
}

/// First `max` characters, never splitting a code point.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Dumps the start of the first divs so an empty result can be diagnosed.
async fn log_page_sample(page: &dyn PageDriver) {
    if !enabled!(Level::DEBUG) {
        return;
    }
    let divs = Locator::css("div");
    let count = page.count(&divs).await.unwrap_or(0);
    for i in 0..count.min(20) {
        if let Ok(text) = page.inner_text(&divs.clone().nth(i)).await {
            let text = text.trim();
            if !text.is_empty() {
                debug!("div {}: {}", i, truncate_chars(text, 100));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPage;

    const THREE_BLOCKS: &str = r#"
        <html><body>
          <div data-testid="comment"><strong>Ana</strong><span dir="auto">Hola!</span></div>
          <div data-testid="comment"><strong>Ana</strong><span dir="auto">Hola!</span></div>
          <div data-testid="comment"><span dir="auto">ok</span></div>
        </body></html>
    "#;

    #[tokio::test]
    async fn test_rejects_and_dedups() {
        let page = RecordingPage::new(THREE_BLOCKS);

        let extraction = CommentExtractor::default().extract(&page).await;

        assert_eq!(extraction.strategy, Some("structural"));
        assert_eq!(extraction.comments, vec![Comment::new("Ana", "Hola!")]);
    }

    #[tokio::test]
    async fn test_page_error_skips_only_that_block() {
        let html = r#"
            <html><body>
              <div data-testid="comment"><strong>Ana</strong><span dir="auto">Primero</span></div>
              <div data-testid="comment"><strong>Luis</strong><span dir="auto">Segundo</span></div>
              <div data-testid="comment"><strong>Eva</strong><span dir="auto">Tercero</span></div>
            </body></html>
        "#;
        let page = RecordingPage::new(html).failing_under(r#"[data-testid="comment"] >> nth=1"#);

        let extraction = CommentExtractor::default().extract(&page).await;

        assert_eq!(
            extraction.comments,
            vec![
                Comment::new("Ana", "Primero"),
                Comment::new("Eva", "Tercero"),
            ]
        );
    }

    #[tokio::test]
    async fn test_later_strategy_used_when_structure_missing() {
        let html = r#"
            <html><body>
              <div><p>Marta Gómez</p><p>2 h</p><p>Qué buena noticia para el barrio</p></div>
            </body></html>
        "#;
        let page = RecordingPage::new(html);

        let extraction = CommentExtractor::default().extract(&page).await;

        assert_eq!(extraction.strategy, Some("time-anchor"));
        assert_eq!(extraction.comments[0].author, "Marta Gómez");
        assert_eq!(extraction.comments[0].text, "Qué buena noticia para el barrio");
    }

    #[tokio::test]
    async fn test_nothing_found() {
        let page = RecordingPage::new("<html><body><p>x</p></body></html>");

        let extraction = CommentExtractor::from_kinds(&[StrategyKind::Structural])
            .extract(&page)
            .await;

        assert!(extraction.strategy.is_none());
        assert!(extraction.comments.is_empty());
    }

    #[test]
    fn test_from_kinds_keeps_order() {
        let extractor =
            CommentExtractor::from_kinds(&[StrategyKind::BoldContainer, StrategyKind::Structural]);
        assert_eq!(
            extractor.strategy_names(),
            vec!["bold-container", "structural"]
        );
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("ñañaña", 3), "ñañ");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }
}
