use tracing::info;

use fbharvest_browser::PageDriver;
use fbharvest_core::{AppConfig, Comment};

use crate::expand::{expand_comment_list, expand_long_comments};
use crate::extract::CommentExtractor;
use crate::pacing::Pacing;
use crate::region::locate_comment_region;

/// What one scrape run did and found.
#[derive(Debug)]
pub struct ScrapeReport {
    pub url: String,
    pub region_found: bool,
    pub load_more_clicks: u32,
    pub expanded: u32,
    pub strategy: Option<&'static str>,
    pub comments: Vec<Comment>,
}

/// Drives an already-navigated page through region search, expansion and
/// extraction. Each stage is best-effort, so a run always yields a report.
pub struct CommentScraper {
    pacing: Pacing,
    extractor: CommentExtractor,
    max_clicks: u32,
}

impl CommentScraper {
    pub fn new(pacing: Pacing, extractor: CommentExtractor, max_clicks: u32) -> Self {
        Self {
            pacing,
            extractor,
            max_clicks,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Pacing::new(config.pacing.clone()),
            CommentExtractor::from_kinds(&config.scrape.strategies),
            config.scrape.max_clicks,
        )
    }

    pub async fn run(&self, page: &dyn PageDriver) -> ScrapeReport {
        self.pacing.settle().await;
        let url = page.url();
        info!("page settled at {}", url);

        let region_found = locate_comment_region(page, &self.pacing).await;

        let load_more_clicks = expand_comment_list(page, &self.pacing, self.max_clicks).await;
        info!("load-more clicks: {}", load_more_clicks);

        let expanded = expand_long_comments(page, &self.pacing).await;
        info!("long comments expanded: {}", expanded);

        let extraction = self.extractor.extract(page).await;

        ScrapeReport {
            url,
            region_found,
            load_more_clicks,
            expanded,
            strategy: extraction.strategy,
            comments: extraction.comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPage;

    fn scraper() -> CommentScraper {
        CommentScraper::new(Pacing::instant(), CommentExtractor::default(), 30)
    }

    #[tokio::test]
    async fn test_end_to_end_on_saved_page() {
        let page = RecordingPage::new(
            r#"
            <html><body>
              <span>Comments</span>
              <div data-testid="comment"><strong>Ana</strong><span dir="auto">Hola!</span></div>
              <div data-testid="comment"><strong>Ana</strong><span dir="auto">Hola!</span></div>
              <div data-testid="comment"><span dir="auto">ok</span></div>
            </body></html>
            "#,
        );

        let report = scraper().run(&page).await;

        assert!(report.region_found);
        assert_eq!(report.load_more_clicks, 0);
        assert_eq!(report.strategy, Some("structural"));
        assert_eq!(report.comments, vec![Comment::new("Ana", "Hola!")]);
    }

    #[tokio::test]
    async fn test_empty_page_still_reports() {
        let page = RecordingPage::new("<html><body></body></html>");

        let report = scraper().run(&page).await;

        assert!(!report.region_found);
        assert!(report.strategy.is_none());
        assert!(report.comments.is_empty());
        assert_eq!(report.url, "https://www.facebook.com/snapshot");
    }

    #[test]
    fn test_from_config() {
        let mut config = AppConfig::default();
        config.scrape.max_clicks = 7;
        let scraper = CommentScraper::from_config(&config);
        assert_eq!(scraper.max_clicks, 7);
    }
}
