use tracing::debug;

use fbharvest_browser::{ElementInfo, Locator, PageDriver, Query};

use crate::extract::truncate_chars;
use crate::labels::INSPECT_KEYWORDS;

const SAMPLES_PER_KEYWORD: usize = 5;
const TIME_SAMPLES: usize = 5;

/// One element mentioning a keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSample {
    pub tag: String,
    pub text: String,
    pub data_testid: Option<String>,
    pub aria_label: Option<String>,
}

impl From<ElementInfo> for ElementSample {
    fn from(info: ElementInfo) -> Self {
        Self {
            tag: info.tag,
            text: truncate_chars(&info.text, 100),
            data_testid: info.attributes.get("data-testid").cloned(),
            aria_label: info.attributes.get("aria-label").cloned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeywordHits {
    pub keyword: &'static str,
    pub count: usize,
    pub samples: Vec<ElementSample>,
}

/// Text around an element that looks like "2 h ...".
#[derive(Debug, Clone)]
pub struct TimeContext {
    pub parent_text: String,
    /// Elements sharing the parent's parent, the parent included.
    pub siblings: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Inspection {
    pub keywords: Vec<KeywordHits>,
    pub time_contexts: Vec<TimeContext>,
}

/// Surveys where comment-like markers sit on the page, for adjusting the
/// selectors when the layout changes. Nothing is clicked.
pub async fn inspect_page(page: &dyn PageDriver) -> Inspection {
    let mut inspection = Inspection::default();

    for keyword in INSPECT_KEYWORDS {
        let matches = Locator::new(Query::has_text("*", keyword));
        let count = page.count(&matches).await.unwrap_or(0);
        let mut samples = Vec::new();
        for i in 0..count.min(SAMPLES_PER_KEYWORD) {
            match page.describe(&matches.clone().nth(i)).await {
                Ok(info) => samples.push(ElementSample::from(info)),
                Err(e) => debug!("could not describe match {} of {}: {}", i, keyword, e),
            }
        }
        inspection.keywords.push(KeywordHits {
            keyword,
            count,
            samples,
        });
    }

    let stamps = Locator::new(Query::has_text("*", "h "));
    let count = page.count(&stamps).await.unwrap_or(0);
    for i in 0..count.min(TIME_SAMPLES) {
        let parent = stamps.clone().nth(i).locate(Query::parent());
        let Ok(parent_text) = page.inner_text(&parent).await else {
            continue;
        };
        let siblings = page
            .describe(&parent.locate(Query::parent()))
            .await
            .map(|info| info.child_count)
            .unwrap_or(0);
        inspection.time_contexts.push(TimeContext {
            parent_text: truncate_chars(&parent_text, 200),
            siblings,
        });
    }

    inspection
}
