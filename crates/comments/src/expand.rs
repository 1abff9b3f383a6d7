use tracing::{debug, info, warn};

use fbharvest_browser::{Locator, PageDriver, Query};

use crate::chain::first_visible;
use crate::labels::{LOAD_MORE_COMMENTS, SEE_MORE};
use crate::pacing::Pacing;

/// At most this many truncated comments are expanded per label.
pub const MAX_EXPANSIONS_PER_LABEL: usize = 10;

/// "Load more" buttons in priority order: exact labels on spans, then on
/// divs, then generic fallbacks.
pub fn load_more_candidates() -> Vec<Query> {
    let mut candidates: Vec<Query> = LOAD_MORE_COMMENTS
        .iter()
        .map(|label| Query::has_text("span", label))
        .collect();
    candidates.extend(
        LOAD_MORE_COMMENTS
            .iter()
            .map(|label| Query::has_text("div", label)),
    );
    candidates.push(Query::css(r#"[aria-label*="comments"]"#));
    candidates.push(Query::has_text(r#"[role="button"]"#, "más"));
    candidates.push(Query::has_text(r#"[role="button"]"#, "more"));
    candidates
}

/// Scrolls to the bottom a few times, then clicks "load more" buttons until
/// none is visible, a click fails, or `max_clicks` is reached.
///
/// Returns the number of successful clicks.
pub async fn expand_comment_list(page: &dyn PageDriver, pacing: &Pacing, max_clicks: u32) -> u32 {
    let cfg = pacing.config();

    info!("scrolling to load comments");
    for _ in 0..cfg.bottom_scroll_passes {
        if let Err(e) = page.scroll_to_bottom().await {
            debug!("scroll to bottom failed: {}", e);
        }
        pacing.pause_ms(cfg.bottom_scroll_pause_ms).await;
    }

    let candidates = load_more_candidates();
    let mut clicks = 0;

    while clicks < max_clicks {
        let Some(hit) = first_visible(page, &candidates).await else {
            debug!("no load-more button visible");
            if let Err(e) = page.scroll_by(cfg.corrective_scroll_px).await {
                debug!("scroll failed: {}", e);
            }
            pacing.pause_ms(cfg.corrective_pause_ms).await;
            break;
        };

        let button = hit.locator.first();
        match page.click(&button).await {
            Ok(()) => {
                clicks += 1;
                info!("click {}: {}", clicks, button);
                pacing.after_click().await;
            }
            Err(e) => {
                warn!("load-more click on {} failed, stopping: {}", button, e);
                break;
            }
        }
    }

    clicks
}

/// Clicks inline "see more" links so truncated comments show their full
/// text. Failures on one link are skipped.
///
/// Returns the number of links clicked.
pub async fn expand_long_comments(page: &dyn PageDriver, pacing: &Pacing) -> u32 {
    let mut expanded = 0;

    for label in SEE_MORE {
        let links = Locator::new(Query::has_text("span", label));
        let count = match page.count(&links).await {
            Ok(n) => n,
            Err(e) => {
                debug!("selector {} failed: {}", links, e);
                continue;
            }
        };

        for i in 0..count.min(MAX_EXPANSIONS_PER_LABEL) {
            let link = links.clone().nth(i);
            match page.is_visible(&link).await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    debug!("visibility check on {} failed: {}", link, e);
                    continue;
                }
            }
            if let Err(e) = page.click(&link).await {
                debug!("could not expand {}: {}", link, e);
                continue;
            }
            expanded += 1;
            pacing.pause_ms(pacing.config().long_comment_pause_ms).await;
        }
    }

    expanded
}
