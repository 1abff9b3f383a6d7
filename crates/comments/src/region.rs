use tracing::{debug, info, warn};

use fbharvest_browser::{Locator, PageDriver, Query};

use crate::pacing::Pacing;

pub const MAX_REGION_ROUNDS: usize = 10;

/// Markers that only render near a post's comment area.
pub fn region_indicators() -> Vec<Query> {
    vec![
        Query::exact_text("Comentarios"),
        Query::exact_text("Comments"),
        Query::css(r#"[aria-label*="comment"]"#),
        Query::css(r#"[data-testid*="comment"]"#),
        Query::exact_text("Comentar"),
        Query::exact_text("Comment"),
        Query::has_text("span", "h"),
        Query::has_text("span", "21 h"),
        Query::has_text("span", "2 h"),
    ]
}

/// Scrolls until a comment-area marker is present and brings it into view.
///
/// Returns false after [`MAX_REGION_ROUNDS`] rounds without a marker. The
/// run carries on either way.
pub async fn locate_comment_region(page: &dyn PageDriver, pacing: &Pacing) -> bool {
    let indicators = region_indicators();
    let cfg = pacing.config();

    for round in 1..=MAX_REGION_ROUNDS {
        debug!("looking for the comment section, round {}", round);

        for query in &indicators {
            let locator = Locator::new(query.clone());
            match page.count(&locator).await {
                Ok(0) => continue,
                Ok(count) => {
                    // a marker that cannot be scrolled to does not count
                    if let Err(e) = page.scroll_into_view(&locator.clone().first()).await {
                        debug!("could not scroll to {}: {}", locator, e);
                        continue;
                    }
                    info!("comment section found via {} ({} matches)", locator, count);
                    pacing.pause_ms(cfg.region_pause_ms).await;
                    return true;
                }
                Err(e) => debug!("selector {} failed: {}", locator, e),
            }
        }

        if let Err(e) = page.scroll_by(cfg.region_scroll_px).await {
            debug!("scroll failed: {}", e);
        }
        pacing.pause_ms(cfg.region_pause_ms).await;
    }

    warn!("no comment section marker after {} rounds", MAX_REGION_ROUNDS);
    false
}
