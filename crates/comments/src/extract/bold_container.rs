use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;

use fbharvest_browser::{Locator, PageDriver, Query};
use fbharvest_core::{Comment, CommentSet};

use super::{admit, truncate_chars, ExtractionStrategy, SkipReason};
use crate::labels::{contains_any, CONTAINER_NOISE_WORDS};

const MAX_CONTAINERS: usize = 20;
const MAX_TEXT_CHARS: usize = 200;
/// Containers nest, so the same comment shows up with different tails.
const DEDUP_PREFIX_CHARS: usize = 50;

/// Reads short containers holding a bold element: the bold text is the
/// author and the remaining lines are the comment. Comments from one
/// author whose text starts with the same 50 characters count as one.
pub struct BoldContainerStrategy;

#[async_trait(?Send)]
impl ExtractionStrategy for BoldContainerStrategy {
    fn name(&self) -> &'static str {
        "bold-container"
    }

    async fn extract(&self, page: &dyn PageDriver) -> Vec<Comment> {
        let containers = Locator::new(Query::has("div", &["strong"]));
        let count = match page.count(&containers).await {
            Ok(n) => n,
            Err(e) => {
                debug!("selector {} failed: {}", containers, e);
                return Vec::new();
            }
        };

        let mut set = CommentSet::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        for i in 0..count.min(MAX_CONTAINERS) {
            let container = containers.clone().nth(i);
            let Ok(text) = page.inner_text(&container).await else {
                continue;
            };
            let text = text.trim();
            let len = text.chars().count();
            if len <= 20 || len >= 300 || contains_any(&text.to_lowercase(), CONTAINER_NOISE_WORDS) {
                continue;
            }

            let bold = match page
                .all_inner_texts(&container.locate(Query::css("strong")))
                .await
            {
                Ok(texts) => texts,
                Err(e) => {
                    debug!("bold lookup in {} failed: {}", container, e);
                    continue;
                }
            };
            let Some(author) = bold.iter().map(|t| t.trim()).find(|t| !t.is_empty()) else {
                continue;
            };

            if let Some(body) = body_without_author(text, author) {
                let key = (author.to_string(), truncate_chars(&body, DEDUP_PREFIX_CHARS));
                let candidate = if seen.insert(key) {
                    Ok(Comment::new(author, body).with_source("structure"))
                } else {
                    Err(SkipReason::Duplicate)
                };
                admit(&mut set, candidate, i);
            }
        }

        set.into_vec()
    }
}

/// Lines longer than three characters other than the author's, joined and
/// capped.
fn body_without_author(text: &str, author: &str) -> Option<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && *l != author && l.chars().count() > 3)
        .collect();
    if lines.is_empty() {
        return None;
    }
    Some(truncate_chars(&lines.join(" "), MAX_TEXT_CHARS))
}
