use tracing::debug;

use fbharvest_browser::{Locator, PageDriver, Query};

/// A fallback-chain member that matched.
#[derive(Debug, Clone)]
pub struct Hit {
    /// Position of the matching query in the chain.
    pub index: usize,
    /// Every match of the query; apply `nth` to pick one.
    pub locator: Locator,
    pub count: usize,
}

/// First query with at least one match. Queries after it are never
/// evaluated. Lookup errors count as a miss.
pub async fn first_present(page: &dyn PageDriver, queries: &[Query]) -> Option<Hit> {
    first_present_within(page, None, queries).await
}

/// Like [`first_present`], searching inside `scope` when given.
pub async fn first_present_within(
    page: &dyn PageDriver,
    scope: Option<&Locator>,
    queries: &[Query],
) -> Option<Hit> {
    for (index, query) in queries.iter().enumerate() {
        let locator = match scope {
            Some(scope) => scope.locate(query.clone()),
            None => Locator::new(query.clone()),
        };
        match page.count(&locator).await {
            Ok(0) => {}
            Ok(count) => {
                return Some(Hit {
                    index,
                    locator,
                    count,
                })
            }
            Err(e) => debug!("selector {} failed: {}", locator, e),
        }
    }
    None
}

/// First query whose first match is visible.
pub async fn first_visible(page: &dyn PageDriver, queries: &[Query]) -> Option<Hit> {
    for (index, query) in queries.iter().enumerate() {
        let locator = Locator::new(query.clone());
        match page.is_visible(&locator.clone().first()).await {
            Ok(true) => {
                let count = match page.count(&locator).await {
                    Ok(count) => count.max(1),
                    Err(e) => {
                        debug!("counting {} failed: {}", locator, e);
                        1
                    }
                };
                return Some(Hit {
                    index,
                    locator,
                    count,
                });
            }
            Ok(false) => {}
            Err(e) => debug!("selector {} failed: {}", locator, e),
        }
    }
    None
}
