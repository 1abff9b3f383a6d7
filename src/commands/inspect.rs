use std::path::PathBuf;

use anyhow::Result;

use fbharvest_comments::{inspect_page, Pacing};
use fbharvest_core::config::AppConfig;

use super::{open_page, resolve_cookies};

pub async fn run(
    mut config: AppConfig,
    url: String,
    cookies: Option<PathBuf>,
    headless: bool,
) -> Result<()> {
    if headless {
        config.browser.headless = true;
    }
    let cookies = resolve_cookies(&config, cookies, None)?;

    let (_session, page) = open_page(&config, &url, &cookies).await?;
    Pacing::new(config.pacing.clone()).settle().await;

    let inspection = inspect_page(&page).await;

    println!("\n=== Keywords ===");
    for hits in &inspection.keywords {
        println!("\n'{}': {} elements", hits.keyword, hits.count);
        for (i, sample) in hits.samples.iter().enumerate() {
            println!("  [{}] {}: {}...", i, sample.tag, sample.text);
            if sample.data_testid.is_some() || sample.aria_label.is_some() {
                println!(
                    "      data-testid={:?} aria-label={:?}",
                    sample.data_testid, sample.aria_label
                );
            }
        }
    }

    println!("\n=== Time stamps ===");
    for (i, context) in inspection.time_contexts.iter().enumerate() {
        println!("  [{}] context: {}...", i, context.parent_text);
        println!("      siblings: {}", context.siblings);
    }

    Ok(())
}
