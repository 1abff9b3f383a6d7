use std::path::PathBuf;

use anyhow::Result;

use fbharvest_comments::{extract_post_text, Pacing};
use fbharvest_core::config::AppConfig;

use super::{open_page, resolve_cookies};

pub async fn run(
    mut config: AppConfig,
    url: String,
    cookies: Option<PathBuf>,
    headless: bool,
    screenshot: Option<PathBuf>,
) -> Result<()> {
    if headless {
        config.browser.headless = true;
    }
    let cookies = resolve_cookies(&config, cookies, None)?;

    let (_session, page) = open_page(&config, &url, &cookies).await?;
    Pacing::new(config.pacing.clone()).settle().await;

    match extract_post_text(&page).await {
        Some(text) => println!("{}", text),
        None => println!("Post text not found (login wall or changed layout)"),
    }

    if let Some(path) = screenshot {
        page.screenshot(&path)?;
        println!("Screenshot saved to {}", path.display());
    }

    Ok(())
}
