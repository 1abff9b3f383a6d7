pub mod extract;
pub mod inspect;
pub mod post;
pub mod scrape;
pub mod transcribe;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use url::Url;

use fbharvest_browser::{ChromePage, ChromeSession};
use fbharvest_core::config::AppConfig;
use fbharvest_core::{CookieRecord, CookieSources};

/// Cookies from the highest-priority source. Fails before any browser
/// activity when the chosen source is unusable.
pub fn resolve_cookies(
    config: &AppConfig,
    file: Option<PathBuf>,
    base64: Option<String>,
) -> Result<Vec<CookieRecord>> {
    let file = file.unwrap_or_else(|| PathBuf::from(&config.cookies.file));
    let sources = CookieSources::from_env(&config.cookies, base64, Some(file));
    let (origin, cookies) = sources.resolve()?;
    info!("using {} cookies from {}", cookies.len(), origin);
    Ok(cookies)
}

/// Launches the browser, injects cookies and navigates. The session must
/// outlive the page.
pub async fn open_page(
    config: &AppConfig,
    url: &str,
    cookies: &[CookieRecord],
) -> Result<(ChromeSession, ChromePage)> {
    Url::parse(url).with_context(|| format!("invalid url: {}", url))?;

    let session = ChromeSession::launch(&config.browser)?;
    let page = session.new_page(cookies)?;
    page.goto(url).await?;
    Ok((session, page))
}
