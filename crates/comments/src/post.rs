use tracing::{info, warn};

use fbharvest_browser::{Locator, PageDriver};

pub const POST_MESSAGE_SELECTOR: &str = r#"div[data-ad-preview="message"]"#;

/// Body text of the post itself, or `None` when the message container is
/// missing (usually a login wall or a layout change).
pub async fn extract_post_text(page: &dyn PageDriver) -> Option<String> {
    let message = Locator::css(POST_MESSAGE_SELECTOR).first();
    match page.inner_text(&message).await {
        Ok(text) => {
            let text = text.trim().to_string();
            info!("post text: {} chars", text.chars().count());
            Some(text)
        }
        Err(e) => {
            warn!("post message not found, the selector may have changed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPage;

    #[tokio::test]
    async fn test_reads_first_message() {
        let page = RecordingPage::new(
            r#"<div data-ad-preview="message"> Gran día en la feria </div>
               <div data-ad-preview="message">Otro</div>"#,
        );
        assert_eq!(
            extract_post_text(&page).await.as_deref(),
            Some("Gran día en la feria")
        );
    }

    #[tokio::test]
    async fn test_missing_message() {
        let page = RecordingPage::new("<div>Inicia sesión</div>");
        assert_eq!(extract_post_text(&page).await, None);
    }
}
