use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("script evaluation failed: {0}")]
    Evaluation(String),

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("no element matches {0}")]
    ElementNotFound(String),

    #[error("page is read-only: {0}")]
    ReadOnly(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<BrowserError> for fbharvest_core::HarvestError {
    fn from(e: BrowserError) -> Self {
        fbharvest_core::HarvestError::Browser(e.to_string())
    }
}
