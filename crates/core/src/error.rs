use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("config error: {0}")]
    Config(String),

    #[error("cookie source error: {0}")]
    CookieSource(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("media error: {0}")]
    Media(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}
