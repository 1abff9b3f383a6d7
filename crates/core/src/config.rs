use serde::Deserialize;

use crate::error::HarvestError;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub cookies: CookieConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub chrome_path: Option<String>,
    pub window_width: u32,
    pub window_height: u32,
    pub navigation_timeout_seconds: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            chrome_path: None,
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_seconds: 60,
        }
    }
}

/// Which extraction strategies run, in order. The first one that yields
/// comments wins.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    Structural,
    TimeAnchor,
    BoldContainer,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScrapeConfig {
    pub outdir: String,
    pub max_clicks: u32,
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyKind>,
}

fn default_strategies() -> Vec<StrategyKind> {
    vec![
        StrategyKind::Structural,
        StrategyKind::TimeAnchor,
        StrategyKind::BoldContainer,
    ]
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            outdir: "datos-crudos".to_string(),
            max_clicks: 30,
            strategies: default_strategies(),
        }
    }
}

/// All waits are in milliseconds. `*_min`/`*_max` pairs are jitter ranges.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PacingConfig {
    pub settle_min_ms: u64,
    pub settle_max_ms: u64,
    pub region_pause_ms: u64,
    pub region_scroll_px: i64,
    pub bottom_scroll_passes: u32,
    pub bottom_scroll_pause_ms: u64,
    pub click_delay_min_ms: u64,
    pub click_delay_max_ms: u64,
    pub corrective_scroll_px: i64,
    pub corrective_pause_ms: u64,
    pub long_comment_pause_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            settle_min_ms: 3000,
            settle_max_ms: 6000,
            region_pause_ms: 2000,
            region_scroll_px: 800,
            bottom_scroll_passes: 3,
            bottom_scroll_pause_ms: 2000,
            click_delay_min_ms: 1500,
            click_delay_max_ms: 3000,
            corrective_scroll_px: 500,
            corrective_pause_ms: 1000,
            long_comment_pause_ms: 300,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CookieConfig {
    pub file: String,
    pub base64_env: String,
    pub json_env: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            file: "facebook-cookies.json".to_string(),
            base64_env: "FB_COOKIES_B64".to_string(),
            json_env: "FB_COOKIES_JSON".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub endpoint: String,
    pub model_size: String,
    pub beam_size: u32,
    pub language: Option<String>,
    pub work_dir: String,
    pub yt_dlp_path: String,
    pub request_timeout_seconds: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000".to_string(),
            model_size: "small".to_string(),
            beam_size: 5,
            language: None,
            work_dir: "/tmp".to_string(),
            yt_dlp_path: "yt-dlp".to_string(),
            request_timeout_seconds: 1800,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub bucket_id: String,
}

impl StorageConfig {
    /// Reports every missing value at once so the operator can fix them in
    /// one go.
    pub fn validate(&self) -> Result<(), HarvestError> {
        let missing: Vec<&str> = [
            ("APPWRITE_ENDPOINT", &self.endpoint),
            ("APPWRITE_PROJECT_ID", &self.project_id),
            ("APPWRITE_API_KEY", &self.api_key),
            ("APPWRITE_BUCKET_ID", &self.bucket_id),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(HarvestError::Config(format!(
                "missing storage settings: {}",
                missing.join(", ")
            )))
        }
    }
}
