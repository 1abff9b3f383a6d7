use std::time::Duration;

use rand::Rng;

use fbharvest_core::config::PacingConfig;

/// Sleep-based pacing between page interactions. The waits give the page
/// time to render after a scroll or click; none of them is a correctness
/// barrier.
#[derive(Debug, Clone)]
pub struct Pacing {
    config: PacingConfig,
}

impl Pacing {
    pub fn new(config: PacingConfig) -> Self {
        Self { config }
    }

    /// Same scroll distances, no waiting.
    pub fn instant() -> Self {
        Self {
            config: PacingConfig {
                settle_min_ms: 0,
                settle_max_ms: 0,
                region_pause_ms: 0,
                bottom_scroll_pause_ms: 0,
                click_delay_min_ms: 0,
                click_delay_max_ms: 0,
                corrective_pause_ms: 0,
                long_comment_pause_ms: 0,
                ..PacingConfig::default()
            },
        }
    }

    pub fn config(&self) -> &PacingConfig {
        &self.config
    }

    /// Random wait after navigation.
    pub async fn settle(&self) {
        sleep(jitter(self.config.settle_min_ms, self.config.settle_max_ms)).await;
    }

    /// Random wait after a successful "load more" click.
    pub async fn after_click(&self) {
        sleep(jitter(
            self.config.click_delay_min_ms,
            self.config.click_delay_max_ms,
        ))
        .await;
    }

    pub async fn pause_ms(&self, ms: u64) {
        sleep(Duration::from_millis(ms)).await;
    }
}

/// Uniform duration in `[min_ms, max_ms]`.
pub fn jitter(min_ms: u64, max_ms: u64) -> Duration {
    if max_ms <= min_ms {
        return Duration::from_millis(min_ms);
    }
    Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
}

async fn sleep(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
