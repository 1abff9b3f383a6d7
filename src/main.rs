mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use fbharvest_core::config::AppConfig;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    // one page driven from one task
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_str = std::fs::read_to_string(&cli.config).unwrap_or_else(|_| {
        warn!(path = %cli.config, "config file not found, using defaults");
        include_str!("../config/default.toml").to_string()
    });
    let mut config: AppConfig = toml::from_str(&config_str)?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());

    match cli.command {
        Commands::Scrape {
            url,
            cookies,
            cookies_b64,
            outdir,
            headless,
            max_clicks,
            upload,
        } => {
            commands::scrape::run(
                config,
                commands::scrape::ScrapeArgs {
                    url,
                    cookies,
                    cookies_b64,
                    outdir,
                    headless,
                    max_clicks,
                    upload,
                },
            )
            .await?;
        }
        Commands::Post {
            url,
            cookies,
            headless,
            screenshot,
        } => {
            commands::post::run(config, url, cookies, headless, screenshot).await?;
        }
        Commands::Inspect {
            url,
            cookies,
            headless,
        } => {
            commands::inspect::run(config, url, cookies, headless).await?;
        }
        Commands::Extract { html, outdir } => {
            commands::extract::run(config, html, outdir).await?;
        }
        Commands::Transcribe {
            url,
            list,
            outdir,
            filename,
            cookies,
            upload,
            text,
        } => {
            commands::transcribe::run(
                config,
                commands::transcribe::TranscribeArgs {
                    url,
                    list,
                    outdir,
                    filename,
                    cookies,
                    upload,
                    text,
                },
            )
            .await?;
        }
    }

    Ok(())
}

/// Environment variables win over the config file; command-line flags are
/// applied later by each command.
fn apply_env_overrides(config: &mut AppConfig, var: impl Fn(&str) -> Option<String>) {
    let set = |name: &str| var(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = set("CHROME_PATH") {
        config.browser.chrome_path = Some(v);
    }
    if let Some(v) = set("HEADLESS") {
        config.browser.headless = v != "0" && v.to_lowercase() != "false";
    }
    if let Some(v) = set("MAX_CLICKS") {
        if let Ok(n) = v.parse::<u32>() {
            config.scrape.max_clicks = n;
        }
    }
    if let Some(v) = set("WHISPER_MODEL_SIZE") {
        config.transcription.model_size = v;
    }
    if let Some(v) = set("WHISPER_ENDPOINT") {
        config.transcription.endpoint = v;
    }
    if let Some(v) = set("APPWRITE_ENDPOINT") {
        config.storage.endpoint = v;
    }
    if let Some(v) = set("APPWRITE_PROJECT_ID") {
        config.storage.project_id = v;
    }
    if let Some(v) = set("APPWRITE_API_KEY") {
        config.storage.api_key = v;
    }
    if let Some(v) = set("APPWRITE_BUCKET_ID") {
        config.storage.bucket_id = v;
    }
}
