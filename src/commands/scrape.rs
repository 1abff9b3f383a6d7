use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use tracing::info;

use fbharvest_comments::CommentScraper;
use fbharvest_core::config::AppConfig;
use fbharvest_core::{file_stamp, ScrapeDocument};
use fbharvest_storage::local::{stamped_path, write_json_pretty, write_jsonl};
use fbharvest_storage::{AppwriteStorage, ObjectStorage};

use super::{open_page, resolve_cookies};

pub struct ScrapeArgs {
    pub url: String,
    pub cookies: Option<PathBuf>,
    pub cookies_b64: Option<String>,
    pub outdir: Option<PathBuf>,
    pub headless: bool,
    pub max_clicks: Option<u32>,
    pub upload: bool,
}

pub async fn run(mut config: AppConfig, args: ScrapeArgs) -> Result<()> {
    if args.headless {
        config.browser.headless = true;
    }
    if let Some(n) = args.max_clicks {
        config.scrape.max_clicks = n;
    }
    let outdir = args
        .outdir
        .unwrap_or_else(|| PathBuf::from(&config.scrape.outdir));

    // configuration problems surface before the browser starts
    let storage = if args.upload {
        Some(AppwriteStorage::new(&config.storage)?)
    } else {
        None
    };
    let cookies = resolve_cookies(&config, args.cookies, args.cookies_b64)?;

    let (_session, page) = open_page(&config, &args.url, &cookies).await?;
    let report = CommentScraper::from_config(&config).run(&page).await;

    let stamp = file_stamp(Local::now());
    let jsonl = stamped_path(&outdir, "comments", &stamp, "jsonl");
    write_jsonl(&jsonl, &report.comments)?;
    info!("saved {} comments to {}", report.comments.len(), jsonl.display());

    println!("Post:            {}", args.url);
    println!("Final URL:       {}", report.url);
    println!("Comment section: {}", if report.region_found { "found" } else { "not found" });
    println!("Load-more:       {}", report.load_more_clicks);
    println!("Expanded:        {}", report.expanded);
    println!("Strategy:        {}", report.strategy.unwrap_or("none"));
    println!("Comments:        {}", report.comments.len());
    println!("Saved to:        {}", jsonl.display());

    if let Some(storage) = storage {
        let document = ScrapeDocument::new(&args.url, report.comments);
        let json = stamped_path(&outdir, "comments", &stamp, "json");
        write_json_pretty(&json, &document)?;
        let stored = storage.upload(&json).await?;
        println!("Uploaded:        {} ({})", stored.name, stored.id);
    }

    Ok(())
}
