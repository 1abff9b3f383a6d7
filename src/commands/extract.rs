use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;

use fbharvest_browser::SnapshotPage;
use fbharvest_comments::CommentExtractor;
use fbharvest_core::config::AppConfig;
use fbharvest_core::file_stamp;
use fbharvest_storage::local::{stamped_path, write_jsonl};

/// Runs the extraction chain on a saved page. Nothing can be clicked, so
/// only comments already expanded when the page was saved are found.
pub async fn run(config: AppConfig, html: PathBuf, outdir: Option<PathBuf>) -> Result<()> {
    let page = SnapshotPage::open(&html)
        .with_context(|| format!("could not read {}", html.display()))?;
    let extraction = CommentExtractor::from_kinds(&config.scrape.strategies)
        .extract(&page)
        .await;

    let outdir = outdir.unwrap_or_else(|| PathBuf::from(&config.scrape.outdir));
    let jsonl = stamped_path(&outdir, "comments", &file_stamp(Local::now()), "jsonl");
    write_jsonl(&jsonl, &extraction.comments)?;

    println!("Strategy: {}", extraction.strategy.unwrap_or("none"));
    println!("Comments: {}", extraction.comments.len());
    println!("Saved to: {}", jsonl.display());

    Ok(())
}
