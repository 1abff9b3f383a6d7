use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fbharvest", about = "Facebook comment scraper & video transcriber")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape the comments of a post into JSONL
    Scrape {
        /// Post URL
        #[arg(short, long)]
        url: String,

        /// Cookie export (JSON array)
        #[arg(long)]
        cookies: Option<PathBuf>,

        /// Base64-encoded cookie JSON, takes precedence over every other source
        #[arg(long)]
        cookies_b64: Option<String>,

        /// Output directory
        #[arg(short, long)]
        outdir: Option<PathBuf>,

        /// Run the browser without a window
        #[arg(long)]
        headless: bool,

        /// Maximum "load more" clicks
        #[arg(long)]
        max_clicks: Option<u32>,

        /// Also upload the result document to object storage
        #[arg(long)]
        upload: bool,
    },
    /// Print the text of a post
    Post {
        #[arg(short, long)]
        url: String,

        #[arg(long)]
        cookies: Option<PathBuf>,

        #[arg(long)]
        headless: bool,

        /// Save a PNG screenshot of the page
        #[arg(long)]
        screenshot: Option<PathBuf>,
    },
    /// Report where comment markers sit on a page
    Inspect {
        #[arg(short, long)]
        url: String,

        #[arg(long)]
        cookies: Option<PathBuf>,

        #[arg(long)]
        headless: bool,
    },
    /// Extract comments from a saved HTML page
    Extract {
        /// Saved page
        #[arg(long)]
        html: PathBuf,

        #[arg(short, long)]
        outdir: Option<PathBuf>,
    },
    /// Download a video's audio and transcribe it
    Transcribe {
        /// Video URL (Facebook, TikTok, YouTube)
        #[arg(short, long, required_unless_present = "list", conflicts_with = "list")]
        url: Option<String>,

        /// Text file with one URL per line
        #[arg(long)]
        list: Option<PathBuf>,

        #[arg(short, long)]
        outdir: Option<PathBuf>,

        /// Output name, without extension
        #[arg(long)]
        filename: Option<String>,

        /// Cookie export for sites that need a login
        #[arg(long)]
        cookies: Option<PathBuf>,

        /// Upload the transcript to object storage
        #[arg(long)]
        upload: bool,

        /// Also write the plain text
        #[arg(long)]
        text: bool,
    },
}
