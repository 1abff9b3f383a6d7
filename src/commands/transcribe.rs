use std::path::PathBuf;

use anyhow::Result;

use fbharvest_core::config::AppConfig;
use fbharvest_media::{
    read_url_list, run_batch, JobOptions, JobOutcome, TranscriptionJob, WhisperModel,
    YtDlpFetcher,
};
use fbharvest_storage::AppwriteStorage;

const PREVIEW_CHARS: usize = 500;

pub struct TranscribeArgs {
    pub url: Option<String>,
    pub list: Option<PathBuf>,
    pub outdir: Option<PathBuf>,
    pub filename: Option<String>,
    pub cookies: Option<PathBuf>,
    pub upload: bool,
    pub text: bool,
}

pub async fn run(config: AppConfig, args: TranscribeArgs) -> Result<()> {
    let storage = if args.upload {
        Some(AppwriteStorage::new(&config.storage)?)
    } else {
        None
    };
    let urls = match &args.list {
        Some(list) => Some(read_url_list(list)?),
        None => None,
    };

    let options = JobOptions {
        outdir: args
            .outdir
            .unwrap_or_else(|| PathBuf::from(&config.scrape.outdir)),
        filename: args.filename,
        cookie_file: args.cookies,
        write_text: args.text,
    };

    let model = WhisperModel::acquire(&config.transcription)?;
    let fetcher = YtDlpFetcher::new(config.transcription.yt_dlp_path.clone());
    let mut job = TranscriptionJob::new(&fetcher, &model, &config.transcription.work_dir);
    if let Some(storage) = &storage {
        job = job.with_storage(storage);
    }

    let result = match (urls, args.url) {
        (Some(urls), _) => {
            let summary = run_batch(&job, &urls, &options).await;
            for outcome in &summary.completed {
                print_outcome(outcome);
            }
            println!(
                "\n{} transcribed, {} failed",
                summary.completed.len(),
                summary.failed.len()
            );
            for (url, e) in &summary.failed {
                println!("  {}: {}", url, e);
            }
            Ok(())
        }
        (None, Some(url)) => job.run(&url, &options).await.map(|outcome| print_outcome(&outcome)),
        (None, None) => Ok(()),
    };

    model.release();
    Ok(result?)
}

fn print_outcome(outcome: &JobOutcome) {
    let doc = &outcome.document;
    println!("\nURL:      {}", doc.url_origen);
    match doc.probabilidad_idioma {
        Some(p) => println!("Language: {} ({:.2})", doc.idioma.to_uppercase(), p),
        None => println!("Language: {}", doc.idioma.to_uppercase()),
    }
    println!("Saved to: {}", outcome.json_path.display());
    if let Some(text) = &outcome.text_path {
        println!("Text:     {}", text.display());
    }
    if let Some(stored) = &outcome.stored {
        println!("Uploaded: {} ({})", stored.name, stored.id);
    }
    println!("{}", doc.preview(PREVIEW_CHARS));
}
