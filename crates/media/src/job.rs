use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;
use tracing::{info, warn};

use fbharvest_core::cookies::load_cookie_file;
use fbharvest_core::{file_stamp, TranscriptDocument};
use fbharvest_storage::local::{named_path, stamped_path, write_json_pretty, write_text};
use fbharvest_storage::{ObjectStorage, StoredObject};

use crate::cleanup::CleanupGuard;
use crate::error::MediaError;
use crate::fetch::{audio_path, netscape_cookie_jar, MediaFetcher};
use crate::transcribe::Transcriber;

static STEM_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    pub outdir: PathBuf,
    /// Output name without extension; defaults to `transcripcion_<stamp>`.
    pub filename: Option<String>,
    /// JSON cookie export handed to the downloader.
    pub cookie_file: Option<PathBuf>,
    /// Also write the plain text next to the JSON.
    pub write_text: bool,
}

#[derive(Debug)]
pub struct JobOutcome {
    pub document: TranscriptDocument,
    pub json_path: PathBuf,
    pub text_path: Option<PathBuf>,
    pub stored: Option<StoredObject>,
}

/// Download, transcribe, save and optionally upload one video's audio.
pub struct TranscriptionJob<'a> {
    fetcher: &'a dyn MediaFetcher,
    transcriber: &'a dyn Transcriber,
    storage: Option<&'a dyn ObjectStorage>,
    work_dir: PathBuf,
}

impl<'a> TranscriptionJob<'a> {
    pub fn new(
        fetcher: &'a dyn MediaFetcher,
        transcriber: &'a dyn Transcriber,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            transcriber,
            storage: None,
            work_dir: work_dir.into(),
        }
    }

    pub fn with_storage(mut self, storage: &'a dyn ObjectStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub async fn run(&self, url: &str, options: &JobOptions) -> Result<JobOutcome, MediaError> {
        let stem = unique_stem(&self.work_dir);
        let mut temp = CleanupGuard::default();
        // tracked before download so partial output is removed too
        temp.track(audio_path(&stem));

        let jar = match &options.cookie_file {
            Some(path) => {
                let cookies = load_cookie_file(path)?;
                let jar = PathBuf::from(format!("{}.cookies.txt", stem.display()));
                std::fs::write(&jar, netscape_cookie_jar(&cookies))?;
                temp.track(jar.clone());
                Some(jar)
            }
            None => None,
        };

        info!("downloading audio from {}", url);
        let audio = self
            .fetcher
            .download_audio(url, &stem, jar.as_deref())
            .await?;
        temp.track(audio.clone());

        info!("transcribing {}", audio.display());
        let transcription = self.transcriber.transcribe(&audio).await?;
        match transcription.language_probability {
            Some(p) => info!(
                "detected language: {} (probability {:.2})",
                transcription.language.to_uppercase(),
                p
            ),
            None => info!(
                "detected language: {}",
                transcription.language.to_uppercase()
            ),
        }

        let now = Local::now();
        let document = transcription.into_document(url, now);

        let json_path = match &options.filename {
            Some(name) => named_path(&options.outdir, name, "json"),
            None => free_path(stamped_path(
                &options.outdir,
                "transcripcion",
                &file_stamp(now),
                "json",
            )),
        };
        write_json_pretty(&json_path, &document)?;
        info!("saved {}", json_path.display());

        let text_path = if options.write_text {
            let path = json_path.with_extension("txt");
            write_text(&path, &document.texto_completo)?;
            Some(path)
        } else {
            None
        };

        let stored = match self.storage {
            Some(storage) => Some(storage.upload(&json_path).await?),
            None => None,
        };

        Ok(JobOutcome {
            document,
            json_path,
            text_path,
            stored,
        })
    }
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub completed: Vec<JobOutcome>,
    pub failed: Vec<(String, MediaError)>,
}

/// Runs `urls` one after another. A failed URL is logged and the batch
/// moves on.
pub async fn run_batch(
    job: &TranscriptionJob<'_>,
    urls: &[String],
    options: &JobOptions,
) -> BatchSummary {
    let mut options = options.clone();
    if options.filename.take().is_some() {
        warn!("--filename is ignored for batches, using stamped names");
    }

    info!("processing {} urls", urls.len());
    let mut summary = BatchSummary::default();
    for (i, url) in urls.iter().enumerate() {
        info!("[{}/{}] {}", i + 1, urls.len(), url);
        match job.run(url, &options).await {
            Ok(outcome) => summary.completed.push(outcome),
            Err(e) => {
                warn!("{} failed: {}", url, e);
                summary.failed.push((url.clone(), e));
            }
        }
    }
    summary
}

/// One URL per non-blank line.
pub fn read_url_list(path: &Path) -> Result<Vec<String>, MediaError> {
    if !path.exists() {
        return Err(MediaError::Config(format!(
            "url list not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

fn unique_stem(work_dir: &Path) -> PathBuf {
    let n = STEM_COUNTER.fetch_add(1, Ordering::Relaxed);
    work_dir.join(format!(
        "fbharvest-audio-{}-{}-{}",
        std::process::id(),
        Local::now().format("%Y%m%d%H%M%S%3f"),
        n
    ))
}

/// `path`, or `path` with a `-2`, `-3`... suffix when taken. Stamps have
/// one-second resolution and batch jobs can finish within the same second.
fn free_path(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    let mut n = 2;
    loop {
        let candidate = path.with_file_name(format!("{}-{}.{}", stem, n, ext));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
