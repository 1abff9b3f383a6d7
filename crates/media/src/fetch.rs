use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use fbharvest_core::CookieRecord;

use crate::error::MediaError;

#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Downloads the audio track of `url` as `<stem>.mp3` and returns that
    /// path. `cookie_jar` is a Netscape-format cookie file.
    async fn download_audio(
        &self,
        url: &str,
        stem: &Path,
        cookie_jar: Option<&Path>,
    ) -> Result<PathBuf, MediaError>;
}

/// Audio extraction through the `yt-dlp` executable (needs `ffmpeg` on the
/// path for the mp3 conversion).
pub struct YtDlpFetcher {
    binary: String,
}

impl YtDlpFetcher {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn args(url: &str, stem: &Path, cookie_jar: Option<&Path>) -> Vec<String> {
        let mut args = vec![
            "--format".to_string(),
            "bestaudio/best".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            "mp3".to_string(),
            "--audio-quality".to_string(),
            "192K".to_string(),
            "--output".to_string(),
            format!("{}.%(ext)s", stem.display()),
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
        ];
        if let Some(jar) = cookie_jar {
            args.push("--cookies".to_string());
            args.push(jar.display().to_string());
        }
        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn download_audio(
        &self,
        url: &str,
        stem: &Path,
        cookie_jar: Option<&Path>,
    ) -> Result<PathBuf, MediaError> {
        let args = Self::args(url, stem, cookie_jar);
        debug!("{} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| MediaError::Download(format!("could not run {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::Download(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        let audio = audio_path(stem);
        if !audio.exists() {
            return Err(MediaError::MissingAudio(audio));
        }
        Ok(audio)
    }
}

pub fn audio_path(stem: &Path) -> PathBuf {
    PathBuf::from(format!("{}.mp3", stem.display()))
}

/// Cookies in the Netscape `cookies.txt` layout the downloader reads.
/// Rows without a name or domain are dropped.
pub fn netscape_cookie_jar(cookies: &[CookieRecord]) -> String {
    let mut jar = String::from("# Netscape HTTP Cookie File\n");
    for cookie in cookies {
        if cookie.name.is_empty() || cookie.domain.is_empty() {
            continue;
        }
        let domain = if cookie.http_only == Some(true) {
            format!("#HttpOnly_{}", cookie.domain)
        } else {
            cookie.domain.clone()
        };
        let flag = |b: bool| if b { "TRUE" } else { "FALSE" };
        let expires = cookie.expires.filter(|e| *e > 0.0).map(|e| e as i64).unwrap_or(0);
        jar.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            domain,
            flag(cookie.domain.starts_with('.')),
            cookie.path,
            flag(cookie.secure == Some(true)),
            expires,
            cookie.name,
            cookie.value
        ));
    }
    jar
}
