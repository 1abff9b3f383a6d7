use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info};

use fbharvest_core::config::TranscriptionConfig;
use fbharvest_core::{Segment, TranscriptDocument};

use crate::error::MediaError;

/// Speech-to-text result for one audio file.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub language: String,
    /// Not every backend reports a confidence.
    pub language_probability: Option<f64>,
    pub text: String,
    pub segments: Vec<Segment>,
}

impl Transcription {
    /// Builds a transcription whose text is the segments joined by spaces.
    pub fn from_segments(
        language: impl Into<String>,
        language_probability: Option<f64>,
        segments: Vec<Segment>,
    ) -> Self {
        let text = join_segments(&segments);
        Self {
            language: language.into(),
            language_probability,
            text,
            segments,
        }
    }

    pub fn into_document(self, url: &str, at: DateTime<Local>) -> TranscriptDocument {
        TranscriptDocument {
            url_origen: url.to_string(),
            fecha_transcripcion: at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            idioma: self.language,
            probabilidad_idioma: self.language_probability,
            texto_completo: self.text,
            segmentos: self.segments,
        }
    }
}

fn join_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> Result<Transcription, MediaError>;
}

/// A Whisper model served behind an OpenAI-compatible
/// `/v1/audio/transcriptions` endpoint (faster-whisper-server and similar).
///
/// Acquire one handle per process and pass it to every job; `release` at
/// shutdown.
pub struct WhisperModel {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    beam_size: u32,
    language: Option<String>,
}

impl WhisperModel {
    pub fn acquire(config: &TranscriptionConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        let model = model_id(&config.model_size);
        info!("using transcription model {} at {}", model, config.endpoint);
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model,
            beam_size: config.beam_size,
            language: config.language.clone(),
        })
    }

    pub fn release(self) {
        debug!("released transcription model {}", self.model);
    }
}

/// Bare sizes ("small", "medium") map to the CTranslate2 builds.
fn model_id(size: &str) -> String {
    if size.contains('/') {
        size.to_string()
    } else {
        format!("Systran/faster-whisper-{}", size)
    }
}

#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    language_probability: Option<f64>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    segments: Vec<Segment>,
}

impl From<VerboseTranscription> for Transcription {
    fn from(raw: VerboseTranscription) -> Self {
        let language = raw.language.unwrap_or_default();
        if raw.segments.is_empty() {
            Transcription {
                language,
                language_probability: raw.language_probability,
                text: raw.text.trim().to_string(),
                segments: Vec::new(),
            }
        } else {
            Transcription::from_segments(language, raw.language_probability, raw.segments)
        }
    }
}

#[async_trait]
impl Transcriber for WhisperModel {
    async fn transcribe(&self, audio: &Path) -> Result<Transcription, MediaError> {
        let name = audio
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.mp3".to_string());
        let bytes = tokio::fs::read(audio).await?;

        let mut form = Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("beam_size", self.beam_size.to_string())
            .part("file", Part::bytes(bytes).file_name(name).mime_str("audio/mpeg")?);
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        let url = format!("{}/v1/audio/transcriptions", self.endpoint);
        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Transcription(format!("{} returned {}: {}", url, status, body)));
        }

        let raw: VerboseTranscription = response.json().await?;
        Ok(raw.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64, text: &str) -> Segment {
        Segment {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_text_joins_segments() {
        let t = Transcription::from_segments(
            "es",
            Some(0.98),
            vec![segment(0.0, 2.5, " Hola"), segment(2.5, 4.0, " a todos. ")],
        );
        assert_eq!(t.text, "Hola  a todos.");
    }

    #[test]
    fn test_parses_verbose_json() {
        let raw: VerboseTranscription = serde_json::from_str(
            r#"{
                "task": "transcribe",
                "language": "es",
                "duration": 4.0,
                "text": "Hola a todos.",
                "segments": [
                    {"id": 0, "start": 0.0, "end": 2.5, "text": " Hola", "avg_logprob": -0.2},
                    {"id": 1, "start": 2.5, "end": 4.0, "text": " a todos."}
                ]
            }"#,
        )
        .unwrap();

        let t = Transcription::from(raw);
        assert_eq!(t.language, "es");
        assert_eq!(t.language_probability, None);
        assert_eq!(t.segments.len(), 2);
        assert_eq!(t.segments[1].start, 2.5);
    }

    #[test]
    fn test_text_only_response() {
        let raw: VerboseTranscription = serde_json::from_str(r#"{"text": " solo texto "}"#).unwrap();
        let t = Transcription::from(raw);
        assert_eq!(t.text, "solo texto");
        assert!(t.segments.is_empty());
        assert_eq!(t.language, "");
    }

    #[test]
    fn test_model_id() {
        assert_eq!(model_id("small"), "Systran/faster-whisper-small");
        assert_eq!(model_id("openai/whisper-large-v3"), "openai/whisper-large-v3");
    }

    #[test]
    fn test_into_document() {
        let t = Transcription::from_segments("es", Some(0.9), vec![segment(0.0, 1.0, "Buenas")]);
        let at = Local::now();
        let doc = t.into_document("https://fb.watch/x", at);
        assert_eq!(doc.url_origen, "https://fb.watch/x");
        assert_eq!(doc.texto_completo, "Buenas");
        assert_eq!(doc.probabilidad_idioma, Some(0.9));
        assert!(doc.fecha_transcripcion.contains('T'));
    }
}
