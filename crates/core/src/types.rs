use std::collections::HashSet;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One scraped comment. `source` and `raw_context` are debug provenance
/// written only by the fallback strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_context: Option<String>,
}

impl Comment {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            source: None,
            raw_context: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_raw_context(mut self, context: impl Into<String>) -> Self {
        self.raw_context = Some(context.into());
        self
    }

    /// A comment is worth keeping when it has a real author name or a body
    /// longer than a couple of characters.
    pub fn is_meaningful(&self) -> bool {
        self.author.chars().count() > 1 || self.text.chars().count() > 2
    }
}

/// Ordered comment list with exact `(author, text)` dedup.
#[derive(Debug, Default, Clone)]
pub struct CommentSet {
    comments: Vec<Comment>,
    seen: HashSet<(String, String)>,
}

impl CommentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when an identical `(author, text)` pair is already held.
    pub fn insert(&mut self, comment: Comment) -> bool {
        let key = (comment.author.clone(), comment.text.clone());
        if !self.seen.insert(key) {
            return false;
        }
        self.comments.push(comment);
        true
    }

    pub fn contains(&self, author: &str, text: &str) -> bool {
        self.seen.contains(&(author.to_string(), text.to_string()))
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn into_vec(self) -> Vec<Comment> {
        self.comments
    }
}

/// Single-object export of a scrape, used when the result is uploaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeDocument {
    pub url_origen: String,
    pub fecha_scraping: String,
    pub total_comentarios: usize,
    pub comentarios: Vec<Comment>,
}

impl ScrapeDocument {
    pub fn new(url: &str, comments: Vec<Comment>) -> Self {
        Self {
            url_origen: url.to_string(),
            fecha_scraping: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            total_comentarios: comments.len(),
            comentarios: comments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptDocument {
    pub url_origen: String,
    pub fecha_transcripcion: String,
    pub idioma: String,
    pub probabilidad_idioma: Option<f64>,
    pub texto_completo: String,
    pub segmentos: Vec<Segment>,
}

impl TranscriptDocument {
    /// First `limit` characters of the full text, with `...` when cut.
    pub fn preview(&self, limit: usize) -> String {
        if self.texto_completo.chars().count() > limit {
            let head: String = self.texto_completo.chars().take(limit).collect();
            format!("{}...", head)
        } else {
            self.texto_completo.clone()
        }
    }
}

/// Timestamp used in output file names, e.g. `20240131-235959`.
pub fn file_stamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d-%H%M%S").to_string()
}
