/// Session cookies for the automated browser.
/// Exported cookie dumps carry extra keys and loosely-cased `sameSite`
/// values that the DevTools cookie API rejects, so every record is reduced
/// to the recognized fields before use.

use std::fmt;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::CookieConfig;
use crate::error::HarvestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    /// Case-insensitive match on the three valid values, `Lax` for anything else.
    pub fn normalize(raw: Option<&Value>) -> Self {
        match raw.and_then(Value::as_str).map(str::to_lowercase).as_deref() {
            Some("strict") => SameSite::Strict,
            Some("none") => SameSite::None,
            _ => SameSite::Lax,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub same_site: SameSite,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
}

impl CookieRecord {
    /// Builds a record from one raw row. Never fails: non-object rows and
    /// absent fields fall back to defaults.
    pub fn from_raw(raw: &Value) -> Self {
        let field = |key: &str| raw.get(key);

        Self {
            name: text_or(field("name"), ""),
            value: text_or(field("value"), ""),
            domain: text_or(field("domain"), ""),
            path: text_or(field("path"), "/"),
            same_site: SameSite::normalize(field("sameSite")),
            http_only: field("httpOnly").map(truthy),
            secure: field("secure").map(truthy),
            expires: field("expires").and_then(Value::as_f64),
        }
    }
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Sanitizes a whole cookie dump. Accepts a bare array or an object with a
/// `cookies` array; anything else is treated as "no cookies".
pub fn sanitize_cookies(raw: &Value) -> Vec<CookieRecord> {
    let rows = match raw {
        Value::Array(rows) => rows.as_slice(),
        Value::Object(map) => match map.get("cookies") {
            Some(Value::Array(rows)) => rows.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    rows.iter().map(CookieRecord::from_raw).collect()
}

/// Where a cookie dump was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieOrigin {
    RequestBase64,
    EnvBase64(String),
    EnvJson(String),
    File(PathBuf),
    Absent,
}

impl fmt::Display for CookieOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CookieOrigin::RequestBase64 => write!(f, "request field"),
            CookieOrigin::EnvBase64(var) => write!(f, "env {} (base64)", var),
            CookieOrigin::EnvJson(var) => write!(f, "env {} (json)", var),
            CookieOrigin::File(path) => write!(f, "file {}", path.display()),
            CookieOrigin::Absent => write!(f, "none"),
        }
    }
}

/// Candidate cookie sources, tried in declaration order.
#[derive(Debug, Clone, Default)]
pub struct CookieSources {
    pub request_base64: Option<String>,
    pub env_base64: Option<(String, String)>,
    pub env_json: Option<(String, String)>,
    pub file: Option<PathBuf>,
}

impl CookieSources {
    /// Reads the env vars named in config; blank values count as unset.
    pub fn from_env(
        config: &CookieConfig,
        request_base64: Option<String>,
        file: Option<PathBuf>,
    ) -> Self {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (name.to_string(), v))
        };

        Self {
            request_base64: request_base64.filter(|v| !v.trim().is_empty()),
            env_base64: read(&config.base64_env),
            env_json: read(&config.json_env),
            file,
        }
    }

    /// Picks the highest-priority source present and sanitizes it.
    pub fn resolve(&self) -> Result<(CookieOrigin, Vec<CookieRecord>), HarvestError> {
        if let Some(encoded) = &self.request_base64 {
            let raw = decode_base64_json(encoded)?;
            return Ok((CookieOrigin::RequestBase64, sanitize_cookies(&raw)));
        }

        if let Some((name, encoded)) = &self.env_base64 {
            let raw = decode_base64_json(encoded)?;
            return Ok((CookieOrigin::EnvBase64(name.clone()), sanitize_cookies(&raw)));
        }

        if let Some((name, json)) = &self.env_json {
            let raw: Value = serde_json::from_str(json)
                .map_err(|e| HarvestError::CookieSource(format!("{}: {}", name, e)))?;
            return Ok((CookieOrigin::EnvJson(name.clone()), sanitize_cookies(&raw)));
        }

        if let Some(path) = &self.file {
            let cookies = load_cookie_file(path)?;
            return Ok((CookieOrigin::File(path.clone()), cookies));
        }

        debug!("no cookie source configured");
        Ok((CookieOrigin::Absent, Vec::new()))
    }
}

fn decode_base64_json(encoded: &str) -> Result<Value, HarvestError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| HarvestError::CookieSource(format!("invalid base64: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| HarvestError::CookieSource(format!("invalid cookie json: {}", e)))
}

/// Loads and sanitizes a cookie export file. A missing file is a
/// configuration error.
pub fn load_cookie_file(path: &Path) -> Result<Vec<CookieRecord>, HarvestError> {
    if !path.exists() {
        return Err(HarvestError::Config(format!(
            "cookie file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&content)
        .map_err(|e| HarvestError::CookieSource(format!("{}: {}", path.display(), e)))?;
    let cookies = sanitize_cookies(&raw);

    info!(path = %path.display(), count = cookies.len(), "loaded cookies");
    Ok(cookies)
}
