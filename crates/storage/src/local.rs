use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use fbharvest_core::Comment;

use crate::error::StorageError;

/// `<dir>/<prefix>_<stamp>.<ext>`
pub fn stamped_path(dir: &Path, prefix: &str, stamp: &str, ext: &str) -> PathBuf {
    dir.join(format!("{}_{}.{}", prefix, stamp, ext))
}

/// `<dir>/<name>.<ext>` unless `name` already carries the extension.
pub fn named_path(dir: &Path, name: &str, ext: &str) -> PathBuf {
    let suffix = format!(".{}", ext);
    if name.ends_with(&suffix) {
        dir.join(name)
    } else {
        dir.join(format!("{}{}", name, suffix))
    }
}

/// One JSON object per line, in order.
pub fn write_jsonl(path: &Path, comments: &[Comment]) -> Result<(), StorageError> {
    create_parent(path)?;
    let mut out = BufWriter::new(File::create(path)?);
    for comment in comments {
        serde_json::to_writer(&mut out, comment)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    debug!("wrote {} lines to {}", comments.len(), path.display());
    Ok(())
}

/// Indented JSON with non-ASCII text kept as is.
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    create_parent(path)?;
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, value)?;
    out.flush()?;
    Ok(())
}

pub fn write_text(path: &Path, text: &str) -> Result<(), StorageError> {
    create_parent(path)?;
    fs::write(path, text)?;
    Ok(())
}

fn create_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let dir = Path::new("datos-crudos");
        assert_eq!(
            stamped_path(dir, "comments", "20240131-235959", "jsonl"),
            PathBuf::from("datos-crudos/comments_20240131-235959.jsonl")
        );
        assert_eq!(
            named_path(dir, "entrevista", "json"),
            PathBuf::from("datos-crudos/entrevista.json")
        );
        assert_eq!(
            named_path(dir, "entrevista.json", "json"),
            PathBuf::from("datos-crudos/entrevista.json")
        );
    }

    #[test]
    fn test_write_jsonl_creates_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/out/comments.jsonl");
        let comments = vec![
            Comment::new("Ana", "¡Hola!"),
            Comment::new("Luis", "Muy bien").with_source("structure"),
        ];

        write_jsonl(&path, &comments).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"author":"Ana","text":"¡Hola!"}"#);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["source"], "structure");
    }

    #[test]
    fn test_write_json_pretty_keeps_unicode() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("doc.json");

        write_json_pretty(&path, &serde_json::json!({ "idioma": "es", "texto": "añoranza" })).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("añoranza"));
        assert!(content.contains("\n  "));
    }
}
