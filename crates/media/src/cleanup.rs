use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, warn};

/// Removes the tracked files when dropped, on success and error paths alike.
#[derive(Debug, Default)]
pub struct CleanupGuard {
    paths: Vec<PathBuf>,
}

impl CleanupGuard {
    pub fn track(&mut self, path: PathBuf) {
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("removed temporary file {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("could not remove {}: {}", path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_tracked_files() {
        let tmp = tempfile::tempdir().unwrap();
        let present = tmp.path().join("audio.mp3");
        let absent = tmp.path().join("never-written.mp3");
        std::fs::write(&present, b"id3").unwrap();

        {
            let mut guard = CleanupGuard::default();
            guard.track(present.clone());
            guard.track(absent);
        }

        assert!(!present.exists());
    }
}
