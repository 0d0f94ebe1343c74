//! Reviewer session persisted between CLI runs
//!
//! The browser keeps the `session_id` cookie; the CLI keeps the same value in
//! a one-line file under the user data directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const SESSION_FILE: &str = "session";

/// `<data dir>/tcv/session`, or `./.tcv-session` when no data dir exists
pub fn default_session_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("tcv").join(SESSION_FILE))
        .unwrap_or_else(|| PathBuf::from(".tcv-session"))
}

pub fn load(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn save(path: &Path, session_id: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, format!("{session_id}\n"))
        .with_context(|| format!("Failed to write session file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session");

        assert!(load(&path).is_none());
        save(&path, "session_1_abcdefghi").unwrap();
        assert_eq!(load(&path).as_deref(), Some("session_1_abcdefghi"));
    }

    #[test]
    fn test_blank_file_is_no_session() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session");
        std::fs::write(&path, "  \n").unwrap();
        assert!(load(&path).is_none());
    }
}
