//! Audio upload
//!
//! Files are screened locally the way the upload page's drop zone does:
//! `.wav`/`.mp3` only and at most 50 MB each. Rejected files are never sent.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::client::{TcvClient, UploadFile};

pub const MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

/// MIME type sent for an accepted extension
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "wav" => Some("audio/wav"),
        "mp3" => Some("audio/mpeg"),
        _ => None,
    }
}

/// Local acceptance check; the error is shown next to the file name
pub fn screen(path: &Path, size: u64) -> Result<&'static str, String> {
    let mime = mime_for(path).ok_or_else(|| "only .wav and .mp3 files are accepted".to_string())?;
    if size > MAX_FILE_BYTES {
        return Err(format!("{size} bytes exceeds the 50 MB limit"));
    }
    Ok(mime)
}

pub async fn run(client: &TcvClient, paths: &[PathBuf]) -> Result<()> {
    let mut files = Vec::new();
    for path in paths {
        let size = std::fs::metadata(path)
            .with_context(|| format!("Cannot read {}", path.display()))?
            .len();
        let mime_type = match screen(path, size) {
            Ok(mime) => mime,
            Err(reason) => {
                println!("skipped {}: {}", path.display(), reason);
                continue;
            }
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = std::fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?;
        files.push(UploadFile { name, mime_type, bytes });
    }

    if files.is_empty() {
        bail!("No files to upload");
    }

    let response = client.upload(files).await?;
    println!("{}", response.message);
    for name in &response.results.success {
        println!("  ok      {name}");
    }
    for failure in &response.results.failed {
        println!("  failed  {}: {}", failure.name, failure.error);
    }
    Ok(())
}
