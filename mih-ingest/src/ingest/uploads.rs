//! Raw upload artifacts
//!
//! Every upload is written to disk verbatim before parsing starts, so a file
//! that later fails to decode is still available for inspection.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Directory-backed artifact store
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

/// Where an upload landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedUpload {
    /// `{timestamp}_{original}`; recorded as the ingestion's file name
    pub name: String,
    pub path: PathBuf,
}

impl UploadStore {
    /// Open the store, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` under a timestamped name
    ///
    /// An existing artifact is never replaced: when `{timestamp}_{name}` is
    /// taken, a counter is inserted as `{timestamp}_{n}_{name}`.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> std::io::Result<SavedUpload> {
        let stamp = Local::now().format("%Y%m%d%H%M%S").to_string();
        let base = sanitize_file_name(original_name);

        let mut attempt: u32 = 0;
        loop {
            let name = if attempt == 0 {
                format!("{}_{}", stamp, base)
            } else {
                format!("{}_{}_{}", stamp, attempt, base)
            };
            let path = self.dir.join(&name);

            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    debug!(file = %name, bytes = bytes.len(), "Saved upload artifact");
                    return Ok(SavedUpload { name, path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Final path component only; either separator counts
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .trim();

    match base {
        "" | "." | ".." => "upload.csv".to_string(),
        other => other.to_string(),
    }
}

/// `.csv` extension, case-insensitive
pub fn has_csv_extension(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".csv")
}
