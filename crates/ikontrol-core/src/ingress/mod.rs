//! Downstream ingestion: where each project's payload goes.
//!
//! The driver only depends on [`Uploader`]. [`HttpUploader`] posts to the
//! ingress endpoint; [`DirectoryUploader`] writes files for dry runs.

mod http;
mod token;

pub use http::HttpUploader;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Receives one named payload per project.
pub trait Uploader {
    fn upload(&mut self, filename: &str, payload: &[u8]) -> Result<()>;
}

/// Writes each payload to `{dir}/{filename}`, replacing existing files.
#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    dir: PathBuf,
}

impl DirectoryUploader {
    /// Create the target directory if needed.
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("create output dir {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }
}

impl Uploader for DirectoryUploader {
    fn upload(&mut self, filename: &str, payload: &[u8]) -> Result<()> {
        let name = Path::new(filename)
            .file_name()
            .with_context(|| format!("invalid payload file name {filename:?}"))?;
        let path = self.dir.join(name);
        fs::write(&path, payload).with_context(|| format!("write {}", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = payload.len(), "payload written");
        Ok(())
    }
}
