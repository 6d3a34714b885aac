//! JSON-lines step log file

use crate::core::StepResult;
use crate::persistence::LogSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only step log on disk, one JSON record per line
pub struct FileLogSink {
    path: PathBuf,
    file: Mutex<tokio::fs::File>,
}

impl FileLogSink {
    /// Open (or create) a log file for appending
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("failed to open log {}", path.display()))?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Open the log at the default location under the platform data dir
    pub async fn with_default_path() -> Result<Self> {
        let dir = dirs::data_local_dir()
            .context("could not determine data directory")?
            .join("provision");
        Self::open(dir.join("provision.jsonl")).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogSink for FileLogSink {
    async fn append(&self, result: &StepResult) -> Result<()> {
        let mut line = serde_json::to_string(result)?;
        line.push('\n');
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
