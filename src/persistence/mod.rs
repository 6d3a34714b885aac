//! Persistence for the provisioning step log

pub mod file;

pub use file::FileLogSink;

use crate::core::StepResult;
use anyhow::Result;
use async_trait::async_trait;

/// Destination for step results as they are produced
///
/// Append-only and single-writer: the pipeline is the only caller and
/// flushes each result as the step finishes.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn append(&self, result: &StepResult) -> Result<()>;
}

/// In-memory sink (for testing or `--no-log` runs)
#[derive(Default)]
pub struct InMemoryLogSink {
    records: tokio::sync::RwLock<Vec<StepResult>>,
}

impl InMemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<StepResult> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl LogSink for InMemoryLogSink {
    async fn append(&self, result: &StepResult) -> Result<()> {
        self.records.write().await.push(result.clone());
        Ok(())
    }
}
