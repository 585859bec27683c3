//! Newline-delimited JSON transport: one task per input line, one result per output line.

use crate::domain::ports::ResultPublisher;
use crate::domain::task::{AnalysisFailure, AnalysisResult, AnalysisTask};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Decodes one input line. Blank lines yield `None`.
pub fn parse_task_line(line: &str) -> Option<Result<AnalysisTask, AnalysisFailure>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(
        serde_json::from_str::<AnalysisTask>(line)
            .map_err(|e| AnalysisFailure::unparsed(format!("Invalid task: {}", e))),
    )
}

pub fn encode_result(result: &AnalysisResult) -> Result<String> {
    serde_json::to_string(result).context("Failed to serialize analysis result")
}

/// Writes each result as a single JSON line to the wrapped writer.
pub struct JsonLinesPublisher<W> {
    writer: Mutex<W>,
}

impl<W> JsonLinesPublisher<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl JsonLinesPublisher<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

#[async_trait]
impl<W> ResultPublisher for JsonLinesPublisher<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn publish(&self, result: &AnalysisResult) -> Result<()> {
        let mut line = encode_result(result)?;
        line.push('\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .context("Failed to write result line")?;
        writer.flush().await.context("Failed to flush result line")?;
        Ok(())
    }
}
