//! Pipeline services for input discovery and batched transcript reads.
//!
//! The executor depends on these traits rather than concrete filesystem
//! code, so tests can inject in-memory implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future;

use crate::core::config::IoConfig;
use crate::core::errors::{Result, SkaldError};
use crate::io::discovery;

/// Service responsible for translating an input root into transcript files.
pub trait TranscriptDiscoverer: Send + Sync {
    /// Discovers transcript files under the given root.
    fn discover(&self, root: &Path, config: &IoConfig) -> Result<Vec<PathBuf>>;
}

/// Default filesystem-walking discoverer.
#[derive(Debug, Default)]
pub struct WalkingDiscoverer;

impl TranscriptDiscoverer for WalkingDiscoverer {
    fn discover(&self, root: &Path, config: &IoConfig) -> Result<Vec<PathBuf>> {
        discovery::discover_transcripts(root, config)
    }
}

impl WalkingDiscoverer {
    /// Returns a shared reference to the default discoverer.
    pub fn shared() -> Arc<dyn TranscriptDiscoverer> {
        Arc::new(Self)
    }
}

/// Service responsible for reading transcript contents in batches.
///
/// Batching prevents overwhelming the filesystem with concurrent reads while
/// still overlapping I/O within each batch.
#[async_trait]
pub trait TranscriptBatchReader: Send + Sync {
    /// Reads the contents of all specified files, preserving input order.
    async fn read_files(&self, files: &[PathBuf]) -> Result<Vec<(PathBuf, String)>>;
}

/// Default implementation that reads fixed batches with Tokio async I/O.
#[derive(Debug)]
pub struct BatchedTranscriptReader {
    batch_size: usize,
}

impl BatchedTranscriptReader {
    /// Creates a reader with the specified batch size.
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }

    /// Returns a shared reference to a default reader (batch size: 64).
    pub fn default_shared() -> Arc<dyn TranscriptBatchReader> {
        Arc::new(Self::new(64))
    }

    fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    async fn read_single_file(path: PathBuf) -> Result<(PathBuf, String)> {
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| SkaldError::io(format!("Failed to read file {}", path.display()), e))?;
        let content = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(
                    "File {} contains invalid UTF-8, using lossy conversion",
                    path.display()
                );
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok((path, content))
    }
}

#[async_trait]
impl TranscriptBatchReader for BatchedTranscriptReader {
    async fn read_files(&self, files: &[PathBuf]) -> Result<Vec<(PathBuf, String)>> {
        let mut contents = Vec::with_capacity(files.len());
        for batch in files.chunks(self.effective_batch_size()) {
            let futures: Vec<_> = batch
                .iter()
                .cloned()
                .map(Self::read_single_file)
                .collect();
            for result in future::join_all(futures).await {
                contents.push(result?);
            }
        }
        Ok(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn batched_reader_preserves_order() {
        let dir = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for i in 0..5 {
            let path = dir.path().join(format!("talk_{i}.stm"));
            fs::write(&path, format!("content {i}")).unwrap();
            paths.push(path);
        }

        let reader = BatchedTranscriptReader::new(2);
        let contents = reader.read_files(&paths).await.unwrap();
        assert_eq!(contents.len(), 5);
        for (i, (path, text)) in contents.iter().enumerate() {
            assert_eq!(path, &paths[i]);
            assert_eq!(text, &format!("content {i}"));
        }
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let reader = BatchedTranscriptReader::new(8);
        let result = reader
            .read_files(&[PathBuf::from("/nonexistent/talk.stm")])
            .await;
        assert!(matches!(result, Err(SkaldError::Io { .. })));
    }
}
