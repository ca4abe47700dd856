//! Artifact delivery
//!
//! Handing a finished export to the user is the only side effect of an
//! export. The dashboard's download trigger is one [`ArtifactSink`]; this
//! module ships a directory writer and an in-memory collector.

use crate::error::{ExportError, ExportResult};
use crate::export::ExportArtifact;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Receives finished exports
#[async_trait]
pub trait ArtifactSink: Send + Sync {
	/// Deliver one artifact
	async fn deliver(&self, artifact: &ExportArtifact) -> ExportResult<()>;
}

/// Writes artifacts as files into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
	root: PathBuf,
}

impl DirectorySink {
	/// Sink writing into `root`, created on first delivery if missing
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	/// Target directory
	pub fn root(&self) -> &Path {
		&self.root
	}
}

#[async_trait]
impl ArtifactSink for DirectorySink {
	async fn deliver(&self, artifact: &ExportArtifact) -> ExportResult<()> {
		let delivery_error = |source: std::io::Error| ExportError::Delivery {
			filename: artifact.filename.clone(),
			source,
		};

		tokio::fs::create_dir_all(&self.root)
			.await
			.map_err(delivery_error)?;

		// The final name only ever holds a complete workbook.
		let target = self.root.join(&artifact.filename);
		let partial = self.root.join(format!(".{}.partial", artifact.filename));
		if let Err(source) = tokio::fs::write(&partial, &artifact.bytes).await {
			let _ = tokio::fs::remove_file(&partial).await;
			return Err(delivery_error(source));
		}
		tokio::fs::rename(&partial, &target)
			.await
			.map_err(delivery_error)?;

		tracing::debug!(path = %target.display(), bytes = artifact.size_bytes(), "export written");
		Ok(())
	}
}

/// Keeps delivered artifacts in memory
#[derive(Debug, Default)]
pub struct MemorySink {
	delivered: Mutex<Vec<ExportArtifact>>,
}

impl MemorySink {
	/// Empty sink
	pub fn new() -> Self {
		Self::default()
	}

	/// Artifacts delivered so far, oldest first
	pub fn delivered(&self) -> Vec<ExportArtifact> {
		self.delivered.lock().clone()
	}

	/// Number of delivered artifacts
	pub fn len(&self) -> usize {
		self.delivered.lock().len()
	}

	/// Whether nothing was delivered
	pub fn is_empty(&self) -> bool {
		self.delivered.lock().is_empty()
	}
}

#[async_trait]
impl ArtifactSink for MemorySink {
	async fn deliver(&self, artifact: &ExportArtifact) -> ExportResult<()> {
		self.delivered.lock().push(artifact.clone());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::export::XLSX_MIME_TYPE;
	use rstest::rstest;

	fn artifact(name: &str) -> ExportArtifact {
		ExportArtifact {
			filename: name.to_string(),
			bytes: b"PK\x03\x04".to_vec(),
			mime_type: XLSX_MIME_TYPE.to_string(),
			row_count: 0,
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_directory_sink_writes_file() {
		// Arrange
		let dir = tempfile::TempDir::new().unwrap();
		let sink = DirectorySink::new(dir.path().join("exports"));

		// Act
		sink.deliver(&artifact("Viajes-2024-01-01.xlsx")).await.unwrap();

		// Assert
		let written = std::fs::read(dir.path().join("exports/Viajes-2024-01-01.xlsx")).unwrap();
		assert_eq!(written, b"PK\x03\x04");
		let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("exports"))
			.unwrap()
			.filter_map(|e| e.ok())
			.filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
			.collect();
		assert!(leftovers.is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_directory_sink_reports_failure() {
		// Arrange: the target directory path is an existing file
		let dir = tempfile::TempDir::new().unwrap();
		let blocker = dir.path().join("blocked");
		std::fs::write(&blocker, b"").unwrap();
		let sink = DirectorySink::new(&blocker);

		// Act
		let result = sink.deliver(&artifact("Gastos-2024-01-01.xlsx")).await;

		// Assert
		assert!(matches!(result, Err(ExportError::Delivery { .. })));
	}

	#[rstest]
	#[tokio::test]
	async fn test_memory_sink_collects() {
		let sink = MemorySink::new();
		sink.deliver(&artifact("a.xlsx")).await.unwrap();
		sink.deliver(&artifact("b.xlsx")).await.unwrap();
		let names: Vec<String> = sink.delivered().into_iter().map(|a| a.filename).collect();
		assert_eq!(names, vec!["a.xlsx", "b.xlsx"]);
	}
}
