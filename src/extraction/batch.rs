//! Sequential batch driver.
//!
//! Every supported file in the input directory goes through
//! read → call → validate → persist, ending in exactly one artifact. Nothing
//! inside the loop aborts the batch.

use super::io::{save_error_file, save_json_to_file};
use super::record::ErrorRecord;
use super::validator::validate_and_parse_json;
use crate::config::AppConfig;
use crate::llm::{DocumentExtractor, ExtractionRequest};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Inputs and outputs of one batch run.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Lowercase extensions without the leading dot.
    pub extensions: Vec<String>,
    /// Pause after each processed file.
    pub delay: Duration,
    /// Extra component inserted into artifact names, e.g. the model name.
    pub artifact_tag: Option<String>,
}

impl BatchSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            input_dir: config.paths.input_dir.clone(),
            output_dir: config.paths.output_dir.clone(),
            extensions: config.batch.normalized_extensions(),
            delay: config.batch.delay(),
            artifact_tag: config
                .batch
                .tag_artifacts_with_model
                .then(|| config.model.name.replace('/', "_")),
        }
    }

    /// Case-insensitive extension check.
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }

    /// Where the result or error artifact for `input` is written.
    pub fn artifact_paths(&self, input: &Path) -> ArtifactPaths {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base = match &self.artifact_tag {
            Some(tag) => format!("{stem}_{tag}"),
            None => stem,
        };
        ArtifactPaths {
            success: self.output_dir.join(format!("{base}.json")),
            error: self.output_dir.join(format!("{base}_error.json")),
        }
    }
}

/// Result and error artifact locations for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub success: PathBuf,
    pub error: PathBuf,
}

/// Terminal state of one input file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Parsed JSON was handed to the result artifact.
    Saved(PathBuf),
    /// An error artifact was produced.
    Failed(ErrorRecord),
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub output_dir: PathBuf,
}

impl BatchSummary {
    fn new(output_dir: PathBuf) -> Self {
        Self {
            succeeded: 0,
            failed: 0,
            output_dir,
        }
    }

    /// Files that reached a terminal state; skipped entries are not counted.
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Batch PDF Processing Summary ---")?;
        writeln!(f, "Successfully processed and saved JSON: {}", self.succeeded)?;
        writeln!(f, "Files with errors (details saved):   {}", self.failed)?;
        writeln!(f, "Total PDF files attempted:          {}", self.attempted())?;
        writeln!(
            f,
            "Check the '{}' directory for results and error details.",
            self.output_dir.display()
        )?;
        write!(f, "{}", "-".repeat(35))
    }
}

/// Runs the extraction loop with an injected client.
#[derive(Debug)]
pub struct BatchProcessor {
    extractor: Arc<dyn DocumentExtractor>,
    settings: BatchSettings,
    instructions: String,
    /// Artifacts written by this processor; never treated as stale.
    written: Mutex<HashSet<PathBuf>>,
}

impl BatchProcessor {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        settings: BatchSettings,
        instructions: String,
    ) -> Self {
        Self {
            extractor,
            settings,
            instructions,
            written: Mutex::default(),
        }
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    /// Supported regular files at the top level of the input directory,
    /// sorted by path.
    pub async fn discover(&self) -> io::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.settings.input_dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !self.settings.is_supported(&path) {
                continue;
            }
            // Follows symlinks, a dangling link is skipped
            let is_file = tokio::fs::metadata(&path)
                .await
                .is_ok_and(|m| m.is_file());
            if is_file {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Process every discovered file in order and return the counters.
    pub async fn run(&self) -> io::Result<BatchSummary> {
        let files = self.discover().await?;
        info!(
            name: "batch.started",
            input_dir = %self.settings.input_dir.display(),
            files = files.len(),
            model = self.extractor.model(),
            "Processing files"
        );

        let mut summary = BatchSummary::new(self.settings.output_dir.clone());
        for path in files {
            match self.process_file(&path).await {
                FileOutcome::Saved(_) => summary.succeeded += 1,
                FileOutcome::Failed(_) => summary.failed += 1,
            }

            if !self.settings.delay.is_zero() {
                tokio::time::sleep(self.settings.delay).await;
            }
        }

        info!(
            name: "batch.finished",
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch finished"
        );
        Ok(summary)
    }

    /// Take one file to a terminal state and persist its artifact.
    pub async fn process_file(&self, path: &Path) -> FileOutcome {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let artifacts = self.settings.artifact_paths(path);
        info!(name: "batch.file.started", filename = %filename, "Processing file");

        match self.extract(path, &filename).await {
            Ok(value) => {
                info!(
                    name: "batch.file.saved",
                    filename = %filename,
                    path = %artifacts.success.display(),
                    "Response is valid JSON"
                );
                if save_json_to_file(&artifacts.success, &value).await {
                    self.settle(&artifacts.success, &artifacts.error).await;
                }
                FileOutcome::Saved(artifacts.success)
            }
            Err(record) => {
                info!(
                    name: "batch.file.failed",
                    filename = %filename,
                    error = record.error,
                    path = %artifacts.error.display(),
                    "Saving error details"
                );
                if save_error_file(&artifacts.error, &record).await {
                    self.settle(&artifacts.error, &artifacts.success).await;
                }
                FileOutcome::Failed(record)
            }
        }
    }

    async fn extract(&self, path: &Path, filename: &str) -> Result<Value, ErrorRecord> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            warn!(filename, error = %e, "Error reading or preparing PDF file");
            ErrorRecord::read_failure(filename, &e)
        })?;
        log_prepared(filename, data.len());

        let request = ExtractionRequest {
            filename,
            mime_type: mime_guess::mime::APPLICATION_PDF.essence_str(),
            data: &data,
            instructions: &self.instructions,
        };

        let response = self.extractor.extract(request).await.map_err(|e| {
            warn!(
                filename,
                exception_type = e.exception_type(),
                error = %e,
                "Error during the API call"
            );
            ErrorRecord::call_failure(filename, &e)
        })?;

        validate_and_parse_json(&response.text).map_err(|e| {
            warn!(filename, error = %e, "Response is NOT valid JSON");
            ErrorRecord::invalid_response(filename, &response)
        })
    }

    /// Record `saved` and drop `counterpart` unless this processor wrote it.
    ///
    /// Inputs that share a base name (`a.PDF`, `a.pdf`) keep both artifacts.
    async fn settle(&self, saved: &Path, counterpart: &Path) {
        let mut written = self.written.lock().await;
        written.insert(saved.to_path_buf());
        if !written.contains(counterpart) {
            remove_stale(counterpart).await;
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn log_prepared(filename: &str, bytes: usize) {
    info!(
        filename,
        size_kb = %format!("{:.2}", bytes as f64 / 1024.0),
        "PDF data prepared"
    );
}

/// Drop the artifact left by an earlier run with the opposite outcome.
async fn remove_stale(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!(path = %path.display(), "Removed stale artifact"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Could not remove stale artifact"),
    }
}
