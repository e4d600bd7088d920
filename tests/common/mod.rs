#![allow(dead_code)]

use async_trait::async_trait;
use pdf_json_extract::config::{AppConfig, BatchConfig, ModelConfig, PathsConfig};
use pdf_json_extract::extraction::BatchSettings;
use pdf_json_extract::llm::{CallError, DocumentExtractor, ExtractionRequest, ExtractionResponse};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Scripted answer for one file name.
#[derive(Debug, Clone)]
pub enum Scripted {
    Text(String),
    Quota(String),
}

/// Extractor that answers from a script keyed by file name and records calls.
#[derive(Debug, Default)]
pub struct MockExtractor {
    script: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<String>>,
    mime_types: Mutex<Vec<String>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, filename: &str, text: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(filename.to_string(), Scripted::Text(text.to_string()));
        self
    }

    pub fn with_quota_error(self, filename: &str) -> Self {
        self.script.lock().unwrap().insert(
            filename.to_string(),
            Scripted::Quota("Resource has been exhausted (e.g. check quota).".to_string()),
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mime_types(&self) -> Vec<String> {
        self.mime_types.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentExtractor for MockExtractor {
    async fn extract(
        &self,
        request: ExtractionRequest<'_>,
    ) -> Result<ExtractionResponse, CallError> {
        self.calls
            .lock()
            .unwrap()
            .push(request.filename.to_string());
        self.mime_types
            .lock()
            .unwrap()
            .push(request.mime_type.to_string());
        let scripted = self.script.lock().unwrap().get(request.filename).cloned();
        match scripted {
            Some(Scripted::Text(text)) => Ok(ExtractionResponse {
                text,
                prompt_feedback: None,
            }),
            Some(Scripted::Quota(message)) => Err(CallError::Quota {
                status: 429,
                message,
            }),
            None => Err(CallError::Rejected {
                status: 404,
                message: format!("no scripted response for {}", request.filename),
            }),
        }
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

/// Scratch layout: `<tmp>/in`, `<tmp>/out` (not created) and `<tmp>/prompt.md`.
#[derive(Debug)]
pub struct Workspace {
    pub dir: TempDir,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub prompt_file: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let input_dir = dir.path().join("in");
        std::fs::create_dir(&input_dir).unwrap();
        let prompt_file = dir.path().join("prompt.md");
        std::fs::write(&prompt_file, "Extract the document title as JSON.").unwrap();
        Self {
            output_dir: dir.path().join("out"),
            input_dir,
            prompt_file,
            dir,
        }
    }

    pub fn add_input(&self, name: &str) -> PathBuf {
        let path = self.input_dir.join(name);
        std::fs::write(&path, b"%PDF-1.4 fake").unwrap();
        path
    }

    pub fn settings(&self) -> BatchSettings {
        BatchSettings {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            extensions: vec!["pdf".to_string()],
            delay: Duration::ZERO,
            artifact_tag: None,
        }
    }

    pub fn config(&self) -> AppConfig {
        AppConfig {
            paths: PathsConfig {
                input_dir: self.input_dir.clone(),
                output_dir: self.output_dir.clone(),
                prompt_file: self.prompt_file.clone(),
            },
            model: ModelConfig {
                name: "gemini-1.5-flash".to_string(),
                base_url: "http://127.0.0.1:9".to_string(),
            },
            batch: BatchConfig {
                delay_secs: 0,
                extensions: vec!["pdf".to_string()],
                tag_artifacts_with_model: false,
            },
        }
    }

    pub fn output(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    pub fn read_json(&self, name: &str) -> serde_json::Value {
        read_json(&self.output(name))
    }

    pub fn output_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.output_dir)
            .map(|entries| {
                entries
                    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}

/// Share a mock with a processor while keeping a handle for assertions.
pub fn shared(mock: &Arc<MockExtractor>) -> Arc<dyn DocumentExtractor> {
    let extractor: Arc<MockExtractor> = Arc::clone(mock);
    extractor
}
