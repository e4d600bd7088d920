//! Run bootstrap: everything that must hold before the first file is touched.

use crate::config::{ApiKey, AppConfig};
use crate::extraction::{BatchProcessor, BatchSettings, BatchSummary, io};
use crate::llm::{DocumentExtractor, GeminiClient, GeminiSettings};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Conditions that abort the whole run. The binary exits non-zero on any of them.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("{0}")]
    MissingCredential(String),

    #[error("Input directory '{}' not found or is not a directory.", .0.display())]
    InputDirectory(PathBuf),

    #[error("Could not create output directory '{}': {source}", .path.display())]
    OutputDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to load system prompt from '{}'.", .0.display())]
    Prompt(PathBuf),

    #[error("Error initializing Gemini model '{model}': {source:#}")]
    Client {
        model: String,
        source: anyhow::Error,
    },

    #[error("Could not list input directory '{}': {source}", .path.display())]
    Discovery {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Run a full batch against the Gemini API described by `config`.
pub async fn run(config: &AppConfig) -> Result<BatchSummary, StartupError> {
    let api_key = ApiKey::from_env().map_err(StartupError::MissingCredential)?;
    let settings = GeminiSettings {
        base_url: config.model.base_url.clone(),
        model: config.model.name.clone(),
        api_key,
    };
    run_with(config, |_| {
        GeminiClient::new(settings).map(|c| Arc::new(c) as Arc<dyn DocumentExtractor>)
    })
    .await
}

/// Run a batch with a caller-supplied client factory.
///
/// The factory runs after the directory and prompt checks, mirroring the
/// order in which startup failures are reported.
pub async fn run_with<F>(config: &AppConfig, make_client: F) -> Result<BatchSummary, StartupError>
where
    F: FnOnce(&AppConfig) -> anyhow::Result<Arc<dyn DocumentExtractor>>,
{
    let processor = prepare(config, make_client).await?;
    let input_dir = processor.settings().input_dir.clone();
    processor
        .run()
        .await
        .map_err(|source| StartupError::Discovery {
            path: input_dir,
            source,
        })
}

async fn prepare<F>(config: &AppConfig, make_client: F) -> Result<BatchProcessor, StartupError>
where
    F: FnOnce(&AppConfig) -> anyhow::Result<Arc<dyn DocumentExtractor>>,
{
    let settings = BatchSettings::from_config(config);

    let input_is_dir = tokio::fs::metadata(&settings.input_dir)
        .await
        .is_ok_and(|m| m.is_dir());
    if !input_is_dir {
        return Err(StartupError::InputDirectory(settings.input_dir));
    }

    tokio::fs::create_dir_all(&settings.output_dir)
        .await
        .map_err(|source| StartupError::OutputDirectory {
            path: settings.output_dir.clone(),
            source,
        })?;
    info!(output_dir = %settings.output_dir.display(), "Output will be saved to output directory");

    let prompt_file = &config.paths.prompt_file;
    info!(path = %prompt_file.display(), "Loading system prompt file");
    let prompt = io::load_text_file(prompt_file)
        .await
        .ok_or_else(|| StartupError::Prompt(prompt_file.clone()))?;

    info!(model = %config.model.name, "Initializing model");
    let client = make_client(config).map_err(|source| StartupError::Client {
        model: config.model.name.clone(),
        source,
    })?;
    info!(
        name: "llm.client.initialized",
        model = client.model(),
        "Client initialized"
    );

    Ok(BatchProcessor::new(client, settings, prompt))
}
