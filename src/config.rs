use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "pdfx";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Directory scanned (non-recursively) for input documents
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving result and error artifacts
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Instruction prompt sent with every document
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Gemini model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// Gemini API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Seconds to wait after each processed file
    #[arg(long)]
    pub delay_secs: Option<u64>,

    /// Include the model name in artifact file names
    #[arg(long)]
    pub tag_model: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub model: ModelConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub prompt_file: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub name: String,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BatchConfig {
    pub delay_secs: u64,
    pub extensions: Vec<String>,
    pub tag_artifacts_with_model: bool,
}

impl BatchConfig {
    /// Pause inserted after every processed file.
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    /// Supported extensions, lowercased and without a leading dot.
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("paths.input_dir", "pdf-data")?
            .set_default("paths.output_dir", "output-json")?
            .set_default("paths.prompt_file", "prompts/IE-sample-prompt.md")?
            .set_default("model.name", "gemini-1.5-flash")?
            .set_default(
                "model.base_url",
                "https://generativelanguage.googleapis.com",
            )?
            .set_default("batch.delay_secs", 20)?
            .set_default("batch.extensions", vec!["pdf"])?
            .set_default("batch.tag_artifacts_with_model", false)?;

        // 2. Config file: explicit path must exist, cwd fallback is optional
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        // 3. Environment variables, e.g. PDFX_BATCH__DELAY_SECS=0 or PDFX_BATCH__EXTENSIONS=pdf,PDF
        builder = builder.add_source(
            Environment::with_prefix("PDFX")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("batch.extensions")
                .try_parsing(true),
        );

        // 4. CLI flags win over everything
        if let Some(dir) = &cli.input_dir {
            builder = builder.set_override("paths.input_dir", dir.to_string_lossy().into_owned())?;
        }
        if let Some(dir) = &cli.output_dir {
            builder = builder.set_override("paths.output_dir", dir.to_string_lossy().into_owned())?;
        }
        if let Some(file) = &cli.prompt_file {
            builder =
                builder.set_override("paths.prompt_file", file.to_string_lossy().into_owned())?;
        }
        if let Some(model) = cli.model {
            builder = builder.set_override("model.name", model)?;
        }
        if let Some(url) = cli.base_url {
            builder = builder.set_override("model.base_url", url)?;
        }
        if let Some(delay) = cli.delay_secs {
            builder = builder.set_override("batch.delay_secs", delay)?;
        }
        if let Some(tag) = cli.tag_model {
            builder = builder.set_override("batch.tag_artifacts_with_model", tag)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}

/// Gemini API key. `Debug` never prints the secret.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read the key from [`API_KEY_VAR`]; a blank value counts as missing.
    pub fn from_env() -> Result<Self, String> {
        env::var(API_KEY_VAR)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(Self)
            .ok_or_else(|| format!("{API_KEY_VAR} not found."))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions_are_normalized() {
        let batch = BatchConfig {
            delay_secs: 0,
            extensions: vec![".PDF".to_string(), " pdf ".to_string(), String::new()],
            tag_artifacts_with_model: false,
        };
        assert_eq!(batch.normalized_extensions(), vec!["pdf", "pdf"]);
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("super-secret");
        assert_eq!(format!("{key:?}"), "ApiKey(****)");
        assert_eq!(key.expose(), "super-secret");
    }
}
