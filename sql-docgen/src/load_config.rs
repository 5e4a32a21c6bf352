/// `load_config` module: merges the optional YAML config file, command line overrides and
/// environment secrets into one [`AppConfig`].
///
/// # Responsibilities
/// - Parse the user-supplied YAML file (no secrets) into typed sections
/// - Apply precedence: command line flag > config file > built-in default
/// - Inject the service API key from `OPENAI_API_KEY`
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
///
/// Example file:
///
/// ```yaml
/// service:
///   base_url: https://api.openai.com/v1
///   model: gpt-4o-mini
///   temperature: 0.3
///   max_tokens: 2048
///   timeout_secs: 120
/// pipeline:
///   workers: 4
///   order: completion   # or submission
///   scope: table        # or segment
/// ```
use anyhow::Result;
use serde::Deserialize;
use sql_docgen_core::config::{AnnotationScope, OutputOrder, PipelineConfig};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

use crate::generate::{
    ServiceSettings, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT,
};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub service: ServiceSection,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceSection {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Values given on the command line; `None` leaves the file/default value in place.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub model: Option<String>,
    pub workers: Option<usize>,
    pub order: Option<OutputOrder>,
    pub scope: Option<AnnotationScope>,
}

#[derive(Debug)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub service: ServiceSettings,
}

/// Read and parse a YAML config file.
pub fn read_config_file<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file is a valid, all-defaults config.
    if config_content.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Build the run configuration: optional file, then overrides, then the API key from env.
pub fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<AppConfig> {
    let file = match path {
        Some(path) => read_config_file(path)?,
        None => {
            info!("No config file given, using defaults");
            FileConfig::default()
        }
    };

    let api_key = match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => {
            info!("{API_KEY_VAR} found in env");
            key
        }
        Ok(_) => {
            error!("{API_KEY_VAR} is set but empty");
            anyhow::bail!("{API_KEY_VAR} environment variable is empty");
        }
        Err(e) => {
            error!(error = ?e, "{API_KEY_VAR} environment variable not set");
            return Err(anyhow::anyhow!("{API_KEY_VAR} environment variable not set: {e}"));
        }
    };

    let mut pipeline = file.pipeline;
    if let Some(workers) = overrides.workers {
        pipeline.workers = workers;
    }
    if let Some(order) = overrides.order {
        pipeline.order = order;
    }
    if let Some(scope) = overrides.scope {
        pipeline.scope = scope;
    }
    if pipeline.workers == 0 {
        anyhow::bail!("workers must be at least 1");
    }

    let service = ServiceSettings {
        api_key,
        base_url: file.service.base_url,
        model: overrides.model.unwrap_or(file.service.model),
        temperature: file.service.temperature,
        max_tokens: file.service.max_tokens,
        timeout: Duration::from_secs(file.service.timeout_secs),
    };

    info!(
        model = %service.model,
        base_url = %service.base_url,
        workers = pipeline.workers,
        "Config loaded and merged successfully"
    );

    Ok(AppConfig { pipeline, service })
}
