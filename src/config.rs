//! TOML configuration parsing.
//!
//! All settings have working defaults, so the config file is optional: a
//! missing file yields `Config::default()`. CLI flags override file values
//! where a command exposes them.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
}

/// Where the raw OpenAPI specification is obtained at build time.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// Primary remote location of the specification.
    #[serde(default = "default_remote_url")]
    pub remote_url: String,
    /// Secondary local fallback.
    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            remote_url: default_remote_url(),
            local_path: default_local_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: default_output_dir(),
        }
    }
}

/// Options consumed by the runtime module client and analyzer.
#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    /// Base URL where module documents and metadata are served.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Whether the description analyzer runs at all.
    #[serde(default = "default_true")]
    pub analysis_enabled: bool,
    /// Delay before a changed description is analyzed.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Maximum age at which a cached module document is still served.
    #[serde(default = "default_cache_stale_ms")]
    pub cache_stale_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            base_url: default_base_url(),
            analysis_enabled: true,
            debounce_ms: default_debounce_ms(),
            cache_stale_ms: default_cache_stale_ms(),
        }
    }
}

/// Project boilerplate rendered into every assembled prompt.
#[derive(Debug, Deserialize, Clone)]
pub struct PromptConfig {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default = "default_framework")]
    pub framework: String,
    /// Instructions file referenced from the prompt.
    #[serde(default = "default_docs_reference")]
    pub docs_reference: String,
    /// Operational notes appended to every prompt.
    #[serde(default = "default_notes")]
    pub notes: Vec<String>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        PromptConfig {
            project_name: default_project_name(),
            framework: default_framework(),
            docs_reference: default_docs_reference(),
            notes: default_notes(),
        }
    }
}

fn default_remote_url() -> String {
    std::env::var("APIMOD_SPEC_URL")
        .unwrap_or_else(|_| "https://api-modules.s3.amazonaws.com/openapi.json".to_string())
}

fn default_local_path() -> PathBuf {
    PathBuf::from("./openapi.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./api-modules")
}

fn default_base_url() -> String {
    std::env::var("APIMOD_BASE_URL")
        .unwrap_or_else(|_| "https://api-modules.s3.amazonaws.com".to_string())
}

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_cache_stale_ms() -> u64 {
    5 * 60 * 1000
}

fn default_project_name() -> String {
    "this project".to_string()
}

fn default_framework() -> String {
    "web".to_string()
}

fn default_docs_reference() -> String {
    "CLAUDE.md".to_string()
}

fn default_notes() -> Vec<String> {
    vec![
        "API proxy: all backend calls go through the project's API layer".to_string(),
        "Auth: use the project's authenticated HTTP client for API calls".to_string(),
        "i18n: follow the project's internationalization conventions".to_string(),
    ]
}

impl Config {
    /// URL of one module's document file.
    pub fn module_url(&self, module_id: &str) -> String {
        format!(
            "{}/modules/{}.json",
            self.runtime.base_url.trim_end_matches('/'),
            module_id
        )
    }

    /// URL of the metadata file listing all module documents.
    pub fn metadata_url(&self) -> String {
        format!(
            "{}/metadata.json",
            self.runtime.base_url.trim_end_matches('/')
        )
    }
}

/// Load configuration from a TOML file. A missing file is not an error; every
/// section falls back to its defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.runtime.base_url.trim().is_empty() {
        anyhow::bail!("runtime.base_url must not be empty");
    }
    if config.runtime.cache_stale_ms == 0 {
        anyhow::bail!("runtime.cache_stale_ms must be > 0");
    }

    Ok(config)
}
