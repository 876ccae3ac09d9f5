//! Configuration management for tubescribe.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Environment variables
//! - Command-line flags
//! - Config file (tubescribe.yaml)
//!
//! The two directory roles matter operationally: the staging directory is
//! local and assumed always writable; the vault directory may be managed by
//! a cloud-sync client that transiently locks files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Providers the factory knows how to construct.
pub const KNOWN_PROVIDERS: [&str; 3] = ["openai", "gemini", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Local staging directory (reliable, never synced)
    pub staging_dir: PathBuf,

    /// Final vault directory (synced folder, may have sync locks)
    pub vault_dir: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider ("openai" or "gemini")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// API key for the LLM provider
    pub api_key: Option<String>,

    /// Preferred transcript language
    pub language: String,

    /// Source label rendered into the markdown header
    pub source_label: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Per-provider configuration table
    pub providers: Option<HashMap<String, ProviderConfig>>,
}

/// Provider-specific configuration from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Environment variable holding the API key
    #[serde(rename = "apiKeyEnv")]
    pub api_key_env: String,

    /// Model identifier for this provider
    pub model: String,

    /// Optional custom endpoint URL
    pub endpoint: Option<String>,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    vault: Option<VaultSection>,
    llm: Option<LlmSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VaultSection {
    staging_dir: Option<String>,
    vault_dir: Option<String>,
    source_label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    #[serde(rename = "activeProvider")]
    active_provider: Option<String>,
    providers: Option<HashMap<String, ProviderConfig>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("knowledge_vault_staging"),
            vault_dir: PathBuf::from("knowledge_vault"),
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            language: "en".to_string(),
            source_label: "YouTube".to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
            providers: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `TUBESCRIBE_STAGING_DIR`: Local staging directory
    /// - `TUBESCRIBE_VAULT_DIR`: Synced vault directory
    /// - `TUBESCRIBE_CONFIG`: Path to config file
    /// - `TUBESCRIBE_PROVIDER`: LLM provider
    /// - `TUBESCRIBE_MODEL`: Model identifier
    /// - `TUBESCRIBE_API_KEY`: API key (overrides provider env lookups)
    /// - `TUBESCRIBE_LANGUAGE`: Preferred transcript language
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(staging) = std::env::var("TUBESCRIBE_STAGING_DIR") {
            config.staging_dir = PathBuf::from(staging);
        }

        if let Ok(vault) = std::env::var("TUBESCRIBE_VAULT_DIR") {
            config.vault_dir = PathBuf::from(vault);
        }

        if let Ok(config_file) = std::env::var("TUBESCRIBE_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Load from YAML config file if it exists
        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("tubescribe.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("TUBESCRIBE_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("TUBESCRIBE_MODEL") {
            config.model = model;
        }

        if let Ok(language) = std::env::var("TUBESCRIBE_LANGUAGE") {
            config.language = language;
        }

        config.api_key = std::env::var("TUBESCRIBE_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(vault) = config_file.vault {
            if let Some(staging) = vault.staging_dir {
                result.staging_dir = PathBuf::from(staging);
            }
            if let Some(dir) = vault.vault_dir {
                result.vault_dir = PathBuf::from(dir);
            }
            if let Some(label) = vault.source_label {
                result.source_label = label;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(active) = llm.active_provider {
                result.provider = active;
            }

            if let Some(providers) = llm.providers {
                // Model comes from the active provider's entry
                if let Some(provider_config) = providers.get(&result.provider) {
                    result.model = provider_config.model.clone();
                }
                result.providers = Some(providers);
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        staging_dir: Option<PathBuf>,
        vault_dir: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(staging_dir) = staging_dir {
            self.staging_dir = staging_dir;
        }

        if let Some(vault_dir) = vault_dir {
            self.vault_dir = vault_dir;
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Ensure the staging and vault directories exist.
    pub fn ensure_directories(&self) -> AppResult<()> {
        for dir in [&self.staging_dir, &self.vault_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    AppError::Config(format!("Failed to create directory {:?}: {}", dir, e))
                })?;
            }
        }
        Ok(())
    }

    /// Resolve the API key for a provider.
    ///
    /// Order: explicit `TUBESCRIBE_API_KEY`, then the provider table's
    /// `apiKeyEnv`, then the provider's conventional variable
    /// (`OPENAI_API_KEY` / `GEMINI_API_KEY`).
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ref providers) = self.providers {
            if let Some(provider_config) = providers.get(provider) {
                if let Ok(key) = std::env::var(&provider_config.api_key_env) {
                    return Some(key);
                }
            }
        }

        let conventional = match provider {
            "openai" => "OPENAI_API_KEY",
            "gemini" => "GEMINI_API_KEY",
            _ => return None,
        };
        std::env::var(conventional).ok()
    }

    /// Resolve a custom endpoint for a provider, if configured.
    pub fn resolve_endpoint(&self, provider: &str) -> Option<String> {
        self.providers
            .as_ref()
            .and_then(|providers| providers.get(provider))
            .and_then(|p| p.endpoint.clone())
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.staging_dir == self.vault_dir {
            return Err(AppError::Config(
                "Staging and vault directories must differ".to_string(),
            ));
        }

        Ok(())
    }
}
