//! Configuration management for scribe-gate.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, environment overrides, lazy validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        DEFAULT_MODEL_FILE, ENV_IDENTITY_KEY, ENV_IDENTITY_URL, IdentityServiceConfig,
        SiteConfig, VoiceConfig,
    },
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use scribe_gate_core::{ConfigError, IdentityConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Identity service connection.
    #[serde(default)]
    pub identity: IdentityServiceConfig,
    /// Site the session commands navigate to.
    #[serde(default)]
    pub site: SiteConfig,
    /// Voice capture settings.
    #[serde(default)]
    pub voice: VoiceConfig,
}

impl Config {
    /// Load the per-user configuration, creating a default file if none
    /// exists, then apply environment overrides.
    ///
    /// Note: This does NOT validate the model path exists or that the
    /// identity settings are complete. Each surface validates only what it
    /// uses, so `dictate` runs without identity settings and the session
    /// commands run without a model.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;
        let data_dir = Self::data_dir()?;

        let config = Self::load_from(&config_path, &data_dir)?;

        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Load from `config_path`, writing defaults rooted at `data_dir` if it
    /// does not exist.
    #[track_caller]
    #[instrument]
    pub fn load_from(config_path: &Path, data_dir: &Path) -> AppResult<Self> {
        if !config_path.exists() {
            info!("No config found, creating default");
            return Self::create_default(config_path, data_dir);
        }

        let contents = fs::read_to_string(config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config = Self::from_toml_str(&contents)?;

        info!(config_path = ?config_path, "Configuration loaded");

        Ok(config)
    }

    /// Parse a TOML document. Missing sections and keys take their defaults.
    #[track_caller]
    pub fn from_toml_str(contents: &str) -> AppResult<Self> {
        toml::from_str(contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Replace identity settings with `SUPABASE_URL` / `SUPABASE_KEY` when
    /// `lookup` yields a non-blank value for them.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_blank(ENV_IDENTITY_URL) {
            debug!(var = ENV_IDENTITY_URL, "Identity URL overridden from environment");
            self.identity.url = Some(url);
        }
        if let Some(key) = non_blank(ENV_IDENTITY_KEY) {
            debug!(var = ENV_IDENTITY_KEY, "Identity key overridden from environment");
            self.identity.public_key = Some(key);
        }

        self
    }

    /// Validated identity service settings.
    ///
    /// # Errors
    ///
    /// Returns error if the URL or public key is missing or the URL is invalid.
    #[track_caller]
    pub fn identity_config(&self) -> Result<IdentityConfig, ConfigError> {
        IdentityConfig::new(
            self.identity.url.as_deref(),
            self.identity.public_key.as_deref(),
        )
    }

    /// Validate that the Whisper model file exists at the configured path.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate_model_path(&self) -> AppResult<()> {
        if !self.voice.model_path.exists() {
            return Err(AppError::ConfigError {
                reason: format!(
                    "Whisper model not found at: {:?}. Download a model or set voice.model_path.",
                    self.voice.model_path
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    /// Save configuration to `config_path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Per-user data directory (session file, logs, models), created on demand.
    #[track_caller]
    pub fn data_dir() -> AppResult<PathBuf> {
        let data_dir = Self::project_dirs()?.data_dir().to_path_buf();
        Self::ensure_dir(&data_dir)?;
        Ok(data_dir)
    }

    /// Location of the persisted session.
    #[track_caller]
    pub fn session_path() -> AppResult<PathBuf> {
        Ok(Self::data_dir()?.join("session.json"))
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();
        Self::ensure_dir(config_dir)?;
        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "scribe-gate", "Scribe-Gate").ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get project directories".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }

    #[track_caller]
    fn ensure_dir(dir: &Path) -> AppResult<()> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            debug!(dir = ?dir, "Created directory");
        }
        Ok(())
    }

    #[track_caller]
    fn create_default(config_path: &Path, data_dir: &Path) -> AppResult<Self> {
        let model_path = data_dir.join("models").join(DEFAULT_MODEL_FILE);

        let config = Config {
            voice: VoiceConfig {
                model_path: model_path.clone(),
                ..VoiceConfig::default()
            },
            ..Config::default()
        };

        config.save_to(config_path)?;

        warn!(
            model_path = ?model_path,
            "Default config created. Set identity.url and identity.public_key (or \
             SUPABASE_URL/SUPABASE_KEY) and download a Whisper model before use."
        );

        Ok(config)
    }
}
