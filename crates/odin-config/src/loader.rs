use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use odin_core::{MissionPhase, OdinError};

use crate::schema::OdinConfig;

/// Loads and reloads the ODIN configuration.
pub struct ConfigLoader {
    config: Arc<RwLock<OdinConfig>>,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > ODIN_CONFIG env > ~/.odin/odin.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("ODIN_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".odin")
            .join("odin.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> odin_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            let raw = std::fs::read_to_string(&config_path)?;
            Self::parse(&raw, &config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            OdinConfig::default()
        };

        let config = Self::apply_env_overrides(config);
        Self::check(&config)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Build a loader around an in-memory config (no file backing).
    pub fn from_config(config: OdinConfig) -> odin_core::Result<Self> {
        Self::check(&config)?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path: PathBuf::new(),
        })
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> OdinConfig {
        self.config.read().clone()
    }

    /// Get a shared reference for subscription.
    pub fn shared(&self) -> Arc<RwLock<OdinConfig>> {
        Arc::clone(&self.config)
    }

    /// Path the config was loaded from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Reload the config from disk. The current config is kept if the file
    /// is missing or invalid.
    pub fn reload(&self) -> odin_core::Result<()> {
        if !self.config_path.exists() {
            return Err(OdinError::Config(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }
        let raw = std::fs::read_to_string(&self.config_path)?;
        let new_config = Self::apply_env_overrides(Self::parse(&raw, &self.config_path)?);
        Self::check(&new_config)?;
        *self.config.write() = new_config;
        info!("configuration reloaded");
        Ok(())
    }

    fn parse(raw: &str, path: &Path) -> odin_core::Result<OdinConfig> {
        toml::from_str::<OdinConfig>(raw).map_err(|e| {
            OdinError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Validate config: log warnings, fail on errors.
    fn check(config: &OdinConfig) -> odin_core::Result<()> {
        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
                Ok(())
            }
            Err(e) => Err(OdinError::Config(e)),
        }
    }

    /// Apply env var overrides (ODIN_LOG_LEVEL, ODIN_MISSION_PHASE, etc.)
    fn apply_env_overrides(mut config: OdinConfig) -> OdinConfig {
        if let Ok(v) = std::env::var("ODIN_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Ok(v) = std::env::var("ODIN_LOG_FORMAT") {
            config.logging.format = v;
        }
        if let Ok(v) = std::env::var("ODIN_MISSION_PHASE") {
            match v.parse::<MissionPhase>() {
                Ok(phase) => config.governor.initial_phase = phase,
                Err(e) => warn!(error = %e, "ignoring ODIN_MISSION_PHASE"),
            }
        }
        if let Ok(v) = std::env::var("ODIN_EMERGENCY_MODE") {
            config.governor.emergency_mode = matches!(v.as_str(), "1" | "true" | "yes" | "on");
        }
        config
    }
}
