//! Configuration resolution for AutoDeal.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/autodeal/settings.json)
//! 3. Project config (.autodeal/settings.json)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete AutoDeal configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub sms: SmsConfig,
    #[serde(default)]
    pub feature_flags: std::collections::HashMap<String, bool>,
}

/// Daemon-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    pub port: u16,
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            port: 50061,
            database_path: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// SMS upstream (OTP delivery) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    /// Provider base URL.
    pub base_url: String,
    /// Provider API key; usually supplied via `TWOFACTOR_API_KEY`.
    pub api_key: Option<String>,
    /// SMS template name registered with the provider.
    pub template: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://2factor.in".to_string(),
            api_key: None,
            template: "AUTHMSG".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(project_dir: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    // Load global config
    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    // Load project config
    if let Some(dir) = project_dir {
        let project_path = dir.join(".autodeal").join("settings.json");
        if project_path.exists() {
            let project = load_config_file(&project_path)?;
            merge_config(&mut config, project);
        }
    }

    // Apply environment overrides
    apply_env_overrides(&mut config);

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".autodeal").join("settings.json"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/autodeal/settings.json"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("autodeal").join("settings.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: Config) {
    // Merge daemon config
    if overlay.daemon.database_path.is_some() {
        base.daemon.database_path = overlay.daemon.database_path;
    }
    base.daemon.port = overlay.daemon.port;
    base.daemon.log_level = overlay.daemon.log_level;
    base.daemon.log_json = overlay.daemon.log_json;

    // Merge SMS config
    if overlay.sms.api_key.is_some() {
        base.sms.api_key = overlay.sms.api_key;
    }
    base.sms.base_url = overlay.sms.base_url;
    base.sms.template = overlay.sms.template;
    base.sms.request_timeout_secs = overlay.sms.request_timeout_secs;

    // Merge feature flags
    base.feature_flags.extend(overlay.feature_flags);
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("AUTODEAL_PORT") {
        if let Ok(n) = val.parse() {
            config.daemon.port = n;
        }
    }
    if let Ok(val) = std::env::var("AUTODEAL_LOG_LEVEL") {
        config.daemon.log_level = val;
    }
    if let Ok(val) = std::env::var("AUTODEAL_SMS_BASE_URL") {
        config.sms.base_url = val;
    }
    if let Ok(val) = std::env::var("TWOFACTOR_API_KEY") {
        if !val.is_empty() {
            config.sms.api_key = Some(val);
        }
    }
}
