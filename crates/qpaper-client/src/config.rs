//! Client configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use qpaper_core::model::{Role, SessionContext};
use qpaper_core::traits::GenerationClient;

use crate::http::{HttpGenerationClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Connection settings for the generation service.
///
/// Note: Custom Debug impl masks the token to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("base_url", &self.base_url)
            .field("token", &"***")
            .field("role", &self.role)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            role: default_role(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ServiceConfig {
    pub fn session(&self) -> SessionContext {
        SessionContext::new(self.token.clone(), self.role)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_role() -> Role {
    Role::Faculty
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./generated_papers")
}

/// Top-level qpaper configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QpaperConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    /// Where generated papers are saved.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for QpaperConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            output_dir: default_output_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `qpaper.toml` in the current directory
/// 2. `~/.config/qpaper/config.toml`
///
/// `QPAPER_TOKEN` overrides the configured token.
pub fn load_config() -> Result<QpaperConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QpaperConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("qpaper.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QpaperConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QpaperConfig::default(),
    };

    if let Ok(token) = std::env::var("QPAPER_TOKEN") {
        config.service.token = token;
    }

    config.service.base_url = resolve_env_vars(&config.service.base_url);
    config.service.token = resolve_env_vars(&config.service.token);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("qpaper"))
}

/// Create the HTTP client for a service configuration.
pub fn create_client(config: &ServiceConfig) -> Arc<dyn GenerationClient> {
    Arc::new(HttpGenerationClient::with_timeout(
        &config.base_url,
        config.session(),
        config.timeout_secs,
    ))
}
