//! Configuration for linecmd front-ends.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! explicit config file -> environment. The user file lives at
//! `<config dir>/linecmd/config.toml`; environment variables use the
//! `LINECMD_` prefix with `__` as the nesting separator
//! (`LINECMD_THEME__ENABLED=false`).

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::style::{Role, Theme};

/// Settings shared by the dispatcher and the console front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Printed before each input read.
    pub prompt: String,
    pub theme: Theme,
    pub log: LogConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            theme: Theme::default(),
            log: LogConfig::default(),
        }
    }
}

impl ParserConfig {
    /// The prompt painted with the theme's prompt style.
    pub fn styled_prompt(&self) -> String {
        self.theme.paint(&self.prompt, Role::Prompt)
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive when no verbosity flag is given.
    pub level: String,
    /// Also write JSON logs to a daily rolling file.
    pub file: bool,
    /// Log directory; defaults to the platform data dir.
    pub directory: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: false,
            directory: None,
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("dev", "linecmd", "linecmd")
}

/// Path of the user-level config file, whether or not it exists.
pub fn user_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// Default directory for log files.
pub fn default_log_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.data_dir().join("logs"))
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `LINECMD_`)
/// 2. `explicit` config file, which must exist when given
/// 3. User config (`~/.config/linecmd/config.toml` on Linux)
/// 4. Built-in defaults
pub fn load_config(explicit: Option<&Path>) -> Result<ParserConfig, ConfigError> {
    load_layers(user_config_path().as_deref(), explicit)
}

fn load_layers(user: Option<&Path>, explicit: Option<&Path>) -> Result<ParserConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(ParserConfig::default()));

    if let Some(user) = user {
        if user.exists() {
            figment = figment.merge(Toml::file(user));
        }
    }

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("LINECMD_").split("__"));

    figment
        .extract()
        .map_err(|e| ConfigError::Invalid(Box::new(e)))
}
