//! Configuration loading and targeted persistence.
//!
//! The config file is optional and lives at `~/.banker/config.toml`:
//!
//! ```toml
//! [simulator]
//! processes = 5
//! resources = 3
//! preset = "textbook-safe"
//!
//! [state]
//! path = "~/.banker/state.json"
//!
//! [export]
//! format = "csv"
//! ```

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use banker_utils::{SyncPolicy, WriteOptions, write_state_file};

/// Overrides `[state].path` when set.
pub const STATE_ENV_VAR: &str = "BANKER_STATE";

const CONFIG_DIR: &str = ".banker";

#[derive(Debug, Default, Deserialize)]
pub struct BankerConfig {
    pub simulator: Option<SimulatorConfig>,
    pub state: Option<StateConfig>,
    pub export: Option<ExportConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to update config at {}: {source}", path.display())]
    Persist { path: PathBuf, source: io::Error },
    #[error("could not determine home directory")]
    NoHome,
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Persist { path, .. } => Some(path),
            ConfigError::NoHome => None,
        }
    }
}

/// Defaults for a fresh state when no state file exists yet.
#[derive(Debug, Default, Deserialize)]
pub struct SimulatorConfig {
    pub processes: Option<usize>,
    pub resources: Option<usize>,
    /// Preset slug to start from. Takes precedence over the dimensions.
    pub preset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StateConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub format: ExportFormat,
}

impl BankerConfig {
    /// Load `~/.banker/config.toml`. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn preset(&self) -> Option<&str> {
        self.simulator
            .as_ref()
            .and_then(|sim| sim.preset.as_deref())
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
    }

    /// Configured default dimensions, `(0, 0)` for anything unset.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        let sim = self.simulator.as_ref();
        (
            sim.and_then(|s| s.processes).unwrap_or(0),
            sim.and_then(|s| s.resources).unwrap_or(0),
        )
    }

    #[must_use]
    pub fn export_format(&self) -> ExportFormat {
        self.export.as_ref().map(|e| e.format).unwrap_or_default()
    }

    /// Remember `slug` as the default preset in the user config file.
    pub fn persist_preset(slug: &str) -> Result<(), ConfigError> {
        let path = config_path().ok_or(ConfigError::NoHome)?;
        persist_preset_at(&path, slug)
    }
}

/// Set `[simulator].preset` in the TOML file at `path`.
///
/// Uses `toml_edit` so comments, ordering and unrelated keys survive.
/// Creates the file (and its directory) if missing.
pub fn persist_preset_at(path: &Path, slug: &str) -> Result<(), ConfigError> {
    let persist_err = |source: io::Error| ConfigError::Persist {
        path: path.to_path_buf(),
        source,
    };

    let content = if path.exists() {
        std::fs::read_to_string(path).map_err(persist_err)?
    } else {
        String::new()
    };

    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| persist_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;

    if !doc.contains_key("simulator") {
        doc["simulator"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["simulator"]["preset"] = toml_edit::value(slug);

    write_state_file(
        path,
        doc.to_string().as_bytes(),
        WriteOptions {
            sync: SyncPolicy::Durable,
            create_parents: true,
        },
    )
    .map_err(persist_err)
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join("config.toml"))
}

/// Where the live state is persisted: `$BANKER_STATE`, then `[state].path`,
/// then `~/.banker/state.json`.
#[must_use]
pub fn state_path(config: Option<&BankerConfig>) -> Option<PathBuf> {
    resolve_state_path(env::var(STATE_ENV_VAR).ok(), config, dirs::home_dir())
}

fn resolve_state_path(
    env_value: Option<String>,
    config: Option<&BankerConfig>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    let non_blank = |raw: &String| !raw.trim().is_empty();
    let configured = config
        .and_then(|cfg| cfg.state.as_ref())
        .and_then(|state| state.path.clone());

    match env_value.filter(non_blank).or(configured.filter(non_blank)) {
        Some(raw) => Some(expand_home(raw.trim(), home.as_deref())),
        None => home.map(|home| home.join(CONFIG_DIR).join("state.json")),
    }
}

fn expand_home(raw: &str, home: Option<&Path>) -> PathBuf {
    match (raw.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}
