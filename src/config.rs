use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::sequence::SequenceOptions;

pub const CONFIG_ENV: &str = "DIAGRAMERZ_CONFIG";

/// Optional TOML settings file. Every key may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub log_level: Option<String>,
    pub sequence: SequenceSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SequenceSettings {
    pub max_depth: usize,
    pub max_entries: usize,
}

impl Default for SequenceSettings {
    fn default() -> Self {
        let options = SequenceOptions::default();
        Self {
            max_depth: options.max_depth,
            max_entries: options.max_entries,
        }
    }
}

impl Settings {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid TOML in {}", path.display()))
    }

    /// Loads the file picked by [`resolve_config_path`], or defaults when
    /// there is none.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_path) {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    /// Command-line values win over the file. The depth is capped at
    /// [`crate::sequence::MAX_DEPTH_CEILING`].
    pub fn sequence_options(
        &self,
        max_depth: Option<usize>,
        max_entries: Option<usize>,
    ) -> SequenceOptions {
        SequenceOptions {
            max_depth: max_depth.unwrap_or(self.sequence.max_depth),
            max_entries: max_entries.unwrap_or(self.sequence.max_entries),
        }
        .clamped()
    }
}

/// `--config`, then `DIAGRAMERZ_CONFIG`, then the per-user config file if it
/// exists. An explicitly named file must exist; the per-user one is optional.
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    resolve_config_path_from(
        cli_path,
        env::var_os(CONFIG_ENV).map(PathBuf::from),
        default_config_path(),
    )
}

fn resolve_config_path_from(
    cli_path: Option<&Path>,
    env_path: Option<PathBuf>,
    default_path: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(p) = cli_path {
        return Some(p.to_path_buf());
    }
    if let Some(p) = env_path.filter(|p| !p.as_os_str().is_empty()) {
        return Some(p);
    }
    default_path.filter(|p| p.exists())
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("diagramerz").join("config.toml"))
}
