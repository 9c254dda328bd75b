use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use cstats_core::{CharacterSheet, PipelineConfig, StatsEngine};

use crate::error::{Result, StoreError};

/// Default base directory for cstats files.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".character-stats")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

pub fn default_config_path() -> PathBuf {
    default_base_dir().join("config.toml")
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Lookup table path; relative paths resolve against the config file.
    pub table: Option<PathBuf>,
    /// `MM-DD` of the birthday notice.
    pub celebration: Option<String>,
    pub inject_stats: bool,
    pub character: CharacterSheet,
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl Config {
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut config: Config = toml::from_str(content).map_err(|source| StoreError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.source = Some(path.to_path_buf());
        if let Some(table) = config.table.take() {
            config.table = Some(resolve_against(path, table));
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content, path)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `explicit` if given, otherwise the default location if a file
    /// exists there, otherwise built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = default_config_path();
                if path.is_file() {
                    Self::load(&path)
                } else {
                    tracing::debug!("no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// File this config was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        match &self.celebration {
            None => Ok(PipelineConfig::default()),
            Some(raw) => Ok(PipelineConfig {
                celebration: parse_month_day(raw)?,
            }),
        }
    }

    pub fn engine(&self) -> Result<StatsEngine> {
        let mut record = cstats_core::CharacterRecord::new(&self.character)
            .map_err(|e| StoreError::InvalidData(format!("[character]: {e}")))?;
        record.set_inject_stats(self.inject_stats);
        Ok(StatsEngine::from_record(record))
    }
}

fn resolve_against(config_path: &Path, table: PathBuf) -> PathBuf {
    if table.is_absolute() {
        return table;
    }
    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(table),
        _ => table,
    }
}

/// `MM-DD` → (month, day). February 29 is allowed.
pub fn parse_month_day(raw: &str) -> Result<(u32, u32)> {
    let invalid = || StoreError::InvalidData(format!("celebration {raw:?} is not MM-DD"));
    let (m, d) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    let day: u32 = d.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(2000, month, day).ok_or_else(invalid)?;
    Ok((month, day))
}
