use chrono::FixedOffset;
use std::path::{Path, PathBuf};

use super::schema::EngineConfig;

#[derive(Debug)]
pub enum LoadError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(serde_yaml::Error),
    Invalid { field: &'static str, reason: String },
}

impl LoadError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Config key the error refers to, when it concerns a single setting.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Invalid { field, .. } => Some(*field),
            _ => None,
        }
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Parse(e) => write!(f, "malformed engine config: {e}"),
            Self::Invalid { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(e) => Some(e),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_yaml::Error> for LoadError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e)
    }
}

pub fn load_from_file(path: &Path) -> Result<EngineConfig, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}

pub fn load_from_str(yaml: &str) -> Result<EngineConfig, LoadError> {
    let cfg: EngineConfig = serde_yaml::from_str(yaml)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Rejects settings the engine cannot run with. Every check names the key
/// at fault so the runner can report it as-is.
pub fn validate(cfg: &EngineConfig) -> Result<(), LoadError> {
    let positive: [(&'static str, u64); 5] = [
        ("scheduler.fixed_delay_ms", cfg.scheduler.fixed_delay_ms),
        ("merge.chunk_size", cfg.merge.chunk_size as u64),
        ("merge.wait_timeout_ms", cfg.merge.wait_timeout_ms),
        ("workers.max_workers", cfg.workers.max_workers as u64),
        ("workers.queue_capacity", cfg.workers.queue_capacity as u64),
    ];
    for (field, value) in positive {
        if value == 0 {
            return Err(LoadError::invalid(field, "must be > 0"));
        }
    }
    if zone_offset(cfg).is_none() {
        return Err(LoadError::invalid(
            "zone.utc_offset_seconds",
            format!("{} is outside ±24h", cfg.zone.utc_offset_seconds),
        ));
    }
    Ok(())
}

pub fn zone_offset(cfg: &EngineConfig) -> Option<FixedOffset> {
    FixedOffset::east_opt(cfg.zone.utc_offset_seconds)
}
