//! Error types for landmark validation and configuration loading.

use std::fmt;
use std::path::PathBuf;

/// Why a landmark set could not be used for classification.
///
/// Never fatal: the pipeline treats any of these as a `None` label.
#[derive(Debug, Clone, PartialEq)]
pub enum LandmarkError {
    /// The set did not contain exactly 21 points.
    WrongCount { found: usize },
    /// A coordinate was NaN or infinite.
    NonFinite { index: usize },
}

impl fmt::Display for LandmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LandmarkError::WrongCount { found } => {
                write!(f, "expected 21 landmarks, got {found}")
            }
            LandmarkError::NonFinite { index } => {
                write!(f, "landmark {index} has a non-finite coordinate")
            }
        }
    }
}

impl std::error::Error for LandmarkError {}

/// Errors raised while loading or validating a [`PipelineConfig`].
///
/// [`PipelineConfig`]: crate::config::PipelineConfig
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    /// A value parsed fine but makes no sense (zero run length, NaN threshold, …).
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read {}: {source}", path.display())
            }
            ConfigError::Parse(e)   => write!(f, "invalid config: {e}"),
            ConfigError::Invalid(m) => write!(f, "invalid config: {m}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e)          => Some(e),
            ConfigError::Invalid(_)        => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}
