use serde::{Deserialize, Serialize};

/// Fatal startup errors: the static game tables are malformed or a caller
/// referenced a sector type with no configuration entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConfigError {
    UnknownSectorType(String),
    MalformedTable(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnknownSectorType(name) => {
                write!(f, "unknown sector type: {}", name)
            }
            ConfigError::MalformedTable(msg) => write!(f, "malformed game table: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors a calculation can surface to the caller. Expected user states
/// (no sectors, no players, everyone stuck aboard) are NOT errors; engines
/// return empty results for those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CalcError {
    Config(ConfigError),
    InvalidInput(String),
}

impl std::fmt::Display for CalcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalcError::Config(inner) => write!(f, "configuration error: {}", inner),
            CalcError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
        }
    }
}

impl std::error::Error for CalcError {}

impl From<ConfigError> for CalcError {
    fn from(err: ConfigError) -> Self {
        CalcError::Config(err)
    }
}
