use thiserror::Error;

use crate::core::types::Position;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Illegal move: '{symbol}' cannot enter {target}")]
    IllegalMove { symbol: char, target: Position },

    #[error("Identifier domain exhausted: all {capacity} identifiers are live")]
    IdentifierDomainExhausted { capacity: usize },

    #[error("Identifier misuse: {0}")]
    IdentifierMisuse(String),

    #[error("Map format error: {0}")]
    MapFormat(String),

    #[error("Unknown agent: '{0}'")]
    UnknownAgent(char),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl SimError {
    /// Refused moves are expected during normal play and never fatal
    pub fn is_illegal_move(&self) -> bool {
        matches!(self, SimError::IllegalMove { .. })
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
