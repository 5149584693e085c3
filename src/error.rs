// ================================
// src/error.rs - error taxonomy for the navigation core
// ================================
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sector [{low}, {high}] exceeds scan of length {len}")]
    SectorOutOfBounds { low: usize, high: usize, len: usize },

    #[error("Sector [{low}, {high}] is inverted")]
    InvalidSector { low: usize, high: usize },

    #[error("Sample index {index} exceeds scan of length {len}")]
    SampleOutOfBounds { index: usize, len: usize },

    #[error("Following a wall without a turn direction")]
    UndefinedWallSide,

    #[error("Malformed scan frame: {0}")]
    Frame(String),
}

impl NavError {
    /// Fatal errors halt the node. Only malformed frames are skipped.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, NavError::Frame(_))
    }
}

impl From<toml::de::Error> for NavError {
    fn from(e: toml::de::Error) -> Self {
        NavError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
