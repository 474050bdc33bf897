use thiserror::Error;

/// Construction-time failures. The per-block and per-frame paths never fail.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AtmosError {
    #[error("invalid room dimensions: {0}")]
    InvalidRoom(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("channel layout has no channel matching a speaker definition")]
    UnsupportedLayout,
}

pub type Result<T> = std::result::Result<T, AtmosError>;
