//! Error types for rigshare

use thiserror::Error;

use crate::SlotId;

/// Core error type for marketplace operations
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Slot not found: {0}")]
    SlotNotFound(SlotId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Launch error: {0}")]
    Launch(String),
}

impl MarketError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn launch(msg: impl Into<String>) -> Self {
        Self::Launch(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;
