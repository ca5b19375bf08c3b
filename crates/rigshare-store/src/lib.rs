//! Persistence layer for rigshare
//!
//! Provides:
//! - Slot and booking records
//! - SQLite-backed store behind the `Store` trait
//! - Append-only audit log file

mod audit;
mod records;
mod sqlite;
mod traits;

pub use audit::*;
pub use records::*;
pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<StoreError> for rigshare_util::MarketError {
    fn from(e: StoreError) -> Self {
        rigshare_util::MarketError::Storage(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
