//! Demo session launcher for rigshare
//!
//! Booking a slot triggers a best-effort launch of a locally visible
//! demonstration process on the seller's machine. The launch runs as a
//! detached task: its outcome is written to the audit log but never
//! surfaced to the booking flow.

mod handle;
mod mock;
mod process;
mod traits;

pub use handle::*;
pub use mock::*;
pub use process::*;
pub use traits::*;

use thiserror::Error;

/// Errors from launch attempts. These never cross the launcher boundary;
/// they are caught inside the launch task and logged.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LaunchResult<T> = Result<T, LaunchError>;
