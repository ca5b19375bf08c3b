//! Append-only audit log
//!
//! One timestamped plain-text line per notable event, in the format
//! `<timestamp> | <message>`. No rotation, no maximum size. Appends are
//! best-effort: a write failure is reported through tracing and never
//! aborts the operation that produced the event.

use rigshare_util::{BookingId, LaunchId, SlotId, format_datetime_full};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

use crate::StoreResult;

/// Types of audit events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent {
    /// Service started
    ServiceStarted,

    /// Service stopped
    ServiceStopped,

    /// Seller submitted a slot
    SlotSubmitted { seller: String, pc_name: String },

    /// Admin approved a slot
    SlotApproved { slot_id: SlotId },

    /// Buyer booked a slot
    BookingCreated { buyer: String, slot_id: SlotId },

    /// Launcher is about to start the demo application
    LaunchStarted { launch_id: LaunchId },

    /// Demo application launched
    LaunchSucceeded { launch_id: LaunchId },

    /// Demo application failed to launch
    LaunchFailed { launch_id: LaunchId, cause: String },

    /// Booking window passed and the booking was deactivated
    SessionEnded { booking_id: BookingId },
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEvent::ServiceStarted => write!(f, "Service started"),
            AuditEvent::ServiceStopped => write!(f, "Service stopped"),
            AuditEvent::SlotSubmitted { seller, pc_name } => {
                write!(f, "Seller {} created slot for {}", seller, pc_name)
            }
            AuditEvent::SlotApproved { slot_id } => {
                write!(f, "Admin approved slot {}", slot_id)
            }
            AuditEvent::BookingCreated { buyer, slot_id } => {
                write!(f, "Buyer {} booked slot {}", buyer, slot_id)
            }
            AuditEvent::LaunchStarted { launch_id } => {
                write!(f, "Launching demo application [{}]", launch_id)
            }
            AuditEvent::LaunchSucceeded { launch_id } => {
                write!(f, "Application launched successfully [{}]", launch_id)
            }
            AuditEvent::LaunchFailed { launch_id, cause } => {
                write!(f, "Launch failed [{}]: {}", launch_id, cause)
            }
            AuditEvent::SessionEnded { booking_id } => {
                write!(f, "Session {} ended", booking_id)
            }
        }
    }
}

/// Append-only file audit log
pub struct AuditLog {
    file: Mutex<File>,
    path: PathBuf,
}

impl AuditLog {
    /// Open or create the log file at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    /// Append one event line
    pub fn append(&self, event: &AuditEvent) {
        let line = format!(
            "{} | {}\n",
            format_datetime_full(&rigshare_util::now()),
            event
        );
        let mut file = self.file.lock().unwrap();
        if let Err(e) = file.write_all(line.as_bytes()) {
            warn!(path = %self.path.display(), error = %e, "Audit append failed");
        }
    }

    /// Read back the full log, for the on-demand log view
    pub fn read_all(&self) -> StoreResult<String> {
        Ok(std::fs::read_to_string(&self.path)?)
    }

    /// Path of the underlying log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
