//! Slot and booking records
//!
//! The store is the sole owner of these records; the lifecycle engine is
//! the only mutator, and mutation happens through the `Store` trait.

use chrono::{DateTime, Local};
use rigshare_util::{BookingId, SlotId};
use std::fmt;
use std::time::Duration;

/// Approval status of a slot.
///
/// The only transition is pending -> approved; there is no reject or
/// withdraw path, and approved is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Pending,
    Approved,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Pending => "pending",
            SlotStatus::Approved => "approved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SlotStatus::Pending),
            "approved" => Some(SlotStatus::Approved),
            _ => None,
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A seller's offer of machine time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub id: SlotId,
    pub seller: String,
    pub pc_name: String,
    pub hours: u32,
    pub price: u32,
    pub status: SlotStatus,
}

impl Slot {
    /// Length of the rental window this slot sells.
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.hours) * 3600)
    }
}

/// A buyer's reservation against an approved slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    /// Soft reference; many bookings may point at one slot.
    pub slot_id: SlotId,
    pub buyer: String,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub active: bool,
}

impl Booking {
    /// Time remaining in the window, zero once past the end.
    pub fn remaining(&self, now: DateTime<Local>) -> Duration {
        (self.end - now).to_std().unwrap_or(Duration::ZERO)
    }

    /// Whether the window end has passed.
    pub fn is_expired(&self, now: DateTime<Local>) -> bool {
        now >= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn booking_ending_at(end: DateTime<Local>) -> Booking {
        Booking {
            id: BookingId::new(1),
            slot_id: SlotId::new(1),
            buyer: "Bob".into(),
            start: end - chrono::Duration::hours(2),
            end,
            active: true,
        }
    }

    #[test]
    fn slot_duration_from_hours() {
        let slot = Slot {
            id: SlotId::new(1),
            seller: "Alice".into(),
            pc_name: "Rig1".into(),
            hours: 2,
            price: 100,
            status: SlotStatus::Pending,
        };
        assert_eq!(slot.duration(), Duration::from_secs(7200));
    }

    #[test]
    fn remaining_counts_down_to_zero() {
        let end = Local.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let booking = booking_ending_at(end);

        let before = end - chrono::Duration::seconds(90);
        assert_eq!(booking.remaining(before), Duration::from_secs(90));
        assert!(!booking.is_expired(before));

        let after = end + chrono::Duration::seconds(1);
        assert_eq!(booking.remaining(after), Duration::ZERO);
        assert!(booking.is_expired(after));
    }

    #[test]
    fn expiry_is_inclusive_of_end() {
        let end = Local.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let booking = booking_ending_at(end);
        assert!(booking.is_expired(end));
    }

    #[test]
    fn status_round_trip() {
        assert_eq!(SlotStatus::parse("pending"), Some(SlotStatus::Pending));
        assert_eq!(SlotStatus::parse("approved"), Some(SlotStatus::Approved));
        assert_eq!(SlotStatus::parse("rejected"), None);
        assert_eq!(SlotStatus::Approved.as_str(), "approved");
    }
}
