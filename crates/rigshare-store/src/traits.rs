//! Store trait definitions

use chrono::{DateTime, Local};
use rigshare_util::{BookingId, SlotId};

use crate::{Booking, Slot, SlotStatus, StoreResult};

/// Main store trait
pub trait Store: Send + Sync {
    // Slots

    /// Insert a pending slot; returns the assigned id. Inputs are
    /// pre-validated by the caller.
    fn create_slot(
        &self,
        seller: &str,
        pc_name: &str,
        hours: u32,
        price: u32,
    ) -> StoreResult<SlotId>;

    /// Fetch a single slot
    fn get_slot(&self, id: SlotId) -> StoreResult<Option<Slot>>;

    /// List slots in insertion order, optionally filtered by status
    fn list_slots(&self, status: Option<SlotStatus>) -> StoreResult<Vec<Slot>>;

    /// Flip a pending slot to approved. Returns true when this call
    /// performed the flip, false when the slot was already approved.
    /// Idempotent; existence is checked by the caller.
    fn approve_slot(&self, id: SlotId) -> StoreResult<bool>;

    // Bookings

    /// Insert an active booking; returns the assigned id
    fn create_booking(
        &self,
        slot_id: SlotId,
        buyer: &str,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> StoreResult<BookingId>;

    /// Fetch a single booking
    fn get_booking(&self, id: BookingId) -> StoreResult<Option<Booking>>;

    /// List bookings whose active flag is still set, in insertion order
    fn list_active_bookings(&self) -> StoreResult<Vec<Booking>>;

    /// Flip a booking inactive. Returns true when this call performed the
    /// flip, false when it was already inactive. Idempotent.
    fn deactivate_booking(&self, id: BookingId) -> StoreResult<bool>;

    // Health

    /// Check if the store is healthy
    fn is_healthy(&self) -> bool;
}
