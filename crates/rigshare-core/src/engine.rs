//! Lifecycle operations over slots and bookings
//!
//! State machine per slot: pending --[approve]--> approved (terminal).
//! State machine per booking: active --[expiry observed]--> inactive
//! (terminal). Both transitions are compare-and-set in the store, so
//! concurrent callers stay idempotent.

use chrono::{DateTime, Local};
use rigshare_config::ListingBounds;
use rigshare_launcher::{LaunchHandle, Launcher};
use rigshare_store::{AuditEvent, AuditLog, Booking, Slot, SlotStatus, Store};
use rigshare_util::{BookingId, MarketError, Result, SlotId};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// The marketplace engine
pub struct Marketplace {
    store: Arc<dyn Store>,
    audit: Arc<AuditLog>,
    bounds: ListingBounds,
    launcher: Arc<dyn Launcher>,

    /// Handles of detached launch tasks. The policy is fire-and-forget;
    /// the handles exist so shutdown can cancel what is still in flight.
    launches: Mutex<Vec<LaunchHandle>>,
}

impl Marketplace {
    /// Create a new marketplace engine
    pub fn new(
        store: Arc<dyn Store>,
        audit: Arc<AuditLog>,
        bounds: ListingBounds,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        info!(
            min_hours = bounds.min_hours,
            max_hours = bounds.max_hours,
            min_price = bounds.min_price,
            max_price = bounds.max_price,
            "Marketplace initialized"
        );

        Self {
            store,
            audit,
            bounds,
            launcher,
            launches: Mutex::new(Vec::new()),
        }
    }

    /// Submit a new slot for approval
    pub fn submit_slot(
        &self,
        seller: &str,
        pc_name: &str,
        hours: u32,
        price: u32,
    ) -> Result<Slot> {
        let seller = seller.trim();
        let pc_name = pc_name.trim();

        if seller.is_empty() {
            return Err(MarketError::validation("Seller name must not be empty"));
        }
        if pc_name.is_empty() {
            return Err(MarketError::validation("PC name must not be empty"));
        }
        if !self.bounds.contains_hours(hours) {
            return Err(MarketError::validation(format!(
                "Hours {} outside allowed range {}..={}",
                hours, self.bounds.min_hours, self.bounds.max_hours
            )));
        }
        if !self.bounds.contains_price(price) {
            return Err(MarketError::validation(format!(
                "Price {} outside allowed range {}..={}",
                price, self.bounds.min_price, self.bounds.max_price
            )));
        }

        let id = self.store.create_slot(seller, pc_name, hours, price)?;

        self.audit.append(&AuditEvent::SlotSubmitted {
            seller: seller.to_string(),
            pc_name: pc_name.to_string(),
        });

        info!(slot_id = %id, seller = %seller, pc_name = %pc_name, "Slot submitted");

        Ok(Slot {
            id,
            seller: seller.to_string(),
            pc_name: pc_name.to_string(),
            hours,
            price,
            status: SlotStatus::Pending,
        })
    }

    /// Approve a pending slot. Approving an approved slot is a no-op.
    pub fn approve_slot(&self, id: SlotId) -> Result<Slot> {
        let slot = self
            .store
            .get_slot(id)?
            .ok_or(MarketError::SlotNotFound(id))?;

        if slot.status == SlotStatus::Approved {
            debug!(slot_id = %id, "Slot already approved");
            return Ok(slot);
        }

        // The flip can still lose a race against a concurrent approval;
        // only the winner appends the audit line.
        if self.store.approve_slot(id)? {
            self.audit.append(&AuditEvent::SlotApproved { slot_id: id });
            info!(slot_id = %id, "Slot approved");
        }

        Ok(Slot {
            status: SlotStatus::Approved,
            ..slot
        })
    }

    /// Book an approved slot.
    ///
    /// The booking window starts at `now` and runs for the slot's stored
    /// hours. A successful booking triggers one detached demo launch whose
    /// outcome never affects the result. Nothing prevents two buyers from
    /// booking the same slot; capacity is infinite by design.
    pub fn book_slot(
        &self,
        slot_id: SlotId,
        buyer: &str,
        now: DateTime<Local>,
    ) -> Result<Booking> {
        let buyer = buyer.trim();
        if buyer.is_empty() {
            return Err(MarketError::validation("Buyer name must not be empty"));
        }

        let slot = match self.store.get_slot(slot_id)? {
            Some(s) if s.status == SlotStatus::Approved => s,
            _ => return Err(MarketError::SlotNotFound(slot_id)),
        };

        let end = now + chrono::Duration::hours(i64::from(slot.hours));
        let id = self.store.create_booking(slot_id, buyer, now, end)?;

        self.audit.append(&AuditEvent::BookingCreated {
            buyer: buyer.to_string(),
            slot_id,
        });

        info!(booking_id = %id, slot_id = %slot_id, buyer = %buyer, end = %end, "Slot booked");

        self.track_launch(self.launcher.launch());

        Ok(Booking {
            id,
            slot_id,
            buyer: buyer.to_string(),
            start: now,
            end,
            active: true,
        })
    }

    /// Deactivate every active booking whose window has passed.
    ///
    /// Safe to call repeatedly and concurrently with itself: the store
    /// flip is compare-and-set, and only the caller that wins it appends
    /// the "Session {id} ended" line.
    pub fn sweep_expired(&self, now: DateTime<Local>) -> Result<Vec<BookingId>> {
        let mut ended = Vec::new();

        for booking in self.store.list_active_bookings()? {
            if !booking.is_expired(now) {
                continue;
            }
            if self.store.deactivate_booking(booking.id)? {
                self.audit.append(&AuditEvent::SessionEnded {
                    booking_id: booking.id,
                });
                info!(booking_id = %booking.id, "Session ended");
                ended.push(booking.id);
            }
        }

        Ok(ended)
    }

    /// List slots, optionally filtered by status
    pub fn slots(&self, status: Option<SlotStatus>) -> Result<Vec<Slot>> {
        Ok(self.store.list_slots(status)?)
    }

    /// List bookings still marked active
    pub fn active_bookings(&self) -> Result<Vec<Booking>> {
        Ok(self.store.list_active_bookings()?)
    }

    /// Number of launch tasks not yet finished
    pub fn pending_launches(&self) -> usize {
        let launches = self.launches.lock().unwrap();
        launches.iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait for in-flight launch tasks to finish. The outcomes stay
    /// unobserved; one-shot shell commands use this so the process does
    /// not exit mid-spawn.
    pub async fn drain_launches(&self) {
        let handles: Vec<LaunchHandle> = {
            let mut launches = self.launches.lock().unwrap();
            launches.drain(..).collect()
        };
        for handle in handles {
            handle.wait().await;
        }
    }

    /// Cancel every launch task still in flight (shutdown path)
    pub fn abort_launches(&self) {
        let mut launches = self.launches.lock().unwrap();
        for handle in launches.drain(..) {
            if !handle.is_finished() {
                debug!(launch_id = %handle.launch_id(), "Aborting launch task");
                handle.abort();
            }
        }
    }

    fn track_launch(&self, handle: LaunchHandle) {
        let mut launches = self.launches.lock().unwrap();
        launches.retain(|h| !h.is_finished());
        launches.push(handle);
    }
}
