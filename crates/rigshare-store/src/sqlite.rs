//! SQLite-based store implementation

use chrono::{DateTime, Local};
use rigshare_util::{BookingId, SlotId};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::{Booking, Slot, SlotStatus, Store, StoreError, StoreResult};

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        // "end" is quoted because it is a SQL keyword; the column layout
        // itself is fixed.
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS slots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                seller TEXT NOT NULL,
                pc_name TEXT NOT NULL,
                hours INTEGER NOT NULL,
                price INTEGER NOT NULL,
                status TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS bookings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slot_id INTEGER NOT NULL,
                buyer TEXT NOT NULL,
                start TEXT NOT NULL,
                "end" TEXT NOT NULL,
                active INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_slots_status ON slots(status);
            CREATE INDEX IF NOT EXISTS idx_bookings_active ON bookings(active);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

type SlotRow = (i64, String, String, u32, u32, String);
type BookingRow = (i64, i64, String, String, String, bool);

fn slot_from_row(row: SlotRow) -> StoreResult<Slot> {
    let (id, seller, pc_name, hours, price, status) = row;
    let status = SlotStatus::parse(&status)
        .ok_or_else(|| StoreError::Database(format!("Unknown slot status: {}", status)))?;

    Ok(Slot {
        id: SlotId::new(id),
        seller,
        pc_name,
        hours,
        price,
        status,
    })
}

fn booking_from_row(row: BookingRow) -> StoreResult<Booking> {
    let (id, slot_id, buyer, start, end, active) = row;
    let start = parse_timestamp(&start)?;
    let end = parse_timestamp(&end)?;

    Ok(Booking {
        id: BookingId::new(id),
        slot_id: SlotId::new(slot_id),
        buyer,
        start,
        end,
        active,
    })
}

fn parse_timestamp(s: &str) -> StoreResult<DateTime<Local>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| StoreError::Database(format!("Bad timestamp '{}': {}", s, e)))
}

impl Store for SqliteStore {
    fn create_slot(
        &self,
        seller: &str,
        pc_name: &str,
        hours: u32,
        price: u32,
    ) -> StoreResult<SlotId> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO slots (seller, pc_name, hours, price, status) VALUES (?, ?, ?, ?, ?)",
            params![seller, pc_name, hours, price, SlotStatus::Pending.as_str()],
        )?;

        let id = SlotId::new(conn.last_insert_rowid());
        debug!(slot_id = %id, seller = %seller, "Slot inserted");
        Ok(id)
    }

    fn get_slot(&self, id: SlotId) -> StoreResult<Option<Slot>> {
        let conn = self.conn.lock().unwrap();

        let row: Option<SlotRow> = conn
            .query_row(
                "SELECT id, seller, pc_name, hours, price, status FROM slots WHERE id = ?",
                [id.as_i64()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;

        row.map(slot_from_row).transpose()
    }

    fn list_slots(&self, status: Option<SlotStatus>) -> StoreResult<Vec<Slot>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = match status {
            Some(_) => conn.prepare(
                "SELECT id, seller, pc_name, hours, price, status FROM slots
                 WHERE status = ? ORDER BY id",
            )?,
            None => conn.prepare(
                "SELECT id, seller, pc_name, hours, price, status FROM slots ORDER BY id",
            )?,
        };

        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<SlotRow> {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        };

        let rows = match status {
            Some(s) => stmt.query_map([s.as_str()], map_row)?,
            None => stmt.query_map([], map_row)?,
        };

        let mut slots = Vec::new();
        for row in rows {
            slots.push(slot_from_row(row?)?);
        }
        Ok(slots)
    }

    fn approve_slot(&self, id: SlotId) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        // Compare-and-set on the pending status keeps approval idempotent
        // and the transition monotonic under concurrent callers.
        let changed = conn.execute(
            "UPDATE slots SET status = ? WHERE id = ? AND status = ?",
            params![
                SlotStatus::Approved.as_str(),
                id.as_i64(),
                SlotStatus::Pending.as_str()
            ],
        )?;

        debug!(slot_id = %id, changed = changed, "Slot approval applied");
        Ok(changed == 1)
    }

    fn create_booking(
        &self,
        slot_id: SlotId,
        buyer: &str,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> StoreResult<BookingId> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"INSERT INTO bookings (slot_id, buyer, start, "end", active) VALUES (?, ?, ?, ?, 1)"#,
            params![
                slot_id.as_i64(),
                buyer,
                start.to_rfc3339(),
                end.to_rfc3339()
            ],
        )?;

        let id = BookingId::new(conn.last_insert_rowid());
        debug!(booking_id = %id, slot_id = %slot_id, buyer = %buyer, "Booking inserted");
        Ok(id)
    }

    fn get_booking(&self, id: BookingId) -> StoreResult<Option<Booking>> {
        let conn = self.conn.lock().unwrap();

        let row: Option<BookingRow> = conn
            .query_row(
                r#"SELECT id, slot_id, buyer, start, "end", active FROM bookings WHERE id = ?"#,
                [id.as_i64()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;

        row.map(booking_from_row).transpose()
    }

    fn list_active_bookings(&self) -> StoreResult<Vec<Booking>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"SELECT id, slot_id, buyer, start, "end", active FROM bookings
               WHERE active = 1 ORDER BY id"#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?;

        let mut bookings = Vec::new();
        for row in rows {
            bookings.push(booking_from_row(row?)?);
        }
        Ok(bookings)
    }

    fn deactivate_booking(&self, id: BookingId) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        // Compare-and-set on the active flag: only one of any number of
        // concurrent sweeps observes the flip.
        let changed = conn.execute(
            "UPDATE bookings SET active = 0 WHERE id = ? AND active = 1",
            [id.as_i64()],
        )?;

        debug!(booking_id = %id, changed = changed, "Booking deactivation applied");
        Ok(changed == 1)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Local> {
        Local.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_slot_round_trip() {
        let store = SqliteStore::in_memory().unwrap();

        let id = store.create_slot("Alice", "Rig1", 2, 100).unwrap();
        let slot = store.get_slot(id).unwrap().unwrap();

        assert_eq!(slot.seller, "Alice");
        assert_eq!(slot.pc_name, "Rig1");
        assert_eq!(slot.hours, 2);
        assert_eq!(slot.price, 100);
        assert_eq!(slot.status, SlotStatus::Pending);
    }

    #[test]
    fn test_missing_slot_is_none() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.get_slot(SlotId::new(99)).unwrap().is_none());
    }

    #[test]
    fn test_list_slots_insertion_order_and_filter() {
        let store = SqliteStore::in_memory().unwrap();

        let first = store.create_slot("Alice", "Rig1", 2, 100).unwrap();
        let second = store.create_slot("Carol", "Rig2", 4, 200).unwrap();
        store.approve_slot(second).unwrap();

        let all = store.list_slots(None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first);
        assert_eq!(all[1].id, second);

        let approved = store.list_slots(Some(SlotStatus::Approved)).unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, second);

        let pending = store.list_slots(Some(SlotStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, first);
    }

    #[test]
    fn test_approve_is_idempotent() {
        let store = SqliteStore::in_memory().unwrap();
        let id = store.create_slot("Alice", "Rig1", 2, 100).unwrap();

        assert!(store.approve_slot(id).unwrap());
        assert!(!store.approve_slot(id).unwrap());

        let slot = store.get_slot(id).unwrap().unwrap();
        assert_eq!(slot.status, SlotStatus::Approved);
    }

    #[test]
    fn test_booking_round_trip() {
        let store = SqliteStore::in_memory().unwrap();
        let slot_id = store.create_slot("Alice", "Rig1", 2, 100).unwrap();

        let id = store
            .create_booking(slot_id, "Bob", ts(1000), ts(8200))
            .unwrap();
        let booking = store.get_booking(id).unwrap().unwrap();

        assert_eq!(booking.slot_id, slot_id);
        assert_eq!(booking.buyer, "Bob");
        assert_eq!(booking.start, ts(1000));
        assert_eq!(booking.end, ts(8200));
        assert!(booking.active);
    }

    #[test]
    fn test_deactivate_flips_exactly_once() {
        let store = SqliteStore::in_memory().unwrap();
        let slot_id = store.create_slot("Alice", "Rig1", 2, 100).unwrap();
        let id = store
            .create_booking(slot_id, "Bob", ts(1000), ts(8200))
            .unwrap();

        assert_eq!(store.list_active_bookings().unwrap().len(), 1);

        assert!(store.deactivate_booking(id).unwrap());
        assert!(!store.deactivate_booking(id).unwrap());

        assert!(store.list_active_bookings().unwrap().is_empty());
        let booking = store.get_booking(id).unwrap().unwrap();
        assert!(!booking.active);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rigshare.db");

        let id = {
            let store = SqliteStore::open(&path).unwrap();
            store.create_slot("Alice", "Rig1", 2, 100).unwrap()
        };

        let store = SqliteStore::open(&path).unwrap();
        let slot = store.get_slot(id).unwrap().unwrap();
        assert_eq!(slot.seller, "Alice");
    }
}
