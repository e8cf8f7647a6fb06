//! redb-based booking store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `bookings` | `booking_id` | `Booking` | Booking records |
//! | `order_codes` | `order_code` | `booking_id` | Order-code uniqueness |
//! | `correlations` | `correlation_id` | `booking_id` | Every gateway session ever issued |
//! | `refund_requests` | `booking_id` | `RefundRequest` | At most one per booking |
//! | `refund_ids` | `request_id` | `booking_id` | Request id lookup |
//! | `payment_facts` | `(booking_id, sequence)` | `PaymentFact` | Reconciliation log (append-only) |
//! | `review_queue` | `sequence` | `ReviewItem` | Manual review queue |
//! | `review_index` | `(booking_id, correlation_id)` | `sequence` | One review item per session |
//! | `sequence_counter` | name | `u64` | Counters |
//!
//! Values are JSON-encoded. redb serializes write transactions, so each
//! conditional write (version check or pending check) reads and writes inside
//! one transaction.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, Table, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::{
    Booking, BookingPaymentFields, OrderStatus, PaymentFact, PaymentStatus, RefundRequest,
    RefundStatus, ReviewItem,
};

use super::{BookingRepository, RefundDecision, RefundResolution, StorageError, StorageResult};

const BOOKINGS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("bookings");

const ORDER_CODES_TABLE: TableDefinition<&str, i64> = TableDefinition::new("order_codes");

const CORRELATIONS_TABLE: TableDefinition<&str, i64> = TableDefinition::new("correlations");

const REFUNDS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("refund_requests");

const REFUND_IDS_TABLE: TableDefinition<i64, i64> = TableDefinition::new("refund_ids");

const FACTS_TABLE: TableDefinition<(i64, u64), &[u8]> = TableDefinition::new("payment_facts");

const REVIEW_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("review_queue");

/// Direct payments have no correlation id; they index under ""
const REVIEW_INDEX_TABLE: TableDefinition<(i64, &str), u64> = TableDefinition::new("review_index");

const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const REVIEW_SEQ_KEY: &str = "review_seq";

/// Booking store backed by redb
#[derive(Clone)]
pub struct RedbBookingStore {
    db: Arc<Database>,
}

impl RedbBookingStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests and local demos)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(BOOKINGS_TABLE)?;
            let _ = write_txn.open_table(ORDER_CODES_TABLE)?;
            let _ = write_txn.open_table(CORRELATIONS_TABLE)?;
            let _ = write_txn.open_table(REFUNDS_TABLE)?;
            let _ = write_txn.open_table(REFUND_IDS_TABLE)?;
            let _ = write_txn.open_table(FACTS_TABLE)?;
            let _ = write_txn.open_table(REVIEW_TABLE)?;
            let _ = write_txn.open_table(REVIEW_INDEX_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(REVIEW_SEQ_KEY)?.is_none() {
                seq_table.insert(REVIEW_SEQ_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Read-modify-write a booking under a version check
    fn update_booking(
        &self,
        booking_id: i64,
        expected_version: u64,
        mutate: impl FnOnce(&mut Booking),
    ) -> StorageResult<Booking> {
        let txn = self.db.begin_write()?;
        let booking = {
            let mut table = txn.open_table(BOOKINGS_TABLE)?;
            let mut booking: Booking =
                read_json(&table, booking_id)?.ok_or(StorageError::BookingNotFound(booking_id))?;
            if booking.version != expected_version {
                return Err(StorageError::VersionConflict {
                    booking_id,
                    expected: expected_version,
                    actual: booking.version,
                });
            }
            mutate(&mut booking);
            booking.version += 1;
            write_json(&mut table, booking_id, &booking)?;

            if let Some(correlation_id) = booking.gateway_correlation_id.as_deref() {
                let mut correlations = txn.open_table(CORRELATIONS_TABLE)?;
                if correlations.get(correlation_id)?.is_none() {
                    correlations.insert(correlation_id, booking_id)?;
                }
            }
            booking
        };
        txn.commit()?;
        Ok(booking)
    }
}

fn read_json<T: DeserializeOwned>(
    table: &impl ReadableTable<i64, &'static [u8]>,
    key: i64,
) -> StorageResult<Option<T>> {
    match table.get(key)? {
        Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
        None => Ok(None),
    }
}

fn write_json<T: Serialize>(
    table: &mut Table<'_, i64, &'static [u8]>,
    key: i64,
    value: &T,
) -> StorageResult<()> {
    let bytes = serde_json::to_vec(value)?;
    table.insert(key, bytes.as_slice())?;
    Ok(())
}

impl BookingRepository for RedbBookingStore {
    fn insert_booking(&self, booking: &Booking) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut bookings = txn.open_table(BOOKINGS_TABLE)?;
            if bookings.get(booking.id)?.is_some() {
                return Err(StorageError::BookingExists(booking.id));
            }
            let mut codes = txn.open_table(ORDER_CODES_TABLE)?;
            if codes.get(booking.order_code.as_str())?.is_some() {
                return Err(StorageError::OrderCodeExists(booking.order_code.clone()));
            }
            codes.insert(booking.order_code.as_str(), booking.id)?;
            write_json(&mut bookings, booking.id, booking)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn load_booking(&self, booking_id: i64) -> StorageResult<Booking> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BOOKINGS_TABLE)?;
        read_json(&table, booking_id)?.ok_or(StorageError::BookingNotFound(booking_id))
    }

    fn find_by_correlation_id(&self, correlation_id: &str) -> StorageResult<Option<Booking>> {
        let read_txn = self.db.begin_read()?;
        let correlations = read_txn.open_table(CORRELATIONS_TABLE)?;
        let booking_id = match correlations.get(correlation_id)? {
            Some(guard) => guard.value(),
            None => return Ok(None),
        };
        let bookings = read_txn.open_table(BOOKINGS_TABLE)?;
        read_json(&bookings, booking_id)
    }

    fn save_booking_payment_fields(
        &self,
        booking_id: i64,
        expected_version: u64,
        fields: &BookingPaymentFields,
    ) -> StorageResult<Booking> {
        self.update_booking(booking_id, expected_version, |booking| {
            booking.apply_payment_fields(fields.clone());
        })
    }

    fn save_order_status(
        &self,
        booking_id: i64,
        expected_version: u64,
        status: OrderStatus,
    ) -> StorageResult<Booking> {
        self.update_booking(booking_id, expected_version, |booking| {
            booking.order_status = status;
        })
    }

    fn list_outstanding_redirects(&self) -> StorageResult<Vec<Booking>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BOOKINGS_TABLE)?;

        let mut bookings = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let booking: Booking = serde_json::from_slice(value.value())?;
            if booking.payment_status == PaymentStatus::Unpaid
                && booking.gateway_correlation_id.is_some()
                && !booking.order_status.is_closed()
            {
                bookings.push(booking);
            }
        }
        Ok(bookings)
    }

    fn load_refund_request(&self, booking_id: i64) -> StorageResult<Option<RefundRequest>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(REFUNDS_TABLE)?;
        read_json(&table, booking_id)
    }

    fn load_refund_request_by_id(&self, request_id: i64) -> StorageResult<Option<RefundRequest>> {
        let read_txn = self.db.begin_read()?;
        let ids = read_txn.open_table(REFUND_IDS_TABLE)?;
        let booking_id = match ids.get(request_id)? {
            Some(guard) => guard.value(),
            None => return Ok(None),
        };
        let table = read_txn.open_table(REFUNDS_TABLE)?;
        read_json(&table, booking_id)
    }

    fn insert_refund_request(&self, request: &RefundRequest) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(REFUNDS_TABLE)?;
            if table.get(request.booking_id)?.is_some() {
                return Err(StorageError::RefundRequestExists(request.booking_id));
            }
            write_json(&mut table, request.booking_id, request)?;

            let mut ids = txn.open_table(REFUND_IDS_TABLE)?;
            ids.insert(request.id, request.booking_id)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn save_refund_decision(&self, decision: &RefundDecision) -> StorageResult<RefundRequest> {
        let txn = self.db.begin_write()?;
        let request = {
            let ids = txn.open_table(REFUND_IDS_TABLE)?;
            let booking_id = ids
                .get(decision.request_id)?
                .map(|guard| guard.value())
                .ok_or(StorageError::RefundRequestNotFound(decision.request_id))?;

            let mut refunds = txn.open_table(REFUNDS_TABLE)?;
            let mut request: RefundRequest = read_json(&refunds, booking_id)?
                .ok_or(StorageError::RefundRequestNotFound(decision.request_id))?;
            if request.status != RefundStatus::PendingStaffConfirmation {
                return Err(StorageError::RefundAlreadyProcessed(request.id));
            }

            request.status = decision.resolution.status();
            request.staff_note = decision.staff_note.clone();
            request.processed_at = Some(decision.processed_at);
            write_json(&mut refunds, booking_id, &request)?;

            if decision.resolution == RefundResolution::Confirm {
                let mut bookings = txn.open_table(BOOKINGS_TABLE)?;
                let mut booking: Booking = read_json(&bookings, booking_id)?
                    .ok_or(StorageError::BookingNotFound(booking_id))?;
                booking.order_status = OrderStatus::Refunded;
                booking.version += 1;
                write_json(&mut bookings, booking_id, &booking)?;
            }
            request
        };
        txn.commit()?;
        Ok(request)
    }

    fn list_pending_refunds(&self) -> StorageResult<Vec<RefundRequest>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(REFUNDS_TABLE)?;

        let mut requests = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let request: RefundRequest = serde_json::from_slice(value.value())?;
            if request.status == RefundStatus::PendingStaffConfirmation {
                requests.push(request);
            }
        }
        requests.sort_by_key(|r| r.requested_at);
        Ok(requests)
    }

    fn append_payment_fact(&self, fact: &PaymentFact) -> StorageResult<PaymentFact> {
        let txn = self.db.begin_write()?;
        let stored = {
            let mut table = txn.open_table(FACTS_TABLE)?;
            let last = table
                .range((fact.booking_id, 0u64)..=(fact.booking_id, u64::MAX))?
                .next_back()
                .transpose()?
                .map(|(key, _value)| key.value().1);

            let mut stored = fact.clone();
            stored.sequence = last.map_or(1, |seq| seq + 1);
            let bytes = serde_json::to_vec(&stored)?;
            table.insert((stored.booking_id, stored.sequence), bytes.as_slice())?;
            stored
        };
        txn.commit()?;
        Ok(stored)
    }

    fn list_payment_facts(&self, booking_id: i64) -> StorageResult<Vec<PaymentFact>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FACTS_TABLE)?;

        let mut facts = Vec::new();
        for result in table.range((booking_id, 0u64)..=(booking_id, u64::MAX))? {
            let (_key, value) = result?;
            facts.push(serde_json::from_slice(value.value())?);
        }
        Ok(facts)
    }

    fn flag_for_review(&self, item: &ReviewItem) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        {
            let index_key = (item.booking_id, item.correlation_id.as_deref().unwrap_or(""));
            let mut index = txn.open_table(REVIEW_INDEX_TABLE)?;
            if index.get(index_key)?.is_some() {
                return Ok(false);
            }

            let mut seq_table = txn.open_table(SEQUENCE_TABLE)?;
            let next = seq_table
                .get(REVIEW_SEQ_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0)
                + 1;
            seq_table.insert(REVIEW_SEQ_KEY, next)?;

            let mut table = txn.open_table(REVIEW_TABLE)?;
            let bytes = serde_json::to_vec(item)?;
            table.insert(next, bytes.as_slice())?;
            index.insert(index_key, next)?;
        }
        txn.commit()?;
        Ok(true)
    }

    fn is_flagged_for_review(
        &self,
        booking_id: i64,
        correlation_id: Option<&str>,
    ) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(REVIEW_INDEX_TABLE)?;
        Ok(index
            .get((booking_id, correlation_id.unwrap_or("")))?
            .is_some())
    }

    fn list_review_items(&self) -> StorageResult<Vec<ReviewItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(REVIEW_TABLE)?;

        let mut items = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            items.push(serde_json::from_slice(value.value())?);
        }
        Ok(items)
    }
}
