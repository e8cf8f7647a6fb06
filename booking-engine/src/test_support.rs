//! Shared fixtures for unit tests

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::{BankDetails, Booking, Capacity, CustomerInfo, PaymentStatus};

use crate::clock::MILLIS_PER_DAY;
use crate::pricing::{BookingDraft, create_booking};
use crate::storage::{BookingRepository, RedbBookingStore};

/// 2025-01-27T00:00:00Z
pub const NOW: i64 = 1_737_936_000_000;

pub fn test_store() -> Arc<RedbBookingStore> {
    Arc::new(RedbBookingStore::open_in_memory().unwrap())
}

/// Tour for 2 adults, 1 child, 1 infant at 100 (total 300), departing in
/// 10 days for 2 days
pub fn sample_draft(order_code: &str) -> BookingDraft {
    BookingDraft {
        order_code: order_code.to_string(),
        customer_id: 7,
        customer: CustomerInfo {
            full_name: "Pham Minh D".to_string(),
            phone: "0987654321".to_string(),
            email: "d@example.com".to_string(),
            id_number: None,
        },
        capacity: Capacity::Tour {
            adults: 2,
            children: 1,
            infants: 1,
        },
        unit_price: Decimal::from(100),
        service_start: NOW + 10 * MILLIS_PER_DAY,
        service_end: NOW + 12 * MILLIS_PER_DAY,
    }
}

pub fn insert_booking(store: &dyn BookingRepository, order_code: &str) -> Booking {
    create_booking(store, sample_draft(order_code), 100, NOW).unwrap()
}

/// Mark PAID directly in storage
pub fn mark_paid(store: &dyn BookingRepository, booking: &Booking) -> Booking {
    let mut fields = booking.payment_fields();
    fields.payment_status = PaymentStatus::Paid;
    fields.paid_at = Some(NOW);
    store
        .save_booking_payment_fields(booking.id, booking.version, &fields)
        .unwrap()
}

pub fn sample_bank() -> BankDetails {
    BankDetails {
        bank_name: "Techcombank".to_string(),
        account_number: "19034567890123".to_string(),
        account_holder: "PHAM MINH D".to_string(),
    }
}
