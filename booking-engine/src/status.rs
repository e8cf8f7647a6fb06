//! Canonical status derivation
//!
//! Every surface that displays a booking's lifecycle goes through
//! [`derive_status`]. Resolution order is fixed; the first match wins.

use shared::{Booking, CanonicalStatus, OrderStatus, PaymentStatus};

use crate::clock;

/// Map stored booking fields plus the current time to one canonical status.
///
/// 1. order status REFUNDED
/// 2. order status AUTO_CANCELLED
/// 3. PAID: COMPLETED after service end, IN_PROGRESS from service start, else CONFIRMED
/// 4. UNPAID past its payment expiry: AUTO_CANCELLED (not persisted here)
/// 5. otherwise PENDING_PAYMENT
pub fn derive_status(booking: &Booking, now: i64) -> CanonicalStatus {
    match booking.order_status {
        OrderStatus::Refunded => return CanonicalStatus::Refunded,
        OrderStatus::AutoCancelled => return CanonicalStatus::AutoCancelled,
        _ => {}
    }

    match booking.payment_status {
        PaymentStatus::Paid => {
            if clock::is_past(booking.service_end, now) {
                CanonicalStatus::Completed
            } else if now >= booking.service_start {
                CanonicalStatus::InProgress
            } else {
                CanonicalStatus::Confirmed
            }
        }
        PaymentStatus::Unpaid => match booking.payment_expiry {
            Some(expiry) if clock::is_past(expiry, now) => CanonicalStatus::AutoCancelled,
            _ => CanonicalStatus::PendingPayment,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{MILLIS_PER_DAY, MILLIS_PER_HOUR};
    use rust_decimal::Decimal;
    use shared::{Capacity, CustomerInfo};

    // 2025-01-28T00:00:00Z
    const JAN_28: i64 = 1_738_022_400_000;

    fn booking(payment_status: PaymentStatus, order_status: OrderStatus) -> Booking {
        Booking {
            id: 1,
            order_code: "T-0001".to_string(),
            customer_id: 10,
            customer: CustomerInfo {
                full_name: "Tran Thi B".to_string(),
                phone: "0900000000".to_string(),
                email: "b@example.com".to_string(),
                id_number: None,
            },
            capacity: Capacity::Tour {
                adults: 1,
                children: 0,
                infants: 0,
            },
            unit_price: Decimal::from(100),
            order_total: Decimal::from(100),
            service_start: JAN_28,
            service_end: JAN_28 + 2 * MILLIS_PER_DAY,
            payment_expiry: None,
            payment_method: None,
            payment_status,
            gateway_correlation_id: None,
            paid_at: None,
            order_status,
            version: 1,
            created_at: JAN_28 - 30 * MILLIS_PER_DAY,
        }
    }

    #[test]
    fn test_paid_follows_service_dates() {
        let b = booking(PaymentStatus::Paid, OrderStatus::Confirmed);
        assert_eq!(derive_status(&b, JAN_28 - 1), CanonicalStatus::Confirmed);
        assert_eq!(derive_status(&b, JAN_28 + MILLIS_PER_DAY), CanonicalStatus::InProgress);
        assert_eq!(
            derive_status(&b, JAN_28 + 2 * MILLIS_PER_DAY + 1),
            CanonicalStatus::Completed
        );
    }

    #[test]
    fn test_in_progress_on_jan_29() {
        // start 2025-01-28, end 2025-01-30, now 2025-01-29
        let b = booking(PaymentStatus::Paid, OrderStatus::Processing);
        assert_eq!(derive_status(&b, JAN_28 + MILLIS_PER_DAY), CanonicalStatus::InProgress);
    }

    #[test]
    fn test_same_instant_start_and_end() {
        let mut b = booking(PaymentStatus::Paid, OrderStatus::Confirmed);
        b.service_end = b.service_start;
        assert_eq!(derive_status(&b, JAN_28), CanonicalStatus::InProgress);
        assert_eq!(derive_status(&b, JAN_28 + 1), CanonicalStatus::Completed);
    }

    #[test]
    fn test_unpaid_past_expiry_is_auto_cancelled_regardless_of_dates() {
        let mut b = booking(PaymentStatus::Unpaid, OrderStatus::Processing);
        let dispatched_at = JAN_28 - 10 * MILLIS_PER_DAY;
        b.payment_expiry = Some(dispatched_at + 24 * MILLIS_PER_HOUR);

        assert_eq!(
            derive_status(&b, dispatched_at + 24 * MILLIS_PER_HOUR),
            CanonicalStatus::PendingPayment
        );
        assert_eq!(
            derive_status(&b, dispatched_at + 25 * MILLIS_PER_HOUR),
            CanonicalStatus::AutoCancelled
        );
        // Even after the service window the derived status stays AUTO_CANCELLED
        assert_eq!(
            derive_status(&b, JAN_28 + 5 * MILLIS_PER_DAY),
            CanonicalStatus::AutoCancelled
        );
    }

    #[test]
    fn test_unpaid_without_expiry_is_pending() {
        let b = booking(PaymentStatus::Unpaid, OrderStatus::Processing);
        assert_eq!(derive_status(&b, JAN_28 + 10 * MILLIS_PER_DAY), CanonicalStatus::PendingPayment);
    }

    #[test]
    fn test_stored_terminal_status_wins() {
        let b = booking(PaymentStatus::Paid, OrderStatus::Refunded);
        assert_eq!(derive_status(&b, JAN_28 + MILLIS_PER_DAY), CanonicalStatus::Refunded);

        let b = booking(PaymentStatus::Paid, OrderStatus::AutoCancelled);
        assert_eq!(derive_status(&b, JAN_28 - 1), CanonicalStatus::AutoCancelled);
    }

    #[test]
    fn test_idempotent() {
        let b = booking(PaymentStatus::Paid, OrderStatus::Confirmed);
        let now = JAN_28 + 3;
        assert_eq!(derive_status(&b, now), derive_status(&b, now));
    }
}
