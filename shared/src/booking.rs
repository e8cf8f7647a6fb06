//! Booking domain types
//!
//! A booking is either a tour (adult/child/infant guests) or a car rental
//! (rental units plus surcharges). Both share the same lifecycle fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::payment::{PaymentMethod, PaymentStatus};

/// Stored order lifecycle marker, independent of payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Processing,
    Confirmed,
    InProgress,
    Completed,
    AutoCancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "PROCESSING",
            Self::Confirmed => "CONFIRMED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::AutoCancelled => "AUTO_CANCELLED",
            Self::Refunded => "REFUNDED",
        }
    }

    /// Refunded and auto-cancelled bookings accept no further payment
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Refunded | Self::AutoCancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single derived lifecycle value a booking displays
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CanonicalStatus {
    PendingPayment,
    Confirmed,
    InProgress,
    Completed,
    AutoCancelled,
    Refunded,
}

impl CanonicalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "PENDING_PAYMENT",
            Self::Confirmed => "CONFIRMED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::AutoCancelled => "AUTO_CANCELLED",
            Self::Refunded => "REFUNDED",
        }
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra charge on a car rental (insurance, child seat, one-way fee...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Surcharge {
    pub name: String,
    pub amount: Decimal,
}

/// Guest or unit counts, by service kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capacity {
    Tour {
        adults: u32,
        #[serde(default)]
        children: u32,
        #[serde(default)]
        infants: u32,
    },
    Car {
        units: u32,
        #[serde(default)]
        surcharges: Vec<Surcharge>,
    },
}

impl Capacity {
    /// Guests (tour) or rental units (car) consumed from availability.
    /// `None` when the counts do not fit in a `u32`.
    pub fn total_units(&self) -> Option<u32> {
        match self {
            Self::Tour {
                adults,
                children,
                infants,
            } => adults.checked_add(*children)?.checked_add(*infants),
            Self::Car { units, .. } => Some(*units),
        }
    }
}

/// Customer details frozen at booking time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerInfo {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
}

/// A persisted booking
///
/// Only the payment fields, order status and `version` change after
/// creation. `order_total` is immutable; refunds live in `RefundRequest`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    /// Caller-supplied human-readable order code
    pub order_code: String,
    pub customer_id: i64,
    pub customer: CustomerInfo,
    pub capacity: Capacity,
    pub unit_price: Decimal,
    pub order_total: Decimal,
    /// Departure / pickup (Unix millis)
    pub service_start: i64,
    /// Arrival / dropoff (Unix millis)
    pub service_end: i64,
    /// Only meaningful while payment is outstanding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_expiry: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<i64>,
    pub order_status: OrderStatus,
    /// Optimistic concurrency counter, bumped on every write
    pub version: u64,
    pub created_at: i64,
}

impl Booking {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    pub fn payment_fields(&self) -> BookingPaymentFields {
        BookingPaymentFields {
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            gateway_correlation_id: self.gateway_correlation_id.clone(),
            payment_expiry: self.payment_expiry,
            paid_at: self.paid_at,
        }
    }

    /// Overwrite the payment fields (storage layer only)
    pub fn apply_payment_fields(&mut self, fields: BookingPaymentFields) {
        self.payment_method = fields.payment_method;
        self.payment_status = fields.payment_status;
        self.gateway_correlation_id = fields.gateway_correlation_id;
        self.payment_expiry = fields.payment_expiry;
        self.paid_at = fields.paid_at;
    }
}

/// The mutable payment-related subset of a booking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingPaymentFields {
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub gateway_correlation_id: Option<String>,
    pub payment_expiry: Option<i64>,
    pub paid_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_total_units() {
        let tour = Capacity::Tour {
            adults: 2,
            children: 1,
            infants: 1,
        };
        assert_eq!(tour.total_units(), Some(4));

        let car = Capacity::Car {
            units: 1,
            surcharges: vec![],
        };
        assert_eq!(car.total_units(), Some(1));

        let huge = Capacity::Tour {
            adults: 1,
            children: u32::MAX,
            infants: 0,
        };
        assert_eq!(huge.total_units(), None);
    }

    #[test]
    fn test_capacity_deserialize_defaults() {
        let tour: Capacity = serde_json::from_str(r#"{"kind":"TOUR","adults":3}"#).unwrap();
        assert_eq!(
            tour,
            Capacity::Tour {
                adults: 3,
                children: 0,
                infants: 0
            }
        );

        let car: Capacity = serde_json::from_str(r#"{"kind":"CAR","units":2}"#).unwrap();
        assert_eq!(car.total_units(), Some(2));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::AutoCancelled).unwrap(),
            "\"AUTO_CANCELLED\""
        );
        assert_eq!(
            serde_json::to_string(&CanonicalStatus::PendingPayment).unwrap(),
            "\"PENDING_PAYMENT\""
        );
        assert_eq!(CanonicalStatus::InProgress.to_string(), "IN_PROGRESS");
    }

    #[test]
    fn test_order_status_is_closed() {
        assert!(OrderStatus::Refunded.is_closed());
        assert!(OrderStatus::AutoCancelled.is_closed());
        assert!(!OrderStatus::Processing.is_closed());
        assert!(!OrderStatus::Confirmed.is_closed());
    }
}
