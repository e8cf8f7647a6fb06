//! Booking creation and tier pricing
//!
//! Tours price each guest as a share of the unit (adult) price:
//! adult 100%, child 70%, infant 30%. Car rentals are units × unit price
//! plus surcharges. The total is fixed at creation.
//!
//! Capacity is checked once against the availability the caller supplies;
//! there is no reservation hold, so concurrent checkouts can oversell.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::util::snowflake_id;
use shared::{Booking, Capacity, CustomerInfo, OrderStatus, PaymentStatus};

use crate::error::{EngineError, EngineResult};
use crate::money::{self, validate_amount};
use crate::storage::BookingRepository;
use crate::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_max_len, validate_optional_text,
    validate_required_text,
};

/// Child tier, as a fraction of the adult price
pub const CHILD_RATE: Decimal = Decimal::from_parts(70, 0, 0, false, 2);

/// Infant tier, as a fraction of the adult price
pub const INFANT_RATE: Decimal = Decimal::from_parts(30, 0, 0, false, 2);

/// Everything needed to create a booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDraft {
    pub order_code: String,
    pub customer_id: i64,
    pub customer: CustomerInfo,
    pub capacity: Capacity,
    pub unit_price: Decimal,
    pub service_start: i64,
    pub service_end: i64,
}

/// Weighted order total, rounded half-up to 2 dp
pub fn compute_order_total(capacity: &Capacity, unit_price: Decimal) -> Decimal {
    let total = match capacity {
        Capacity::Tour {
            adults,
            children,
            infants,
        } => {
            unit_price * Decimal::from(*adults)
                + unit_price * CHILD_RATE * Decimal::from(*children)
                + unit_price * INFANT_RATE * Decimal::from(*infants)
        }
        Capacity::Car { units, surcharges } => {
            unit_price * Decimal::from(*units) + surcharges.iter().map(|s| s.amount).sum::<Decimal>()
        }
    };
    money::round_money(total)
}

fn validate_capacity(capacity: &Capacity) -> EngineResult<()> {
    match capacity {
        Capacity::Tour { adults, .. } => {
            if *adults < 1 {
                return Err(EngineError::validation("at least one adult is required"));
            }
        }
        Capacity::Car { units, surcharges } => {
            if *units < 1 {
                return Err(EngineError::validation("at least one rental unit is required"));
            }
            for surcharge in surcharges {
                validate_required_text(&surcharge.name, "surcharge name", MAX_NAME_LEN)?;
                validate_amount(surcharge.amount, "surcharge amount", true)?;
            }
        }
    }
    Ok(())
}

/// Validate a draft without touching storage
pub fn validate_draft(draft: &BookingDraft, available_capacity: u32) -> EngineResult<()> {
    validate_required_text(&draft.order_code, "order_code", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&draft.customer.full_name, "customer name", MAX_NAME_LEN)?;
    validate_max_len(&draft.customer.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_max_len(&draft.customer.email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(&draft.customer.id_number, "id_number", MAX_SHORT_TEXT_LEN)?;

    validate_capacity(&draft.capacity)?;
    validate_amount(draft.unit_price, "unit_price", false)?;

    if draft.service_end < draft.service_start {
        return Err(EngineError::validation(
            "service end must not be before service start",
        ));
    }

    let requested = draft
        .capacity
        .total_units()
        .ok_or_else(|| EngineError::validation("guest count is out of range"))?;
    if requested > available_capacity {
        return Err(EngineError::CapacityExceeded {
            requested,
            available: available_capacity,
        });
    }
    Ok(())
}

/// Validate, price and store a new booking
pub fn create_booking(
    store: &dyn BookingRepository,
    draft: BookingDraft,
    available_capacity: u32,
    now: i64,
) -> EngineResult<Booking> {
    validate_draft(&draft, available_capacity)?;

    let order_total = compute_order_total(&draft.capacity, draft.unit_price);
    let booking = Booking {
        id: snowflake_id(),
        order_code: draft.order_code,
        customer_id: draft.customer_id,
        customer: draft.customer,
        capacity: draft.capacity,
        unit_price: draft.unit_price,
        order_total,
        service_start: draft.service_start,
        service_end: draft.service_end,
        payment_expiry: None,
        payment_method: None,
        payment_status: PaymentStatus::Unpaid,
        gateway_correlation_id: None,
        paid_at: None,
        order_status: OrderStatus::Processing,
        version: 1,
        created_at: now,
    };
    store.insert_booking(&booking)?;

    tracing::info!(
        booking_id = booking.id,
        order_code = %booking.order_code,
        order_total = %booking.order_total,
        "Booking created"
    );
    Ok(booking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{NOW, sample_draft, test_store};
    use shared::Surcharge;
    use std::str::FromStr;

    #[test]
    fn test_tour_total_uses_tiers() {
        let capacity = Capacity::Tour {
            adults: 2,
            children: 1,
            infants: 1,
        };
        assert_eq!(compute_order_total(&capacity, Decimal::from(100)), Decimal::from(300));
    }

    #[test]
    fn test_tour_total_rounds_half_up() {
        let capacity = Capacity::Tour {
            adults: 1,
            children: 1,
            infants: 0,
        };
        // 10.05 + 7.035 = 17.085 → 17.09
        let total = compute_order_total(&capacity, Decimal::from_str("10.05").unwrap());
        assert_eq!(total, Decimal::from_str("17.09").unwrap());
    }

    #[test]
    fn test_car_total_adds_surcharges() {
        let capacity = Capacity::Car {
            units: 3,
            surcharges: vec![
                Surcharge {
                    name: "Insurance".to_string(),
                    amount: Decimal::from(15),
                },
                Surcharge {
                    name: "Child seat".to_string(),
                    amount: Decimal::from_str("4.50").unwrap(),
                },
            ],
        };
        assert_eq!(
            compute_order_total(&capacity, Decimal::from(40)),
            Decimal::from_str("139.50").unwrap()
        );
    }

    #[test]
    fn test_create_booking_initial_state() {
        let store = test_store();
        let booking = create_booking(store.as_ref(), sample_draft("T-200"), 10, NOW).unwrap();

        assert_eq!(booking.order_total, Decimal::from(300));
        assert_eq!(booking.order_status, OrderStatus::Processing);
        assert_eq!(booking.payment_status, PaymentStatus::Unpaid);
        assert_eq!(booking.payment_expiry, None);
        assert_eq!(booking.version, 1);
        assert_eq!(booking.created_at, NOW);
        assert_eq!(store.load_booking(booking.id).unwrap(), booking);
    }

    #[test]
    fn test_capacity_exceeded() {
        let store = test_store();
        let err = create_booking(store.as_ref(), sample_draft("T-201"), 3, NOW).unwrap_err();
        assert!(matches!(
            err,
            EngineError::CapacityExceeded {
                requested: 4,
                available: 3
            }
        ));
    }

    #[test]
    fn test_duplicate_order_code() {
        let store = test_store();
        create_booking(store.as_ref(), sample_draft("T-202"), 10, NOW).unwrap();
        let err = create_booking(store.as_ref(), sample_draft("T-202"), 10, NOW).unwrap_err();
        assert!(matches!(err, EngineError::OrderCodeExists(code) if code == "T-202"));
    }

    #[test]
    fn test_invalid_drafts() {
        let mut no_adult = sample_draft("T-203");
        no_adult.capacity = Capacity::Tour {
            adults: 0,
            children: 2,
            infants: 0,
        };
        assert!(matches!(
            validate_draft(&no_adult, 10),
            Err(EngineError::Validation(_))
        ));

        let mut no_units = sample_draft("T-204");
        no_units.capacity = Capacity::Car {
            units: 0,
            surcharges: vec![],
        };
        assert!(validate_draft(&no_units, 10).is_err());

        let mut negative_surcharge = sample_draft("T-205");
        negative_surcharge.capacity = Capacity::Car {
            units: 1,
            surcharges: vec![Surcharge {
                name: "Fee".to_string(),
                amount: Decimal::from(-1),
            }],
        };
        assert!(validate_draft(&negative_surcharge, 10).is_err());

        let mut free = sample_draft("T-206");
        free.unit_price = Decimal::ZERO;
        assert!(validate_draft(&free, 10).is_err());

        let mut backwards = sample_draft("T-207");
        backwards.service_end = backwards.service_start - 1;
        assert!(validate_draft(&backwards, 10).is_err());

        let mut blank_code = sample_draft("   ");
        blank_code.customer.full_name = "A".to_string();
        assert!(validate_draft(&blank_code, 10).is_err());
    }

    #[test]
    fn test_children_unbounded_by_adults() {
        let mut draft = sample_draft("T-208");
        draft.capacity = Capacity::Tour {
            adults: 1,
            children: 6,
            infants: 2,
        };
        assert!(validate_draft(&draft, 9).is_ok());
    }

    #[test]
    fn test_guest_count_overflow_rejected() {
        let store = test_store();
        let mut draft = sample_draft("T-209");
        draft.capacity = Capacity::Tour {
            adults: 1,
            children: u32::MAX,
            infants: 0,
        };
        let err = create_booking(store.as_ref(), draft, 5, NOW).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        // Nothing stored: the order code is still free
        assert!(create_booking(store.as_ref(), sample_draft("T-209"), 5, NOW).is_ok());
    }
}
