//! Time-tiered refund policy, shared by tour and car bookings
//!
//! | days before start | refund |
//! |-------------------|--------|
//! | ≥ 5               | 95%    |
//! | 4                 | 90%    |
//! | 3                 | 85%    |
//! | 2                 | 80%    |
//! | 1                 | 75%    |
//! | ≤ 0               | 0%     |
//!
//! Whether a refund may be offered at all is decided by the refund workflow.

use rust_decimal::Decimal;
use shared::RefundQuote;

use crate::{clock, money};

/// Refund percentage for a given number of whole days before service start
pub fn refund_rate(days_before: i64) -> u32 {
    match days_before {
        d if d >= 5 => 95,
        4 => 90,
        3 => 85,
        2 => 80,
        1 => 75,
        _ => 0,
    }
}

/// Quote a cancellation at `now`
pub fn quote_refund(order_total: Decimal, service_start: i64, now: i64) -> RefundQuote {
    let days_before = clock::days_until(service_start, now);
    let rate_percent = refund_rate(days_before);
    RefundQuote {
        days_before,
        rate_percent,
        amount: money::percent_of(order_total, rate_percent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{MILLIS_PER_DAY, MILLIS_PER_HOUR};
    use std::str::FromStr;

    const NOW: i64 = 1_737_936_000_000;

    #[test]
    fn test_four_days_before() {
        let quote = quote_refund(Decimal::from(200), NOW + 4 * MILLIS_PER_DAY, NOW);
        assert_eq!(quote.days_before, 4);
        assert_eq!(quote.rate_percent, 90);
        assert_eq!(quote.amount, Decimal::from(180));
    }

    #[test]
    fn test_rate_non_increasing_as_days_decrease() {
        let rates: Vec<u32> = (-2..=10).rev().map(refund_rate).collect();
        assert!(rates.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(refund_rate(30), 95);
        assert_eq!(refund_rate(5), 95);
        assert_eq!(refund_rate(1), 75);
        assert_eq!(refund_rate(0), 0);
        assert_eq!(refund_rate(-3), 0);
    }

    #[test]
    fn test_at_start_refunds_nothing() {
        let start = NOW + 3 * MILLIS_PER_DAY;
        let quote = quote_refund(Decimal::from(500), start, start);
        assert_eq!(quote.rate_percent, 0);
        assert_eq!(quote.amount, Decimal::ZERO);
    }

    #[test]
    fn test_partial_day_rounds_up() {
        // 1 day and 1 hour away counts as 2 days
        let quote = quote_refund(
            Decimal::from(100),
            NOW + MILLIS_PER_DAY + MILLIS_PER_HOUR,
            NOW,
        );
        assert_eq!(quote.days_before, 2);
        assert_eq!(quote.rate_percent, 80);
    }

    #[test]
    fn test_amount_rounds_half_up() {
        let total = Decimal::from_str("99.99").unwrap();
        let quote = quote_refund(total, NOW + 10 * MILLIS_PER_DAY, NOW);
        assert_eq!(quote.amount, Decimal::from_str("94.99").unwrap());

        let total = Decimal::from_str("0.10").unwrap();
        let quote = quote_refund(total, NOW + MILLIS_PER_DAY, NOW);
        // 0.075 → 0.08
        assert_eq!(quote.amount, Decimal::from_str("0.08").unwrap());
    }
}
