//! Conversion between the reference currency (ARS) and the tracked foreign
//! currencies, using a [`RateSnapshot`].
//!
//! Codes other than ARS, USD and EUR are passed through unchanged. Callers
//! that need strict conversion should check [`is_supported`] first.

use crate::snapshot::RateSnapshot;

pub const REFERENCE_CURRENCY: &str = "ARS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tracked {
    Reference,
    Usd,
    Eur,
}

fn tracked(currency: &str) -> Option<Tracked> {
    let code = currency.trim();
    if code.eq_ignore_ascii_case(REFERENCE_CURRENCY) {
        Some(Tracked::Reference)
    } else if code.eq_ignore_ascii_case("USD") {
        Some(Tracked::Usd)
    } else if code.eq_ignore_ascii_case("EUR") {
        Some(Tracked::Eur)
    } else {
        None
    }
}

fn rate_for(currency: &str, snapshot: &RateSnapshot) -> Option<f64> {
    match tracked(currency)? {
        Tracked::Reference => None,
        Tracked::Usd => Some(snapshot.usd_per_unit),
        Tracked::Eur => Some(snapshot.eur_per_unit),
    }
}

pub fn is_supported(currency: &str) -> bool {
    tracked(currency).is_some()
}

pub fn to_reference_currency(amount: f64, currency: &str, snapshot: &RateSnapshot) -> f64 {
    match rate_for(currency, snapshot) {
        Some(rate) => amount * rate,
        None => amount,
    }
}

pub fn from_reference_currency(amount: f64, currency: &str, snapshot: &RateSnapshot) -> f64 {
    match rate_for(currency, snapshot) {
        Some(rate) => amount / rate,
        None => amount,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;

    fn snapshot() -> RateSnapshot {
        RateSnapshot {
            usd_per_unit: 1050.5,
            eur_per_unit: 1137.01,
            fetched_at: Utc::now(),
            for_date: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
        }
    }

    #[test]
    fn reference_currency_is_unchanged() {
        assert_eq!(to_reference_currency(4999.99, "ARS", &snapshot()), 4999.99);
        assert_eq!(from_reference_currency(4999.99, "ars", &snapshot()), 4999.99);
    }

    #[test]
    fn foreign_amounts_are_multiplied_into_reference() {
        assert_eq!(to_reference_currency(10.0, "USD", &snapshot()), 10505.0);
        assert_eq!(to_reference_currency(2.0, " eur ", &snapshot()), 2274.02);
    }

    #[test]
    fn reference_amounts_are_divided_back() {
        assert_eq!(from_reference_currency(10505.0, "USD", &snapshot()), 10.0);
    }

    #[test]
    fn unknown_currency_passes_through() {
        assert!(!is_supported("BRL"));
        assert_eq!(to_reference_currency(42.0, "BRL", &snapshot()), 42.0);
        assert_eq!(from_reference_currency(42.0, "", &snapshot()), 42.0);
    }

    #[test]
    fn conversion_round_trips() {
        let snapshot = snapshot();
        for currency in ["ARS", "USD", "EUR", "GBP"] {
            for amount in [0.0, 0.01, 9.99, 1234.5678, 1.0e9, -250.0] {
                let back = from_reference_currency(
                    to_reference_currency(amount, currency, &snapshot),
                    currency,
                    &snapshot,
                );
                assert!(
                    (back - amount).abs() <= 1e-9 * amount.abs().max(1.0),
                    "{amount} {currency} came back as {back}"
                );
            }
        }
    }
}
