use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Rates as they come out of a fetch, before the cache assigns them a day.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRates {
    pub usd_per_unit: f64,
    pub eur_per_unit: f64,
    pub fetched_at: DateTime<Utc>,
}

impl FetchedRates {
    pub fn for_date(self, for_date: NaiveDate) -> RateSnapshot {
        RateSnapshot {
            usd_per_unit: self.usd_per_unit,
            eur_per_unit: self.eur_per_unit,
            fetched_at: self.fetched_at,
            for_date,
        }
    }
}

/// Reference-currency units per one USD / EUR, valid for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub usd_per_unit: f64,
    pub eur_per_unit: f64,
    pub fetched_at: DateTime<Utc>,
    pub for_date: NaiveDate,
}

impl RateSnapshot {
    pub fn is_fresh_on(&self, today: NaiveDate) -> bool {
        self.for_date == today
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

/// A snapshot handed out by the cache together with how it was obtained.
#[derive(Debug, Clone)]
pub struct CachedRates {
    pub snapshot: Arc<RateSnapshot>,
    pub freshness: Freshness,
}

impl CachedRates {
    pub fn fresh(snapshot: Arc<RateSnapshot>) -> Self {
        Self {
            snapshot,
            freshness: Freshness::Fresh,
        }
    }

    pub fn stale(snapshot: Arc<RateSnapshot>) -> Self {
        Self {
            snapshot,
            freshness: Freshness::Stale,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.freshness == Freshness::Stale
    }
}

/// Rounds to two decimals, halves away from zero.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_cents_rounds_half_away_from_zero() {
        assert_eq!(round_cents(1.005_000_1), 1.01);
        assert_eq!(round_cents(1137.011_764_7), 1137.01);
        assert_eq!(round_cents(-2.345_000_1), -2.35);
        assert_eq!(round_cents(0.125), 0.13);
    }

    #[test]
    fn round_cents_keeps_non_finite_values() {
        assert!(round_cents(f64::NAN).is_nan());
        assert_eq!(round_cents(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn snapshot_is_fresh_only_on_its_own_day() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let snapshot = FetchedRates {
            usd_per_unit: 1050.5,
            eur_per_unit: 1137.01,
            fetched_at: Utc::now(),
        }
        .for_date(day);

        assert!(snapshot.is_fresh_on(day));
        assert!(!snapshot.is_fresh_on(day.succ_opt().unwrap()));
        assert!(!snapshot.is_fresh_on(day.pred_opt().unwrap()));
    }
}
