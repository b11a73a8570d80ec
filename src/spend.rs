use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::normalizer::{REFERENCE_CURRENCY, to_reference_currency};
use crate::snapshot::{CachedRates, round_cents};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriod {
    #[serde(alias = "Mensual")]
    Monthly,
    #[serde(alias = "Trimestral")]
    Quarterly,
    #[serde(alias = "semiannual", alias = "Semestral")]
    SemiAnnual,
    #[serde(alias = "Anual")]
    Annual,
}

impl BillingPeriod {
    pub fn months(self) -> u32 {
        match self {
            BillingPeriod::Monthly => 1,
            BillingPeriod::Quarterly => 3,
            BillingPeriod::SemiAnnual => 6,
            BillingPeriod::Annual => 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub bank: Option<String>,
    pub card_last_four: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub name: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub period: BillingPeriod,
    pub next_payment_date: NaiveDate,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub category: Option<String>,
}

fn default_currency() -> String {
    REFERENCE_CURRENCY.to_string()
}

impl Subscription {
    pub fn monthly_amount(&self) -> f64 {
        self.amount / f64::from(self.period.months())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingPayment {
    pub name: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendSummary {
    pub currency: &'static str,
    pub monthly_total: f64,
    pub annual_total: f64,
    pub subscription_count: usize,
    pub next_payment: Option<UpcomingPayment>,
    pub rates_stale: bool,
}

/// Monthly and annual spend in the reference currency, plus the earliest
/// upcoming payment.
pub fn summarize(subscriptions: &[Subscription], rates: &CachedRates) -> SpendSummary {
    let monthly: f64 = subscriptions
        .iter()
        .map(|sub| to_reference_currency(sub.monthly_amount(), &sub.currency, &rates.snapshot))
        .sum();

    let next_payment = subscriptions
        .iter()
        .min_by_key(|sub| sub.next_payment_date)
        .map(|sub| UpcomingPayment {
            name: sub.name.clone(),
            date: sub.next_payment_date,
            amount: sub.amount,
            currency: sub.currency.clone(),
        });

    SpendSummary {
        currency: REFERENCE_CURRENCY,
        monthly_total: round_cents(monthly),
        annual_total: round_cents(monthly * 12.0),
        subscription_count: subscriptions.len(),
        next_payment,
        rates_stale: rates.is_stale(),
    }
}
