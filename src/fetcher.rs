use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use crate::clock::Clock;
use crate::error::FetchError;
use crate::quote::{QuoteKind, QuoteSource};
use crate::snapshot::{FetchedRates, round_cents};

#[async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch(&self) -> Result<FetchedRates, FetchError>;
}

/// Builds rates from three concurrent upstream quotes.
pub struct QuoteFetcher {
    source: Arc<dyn QuoteSource>,
    clock: Arc<dyn Clock>,
}

impl QuoteFetcher {
    pub fn new(source: Arc<dyn QuoteSource>, clock: Arc<dyn Clock>) -> Self {
        Self { source, clock }
    }
}

#[async_trait]
impl RateFetcher for QuoteFetcher {
    async fn fetch(&self) -> Result<FetchedRates, FetchError> {
        let (card, euro, official) = tokio::try_join!(
            self.source.quote(QuoteKind::CardDollar),
            self.source.quote(QuoteKind::Euro),
            self.source.quote(QuoteKind::OfficialDollar),
        )?;
        debug!(
            "Quotes received: card sell {}, euro buy {}, official buy {}",
            card.sell_price(),
            euro.buy_price(),
            official.buy_price()
        );

        let (usd_per_unit, eur_per_unit) =
            derive_rates(card.sell_price(), euro.buy_price(), official.buy_price())?;
        info!("Derived rates: USD {} EUR {}", usd_per_unit, eur_per_unit);

        Ok(FetchedRates {
            usd_per_unit,
            eur_per_unit,
            fetched_at: self.clock.now(),
        })
    }
}

/// USD is the card sell price. EUR goes through the official dollar:
/// `(euro_buy / official_buy) * card_sell`. Both are rounded to cents and
/// must come out finite and positive.
pub fn derive_rates(
    card_sell: f64,
    euro_buy: f64,
    official_buy: f64,
) -> Result<(f64, f64), FetchError> {
    let usd = round_cents(card_sell);
    let eur = round_cents(euro_buy / official_buy * card_sell);

    if !is_usable(usd) || !is_usable(eur) {
        return Err(FetchError::InvalidRate { usd, eur });
    }

    Ok((usd, eur))
}

fn is_usable(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}
