use thiserror::Error;

/// Why a single refresh attempt produced no rates.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A quote source was unreachable, timed out, answered with a non-success
    /// status or sent a body that could not be decoded.
    #[error("quote source {quote} failed: {reason}")]
    Upstream { quote: String, reason: String },

    /// The derived rates are not finite positive numbers.
    #[error("derived rates are not usable (USD={usd}, EUR={eur})")]
    InvalidRate { usd: f64, eur: f64 },
}

impl FetchError {
    pub fn upstream(quote: impl Into<String>, reason: impl ToString) -> Self {
        Self::Upstream {
            quote: quote.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RateError {
    /// No fresh rates could be fetched and there is nothing cached to fall back to.
    #[error("exchange rates unavailable: {0}")]
    Unavailable(#[source] FetchError),
}
