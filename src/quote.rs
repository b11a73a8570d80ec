use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::error::FetchError;

/// The three upstream quotes a refresh needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteKind {
    /// Card ("tarjeta") dollar, its sell price is the USD rate.
    CardDollar,
    /// Euro, its buy price feeds the EUR cross-rate.
    Euro,
    /// Official dollar, its buy price feeds the EUR cross-rate.
    OfficialDollar,
}

impl QuoteKind {
    pub fn path(self) -> &'static str {
        match self {
            QuoteKind::CardDollar => "dolares/tarjeta",
            QuoteKind::Euro => "cotizaciones/eur",
            QuoteKind::OfficialDollar => "dolares/oficial",
        }
    }
}

/// Price field as sent upstream: either a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
}

impl Price {
    /// Unparseable text becomes NaN so that validation rejects it later.
    pub fn value(&self) -> f64 {
        match self {
            Price::Number(n) => *n,
            Price::Text(s) => normalize_decimal_string(s.trim())
                .parse()
                .unwrap_or(f64::NAN),
        }
    }
}

fn normalize_decimal_string(s: &str) -> String {
    s.replace(',', ".")
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Quote {
    #[serde(rename = "moneda", default)]
    pub currency: Option<String>,
    #[serde(rename = "casa", default)]
    pub house: Option<String>,
    #[serde(rename = "compra", default)]
    pub buy: Option<Price>,
    #[serde(rename = "venta", default)]
    pub sell: Option<Price>,
    #[serde(rename = "fechaActualizacion", default)]
    pub updated_at: Option<String>,
}

impl Quote {
    pub fn buy_price(&self) -> f64 {
        self.buy.as_ref().map_or(f64::NAN, Price::value)
    }

    pub fn sell_price(&self) -> f64 {
        self.sell.as_ref().map_or(f64::NAN, Price::value)
    }
}

#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quote(&self, kind: QuoteKind) -> Result<Quote, FetchError>;
}

/// Quote source speaking the dolarapi.com JSON format.
pub struct DolarApiSource {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl DolarApiSource {
    pub fn new(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn url(&self, kind: QuoteKind) -> String {
        format!("{}/{}", self.base_url, kind.path())
    }

    async fn load_json(&self, url: &str) -> Result<String, reqwest::Error> {
        let resp = self.client.get(url).send().await?.error_for_status()?;
        resp.text().await
    }
}

#[async_trait]
impl QuoteSource for DolarApiSource {
    async fn quote(&self, kind: QuoteKind) -> Result<Quote, FetchError> {
        let url = self.url(kind);
        debug!("Requesting quote {}", url);

        let text = tokio::time::timeout(self.timeout, self.load_json(&url))
            .await
            .map_err(|_| {
                FetchError::upstream(kind.path(), format!("timed out after {:?}", self.timeout))
            })?
            .map_err(|e| FetchError::upstream(kind.path(), e))?;

        serde_json::from_str(&text).map_err(|e| FetchError::upstream(kind.path(), e))
    }
}
