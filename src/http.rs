use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::CACHE_CONTROL;
use actix_web::{HttpResponse, HttpResponseBuilder, ResponseError, get, post, web};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::cache::RateCache;
use crate::error::RateError;
use crate::snapshot::CachedRates;
use crate::spend::{Subscription, summarize};

const FRESH_CACHE_CONTROL: &str = "public, s-maxage=3600, stale-while-revalidate=86400";
const STALE_CACHE_CONTROL: &str = "public, s-maxage=60, stale-while-revalidate=3600";
pub const CACHE_STATUS_HEADER: &str = "X-Cache-Status";

pub struct AppState {
    pub cache: Arc<RateCache>,
}

impl ResponseError for RateError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(json!({ "error": "Error fetching exchange rates" }))
    }
}

#[derive(Debug, Serialize)]
pub struct RatesResponse {
    #[serde(rename = "USD")]
    pub usd: f64,
    #[serde(rename = "EUR")]
    pub eur: f64,
    #[serde(rename = "lastUpdate")]
    pub last_update: String,
}

impl From<&CachedRates> for RatesResponse {
    fn from(rates: &CachedRates) -> Self {
        Self {
            usd: rates.snapshot.usd_per_unit,
            eur: rates.snapshot.eur_per_unit,
            last_update: rates
                .snapshot
                .fetched_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub subscriptions: Vec<Subscription>,
}

fn respond_with(rates: &CachedRates) -> HttpResponseBuilder {
    let mut builder = HttpResponse::Ok();
    if rates.is_stale() {
        builder
            .insert_header((CACHE_CONTROL, STALE_CACHE_CONTROL))
            .insert_header((CACHE_STATUS_HEADER, "stale"));
    } else {
        builder.insert_header((CACHE_CONTROL, FRESH_CACHE_CONTROL));
    }
    builder
}

#[get("/rates")]
async fn get_rates(state: web::Data<AppState>) -> Result<HttpResponse, RateError> {
    let rates = state.cache.get().await?;
    Ok(respond_with(&rates).json(RatesResponse::from(&rates)))
}

#[post("/rates/revalidate")]
async fn revalidate_rates(state: web::Data<AppState>) -> HttpResponse {
    state.cache.revalidate();
    HttpResponse::Ok().json(json!({ "revalidated": true }))
}

#[post("/spend/summary")]
async fn spend_summary(
    state: web::Data<AppState>,
    body: web::Json<SummaryRequest>,
) -> Result<HttpResponse, RateError> {
    let rates = state.cache.get().await?;
    let summary = summarize(&body.subscriptions, &rates);
    Ok(respond_with(&rates).json(summary))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_rates)
        .service(revalidate_rates)
        .service(spend_summary);
}
