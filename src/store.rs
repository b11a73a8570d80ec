use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::snapshot::RateSnapshot;

/// Durable copy of the cached snapshot, so a restarted process still has
/// something to fall back to.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn latest(&self) -> Result<Option<RateSnapshot>>;
    async fn save(&self, snapshot: &RateSnapshot) -> Result<()>;
}

#[derive(Debug, sqlx::FromRow)]
pub struct StoredSnapshot {
    pub id: Uuid,
    pub usd_per_unit: Decimal,
    pub eur_per_unit: Decimal,
    pub fetched_at: DateTime<Utc>,
    pub for_date: NaiveDate,
}

impl StoredSnapshot {
    pub fn from_snapshot(snapshot: &RateSnapshot) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            usd_per_unit: to_decimal(snapshot.usd_per_unit)?,
            eur_per_unit: to_decimal(snapshot.eur_per_unit)?,
            fetched_at: snapshot.fetched_at,
            for_date: snapshot.for_date,
        })
    }

    pub fn into_snapshot(self) -> Result<RateSnapshot> {
        Ok(RateSnapshot {
            usd_per_unit: to_f64(self.usd_per_unit, self.id)?,
            eur_per_unit: to_f64(self.eur_per_unit, self.id)?,
            fetched_at: self.fetched_at,
            for_date: self.for_date,
        })
    }
}

fn to_decimal(rate: f64) -> Result<Decimal> {
    Decimal::from_f64(rate)
        .map(|d| d.round_dp(2))
        .ok_or_else(|| anyhow::anyhow!("Can't store rate {} as a decimal", rate))
}

fn to_f64(rate: Decimal, id: Uuid) -> Result<f64> {
    rate.to_f64()
        .ok_or_else(|| anyhow::anyhow!("Can't read rate {} of snapshot {}", rate, id))
}

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS rate_snapshots (
    id UUID PRIMARY KEY,
    usd_per_unit NUMERIC(18, 2) NOT NULL,
    eur_per_unit NUMERIC(18, 2) NOT NULL,
    fetched_at TIMESTAMPTZ NOT NULL,
    for_date DATE NOT NULL UNIQUE
)
"#;

// One row per day: a refetch on the same day overwrites that day's rates.
const UPSERT_SNAPSHOT: &str = r#"
INSERT INTO rate_snapshots (id, usd_per_unit, eur_per_unit, fetched_at, for_date)
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT (for_date) DO UPDATE SET
    usd_per_unit = EXCLUDED.usd_per_unit,
    eur_per_unit = EXCLUDED.eur_per_unit,
    fetched_at = EXCLUDED.fetched_at
"#;

pub struct PgSnapshotStore {
    pool: PgPool,
}

impl PgSnapshotStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .context("Can't connect to the snapshot database")?;

        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .context("Can't create rate_snapshots table")?;
        info!("Snapshot store ready");

        Ok(Self { pool })
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn latest(&self) -> Result<Option<RateSnapshot>> {
        let row: Option<StoredSnapshot> = sqlx::query_as(
            "SELECT id, usd_per_unit, eur_per_unit, fetched_at, for_date \
             FROM rate_snapshots ORDER BY fetched_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .context("Can't load latest rate snapshot")?;

        row.map(StoredSnapshot::into_snapshot).transpose()
    }

    async fn save(&self, snapshot: &RateSnapshot) -> Result<()> {
        let row = StoredSnapshot::from_snapshot(snapshot)?;

        sqlx::query(UPSERT_SNAPSHOT)
            .bind(row.id)
            .bind(row.usd_per_unit)
            .bind(row.eur_per_unit)
            .bind(row.fetched_at)
            .bind(row.for_date)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Can't save rate snapshot for {}", row.for_date))?;

        Ok(())
    }
}
