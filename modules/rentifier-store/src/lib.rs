//! Postgres persistence for the listing pipeline. One `Store` over one
//! pool; query methods are grouped by area in the sibling modules.

pub mod cities;
pub mod filters;
pub mod job_runs;
pub mod listings;
pub mod notifications;
pub mod raw_listings;
mod rows;
pub mod sources;
pub mod worker_state;

pub use filters::NewFilter;
pub use raw_listings::RawListingInsert;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}
