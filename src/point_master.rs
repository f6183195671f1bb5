use sqlx::PgPool;

use crate::error::ScrapeError;

/// Maps a spot's display name to its stable point id. "Not listed" is a
/// normal outcome and comes back as `None`; only database failures error.
pub trait PointResolver {
    async fn resolve(&self, point_name: &str) -> Result<Option<String>, ScrapeError>;
}

/// Resolver backed by the externally-owned point master table.
pub struct PointMasterTable {
    pool: PgPool,
    table_name: String,
}

impl PointMasterTable {
    pub fn new(pool: PgPool, table_name: String) -> Self {
        Self { pool, table_name }
    }
}

impl PointResolver for PointMasterTable {
    async fn resolve(&self, point_name: &str) -> Result<Option<String>, ScrapeError> {
        // Table name comes from config, not page content; the name itself is
        // bound as a parameter.
        let query = format!(
            "SELECT point_id::text FROM {} WHERE point_name = $1",
            self.table_name
        );
        let row: Option<(String,)> = sqlx::query_as(&query)
            .bind(point_name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(point_id,)| point_id))
    }
}
