//! Location repository

use super::map_foreign_key_violation;
use crate::{error::AppError, models::location::*};
use async_trait::async_trait;
use sqlx::PgPool;

#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// 按名称（不区分大小写）升序列出
    async fn list(&self) -> Result<Vec<Location>, AppError>;

    async fn find_by_id(&self, location_id: i64) -> Result<Option<Location>, AppError>;

    async fn create(&self, req: &LocationRequest) -> Result<Location, AppError>;

    async fn update(
        &self,
        location_id: i64,
        req: &LocationRequest,
    ) -> Result<Option<Location>, AppError>;

    async fn delete(&self, location_id: i64) -> Result<bool, AppError>;
}

pub struct PgLocationRepository {
    db: PgPool,
}

impl PgLocationRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn list(&self) -> Result<Vec<Location>, AppError> {
        let locations = sqlx::query_as::<_, Location>(
            "SELECT * FROM locations ORDER BY LOWER(name) ASC, location_id ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(locations)
    }

    async fn find_by_id(&self, location_id: i64) -> Result<Option<Location>, AppError> {
        let location =
            sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE location_id = $1")
                .bind(location_id)
                .fetch_optional(&self.db)
                .await?;

        Ok(location)
    }

    async fn create(&self, req: &LocationRequest) -> Result<Location, AppError> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (name, address, phone)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.address)
        .bind(req.phone_or_empty())
        .fetch_one(&self.db)
        .await?;

        Ok(location)
    }

    async fn update(
        &self,
        location_id: i64,
        req: &LocationRequest,
    ) -> Result<Option<Location>, AppError> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            UPDATE locations
            SET name = $2, address = $3, phone = $4
            WHERE location_id = $1
            RETURNING *
            "#,
        )
        .bind(location_id)
        .bind(&req.name)
        .bind(&req.address)
        .bind(req.phone_or_empty())
        .fetch_optional(&self.db)
        .await?;

        Ok(location)
    }

    async fn delete(&self, location_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM locations WHERE location_id = $1")
            .bind(location_id)
            .execute(&self.db)
            .await
            .map_err(|e| {
                map_foreign_key_violation(e, || {
                    "Cannot delete location. Pets are assigned to this location.".to_string()
                })
            })?;

        Ok(result.rows_affected() > 0)
    }
}
