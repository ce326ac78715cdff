//! Pet repository

use super::map_foreign_key_violation;
use crate::{error::AppError, models::pet::*};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait PetRepository: Send + Sync {
    /// 按 ID 倒序列出所有宠物
    async fn list(&self) -> Result<Vec<Pet>, AppError>;

    async fn find_by_id(&self, pet_id: i64) -> Result<Option<Pet>, AppError>;

    /// 新建宠物，状态为 pending
    async fn create(&self, req: &PetRequest) -> Result<Pet, AppError>;

    /// 整体更新；photo_url 为空时保留原值
    async fn update(&self, pet_id: i64, req: &PetRequest) -> Result<Option<Pet>, AppError>;

    async fn approve(&self, pet_id: i64) -> Result<Option<Pet>, AppError>;

    async fn delete(&self, pet_id: i64) -> Result<bool, AppError>;

    /// 统计某地点下的宠物数量
    async fn count_by_location(&self, location_id: i64) -> Result<i64, AppError>;
}

pub struct PgPetRepository {
    db: PgPool,
}

impl PgPetRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PetRepository for PgPetRepository {
    async fn list(&self) -> Result<Vec<Pet>, AppError> {
        let pets = sqlx::query_as::<_, Pet>("SELECT * FROM pets ORDER BY pet_id DESC")
            .fetch_all(&self.db)
            .await?;

        Ok(pets)
    }

    async fn find_by_id(&self, pet_id: i64) -> Result<Option<Pet>, AppError> {
        let pet = sqlx::query_as::<_, Pet>("SELECT * FROM pets WHERE pet_id = $1")
            .bind(pet_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(pet)
    }

    async fn create(&self, req: &PetRequest) -> Result<Pet, AppError> {
        let pet = sqlx::query_as::<_, Pet>(
            r#"
            INSERT INTO pets (name, species, age, description, location_id, photo_url, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.species)
        .bind(req.age)
        .bind(&req.description)
        .bind(req.location_id)
        .bind(&req.photo_url)
        .bind(STATUS_PENDING)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_foreign_key_violation(e, || unknown_location(req.location_id)))?;

        Ok(pet)
    }

    async fn update(&self, pet_id: i64, req: &PetRequest) -> Result<Option<Pet>, AppError> {
        let pet = sqlx::query_as::<_, Pet>(
            r#"
            UPDATE pets
            SET
                name = $2,
                species = $3,
                age = $4,
                description = $5,
                location_id = $6,
                photo_url = COALESCE($7, photo_url)
            WHERE pet_id = $1
            RETURNING *
            "#,
        )
        .bind(pet_id)
        .bind(&req.name)
        .bind(&req.species)
        .bind(req.age)
        .bind(&req.description)
        .bind(req.location_id)
        .bind(&req.photo_url)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_foreign_key_violation(e, || unknown_location(req.location_id)))?;

        Ok(pet)
    }

    async fn approve(&self, pet_id: i64) -> Result<Option<Pet>, AppError> {
        let pet = sqlx::query_as::<_, Pet>(
            "UPDATE pets SET status = $2 WHERE pet_id = $1 RETURNING *",
        )
        .bind(pet_id)
        .bind(STATUS_APPROVED)
        .fetch_optional(&self.db)
        .await?;

        Ok(pet)
    }

    async fn delete(&self, pet_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM pets WHERE pet_id = $1")
            .bind(pet_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_location(&self, location_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) FROM pets WHERE location_id = $1")
            .bind(location_id)
            .fetch_one(&self.db)
            .await?
            .get(0);

        Ok(count)
    }
}

/// 与处理器的存在性检查返回相同的消息
pub(crate) fn unknown_location(location_id: i64) -> String {
    format!("Location {} does not exist", location_id)
}
