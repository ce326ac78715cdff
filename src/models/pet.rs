//! Pet domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";

/// Pet listed for adoption
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Pet {
    pub pet_id: i64,
    pub name: String,
    pub species: String,
    pub age: i32,
    pub description: Option<String>,
    pub location_id: i64,
    pub photo_url: Option<String>,
    /// pending, approved
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Create / update pet request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PetRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    #[validate(length(min = 2, max = 80))]
    pub species: String,
    #[validate(range(min = 0, max = 50))]
    pub age: i32,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub location_id: i64,
    /// Omitted on update keeps the stored photo
    #[validate(length(max = 512))]
    pub photo_url: Option<String>,
}
