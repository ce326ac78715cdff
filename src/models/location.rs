//! Adoption location (shelter) models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    pub location_id: i64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Create / update location request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LocationRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub address: String,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
}

impl LocationRequest {
    /// Stored phone is never null
    pub fn phone_or_empty(&self) -> String {
        self.phone.clone().unwrap_or_default()
    }
}
