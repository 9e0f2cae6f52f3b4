//! Storage location models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Location occupancy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "location_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LocationStatus {
    Available,
    Occupied,
    Full,
    Maintenance,
}

impl LocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationStatus::Available => "available",
            LocationStatus::Occupied => "occupied",
            LocationStatus::Full => "full",
            LocationStatus::Maintenance => "maintenance",
        }
    }
}

/// A storage location inside a warehouse. Codes are unique per warehouse.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Location {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub code: String,
    pub name: String,
    pub kind: String,
    pub area: Option<Decimal>,
    pub capacity: Option<Decimal>,
    pub status: LocationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
