//! Warehouse models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kinds of warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "warehouse_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WarehouseKind {
    General,
    Cold,
    Hazardous,
}

impl WarehouseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarehouseKind::General => "general",
            WarehouseKind::Cold => "cold",
            WarehouseKind::Hazardous => "hazardous",
        }
    }
}

/// A warehouse
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub manager: Option<String>,
    pub kind: WarehouseKind,
    pub total_area: Decimal,
    pub used_area: Decimal,
    pub rental_price: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Warehouse {
    /// Used-area utilization as a percentage, zero when total area is unset
    pub fn utilization_rate(&self) -> Decimal {
        if self.total_area > Decimal::ZERO {
            self.used_area / self.total_area * Decimal::from(100)
        } else {
            Decimal::ZERO
        }
    }
}
