//! Product models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A product in the registry.
///
/// `warehouse_id`/`location_id` are the default placement; `min_stock` and
/// `max_stock` drive advisory stock-status reporting only.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub warehouse_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub min_stock: Decimal,
    pub max_stock: Decimal,
    pub unit_price: Decimal,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
