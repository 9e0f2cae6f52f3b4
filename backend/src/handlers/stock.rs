//! HTTP handlers for stock query endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::stock::{InventoryValue, LowStockAlert, StockService};
use crate::AppState;
use crate::models::StockStatus;

/// Query for the low-stock alert report
#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    pub warehouse_id: Option<Uuid>,
    pub limit: Option<i64>,
}

/// On-hand quantity response
#[derive(Debug, Serialize)]
pub struct OnHandResponse {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub on_hand: Decimal,
}

/// Stock status response
#[derive(Debug, Serialize)]
pub struct StockStatusResponse {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub status: StockStatus,
}

/// On-hand quantity for a (product, warehouse) pair
pub async fn get_on_hand(
    State(state): State<AppState>,
    Path((product_id, warehouse_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<OnHandResponse>> {
    let service = StockService::new(state.db);
    let on_hand = service.on_hand(product_id, warehouse_id).await?;
    Ok(Json(OnHandResponse {
        product_id,
        warehouse_id,
        on_hand,
    }))
}

/// Advisory stock status for a (product, warehouse) pair
pub async fn get_stock_status(
    State(state): State<AppState>,
    Path((product_id, warehouse_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<StockStatusResponse>> {
    let service = StockService::new(state.db);
    let status = service.stock_status(product_id, warehouse_id).await?;
    Ok(Json(StockStatusResponse {
        product_id,
        warehouse_id,
        status,
    }))
}

/// Inventory valuation for a (product, warehouse) pair
pub async fn get_inventory_value(
    State(state): State<AppState>,
    Path((product_id, warehouse_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<InventoryValue>> {
    let service = StockService::new(state.db);
    let value = service.inventory_value(product_id, warehouse_id).await?;
    Ok(Json(value))
}

/// Products at or below 1.5x their minimum stock
pub async fn low_stock_alerts(
    State(state): State<AppState>,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<Vec<LowStockAlert>>> {
    let service = StockService::new(state.db);
    let alerts = service
        .low_stock_alerts(query.warehouse_id, query.limit.unwrap_or(20))
        .await?;
    Ok(Json(alerts))
}
