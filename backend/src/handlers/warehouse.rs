//! HTTP handlers for warehouse registry endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::location::{LocationFilter, LocationOverview, LocationService};
use crate::services::stock::{StockLevel, StockService};
use crate::services::warehouse::{
    CreateWarehouseInput, UpdateWarehouseInput, WarehouseOverview, WarehouseService, WarehouseStats,
};
use crate::AppState;
use crate::models::Warehouse;

/// Input for updating a warehouse's used storage area
#[derive(Debug, Deserialize)]
pub struct UpdateUsedAreaInput {
    pub used_area: Decimal,
}

/// List all warehouses
pub async fn list_warehouses(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<WarehouseOverview>>> {
    let service = WarehouseService::new(state.db);
    let warehouses = service.list_warehouses().await?;
    Ok(Json(warehouses))
}

/// Get a warehouse by id
pub async fn get_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<WarehouseOverview>> {
    let service = WarehouseService::new(state.db);
    let warehouse = service.get_warehouse(warehouse_id).await?;
    Ok(Json(warehouse))
}

/// Create a warehouse
pub async fn create_warehouse(
    State(state): State<AppState>,
    Json(input): Json<CreateWarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    let service = WarehouseService::new(state.db);
    let warehouse = service.create_warehouse(input).await?;
    Ok(Json(warehouse))
}

/// Update a warehouse
pub async fn update_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
    Json(input): Json<UpdateWarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    let service = WarehouseService::new(state.db);
    let warehouse = service.update_warehouse(warehouse_id, input).await?;
    Ok(Json(warehouse))
}

/// Delete a warehouse (refused while products or movements reference it)
pub async fn delete_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = WarehouseService::new(state.db);
    service.delete_warehouse(warehouse_id).await?;
    Ok(Json(()))
}

/// Operational statistics for a warehouse
pub async fn get_warehouse_stats(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<WarehouseStats>> {
    let service = WarehouseService::new(state.db);
    let stats = service.warehouse_stats(warehouse_id).await?;
    Ok(Json(stats))
}

/// Update the used storage area of a warehouse
pub async fn update_used_area(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
    Json(input): Json<UpdateUsedAreaInput>,
) -> AppResult<Json<Warehouse>> {
    let service = WarehouseService::new(state.db);
    let warehouse = service
        .update_used_area(warehouse_id, input.used_area)
        .await?;
    Ok(Json(warehouse))
}

/// Stock levels for every product registered to a warehouse
pub async fn get_warehouse_stock(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockLevel>>> {
    let service = StockService::new(state.db);
    let levels = service.warehouse_stock_levels(warehouse_id).await?;
    Ok(Json(levels))
}

/// Locations belonging to a warehouse
pub async fn get_warehouse_locations(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Vec<LocationOverview>>> {
    let service = LocationService::new(state.db);
    let locations = service
        .list_locations(LocationFilter {
            warehouse_id: Some(warehouse_id),
            ..Default::default()
        })
        .await?;
    Ok(Json(locations))
}
