//! HTTP handlers for the inventory ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::ledger::{
    DailyMovementStats, LedgerService, MovementFilter, MovementSummary, RecordAdjustmentInput,
    RecordMovementInput, RecordTransferInput, TransferReceipt, UpdateMovementInput,
};
use crate::AppState;
use crate::models::StockMovement;

/// Query for per-day movement statistics
#[derive(Debug, Default, Deserialize)]
pub struct DailyStatsQuery {
    pub warehouse_id: Option<Uuid>,
}

/// List stock movements with optional filters
pub async fn list_movements(
    State(state): State<AppState>,
    Query(filter): Query<MovementFilter>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = LedgerService::new(state.db);
    let movements = service.list_movements(filter).await?;
    Ok(Json(movements))
}

/// Get a movement by id
pub async fn get_movement(
    State(state): State<AppState>,
    Path(movement_id): Path<Uuid>,
) -> AppResult<Json<StockMovement>> {
    let service = LedgerService::new(state.db);
    let movement = service.get_movement(movement_id).await?;
    Ok(Json(movement))
}

/// Record a stock movement
pub async fn record_movement(
    State(state): State<AppState>,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<Json<StockMovement>> {
    let service = LedgerService::new(state.db);
    let movement = service.record_movement(input).await?;
    Ok(Json(movement))
}

/// Record a two-leg warehouse transfer
pub async fn record_transfer(
    State(state): State<AppState>,
    Json(input): Json<RecordTransferInput>,
) -> AppResult<Json<TransferReceipt>> {
    let service = LedgerService::new(state.db);
    let receipt = service.record_transfer(input).await?;
    Ok(Json(receipt))
}

/// Record a signed stock adjustment
pub async fn record_adjustment(
    State(state): State<AppState>,
    Json(input): Json<RecordAdjustmentInput>,
) -> AppResult<Json<StockMovement>> {
    let service = LedgerService::new(state.db);
    let movement = service.record_adjustment(input).await?;
    Ok(Json(movement))
}

/// Correct a movement's descriptive fields
pub async fn update_movement(
    State(state): State<AppState>,
    Path(movement_id): Path<Uuid>,
    Json(input): Json<UpdateMovementInput>,
) -> AppResult<Json<StockMovement>> {
    let service = LedgerService::new(state.db);
    let movement = service.update_movement(movement_id, input).await?;
    Ok(Json(movement))
}

/// Administrative delete of a movement
pub async fn delete_movement(
    State(state): State<AppState>,
    Path(movement_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = LedgerService::new(state.db);
    service.delete_movement(movement_id).await?;
    Ok(Json(()))
}

/// Aggregate movement statistics
pub async fn movement_summary(
    State(state): State<AppState>,
    Query(filter): Query<MovementFilter>,
) -> AppResult<Json<MovementSummary>> {
    let service = LedgerService::new(state.db);
    let summary = service.summary(filter).await?;
    Ok(Json(summary))
}

/// Per-day movement statistics for the trailing 30 days
pub async fn movement_daily_stats(
    State(state): State<AppState>,
    Query(query): Query<DailyStatsQuery>,
) -> AppResult<Json<Vec<DailyMovementStats>>> {
    let service = LedgerService::new(state.db);
    let stats = service.daily_stats(query.warehouse_id).await?;
    Ok(Json(stats))
}
