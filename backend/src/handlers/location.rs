//! HTTP handlers for storage location endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::location::{
    CreateLocationInput, LocationFilter, LocationOverview, LocationService, UpdateLocationInput,
    WarehouseOccupancy,
};
use crate::AppState;
use crate::models::{Location, LocationStatus};

/// Input for changing a location's occupancy status
#[derive(Debug, Deserialize)]
pub struct UpdateLocationStatusInput {
    pub status: LocationStatus,
}

/// List locations with optional filters
pub async fn list_locations(
    State(state): State<AppState>,
    Query(filter): Query<LocationFilter>,
) -> AppResult<Json<Vec<LocationOverview>>> {
    let service = LocationService::new(state.db);
    let locations = service.list_locations(filter).await?;
    Ok(Json(locations))
}

/// Get a location by id
pub async fn get_location(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
) -> AppResult<Json<LocationOverview>> {
    let service = LocationService::new(state.db);
    let location = service.get_location(location_id).await?;
    Ok(Json(location))
}

/// Create a location
pub async fn create_location(
    State(state): State<AppState>,
    Json(input): Json<CreateLocationInput>,
) -> AppResult<Json<Location>> {
    let service = LocationService::new(state.db);
    let location = service.create_location(input).await?;
    Ok(Json(location))
}

/// Update a location
pub async fn update_location(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
    Json(input): Json<UpdateLocationInput>,
) -> AppResult<Json<Location>> {
    let service = LocationService::new(state.db);
    let location = service.update_location(location_id, input).await?;
    Ok(Json(location))
}

/// Change only the occupancy status of a location
pub async fn update_location_status(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
    Json(input): Json<UpdateLocationStatusInput>,
) -> AppResult<Json<Location>> {
    let service = LocationService::new(state.db);
    let location = service.update_status(location_id, input.status).await?;
    Ok(Json(location))
}

/// Delete a location (refused while products occupy it)
pub async fn delete_location(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = LocationService::new(state.db);
    service.delete_location(location_id).await?;
    Ok(Json(()))
}

/// Per-warehouse location occupancy statistics
pub async fn location_occupancy(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<WarehouseOccupancy>>> {
    let service = LocationService::new(state.db);
    let stats = service.occupancy_by_warehouse().await?;
    Ok(Json(stats))
}
