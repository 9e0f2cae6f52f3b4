//! HTTP handlers for maintenance endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::maintenance::{
    CreatePlanInput, IncidentOverview, MaintenanceFilter, MaintenanceService, MaintenanceStats,
    PlanOverview, ReportIncidentInput, UpdateIncidentInput, UpdatePlanInput,
};
use crate::AppState;
use crate::models::{Incident, MaintenancePlan};

/// Query for aggregate maintenance statistics
#[derive(Debug, Default, Deserialize)]
pub struct MaintenanceStatsQuery {
    pub warehouse_id: Option<Uuid>,
}

/// List maintenance plans
pub async fn list_plans(
    State(state): State<AppState>,
    Query(filter): Query<MaintenanceFilter>,
) -> AppResult<Json<Vec<PlanOverview>>> {
    let service = MaintenanceService::new(state.db);
    let plans = service.list_plans(filter).await?;
    Ok(Json(plans))
}

/// Get a maintenance plan by id
pub async fn get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> AppResult<Json<PlanOverview>> {
    let service = MaintenanceService::new(state.db);
    let plan = service.get_plan(plan_id).await?;
    Ok(Json(plan))
}

/// Create a maintenance plan
pub async fn create_plan(
    State(state): State<AppState>,
    Json(input): Json<CreatePlanInput>,
) -> AppResult<Json<MaintenancePlan>> {
    let service = MaintenanceService::new(state.db);
    let plan = service.create_plan(input).await?;
    Ok(Json(plan))
}

/// Update a maintenance plan
pub async fn update_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(input): Json<UpdatePlanInput>,
) -> AppResult<Json<MaintenancePlan>> {
    let service = MaintenanceService::new(state.db);
    let plan = service.update_plan(plan_id, input).await?;
    Ok(Json(plan))
}

/// Delete a maintenance plan
pub async fn delete_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = MaintenanceService::new(state.db);
    service.delete_plan(plan_id).await?;
    Ok(Json(()))
}

/// List incidents
pub async fn list_incidents(
    State(state): State<AppState>,
    Query(filter): Query<MaintenanceFilter>,
) -> AppResult<Json<Vec<IncidentOverview>>> {
    let service = MaintenanceService::new(state.db);
    let incidents = service.list_incidents(filter).await?;
    Ok(Json(incidents))
}

/// Get an incident by id
pub async fn get_incident(
    State(state): State<AppState>,
    Path(incident_id): Path<Uuid>,
) -> AppResult<Json<IncidentOverview>> {
    let service = MaintenanceService::new(state.db);
    let incident = service.get_incident(incident_id).await?;
    Ok(Json(incident))
}

/// Report an incident
pub async fn report_incident(
    State(state): State<AppState>,
    Json(input): Json<ReportIncidentInput>,
) -> AppResult<Json<Incident>> {
    let service = MaintenanceService::new(state.db);
    let incident = service.report_incident(input).await?;
    Ok(Json(incident))
}

/// Update an incident
pub async fn update_incident(
    State(state): State<AppState>,
    Path(incident_id): Path<Uuid>,
    Json(input): Json<UpdateIncidentInput>,
) -> AppResult<Json<Incident>> {
    let service = MaintenanceService::new(state.db);
    let incident = service.update_incident(incident_id, input).await?;
    Ok(Json(incident))
}

/// Delete an incident
pub async fn delete_incident(
    State(state): State<AppState>,
    Path(incident_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = MaintenanceService::new(state.db);
    service.delete_incident(incident_id).await?;
    Ok(Json(()))
}

/// Aggregate plan and incident counters
pub async fn maintenance_stats(
    State(state): State<AppState>,
    Query(query): Query<MaintenanceStatsQuery>,
) -> AppResult<Json<MaintenanceStats>> {
    let service = MaintenanceService::new(state.db);
    let stats = service.stats(query.warehouse_id).await?;
    Ok(Json(stats))
}
