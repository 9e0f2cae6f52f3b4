//! HTTP handlers for reporting endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::reporting::{
    OverviewReport, ReportFilter, ReportingService, RevenueEntry, TimelineEntry, TopProductEntry,
    TopProductsOrder, WarehouseEfficiencyReport, WarehouseInventoryReport,
};
use crate::AppState;
use shared::types::ReportPeriod;

/// Query for the revenue timeline report
#[derive(Debug, Default, Deserialize)]
pub struct RevenueQuery {
    pub warehouse_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub group_by: Option<ReportPeriod>,
}

/// Query for the top-products report
#[derive(Debug, Default, Deserialize)]
pub struct TopProductsQuery {
    pub warehouse_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_by: Option<TopProductsOrder>,
    pub limit: Option<i64>,
}

/// System-wide totals
pub async fn report_overview(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<OverviewReport>> {
    let service = ReportingService::new(state.db);
    let report = service.overview(filter).await?;
    Ok(Json(report))
}

/// On-hand inventory per warehouse
pub async fn report_inventory_by_warehouse(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<WarehouseInventoryReport>>> {
    let service = ReportingService::new(state.db);
    let report = service.inventory_by_warehouse().await?;
    Ok(Json(report))
}

/// Per-day movement timeline
pub async fn report_movement_timeline(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<TimelineEntry>>> {
    let service = ReportingService::new(state.db);
    let timeline = service.movement_timeline(filter).await?;
    Ok(Json(timeline))
}

/// Outbound revenue per day/week/month
pub async fn report_revenue_timeline(
    State(state): State<AppState>,
    Query(query): Query<RevenueQuery>,
) -> AppResult<Json<Vec<RevenueEntry>>> {
    let service = ReportingService::new(state.db);
    let revenue = service
        .revenue_timeline(
            ReportFilter {
                warehouse_id: query.warehouse_id,
                start_date: query.start_date,
                end_date: query.end_date,
            },
            query.group_by.unwrap_or_default(),
        )
        .await?;
    Ok(Json(revenue))
}

/// Best-selling products
pub async fn report_top_products(
    State(state): State<AppState>,
    Query(query): Query<TopProductsQuery>,
) -> AppResult<Json<Vec<TopProductEntry>>> {
    let service = ReportingService::new(state.db);
    let products = service
        .top_products(
            ReportFilter {
                warehouse_id: query.warehouse_id,
                start_date: query.start_date,
                end_date: query.end_date,
            },
            query.sort_by.unwrap_or_default(),
            query.limit.unwrap_or(10),
        )
        .await?;
    Ok(Json(products))
}

/// Utilization, turnover and value density per warehouse
pub async fn report_warehouse_efficiency(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<WarehouseEfficiencyReport>>> {
    let service = ReportingService::new(state.db);
    let report = service.warehouse_efficiency(filter).await?;
    Ok(Json(report))
}
