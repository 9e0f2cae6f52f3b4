//! HTTP handlers for invoice endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::invoice::{
    CreateInvoiceInput, InvoiceOverview, InvoiceService, InvoiceStatsSummary, InvoiceWithItems,
    MonthlyInvoiceStats,
};
use crate::AppState;

/// Query for invoice summary statistics
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceStatsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub customer_id: Option<Uuid>,
}

/// Query for per-month invoice statistics
#[derive(Debug, Default, Deserialize)]
pub struct MonthlyStatsQuery {
    pub year: Option<i32>,
}

/// List all invoices
pub async fn list_invoices(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<InvoiceOverview>>> {
    let service = InvoiceService::new(state.db);
    let invoices = service.list_invoices().await?;
    Ok(Json(invoices))
}

/// Get an invoice with its lines
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> AppResult<Json<InvoiceWithItems>> {
    let service = InvoiceService::new(state.db);
    let invoice = service.get_invoice(invoice_id).await?;
    Ok(Json(invoice))
}

/// Search invoices by number or customer
pub async fn search_invoices(
    State(state): State<AppState>,
    Path(keyword): Path<String>,
) -> AppResult<Json<Vec<InvoiceOverview>>> {
    let service = InvoiceService::new(state.db);
    let invoices = service.search_invoices(&keyword).await?;
    Ok(Json(invoices))
}

/// Create an invoice with its lines
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(input): Json<CreateInvoiceInput>,
) -> AppResult<Json<InvoiceWithItems>> {
    let service = InvoiceService::new(state.db);
    let invoice = service.create_invoice(input).await?;
    Ok(Json(invoice))
}

/// Replace an invoice's header and lines
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Json(input): Json<CreateInvoiceInput>,
) -> AppResult<Json<InvoiceWithItems>> {
    let service = InvoiceService::new(state.db);
    let invoice = service.update_invoice(invoice_id, input).await?;
    Ok(Json(invoice))
}

/// Delete an invoice and its lines
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = InvoiceService::new(state.db);
    service.delete_invoice(invoice_id).await?;
    Ok(Json(()))
}

/// Aggregate invoice statistics
pub async fn invoice_stats(
    State(state): State<AppState>,
    Query(query): Query<InvoiceStatsQuery>,
) -> AppResult<Json<InvoiceStatsSummary>> {
    let service = InvoiceService::new(state.db);
    let stats = service
        .stats_summary(query.start_date, query.end_date, query.customer_id)
        .await?;
    Ok(Json(stats))
}

/// Per-month invoice statistics, defaulting to the current year
pub async fn invoice_monthly_stats(
    State(state): State<AppState>,
    Query(query): Query<MonthlyStatsQuery>,
) -> AppResult<Json<Vec<MonthlyInvoiceStats>>> {
    let service = InvoiceService::new(state.db);
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let stats = service.monthly_stats(year).await?;
    Ok(Json(stats))
}
