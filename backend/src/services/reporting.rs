//! Reporting service
//!
//! Read-side aggregations over the ledger and registries. Nothing here
//! mutates state; every figure is derived at query time.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::MovementType;
use shared::types::ReportPeriod;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Shared date/warehouse filter for reports
#[derive(Debug, Default, Deserialize)]
pub struct ReportFilter {
    pub warehouse_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// System-wide totals
#[derive(Debug, Serialize, FromRow)]
pub struct OverviewReport {
    pub total_warehouses: i64,
    pub total_products: i64,
    pub total_customers: i64,
    pub total_movements: i64,
    pub active_days: i64,
    pub inbound_value: Decimal,
    pub outbound_value: Decimal,
    pub inbound_quantity: Decimal,
    pub outbound_quantity: Decimal,
    #[sqlx(default)]
    pub net_inventory_value: Decimal,
    #[sqlx(default)]
    pub net_inventory_quantity: Decimal,
}

/// Per-warehouse inventory report row
#[derive(Debug, Serialize, FromRow)]
pub struct WarehouseInventoryReport {
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub warehouse_code: String,
    pub total_area: Decimal,
    pub used_area: Decimal,
    pub total_products: i64,
    pub inbound_quantity: Decimal,
    pub outbound_quantity: Decimal,
    pub on_hand_quantity: Decimal,
    pub inventory_value: Decimal,
    #[sqlx(default)]
    pub utilization_rate: Decimal,
}

/// One (day, movement type) bucket of the movement timeline
#[derive(Debug, Serialize, FromRow)]
pub struct TimelineEntry {
    pub date: NaiveDate,
    pub movement_type: MovementType,
    pub movement_count: i64,
    pub total_quantity: Decimal,
    pub total_value: Decimal,
    pub unique_products: i64,
}

/// One period of outbound revenue
#[derive(Debug, Serialize, FromRow)]
pub struct RevenueEntry {
    pub period: String,
    pub movement_count: i64,
    pub total_quantity: Decimal,
    pub total_revenue: Decimal,
    pub unique_products: i64,
    pub average_order_value: Decimal,
}

/// Ordering for the top-products report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopProductsOrder {
    #[default]
    Revenue,
    Quantity,
    Transactions,
}

/// One row of the top-products report
#[derive(Debug, Serialize, FromRow)]
pub struct TopProductEntry {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: String,
    pub category: Option<String>,
    pub warehouse_name: Option<String>,
    pub movement_count: i64,
    pub total_quantity: Decimal,
    pub total_revenue: Decimal,
    pub average_price: Decimal,
}

/// Per-warehouse efficiency figures
#[derive(Debug, Serialize, FromRow)]
pub struct WarehouseEfficiencyReport {
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub warehouse_code: String,
    pub total_area: Decimal,
    pub used_area: Decimal,
    pub total_products: i64,
    pub total_locations: i64,
    pub inbound_count: i64,
    pub outbound_count: i64,
    pub inbound_quantity: Decimal,
    pub outbound_quantity: Decimal,
    pub inbound_value: Decimal,
    pub outbound_value: Decimal,
    #[sqlx(default)]
    pub utilization_rate: Decimal,
    #[sqlx(default)]
    pub turnover_rate: Decimal,
    #[sqlx(default)]
    pub value_density: Decimal,
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// System-wide totals over an optional date window
    pub async fn overview(&self, filter: ReportFilter) -> AppResult<OverviewReport> {
        let mut report = sqlx::query_as::<_, OverviewReport>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM warehouses) AS total_warehouses,
                (SELECT COUNT(*) FROM products) AS total_products,
                (SELECT COUNT(*) FROM customers) AS total_customers,
                COUNT(*) AS total_movements,
                COUNT(DISTINCT transaction_date::date) AS active_days,
                COALESCE(SUM(quantity * unit_price) FILTER (WHERE movement_type = 'inbound'), 0) AS inbound_value,
                COALESCE(SUM(quantity * unit_price) FILTER (WHERE movement_type = 'outbound'), 0) AS outbound_value,
                COALESCE(SUM(quantity) FILTER (WHERE movement_type = 'inbound'), 0) AS inbound_quantity,
                COALESCE(SUM(quantity) FILTER (WHERE movement_type = 'outbound'), 0) AS outbound_quantity
            FROM stock_movements
            WHERE ($1::date IS NULL OR transaction_date::date >= $1)
              AND ($2::date IS NULL OR transaction_date::date <= $2)
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.db)
        .await?;

        report.net_inventory_value = report.inbound_value - report.outbound_value;
        report.net_inventory_quantity = report.inbound_quantity - report.outbound_quantity;

        Ok(report)
    }

    /// On-hand inventory per warehouse
    pub async fn inventory_by_warehouse(&self) -> AppResult<Vec<WarehouseInventoryReport>> {
        let mut rows = sqlx::query_as::<_, WarehouseInventoryReport>(
            r#"
            SELECT w.id AS warehouse_id,
                   w.name AS warehouse_name,
                   w.code AS warehouse_code,
                   w.total_area,
                   w.used_area,
                   (SELECT COUNT(*) FROM products p WHERE p.warehouse_id = w.id) AS total_products,
                   COALESCE(SUM(m.quantity) FILTER (WHERE m.movement_type = 'inbound'), 0) AS inbound_quantity,
                   COALESCE(SUM(m.quantity) FILTER (WHERE m.movement_type = 'outbound'), 0) AS outbound_quantity,
                   COALESCE(SUM(CASE WHEN m.movement_type = 'inbound' THEN m.quantity
                                     WHEN m.movement_type = 'outbound' THEN -m.quantity
                                     ELSE 0 END), 0) AS on_hand_quantity,
                   COALESCE(SUM(m.quantity * m.unit_price) FILTER (WHERE m.movement_type = 'inbound'), 0) AS inventory_value
            FROM warehouses w
            LEFT JOIN stock_movements m ON m.warehouse_id = w.id
            GROUP BY w.id
            ORDER BY w.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        for row in &mut rows {
            row.utilization_rate = utilization(row.used_area, row.total_area);
        }

        Ok(rows)
    }

    /// Per-day movement counts and totals, grouped by type
    pub async fn movement_timeline(&self, filter: ReportFilter) -> AppResult<Vec<TimelineEntry>> {
        let timeline = sqlx::query_as::<_, TimelineEntry>(
            r#"
            SELECT transaction_date::date AS date,
                   movement_type,
                   COUNT(*) AS movement_count,
                   COALESCE(SUM(quantity), 0) AS total_quantity,
                   COALESCE(SUM(quantity * unit_price), 0) AS total_value,
                   COUNT(DISTINCT product_id) AS unique_products
            FROM stock_movements
            WHERE ($1::uuid IS NULL OR warehouse_id = $1)
              AND ($2::date IS NULL OR transaction_date::date >= $2)
              AND ($3::date IS NULL OR transaction_date::date <= $3)
            GROUP BY date, movement_type
            ORDER BY date DESC, movement_type
            "#,
        )
        .bind(filter.warehouse_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(timeline)
    }

    /// Outbound revenue per day/week/month
    pub async fn revenue_timeline(
        &self,
        filter: ReportFilter,
        period: ReportPeriod,
    ) -> AppResult<Vec<RevenueEntry>> {
        let revenue = sqlx::query_as::<_, RevenueEntry>(
            r#"
            SELECT to_char(transaction_date, $4) AS period,
                   COUNT(*) AS movement_count,
                   COALESCE(SUM(quantity), 0) AS total_quantity,
                   COALESCE(SUM(quantity * unit_price), 0) AS total_revenue,
                   COUNT(DISTINCT product_id) AS unique_products,
                   COALESCE(AVG(quantity * unit_price), 0) AS average_order_value
            FROM stock_movements
            WHERE movement_type = 'outbound'
              AND ($1::uuid IS NULL OR warehouse_id = $1)
              AND ($2::date IS NULL OR transaction_date::date >= $2)
              AND ($3::date IS NULL OR transaction_date::date <= $3)
            GROUP BY period
            ORDER BY period DESC
            "#,
        )
        .bind(filter.warehouse_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(period.date_format())
        .fetch_all(&self.db)
        .await?;

        Ok(revenue)
    }

    /// Best-selling products by revenue, quantity or movement count
    pub async fn top_products(
        &self,
        filter: ReportFilter,
        order: TopProductsOrder,
        limit: i64,
    ) -> AppResult<Vec<TopProductEntry>> {
        let order_clause = match order {
            TopProductsOrder::Revenue => "total_revenue DESC",
            TopProductsOrder::Quantity => "total_quantity DESC",
            TopProductsOrder::Transactions => "movement_count DESC",
        };

        let products = sqlx::query_as::<_, TopProductEntry>(&format!(
            r#"
            SELECT p.id AS product_id,
                   p.name AS product_name,
                   p.sku,
                   p.category,
                   w.name AS warehouse_name,
                   COUNT(*) AS movement_count,
                   COALESCE(SUM(m.quantity), 0) AS total_quantity,
                   COALESCE(SUM(m.quantity * m.unit_price), 0) AS total_revenue,
                   COALESCE(AVG(m.unit_price), 0) AS average_price
            FROM stock_movements m
            JOIN products p ON m.product_id = p.id
            LEFT JOIN warehouses w ON m.warehouse_id = w.id
            WHERE m.movement_type = 'outbound'
              AND ($1::uuid IS NULL OR m.warehouse_id = $1)
              AND ($2::date IS NULL OR m.transaction_date::date >= $2)
              AND ($3::date IS NULL OR m.transaction_date::date <= $3)
            GROUP BY p.id, w.id
            ORDER BY {}
            LIMIT $4
            "#,
            order_clause
        ))
        .bind(filter.warehouse_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// Utilization, turnover and value density per warehouse
    pub async fn warehouse_efficiency(
        &self,
        filter: ReportFilter,
    ) -> AppResult<Vec<WarehouseEfficiencyReport>> {
        let mut rows = sqlx::query_as::<_, WarehouseEfficiencyReport>(
            r#"
            SELECT w.id AS warehouse_id,
                   w.name AS warehouse_name,
                   w.code AS warehouse_code,
                   w.total_area,
                   w.used_area,
                   (SELECT COUNT(*) FROM products p WHERE p.warehouse_id = w.id) AS total_products,
                   (SELECT COUNT(*) FROM locations l WHERE l.warehouse_id = w.id) AS total_locations,
                   COUNT(m.id) FILTER (WHERE m.movement_type = 'inbound') AS inbound_count,
                   COUNT(m.id) FILTER (WHERE m.movement_type = 'outbound') AS outbound_count,
                   COALESCE(SUM(m.quantity) FILTER (WHERE m.movement_type = 'inbound'), 0) AS inbound_quantity,
                   COALESCE(SUM(m.quantity) FILTER (WHERE m.movement_type = 'outbound'), 0) AS outbound_quantity,
                   COALESCE(SUM(m.quantity * m.unit_price) FILTER (WHERE m.movement_type = 'inbound'), 0) AS inbound_value,
                   COALESCE(SUM(m.quantity * m.unit_price) FILTER (WHERE m.movement_type = 'outbound'), 0) AS outbound_value
            FROM warehouses w
            LEFT JOIN stock_movements m ON m.warehouse_id = w.id
                AND ($1::date IS NULL OR m.transaction_date::date >= $1)
                AND ($2::date IS NULL OR m.transaction_date::date <= $2)
            GROUP BY w.id
            ORDER BY w.name
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        for row in &mut rows {
            row.utilization_rate = utilization(row.used_area, row.total_area);
            row.turnover_rate = if row.inbound_quantity > Decimal::ZERO {
                row.outbound_quantity / row.inbound_quantity * Decimal::from(100)
            } else {
                Decimal::ZERO
            };
            row.value_density = if row.total_area > Decimal::ZERO {
                row.inbound_value / row.total_area
            } else {
                Decimal::ZERO
            };
        }

        Ok(rows)
    }
}

fn utilization(used_area: Decimal, total_area: Decimal) -> Decimal {
    if total_area > Decimal::ZERO {
        used_area / total_area * Decimal::from(100)
    } else {
        Decimal::ZERO
    }
}
