//! Stock query engine
//!
//! Derives point-in-time inventory figures from the ledger: on-hand
//! quantities, stock status against product thresholds, valuation, and
//! low-stock alerts. Everything here is a read-side fold over
//! `stock_movements`; no counter is maintained anywhere.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{alert_level, stock_status, AlertLevel, StockStatus};

/// Stock query service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// On-hand stock for a product at its default warehouse
#[derive(Debug, Serialize)]
pub struct ProductStock {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub warehouse_id: Option<Uuid>,
    pub warehouse_name: Option<String>,
    pub location_name: Option<String>,
    pub total_in: Decimal,
    pub total_out: Decimal,
    pub on_hand: Decimal,
    pub status: StockStatus,
}

/// Per-product stock levels within a warehouse
#[derive(Debug, Serialize)]
pub struct StockLevel {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: Option<String>,
    pub location_name: Option<String>,
    pub min_stock: Decimal,
    pub max_stock: Decimal,
    pub unit_price: Decimal,
    pub total_in: Decimal,
    pub total_out: Decimal,
    pub on_hand: Decimal,
    pub status: StockStatus,
}

/// Valuation of a (product, warehouse) pair at the product's current price.
/// Intentionally not a cost-basis figure (no FIFO or weighted average).
#[derive(Debug, Serialize)]
pub struct InventoryValue {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub on_hand: Decimal,
    pub unit_price: Decimal,
    pub total_value: Decimal,
}

/// A product at or near its minimum stock threshold
#[derive(Debug, Serialize)]
pub struct LowStockAlert {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: Option<String>,
    pub warehouse_name: Option<String>,
    pub location_name: Option<String>,
    pub min_stock: Decimal,
    pub max_stock: Decimal,
    pub unit_price: Decimal,
    pub on_hand: Decimal,
    pub level: AlertLevel,
    pub shortage: Decimal,
    pub shortage_value: Decimal,
}

#[derive(Debug, FromRow)]
struct ProductStockRow {
    id: Uuid,
    name: String,
    sku: String,
    warehouse_id: Option<Uuid>,
    warehouse_name: Option<String>,
    location_name: Option<String>,
    min_stock: Decimal,
    max_stock: Decimal,
    total_in: Decimal,
    total_out: Decimal,
}

#[derive(Debug, FromRow)]
struct StockLevelRow {
    id: Uuid,
    name: String,
    sku: String,
    category: Option<String>,
    location_name: Option<String>,
    min_stock: Decimal,
    max_stock: Decimal,
    unit_price: Decimal,
    total_in: Decimal,
    total_out: Decimal,
}

#[derive(Debug, FromRow)]
struct LowStockRow {
    id: Uuid,
    name: String,
    sku: String,
    category: Option<String>,
    warehouse_name: Option<String>,
    location_name: Option<String>,
    min_stock: Decimal,
    max_stock: Decimal,
    unit_price: Decimal,
    on_hand: Decimal,
}

/// The signed ledger fold, reused by every on-hand query
const ON_HAND_SUM: &str = "COALESCE(SUM(CASE WHEN m.movement_type = 'inbound' THEN m.quantity \
     WHEN m.movement_type = 'outbound' THEN -m.quantity ELSE 0 END), 0)";

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// On-hand quantity for a (product, warehouse) pair
    pub async fn on_hand(&self, product_id: Uuid, warehouse_id: Uuid) -> AppResult<Decimal> {
        self.ensure_product_exists(product_id).await?;

        let on_hand = sqlx::query_scalar::<_, Decimal>(&format!(
            "SELECT {} FROM stock_movements m WHERE m.product_id = $1 AND m.warehouse_id = $2",
            ON_HAND_SUM
        ))
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        Ok(on_hand)
    }

    /// Stock totals for a product at its default warehouse
    pub async fn product_stock(&self, product_id: Uuid) -> AppResult<ProductStock> {
        let row = sqlx::query_as::<_, ProductStockRow>(
            r#"
            SELECT p.id, p.name, p.sku, p.warehouse_id,
                   w.name AS warehouse_name,
                   l.name AS location_name,
                   p.min_stock, p.max_stock,
                   COALESCE(SUM(CASE WHEN m.movement_type = 'inbound' THEN m.quantity ELSE 0 END), 0) AS total_in,
                   COALESCE(SUM(CASE WHEN m.movement_type = 'outbound' THEN m.quantity ELSE 0 END), 0) AS total_out
            FROM products p
            LEFT JOIN warehouses w ON p.warehouse_id = w.id
            LEFT JOIN locations l ON p.location_id = l.id
            LEFT JOIN stock_movements m ON m.product_id = p.id AND m.warehouse_id = p.warehouse_id
            WHERE p.id = $1
            GROUP BY p.id, w.id, l.id
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let on_hand = row.total_in - row.total_out;
        Ok(ProductStock {
            product_id: row.id,
            name: row.name,
            sku: row.sku,
            warehouse_id: row.warehouse_id,
            warehouse_name: row.warehouse_name,
            location_name: row.location_name,
            total_in: row.total_in,
            total_out: row.total_out,
            on_hand,
            status: stock_status(on_hand, row.min_stock, row.max_stock),
        })
    }

    /// Advisory stock status for a (product, warehouse) pair
    pub async fn stock_status(
        &self,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<StockStatus> {
        let thresholds = sqlx::query_as::<_, (Decimal, Decimal)>(
            "SELECT min_stock, max_stock FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let on_hand = self.on_hand(product_id, warehouse_id).await?;
        Ok(stock_status(on_hand, thresholds.0, thresholds.1))
    }

    /// Inventory valuation at the product's current unit price
    pub async fn inventory_value(
        &self,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<InventoryValue> {
        let unit_price =
            sqlx::query_scalar::<_, Decimal>("SELECT unit_price FROM products WHERE id = $1")
                .bind(product_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let on_hand = self.on_hand(product_id, warehouse_id).await?;

        Ok(InventoryValue {
            product_id,
            warehouse_id,
            on_hand,
            unit_price,
            total_value: on_hand * unit_price,
        })
    }

    /// Stock levels for every product registered to a warehouse
    pub async fn warehouse_stock_levels(&self, warehouse_id: Uuid) -> AppResult<Vec<StockLevel>> {
        let rows = sqlx::query_as::<_, StockLevelRow>(
            r#"
            SELECT p.id, p.name, p.sku, p.category,
                   l.name AS location_name,
                   p.min_stock, p.max_stock, p.unit_price,
                   COALESCE(SUM(CASE WHEN m.movement_type = 'inbound' THEN m.quantity ELSE 0 END), 0) AS total_in,
                   COALESCE(SUM(CASE WHEN m.movement_type = 'outbound' THEN m.quantity ELSE 0 END), 0) AS total_out
            FROM products p
            LEFT JOIN locations l ON p.location_id = l.id
            LEFT JOIN stock_movements m ON m.product_id = p.id AND m.warehouse_id = p.warehouse_id
            WHERE p.warehouse_id = $1
            GROUP BY p.id, l.id
            ORDER BY p.name
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let on_hand = row.total_in - row.total_out;
                StockLevel {
                    product_id: row.id,
                    name: row.name,
                    sku: row.sku,
                    category: row.category,
                    location_name: row.location_name,
                    min_stock: row.min_stock,
                    max_stock: row.max_stock,
                    unit_price: row.unit_price,
                    total_in: row.total_in,
                    total_out: row.total_out,
                    on_hand,
                    status: stock_status(on_hand, row.min_stock, row.max_stock),
                }
            })
            .collect())
    }

    /// Products at or below 1.5x their minimum stock, most depleted first
    pub async fn low_stock_alerts(
        &self,
        warehouse_id: Option<Uuid>,
        limit: i64,
    ) -> AppResult<Vec<LowStockAlert>> {
        let rows = sqlx::query_as::<_, LowStockRow>(&format!(
            r#"
            SELECT p.id, p.name, p.sku, p.category,
                   w.name AS warehouse_name,
                   l.name AS location_name,
                   p.min_stock, p.max_stock, p.unit_price,
                   {sum} AS on_hand
            FROM products p
            LEFT JOIN warehouses w ON p.warehouse_id = w.id
            LEFT JOIN locations l ON p.location_id = l.id
            LEFT JOIN stock_movements m ON m.product_id = p.id AND m.warehouse_id = p.warehouse_id
            WHERE ($1::uuid IS NULL OR p.warehouse_id = $1)
            GROUP BY p.id, w.id, l.id
            HAVING {sum} <= p.min_stock * 1.5
            ORDER BY on_hand ASC
            LIMIT $2
            "#,
            sum = ON_HAND_SUM
        ))
        .bind(warehouse_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                alert_level(row.on_hand, row.min_stock).map(|level| LowStockAlert {
                    product_id: row.id,
                    name: row.name,
                    sku: row.sku,
                    category: row.category,
                    warehouse_name: row.warehouse_name,
                    location_name: row.location_name,
                    min_stock: row.min_stock,
                    max_stock: row.max_stock,
                    unit_price: row.unit_price,
                    on_hand: row.on_hand,
                    shortage: row.min_stock - row.on_hand,
                    shortage_value: (row.min_stock - row.on_hand) * row.unit_price,
                    level,
                })
            })
            .collect())
    }

    async fn ensure_product_exists(&self, product_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Product".to_string()));
        }
        Ok(())
    }
}
