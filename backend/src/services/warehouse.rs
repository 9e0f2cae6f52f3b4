//! Warehouse registry service

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult, BlockingDependents};
use crate::models::{Warehouse, WarehouseKind};
use shared::validation::validate_entity_code;

/// Warehouse registry service
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

/// Input for creating a warehouse
#[derive(Debug, Deserialize)]
pub struct CreateWarehouseInput {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub manager: Option<String>,
    pub kind: Option<WarehouseKind>,
    pub total_area: Option<Decimal>,
    pub rental_price: Option<Decimal>,
    pub notes: Option<String>,
}

/// Input for updating a warehouse
#[derive(Debug, Deserialize)]
pub struct UpdateWarehouseInput {
    pub name: Option<String>,
    pub code: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub manager: Option<String>,
    pub kind: Option<WarehouseKind>,
    pub total_area: Option<Decimal>,
    pub rental_price: Option<Decimal>,
    pub notes: Option<String>,
}

/// A warehouse with registry counts and derived inventory value
#[derive(Debug, Serialize, FromRow)]
pub struct WarehouseOverview {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub warehouse: Warehouse,
    pub total_locations: i64,
    pub total_products: i64,
    pub total_inventory_value: Decimal,
}

/// Operational statistics for one warehouse
#[derive(Debug, Serialize, FromRow)]
pub struct WarehouseStats {
    pub warehouse_name: String,
    pub total_area: Decimal,
    pub used_area: Decimal,
    pub total_locations: i64,
    pub total_products: i64,
    pub total_inbound: Decimal,
    pub total_outbound: Decimal,
    pub inbound_value: Decimal,
    pub outbound_value: Decimal,
    #[sqlx(default)]
    pub utilization_rate: Decimal,
    #[sqlx(default)]
    pub net_quantity: Decimal,
    #[sqlx(default)]
    pub net_value: Decimal,
}

const OVERVIEW_QUERY: &str = r#"
    SELECT w.*,
           (SELECT COUNT(*) FROM locations l WHERE l.warehouse_id = w.id) AS total_locations,
           (SELECT COUNT(*) FROM products p WHERE p.warehouse_id = w.id) AS total_products,
           COALESCE((SELECT SUM(p.unit_price * COALESCE(
               (SELECT SUM(CASE WHEN m.movement_type = 'inbound' THEN m.quantity
                                WHEN m.movement_type = 'outbound' THEN -m.quantity
                                ELSE 0 END)
                FROM stock_movements m
                WHERE m.product_id = p.id AND m.warehouse_id = w.id), 0))
             FROM products p WHERE p.warehouse_id = w.id), 0) AS total_inventory_value
    FROM warehouses w
"#;

impl WarehouseService {
    /// Create a new WarehouseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all warehouses with counts and inventory value
    pub async fn list_warehouses(&self) -> AppResult<Vec<WarehouseOverview>> {
        let warehouses =
            sqlx::query_as::<_, WarehouseOverview>(&format!("{} ORDER BY w.name", OVERVIEW_QUERY))
                .fetch_all(&self.db)
                .await?;

        Ok(warehouses)
    }

    /// Get a warehouse by id
    pub async fn get_warehouse(&self, id: Uuid) -> AppResult<WarehouseOverview> {
        sqlx::query_as::<_, WarehouseOverview>(&format!("{} WHERE w.id = $1", OVERVIEW_QUERY))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))
    }

    /// Create a warehouse
    pub async fn create_warehouse(&self, input: CreateWarehouseInput) -> AppResult<Warehouse> {
        Self::check_code(&input.code)?;

        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            INSERT INTO warehouses (name, code, address, city, country, phone, email,
                                    manager, kind, total_area, rental_price, notes)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'Vietnam'), $6, $7, $8,
                    COALESCE($9, 'general'), COALESCE($10, 0), COALESCE($11, 0), $12)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.country)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.manager)
        .bind(input.kind)
        .bind(input.total_area)
        .bind(input.rental_price)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "warehouse code"))?;

        Ok(warehouse)
    }

    /// Update a warehouse
    pub async fn update_warehouse(
        &self,
        id: Uuid,
        input: UpdateWarehouseInput,
    ) -> AppResult<Warehouse> {
        let existing = sqlx::query_as::<_, Warehouse>("SELECT * FROM warehouses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;

        let code = input.code.unwrap_or(existing.code);
        Self::check_code(&code)?;

        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            UPDATE warehouses
            SET name = $1, code = $2, address = $3, city = $4, country = $5,
                phone = $6, email = $7, manager = $8, kind = $9, total_area = $10,
                rental_price = $11, notes = $12, updated_at = now()
            WHERE id = $13
            RETURNING *
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(&code)
        .bind(input.address.or(existing.address))
        .bind(input.city.or(existing.city))
        .bind(input.country.unwrap_or(existing.country))
        .bind(input.phone.or(existing.phone))
        .bind(input.email.or(existing.email))
        .bind(input.manager.or(existing.manager))
        .bind(input.kind.unwrap_or(existing.kind))
        .bind(input.total_area.unwrap_or(existing.total_area))
        .bind(input.rental_price.unwrap_or(existing.rental_price))
        .bind(input.notes.or(existing.notes))
        .bind(id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "warehouse code"))?;

        Ok(warehouse)
    }

    /// Delete a warehouse. Refused while products or ledger rows reference
    /// it, reporting the blocking counts.
    pub async fn delete_warehouse(&self, id: Uuid) -> AppResult<()> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT (SELECT COUNT(*) FROM products WHERE warehouse_id = $1),
                   (SELECT COUNT(*) FROM stock_movements WHERE warehouse_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if counts.0 > 0 || counts.1 > 0 {
            return Err(AppError::DependencyConflict {
                resource: "warehouse".to_string(),
                dependents: vec![
                    BlockingDependents {
                        relation: "products".to_string(),
                        count: counts.0,
                    },
                    BlockingDependents {
                        relation: "movements".to_string(),
                        count: counts.1,
                    },
                ],
            });
        }

        // Locations carry no ledger history of their own; remove them with
        // the warehouse.
        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM locations WHERE warehouse_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        Ok(())
    }

    /// Operational statistics for a warehouse
    pub async fn warehouse_stats(&self, id: Uuid) -> AppResult<WarehouseStats> {
        let mut stats = sqlx::query_as::<_, WarehouseStats>(
            r#"
            SELECT w.name AS warehouse_name,
                   w.total_area,
                   w.used_area,
                   (SELECT COUNT(*) FROM locations l WHERE l.warehouse_id = w.id) AS total_locations,
                   (SELECT COUNT(*) FROM products p WHERE p.warehouse_id = w.id) AS total_products,
                   COALESCE((SELECT SUM(m.quantity) FROM stock_movements m
                             WHERE m.warehouse_id = w.id AND m.movement_type = 'inbound'), 0) AS total_inbound,
                   COALESCE((SELECT SUM(m.quantity) FROM stock_movements m
                             WHERE m.warehouse_id = w.id AND m.movement_type = 'outbound'), 0) AS total_outbound,
                   COALESCE((SELECT SUM(m.quantity * m.unit_price) FROM stock_movements m
                             WHERE m.warehouse_id = w.id AND m.movement_type = 'inbound'), 0) AS inbound_value,
                   COALESCE((SELECT SUM(m.quantity * m.unit_price) FROM stock_movements m
                             WHERE m.warehouse_id = w.id AND m.movement_type = 'outbound'), 0) AS outbound_value
            FROM warehouses w
            WHERE w.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;

        stats.utilization_rate = if stats.total_area > Decimal::ZERO {
            stats.used_area / stats.total_area * Decimal::from(100)
        } else {
            Decimal::ZERO
        };
        stats.net_quantity = stats.total_inbound - stats.total_outbound;
        stats.net_value = stats.inbound_value - stats.outbound_value;

        Ok(stats)
    }

    /// Update the used storage area of a warehouse
    pub async fn update_used_area(&self, id: Uuid, used_area: Decimal) -> AppResult<Warehouse> {
        if used_area < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "used_area".to_string(),
                message: "Used area cannot be negative".to_string(),
                message_vi: "Diện tích sử dụng không được âm".to_string(),
            });
        }

        sqlx::query_as::<_, Warehouse>(
            "UPDATE warehouses SET used_area = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(used_area)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))
    }

    fn check_code(code: &str) -> AppResult<()> {
        validate_entity_code(code).map_err(|msg| AppError::Validation {
            field: "code".to_string(),
            message: msg.to_string(),
            message_vi: "Mã kho không hợp lệ".to_string(),
        })
    }
}
