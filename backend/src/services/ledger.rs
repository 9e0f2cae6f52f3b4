//! Inventory ledger service
//!
//! Records stock movements as append-only rows and gates every
//! stock-decreasing write on the derived on-hand quantity. On-hand is never
//! stored; it is recomputed from the ledger inside the same transaction that
//! performs the gated insert, after taking a row lock on the product, so
//! concurrent check-then-act sequences for one product serialize.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{signed_quantity, MovementType, StockMovement};
use shared::validation::validate_quantity;

/// Ledger service for recording and querying stock movements
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

/// Input for recording a single stock movement
#[derive(Debug, Deserialize)]
pub struct RecordMovementInput {
    pub movement_type: MovementType,
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub location_id: Option<Uuid>,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
    pub supplier: Option<String>,
    pub customer: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
}

/// Input for a two-leg warehouse transfer
#[derive(Debug, Deserialize)]
pub struct RecordTransferInput {
    pub product_id: Uuid,
    pub from_warehouse_id: Uuid,
    pub to_warehouse_id: Uuid,
    pub from_location_id: Option<Uuid>,
    pub to_location_id: Option<Uuid>,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub transfer_date: Option<DateTime<Utc>>,
}

/// Both legs of a committed transfer, sharing one reference
#[derive(Debug, Serialize)]
pub struct TransferReceipt {
    pub outbound: StockMovement,
    pub inbound: StockMovement,
}

/// Input for a signed stock adjustment
#[derive(Debug, Deserialize)]
pub struct RecordAdjustmentInput {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub location_id: Option<Uuid>,
    /// Signed quantity: positive adds stock, negative removes it
    pub quantity: Decimal,
    pub reason: String,
    pub notes: Option<String>,
    pub adjustment_date: Option<DateTime<Utc>>,
}

/// Filters for listing movements
#[derive(Debug, Default, Deserialize)]
pub struct MovementFilter {
    pub movement_type: Option<MovementType>,
    pub product_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
}

/// Administrative correction of a movement's descriptive fields.
///
/// Quantity and movement type are frozen once recorded; quantity mistakes
/// are corrected with a compensating adjustment so the audit trail survives.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMovementInput {
    pub unit_price: Option<Decimal>,
    pub supplier: Option<String>,
    pub customer: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
}

/// Aggregate movement counts and totals for a filter window
#[derive(Debug, Serialize, FromRow)]
pub struct MovementSummary {
    pub total_movements: i64,
    pub inbound_count: i64,
    pub outbound_count: i64,
    pub transfer_count: i64,
    pub adjustment_count: i64,
    pub stocktake_count: i64,
    pub inbound_quantity: Decimal,
    pub outbound_quantity: Decimal,
    pub inbound_value: Decimal,
    pub outbound_value: Decimal,
}

/// Per-day movement aggregates for the trailing 30 days
#[derive(Debug, Serialize, FromRow)]
pub struct DailyMovementStats {
    pub date: NaiveDate,
    pub total_movements: i64,
    pub inbound_quantity: Decimal,
    pub outbound_quantity: Decimal,
    pub inbound_value: Decimal,
    pub outbound_value: Decimal,
}

const MOVEMENT_COLUMNS: &str = "id, movement_type, product_id, warehouse_id, location_id, \
     quantity, unit_price, supplier, customer, reference, notes, \
     transaction_date, created_at, updated_at";

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a single stock movement.
    ///
    /// Outbound and transfer movements must pass the sufficiency gate: the
    /// on-hand quantity for the (product, warehouse) pair is recomputed under
    /// a product row lock and the request is rejected with
    /// `InsufficientStock` when it does not cover the requested quantity.
    pub async fn record_movement(&self, input: RecordMovementInput) -> AppResult<StockMovement> {
        if validate_quantity(input.quantity).is_err() {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
                message_vi: "Số lượng phải là số dương".to_string(),
            });
        }

        self.ensure_warehouse_exists(input.warehouse_id).await?;

        let mut tx = self.db.begin().await?;

        if input.movement_type.requires_sufficient_stock() {
            let on_hand =
                Self::on_hand_locked(&mut tx, input.product_id, input.warehouse_id).await?;
            if on_hand < input.quantity {
                return Err(AppError::InsufficientStock {
                    available: on_hand,
                    requested: input.quantity,
                });
            }
        } else {
            Self::lock_product(&mut tx, input.product_id).await?;
        }

        let movement = Self::append_row(
            &mut tx,
            input.movement_type,
            input.product_id,
            input.warehouse_id,
            input.location_id,
            input.quantity,
            input.unit_price.unwrap_or(Decimal::ZERO),
            input.supplier.as_deref(),
            input.customer.as_deref(),
            input.reference.as_deref(),
            input.notes.as_deref(),
            input.transaction_date,
        )
        .await?;

        tx.commit().await?;

        Ok(movement)
    }

    /// Record a warehouse transfer as one outbound and one inbound row
    /// sharing a reference, committed atomically.
    ///
    /// The sufficiency check against the source warehouse and both inserts
    /// run in a single database transaction; if either leg fails nothing is
    /// written, so a one-legged transfer is never observable.
    pub async fn record_transfer(&self, input: RecordTransferInput) -> AppResult<TransferReceipt> {
        if validate_quantity(input.quantity).is_err() {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
                message_vi: "Số lượng phải là số dương".to_string(),
            });
        }
        if input.from_warehouse_id == input.to_warehouse_id {
            return Err(AppError::Validation {
                field: "to_warehouse_id".to_string(),
                message: "Source and destination warehouse must differ".to_string(),
                message_vi: "Kho nguồn và kho đích phải khác nhau".to_string(),
            });
        }

        self.ensure_warehouse_exists(input.from_warehouse_id).await?;
        self.ensure_warehouse_exists(input.to_warehouse_id).await?;

        let reference = input
            .reference
            .unwrap_or_else(|| format!("TR-{}", Uuid::new_v4()));
        let unit_price = input.unit_price.unwrap_or(Decimal::ZERO);

        let mut tx = self.db.begin().await?;

        let on_hand =
            Self::on_hand_locked(&mut tx, input.product_id, input.from_warehouse_id).await?;
        if on_hand < input.quantity {
            return Err(AppError::InsufficientStock {
                available: on_hand,
                requested: input.quantity,
            });
        }

        let outbound = Self::append_row(
            &mut tx,
            MovementType::Outbound,
            input.product_id,
            input.from_warehouse_id,
            input.from_location_id,
            input.quantity,
            unit_price,
            None,
            None,
            Some(reference.as_str()),
            input.notes.as_deref(),
            input.transfer_date,
        )
        .await?;

        let inbound = Self::append_row(
            &mut tx,
            MovementType::Inbound,
            input.product_id,
            input.to_warehouse_id,
            input.to_location_id,
            input.quantity,
            unit_price,
            None,
            None,
            Some(reference.as_str()),
            input.notes.as_deref(),
            input.transfer_date,
        )
        .await?;

        tx.commit().await?;

        Ok(TransferReceipt { outbound, inbound })
    }

    /// Record a signed stock adjustment.
    ///
    /// A positive quantity enters the ledger as an inbound row, a negative
    /// one as an outbound row with the magnitude. Negative adjustments pass
    /// the same sufficiency gate as outbound movements; an adjustment cannot
    /// drive on-hand stock negative.
    pub async fn record_adjustment(
        &self,
        input: RecordAdjustmentInput,
    ) -> AppResult<StockMovement> {
        if input.quantity == Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Adjustment quantity cannot be zero".to_string(),
                message_vi: "Số lượng điều chỉnh không được bằng không".to_string(),
            });
        }
        if input.reason.trim().is_empty() {
            return Err(AppError::Validation {
                field: "reason".to_string(),
                message: "Adjustment reason is required".to_string(),
                message_vi: "Phải nêu lý do điều chỉnh".to_string(),
            });
        }

        self.ensure_warehouse_exists(input.warehouse_id).await?;

        let movement_type = if input.quantity > Decimal::ZERO {
            MovementType::Inbound
        } else {
            MovementType::Outbound
        };
        let magnitude = input.quantity.abs();
        let reference = format!("ADJUSTMENT: {}", input.reason);

        let mut tx = self.db.begin().await?;

        if movement_type == MovementType::Outbound {
            let on_hand =
                Self::on_hand_locked(&mut tx, input.product_id, input.warehouse_id).await?;
            if on_hand < magnitude {
                return Err(AppError::InsufficientStock {
                    available: on_hand,
                    requested: magnitude,
                });
            }
        } else {
            Self::lock_product(&mut tx, input.product_id).await?;
        }

        let movement = Self::append_row(
            &mut tx,
            movement_type,
            input.product_id,
            input.warehouse_id,
            input.location_id,
            magnitude,
            Decimal::ZERO,
            None,
            None,
            Some(reference.as_str()),
            input.notes.as_deref(),
            input.adjustment_date,
        )
        .await?;

        tx.commit().await?;

        Ok(movement)
    }

    /// Get a movement by id
    pub async fn get_movement(&self, id: Uuid) -> AppResult<StockMovement> {
        sqlx::query_as::<_, StockMovement>(&format!(
            "SELECT {} FROM stock_movements WHERE id = $1",
            MOVEMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Movement".to_string()))
    }

    /// List movements, newest first, with optional type/product/warehouse and
    /// date-range filters
    pub async fn list_movements(&self, filter: MovementFilter) -> AppResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            SELECT {}
            FROM stock_movements
            WHERE ($1::movement_type IS NULL OR movement_type = $1)
              AND ($2::uuid IS NULL OR product_id = $2)
              AND ($3::uuid IS NULL OR warehouse_id = $3)
              AND ($4::date IS NULL OR transaction_date::date >= $4)
              AND ($5::date IS NULL OR transaction_date::date <= $5)
            ORDER BY transaction_date DESC, created_at DESC
            LIMIT $6
            "#,
            MOVEMENT_COLUMNS
        ))
        .bind(filter.movement_type)
        .bind(filter.product_id)
        .bind(filter.warehouse_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.limit.unwrap_or(100))
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// Correct a movement's descriptive fields. Quantity and type are frozen.
    pub async fn update_movement(
        &self,
        id: Uuid,
        input: UpdateMovementInput,
    ) -> AppResult<StockMovement> {
        let existing = self.get_movement(id).await?;

        let movement = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            UPDATE stock_movements
            SET unit_price = $1, supplier = $2, customer = $3, reference = $4,
                notes = $5, transaction_date = $6, updated_at = now()
            WHERE id = $7
            RETURNING {}
            "#,
            MOVEMENT_COLUMNS
        ))
        .bind(input.unit_price.unwrap_or(existing.unit_price))
        .bind(input.supplier.or(existing.supplier))
        .bind(input.customer.or(existing.customer))
        .bind(input.reference.or(existing.reference))
        .bind(input.notes.or(existing.notes))
        .bind(input.transaction_date.unwrap_or(existing.transaction_date))
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(movement)
    }

    /// Administrative delete of a ledger row.
    ///
    /// Refused when removing the row would leave the (product, warehouse)
    /// on-hand quantity negative; checked under the same product lock as the
    /// recording paths.
    pub async fn delete_movement(&self, id: Uuid) -> AppResult<()> {
        let movement = self.get_movement(id).await?;

        let mut tx = self.db.begin().await?;

        let on_hand =
            Self::on_hand_locked(&mut tx, movement.product_id, movement.warehouse_id).await?;
        let after = on_hand - signed_quantity(movement.movement_type, movement.quantity);
        if after < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Deleting this movement would drive on-hand stock negative".to_string(),
            ));
        }

        sqlx::query("DELETE FROM stock_movements WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Aggregate counts and totals over an optional warehouse/date window
    pub async fn summary(&self, filter: MovementFilter) -> AppResult<MovementSummary> {
        let summary = sqlx::query_as::<_, MovementSummary>(
            r#"
            SELECT
                COUNT(*) AS total_movements,
                COUNT(*) FILTER (WHERE movement_type = 'inbound') AS inbound_count,
                COUNT(*) FILTER (WHERE movement_type = 'outbound') AS outbound_count,
                COUNT(*) FILTER (WHERE movement_type = 'transfer') AS transfer_count,
                COUNT(*) FILTER (WHERE movement_type = 'adjustment') AS adjustment_count,
                COUNT(*) FILTER (WHERE movement_type = 'stocktake') AS stocktake_count,
                COALESCE(SUM(quantity) FILTER (WHERE movement_type = 'inbound'), 0) AS inbound_quantity,
                COALESCE(SUM(quantity) FILTER (WHERE movement_type = 'outbound'), 0) AS outbound_quantity,
                COALESCE(SUM(quantity * unit_price) FILTER (WHERE movement_type = 'inbound'), 0) AS inbound_value,
                COALESCE(SUM(quantity * unit_price) FILTER (WHERE movement_type = 'outbound'), 0) AS outbound_value
            FROM stock_movements
            WHERE ($1::uuid IS NULL OR warehouse_id = $1)
              AND ($2::date IS NULL OR transaction_date::date >= $2)
              AND ($3::date IS NULL OR transaction_date::date <= $3)
            "#,
        )
        .bind(filter.warehouse_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.db)
        .await?;

        Ok(summary)
    }

    /// Per-day aggregates over the trailing 30 days
    pub async fn daily_stats(
        &self,
        warehouse_id: Option<Uuid>,
    ) -> AppResult<Vec<DailyMovementStats>> {
        let stats = sqlx::query_as::<_, DailyMovementStats>(
            r#"
            SELECT
                transaction_date::date AS date,
                COUNT(*) AS total_movements,
                COALESCE(SUM(quantity) FILTER (WHERE movement_type = 'inbound'), 0) AS inbound_quantity,
                COALESCE(SUM(quantity) FILTER (WHERE movement_type = 'outbound'), 0) AS outbound_quantity,
                COALESCE(SUM(quantity * unit_price) FILTER (WHERE movement_type = 'inbound'), 0) AS inbound_value,
                COALESCE(SUM(quantity * unit_price) FILTER (WHERE movement_type = 'outbound'), 0) AS outbound_value
            FROM stock_movements
            WHERE transaction_date >= now() - INTERVAL '30 days'
              AND ($1::uuid IS NULL OR warehouse_id = $1)
            GROUP BY transaction_date::date
            ORDER BY date DESC
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        Ok(stats)
    }

    /// Lock the product row, serializing all gated writers for the product.
    /// Doubles as the product existence check.
    async fn lock_product(
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
    ) -> AppResult<()> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        Ok(())
    }

    /// On-hand quantity for a (product, warehouse) pair, computed under the
    /// product row lock so the value stays valid until the transaction ends.
    async fn on_hand_locked(
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<Decimal> {
        Self::lock_product(tx, product_id).await?;

        let on_hand = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(CASE WHEN movement_type = 'inbound' THEN quantity
                                     WHEN movement_type = 'outbound' THEN -quantity
                                     ELSE 0 END), 0)
            FROM stock_movements
            WHERE product_id = $1 AND warehouse_id = $2
            "#,
        )
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(on_hand)
    }

    #[allow(clippy::too_many_arguments)]
    async fn append_row(
        tx: &mut Transaction<'_, Postgres>,
        movement_type: MovementType,
        product_id: Uuid,
        warehouse_id: Uuid,
        location_id: Option<Uuid>,
        quantity: Decimal,
        unit_price: Decimal,
        supplier: Option<&str>,
        customer: Option<&str>,
        reference: Option<&str>,
        notes: Option<&str>,
        transaction_date: Option<DateTime<Utc>>,
    ) -> AppResult<StockMovement> {
        let movement = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            INSERT INTO stock_movements (
                movement_type, product_id, warehouse_id, location_id, quantity,
                unit_price, supplier, customer, reference, notes, transaction_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, now()))
            RETURNING {}
            "#,
            MOVEMENT_COLUMNS
        ))
        .bind(movement_type)
        .bind(product_id)
        .bind(warehouse_id)
        .bind(location_id)
        .bind(quantity)
        .bind(unit_price)
        .bind(supplier)
        .bind(customer)
        .bind(reference)
        .bind(notes)
        .bind(transaction_date)
        .fetch_one(&mut **tx)
        .await?;

        Ok(movement)
    }

    async fn ensure_warehouse_exists(&self, warehouse_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)",
        )
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }
        Ok(())
    }
}
