//! Product registry service

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult, BlockingDependents};
use crate::models::Product;
use shared::validation::{validate_sku, validate_stock_thresholds};

/// Product registry service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub warehouse_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub min_stock: Option<Decimal>,
    pub max_stock: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub notes: Option<String>,
}

/// Input for updating a product
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub warehouse_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub min_stock: Option<Decimal>,
    pub max_stock: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

/// A product with its display joins
#[derive(Debug, Serialize, FromRow)]
pub struct ProductOverview {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub warehouse_name: Option<String>,
    pub location_name: Option<String>,
}

const OVERVIEW_QUERY: &str = r#"
    SELECT p.*, w.name AS warehouse_name, l.name AS location_name
    FROM products p
    LEFT JOIN warehouses w ON p.warehouse_id = w.id
    LEFT JOIN locations l ON p.location_id = l.id
"#;

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all products
    pub async fn list_products(&self) -> AppResult<Vec<ProductOverview>> {
        let products =
            sqlx::query_as::<_, ProductOverview>(&format!("{} ORDER BY p.name", OVERVIEW_QUERY))
                .fetch_all(&self.db)
                .await?;

        Ok(products)
    }

    /// Get a product by id
    pub async fn get_product(&self, id: Uuid) -> AppResult<ProductOverview> {
        sqlx::query_as::<_, ProductOverview>(&format!("{} WHERE p.id = $1", OVERVIEW_QUERY))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Search products by name, SKU, description or manufacturer
    pub async fn search_products(&self, keyword: &str) -> AppResult<Vec<ProductOverview>> {
        let pattern = format!("%{}%", keyword);
        let products = sqlx::query_as::<_, ProductOverview>(&format!(
            r#"{}
            WHERE p.name ILIKE $1 OR p.sku ILIKE $1 OR p.description ILIKE $1
               OR p.manufacturer ILIKE $1
            ORDER BY p.name
            "#,
            OVERVIEW_QUERY
        ))
        .bind(&pattern)
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// Create a product
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        Self::check_sku(&input.sku)?;
        Self::check_thresholds(
            input.min_stock.unwrap_or(Decimal::ZERO),
            input.max_stock.unwrap_or(Decimal::from(999_999)),
        )?;
        self.check_placement(input.warehouse_id, input.location_id)
            .await?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, sku, description, manufacturer, category, unit,
                                  warehouse_id, location_id, min_stock, max_stock,
                                  unit_price, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                    COALESCE($9, 0), COALESCE($10, 999999), COALESCE($11, 0), $12)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.sku)
        .bind(&input.description)
        .bind(&input.manufacturer)
        .bind(&input.category)
        .bind(&input.unit)
        .bind(input.warehouse_id)
        .bind(input.location_id)
        .bind(input.min_stock)
        .bind(input.max_stock)
        .bind(input.unit_price)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "SKU"))?;

        Ok(product)
    }

    /// Update a product
    pub async fn update_product(&self, id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        let existing = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let sku = input.sku.unwrap_or(existing.sku);
        Self::check_sku(&sku)?;

        let min_stock = input.min_stock.unwrap_or(existing.min_stock);
        let max_stock = input.max_stock.unwrap_or(existing.max_stock);
        Self::check_thresholds(min_stock, max_stock)?;

        let warehouse_id = input.warehouse_id.or(existing.warehouse_id);
        let location_id = input.location_id.or(existing.location_id);
        self.check_placement(warehouse_id, location_id).await?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $1, sku = $2, description = $3, manufacturer = $4, category = $5,
                unit = $6, warehouse_id = $7, location_id = $8, min_stock = $9,
                max_stock = $10, unit_price = $11, notes = $12, is_active = $13,
                updated_at = now()
            WHERE id = $14
            RETURNING *
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(&sku)
        .bind(input.description.or(existing.description))
        .bind(input.manufacturer.or(existing.manufacturer))
        .bind(input.category.or(existing.category))
        .bind(input.unit.or(existing.unit))
        .bind(warehouse_id)
        .bind(location_id)
        .bind(min_stock)
        .bind(max_stock)
        .bind(input.unit_price.unwrap_or(existing.unit_price))
        .bind(input.notes.or(existing.notes))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "SKU"))?;

        Ok(product)
    }

    /// Delete a product. Refused while ledger or invoice rows reference it.
    pub async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT (SELECT COUNT(*) FROM stock_movements WHERE product_id = $1),
                   (SELECT COUNT(*) FROM invoice_items WHERE product_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if counts.0 > 0 || counts.1 > 0 {
            return Err(AppError::DependencyConflict {
                resource: "product".to_string(),
                dependents: vec![
                    BlockingDependents {
                        relation: "movements".to_string(),
                        count: counts.0,
                    },
                    BlockingDependents {
                        relation: "invoice_items".to_string(),
                        count: counts.1,
                    },
                ],
            });
        }

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }

    fn check_sku(sku: &str) -> AppResult<()> {
        validate_sku(sku).map_err(|msg| AppError::Validation {
            field: "sku".to_string(),
            message: msg.to_string(),
            message_vi: "SKU không hợp lệ".to_string(),
        })
    }

    fn check_thresholds(min_stock: Decimal, max_stock: Decimal) -> AppResult<()> {
        validate_stock_thresholds(min_stock, max_stock).map_err(|msg| AppError::Validation {
            field: "min_stock".to_string(),
            message: msg.to_string(),
            message_vi: "Ngưỡng tồn kho không hợp lệ".to_string(),
        })
    }

    /// Default placement must reference existing rows, and the location must
    /// belong to the given warehouse.
    async fn check_placement(
        &self,
        warehouse_id: Option<Uuid>,
        location_id: Option<Uuid>,
    ) -> AppResult<()> {
        if let Some(warehouse_id) = warehouse_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)",
            )
            .bind(warehouse_id)
            .fetch_one(&self.db)
            .await?;
            if !exists {
                return Err(AppError::NotFound("Warehouse".to_string()));
            }
        }

        if let Some(location_id) = location_id {
            let owner = sqlx::query_scalar::<_, Uuid>(
                "SELECT warehouse_id FROM locations WHERE id = $1",
            )
            .bind(location_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Location".to_string()))?;

            if let Some(warehouse_id) = warehouse_id {
                if owner != warehouse_id {
                    return Err(AppError::Validation {
                        field: "location_id".to_string(),
                        message: "Location does not belong to the selected warehouse".to_string(),
                        message_vi: "Vị trí không thuộc kho đã chọn".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
