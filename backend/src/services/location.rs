//! Storage location registry service

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult, BlockingDependents};
use crate::models::{Location, LocationStatus};
use shared::validation::validate_entity_code;

/// Location registry service
#[derive(Clone)]
pub struct LocationService {
    db: PgPool,
}

/// Input for creating a location
#[derive(Debug, Deserialize)]
pub struct CreateLocationInput {
    pub warehouse_id: Uuid,
    pub code: String,
    pub name: String,
    pub kind: Option<String>,
    pub area: Option<Decimal>,
    pub capacity: Option<Decimal>,
    pub notes: Option<String>,
}

/// Input for updating a location
#[derive(Debug, Deserialize)]
pub struct UpdateLocationInput {
    pub code: Option<String>,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub area: Option<Decimal>,
    pub capacity: Option<Decimal>,
    pub status: Option<LocationStatus>,
    pub notes: Option<String>,
}

/// Filters for listing locations
#[derive(Debug, Default, Deserialize)]
pub struct LocationFilter {
    pub warehouse_id: Option<Uuid>,
    pub kind: Option<String>,
    pub status: Option<LocationStatus>,
}

/// A location with its warehouse and occupancy context
#[derive(Debug, Serialize, FromRow)]
pub struct LocationOverview {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub location: Location,
    pub warehouse_name: String,
    pub warehouse_code: String,
    pub product_count: i64,
}

/// Occupancy statistics for one warehouse's locations
#[derive(Debug, Serialize, FromRow)]
pub struct WarehouseOccupancy {
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub warehouse_code: String,
    pub total_locations: i64,
    pub available_locations: i64,
    pub occupied_locations: i64,
    pub full_locations: i64,
    pub maintenance_locations: i64,
    pub total_capacity: Decimal,
    pub total_products: i64,
}

impl LocationService {
    /// Create a new LocationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List locations with optional warehouse/kind/status filters
    pub async fn list_locations(&self, filter: LocationFilter) -> AppResult<Vec<LocationOverview>> {
        let locations = sqlx::query_as::<_, LocationOverview>(
            r#"
            SELECT l.*, w.name AS warehouse_name, w.code AS warehouse_code,
                   (SELECT COUNT(*) FROM products p WHERE p.location_id = l.id) AS product_count
            FROM locations l
            JOIN warehouses w ON l.warehouse_id = w.id
            WHERE ($1::uuid IS NULL OR l.warehouse_id = $1)
              AND ($2::text IS NULL OR l.kind = $2)
              AND ($3::location_status IS NULL OR l.status = $3)
            ORDER BY w.name, l.code
            "#,
        )
        .bind(filter.warehouse_id)
        .bind(filter.kind)
        .bind(filter.status)
        .fetch_all(&self.db)
        .await?;

        Ok(locations)
    }

    /// Get a location by id
    pub async fn get_location(&self, id: Uuid) -> AppResult<LocationOverview> {
        sqlx::query_as::<_, LocationOverview>(
            r#"
            SELECT l.*, w.name AS warehouse_name, w.code AS warehouse_code,
                   (SELECT COUNT(*) FROM products p WHERE p.location_id = l.id) AS product_count
            FROM locations l
            JOIN warehouses w ON l.warehouse_id = w.id
            WHERE l.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Location".to_string()))
    }

    /// Create a location. Codes are unique within a warehouse.
    pub async fn create_location(&self, input: CreateLocationInput) -> AppResult<Location> {
        Self::check_code(&input.code)?;

        let warehouse_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)",
        )
        .bind(input.warehouse_id)
        .fetch_one(&self.db)
        .await?;
        if !warehouse_exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        let location = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (warehouse_id, code, name, kind, area, capacity, notes)
            VALUES ($1, $2, $3, COALESCE($4, 'storage'), $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.warehouse_id)
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.kind)
        .bind(input.area)
        .bind(input.capacity)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "location code"))?;

        Ok(location)
    }

    /// Update a location
    pub async fn update_location(
        &self,
        id: Uuid,
        input: UpdateLocationInput,
    ) -> AppResult<Location> {
        let existing = sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Location".to_string()))?;

        let code = input.code.unwrap_or(existing.code);
        Self::check_code(&code)?;

        let location = sqlx::query_as::<_, Location>(
            r#"
            UPDATE locations
            SET code = $1, name = $2, kind = $3, area = $4, capacity = $5,
                status = $6, notes = $7, updated_at = now()
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&code)
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.kind.unwrap_or(existing.kind))
        .bind(input.area.or(existing.area))
        .bind(input.capacity.or(existing.capacity))
        .bind(input.status.unwrap_or(existing.status))
        .bind(input.notes.or(existing.notes))
        .bind(id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "location code"))?;

        Ok(location)
    }

    /// Change only the occupancy status of a location
    pub async fn update_status(&self, id: Uuid, status: LocationStatus) -> AppResult<Location> {
        sqlx::query_as::<_, Location>(
            "UPDATE locations SET status = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Location".to_string()))
    }

    /// Delete a location. Refused while products occupy it.
    pub async fn delete_location(&self, id: Uuid) -> AppResult<()> {
        let product_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE location_id = $1")
                .bind(id)
                .fetch_one(&self.db)
                .await?;

        if product_count > 0 {
            return Err(AppError::DependencyConflict {
                resource: "location".to_string(),
                dependents: vec![BlockingDependents {
                    relation: "products".to_string(),
                    count: product_count,
                }],
            });
        }

        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Location".to_string()));
        }

        Ok(())
    }

    /// Per-warehouse location occupancy statistics
    pub async fn occupancy_by_warehouse(&self) -> AppResult<Vec<WarehouseOccupancy>> {
        let stats = sqlx::query_as::<_, WarehouseOccupancy>(
            r#"
            SELECT w.id AS warehouse_id,
                   w.name AS warehouse_name,
                   w.code AS warehouse_code,
                   COUNT(l.id) AS total_locations,
                   COUNT(l.id) FILTER (WHERE l.status = 'available') AS available_locations,
                   COUNT(l.id) FILTER (WHERE l.status = 'occupied') AS occupied_locations,
                   COUNT(l.id) FILTER (WHERE l.status = 'full') AS full_locations,
                   COUNT(l.id) FILTER (WHERE l.status = 'maintenance') AS maintenance_locations,
                   COALESCE(SUM(l.capacity), 0) AS total_capacity,
                   (SELECT COUNT(*) FROM products p
                    JOIN locations pl ON p.location_id = pl.id
                    WHERE pl.warehouse_id = w.id) AS total_products
            FROM warehouses w
            LEFT JOIN locations l ON w.id = l.warehouse_id
            GROUP BY w.id
            ORDER BY w.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(stats)
    }

    fn check_code(code: &str) -> AppResult<()> {
        validate_entity_code(code).map_err(|msg| AppError::Validation {
            field: "code".to_string(),
            message: msg.to_string(),
            message_vi: "Mã vị trí không hợp lệ".to_string(),
        })
    }
}
