//! Maintenance planning and incident service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Incident, MaintenancePlan, INCIDENT_STATUSES, PLAN_STATUSES, PRIORITY_LEVELS};

/// Maintenance service
#[derive(Clone)]
pub struct MaintenanceService {
    db: PgPool,
}

/// Input for creating a maintenance plan
#[derive(Debug, Deserialize)]
pub struct CreatePlanInput {
    pub warehouse_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub priority: Option<String>,
    pub planned_date: NaiveDate,
    pub estimated_duration_days: Option<i32>,
    pub estimated_cost: Option<Decimal>,
    pub responsible_staff: Option<String>,
    pub notes: Option<String>,
}

/// Input for updating a maintenance plan
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlanInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub priority: Option<String>,
    pub planned_date: Option<NaiveDate>,
    pub estimated_duration_days: Option<i32>,
    pub estimated_cost: Option<Decimal>,
    pub responsible_staff: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Input for reporting an incident
#[derive(Debug, Deserialize)]
pub struct ReportIncidentInput {
    pub warehouse_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub severity: Option<String>,
    pub reporter: Option<String>,
    pub phone: Option<String>,
}

/// Input for updating an incident; setting status to resolved stamps
/// the resolution time
#[derive(Debug, Default, Deserialize)]
pub struct UpdateIncidentInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub action: Option<String>,
    pub resolved_by: Option<String>,
}

/// Filters for plan and incident listings
#[derive(Debug, Default, Deserialize)]
pub struct MaintenanceFilter {
    pub warehouse_id: Option<Uuid>,
    pub status: Option<String>,
}

/// A plan with its warehouse name
#[derive(Debug, Serialize, FromRow)]
pub struct PlanOverview {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub plan: MaintenancePlan,
    pub warehouse_name: String,
}

/// An incident with its warehouse name
#[derive(Debug, Serialize, FromRow)]
pub struct IncidentOverview {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub incident: Incident,
    pub warehouse_name: String,
}

/// Aggregate maintenance counters
#[derive(Debug, Serialize, FromRow)]
pub struct MaintenanceStats {
    pub total_plans: i64,
    pub planned_plans: i64,
    pub in_progress_plans: i64,
    pub completed_plans: i64,
    pub total_incidents: i64,
    pub open_incidents: i64,
    pub resolved_incidents: i64,
    pub estimated_cost_total: Decimal,
}

impl MaintenanceService {
    /// Create a new MaintenanceService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List maintenance plans with optional warehouse/status filters
    pub async fn list_plans(&self, filter: MaintenanceFilter) -> AppResult<Vec<PlanOverview>> {
        let plans = sqlx::query_as::<_, PlanOverview>(
            r#"
            SELECT mp.*, w.name AS warehouse_name
            FROM maintenance_plans mp
            JOIN warehouses w ON mp.warehouse_id = w.id
            WHERE ($1::uuid IS NULL OR mp.warehouse_id = $1)
              AND ($2::text IS NULL OR mp.status = $2)
            ORDER BY mp.planned_date DESC
            "#,
        )
        .bind(filter.warehouse_id)
        .bind(filter.status)
        .fetch_all(&self.db)
        .await?;

        Ok(plans)
    }

    /// Get a plan by id
    pub async fn get_plan(&self, id: Uuid) -> AppResult<PlanOverview> {
        sqlx::query_as::<_, PlanOverview>(
            r#"
            SELECT mp.*, w.name AS warehouse_name
            FROM maintenance_plans mp
            JOIN warehouses w ON mp.warehouse_id = w.id
            WHERE mp.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Maintenance plan".to_string()))
    }

    /// Create a maintenance plan
    pub async fn create_plan(&self, input: CreatePlanInput) -> AppResult<MaintenancePlan> {
        self.ensure_warehouse_exists(input.warehouse_id).await?;
        if let Some(ref priority) = input.priority {
            Self::check_value("priority", priority, PRIORITY_LEVELS)?;
        }

        let plan = sqlx::query_as::<_, MaintenancePlan>(
            r#"
            INSERT INTO maintenance_plans (warehouse_id, title, description, kind, priority,
                                           planned_date, estimated_duration_days,
                                           estimated_cost, responsible_staff, notes)
            VALUES ($1, $2, $3, COALESCE($4, 'preventive'), COALESCE($5, 'medium'),
                    $6, COALESCE($7, 1), COALESCE($8, 0), $9, $10)
            RETURNING *
            "#,
        )
        .bind(input.warehouse_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.kind)
        .bind(&input.priority)
        .bind(input.planned_date)
        .bind(input.estimated_duration_days)
        .bind(input.estimated_cost)
        .bind(&input.responsible_staff)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(plan)
    }

    /// Update a maintenance plan
    pub async fn update_plan(&self, id: Uuid, input: UpdatePlanInput) -> AppResult<MaintenancePlan> {
        let existing =
            sqlx::query_as::<_, MaintenancePlan>("SELECT * FROM maintenance_plans WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Maintenance plan".to_string()))?;

        let status = input.status.unwrap_or(existing.status);
        Self::check_value("status", &status, PLAN_STATUSES)?;
        let priority = input.priority.unwrap_or(existing.priority);
        Self::check_value("priority", &priority, PRIORITY_LEVELS)?;

        let plan = sqlx::query_as::<_, MaintenancePlan>(
            r#"
            UPDATE maintenance_plans
            SET title = $1, description = $2, kind = $3, priority = $4, planned_date = $5,
                estimated_duration_days = $6, estimated_cost = $7, responsible_staff = $8,
                status = $9, notes = $10, updated_at = now()
            WHERE id = $11
            RETURNING *
            "#,
        )
        .bind(input.title.unwrap_or(existing.title))
        .bind(input.description.or(existing.description))
        .bind(input.kind.unwrap_or(existing.kind))
        .bind(&priority)
        .bind(input.planned_date.unwrap_or(existing.planned_date))
        .bind(
            input
                .estimated_duration_days
                .unwrap_or(existing.estimated_duration_days),
        )
        .bind(input.estimated_cost.unwrap_or(existing.estimated_cost))
        .bind(input.responsible_staff.or(existing.responsible_staff))
        .bind(&status)
        .bind(input.notes.or(existing.notes))
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(plan)
    }

    /// Delete a maintenance plan
    pub async fn delete_plan(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM maintenance_plans WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Maintenance plan".to_string()));
        }

        Ok(())
    }

    /// List incidents with optional warehouse/status filters
    pub async fn list_incidents(
        &self,
        filter: MaintenanceFilter,
    ) -> AppResult<Vec<IncidentOverview>> {
        let incidents = sqlx::query_as::<_, IncidentOverview>(
            r#"
            SELECT inc.*, w.name AS warehouse_name
            FROM incidents inc
            JOIN warehouses w ON inc.warehouse_id = w.id
            WHERE ($1::uuid IS NULL OR inc.warehouse_id = $1)
              AND ($2::text IS NULL OR inc.status = $2)
            ORDER BY inc.reported_at DESC
            "#,
        )
        .bind(filter.warehouse_id)
        .bind(filter.status)
        .fetch_all(&self.db)
        .await?;

        Ok(incidents)
    }

    /// Get an incident by id
    pub async fn get_incident(&self, id: Uuid) -> AppResult<IncidentOverview> {
        sqlx::query_as::<_, IncidentOverview>(
            r#"
            SELECT inc.*, w.name AS warehouse_name
            FROM incidents inc
            JOIN warehouses w ON inc.warehouse_id = w.id
            WHERE inc.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Incident".to_string()))
    }

    /// Report an incident
    pub async fn report_incident(&self, input: ReportIncidentInput) -> AppResult<Incident> {
        self.ensure_warehouse_exists(input.warehouse_id).await?;
        if let Some(ref severity) = input.severity {
            Self::check_value("severity", severity, PRIORITY_LEVELS)?;
        }

        let incident = sqlx::query_as::<_, Incident>(
            r#"
            INSERT INTO incidents (warehouse_id, title, description, kind, severity,
                                   reporter, phone)
            VALUES ($1, $2, $3, COALESCE($4, 'equipment'), COALESCE($5, 'medium'), $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.warehouse_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.kind)
        .bind(&input.severity)
        .bind(&input.reporter)
        .bind(&input.phone)
        .fetch_one(&self.db)
        .await?;

        Ok(incident)
    }

    /// Update an incident; moving it to resolved stamps `resolved_at`
    pub async fn update_incident(
        &self,
        id: Uuid,
        input: UpdateIncidentInput,
    ) -> AppResult<Incident> {
        let existing = sqlx::query_as::<_, Incident>("SELECT * FROM incidents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Incident".to_string()))?;

        let status = input.status.unwrap_or(existing.status);
        Self::check_value("status", &status, INCIDENT_STATUSES)?;
        let severity = input.severity.unwrap_or(existing.severity);
        Self::check_value("severity", &severity, PRIORITY_LEVELS)?;

        let resolved_at: Option<DateTime<Utc>> = if status == "resolved" {
            existing.resolved_at.or_else(|| Some(Utc::now()))
        } else {
            None
        };

        let incident = sqlx::query_as::<_, Incident>(
            r#"
            UPDATE incidents
            SET title = $1, description = $2, kind = $3, severity = $4, status = $5,
                action = $6, resolved_at = $7, resolved_by = $8, updated_at = now()
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(input.title.unwrap_or(existing.title))
        .bind(input.description.or(existing.description))
        .bind(input.kind.unwrap_or(existing.kind))
        .bind(&severity)
        .bind(&status)
        .bind(input.action.or(existing.action))
        .bind(resolved_at)
        .bind(input.resolved_by.or(existing.resolved_by))
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(incident)
    }

    /// Delete an incident
    pub async fn delete_incident(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM incidents WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Incident".to_string()));
        }

        Ok(())
    }

    /// Aggregate plan and incident counters
    pub async fn stats(&self, warehouse_id: Option<Uuid>) -> AppResult<MaintenanceStats> {
        let stats = sqlx::query_as::<_, MaintenanceStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM maintenance_plans
                 WHERE $1::uuid IS NULL OR warehouse_id = $1) AS total_plans,
                (SELECT COUNT(*) FROM maintenance_plans
                 WHERE status = 'planned' AND ($1::uuid IS NULL OR warehouse_id = $1)) AS planned_plans,
                (SELECT COUNT(*) FROM maintenance_plans
                 WHERE status = 'in_progress' AND ($1::uuid IS NULL OR warehouse_id = $1)) AS in_progress_plans,
                (SELECT COUNT(*) FROM maintenance_plans
                 WHERE status = 'completed' AND ($1::uuid IS NULL OR warehouse_id = $1)) AS completed_plans,
                (SELECT COUNT(*) FROM incidents
                 WHERE $1::uuid IS NULL OR warehouse_id = $1) AS total_incidents,
                (SELECT COUNT(*) FROM incidents
                 WHERE status <> 'resolved' AND ($1::uuid IS NULL OR warehouse_id = $1)) AS open_incidents,
                (SELECT COUNT(*) FROM incidents
                 WHERE status = 'resolved' AND ($1::uuid IS NULL OR warehouse_id = $1)) AS resolved_incidents,
                (SELECT COALESCE(SUM(estimated_cost), 0) FROM maintenance_plans
                 WHERE $1::uuid IS NULL OR warehouse_id = $1) AS estimated_cost_total
            "#,
        )
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        Ok(stats)
    }

    fn check_value(field: &str, value: &str, allowed: &[&str]) -> AppResult<()> {
        if allowed.contains(&value) {
            Ok(())
        } else {
            Err(AppError::Validation {
                field: field.to_string(),
                message: format!("Invalid {}: {}", field, value),
                message_vi: format!("Giá trị {} không hợp lệ", field),
            })
        }
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
