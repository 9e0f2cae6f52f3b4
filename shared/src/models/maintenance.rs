//! Maintenance plan and incident models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A planned maintenance activity for a warehouse
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MaintenancePlan {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub kind: String,
    pub priority: String,
    pub planned_date: NaiveDate,
    pub estimated_duration_days: i32,
    pub estimated_cost: Decimal,
    pub responsible_staff: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A reported warehouse incident
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Incident {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub kind: String,
    pub severity: String,
    pub reported_at: DateTime<Utc>,
    pub reporter: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub action: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Allowed maintenance plan statuses
pub const PLAN_STATUSES: &[&str] = &["planned", "in_progress", "completed", "cancelled"];

/// Allowed incident statuses
pub const INCIDENT_STATUSES: &[&str] = &["reported", "investigating", "resolved"];

/// Allowed priorities / severities
pub const PRIORITY_LEVELS: &[&str] = &["low", "medium", "high", "critical"];
