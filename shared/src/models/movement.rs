//! Stock movement (inventory ledger) models
//!
//! Every inventory change is one append-only row; on-hand stock is never a
//! stored counter but the signed sum of the matching rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Types of stock movements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "movement_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Inbound,
    Outbound,
    Transfer,
    Adjustment,
    Stocktake,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Inbound => "inbound",
            MovementType::Outbound => "outbound",
            MovementType::Transfer => "transfer",
            MovementType::Adjustment => "adjustment",
            MovementType::Stocktake => "stocktake",
        }
    }

    /// Whether a movement of this type must pass the stock sufficiency gate
    /// before it may be recorded.
    pub fn requires_sufficient_stock(&self) -> bool {
        matches!(self, MovementType::Outbound | MovementType::Transfer)
    }
}

/// One ledger row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockMovement {
    pub id: Uuid,
    pub movement_type: MovementType,
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub location_id: Option<Uuid>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub supplier: Option<String>,
    pub customer: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Signed contribution of one ledger row to the on-hand sum.
///
/// Only inbound and outbound rows carry stock effect; transfer, adjustment
/// and stocktake movements enter the ledger as audit entries while their
/// stock effect is recorded through inbound/outbound rows.
pub fn signed_quantity(movement_type: MovementType, quantity: Decimal) -> Decimal {
    match movement_type {
        MovementType::Inbound => quantity,
        MovementType::Outbound => -quantity,
        _ => Decimal::ZERO,
    }
}

/// Stock level classification against a product's thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Low,
    Normal,
    High,
}

/// Classify on-hand stock. The low test runs first, so a product whose
/// thresholds coincide with its on-hand quantity resolves to low.
pub fn stock_status(on_hand: Decimal, min_stock: Decimal, max_stock: Decimal) -> StockStatus {
    if on_hand <= min_stock {
        StockStatus::Low
    } else if on_hand >= max_stock {
        StockStatus::High
    } else {
        StockStatus::Normal
    }
}

/// Alert severity for low-stock reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Critical,
    Warning,
}

/// Low-stock alert level: critical at or below min stock, warning up to
/// 1.5x min stock, otherwise no alert.
pub fn alert_level(on_hand: Decimal, min_stock: Decimal) -> Option<AlertLevel> {
    let warning_ceiling = min_stock * Decimal::new(15, 1);
    if on_hand <= min_stock {
        Some(AlertLevel::Critical)
    } else if on_hand <= warning_ceiling {
        Some(AlertLevel::Warning)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn test_signed_quantity_directions() {
        assert_eq!(signed_quantity(MovementType::Inbound, dec(50)), dec(50));
        assert_eq!(signed_quantity(MovementType::Outbound, dec(30)), dec(-30));
        assert_eq!(signed_quantity(MovementType::Stocktake, dec(5)), Decimal::ZERO);
        assert_eq!(signed_quantity(MovementType::Adjustment, dec(5)), Decimal::ZERO);
    }

    #[test]
    fn test_stock_status_boundaries() {
        // on_hand == min_stock resolves low
        assert_eq!(stock_status(dec(10), dec(10), dec(100)), StockStatus::Low);
        // on_hand == max_stock resolves high
        assert_eq!(stock_status(dec(100), dec(10), dec(100)), StockStatus::High);
        assert_eq!(stock_status(dec(50), dec(10), dec(100)), StockStatus::Normal);
    }

    #[test]
    fn test_stock_status_tie_break_prefers_low() {
        // min == max == on_hand: low wins because it is tested first
        assert_eq!(stock_status(dec(20), dec(20), dec(20)), StockStatus::Low);
    }

    #[test]
    fn test_alert_levels() {
        assert_eq!(alert_level(dec(10), dec(10)), Some(AlertLevel::Critical));
        assert_eq!(alert_level(dec(14), dec(10)), Some(AlertLevel::Warning));
        assert_eq!(alert_level(dec(15), dec(10)), Some(AlertLevel::Warning));
        assert_eq!(alert_level(dec(16), dec(10)), None);
    }

    #[test]
    fn test_sufficiency_gate_types() {
        assert!(MovementType::Outbound.requires_sufficient_stock());
        assert!(MovementType::Transfer.requires_sufficient_stock());
        assert!(!MovementType::Inbound.requires_sufficient_stock());
        assert!(!MovementType::Adjustment.requires_sufficient_stock());
        assert!(!MovementType::Stocktake.requires_sufficient_stock());
    }
}
