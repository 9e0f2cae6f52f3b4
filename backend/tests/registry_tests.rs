//! Registry validation and guard tests
//!
//! Covers natural-key validation and the dependency-guard decision applied
//! before registry deletes.

use rust_decimal::Decimal;

use shared::validation::{
    validate_entity_code, validate_quantity, validate_sku, validate_stock_thresholds,
    validate_vn_phone, validate_vn_tax_code,
};

// ============================================================================
// Natural Key Validation
// ============================================================================

#[cfg(test)]
mod key_tests {
    use super::*;

    #[test]
    fn test_sku_accepts_catalog_formats() {
        assert!(validate_sku("LAP-DELL-001").is_ok());
        assert!(validate_sku("PHONE-SAMS-001").is_ok());
        assert!(validate_sku("FURN-DESK-001").is_ok());
    }

    #[test]
    fn test_sku_rejects_malformed() {
        assert!(validate_sku("ab").is_err());
        assert!(validate_sku("lap-dell").is_err());
        assert!(validate_sku("SKU 001").is_err());
    }

    #[test]
    fn test_warehouse_and_customer_codes() {
        assert!(validate_entity_code("HN001").is_ok());
        assert!(validate_entity_code("HCM001").is_ok());
        assert!(validate_entity_code("CUST-001").is_ok());
        assert!(validate_entity_code("x").is_err());
    }

    #[test]
    fn test_stock_thresholds() {
        assert!(validate_stock_thresholds(Decimal::from(10), Decimal::from(100)).is_ok());
        assert!(validate_stock_thresholds(Decimal::from(10), Decimal::from(10)).is_ok());
        assert!(validate_stock_thresholds(Decimal::from(100), Decimal::from(10)).is_err());
    }

    #[test]
    fn test_quantities() {
        assert!(validate_quantity(Decimal::from(1)).is_ok());
        assert!(validate_quantity(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_vietnamese_contact_formats() {
        assert!(validate_vn_phone("024-1234-5678").is_ok());
        assert!(validate_vn_phone("+84901234567").is_ok());
        assert!(validate_vn_phone("12345").is_err());

        assert!(validate_vn_tax_code("0123456789").is_ok());
        assert!(validate_vn_tax_code("0123456789-001").is_ok());
        assert!(validate_vn_tax_code("123").is_err());
    }
}

// ============================================================================
// Dependency Guard Decision
// ============================================================================

#[cfg(test)]
mod guard_tests {
    /// The delete guard used by the registries: a delete proceeds only when
    /// every dependent relation reports zero rows.
    fn delete_allowed(dependent_counts: &[i64]) -> bool {
        dependent_counts.iter().all(|count| *count == 0)
    }

    #[test]
    fn test_delete_allowed_with_no_dependents() {
        // Warehouse with zero products and zero movements
        assert!(delete_allowed(&[0, 0]));
    }

    #[test]
    fn test_delete_blocked_by_products() {
        assert!(!delete_allowed(&[3, 0]));
    }

    #[test]
    fn test_delete_blocked_by_movements() {
        assert!(!delete_allowed(&[0, 12]));
    }

    #[test]
    fn test_delete_blocked_by_either() {
        assert!(!delete_allowed(&[3, 12]));
    }

    #[test]
    fn test_blocking_counts_are_reported() {
        // The conflict error carries the per-relation counts for the caller
        let counts = [3i64, 12i64];
        let blocking: Vec<(&str, i64)> = ["products", "movements"]
            .into_iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .collect();
        assert_eq!(blocking, vec![("products", 3), ("movements", 12)]);
    }
}
