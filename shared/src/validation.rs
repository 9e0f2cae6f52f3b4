//! Validation utilities for the Warehouse Management Platform
//!
//! Includes Vietnam-specific validations for compliance with local formats.

use rust_decimal::Decimal;

// ============================================================================
// Inventory Validations
// ============================================================================

/// Validate a movement quantity magnitude (must be strictly positive)
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate product stock thresholds
pub fn validate_stock_thresholds(min_stock: Decimal, max_stock: Decimal) -> Result<(), &'static str> {
    if min_stock < Decimal::ZERO {
        return Err("Minimum stock cannot be negative");
    }
    if max_stock < min_stock {
        return Err("Maximum stock cannot be below minimum stock");
    }
    Ok(())
}

/// Validate a SKU: 3-32 characters, uppercase alphanumeric with dashes
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.len() < 3 {
        return Err("SKU must be at least 3 characters");
    }
    if sku.len() > 32 {
        return Err("SKU must be at most 32 characters");
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("SKU must be uppercase alphanumeric with dashes");
    }
    Ok(())
}

/// Validate an entity code (warehouse, location, customer): 2-20 characters,
/// uppercase alphanumeric with dashes
pub fn validate_entity_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 2 {
        return Err("Code must be at least 2 characters");
    }
    if code.len() > 20 {
        return Err("Code must be at most 20 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("Code must be uppercase alphanumeric with dashes");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

// ============================================================================
// Vietnam-Specific Validations
// ============================================================================

/// Validate a Vietnamese phone number
/// Accepts: 0241234567, 024-1234-5678, +84241234567
pub fn validate_vn_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    // Domestic format: 10-11 digits starting with 0
    if (digits.len() == 10 || digits.len() == 11) && digits.starts_with('0') {
        return Ok(());
    }
    // International format with country code 84
    if (digits.len() == 11 || digits.len() == 12) && digits.starts_with("84") {
        return Ok(());
    }

    Err("Invalid Vietnamese phone number format")
}

/// Validate a Vietnamese enterprise tax code (mã số thuế)
/// 10 digits, or 13 digits for branches (10 + dash + 3, e.g. 0123456789-001)
pub fn validate_vn_tax_code(tax_code: &str) -> Result<(), &'static str> {
    let parts: Vec<&str> = tax_code.split('-').collect();

    match parts.as_slice() {
        [main] => {
            if main.len() == 10 && main.chars().all(|c| c.is_ascii_digit()) {
                Ok(())
            } else {
                Err("Tax code must be 10 digits")
            }
        }
        [main, branch] => {
            if main.len() == 10
                && branch.len() == 3
                && main.chars().all(|c| c.is_ascii_digit())
                && branch.chars().all(|c| c.is_ascii_digit())
            {
                Ok(())
            } else {
                Err("Branch tax code must be in format NNNNNNNNNN-NNN")
            }
        }
        _ => Err("Invalid tax code format"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Inventory Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(Decimal::from(1)).is_ok());
        assert!(validate_quantity(Decimal::new(1, 2)).is_ok());
        assert!(validate_quantity(Decimal::ZERO).is_err());
        assert!(validate_quantity(Decimal::from(-5)).is_err());
    }

    #[test]
    fn test_validate_stock_thresholds() {
        assert!(validate_stock_thresholds(Decimal::ZERO, Decimal::from(100)).is_ok());
        assert!(validate_stock_thresholds(Decimal::from(10), Decimal::from(10)).is_ok());
        assert!(validate_stock_thresholds(Decimal::from(-1), Decimal::from(10)).is_err());
        assert!(validate_stock_thresholds(Decimal::from(20), Decimal::from(10)).is_err());
    }

    #[test]
    fn test_validate_sku_valid() {
        assert!(validate_sku("LAP-DELL-001").is_ok());
        assert!(validate_sku("SKU1").is_ok());
        assert!(validate_sku("A-1").is_ok());
    }

    #[test]
    fn test_validate_sku_invalid() {
        assert!(validate_sku("ab").is_err()); // Too short
        assert!(validate_sku("lap-dell-001").is_err()); // Lowercase
        assert!(validate_sku("SKU 001").is_err()); // Space
        assert!(validate_sku(&"X".repeat(33)).is_err()); // Too long
    }

    #[test]
    fn test_validate_entity_code() {
        assert!(validate_entity_code("HN001").is_ok());
        assert!(validate_entity_code("CUST-001").is_ok());
        assert!(validate_entity_code("A").is_err());
        assert!(validate_entity_code("hn001").is_err());
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.com.vn").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@.").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
    }

    // ========================================================================
    // Vietnam-Specific Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_vn_phone_valid() {
        // Hanoi landline
        assert!(validate_vn_phone("0241234567").is_ok());
        // Mobile with dashes
        assert!(validate_vn_phone("090-1234-5678").is_ok());
        // International format
        assert!(validate_vn_phone("+84241234567").is_ok());
        assert!(validate_vn_phone("84901234567").is_ok());
    }

    #[test]
    fn test_validate_vn_phone_invalid() {
        assert!(validate_vn_phone("12345").is_err());
        assert!(validate_vn_phone("1234567890123").is_err());
        assert!(validate_vn_phone("abcdefghij").is_err());
    }

    #[test]
    fn test_validate_vn_tax_code_valid() {
        assert!(validate_vn_tax_code("0123456789").is_ok());
        assert!(validate_vn_tax_code("0123456789-001").is_ok());
    }

    #[test]
    fn test_validate_vn_tax_code_invalid() {
        assert!(validate_vn_tax_code("12345").is_err());
        assert!(validate_vn_tax_code("01234567890").is_err());
        assert!(validate_vn_tax_code("0123456789-1").is_err());
        assert!(validate_vn_tax_code("abcdefghij").is_err());
    }
}
