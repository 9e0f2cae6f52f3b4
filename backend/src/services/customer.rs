//! Customer registry service

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult, BlockingDependents};
use crate::models::Customer;
use shared::validation::{validate_entity_code, validate_vn_tax_code};

/// Customer registry service
#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

/// Input for creating a customer
#[derive(Debug, Deserialize)]
pub struct CreateCustomerInput {
    pub name: String,
    pub code: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub tax_code: Option<String>,
    pub credit_limit: Option<Decimal>,
    pub notes: Option<String>,
}

/// Input for updating a customer
#[derive(Debug, Deserialize)]
pub struct UpdateCustomerInput {
    pub name: Option<String>,
    pub code: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub tax_code: Option<String>,
    pub credit_limit: Option<Decimal>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// A customer with invoice totals
#[derive(Debug, Serialize, FromRow)]
pub struct CustomerOverview {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub customer: Customer,
    pub total_invoices: i64,
    pub total_revenue: Decimal,
}

const OVERVIEW_QUERY: &str = r#"
    SELECT c.*,
           COUNT(DISTINCT i.id) AS total_invoices,
           COALESCE(SUM(i.total), 0) AS total_revenue
    FROM customers c
    LEFT JOIN invoices i ON c.id = i.customer_id
"#;

impl CustomerService {
    /// Create a new CustomerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all customers with their invoice totals
    pub async fn list_customers(&self) -> AppResult<Vec<CustomerOverview>> {
        let customers = sqlx::query_as::<_, CustomerOverview>(&format!(
            "{} GROUP BY c.id ORDER BY c.name",
            OVERVIEW_QUERY
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(customers)
    }

    /// Get a customer by id
    pub async fn get_customer(&self, id: Uuid) -> AppResult<CustomerOverview> {
        sqlx::query_as::<_, CustomerOverview>(&format!(
            "{} WHERE c.id = $1 GROUP BY c.id",
            OVERVIEW_QUERY
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))
    }

    /// Create a customer
    pub async fn create_customer(&self, input: CreateCustomerInput) -> AppResult<Customer> {
        Self::check_code(&input.code)?;
        Self::check_tax_code(input.tax_code.as_deref())?;

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, code, contact_person, phone, email, address,
                                   city, country, tax_code, credit_limit, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'Vietnam'), $9,
                    COALESCE($10, 0), $11)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.country)
        .bind(&input.tax_code)
        .bind(input.credit_limit)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "customer code"))?;

        Ok(customer)
    }

    /// Update a customer
    pub async fn update_customer(
        &self,
        id: Uuid,
        input: UpdateCustomerInput,
    ) -> AppResult<Customer> {
        let existing = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        let code = input.code.unwrap_or(existing.code);
        Self::check_code(&code)?;
        let tax_code = input.tax_code.or(existing.tax_code);
        Self::check_tax_code(tax_code.as_deref())?;

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $1, code = $2, contact_person = $3, phone = $4, email = $5,
                address = $6, city = $7, country = $8, tax_code = $9,
                credit_limit = $10, status = $11, notes = $12, updated_at = now()
            WHERE id = $13
            RETURNING *
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(&code)
        .bind(input.contact_person.or(existing.contact_person))
        .bind(input.phone.or(existing.phone))
        .bind(input.email.or(existing.email))
        .bind(input.address.or(existing.address))
        .bind(input.city.or(existing.city))
        .bind(input.country.unwrap_or(existing.country))
        .bind(&tax_code)
        .bind(input.credit_limit.unwrap_or(existing.credit_limit))
        .bind(input.status.unwrap_or(existing.status))
        .bind(input.notes.or(existing.notes))
        .bind(id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "customer code"))?;

        Ok(customer)
    }

    /// Delete a customer. Refused while invoices reference it.
    pub async fn delete_customer(&self, id: Uuid) -> AppResult<()> {
        let invoice_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invoices WHERE customer_id = $1")
                .bind(id)
                .fetch_one(&self.db)
                .await?;

        if invoice_count > 0 {
            return Err(AppError::DependencyConflict {
                resource: "customer".to_string(),
                dependents: vec![BlockingDependents {
                    relation: "invoices".to_string(),
                    count: invoice_count,
                }],
            });
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        Ok(())
    }

    fn check_code(code: &str) -> AppResult<()> {
        validate_entity_code(code).map_err(|msg| AppError::Validation {
            field: "code".to_string(),
            message: msg.to_string(),
            message_vi: "Mã khách hàng không hợp lệ".to_string(),
        })
    }

    fn check_tax_code(tax_code: Option<&str>) -> AppResult<()> {
        if let Some(tax_code) = tax_code {
            validate_vn_tax_code(tax_code).map_err(|msg| AppError::Validation {
                field: "tax_code".to_string(),
                message: msg.to_string(),
                message_vi: "Mã số thuế không hợp lệ".to_string(),
            })?;
        }
        Ok(())
    }
}
