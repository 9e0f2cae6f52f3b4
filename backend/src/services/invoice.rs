//! Invoice service
//!
//! Invoice headers and their line items are written together: the header and
//! every item commit in one transaction or not at all.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Invoice, InvoiceItem, InvoiceStatus};
use shared::validation::validate_quantity;

/// Invoice service
#[derive(Clone)]
pub struct InvoiceService {
    db: PgPool,
}

/// One line of an invoice input
#[derive(Debug, Deserialize)]
pub struct InvoiceItemInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub notes: Option<String>,
}

/// Input for creating or replacing an invoice
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceInput {
    pub invoice_number: String,
    pub customer_id: Uuid,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub tax_rate: Option<Decimal>,
    pub status: Option<InvoiceStatus>,
    pub notes: Option<String>,
    pub items: Vec<InvoiceItemInput>,
}

/// Invoice header with customer context and item count
#[derive(Debug, Serialize, FromRow)]
pub struct InvoiceOverview {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub invoice: Invoice,
    pub customer_name: String,
    pub customer_code: String,
    pub item_count: i64,
}

/// One invoice line with product context
#[derive(Debug, Serialize, FromRow)]
pub struct InvoiceItemDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: InvoiceItem,
    pub product_name: String,
    pub product_sku: String,
}

/// A full invoice: header plus lines
#[derive(Debug, Serialize)]
pub struct InvoiceWithItems {
    #[serde(flatten)]
    pub invoice: InvoiceOverview,
    pub items: Vec<InvoiceItemDetail>,
}

/// Aggregate invoice statistics
#[derive(Debug, Serialize, FromRow)]
pub struct InvoiceStatsSummary {
    pub total_invoices: i64,
    pub paid_invoices: i64,
    pub pending_invoices: i64,
    pub overdue_invoices: i64,
    pub total_revenue: Decimal,
    pub average_invoice_value: Decimal,
    pub first_invoice_date: Option<NaiveDate>,
    pub last_invoice_date: Option<NaiveDate>,
}

/// Per-month invoice totals for one year
#[derive(Debug, Serialize, FromRow)]
pub struct MonthlyInvoiceStats {
    pub month: i32,
    pub invoice_count: i64,
    pub total_revenue: Decimal,
    pub average_revenue: Decimal,
}

const OVERVIEW_QUERY: &str = r#"
    SELECT i.*, c.name AS customer_name, c.code AS customer_code,
           (SELECT COUNT(*) FROM invoice_items ii WHERE ii.invoice_id = i.id) AS item_count
    FROM invoices i
    JOIN customers c ON i.customer_id = c.id
"#;

impl InvoiceService {
    /// Create a new InvoiceService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all invoices, newest first
    pub async fn list_invoices(&self) -> AppResult<Vec<InvoiceOverview>> {
        let invoices = sqlx::query_as::<_, InvoiceOverview>(&format!(
            "{} ORDER BY i.invoice_date DESC, i.created_at DESC",
            OVERVIEW_QUERY
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(invoices)
    }

    /// Get an invoice with its lines
    pub async fn get_invoice(&self, id: Uuid) -> AppResult<InvoiceWithItems> {
        let invoice =
            sqlx::query_as::<_, InvoiceOverview>(&format!("{} WHERE i.id = $1", OVERVIEW_QUERY))
                .bind(id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Invoice".to_string()))?;

        let items = sqlx::query_as::<_, InvoiceItemDetail>(
            r#"
            SELECT ii.*, p.name AS product_name, p.sku AS product_sku
            FROM invoice_items ii
            JOIN products p ON ii.product_id = p.id
            WHERE ii.invoice_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(InvoiceWithItems { invoice, items })
    }

    /// Search invoices by number or customer
    pub async fn search_invoices(&self, keyword: &str) -> AppResult<Vec<InvoiceOverview>> {
        let pattern = format!("%{}%", keyword);
        let invoices = sqlx::query_as::<_, InvoiceOverview>(&format!(
            r#"{}
            WHERE i.invoice_number ILIKE $1 OR c.name ILIKE $1 OR c.code ILIKE $1
            ORDER BY i.invoice_date DESC
            "#,
            OVERVIEW_QUERY
        ))
        .bind(&pattern)
        .fetch_all(&self.db)
        .await?;

        Ok(invoices)
    }

    /// Create an invoice with its lines in one transaction
    pub async fn create_invoice(&self, input: CreateInvoiceInput) -> AppResult<InvoiceWithItems> {
        self.validate_input(&input).await?;

        let (subtotal, tax_amount, total) = Self::totals(&input);

        let mut tx = self.db.begin().await?;

        let invoice_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO invoices (invoice_number, customer_id, invoice_date, due_date,
                                  subtotal, tax_rate, tax_amount, total, status, notes)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0), $7, $8, COALESCE($9, 'draft'), $10)
            RETURNING id
            "#,
        )
        .bind(&input.invoice_number)
        .bind(input.customer_id)
        .bind(input.invoice_date)
        .bind(input.due_date)
        .bind(subtotal)
        .bind(input.tax_rate)
        .bind(tax_amount)
        .bind(total)
        .bind(input.status)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "invoice number"))?;

        Self::insert_items(&mut tx, invoice_id, &input.items).await?;

        tx.commit().await?;

        self.get_invoice(invoice_id).await
    }

    /// Replace an invoice's header and lines in one transaction
    pub async fn update_invoice(
        &self,
        id: Uuid,
        input: CreateInvoiceInput,
    ) -> AppResult<InvoiceWithItems> {
        self.validate_input(&input).await?;

        let (subtotal, tax_amount, total) = Self::totals(&input);

        let mut tx = self.db.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE invoices
            SET invoice_number = $1, customer_id = $2, invoice_date = $3, due_date = $4,
                subtotal = $5, tax_rate = COALESCE($6, 0), tax_amount = $7, total = $8,
                status = COALESCE($9, status), notes = $10, updated_at = now()
            WHERE id = $11
            "#,
        )
        .bind(&input.invoice_number)
        .bind(input.customer_id)
        .bind(input.invoice_date)
        .bind(input.due_date)
        .bind(subtotal)
        .bind(input.tax_rate)
        .bind(tax_amount)
        .bind(total)
        .bind(input.status)
        .bind(&input.notes)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "invoice number"))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Invoice".to_string()));
        }

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::insert_items(&mut tx, id, &input.items).await?;

        tx.commit().await?;

        self.get_invoice(id).await
    }

    /// Delete an invoice and its lines
    pub async fn delete_invoice(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Invoice".to_string()));
        }

        Ok(())
    }

    /// Aggregate invoice statistics over an optional date/customer window
    pub async fn stats_summary(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        customer_id: Option<Uuid>,
    ) -> AppResult<InvoiceStatsSummary> {
        let stats = sqlx::query_as::<_, InvoiceStatsSummary>(
            r#"
            SELECT COUNT(*) AS total_invoices,
                   COUNT(*) FILTER (WHERE status = 'paid') AS paid_invoices,
                   COUNT(*) FILTER (WHERE status = 'pending') AS pending_invoices,
                   COUNT(*) FILTER (WHERE status = 'overdue') AS overdue_invoices,
                   COALESCE(SUM(total), 0) AS total_revenue,
                   COALESCE(AVG(total), 0) AS average_invoice_value,
                   MIN(invoice_date) AS first_invoice_date,
                   MAX(invoice_date) AS last_invoice_date
            FROM invoices
            WHERE ($1::date IS NULL OR invoice_date >= $1)
              AND ($2::date IS NULL OR invoice_date <= $2)
              AND ($3::uuid IS NULL OR customer_id = $3)
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .bind(customer_id)
        .fetch_one(&self.db)
        .await?;

        Ok(stats)
    }

    /// Per-month invoice totals for one year
    pub async fn monthly_stats(&self, year: i32) -> AppResult<Vec<MonthlyInvoiceStats>> {
        let stats = sqlx::query_as::<_, MonthlyInvoiceStats>(
            r#"
            SELECT EXTRACT(MONTH FROM invoice_date)::int4 AS month,
                   COUNT(*) AS invoice_count,
                   COALESCE(SUM(total), 0) AS total_revenue,
                   COALESCE(AVG(total), 0) AS average_revenue
            FROM invoices
            WHERE EXTRACT(YEAR FROM invoice_date) = $1
            GROUP BY month
            ORDER BY month
            "#,
        )
        .bind(year)
        .fetch_all(&self.db)
        .await?;

        Ok(stats)
    }

    fn totals(input: &CreateInvoiceInput) -> (Decimal, Decimal, Decimal) {
        let subtotal: Decimal = input
            .items
            .iter()
            .map(|item| item.quantity * item.unit_price)
            .sum();
        let tax_amount = subtotal * input.tax_rate.unwrap_or(Decimal::ZERO) / Decimal::from(100);
        (subtotal, tax_amount, subtotal + tax_amount)
    }

    async fn validate_input(&self, input: &CreateInvoiceInput) -> AppResult<()> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Invoice must have at least one item".to_string(),
                message_vi: "Hóa đơn phải có ít nhất một dòng hàng".to_string(),
            });
        }
        for item in &input.items {
            if validate_quantity(item.quantity).is_err() {
                return Err(AppError::Validation {
                    field: "items.quantity".to_string(),
                    message: "Item quantity must be positive".to_string(),
                    message_vi: "Số lượng dòng hàng phải là số dương".to_string(),
                });
            }
        }

        let customer_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)",
        )
        .bind(input.customer_id)
        .fetch_one(&self.db)
        .await?;
        if !customer_exists {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        let product_ids: Vec<Uuid> = input.items.iter().map(|item| item.product_id).collect();
        let known = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT id) FROM products WHERE id = ANY($1)",
        )
        .bind(&product_ids)
        .fetch_one(&self.db)
        .await?;
        let distinct: std::collections::HashSet<Uuid> = product_ids.iter().copied().collect();
        if known != distinct.len() as i64 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }

    async fn insert_items(
        tx: &mut Transaction<'_, Postgres>,
        invoice_id: Uuid,
        items: &[InvoiceItemInput],
    ) -> AppResult<()> {
        for item in items {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (invoice_id, product_id, quantity, unit_price, total, notes)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(invoice_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.quantity * item.unit_price)
            .bind(&item.notes)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
