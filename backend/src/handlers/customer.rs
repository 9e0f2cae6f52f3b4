//! HTTP handlers for customer registry endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::customer::{
    CreateCustomerInput, CustomerOverview, CustomerService, UpdateCustomerInput,
};
use crate::AppState;
use crate::models::Customer;

/// List all customers
pub async fn list_customers(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CustomerOverview>>> {
    let service = CustomerService::new(state.db);
    let customers = service.list_customers().await?;
    Ok(Json(customers))
}

/// Get a customer by id
pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<CustomerOverview>> {
    let service = CustomerService::new(state.db);
    let customer = service.get_customer(customer_id).await?;
    Ok(Json(customer))
}

/// Create a customer
pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CreateCustomerInput>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    let customer = service.create_customer(input).await?;
    Ok(Json(customer))
}

/// Update a customer
pub async fn update_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Json(input): Json<UpdateCustomerInput>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    let customer = service.update_customer(customer_id, input).await?;
    Ok(Json(customer))
}

/// Delete a customer (refused while invoices reference it)
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = CustomerService::new(state.db);
    service.delete_customer(customer_id).await?;
    Ok(Json(()))
}
