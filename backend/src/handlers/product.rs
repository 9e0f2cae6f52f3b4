//! HTTP handlers for product registry endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::product::{
    CreateProductInput, ProductOverview, ProductService, UpdateProductInput,
};
use crate::services::stock::{ProductStock, StockService};
use crate::AppState;
use crate::models::Product;

/// List all products
pub async fn list_products(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductOverview>>> {
    let service = ProductService::new(state.db);
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// Get a product by id
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductOverview>> {
    let service = ProductService::new(state.db);
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

/// Search products by keyword
pub async fn search_products(
    State(state): State<AppState>,
    Path(keyword): Path<String>,
) -> AppResult<Json<Vec<ProductOverview>>> {
    let service = ProductService::new(state.db);
    let products = service.search_products(&keyword).await?;
    Ok(Json(products))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.create_product(input).await?;
    Ok(Json(product))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.update_product(product_id, input).await?;
    Ok(Json(product))
}

/// Delete a product (refused while ledger or invoice rows reference it)
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ProductService::new(state.db);
    service.delete_product(product_id).await?;
    Ok(Json(()))
}

/// Stock totals for a product at its default warehouse
pub async fn get_product_stock(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductStock>> {
    let service = StockService::new(state.db);
    let stock = service.product_stock(product_id).await?;
    Ok(Json(stock))
}
