//! Route definitions for the Warehouse Management Platform

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public + protected)
        .nest("/auth", auth_routes())
        // Protected routes - warehouse registry
        .nest("/warehouses", warehouse_routes())
        // Protected routes - storage locations
        .nest("/locations", location_routes())
        // Protected routes - product registry
        .nest("/products", product_routes())
        // Protected routes - customers
        .nest("/customers", customer_routes())
        // Protected routes - inventory ledger
        .nest("/movements", movement_routes())
        // Protected routes - stock queries
        .nest("/stock", stock_routes())
        // Protected routes - invoices
        .nest("/invoices", invoice_routes())
        // Protected routes - maintenance
        .nest("/maintenance", maintenance_routes())
        // Protected routes - reports
        .nest("/reports", report_routes())
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/verify", get(handlers::verify))
        .route("/change-password", put(handlers::change_password))
        .route_layer(middleware::from_fn(auth_middleware));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .merge(protected)
}

/// Warehouse registry routes (protected)
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_warehouses).post(handlers::create_warehouse))
        .route(
            "/:warehouse_id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .delete(handlers::delete_warehouse),
        )
        .route("/:warehouse_id/stats", get(handlers::get_warehouse_stats))
        .route("/:warehouse_id/area-usage", put(handlers::update_used_area))
        .route("/:warehouse_id/stock", get(handlers::get_warehouse_stock))
        .route("/:warehouse_id/locations", get(handlers::get_warehouse_locations))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Storage location routes (protected)
fn location_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_locations).post(handlers::create_location))
        .route("/occupancy", get(handlers::location_occupancy))
        .route(
            "/:location_id",
            get(handlers::get_location)
                .put(handlers::update_location)
                .delete(handlers::delete_location),
        )
        .route("/:location_id/status", put(handlers::update_location_status))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Product registry routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/search/:keyword", get(handlers::search_products))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:product_id/stock", get(handlers::get_product_stock))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Customer routes (protected)
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_customers).post(handlers::create_customer))
        .route(
            "/:customer_id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Inventory ledger routes (protected)
fn movement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_movements).post(handlers::record_movement))
        .route("/transfer", post(handlers::record_transfer))
        .route("/adjustment", post(handlers::record_adjustment))
        .route("/stats/summary", get(handlers::movement_summary))
        .route("/stats/daily", get(handlers::movement_daily_stats))
        .route(
            "/:movement_id",
            get(handlers::get_movement)
                .put(handlers::update_movement)
                .delete(handlers::delete_movement),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock query routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(handlers::low_stock_alerts))
        .route(
            "/:product_id/:warehouse_id/on-hand",
            get(handlers::get_on_hand),
        )
        .route(
            "/:product_id/:warehouse_id/status",
            get(handlers::get_stock_status),
        )
        .route(
            "/:product_id/:warehouse_id/value",
            get(handlers::get_inventory_value),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Invoice routes (protected)
fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_invoices).post(handlers::create_invoice))
        .route("/search/:keyword", get(handlers::search_invoices))
        .route("/stats/summary", get(handlers::invoice_stats))
        .route("/stats/monthly", get(handlers::invoice_monthly_stats))
        .route(
            "/:invoice_id",
            get(handlers::get_invoice)
                .put(handlers::update_invoice)
                .delete(handlers::delete_invoice),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Maintenance routes (protected)
fn maintenance_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(handlers::list_plans).post(handlers::create_plan))
        .route(
            "/plans/:plan_id",
            get(handlers::get_plan)
                .put(handlers::update_plan)
                .delete(handlers::delete_plan),
        )
        .route(
            "/incidents",
            get(handlers::list_incidents).post(handlers::report_incident),
        )
        .route(
            "/incidents/:incident_id",
            get(handlers::get_incident)
                .put(handlers::update_incident)
                .delete(handlers::delete_incident),
        )
        .route("/stats", get(handlers::maintenance_stats))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/overview", get(handlers::report_overview))
        .route(
            "/inventory-by-warehouse",
            get(handlers::report_inventory_by_warehouse),
        )
        .route("/movement-timeline", get(handlers::report_movement_timeline))
        .route("/revenue-timeline", get(handlers::report_revenue_timeline))
        .route("/top-products", get(handlers::report_top_products))
        .route(
            "/warehouse-efficiency",
            get(handlers::report_warehouse_efficiency),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
