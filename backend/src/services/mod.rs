//! Business logic services for the Warehouse Management Platform

pub mod auth;
pub mod customer;
pub mod invoice;
pub mod ledger;
pub mod location;
pub mod maintenance;
pub mod product;
pub mod reporting;
pub mod stock;
pub mod warehouse;

pub use auth::AuthService;
pub use customer::CustomerService;
pub use invoice::InvoiceService;
pub use ledger::LedgerService;
pub use location::LocationService;
pub use maintenance::MaintenanceService;
pub use product::ProductService;
pub use reporting::ReportingService;
pub use stock::StockService;
pub use warehouse::WarehouseService;
