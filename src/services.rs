pub mod auth;
pub mod backup_service;
pub mod dashboard_service;
pub mod expense_service;
pub mod purchase_service;
pub mod sale_service;
pub mod staff_service;
pub mod stock_service;
pub mod store_service;
pub mod supplier_service;
