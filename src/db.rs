pub mod supplier_repo;
pub use supplier_repo::SupplierRepository;
pub mod stock_repo;
pub use stock_repo::StockRepository;
pub mod staff_repo;
pub use staff_repo::StaffRepository;
pub mod expense_repo;
pub use expense_repo::ExpenseRepository;
pub mod sale_repo;
pub use sale_repo::SaleRepository;
pub mod purchase_repo;
pub use purchase_repo::PurchaseRepository;
pub mod store_repo;
pub use store_repo::StoreRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;

pub mod backup_repo;
pub use backup_repo::PgBackupStore;
