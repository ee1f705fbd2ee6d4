// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Backup ---
        handlers::backup::export_backup,
        handlers::backup::import_backup,
        handlers::backup::get_backup_summary,

        // --- Suppliers ---
        handlers::suppliers::list_suppliers,
        handlers::suppliers::create_supplier,
        handlers::suppliers::delete_supplier,

        // --- Stock ---
        handlers::stock_items::list_stock_items,
        handlers::stock_items::create_stock_item,
        handlers::stock_items::update_stock_item,
        handlers::stock_items::delete_stock_item,

        // --- Staff ---
        handlers::staff::list_employees,
        handlers::staff::create_employee,
        handlers::staff::update_employee,
        handlers::staff::delete_employee,
        handlers::staff::list_payments,
        handlers::staff::get_payment,
        handlers::staff::create_payment,
        handlers::staff::delete_payment,

        // --- Expenses ---
        handlers::expenses::list_categories,
        handlers::expenses::create_category,
        handlers::expenses::delete_category,
        handlers::expenses::list_expenses,
        handlers::expenses::create_expense,
        handlers::expenses::update_expense,
        handlers::expenses::delete_expense,

        // --- Sales ---
        handlers::sales::list_sales,
        handlers::sales::create_sale,
        handlers::sales::update_sale,
        handlers::sales::delete_sale,

        // --- Purchases ---
        handlers::purchases::list_purchases,
        handlers::purchases::create_purchase,
        handlers::purchases::delete_purchase,

        // --- Store ---
        handlers::store::get_store,
        handlers::store::save_store,

        // --- Dashboard ---
        handlers::dashboard::get_metrics,
        handlers::dashboard::get_low_stock,
        handlers::dashboard::get_chart_data,
    ),
    components(
        schemas(
            // --- Backup ---
            models::backup::BackupBundle,
            models::backup::BackupData,
            models::backup::BackupSummary,
            models::backup::RestoreReport,

            // --- Entidades ---
            models::supplier::Supplier,
            models::stock::StockItem,
            models::staff::Employee,
            models::staff::Payment,
            models::staff::PaymentListEntry,
            models::staff::PaymentDetail,
            models::expense::ExpenseCategory,
            models::expense::Expense,
            models::sale::Sale,
            models::purchase::Purchase,
            models::purchase::PurchaseItem,
            models::purchase::PurchaseWithItems,
            models::store::Store,
            models::dashboard::DashboardMetrics,
            models::dashboard::LowStockItem,
            models::dashboard::ChartDataPoint,

            // --- Payloads ---
            models::supplier::SupplierPayload,
            models::stock::StockItemPayload,
            models::staff::EmployeePayload,
            models::staff::PaymentPayload,
            models::expense::ExpenseCategoryPayload,
            models::expense::ExpensePayload,
            models::sale::SalePayload,
            models::purchase::PurchaseItemPayload,
            models::purchase::PurchasePayload,
            models::store::StorePayload,
        )
    ),
    tags(
        (name = "Backup", description = "Exportação, importação e resumo dos dados"),
        (name = "Suppliers", description = "Fornecedores"),
        (name = "Stock", description = "Itens de estoque"),
        (name = "Staff", description = "Funcionários e pagamentos"),
        (name = "Expenses", description = "Categorias e despesas"),
        (name = "Sales", description = "Vendas"),
        (name = "Purchases", description = "Compras e itens de compra"),
        (name = "Store", description = "Dados da loja"),
        (name = "Dashboard", description = "Indicadores do mês")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_backup_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/backup/export"));
        assert!(doc.paths.paths.contains_key("/api/backup/import"));
        assert!(doc.paths.paths.contains_key("/api/stock-items/{id}"));
        assert!(doc.paths.paths.contains_key("/api/dashboard/chart"));
    }
}
