pub mod backup;
pub mod dashboard;
pub mod expenses;
pub mod purchases;
pub mod sales;
pub mod staff;
pub mod stock_items;
pub mod store;
pub mod suppliers;
