// src/backup/catalog.rs

/// Tipos de entidade que pertencem a um tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Store,
    Supplier,
    StockItem,
    Employee,
    Payment,
    ExpenseCategory,
    Expense,
    Sale,
    Purchase,
    PurchaseItem,
}

/// Filhos antes dos pais, para não violar chaves estrangeiras.
pub const DELETE_ORDER: [EntityKind; 10] = [
    EntityKind::Payment,
    EntityKind::Employee,
    EntityKind::PurchaseItem,
    EntityKind::Purchase,
    EntityKind::StockItem,
    EntityKind::Supplier,
    EntityKind::Expense,
    EntityKind::ExpenseCategory,
    EntityKind::Sale,
    EntityKind::Store,
];

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Store => "stores",
            EntityKind::Supplier => "suppliers",
            EntityKind::StockItem => "stock_items",
            EntityKind::Employee => "employees",
            EntityKind::Payment => "payments",
            EntityKind::ExpenseCategory => "expense_categories",
            EntityKind::Expense => "expenses",
            EntityKind::Sale => "sales",
            EntityKind::Purchase => "purchases",
            EntityKind::PurchaseItem => "purchase_items",
        }
    }

    /// Entidades referenciadas por chave estrangeira.
    pub fn parents(self) -> &'static [EntityKind] {
        match self {
            EntityKind::Payment => &[EntityKind::Employee],
            EntityKind::Expense => &[EntityKind::ExpenseCategory],
            EntityKind::Purchase => &[EntityKind::Supplier],
            EntityKind::PurchaseItem => &[EntityKind::Purchase, EntityKind::StockItem],
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(kind: EntityKind) -> usize {
        DELETE_ORDER.iter().position(|k| *k == kind).unwrap()
    }

    #[test]
    fn every_child_is_deleted_before_its_parents() {
        for child in DELETE_ORDER {
            for parent in child.parents() {
                assert!(
                    position(child) < position(*parent),
                    "{child:?} deve ser apagado antes de {parent:?}"
                );
            }
        }
    }

    #[test]
    fn delete_order_covers_every_kind_once() {
        let mut tables: Vec<_> = DELETE_ORDER.iter().map(|k| k.table()).collect();
        tables.sort_unstable();
        tables.dedup();
        assert_eq!(tables.len(), 10);
    }
}
