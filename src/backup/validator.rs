// src/backup/validator.rs
//
// O arquivo vem do usuário: nada aqui confia no formato antes de checar.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{
    backup::{BackupBundle, BackupData},
    purchase::{Purchase, PurchaseItem, PurchaseWithItems},
};

/// Maior versão de formato que esta versão do sistema entende.
const SUPPORTED_MAJOR_VERSION: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackupValidationError {
    #[error("O arquivo não é um JSON válido ({0})")]
    MalformedJson(String),

    #[error("Formato de backup inválido: os campos 'version' e 'data' são obrigatórios")]
    MissingFields,

    #[error("Versão de backup '{0}' não suportada")]
    UnsupportedVersion(String),

    #[error("Registro inválido em {path}: {message}")]
    InvalidRecord { path: String, message: String },
}

/// Checa o arquivo bruto e reconstrói o bundle tipado. Não toca no banco.
///
/// Ordem das checagens: JSON → `version`/`data` → versão → cada coleção,
/// parando na primeira violação.
pub fn validate(raw: &str) -> Result<BackupBundle, BackupValidationError> {
    let root: Value = serde_json::from_str(raw)
        .map_err(|e| BackupValidationError::MalformedJson(e.to_string()))?;

    let version = root
        .get("version")
        .and_then(Value::as_str)
        .filter(|v| !v.trim().is_empty())
        .ok_or(BackupValidationError::MissingFields)?;
    let data = root
        .get("data")
        .and_then(Value::as_object)
        .ok_or(BackupValidationError::MissingFields)?;

    check_version(version)?;

    let exported_at = match root.get("exportedAt") {
        None | Some(Value::Null) => None,
        Some(value) => Some(record(value, || "exportedAt".to_string())?),
    };
    // Só informativo: quem importa é sempre o tenant da sessão.
    let tenant_id = root
        .get("userId")
        .or_else(|| root.get("tenantId"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let data = BackupData {
        suppliers: collection(data, "suppliers")?,
        purchases: purchases(data)?,
        stock_items: collection(data, "stockItems")?,
        employees: collection(data, "employees")?,
        payments: collection(data, "payments")?,
        expense_categories: collection(data, "expenseCategories")?,
        expenses: collection(data, "expenses")?,
        sales: collection(data, "sales")?,
        store: match data.get("store") {
            None | Some(Value::Null) => None,
            Some(value) => Some(record(value, || "data.store".to_string())?),
        },
    };

    Ok(BackupBundle {
        version: version.to_string(),
        exported_at,
        tenant_id,
        data,
    })
}

/// Rejeita só majors maiores que o suportado. Versões fora do padrão
/// `major[.minor[.patch]]` passam (arquivos antigos).
fn check_version(version: &str) -> Result<(), BackupValidationError> {
    match major_version(version) {
        Some(major) if major > SUPPORTED_MAJOR_VERSION => {
            Err(BackupValidationError::UnsupportedVersion(version.to_string()))
        }
        _ => Ok(()),
    }
}

fn major_version(version: &str) -> Option<u64> {
    let parts: Vec<&str> = version.trim().split('.').collect();
    if parts.len() > 3 {
        return None;
    }
    let numbers: Option<Vec<u64>> = parts.iter().map(|p| p.parse().ok()).collect();
    numbers?.first().copied()
}

fn invalid(path: String, message: impl Into<String>) -> BackupValidationError {
    BackupValidationError::InvalidRecord {
        path,
        message: message.into(),
    }
}

fn record<T: DeserializeOwned>(
    value: &Value,
    path: impl FnOnce() -> String,
) -> Result<T, BackupValidationError> {
    T::deserialize(value).map_err(|e| invalid(path(), e.to_string()))
}

/// Coleção ausente ou `null` = nenhum registro daquele tipo.
fn elements<'a>(
    data: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a [Value], BackupValidationError> {
    match data.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(invalid(format!("data.{key}"), "deveria ser uma lista")),
    }
}

fn collection<T: DeserializeOwned>(
    data: &Map<String, Value>,
    key: &str,
) -> Result<Vec<T>, BackupValidationError> {
    elements(data, key)?
        .iter()
        .enumerate()
        .map(|(i, value)| record(value, || format!("data.{key}[{i}]")))
        .collect()
}

// Itens são checados antes da compra para o erro apontar o item exato.
// O `purchaseId` de cada item é descartado: o pai é a compra onde ele está aninhado.
fn purchases(data: &Map<String, Value>) -> Result<Vec<PurchaseWithItems>, BackupValidationError> {
    let mut out = Vec::new();

    for (i, value) in elements(data, "purchases")?.iter().enumerate() {
        let path = format!("data.purchases[{i}]");
        let fields = value
            .as_object()
            .ok_or_else(|| invalid(path.clone(), "deveria ser um objeto"))?;

        let raw_items = match fields.get("items") {
            None | Some(Value::Null) => &[][..],
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => return Err(invalid(format!("{path}.items"), "deveria ser uma lista")),
        };
        let mut items = raw_items
            .iter()
            .enumerate()
            .map(|(j, item)| record::<PurchaseItem>(item, || format!("{path}.items[{j}]")))
            .collect::<Result<Vec<_>, _>>()?;

        let purchase: Purchase = record(value, || path.clone())?;
        for item in &mut items {
            item.purchase_id = purchase.id;
        }
        out.push(PurchaseWithItems { purchase, items });
    }

    Ok(out)
}
