pub mod auth;
pub mod backup;
pub mod dashboard;
pub mod expense;
pub mod purchase;
pub mod sale;
pub mod staff;
pub mod stock;
pub mod store;
pub mod supplier;

use rust_decimal::Decimal;
use validator::ValidationError;

// ---
// Validações customizadas compartilhadas pelos payloads
// ---
pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser positivo.".into());
        return Err(err);
    }
    Ok(())
}

/// Formulários mandam "" para campos opcionais não preenchidos.
pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
