// src/services/auth.rs

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::Claims};

/// Valida os tokens emitidos pelo provedor de sessão. Login e cadastro
/// acontecem fora deste serviço; aqui só interessa o `sub` (tenant).
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
}

impl AuthService {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    pub fn validate_token(&self, token: &str) -> Result<Uuid, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "token rejeitado");
            AppError::InvalidToken
        })?;

        Ok(token_data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "segredo-de-teste";

    fn token(sub: Uuid, expires_in: Duration, secret: &str) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub,
            exp: (now + expires_in).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref())).unwrap()
    }

    #[test]
    fn valid_token_yields_its_subject_as_tenant() {
        let tenant = Uuid::new_v4();
        let service = AuthService::new(SECRET.into());
        let tenant_from_token = service.validate_token(&token(tenant, Duration::hours(1), SECRET));
        assert_eq!(tenant_from_token.unwrap(), tenant);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let service = AuthService::new(SECRET.into());
        let forged = token(Uuid::new_v4(), Duration::hours(1), "outro-segredo");
        assert_matches!(service.validate_token(&forged), Err(AppError::InvalidToken));
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = AuthService::new(SECRET.into());
        let expired = token(Uuid::new_v4(), Duration::hours(-2), SECRET);
        assert_matches!(service.validate_token(&expired), Err(AppError::InvalidToken));
    }

    #[test]
    fn garbage_is_rejected() {
        let service = AuthService::new(SECRET.into());
        assert_matches!(service.validate_token("abc.def"), Err(AppError::InvalidToken));
    }
}
