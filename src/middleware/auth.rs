// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, models::agent::Agent};

// Emitidos fora deste serviço; aqui só validamos
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;

    Ok(token_data.claims)
}

// O middleware em si
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::InvalidToken)?;

    let claims = decode_token(token, &app_state.jwt_secret)?;
    let agent = app_state
        .agent_store
        .find_by_id(claims.sub)
        .await?
        .ok_or(AppError::InvalidToken)?;

    // Insere o assistente nos "extensions" da requisição
    request.extensions_mut().insert(AuthenticatedUser(agent));
    Ok(next.run(request).await)
}

// Extrator para obter o assistente autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Agent);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
pub fn token_for(agent_id: Uuid, secret: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now();
    let claims = Claims {
        sub: agent_id,
        exp: (now + chrono::Duration::hours(1)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref())).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_subject() {
        let id = Uuid::new_v4();
        let claims = decode_token(&token_for(id, "segredo"), "segredo").unwrap();
        assert_eq!(claims.sub, id);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let err = decode_token(&token_for(Uuid::new_v4(), "segredo"), "outro").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn malformed_token_is_unauthorized() {
        let err = decode_token("nao-e-um-jwt", "segredo").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
