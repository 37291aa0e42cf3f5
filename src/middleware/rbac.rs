// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::{ApiError, AppError},
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::agent::{Agent, AgentRole},
};

/// 1. O Trait que define quais papéis passam pela rota
pub trait RoleDef: Send + Sync + 'static {
    fn allowed() -> &'static [AgentRole];
}

/// 2. O Extractor (Guardião). Entrega o assistente já verificado.
pub struct RequireRole<T>(pub Agent, pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        let AuthenticatedUser(agent) = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale))?;

        if !T::allowed().contains(&agent.role) {
            tracing::warn!("Acesso negado para {} ({:?})", agent.email, agent.role);
            return Err(AppError::Forbidden.to_api_error(&locale));
        }

        Ok(RequireRole(agent, PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn allowed() -> &'static [AgentRole] { &[AgentRole::Admin] }
}

pub type RequireAdmin = RequireRole<AdminOnly>;
