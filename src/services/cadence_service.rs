// src/services/cadence_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CadenceRepository,
    models::{agent::Agent, cadence::CadenceMessage},
};

pub fn validate_message(title: &str, content: &str, position: i32) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::invalid("title", "required"));
    }
    if content.trim().is_empty() {
        return Err(AppError::invalid("content", "required"));
    }
    if position < 1 {
        return Err(AppError::invalid("position", "must_be_positive"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CadenceService {
    repo: CadenceRepository,
}

impl CadenceService {
    pub fn new(repo: CadenceRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self, actor: &Agent) -> Result<Vec<CadenceMessage>, AppError> {
        self.repo.list_by_owner(actor.id).await
    }

    pub async fn create(
        &self,
        actor: &Agent,
        title: &str,
        content: &str,
        position: i32,
    ) -> Result<CadenceMessage, AppError> {
        validate_message(title, content, position)?;
        self.repo.insert(actor.id, title.trim(), content.trim(), position).await
    }

    pub async fn update(
        &self,
        actor: &Agent,
        id: Uuid,
        title: &str,
        content: &str,
        position: i32,
    ) -> Result<CadenceMessage, AppError> {
        validate_message(title, content, position)?;
        self.repo
            .update(id, actor.id, title.trim(), content.trim(), position)
            .await?
            .ok_or(AppError::RecordNotFound)
    }

    pub async fn toggle(&self, actor: &Agent, id: Uuid, active: bool) -> Result<CadenceMessage, AppError> {
        self.repo
            .set_active(id, actor.id, active)
            .await?
            .ok_or(AppError::RecordNotFound)
    }

    pub async fn delete(&self, actor: &Agent, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id, actor.id).await? {
            return Err(AppError::RecordNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_requires_title_content_and_position() {
        assert!(validate_message("Lembrete", "Olá!", 1).is_ok());
        assert!(matches!(
            validate_message(" ", "Olá!", 1),
            Err(AppError::InvalidField { field: "title", .. })
        ));
        assert!(matches!(
            validate_message("Lembrete", "", 1),
            Err(AppError::InvalidField { field: "content", .. })
        ));
        assert!(matches!(
            validate_message("Lembrete", "Olá!", 0),
            Err(AppError::InvalidField { field: "position", .. })
        ));
    }
}
