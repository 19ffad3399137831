// src/services/notification_service.rs

use serde_json::json;

use crate::{
    common::error::AppError,
    db::Filter,
    entities::{Entities, Identifier},
    models::notification::Notification,
};

#[derive(Clone)]
pub struct NotificationService {
    entities: Entities,
}

impl NotificationService {
    pub fn new(entities: Entities) -> Self {
        Self { entities }
    }

    /// Notificações do cooperado, mais recentes primeiro.
    pub async fn list_for(&self, member_id: &str) -> Result<Vec<Notification>, AppError> {
        let mut notifications = self
            .entities
            .notifications
            .filter(&Filter::new().eq("destinatario_id", member_id))
            .await?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    /// Notificação de outro cooperado é tratada como inexistente.
    pub async fn mark_read(
        &self,
        member_id: &str,
        notification_id: &str,
    ) -> Result<Notification, AppError> {
        let not_found = || AppError::NotFound(format!("notificação '{}'", notification_id));

        let notification = self
            .entities
            .notifications
            .find_by_id(notification_id)
            .await?
            .ok_or_else(not_found)?;

        if notification.destinatario_id != member_id {
            return Err(not_found());
        }
        if notification.lida {
            return Ok(notification);
        }

        self.entities
            .notifications
            .update(&Identifier::Id(notification.id), &json!({ "lida": true }))
            .await
    }
}
