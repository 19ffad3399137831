// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Notificação para um cooperado (tabela `notificacoes`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: String,
    pub destinatario_id: String,

    #[schema(example = "boas_vindas")]
    pub tipo: String,

    pub titulo: String,
    pub mensagem: String,
    pub lida: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewNotification {
    pub destinatario_id: String,
    pub tipo: String,
    pub titulo: String,
    pub mensagem: String,
    pub lida: bool,
}
