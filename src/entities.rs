// src/entities.rs

pub mod mapping;
pub use mapping::{FieldMapping, FieldRule};
pub mod adapter;
pub use adapter::{Entity, EntityAdapter, Identifier};
pub mod definitions;
pub mod facade;
pub use facade::Entities;

use std::{fmt, str::FromStr};

use serde::Serialize;

// Nome estável de cada entidade, usado nas sobrescritas de backend e nos relatórios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Members,
    Credentials,
    Plans,
    Projects,
    Payments,
    Enrollments,
    Notifications,
    Users,
    EmailLogs,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Members,
        EntityKind::Credentials,
        EntityKind::Plans,
        EntityKind::Projects,
        EntityKind::Payments,
        EntityKind::Enrollments,
        EntityKind::Notifications,
        EntityKind::Users,
        EntityKind::EmailLogs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Members => "members",
            EntityKind::Credentials => "credentials",
            EntityKind::Plans => "plans",
            EntityKind::Projects => "projects",
            EntityKind::Payments => "payments",
            EntityKind::Enrollments => "enrollments",
            EntityKind::Notifications => "notifications",
            EntityKind::Users => "users",
            EntityKind::EmailLogs => "email_logs",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Aceita tanto o nome da entidade quanto o nome da tabela no Supabase
impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "members" | "cooperados" => Ok(EntityKind::Members),
            "credentials" | "cooperado_auth" => Ok(EntityKind::Credentials),
            "plans" | "planos" => Ok(EntityKind::Plans),
            "projects" | "projetos" => Ok(EntityKind::Projects),
            "payments" | "pagamentos" => Ok(EntityKind::Payments),
            "enrollments" | "inscricoes_publicas" => Ok(EntityKind::Enrollments),
            "notifications" | "notificacoes" => Ok(EntityKind::Notifications),
            "users" | "crm_usuarios" => Ok(EntityKind::Users),
            "email_logs" => Ok(EntityKind::EmailLogs),
            other => Err(format!("entidade desconhecida: '{other}'")),
        }
    }
}
