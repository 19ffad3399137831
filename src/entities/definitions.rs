// src/entities/definitions.rs
//
// Onde cada entidade mora em cada backend, e as diferenças de campos do Base44.

use serde_json::{json, Value};

use super::{adapter::{Entity, EntityAdapter}, mapping::FieldRule, Entities, EntityKind};
use crate::db::Record;
use crate::models::{
    email::EmailLog,
    enrollment::Enrollment,
    member::{Credential, Member},
    notification::Notification,
    payment::Payment,
    plan::Plan,
    project::Project,
    user::CrmUser,
};

impl Entity for Member {
    const KIND: EntityKind = EntityKind::Members;
    const TABLE: &'static str = "cooperados";
    const BASE44_ENTITY: &'static str = "Cooperado";
    const COLUMNS: &'static [&'static str] = &[
        "id", "numero_associado", "nome_completo", "cpf", "email", "telefone",
        "data_nascimento", "endereco", "cidade", "estado", "cep", "plano_id",
        "status", "data_adesao", "created_at", "updated_at",
    ];
    const NATURAL_KEY: Option<&'static str> = Some("email");

    fn column_defaults() -> Record {
        defaults(json!({ "status": "ativo" }))
    }

    fn adapter(entities: &Entities) -> &EntityAdapter<Self> {
        &entities.members
    }
}

impl Entity for Credential {
    const KIND: EntityKind = EntityKind::Credentials;
    const TABLE: &'static str = "cooperado_auth";
    const BASE44_ENTITY: &'static str = "CooperadoAuth";
    const COLUMNS: &'static [&'static str] = &[
        "id", "cooperado_id", "email", "password_hash", "status", "ultimo_acesso", "created_at",
    ];
    const NATURAL_KEY: Option<&'static str> = Some("email");

    fn column_defaults() -> Record {
        defaults(json!({ "status": "ativo" }))
    }

    fn adapter(entities: &Entities) -> &EntityAdapter<Self> {
        &entities.credentials
    }
}

impl Entity for Plan {
    const KIND: EntityKind = EntityKind::Plans;
    const TABLE: &'static str = "planos";
    const BASE44_ENTITY: &'static str = "Plano";
    const COLUMNS: &'static [&'static str] = &[
        "id", "nome", "descricao", "valor_mensal", "taxa_inscricao", "status",
        "created_at", "updated_at",
    ];

    fn base44_rules() -> Vec<FieldRule> {
        vec![FieldRule::StatusAsBool {
            canonical: "status",
            native: "active",
            active: "ativo",
            inactive: "inativo",
        }]
    }

    fn column_defaults() -> Record {
        defaults(json!({ "status": "ativo", "taxa_inscricao": 0 }))
    }

    fn adapter(entities: &Entities) -> &EntityAdapter<Self> {
        &entities.plans
    }
}

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Projects;
    const TABLE: &'static str = "projetos";
    const BASE44_ENTITY: &'static str = "Projeto";
    const COLUMNS: &'static [&'static str] = &[
        "id", "titulo", "descricao", "localizacao", "valor_total", "valor_arrecadado",
        "unidades", "status", "data_inicio", "data_conclusao_prevista", "created_at",
        "updated_at",
    ];

    fn column_defaults() -> Record {
        defaults(json!({ "status": "planejamento" }))
    }

    fn adapter(entities: &Entities) -> &EntityAdapter<Self> {
        &entities.projects
    }
}

impl Entity for Payment {
    const KIND: EntityKind = EntityKind::Payments;
    const TABLE: &'static str = "pagamentos";
    const BASE44_ENTITY: &'static str = "Pagamento";
    const COLUMNS: &'static [&'static str] = &[
        "id", "cooperado_id", "plano_id", "valor", "tipo", "status", "data_vencimento",
        "data_pagamento", "descricao", "created_at", "updated_at",
    ];

    fn column_defaults() -> Record {
        defaults(json!({ "status": "pendente" }))
    }

    fn adapter(entities: &Entities) -> &EntityAdapter<Self> {
        &entities.payments
    }
}

impl Entity for Enrollment {
    const KIND: EntityKind = EntityKind::Enrollments;
    const TABLE: &'static str = "inscricoes_publicas";
    // A entidade legada do Base44 tem outro nome e alguns campos diferentes
    const BASE44_ENTITY: &'static str = "Inscricao";
    const COLUMNS: &'static [&'static str] = &[
        "id", "nome_completo", "cpf", "email", "telefone", "data_nascimento", "endereco",
        "cidade", "estado", "cep", "plano_id", "status", "documento_identidade_url",
        "comprovante_residencia_url", "comprovante_renda_url", "observacoes",
        "motivo_rejeicao", "cooperado_id", "data_aprovacao", "created_at", "updated_at",
    ];

    fn base44_rules() -> Vec<FieldRule> {
        vec![
            FieldRule::Rename { canonical: "nome_completo", native: "nome" },
            FieldRule::Rename { canonical: "plano_id", native: "plano_desejado_id" },
            FieldRule::NaiveTimestamp { canonical: "data_aprovacao", native: "data_aprovacao" },
        ]
    }

    fn column_defaults() -> Record {
        defaults(json!({ "status": "pendente" }))
    }

    fn adapter(entities: &Entities) -> &EntityAdapter<Self> {
        &entities.enrollments
    }
}

impl Entity for Notification {
    const KIND: EntityKind = EntityKind::Notifications;
    const TABLE: &'static str = "notificacoes";
    const BASE44_ENTITY: &'static str = "Notificacao";
    const COLUMNS: &'static [&'static str] = &[
        "id", "destinatario_id", "tipo", "titulo", "mensagem", "lida", "created_at",
    ];

    fn column_defaults() -> Record {
        defaults(json!({ "lida": false }))
    }

    fn adapter(entities: &Entities) -> &EntityAdapter<Self> {
        &entities.notifications
    }
}

impl Entity for CrmUser {
    const KIND: EntityKind = EntityKind::Users;
    const TABLE: &'static str = "crm_usuarios";
    const BASE44_ENTITY: &'static str = "UsuarioCrm";
    const COLUMNS: &'static [&'static str] = &[
        "id", "nome", "email", "password_hash", "perfil", "status", "ultimo_acesso",
        "created_at",
    ];
    const NATURAL_KEY: Option<&'static str> = Some("email");

    fn column_defaults() -> Record {
        defaults(json!({ "status": "ativo" }))
    }

    fn adapter(entities: &Entities) -> &EntityAdapter<Self> {
        &entities.users
    }
}

impl Entity for EmailLog {
    const KIND: EntityKind = EntityKind::EmailLogs;
    const TABLE: &'static str = "email_logs";
    const BASE44_ENTITY: &'static str = "EmailLog";
    const COLUMNS: &'static [&'static str] = &[
        "id", "destinatario", "template", "status", "erro", "created_at",
    ];

    fn adapter(entities: &Entities) -> &EntityAdapter<Self> {
        &entities.email_logs
    }
}

fn defaults(value: Value) -> Record {
    match value {
        Value::Object(record) => record,
        _ => Record::new(),
    }
}
