// tests/enrollment_workflow.rs

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::json;

use sanep_backend::{
    common::error::AppError,
    config::{AppState, Backend},
    db::{Filter, MemoryStore, Record, RemoteError, RemoteStore},
    entities::Entities,
    models::{
        email::{CredentialsEmail, EmailStatus},
        enrollment::{EnrollmentPayload, EnrollmentStatus},
        payment::{PaymentKind, PaymentStatus},
        plan::Plan,
        status::ActiveStatus,
    },
    services::email_service::{EmailError, EmailSender},
};

// =========================================================================
//  DUBLÊS
// =========================================================================

/// Guarda os e-mails "enviados"; pode ser configurado para falhar.
#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<CredentialsEmail>>,
    fail: bool,
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send_credentials(&self, email: &CredentialsEmail) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::Rejected { status: 400, body: "template inválido".into() });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Banco em memória que recusa inserções numa tabela específica.
struct FailingStore {
    inner: MemoryStore,
    fail_on: &'static str,
}

#[async_trait]
impl RemoteStore for FailingStore {
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, RemoteError> {
        self.inner.select(table, filter).await
    }

    async fn insert(&self, table: &str, record: Record) -> Result<Record, RemoteError> {
        if table == self.fail_on {
            return Err(RemoteError::Rejected(format!("falha simulada em '{}'", table)));
        }
        self.inner.insert(table, record).await
    }

    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        fields: Record,
    ) -> Result<Vec<Record>, RemoteError> {
        self.inner.update(table, filter, fields).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, RemoteError> {
        self.inner.delete(table, filter).await
    }
}

// =========================================================================
//  AUXILIARES
// =========================================================================

fn state_with(entities: Entities, sender: Arc<dyn EmailSender>) -> AppState {
    AppState::from_parts(entities, sender, "segredo-de-teste".to_string())
}

async fn seed_plan(entities: &Entities, status: &str) -> Plan {
    entities
        .plans
        .create(&json!({
            "nome": "Plano Habitacional Básico",
            "valor_mensal": 150.0,
            "taxa_inscricao": 300.0,
            "status": status
        }))
        .await
        .unwrap()
}

fn payload(plano_id: &str, cpf: &str) -> EnrollmentPayload {
    EnrollmentPayload {
        nome_completo: "Maria da Silva".into(),
        cpf: cpf.into(),
        email: "Maria@Email.com".into(),
        telefone: Some("(53) 99999-0000".into()),
        data_nascimento: None,
        endereco: Some("Rua A, 10".into()),
        cidade: Some("Pelotas".into()),
        estado: Some("RS".into()),
        cep: None,
        plano_id: plano_id.into(),
        documento_identidade_url: None,
        comprovante_residencia_url: None,
        comprovante_renda_url: None,
        observacoes: None,
    }
}

// =========================================================================
//  SUBMISSÃO
// =========================================================================

#[tokio::test]
async fn submission_normalizes_and_stores_pending_enrollment() {
    let entities = Entities::in_memory();
    let state = state_with(entities.clone(), Arc::new(RecordingSender::default()));
    let plan = seed_plan(&entities, "ativo").await;

    let enrollment = state
        .enrollment_service
        .submit(payload(&plan.id, "123.456.789-00"))
        .await
        .unwrap();

    assert_eq!(enrollment.status, EnrollmentStatus::Pendente);
    assert_eq!(enrollment.cpf, "12345678900");
    assert_eq!(enrollment.email, "maria@email.com");
    assert_eq!(enrollment.plano_id, plan.id);
}

#[tokio::test]
async fn submission_requires_an_active_plan() {
    let entities = Entities::in_memory();
    let state = state_with(entities.clone(), Arc::new(RecordingSender::default()));
    let plan = seed_plan(&entities, "inativo").await;

    let result = state.enrollment_service.submit(payload(&plan.id, "12345678900")).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let unknown = state.enrollment_service.submit(payload("nao-existe", "12345678900")).await;
    assert!(matches!(unknown, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn submission_rejects_cpf_of_existing_member() {
    let entities = Entities::in_memory();
    let state = state_with(entities.clone(), Arc::new(RecordingSender::default()));
    let plan = seed_plan(&entities, "ativo").await;

    let first = state
        .enrollment_service
        .submit(payload(&plan.id, "12345678900"))
        .await
        .unwrap();
    state.enrollment_service.approve(&first.id).await.unwrap();

    let again = state
        .enrollment_service
        .submit(payload(&plan.id, "123.456.789-00"))
        .await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
}

// =========================================================================
//  APROVAÇÃO
// =========================================================================

#[tokio::test]
async fn approval_creates_member_credential_fee_and_notification() {
    let entities = Entities::in_memory();
    let sender = Arc::new(RecordingSender::default());
    let state = state_with(entities.clone(), sender.clone());
    let plan = seed_plan(&entities, "ativo").await;

    let enrollment = state
        .enrollment_service
        .submit(payload(&plan.id, "12345678900"))
        .await
        .unwrap();
    let outcome = state.enrollment_service.approve(&enrollment.id).await.unwrap();

    let member = &outcome.cooperado;
    assert_eq!(member.numero_associado, "CS000001");
    assert_eq!(member.status, ActiveStatus::Active);
    assert_eq!(member.cpf, "12345678900");
    assert_eq!(member.plano_id.as_deref(), Some(plan.id.as_str()));
    assert!(outcome.email_enviado);
    assert!(outcome.senha_provisoria.is_none());

    // A senha do e-mail confere com o hash gravado
    let sent = sender.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].numero_associado, "CS000001");
    assert_eq!(sent[0].plano_nome, plan.nome);

    let credential = entities
        .credentials
        .find_unique(&Filter::new().eq("cooperado_id", member.id.as_str()))
        .await
        .unwrap()
        .unwrap();
    assert!(bcrypt::verify(&sent[0].senha, &credential.password_hash).unwrap());

    let payments = entities
        .payments
        .filter(&Filter::new().eq("cooperado_id", member.id.as_str()))
        .await
        .unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].tipo, PaymentKind::Inscricao);
    assert_eq!(payments[0].status, PaymentStatus::Pendente);
    assert_eq!(payments[0].valor, plan.taxa_inscricao);
    assert_eq!(
        payments[0].data_vencimento,
        (Utc::now() + Duration::days(7)).date_naive()
    );

    let approved = entities.enrollments.find_by_id(&enrollment.id).await.unwrap().unwrap();
    assert_eq!(approved.status, EnrollmentStatus::Aprovado);
    assert_eq!(approved.cooperado_id.as_deref(), Some(member.id.as_str()));
    assert!(approved.data_aprovacao.is_some());

    let notifications = state.notification_service.list_for(&member.id).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].tipo, "boas_vindas");

    let logs = entities.email_logs.list().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, EmailStatus::Enviado);

    // Uma inscrição só é aprovada uma vez
    let twice = state.enrollment_service.approve(&enrollment.id).await;
    assert!(matches!(twice, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn approval_is_undone_when_a_later_step_fails() {
    let failing = Arc::new(FailingStore {
        inner: MemoryStore::with_default_constraints(),
        fail_on: "pagamentos",
    });
    let entities = Entities::single(Backend::Memory, failing.clone());
    let state = state_with(entities.clone(), Arc::new(RecordingSender::default()));
    let plan = seed_plan(&entities, "ativo").await;

    let enrollment = state
        .enrollment_service
        .submit(payload(&plan.id, "12345678900"))
        .await
        .unwrap();
    let result = state.enrollment_service.approve(&enrollment.id).await;
    assert!(matches!(result, Err(AppError::Remote(RemoteError::Rejected(_)))));

    // Cooperado e credencial foram removidos; a inscrição continua pendente
    assert_eq!(failing.inner.row_count("cooperados").await, 0);
    assert_eq!(failing.inner.row_count("cooperado_auth").await, 0);
    assert_eq!(failing.inner.row_count("notificacoes").await, 0);
    let pending = entities.enrollments.find_by_id(&enrollment.id).await.unwrap().unwrap();
    assert_eq!(pending.status, EnrollmentStatus::Pendente);
    assert!(pending.cooperado_id.is_none());
}

#[tokio::test]
async fn failed_email_returns_the_provisional_password() {
    let entities = Entities::in_memory();
    let sender = Arc::new(RecordingSender { fail: true, ..Default::default() });
    let state = state_with(entities.clone(), sender);
    let plan = seed_plan(&entities, "ativo").await;

    let enrollment = state
        .enrollment_service
        .submit(payload(&plan.id, "12345678900"))
        .await
        .unwrap();
    let outcome = state.enrollment_service.approve(&enrollment.id).await.unwrap();

    assert!(!outcome.email_enviado);
    let password = outcome.senha_provisoria.expect("senha devolvida ao operador");
    assert_eq!(password.len(), 10);

    let logs = entities.email_logs.list().await.unwrap();
    assert_eq!(logs[0].status, EmailStatus::Falhou);
    assert!(logs[0].erro.as_deref().unwrap_or_default().contains("template inválido"));

    // A senha devolvida funciona no login do portal
    let token = state
        .auth_service
        .login_member(&outcome.cooperado.numero_associado, &password)
        .await
        .unwrap();
    assert!(!token.is_empty());
}

#[tokio::test]
async fn member_numbers_continue_from_the_highest() {
    let entities = Entities::in_memory();
    let state = state_with(entities.clone(), Arc::new(RecordingSender::default()));

    for (numero, cpf) in [("CS000041", "11111111111"), ("CS000007", "22222222222")] {
        entities
            .members
            .create(&json!({
                "numero_associado": numero,
                "nome_completo": "Antigo",
                "cpf": cpf,
                "email": format!("{}@email.com", numero),
                "status": "ativo"
            }))
            .await
            .unwrap();
    }

    let next = state.enrollment_service.next_member_number().await.unwrap();
    assert_eq!(next, "CS000042");
}

async fn seed_numbered_member(entities: &Entities, numero: &str, cpf: &str) {
    entities
        .members
        .create(&json!({
            "numero_associado": numero,
            "nome_completo": "Cadastro manual",
            "cpf": cpf,
            "email": format!("{}@email.com", numero.to_lowercase()),
            "status": "ativo"
        }))
        .await
        .unwrap();
}

#[tokio::test]
async fn numbers_outside_the_format_are_ignored() {
    let entities = Entities::in_memory();
    let state = state_with(entities.clone(), Arc::new(RecordingSender::default()));
    seed_numbered_member(&entities, "CS000010", "33333333333").await;
    seed_numbered_member(&entities, "CS4294967295", "44444444444").await;
    seed_numbered_member(&entities, "CS1000000", "55555555555").await;

    let next = state.enrollment_service.next_member_number().await.unwrap();
    assert_eq!(next, "CS000011");
}

#[tokio::test]
async fn exhausted_number_range_is_an_error() {
    let entities = Entities::in_memory();
    let state = state_with(entities.clone(), Arc::new(RecordingSender::default()));
    seed_numbered_member(&entities, "CS999999", "66666666666").await;

    let result = state.enrollment_service.next_member_number().await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

// =========================================================================
//  REJEIÇÃO E REDEFINIÇÃO DE SENHA
// =========================================================================

#[tokio::test]
async fn rejection_records_the_reason() {
    let entities = Entities::in_memory();
    let state = state_with(entities.clone(), Arc::new(RecordingSender::default()));
    let plan = seed_plan(&entities, "ativo").await;

    let enrollment = state
        .enrollment_service
        .submit(payload(&plan.id, "12345678900"))
        .await
        .unwrap();
    let rejected = state
        .enrollment_service
        .reject(&enrollment.id, Some("Documentação incompleta".into()))
        .await
        .unwrap();

    assert_eq!(rejected.status, EnrollmentStatus::Rejeitado);
    assert_eq!(rejected.motivo_rejeicao.as_deref(), Some("Documentação incompleta"));

    let approve = state.enrollment_service.approve(&enrollment.id).await;
    assert!(matches!(approve, Err(AppError::Conflict(_))));

    let missing = state.enrollment_service.reject("nao-existe", None).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn password_reset_updates_the_credential_by_email() {
    let entities = Entities::in_memory();
    let sender = Arc::new(RecordingSender::default());
    let state = state_with(entities.clone(), sender.clone());
    let plan = seed_plan(&entities, "ativo").await;

    let enrollment = state
        .enrollment_service
        .submit(payload(&plan.id, "12345678900"))
        .await
        .unwrap();
    let approved = state.enrollment_service.approve(&enrollment.id).await.unwrap();

    let outcome = state
        .enrollment_service
        .reset_member_password(" MARIA@email.com ")
        .await
        .unwrap();
    assert!(outcome.email_enviado);

    let sent = sender.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    let new_password = &sent[1].senha;
    assert_ne!(new_password, &sent[0].senha);

    let token = state
        .auth_service
        .login_member(&approved.cooperado.numero_associado, new_password)
        .await;
    assert!(token.is_ok());

    let unknown = state.enrollment_service.reset_member_password("ninguem@email.com").await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
}
