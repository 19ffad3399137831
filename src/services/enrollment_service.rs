// src/services/enrollment_service.rs

use chrono::{Duration, Utc};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::Filter,
    entities::{Entities, Identifier},
    models::{
        email::CredentialsEmail,
        enrollment::{
            normalize_cpf, ApprovalOutcome, Enrollment, EnrollmentPayload, EnrollmentStatus,
            NewEnrollment, PasswordResetOutcome,
        },
        member::{Member, NewCredential, NewMember},
        notification::NewNotification,
        payment::{NewPayment, PaymentKind, PaymentStatus},
        plan::Plan,
        status::ActiveStatus,
    },
    services::{
        auth::{generate_password, hash_password, normalize_email},
        email_service::EmailService,
    },
};

const APPROVAL_TEMPLATE: &str = "aprovacao_inscricao";
const RESET_TEMPLATE: &str = "redefinicao_senha";

// Prazo da taxa de inscrição
const ENROLLMENT_FEE_DUE_DAYS: i64 = 7;

/// Uma escrita já feita pela aprovação, e que sabe se desfazer.
#[derive(Debug)]
enum Step {
    Member(String),
    Credential(String),
    Payment(String),
}

#[derive(Clone)]
pub struct EnrollmentService {
    entities: Entities,
    email_service: EmailService,
}

impl EnrollmentService {
    pub fn new(entities: Entities, email_service: EmailService) -> Self {
        Self { entities, email_service }
    }

    // =========================================================================
    //  SUBMISSÃO PÚBLICA
    // =========================================================================

    pub async fn submit(&self, payload: EnrollmentPayload) -> Result<Enrollment, AppError> {
        payload.validate()?;

        let plan = self
            .entities
            .plans
            .find_by_id(&payload.plano_id)
            .await?
            .filter(|p| p.status == ActiveStatus::Active)
            .ok_or_else(|| AppError::Validation("Plano inexistente ou inativo.".to_string()))?;

        let cpf = normalize_cpf(&payload.cpf);
        let existing = self
            .entities
            .members
            .find_one(&Filter::new().eq("cpf", cpf.as_str()))
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "Já existe um cooperado com este CPF.".to_string(),
            ));
        }

        let mut fields = payload;
        fields.cpf = cpf;
        fields.email = normalize_email(&fields.email);

        let enrollment = self
            .entities
            .enrollments
            .create(&NewEnrollment { fields, status: EnrollmentStatus::Pendente })
            .await?;

        tracing::info!("📝 Nova inscrição {} para o plano '{}'", enrollment.id, plan.nome);
        Ok(enrollment)
    }

    // =========================================================================
    //  APROVAÇÃO (saga com compensação)
    // =========================================================================

    pub async fn approve(&self, enrollment_id: &str) -> Result<ApprovalOutcome, AppError> {
        let enrollment = self.pending(enrollment_id).await?;

        let plan = self
            .entities
            .plans
            .find_by_id(&enrollment.plano_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("plano '{}'", enrollment.plano_id)))?;

        let numero_associado = self.next_member_number().await?;
        let today = Utc::now().date_naive();

        let member = self
            .entities
            .members
            .create(&NewMember {
                numero_associado,
                nome_completo: enrollment.nome_completo.clone(),
                cpf: enrollment.cpf.clone(),
                email: enrollment.email.clone(),
                telefone: enrollment.telefone.clone(),
                data_nascimento: enrollment.data_nascimento,
                endereco: enrollment.endereco.clone(),
                cidade: enrollment.cidade.clone(),
                estado: enrollment.estado.clone(),
                cep: enrollment.cep.clone(),
                plano_id: Some(plan.id.clone()),
                status: ActiveStatus::Active,
                data_adesao: today,
            })
            .await?;

        let mut steps = vec![Step::Member(member.id.clone())];
        let password = match self.complete_approval(&enrollment, &plan, &member, &mut steps).await {
            Ok(password) => password,
            Err(e) => {
                tracing::error!(
                    "❌ Aprovação da inscrição {} falhou, desfazendo {} passo(s): {}",
                    enrollment.id,
                    steps.len(),
                    e
                );
                self.compensate(steps).await;
                return Err(e);
            }
        };

        tracing::info!(
            "✅ Inscrição {} aprovada: cooperado {}",
            enrollment.id,
            member.numero_associado
        );

        // Daqui em diante nada desfaz a aprovação
        let email = CredentialsEmail {
            to_email: member.email.clone(),
            to_name: member.nome_completo.clone(),
            numero_associado: member.numero_associado.clone(),
            senha: password.clone(),
            plano_nome: plan.nome.clone(),
            data_aprovacao: today.format("%d/%m/%Y").to_string(),
        };
        let email_enviado = self.email_service.send_credentials(APPROVAL_TEMPLATE, &email).await;

        let welcome = NewNotification {
            destinatario_id: member.id.clone(),
            tipo: "boas_vindas".to_string(),
            titulo: "Bem-vindo à Cooperativa Sanep".to_string(),
            mensagem: format!(
                "Sua inscrição foi aprovada. Seu número de associado é {}.",
                member.numero_associado
            ),
            lida: false,
        };
        if let Err(e) = self.entities.notifications.create(&welcome).await {
            tracing::warn!("Notificação de boas-vindas não criada para {}: {}", member.id, e);
        }

        Ok(ApprovalOutcome {
            cooperado: member,
            email_enviado,
            senha_provisoria: (!email_enviado).then_some(password),
        })
    }

    /// Credencial, taxa de inscrição e status da inscrição. Cada escrita
    /// concluída entra em `steps` para uma eventual compensação.
    async fn complete_approval(
        &self,
        enrollment: &Enrollment,
        plan: &Plan,
        member: &Member,
        steps: &mut Vec<Step>,
    ) -> Result<String, AppError> {
        let password = generate_password();
        let password_hash = hash_password(&password).await?;

        let credential = self
            .entities
            .credentials
            .create(&NewCredential {
                cooperado_id: member.id.clone(),
                email: member.email.clone(),
                password_hash,
                status: ActiveStatus::Active,
            })
            .await?;
        steps.push(Step::Credential(credential.id));

        let payment = self
            .entities
            .payments
            .create(&NewPayment {
                cooperado_id: member.id.clone(),
                plano_id: Some(plan.id.clone()),
                valor: plan.taxa_inscricao,
                tipo: PaymentKind::Inscricao,
                status: PaymentStatus::Pendente,
                data_vencimento: (Utc::now() + Duration::days(ENROLLMENT_FEE_DUE_DAYS)).date_naive(),
                descricao: Some(format!("Taxa de inscrição - {}", plan.nome)),
            })
            .await?;
        steps.push(Step::Payment(payment.id));

        self.entities
            .enrollments
            .update(
                &Identifier::Id(enrollment.id.clone()),
                &json!({
                    "status": EnrollmentStatus::Aprovado,
                    "cooperado_id": member.id,
                    "data_aprovacao": Utc::now(),
                }),
            )
            .await?;

        Ok(password)
    }

    // Ordem inversa; uma compensação que falha não impede as outras.
    async fn compensate(&self, steps: Vec<Step>) {
        for step in steps.into_iter().rev() {
            let result = match &step {
                Step::Payment(id) => self.entities.payments.delete(id).await,
                Step::Credential(id) => self.entities.credentials.delete(id).await,
                Step::Member(id) => self.entities.members.delete(id).await,
            };
            match result {
                Ok(()) => tracing::info!("↩️ Compensação concluída: {:?}", step),
                Err(e) => tracing::error!("❌ Compensação falhou ({:?}): {}", step, e),
            }
        }
    }

    // =========================================================================
    //  REJEIÇÃO E REDEFINIÇÃO DE SENHA
    // =========================================================================

    pub async fn reject(
        &self,
        enrollment_id: &str,
        motivo: Option<String>,
    ) -> Result<Enrollment, AppError> {
        let enrollment = self.pending(enrollment_id).await?;

        let rejected = self
            .entities
            .enrollments
            .update(
                &Identifier::Id(enrollment.id),
                &json!({
                    "status": EnrollmentStatus::Rejeitado,
                    "motivo_rejeicao": motivo,
                }),
            )
            .await?;

        tracing::info!("🚫 Inscrição {} rejeitada", rejected.id);
        Ok(rejected)
    }

    /// Nova senha para a credencial com este e-mail, enviada por e-mail.
    pub async fn reset_member_password(&self, email: &str) -> Result<PasswordResetOutcome, AppError> {
        let password = generate_password();
        let password_hash = hash_password(&password).await?;

        let credential = self
            .entities
            .credentials
            .update(
                &Identifier::NaturalKey(normalize_email(email)),
                &json!({ "password_hash": password_hash }),
            )
            .await?;

        let member = self
            .entities
            .members
            .find_by_id(&credential.cooperado_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("cooperado '{}'", credential.cooperado_id)))?;

        let plano_nome = match &member.plano_id {
            Some(plano_id) => self
                .entities
                .plans
                .find_by_id(plano_id)
                .await?
                .map(|p| p.nome)
                .unwrap_or_default(),
            None => String::new(),
        };

        let email = CredentialsEmail {
            to_email: credential.email.clone(),
            to_name: member.nome_completo,
            numero_associado: member.numero_associado,
            senha: password.clone(),
            plano_nome,
            data_aprovacao: Utc::now().format("%d/%m/%Y").to_string(),
        };
        let email_enviado = self.email_service.send_credentials(RESET_TEMPLATE, &email).await;

        tracing::info!("🔁 Senha redefinida para a credencial {}", credential.id);
        Ok(PasswordResetOutcome {
            email_enviado,
            senha_provisoria: (!email_enviado).then_some(password),
        })
    }

    // =========================================================================
    //  AUXILIARES
    // =========================================================================

    async fn pending(&self, enrollment_id: &str) -> Result<Enrollment, AppError> {
        let enrollment = self
            .entities
            .enrollments
            .find_by_id(enrollment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("inscrição '{}'", enrollment_id)))?;

        if enrollment.status != EnrollmentStatus::Pendente {
            return Err(AppError::Conflict(format!(
                "A inscrição já está com status '{}'.",
                enrollment.status.as_str()
            )));
        }
        Ok(enrollment)
    }

    /// "CS" + 6 dígitos, um acima do maior número existente. A UNIQUE de
    /// `numero_associado` barra duas aprovações simultâneas com o mesmo número.
    pub async fn next_member_number(&self) -> Result<String, AppError> {
        let highest = self
            .entities
            .members
            .list()
            .await?
            .iter()
            .filter_map(|m| parse_member_number(&m.numero_associado))
            .max()
            .unwrap_or(0);

        let next = highest
            .checked_add(1)
            .filter(|n| *n <= MAX_MEMBER_NUMBER)
            .ok_or_else(|| {
                tracing::error!("❌ Números de associado esgotados (último: {})", highest);
                AppError::Conflict("Não há mais números de associado disponíveis.".to_string())
            })?;

        Ok(format_member_number(next))
    }
}

const MAX_MEMBER_NUMBER: u32 = 999_999;

// Só "CS" + exatamente 6 dígitos; números cadastrados à mão fora do formato não contam.
fn parse_member_number(numero: &str) -> Option<u32> {
    let digits = numero.strip_prefix("CS")?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn format_member_number(n: u32) -> String {
    format!("CS{:06}", n)
}
