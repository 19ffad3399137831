// src/services/dashboard_service.rs

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::Filter,
    entities::Entities,
    models::{
        dashboard::DashboardSummary,
        enrollment::EnrollmentStatus,
        payment::PaymentStatus,
        project::ProjectStatus,
        status::ActiveStatus,
    },
};

#[derive(Clone)]
pub struct DashboardService {
    entities: Entities,
}

impl DashboardService {
    pub fn new(entities: Entities) -> Self {
        Self { entities }
    }

    pub async fn summary(&self) -> Result<DashboardSummary, AppError> {
        let pending_enrollments = Filter::new().eq("status", EnrollmentStatus::Pendente);
        let ongoing_projects = Filter::new().eq("status", ProjectStatus::EmAndamento);

        // As consultas são independentes
        let (members, enrollments, payments, projects) = tokio::try_join!(
            self.entities.members.list(),
            self.entities.enrollments.filter(&pending_enrollments),
            self.entities.payments.list(),
            self.entities.projects.filter(&ongoing_projects),
        )?;

        let total_arrecadado: Decimal = payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Pago)
            .map(|p| p.valor)
            .sum();

        Ok(DashboardSummary {
            total_cooperados: members.len(),
            cooperados_ativos: members
                .iter()
                .filter(|m| m.status == ActiveStatus::Active)
                .count(),
            inscricoes_pendentes: enrollments.len(),
            pagamentos_pendentes: payments
                .iter()
                .filter(|p| p.status == PaymentStatus::Pendente)
                .count(),
            total_arrecadado,
            projetos_em_andamento: projects.len(),
        })
    }
}
