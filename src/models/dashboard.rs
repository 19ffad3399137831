// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// Os cards do topo do painel administrativo
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub total_cooperados: usize,
    pub cooperados_ativos: usize,
    pub inscricoes_pendentes: usize,
    pub pagamentos_pendentes: usize,
    pub total_arrecadado: Decimal, // soma dos pagamentos com status "pago"
    pub projetos_em_andamento: usize,
}
