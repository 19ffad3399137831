// src/bin/verify_schema.rs
//
// Confere se cada tabela/coluna usada pelos adaptadores existe no backend
// configurado. Sai com código 1 se faltar algo.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use sanep_backend::{schema::CheckStatus, Entities, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env()?;
    let entities = Entities::connect(&settings.backends).await?;
    let reports = entities.verify_schema().await;

    for report in &reports {
        let line = match &report.status {
            CheckStatus::Ok => "ok".to_string(),
            CheckStatus::MissingTable(detail) => format!("TABELA AUSENTE ({detail})"),
            CheckStatus::MissingColumns(columns) => {
                format!("colunas ausentes: {}", columns.join(", "))
            }
            CheckStatus::Skipped(reason) => format!("ignorado ({reason})"),
            CheckStatus::Failed(error) => format!("FALHOU: {error}"),
        };
        println!(
            "{:<14} {:<9} {:<22} {}",
            report.entity.as_str(),
            report.backend.as_str(),
            report.table,
            line
        );
    }

    let problems = reports.iter().filter(|r| r.is_problem()).count();
    if problems > 0 {
        eprintln!("❌ {problems} tabela(s) com problemas no esquema");
        return Ok(ExitCode::FAILURE);
    }

    println!("✅ Esquema compatível");
    Ok(ExitCode::SUCCESS)
}
