//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sanep_backend::{build_router, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;
    tracing::info!(
        "Backend padrão: {} (sobrescritas: {})",
        settings.backends.default,
        settings.backends.overrides.len()
    );

    let app_state = AppState::new(&settings).await?;
    let app = build_router(app_state);

    let listener = TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Documentação em http://{}/docs", settings.server_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
