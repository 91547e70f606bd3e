use anyhow::Context;
use skillsprout::{app, AppState, Catalog, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("skillsprout=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("reading configuration")?;
    let catalog = Catalog::builtin().context("loading course catalog")?;
    tracing::info!(
        classes = catalog.classes().len(),
        modules = catalog.total_modules(),
        admins = config.admin_users.len(),
        "catalog loaded"
    );

    let addr = config.addr;
    let app = app(AppState::new(catalog, config)?);

    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "SkillSprout v{} listening", env!("CARGO_PKG_VERSION"));

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
