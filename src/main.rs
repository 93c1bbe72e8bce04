use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use certreg_backend::{api, config, db, state::AppState, store::CertificateStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "certreg_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing connection string is fatal / 缺少数据库连接串时直接退出
    let database_url = config::database_url()?;

    // Load configuration / 加载配置
    let app_config = config::load_config()?;
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    let pool = db::connect_cached(&database_url, app_config.database.max_connections).await?;
    db::run_migrations(&pool).await?;

    let store = CertificateStore::new(pool);
    match store.count().await {
        Ok(count) => tracing::info!("Certificate registry holds {} records", count),
        Err(e) => tracing::warn!("Could not count certificates: {}", e),
    }

    let state = Arc::new(AppState { store });
    let app = api::router(state);

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
