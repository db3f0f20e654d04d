use std::sync::Arc;

use bizdash::anchor::{AnchorRegistry, AnchorResolver};
use bizdash::config::OnboardingConfig;
use bizdash::onboarding::{OnboardingManager, OnboardingRouteState, onboarding_routes};
use bizdash::store::{LibSqlBackend, SettingsStore};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = OnboardingConfig::from_env()?;

    let port: u16 = std::env::var("BIZDASH_PORT")
        .unwrap_or_else(|_| "8090".to_string())
        .parse()
        .unwrap_or(8090);

    let db_path =
        std::env::var("BIZDASH_DB_PATH").unwrap_or_else(|_| "./data/bizdash.db".to_string());

    eprintln!("📊 BizDash onboarding service v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{port}/api/onboarding/status");
    eprintln!("   Database: {db_path}");
    eprintln!(
        "   Auto-open delay: {}ms\n",
        config.auto_open_delay.as_millis()
    );

    let store: Arc<dyn SettingsStore> =
        Arc::new(LibSqlBackend::new_local(std::path::Path::new(&db_path)).await?);

    let anchors = Arc::new(AnchorRegistry::new());
    let resolver: Arc<dyn AnchorResolver> = anchors.clone();
    let manager = Arc::new(OnboardingManager::with_store(store, resolver, config).await);

    // Present the wizard to unfinished users shortly after startup.
    manager.arm_auto_open().await;

    let app = onboarding_routes(OnboardingRouteState { manager, anchors })
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!(port, "Onboarding API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
