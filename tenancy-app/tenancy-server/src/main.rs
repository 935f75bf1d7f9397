use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use tenancy_api::{build_router, AppState};
use tenancy_core::services::{ProvisioningService, SeedFile};
use tenancy_infrastructure::{
    create_pool, run_migrations, PgConnectionDescriptorRepository, PgLicenseRepository, PgTenantRepository,
};
use tenancy_shared::config::AppConfig;
use tenancy_shared::error::AppError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = tenancy_shared::telemetry::init_telemetry(config.app.log_dir.as_deref());

    info!(env = %config.app.env, "Tenancy server starting...");

    // Connect to Database
    let pool = create_pool(&config.database).await?;
    run_migrations(&pool).await?;
    info!("Database connection established.");

    let state = match AppState::new(
        config.clone(),
        Arc::new(PgTenantRepository::new(pool.clone())),
        Arc::new(PgLicenseRepository::new(pool.clone())),
        Arc::new(PgConnectionDescriptorRepository::new(pool)),
    ) {
        Ok(state) => state,
        Err(e) => {
            error!("Invalid tenancy configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(path) = config.tenancy.seed_file.as_deref() {
        apply_seed(path, &state.provisioning).await?;
    }

    let app = build_router(state).layer(cors_layer(&config));

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Tenancy server stopped");
    Ok(())
}

async fn apply_seed(path: &str, provisioning: &ProvisioningService) -> Result<(), AppError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::SeedError(format!("{}: {}", path, e)))?;
    let seed = SeedFile::from_json(&raw).map_err(|e| AppError::SeedError(e.to_string()))?;
    let report = seed
        .apply(provisioning)
        .await
        .map_err(|e| AppError::SeedError(e.to_string()))?;

    info!(
        path,
        created = report.tenants_created,
        updated = report.tenants_updated,
        licenses = report.licenses_issued,
        "Seed file applied"
    );
    Ok(())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .app
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
