//! Nira Server Entry Point

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use nira_config::{load_settings, Settings};
use nira_server::{create_router, init_metrics, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is normal outside local development
    let dotenv_path = dotenvy::dotenv().ok();

    // Priority: GEMINI_*/ZAPIER_*/PORT > NIRA__* > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("NIRA_ENV").ok();
    // Tracing not yet initialized. Invalid settings stop startup instead of
    // silently dropping the credential and webhook.
    let config = load_settings(env.as_deref()).map_err(|e| {
        eprintln!("Failed to load config: {}", e);
        e
    })?;
    eprintln!(
        "Loaded configuration from files (env: {})",
        env.as_deref().unwrap_or("default")
    );

    init_tracing(&config);

    tracing::info!("Starting Nira Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = config.environment.as_str(),
        config_path = env.as_deref().unwrap_or("default"),
        dotenv = ?dotenv_path,
        "Configuration loaded"
    );

    let mut state = AppState::from_settings(config.clone())?;

    if config.observability.metrics_enabled {
        match init_metrics() {
            Ok(handle) => {
                tracing::info!("Initialized Prometheus metrics at /metrics");
                state = state.with_metrics(handle);
            },
            Err(e) => tracing::warn!(error = %e, "Failed to install metrics recorder"),
        }
    }

    tracing::info!(
        gemini_configured = state.gemini_configured(),
        webhook_configured = state.contact.is_enabled(),
        "Initialized application state"
    );

    let app = create_router(state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("nira_server={level},nira_agent={level},nira_llm={level},nira_integrations={level},nira_config={level},tower_http=debug").into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
