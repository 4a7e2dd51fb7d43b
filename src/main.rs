use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use api_tickets::api_router::configure_api_routes;
use api_tickets::config::AppConfig;
use api_tickets::llm::ClasificadorPrioridad;
use api_tickets::security::cors::{create_cors_layer, origin_gate, OriginValidator};
use api_tickets::shared::state::AppState;
use api_tickets::shared::utils::create_conn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;

    let pool = create_conn(&config.database_url())?;
    let clasificador = Arc::new(ClasificadorPrioridad::new(&config.clasificador)?);
    if config.clasificador.api_key.is_empty() {
        warn!("DEEPSEEK_API_KEY vacío: la clasificación IA resolverá siempre en Baja");
    }

    let validator = OriginValidator::new(
        config.cors.allowed_origins.clone(),
        config.cors.trusted_suffix.clone(),
    );
    let cors = create_cors_layer(validator.clone());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("dirección de escucha inválida: {e}"))?;
    let puerto = config.server.port;

    let state = Arc::new(AppState {
        conn: pool,
        config,
        clasificador,
    });

    let app = configure_api_routes()
        .with_state(state)
        .layer(axum::middleware::from_fn(
            move |req: axum::extract::Request, next: axum::middleware::Next| {
                let validator = validator.clone();
                async move { origin_gate(validator, req, next).await }
            },
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Servidor corriendo en el puerto {puerto}");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Servidor detenido");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("no se pudo instalar el manejador de Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("no se pudo instalar el manejador de SIGTERM")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
