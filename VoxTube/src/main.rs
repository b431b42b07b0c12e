use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use voxskill::{RequestEnvelope, SkillController, SkillDispatcher};
use voxtube::{TubeClient, TubeConfigExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== PHASE 1 : Configuration ==========

    let config = voxconfig::get_config();

    let min_level = config
        .get_log_min_level()
        .unwrap_or_else(|_| "INFO".to_string());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.to_lowercase()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(config_dir=%config.directory(), "Configuration loaded");

    // La clé d'API est une condition fatale au démarrage, jamais une erreur
    // par requête.
    config.get_tube_api_key().context(
        "Catalog API key missing: set accounts.tube.api_key in config.yaml \
         or VOXTUBE_CONFIG__ACCOUNTS__TUBE__API_KEY",
    )?;

    // ========== PHASE 2 : Construction du skill ==========

    info!("🎵 Building stream resolver...");
    let resolver = Arc::new(TubeClient::from_config()?);

    info!("🎚️ Building playback controller...");
    let controller = Arc::new(SkillController::new(resolver));
    let dispatcher = Arc::new(SkillDispatcher::new(controller));

    // ========== PHASE 3 : Démarrage du serveur ==========

    let app = Router::new()
        .route("/skill", post(handle_skill))
        .route("/healthz", get(handle_health))
        .with_state(dispatcher);

    let port = config.get_http_port();
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Cannot bind HTTP port {port}"))?;

    info!("🌐 Skill endpoint ready at http://0.0.0.0:{port}/skill");
    info!("✅ VoxTube is ready!");
    info!("Press Ctrl+C to stop...");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("VoxTube stopped");
    Ok(())
}

/// Webhook du skill : une enveloppe de requête en entrée, une réponse
/// utilisateur en sortie.
///
/// Les échecs récupérables sont déjà repliés en réponse d'excuse par le
/// dispatcher ; seule une violation de contrat (événement de cycle de vie
/// inconnu) ressort ici, en 500.
async fn handle_skill(
    State(dispatcher): State<Arc<SkillDispatcher>>,
    Json(envelope): Json<RequestEnvelope>,
) -> Response {
    match dispatcher.dispatch(envelope).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!("Skill dispatch failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
}
