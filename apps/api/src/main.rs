mod analysis;
mod config;
mod dispatch;
mod errors;
mod llm_client;
mod parallax;
mod rate_limit;
mod routes;
mod state;
mod validation;

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::llm_client::gemini::GeminiProvider;
use crate::llm_client::groq::GroqProvider;
use crate::llm_client::{build_http_client, LlmProvider};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tact API v{}", env!("CARGO_PKG_VERSION"));

    // Provider order is the round-robin order.
    let http = build_http_client(config.provider_timeout)?;
    let providers: Vec<Arc<dyn LlmProvider>> = vec![
        Arc::new(GroqProvider::new(
            http.clone(),
            config.groq_api_key.clone(),
            config.groq_base_url.clone(),
            config.groq_model.clone(),
        )),
        Arc::new(GeminiProvider::new(
            http,
            config.gemini_api_key.clone(),
            config.gemini_base_url.clone(),
            config.gemini_model.clone(),
        )),
    ];

    let dispatcher = Dispatcher::new(providers, config.provider_timeout);
    let available = dispatcher.available_providers();
    if available.is_empty() {
        warn!("No LLM provider configured; set GROQ_API_KEY and/or GEMINI_API_KEY");
    } else {
        info!("LLM providers available: {:?}", available);
    }
    info!(
        "Rate limits: analyze {:?}, parallax {:?}",
        config.analyze_rate_limit, config.parallax_rate_limit
    );

    let cors = build_cors(&config.allowed_origins);

    // Build app state
    let state = AppState {
        dispatcher: Arc::new(dispatcher),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Tact API shut down");
    Ok(())
}

/// CORS restricted to the configured origins. Unparsable origins are skipped.
fn build_cors(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}
