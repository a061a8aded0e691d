//! NEO Risk Server
//!
//! Near-Earth object feed, risk prediction and orbit data API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      NEO RISK SERVER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌─────────────────┐  ┌───────────────────┐  │
//! │  │  Router   │  │  RiskEngine     │  │  Plotly figures   │  │
//! │  │  (Axum)   │  │  (Arc, r/o)     │  │                   │  │
//! │  └─────┬─────┘  └─────────────────┘  └───────────────────┘  │
//! │        ▼                                                    │
//! │  ┌──────────────────────────┐  ┌─────────────────────────┐  │
//! │  │ NeoWs: cache → retry     │  │ Horizons: 1 try →       │  │
//! │  │                          │  │ fallback synthesizer    │  │
//! │  └──────────────────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;
mod upstream;


use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use neo_risk_core::{RiskConfig, RiskEngine};
use tower::ServiceBuilder;
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

const DEFAULT_LOG_FILTER: &str = "neo_server=debug,neo_risk_core=info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging; `log` records from the core are bridged in
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("NEO Risk Server starting ({})", config.environment);
    tracing::info!("NeoWs: {}, Horizons: {}", config.nasa_base_url, config.horizons_url);

    // Models are loaded or trained before the listener binds
    let risk_config = RiskConfig::from_env();
    tracing::info!("Loading risk models from {}", risk_config.model_dir.display());
    let engine = tokio::task::spawn_blocking(move || RiskEngine::from_config(&risk_config))
        .await
        .context("model loading task panicked")?
        .context("failed to load or train risk models")?;

    // Build application state
    let state = AppState::new(&config, engine)?;

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: RiskEngine,
    pub neows: upstream::NeoWsClient,
    pub horizons: upstream::HorizonsClient,
}

impl AppState {
    pub fn new(config: &config::Config, engine: RiskEngine) -> Result<Self, upstream::UpstreamError> {
        let http = upstream::build_http_client(config)?;
        Ok(Self {
            engine,
            neows: upstream::NeoWsClient::new(http.clone(), config),
            horizons: upstream::HorizonsClient::new(http, &config.horizons_url),
        })
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let asteroid_routes = Router::new()
        .route("/asteroids", get(handlers::asteroids::list))
        .route("/asteroid/:id", get(handlers::asteroids::get))
        .route("/predict-risk", post(handlers::asteroids::predict));

    // Horizons-backed (fallback on failure)
    let horizons_routes = Router::new()
        .route("/asteroid/:id/horizons/ephemeris", get(handlers::horizons::ephemeris))
        .route("/asteroid/:id/horizons/orbital-elements", get(handlers::horizons::orbital_elements))
        .route("/asteroid/:id/horizons/close-approaches", get(handlers::horizons::close_approaches))
        .route("/asteroid/:id/enhanced-analysis", get(handlers::horizons::enhanced_analysis))
        .route("/planets", get(handlers::planets::list));

    let plotly_routes = Router::new()
        .route("/plotly/3d-scatter", get(handlers::charts::scatter_3d))
        .route("/plotly/animated-timeline", get(handlers::charts::timeline))
        .route("/plotly/risk-heatmap", get(handlers::charts::risk_heatmap))
        .route("/plotly/parallel-coordinates", get(handlers::charts::parallel_coordinates))
        .route("/plotly/sunburst", get(handlers::charts::sunburst))
        .route("/plotly/violin-plot", get(handlers::charts::violin_plot))
        .route("/plotly/radar-chart", get(handlers::charts::radar))
        .route("/plotly/sankey", get(handlers::charts::sankey))
        .route("/plotly/treemap", get(handlers::charts::treemap))
        .route("/plotly/box-plot", get(handlers::charts::box_plot))
        .route("/plotly/contour-plot", get(handlers::charts::contour))
        .route("/plotly/polar-chart", get(handlers::charts::polar));

    // Older dashboard names for the same figures
    let visualization_routes = Router::new()
        .route("/visualizations/size-distribution", get(handlers::charts::violin_plot))
        .route("/visualizations/risk-analysis", get(handlers::charts::sunburst))
        .route("/visualizations/magnitude-vs-size", get(handlers::charts::scatter_3d))
        .route("/visualizations/orbital-parameters", get(handlers::charts::parallel_coordinates))
        .route("/visualizations/time-series", get(handlers::charts::timeline))
        .route("/visualizations/physical-properties", get(handlers::charts::box_plot))
        .route("/visualizations/risk-comparison", get(handlers::charts::risk_heatmap));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(asteroid_routes)
        .merge(horizons_routes)
        .merge(plotly_routes)
        .merge(visualization_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any)
                )
                .layer(CompressionLayer::new())
        )
        .with_state(state)
}
