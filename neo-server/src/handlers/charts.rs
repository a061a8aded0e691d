//! Plotly chart handlers
//!
//! Charts are built from the same feed as `/asteroids`. A bad window or a
//! NeoWs failure yields the "no data" placeholder figure, never an error.
//! The `/visualizations/*` names are aliases of the `/plotly/*` charts.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Local;
use neo_risk_core::logic::features::vector::DEFAULT_DIAMETER_M;
use neo_risk_core::ObjectRecord;
use serde_json::Value;

use super::asteroids::feed_window;
use crate::models::asteroid::{feed_objects, FeedQuery};
use crate::models::chart::{self, Figure};
use crate::{AppResult, AppState};

async fn chart_objects(state: &AppState, query: &FeedQuery) -> Vec<Value> {
    let (start, end) = match feed_window(query) {
        Ok(window) => window,
        Err(e) => {
            tracing::warn!("Chart window rejected: {:?}", e);
            return Vec::new();
        }
    };

    match state.neows.feed(&start, &end).await {
        Ok(feed) => feed_objects(&feed),
        Err(e) => {
            tracing::warn!("Chart feed {} to {} unavailable: {}", start, end, e);
            Vec::new()
        }
    }
}

pub async fn violin_plot(State(state): State<AppState>, Query(query): Query<FeedQuery>) -> Json<Figure> {
    Json(chart::violin_plot(&chart_objects(&state, &query).await))
}

pub async fn box_plot(State(state): State<AppState>, Query(query): Query<FeedQuery>) -> Json<Figure> {
    Json(chart::box_plot(&chart_objects(&state, &query).await))
}

pub async fn sunburst(State(state): State<AppState>, Query(query): Query<FeedQuery>) -> Json<Figure> {
    Json(chart::sunburst_chart(&chart_objects(&state, &query).await))
}

pub async fn treemap(State(state): State<AppState>, Query(query): Query<FeedQuery>) -> Json<Figure> {
    Json(chart::treemap(&chart_objects(&state, &query).await))
}

pub async fn sankey(State(state): State<AppState>, Query(query): Query<FeedQuery>) -> Json<Figure> {
    Json(chart::sankey_diagram(&chart_objects(&state, &query).await))
}

pub async fn radar(State(state): State<AppState>, Query(query): Query<FeedQuery>) -> Json<Figure> {
    Json(chart::radar_chart(&chart_objects(&state, &query).await))
}

pub async fn parallel_coordinates(State(state): State<AppState>, Query(query): Query<FeedQuery>) -> Json<Figure> {
    Json(chart::parallel_coordinates(&chart_objects(&state, &query).await))
}

pub async fn polar(State(state): State<AppState>, Query(query): Query<FeedQuery>) -> Json<Figure> {
    Json(chart::polar_chart(&chart_objects(&state, &query).await))
}

// ThreadRng is !Send: create it after the last await

pub async fn scatter_3d(State(state): State<AppState>, Query(query): Query<FeedQuery>) -> Json<Figure> {
    let objects = chart_objects(&state, &query).await;
    let figure = chart::scatter_3d(&objects, &mut rand::thread_rng());
    Json(figure)
}

pub async fn timeline(State(state): State<AppState>, Query(query): Query<FeedQuery>) -> Json<Figure> {
    let objects = chart_objects(&state, &query).await;
    let figure = chart::animated_timeline(&objects, Local::now().date_naive(), &mut rand::thread_rng());
    Json(figure)
}

/// 2500 grid cells per object, built off the async workers
pub async fn contour(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<Figure>> {
    let objects = chart_objects(&state, &query).await;
    let figure = tokio::task::spawn_blocking(move || chart::contour_plot(&objects, &mut rand::thread_rng())).await?;
    Ok(Json(figure))
}

/// Heatmap of actual predictions by size
pub async fn risk_heatmap(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<Figure>> {
    let objects = chart_objects(&state, &query).await;
    let engine = state.engine.clone();

    let figure = tokio::task::spawn_blocking(move || {
        let predictions: Vec<_> = objects
            .iter()
            .map(|object| {
                let diameter = ObjectRecord::from_value(object)
                    .ok()
                    .and_then(|record| record.diameter_max_m)
                    .unwrap_or(DEFAULT_DIAMETER_M);
                (engine.predict_value(object).risk_level, diameter)
            })
            .collect();
        chart::risk_heatmap(&predictions)
    })
    .await?;

    Ok(Json(figure))
}
