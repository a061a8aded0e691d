//! NeoWs feed, lookup and risk prediction handlers

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, Local, NaiveDate};
use neo_risk_core::logic::ephemeris::synth::DATE_FORMAT;
use neo_risk_core::RiskResult;
use serde_json::Value;

use crate::models::asteroid::{feed_objects, AsteroidResponse, FeedQuery, FeedResponse, FlattenedAsteroid};
use crate::{AppError, AppResult, AppState};

/// NeoWs rejects feed windows longer than this
pub const MAX_FEED_DAYS: i64 = 7;

/// Validated `(start, end)` for a feed query; defaults to the last week
pub fn feed_window(query: &FeedQuery) -> AppResult<(String, String)> {
    let today = Local::now().date_naive();
    let start = parse_date_param(query.start.as_deref(), today - Duration::days(MAX_FEED_DAYS))?;
    let end = parse_date_param(query.end.as_deref(), today)?;

    if end < start {
        return Err(AppError::BadRequest("End date must not be before start date".to_string()));
    }
    if (end - start).num_days() > MAX_FEED_DAYS {
        return Err(AppError::BadRequest("Date range cannot exceed 7 days".to_string()));
    }

    Ok((start.format(DATE_FORMAT).to_string(), end.format(DATE_FORMAT).to_string()))
}

/// `YYYY-MM-DD` query value, or `default` when absent or blank
pub fn parse_date_param(raw: Option<&str>, default: NaiveDate) -> AppResult<NaiveDate> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(value) => NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map_err(|_| AppError::BadRequest(format!("Invalid date {:?}, expected YYYY-MM-DD", value))),
    }
}

/// Feed for a date window, flattened, one prediction per object
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<FeedResponse>> {
    let (start, end) = feed_window(&query)?;
    let feed = state.neows.feed(&start, &end).await?;

    let engine = state.engine.clone();
    let element_count = feed.get("element_count").and_then(Value::as_u64);
    let asteroids = tokio::task::spawn_blocking(move || {
        feed_objects(&feed)
            .iter()
            .map(|object| FlattenedAsteroid::new(object, engine.predict_value(object)))
            .collect::<Vec<_>>()
    })
    .await?;

    tracing::debug!("Feed {} to {}: {} objects", start, end, asteroids.len());

    Ok(Json(FeedResponse {
        asteroids,
        element_count,
        date_range: format!("{} to {}", start, end),
    }))
}

/// Single object with its prediction
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AsteroidResponse>> {
    let asteroid = state.neows.lookup(&id).await?;
    let risk_prediction = state.engine.predict_value(&asteroid);

    Ok(Json(AsteroidResponse { asteroid, risk_prediction }))
}

/// Predict from a posted object record
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<RiskResult>> {
    let no_data = || AppError::BadRequest("No asteroid data provided".to_string());

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(no_data());
    }

    let record: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    let is_empty = match &record {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if is_empty {
        return Err(no_data());
    }

    Ok(Json(state.engine.predict_value(&record)))
}
