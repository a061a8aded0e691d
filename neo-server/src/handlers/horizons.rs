//! Horizons-backed asteroid handlers
//!
//! These never fail because of Horizons: the client substitutes fallback
//! data. Only bad query dates (400) and, for the enhanced analysis, a failed
//! NeoWs lookup surface as errors.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, Local, NaiveDate};
use neo_risk_core::logic::ephemeris::orbital::earth_risk_metrics;
use neo_risk_core::logic::ephemeris::synth::DATE_FORMAT;
use neo_risk_core::logic::ephemeris::{point_count, OrbitalFeatures, StepSize, MAX_EPHEMERIS_POINTS};

use super::asteroids::parse_date_param;
use crate::models::asteroid::designation;
use crate::models::horizons::{
    CloseApproachesReply, EnhancedAnalysisReply, EphemerisReply, OrbitalElementsReply, TimeRange,
    TimeRangeQuery,
};
use crate::{AppError, AppResult, AppState};

const EPHEMERIS_DAYS: i64 = 30;
const APPROACH_DAYS: i64 = 365;

/// Horizons name for a NeoWs id; the id itself when the lookup fails
async fn resolve_designation(state: &AppState, id: &str) -> String {
    match state.neows.lookup(id).await {
        Ok(object) => designation(&object, id),
        Err(e) => {
            tracing::warn!("Lookup of {} failed ({}), querying Horizons by id", id, e);
            id.to_string()
        }
    }
}

fn query_range(query: &TimeRangeQuery, span_days: i64) -> AppResult<(NaiveDate, NaiveDate)> {
    let today = Local::now().date_naive();
    let start = parse_date_param(query.start_time.as_deref(), today)?;
    let end = parse_date_param(query.end_time.as_deref(), today + Duration::days(span_days))?;
    Ok((start, end))
}

fn ymd(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub async fn ephemeris(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<TimeRangeQuery>,
) -> AppResult<Json<EphemerisReply>> {
    let (start, end) = query_range(&query, EPHEMERIS_DAYS)?;
    let step = query.step_size.as_deref().map(StepSize::parse).unwrap_or_default();
    if point_count(start, end, step) > MAX_EPHEMERIS_POINTS {
        return Err(AppError::BadRequest(format!(
            "Time range and step size exceed {} ephemeris points",
            MAX_EPHEMERIS_POINTS
        )));
    }

    let designation = resolve_designation(&state, &id).await;
    let ephemeris_data = state.horizons.ephemeris(&designation, start, end, step).await;

    Ok(Json(EphemerisReply {
        asteroid_id: id,
        designation,
        ephemeris_data,
        time_range: TimeRange {
            start: ymd(start),
            end: ymd(end),
            step_size: Some(step.to_string()),
        },
        timestamp: now(),
    }))
}

pub async fn orbital_elements(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrbitalElementsReply>> {
    let designation = resolve_designation(&state, &id).await;
    let elements = state
        .horizons
        .orbital_elements(&designation, Local::now().date_naive())
        .await;

    Ok(Json(OrbitalElementsReply {
        asteroid_id: id,
        designation,
        orbital_elements: elements.into(),
        timestamp: now(),
    }))
}

pub async fn close_approaches(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<TimeRangeQuery>,
) -> AppResult<Json<CloseApproachesReply>> {
    let (start, end) = query_range(&query, APPROACH_DAYS)?;

    let designation = resolve_designation(&state, &id).await;
    let close_approaches = state.horizons.close_approaches(&designation, start, end).await;
    let risk_metrics = earth_risk_metrics(&close_approaches);

    Ok(Json(CloseApproachesReply {
        asteroid_id: id,
        designation,
        close_approaches,
        risk_metrics,
        time_range: TimeRange {
            start: ymd(start),
            end: ymd(end),
            step_size: None,
        },
        timestamp: now(),
    }))
}

/// Lookup, elements and a year of approaches combined with the basic prediction
pub async fn enhanced_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<EnhancedAnalysisReply>> {
    let basic_data = state.neows.lookup(&id).await?;
    let designation = designation(&basic_data, &id);

    let today = Local::now().date_naive();
    let (orbital_elements, close_approaches) = tokio::join!(
        state.horizons.orbital_elements(&designation, today),
        state
            .horizons
            .close_approaches(&designation, today, today + Duration::days(APPROACH_DAYS)),
    );

    let enhanced_features = OrbitalFeatures::derive(&orbital_elements, &close_approaches, today);
    let enhanced_risk_prediction = state.engine.predict_value(&basic_data);

    Ok(Json(EnhancedAnalysisReply {
        asteroid_id: id,
        basic_data,
        enhanced_features,
        orbital_elements,
        close_approaches,
        enhanced_risk_prediction,
        timestamp: now(),
    }))
}
