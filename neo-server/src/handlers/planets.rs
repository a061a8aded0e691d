//! Planet positions handler

use axum::{extract::State, Json};
use chrono::Local;
use neo_risk_core::logic::ephemeris::synth::DATE_FORMAT;

use crate::models::planet::{Planet, PlanetsResponse, PLANETS};
use crate::{AppResult, AppState};

/// Today's heliocentric position of every planet, queried concurrently;
/// a planet Horizons cannot place gets its fixed fallback
pub async fn list(State(state): State<AppState>) -> AppResult<Json<PlanetsResponse>> {
    let today = Local::now().date_naive();

    let handles: Vec<_> = PLANETS
        .iter()
        .map(|info| {
            let horizons = state.horizons.clone();
            let code = info.horizons_code;
            tokio::spawn(async move { horizons.planet_position(code, today).await })
        })
        .collect();

    let mut planets = Vec::with_capacity(PLANETS.len());
    for (info, handle) in PLANETS.iter().zip(handles) {
        let planet = match handle.await? {
            Ok(position) => Planet::at(info, position),
            Err(e) => {
                tracing::warn!("No Horizons vectors for {} ({}), using fallback position", info.name, e);
                Planet::fallback(info)
            }
        };
        planets.push(planet);
    }

    Ok(Json(PlanetsResponse {
        planets,
        date: today.format(DATE_FORMAT).to_string(),
        source: "NASA Horizons API",
    }))
}
