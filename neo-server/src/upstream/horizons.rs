//! JPL Horizons client
//!
//! One attempt per call. Any failure (transport, HTTP status, an `error`
//! field, an unparsable report) is logged and replaced with fallback data,
//! so the asteroid-facing methods never fail.

use chrono::{Duration, NaiveDate};
use neo_risk_core::logic::ephemeris::orbital::{fallback_close_approach, fallback_elements};
use neo_risk_core::logic::ephemeris::parse::{
    parse_close_approaches, parse_ephemeris, parse_orbital_elements, parse_planet_position,
};
use neo_risk_core::logic::ephemeris::synth::DATE_FORMAT;
use neo_risk_core::logic::ephemeris::{
    synthesize, CloseApproach, EphemerisResponse, OrbitalElements, StepSize,
};
use reqwest::Client;
use serde_json::Value;

use super::{json_body, UpstreamError};

/// Solar-system barycenter
const CENTER: &str = "500@10";

#[derive(Clone)]
pub struct HorizonsClient {
    http: Client,
    url: String,
}

impl HorizonsClient {
    pub fn new(http: Client, url: &str) -> Self {
        Self { http, url: url.to_string() }
    }

    /// `COMMAND` value for a designation: `(2015 HN9)` loses its
    /// parentheses, numeric ids become `DES=<id>;`, names are quoted
    pub fn command_for(designation: &str) -> String {
        let trimmed = designation.trim();
        let bare = trimmed
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(trimmed);

        if !bare.is_empty() && bare.chars().all(|c| c.is_ascii_digit()) {
            format!("DES={};", bare)
        } else {
            format!("\"{}\"", bare)
        }
    }

    /// State vectors; synthesized when the service cannot provide them
    pub async fn ephemeris(
        &self,
        designation: &str,
        start: NaiveDate,
        end: NaiveDate,
        step: StepSize,
    ) -> EphemerisResponse {
        let command = Self::command_for(designation);
        let start_time = start.format(DATE_FORMAT).to_string();
        let stop_time = end.format(DATE_FORMAT).to_string();
        let step_size = step.to_string();

        let params = [
            ("COMMAND", command.as_str()),
            ("OBJ_DATA", "YES"),
            ("MAKE_EPHEM", "YES"),
            ("EPHEM_TYPE", "VECTORS"),
            ("CENTER", CENTER),
            ("START_TIME", start_time.as_str()),
            ("STOP_TIME", stop_time.as_str()),
            ("STEP_SIZE", step_size.as_str()),
            ("VEC_TABLE", "2"),
            ("VEC_CORR", "LT"),
            ("OUT_UNITS", "AU-D"),
            ("REF_SYSTEM", "ICRF"),
            ("CSV_FORMAT", "YES"),
        ];

        let outcome = self.query(&params).await.and_then(|text| {
            let points = parse_ephemeris(&text);
            if points.is_empty() {
                Err(UpstreamError::MissingField("ephemeris rows"))
            } else {
                Ok(EphemerisResponse::from_points(points))
            }
        });

        match outcome {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Horizons ephemeris for {} unavailable ({}), synthesizing", designation, e);
                match tokio::task::spawn_blocking(move || synthesize(start, end, step)).await {
                    Ok(response) => response,
                    Err(join) => {
                        tracing::error!("Ephemeris synthesis task failed: {}", join);
                        synthesize(start, start, step)
                    }
                }
            }
        }
    }

    /// Osculating elements at `epoch`; fixed fallback elements on failure
    pub async fn orbital_elements(&self, designation: &str, epoch: NaiveDate) -> OrbitalElements {
        let command = Self::command_for(designation);
        let start_time = epoch.format(DATE_FORMAT).to_string();
        let stop_time = (epoch + Duration::days(1)).format(DATE_FORMAT).to_string();

        let params = [
            ("COMMAND", command.as_str()),
            ("OBJ_DATA", "YES"),
            ("MAKE_EPHEM", "YES"),
            ("EPHEM_TYPE", "ELEMENTS"),
            ("CENTER", CENTER),
            ("START_TIME", start_time.as_str()),
            ("STOP_TIME", stop_time.as_str()),
            ("STEP_SIZE", "1d"),
            ("REF_PLANE", "ECLIPTIC"),
            ("OUT_UNITS", "AU-D"),
            ("CSV_FORMAT", "YES"),
        ];

        let outcome = self.query(&params).await.and_then(|text| {
            parse_orbital_elements(&text, &start_time).ok_or(UpstreamError::MissingField("element lines"))
        });

        match outcome {
            Ok(elements) => elements,
            Err(e) => {
                tracing::warn!("Horizons elements for {} unavailable ({}), using fallback", designation, e);
                fallback_elements(&start_time)
            }
        }
    }

    /// Close-approach table; a single fallback Earth approach on failure
    pub async fn close_approaches(&self, designation: &str, start: NaiveDate, end: NaiveDate) -> Vec<CloseApproach> {
        let command = Self::command_for(designation);
        let start_time = start.format(DATE_FORMAT).to_string();
        let stop_time = end.format(DATE_FORMAT).to_string();

        let params = [
            ("COMMAND", command.as_str()),
            ("OBJ_DATA", "YES"),
            ("MAKE_EPHEM", "YES"),
            ("EPHEM_TYPE", "APPROACH"),
            ("START_TIME", start_time.as_str()),
            ("STOP_TIME", stop_time.as_str()),
            ("CA_TABLE_TYPE", "EXTENDED"),
            ("CSV_FORMAT", "YES"),
        ];

        let outcome = self.query(&params).await.and_then(|text| {
            let approaches = parse_close_approaches(&text);
            if approaches.is_empty() {
                Err(UpstreamError::MissingField("approach rows"))
            } else {
                Ok(approaches)
            }
        });

        match outcome {
            Ok(approaches) => approaches,
            Err(e) => {
                tracing::warn!("Horizons approaches for {} unavailable ({}), using fallback", designation, e);
                vec![fallback_close_approach(&start_time)]
            }
        }
    }

    /// Heliocentric position (AU) of a major body; the caller owns the fallback
    pub async fn planet_position(&self, code: &str, date: NaiveDate) -> Result<[f64; 3], UpstreamError> {
        let start_time = date.format(DATE_FORMAT).to_string();
        let stop_time = (date + Duration::days(1)).format(DATE_FORMAT).to_string();

        let params = [
            ("COMMAND", code),
            ("OBJ_DATA", "YES"),
            ("MAKE_EPHEM", "YES"),
            ("EPHEM_TYPE", "VECTORS"),
            ("CENTER", "@sun"),
            ("START_TIME", start_time.as_str()),
            ("STOP_TIME", stop_time.as_str()),
            ("STEP_SIZE", "1d"),
        ];

        let text = self.query(&params).await?;
        parse_planet_position(&text).ok_or(UpstreamError::MissingField("X/Y/Z vectors"))
    }

    /// Report text from the `result` field
    async fn query(&self, params: &[(&str, &str)]) -> Result<String, UpstreamError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[("format", "json")])
            .query(params)
            .send()
            .await?;
        let body = json_body(response).await?;

        if let Some(error) = body.get("error") {
            let message = match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(UpstreamError::Api(message));
        }

        body.get("result")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(UpstreamError::MissingField("result"))
    }
}
