//! Ephemeris Fallback Synthesizer
//!
//! Produces a plausible position/velocity series along a fixed ellipse when
//! the orbital-mechanics service cannot be used. Small uniform jitter keeps
//! consecutive runs from being identical.

use std::f64::consts::TAU;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rand::Rng;

use super::types::{EphemerisPoint, EphemerisResponse, StepSize};
use super::EphemerisError;

/// Fallback orbit (AU)
pub const FALLBACK_SEMI_MAJOR_AXIS: f64 = 1.5;
pub const FALLBACK_ECCENTRICITY: f64 = 0.2;

const DAYS_PER_YEAR: f64 = 365.25;
const SECONDS_PER_DAY: f64 = 86_400.0;

const POSITION_JITTER: f64 = 0.1;
const Z_JITTER: f64 = 0.05;
const VELOCITY_SCALE: f64 = 0.1;
const VELOCITY_JITTER: f64 = 0.01;
const VZ_JITTER: f64 = 0.005;

/// Upper bound on points in one series, synthesized or requested
pub const MAX_EPHEMERIS_POINTS: usize = 10_000;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(raw: &str) -> Result<NaiveDate, EphemerisError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|source| EphemerisError::InvalidDate {
        value: raw.to_string(),
        source,
    })
}

/// Synthesize from the raw query strings
pub fn synthesize_from_strings(start: &str, end: &str, step: &str) -> Result<EphemerisResponse, EphemerisError> {
    Ok(synthesize(parse_date(start)?, parse_date(end)?, StepSize::parse(step)))
}

pub fn synthesize(start: NaiveDate, end: NaiveDate, step: StepSize) -> EphemerisResponse {
    synthesize_with_rng(start, end, step, &mut rand::thread_rng())
}

/// Samples `step` would produce from `start` through `end` inclusive,
/// saturating instead of overflowing
pub fn point_count(start: NaiveDate, end: NaiveDate, step: StepSize) -> usize {
    let span = end.signed_duration_since(start).num_seconds().max(0);
    let step = step.as_duration().num_seconds().max(1);
    usize::try_from(span / step).map_or(usize::MAX, |n| n.saturating_add(1))
}

/// One sample per step from `start` through `end` inclusive, at most
/// `MAX_EPHEMERIS_POINTS` of them. An `end` before `start` still yields the
/// single `start` sample; the series also stops at the last representable
/// date.
pub fn synthesize_with_rng<R: Rng + ?Sized>(
    start: NaiveDate,
    end: NaiveDate,
    step: StepSize,
    rng: &mut R,
) -> EphemerisResponse {
    let origin = start.and_time(NaiveTime::MIN);
    let last = end.and_time(NaiveTime::MIN).max(origin);
    let step = step.as_duration();

    let mut points = Vec::new();
    let mut current = origin;
    while current <= last && points.len() < MAX_EPHEMERIS_POINTS {
        points.push(sample(origin, current, rng));
        match current.checked_add_signed(step) {
            Some(next) => current = next,
            None => break,
        }
    }

    if current <= last && points.len() == MAX_EPHEMERIS_POINTS {
        log::warn!("Fallback ephemeris truncated at {} points", MAX_EPHEMERIS_POINTS);
    }

    log::debug!("Synthesized {} fallback ephemeris points", points.len());
    EphemerisResponse::from_points(points)
}

fn sample<R: Rng + ?Sized>(origin: NaiveDateTime, at: NaiveDateTime, rng: &mut R) -> EphemerisPoint {
    let elapsed_days = (at - origin).num_seconds() as f64 / SECONDS_PER_DAY;
    let phase = (elapsed_days / DAYS_PER_YEAR * TAU).rem_euclid(TAU);

    let a = FALLBACK_SEMI_MAJOR_AXIS;
    let e = FALLBACK_ECCENTRICITY;
    let r = a * (1.0 - e * e) / (1.0 + e * phase.cos());

    EphemerisPoint {
        time: at.format(TIME_FORMAT).to_string(),
        x: r * phase.cos() + rng.gen_range(-POSITION_JITTER..=POSITION_JITTER),
        y: r * phase.sin() + rng.gen_range(-POSITION_JITTER..=POSITION_JITTER),
        z: rng.gen_range(-Z_JITTER..=Z_JITTER),
        vx: -phase.sin() * VELOCITY_SCALE + rng.gen_range(-VELOCITY_JITTER..=VELOCITY_JITTER),
        vy: phase.cos() * VELOCITY_SCALE + rng.gen_range(-VELOCITY_JITTER..=VELOCITY_JITTER),
        vz: rng.gen_range(-VZ_JITTER..=VZ_JITTER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(raw: &str) -> NaiveDate {
        parse_date(raw).unwrap()
    }

    #[test]
    fn test_single_day() {
        let response = synthesize(date("2024-01-01"), date("2024-01-01"), StepSize::parse("1d"));
        assert_eq!(response.count, 1);
        assert_eq!(response.ephemeris.len(), 1);
        assert_eq!(response.ephemeris[0].time, "2024-01-01 00:00:00");
    }

    #[test]
    fn test_thirty_day_span() {
        let response = synthesize_from_strings("2024-01-01", "2024-01-31", "1d").unwrap();
        assert_eq!(response.count, 31);

        let times: Vec<NaiveDateTime> = response
            .ephemeris
            .iter()
            .map(|p| NaiveDateTime::parse_from_str(&p.time, TIME_FORMAT).unwrap())
            .collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(response.ephemeris[30].time, "2024-01-31 00:00:00");
    }

    #[test]
    fn test_hourly_steps() {
        let response = synthesize_from_strings("2024-01-01", "2024-01-02", "6h").unwrap();
        assert_eq!(response.count, 5);
        assert_eq!(response.ephemeris[1].time, "2024-01-01 06:00:00");
    }

    #[test]
    fn test_end_before_start() {
        let response = synthesize_from_strings("2024-02-01", "2024-01-01", "1d").unwrap();
        assert_eq!(response.count, 1);
        assert_eq!(response.ephemeris[0].time, "2024-02-01 00:00:00");
    }

    #[test]
    fn test_points_stay_near_the_ellipse() {
        let mut rng = StdRng::seed_from_u64(42);
        let response = synthesize_with_rng(date("2024-01-01"), date("2025-01-01"), StepSize::ONE_DAY, &mut rng);

        let perihelion = FALLBACK_SEMI_MAJOR_AXIS * (1.0 - FALLBACK_ECCENTRICITY);
        let aphelion = FALLBACK_SEMI_MAJOR_AXIS * (1.0 + FALLBACK_ECCENTRICITY);
        for p in &response.ephemeris {
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!(r > perihelion - 0.15 && r < aphelion + 0.15);
            assert!(p.z.abs() <= Z_JITTER);
            assert!(p.vz.abs() <= VZ_JITTER);
        }

        // First point sits at phase 0, i.e. perihelion on +x
        let first = &response.ephemeris[0];
        assert!((first.x - perihelion).abs() <= POSITION_JITTER);
        assert!((first.vy - VELOCITY_SCALE).abs() <= VELOCITY_JITTER);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let run = || {
            let mut rng = StdRng::seed_from_u64(7);
            synthesize_with_rng(date("2024-01-01"), date("2024-01-10"), StepSize::ONE_DAY, &mut rng).ephemeris
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_last_representable_date() {
        let response = synthesize(NaiveDate::MAX, NaiveDate::MAX, StepSize::ONE_DAY);
        assert_eq!(response.count, 1);

        let response = synthesize(NaiveDate::MAX, NaiveDate::MAX, StepSize::parse("6h"));
        assert_eq!(response.count, 1);

        // Signed extended years parse, so they reach the synthesizer
        let response = synthesize_from_strings("+262142-12-31", "+262142-12-31", "1d").unwrap();
        assert_eq!(response.count, 1);
    }

    #[test]
    fn test_point_cap() {
        let start = date("1925-01-01");
        let end = date("2025-01-01");
        let hourly = StepSize::parse("1h");
        assert_eq!(point_count(start, end, hourly), 876_601);

        let response = synthesize(start, end, hourly);
        assert_eq!(response.count, MAX_EPHEMERIS_POINTS);
        assert_eq!(response.ephemeris.len(), MAX_EPHEMERIS_POINTS);
        assert_eq!(response.ephemeris[1].time, "1925-01-01 01:00:00");
    }

    #[test]
    fn test_point_count() {
        let start = date("2024-01-01");
        assert_eq!(point_count(start, date("2024-01-31"), StepSize::ONE_DAY), 31);
        assert_eq!(point_count(start, date("2024-01-02"), StepSize::parse("6h")), 5);
        assert_eq!(point_count(start, date("2023-01-01"), StepSize::ONE_DAY), 1);
        assert!(point_count(NaiveDate::MIN, NaiveDate::MAX, StepSize::parse("1h")) > MAX_EPHEMERIS_POINTS);
    }

    #[test]
    fn test_invalid_date() {
        assert!(matches!(
            synthesize_from_strings("01/01/2024", "2024-01-02", "1d"),
            Err(EphemerisError::InvalidDate { .. })
        ));
    }
}
