//! NeoWs object models

use neo_risk_core::RiskResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One feed object flattened around its first close approach
#[derive(Debug, Clone, Serialize)]
pub struct FlattenedAsteroid {
    pub id: Option<String>,
    pub name: Option<String>,
    pub nasa_jpl_url: Option<String>,
    pub absolute_magnitude_h: Option<f64>,
    pub estimated_diameter: Option<Value>,
    pub is_potentially_hazardous: bool,
    pub close_approach_date: Option<String>,
    pub close_approach_date_full: Option<String>,
    pub epoch_date_close_approach: Option<Value>,
    pub relative_velocity: Option<Value>,
    pub miss_distance: Option<Value>,
    pub orbiting_body: Option<String>,
    pub risk_prediction: RiskResult,
}

impl FlattenedAsteroid {
    pub fn new(object: &Value, risk_prediction: RiskResult) -> Self {
        let approach = first_approach(object);
        let approach_field = |key: &str| approach.and_then(|a| a.get(key)).cloned();
        let approach_str = |key: &str| approach.and_then(|a| a.get(key)).and_then(Value::as_str).map(str::to_string);

        Self {
            id: string_field(object, "id"),
            name: string_field(object, "name"),
            nasa_jpl_url: string_field(object, "nasa_jpl_url"),
            absolute_magnitude_h: object.get("absolute_magnitude_h").and_then(Value::as_f64),
            estimated_diameter: object.get("estimated_diameter").cloned(),
            is_potentially_hazardous: is_hazardous(object),
            close_approach_date: approach_str("close_approach_date"),
            close_approach_date_full: approach_str("close_approach_date_full"),
            epoch_date_close_approach: approach_field("epoch_date_close_approach"),
            relative_velocity: approach_field("relative_velocity"),
            miss_distance: approach_field("miss_distance"),
            orbiting_body: approach_str("orbiting_body"),
            risk_prediction,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub asteroids: Vec<FlattenedAsteroid>,
    pub element_count: Option<u64>,
    pub date_range: String,
}

#[derive(Debug, Serialize)]
pub struct AsteroidResponse {
    pub asteroid: Value,
    pub risk_prediction: RiskResult,
}

/// `?start=YYYY-MM-DD&end=YYYY-MM-DD`
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Every object of a feed response, in date-key order
pub fn feed_objects(feed: &Value) -> Vec<Value> {
    let Some(by_date) = feed.get("near_earth_objects").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut dates: Vec<&String> = by_date.keys().collect();
    dates.sort();

    dates
        .into_iter()
        .filter_map(|date| by_date.get(date).and_then(Value::as_array))
        .flat_map(|objects| objects.iter().cloned())
        .collect()
}

/// Name Horizons is queried with: `designation`, else `name`, else the id
pub fn designation(object: &Value, id: &str) -> String {
    string_field(object, "designation")
        .or_else(|| string_field(object, "name"))
        .unwrap_or_else(|| id.to_string())
}

pub fn is_hazardous(object: &Value) -> bool {
    object
        .get("is_potentially_hazardous_asteroid")
        .or_else(|| object.get("is_potentially_hazardous"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

pub fn first_approach(object: &Value) -> Option<&Value> {
    object.get("close_approach_data").and_then(|d| d.get(0))
}

fn string_field(object: &Value, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object() -> Value {
        json!({
            "id": "2465633",
            "name": "465633 (2009 JR5)",
            "designation": "465633",
            "nasa_jpl_url": "https://ssd.jpl.nasa.gov/tools/sbdb_lookup.html#/?sstr=2465633",
            "absolute_magnitude_h": 20.48,
            "estimated_diameter": { "meters": { "estimated_diameter_max": 475.0 } },
            "is_potentially_hazardous_asteroid": true,
            "close_approach_data": [{
                "close_approach_date": "2015-09-08",
                "close_approach_date_full": "2015-Sep-08 20:28",
                "epoch_date_close_approach": 1441744080000u64,
                "relative_velocity": { "kilometers_per_second": "18.1279360862" },
                "miss_distance": { "kilometers": "45290438.204452618" },
                "orbiting_body": "Earth"
            }]
        })
    }

    #[test]
    fn test_flatten() {
        let flat = FlattenedAsteroid::new(&object(), RiskResult::unknown());

        assert_eq!(flat.id.as_deref(), Some("2465633"));
        assert_eq!(flat.absolute_magnitude_h, Some(20.48));
        assert!(flat.is_potentially_hazardous);
        assert_eq!(flat.close_approach_date.as_deref(), Some("2015-09-08"));
        assert_eq!(flat.orbiting_body.as_deref(), Some("Earth"));
        assert_eq!(flat.relative_velocity, Some(json!({ "kilometers_per_second": "18.1279360862" })));
    }

    #[test]
    fn test_flatten_without_approach() {
        let flat = FlattenedAsteroid::new(&json!({ "id": "1" }), RiskResult::unknown());
        assert!(!flat.is_potentially_hazardous);
        assert_eq!(flat.close_approach_date, None);
        assert_eq!(flat.miss_distance, None);
    }

    #[test]
    fn test_feed_objects_in_date_order() {
        let feed = json!({
            "element_count": 3,
            "near_earth_objects": {
                "2024-01-02": [{ "id": "c" }],
                "2024-01-01": [{ "id": "a" }, { "id": "b" }]
            }
        });
        let ids: Vec<Value> = feed_objects(&feed).into_iter().map(|o| o["id"].clone()).collect();
        assert_eq!(ids, vec![json!("a"), json!("b"), json!("c")]);

        assert!(feed_objects(&json!({})).is_empty());
    }

    #[test]
    fn test_designation_fallbacks() {
        assert_eq!(designation(&object(), "2465633"), "465633");
        assert_eq!(designation(&json!({ "name": "(2015 HN9)" }), "1"), "(2015 HN9)");
        assert_eq!(designation(&json!({}), "3542519"), "3542519");
    }
}
