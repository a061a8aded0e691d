//! Plotly figure builders
//!
//! Each builder returns `{data, layout, config}` ready for `Plotly.newPlot`
//! on the dashboard's dark background. The breakdown charts bucket objects
//! with a brightness/hazard rule of thumb; only the heatmap uses the model.

mod breakdown;
mod space;

use neo_risk_core::RiskLevel;
use serde::Serialize;
use serde_json::{json, Value};

use super::asteroid::{first_approach, is_hazardous};

pub use breakdown::{parallel_coordinates, radar_chart, sankey_diagram, sunburst_chart, treemap};
pub use space::{animated_timeline, contour_plot, polar_chart, scatter_3d};

const PRIMARY: &str = "#3B82F6";
const SECONDARY: &str = "#10B981";
const ACCENT: &str = "#F59E0B";
const DANGER: &str = "#EF4444";
const CRITICAL: &str = "#DC2626";
const PURPLE: &str = "#8B5CF6";
const PINK: &str = "#EC4899";
const CYAN: &str = "#06B6D4";

const DEFAULT_MAGNITUDE: f64 = 20.0;
const DEFAULT_DIAMETER_KM: f64 = 0.1;

pub const NO_DATA: &str = "No Asteroid Data Available";

/// Heatmap rows, lowest band at the bottom
pub const HEATMAP_LEVELS: [RiskLevel; 5] = [
    RiskLevel::Low,
    RiskLevel::Medium,
    RiskLevel::Moderate,
    RiskLevel::High,
    RiskLevel::Uncertain,
];

/// Heatmap columns with their upper diameter bound (m)
pub const SIZE_CATEGORIES: [(&str, f64); 4] = [
    ("Small", 50.0),
    ("Medium", 140.0),
    ("Large", 1000.0),
    ("Very Large", f64::INFINITY),
];

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
    pub config: Value,
}

impl Figure {
    fn new(data: Vec<Value>, mut layout: Value) -> Self {
        layout["paper_bgcolor"] = json!("rgba(0,0,0,0)");
        layout["plot_bgcolor"] = json!("rgba(0,0,0,0)");
        layout["font"] = json!({ "color": "white" });
        Self {
            data,
            layout,
            config: json!({ "displayModeBar": true, "displaylogo": false }),
        }
    }
}

fn title(text: &str) -> Value {
    json!({ "text": text, "font": { "size": 20, "color": "white" }, "x": 0.5 })
}

fn axis(label: Option<&str>) -> Value {
    let mut axis = json!({
        "titlefont": { "color": "white" },
        "tickfont": { "color": "white" },
        "gridcolor": "rgba(255,255,255,0.1)"
    });
    if let Some(label) = label {
        axis["title"] = json!(label);
    }
    axis
}

/// JSON number or numeric string
fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|v: &f64| v.is_finite())
}

fn magnitude(object: &Value) -> f64 {
    number(object.get("absolute_magnitude_h")).unwrap_or(DEFAULT_MAGNITUDE)
}

fn diameter_km(object: &Value) -> f64 {
    number(object.pointer("/estimated_diameter/kilometers/estimated_diameter_max")).unwrap_or(DEFAULT_DIAMETER_KM)
}

fn velocity_km_s(object: &Value) -> f64 {
    number(first_approach(object).and_then(|a| a.pointer("/relative_velocity/kilometers_per_second"))).unwrap_or(0.0)
}

fn miss_distance_km(object: &Value) -> f64 {
    number(first_approach(object).and_then(|a| a.pointer("/miss_distance/kilometers"))).unwrap_or(0.0)
}

fn name_or(object: &Value, fallback: impl FnOnce() -> String) -> String {
    object
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(fallback)
}

/// Rule-of-thumb bands: hazardous or H < 20 is high, H < 22 medium
const BANDS: [&str; 3] = ["Low", "Medium", "High"];
const BAND_COLORS: [&str; 3] = [SECONDARY, ACCENT, DANGER];

fn band(object: &Value) -> usize {
    let h = magnitude(object);
    if is_hazardous(object) || h < 20.0 {
        2
    } else if h < 22.0 {
        1
    } else {
        0
    }
}

/// Coarse size buckets by maximum diameter: < 0.1 km, < 0.5 km, larger
const COARSE_SIZES: [&str; 3] = ["Small", "Medium", "Large"];

fn coarse_size(object: &Value) -> usize {
    let km = diameter_km(object);
    if km < 0.1 {
        0
    } else if km < 0.5 {
        1
    } else {
        2
    }
}

/// Placeholder shown when there is nothing to plot
pub fn empty_plot(message: &str) -> Figure {
    let mut figure = Figure::new(
        vec![json!({
            "x": [0],
            "y": [0],
            "mode": "markers",
            "marker": { "size": 0 },
            "showlegend": false
        })],
        json!({
            "title": title(message),
            "xaxis": { "visible": false },
            "yaxis": { "visible": false },
            "margin": { "l": 0, "r": 0, "t": 60, "b": 0 }
        }),
    );
    figure.config["displayModeBar"] = json!(false);
    figure
}

/// Magnitude, diameter and velocity distributions
pub fn violin_plot(objects: &[Value]) -> Figure {
    if objects.is_empty() {
        return empty_plot(NO_DATA);
    }

    let magnitudes: Vec<f64> = objects.iter().map(magnitude).collect();
    let diameters: Vec<f64> = objects.iter().map(diameter_km).collect();
    let velocities: Vec<f64> = objects.iter().map(velocity_km_s).collect();

    let violin = |values: Vec<f64>, name: &str, color: &str| {
        json!({
            "type": "violin",
            "y": values,
            "name": name,
            "box": { "visible": true },
            "meanline": { "visible": true },
            "fillcolor": color,
            "line": { "color": "white" }
        })
    };

    Figure::new(
        vec![
            violin(magnitudes, "Magnitude", PRIMARY),
            violin(diameters, "Diameter (km)", SECONDARY),
            violin(velocities, "Velocity (km/s)", ACCENT),
        ],
        json!({
            "title": title("Distribution Analysis of Asteroid Properties"),
            "yaxis": axis(None),
            "margin": { "l": 60, "r": 20, "t": 60, "b": 60 }
        }),
    )
}

/// Magnitudes grouped by a hazard/brightness rule of thumb
pub fn box_plot(objects: &[Value]) -> Figure {
    if objects.is_empty() {
        return empty_plot(NO_DATA);
    }

    let mut groups: [Vec<f64>; 3] = Default::default();
    for object in objects {
        groups[band(object)].push(magnitude(object));
    }

    let data = groups
        .into_iter()
        .enumerate()
        .map(|(i, values)| {
            json!({
                "type": "box",
                "y": values,
                "name": format!("{} Risk", BANDS[i]),
                "marker": { "color": BAND_COLORS[i] },
                "boxpoints": "outliers"
            })
        })
        .collect();

    Figure::new(
        data,
        json!({
            "title": title("Statistical Analysis by Risk Level"),
            "yaxis": axis(Some("Absolute Magnitude")),
            "margin": { "l": 60, "r": 20, "t": 60, "b": 60 }
        }),
    )
}

pub fn size_category(diameter_m: f64) -> usize {
    SIZE_CATEGORIES
        .iter()
        .position(|(_, upper)| diameter_m < *upper)
        .unwrap_or(SIZE_CATEGORIES.len() - 1)
}

/// Counts of predicted risk level by size category. `Unknown` predictions
/// are left out.
pub fn risk_heatmap(predictions: &[(RiskLevel, f64)]) -> Figure {
    if predictions.is_empty() {
        return empty_plot(NO_DATA);
    }

    let mut counts = [[0u32; SIZE_CATEGORIES.len()]; HEATMAP_LEVELS.len()];
    for (level, diameter_m) in predictions {
        if let Some(row) = HEATMAP_LEVELS.iter().position(|l| l == level) {
            counts[row][size_category(*diameter_m)] += 1;
        }
    }

    let z: Vec<Vec<u32>> = counts.iter().map(|row| row.to_vec()).collect();
    let x: Vec<&str> = SIZE_CATEGORIES.iter().map(|(name, _)| *name).collect();
    let y: Vec<&str> = HEATMAP_LEVELS.iter().map(RiskLevel::as_str).collect();

    Figure::new(
        vec![json!({
            "type": "heatmap",
            "z": z,
            "x": x,
            "y": y,
            "colorscale": [[0, SECONDARY], [0.3, ACCENT], [0.6, DANGER], [1, CRITICAL]],
            "showscale": true,
            "colorbar": {
                "title": "Count",
                "titlefont": { "color": "white" },
                "tickfont": { "color": "white" }
            },
            "hovertemplate": "Risk: %{y}<br>Size: %{x}<br>Count: %{z}<extra></extra>"
        })],
        json!({
            "title": title("Asteroid Risk Assessment Heatmap"),
            "xaxis": axis(Some("Size Category")),
            "yaxis": axis(Some("Risk Level")),
            "margin": { "l": 80, "r": 20, "t": 60, "b": 80 }
        }),
    )
}
