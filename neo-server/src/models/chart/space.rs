//! Position and timeline style charts
//!
//! The feed carries no positions, so these place objects on illustrative
//! coordinates drawn from `rng`.

use std::f64::consts::TAU;

use chrono::{Days, NaiveDate};
use rand::Rng;
use serde_json::{json, Value};

use super::{axis, diameter_km, empty_plot, magnitude, name_or, title, Figure, DANGER, NO_DATA, PRIMARY, SECONDARY};
use crate::models::asteroid::is_hazardous;

const TIMELINE_OBJECTS: usize = 20;
const TIMELINE_DAYS: u64 = 30;

const CONTOUR_GRID: usize = 50;
const CONTOUR_EXTENT: f64 = 10.0;

/// Magnitude bands standing in for orbital regions
const REGIONS: [(&str, f64); 5] = [
    ("Near Earth", 20.0),
    ("Main Belt", 22.0),
    ("Trojan", 24.0),
    ("Kuiper Belt", 26.0),
    ("Oort Cloud", f64::INFINITY),
];

fn hazard_color(object: &Value) -> &'static str {
    if is_hazardous(object) {
        DANGER
    } else {
        SECONDARY
    }
}

fn marker_size(object: &Value, max: f64) -> f64 {
    (diameter_km(object) * 1000.0).clamp(5.0, max)
}

/// Objects scattered through a 0.5 to 3 AU shell, sized by diameter
pub fn scatter_3d<R: Rng + ?Sized>(objects: &[Value], rng: &mut R) -> Figure {
    if objects.is_empty() {
        return empty_plot(NO_DATA);
    }

    let mut xs = Vec::with_capacity(objects.len());
    let mut ys = Vec::with_capacity(objects.len());
    let mut zs = Vec::with_capacity(objects.len());
    for _ in objects {
        let angle = rng.gen_range(0.0..TAU);
        let distance = rng.gen_range(0.5..3.0);
        xs.push(distance * angle.cos());
        ys.push(distance * angle.sin());
        zs.push(rng.gen_range(-0.5..0.5));
    }

    let sizes: Vec<f64> = objects.iter().map(|o| marker_size(o, 50.0)).collect();
    let colors: Vec<&str> = objects.iter().map(hazard_color).collect();
    let text: Vec<String> = objects
        .iter()
        .map(|o| {
            format!(
                "{}<br>Magnitude: {:.1}<br>Hazardous: {}",
                name_or(o, || "Unknown".to_string()),
                magnitude(o),
                if is_hazardous(o) { "Yes" } else { "No" }
            )
        })
        .collect();

    let scene_axis = |label: &str| {
        let mut axis = axis(Some(label));
        axis["backgroundcolor"] = json!("rgba(0,0,0,0)");
        axis
    };

    let mut figure = Figure::new(
        vec![json!({
            "x": xs,
            "y": ys,
            "z": zs,
            "mode": "markers",
            "type": "scatter3d",
            "marker": {
                "size": sizes,
                "color": colors,
                "opacity": 0.8,
                "line": { "color": "white", "width": 1 }
            },
            "text": text,
            "hovertemplate": "<b>%{text}</b><br>X: %{x:.2f} AU<br>Y: %{y:.2f} AU<br>Z: %{z:.2f} AU<br><extra></extra>",
            "name": "Asteroids"
        })],
        json!({
            "title": title("3D Asteroid Positions in Space"),
            "scene": {
                "xaxis": scene_axis("X (AU)"),
                "yaxis": scene_axis("Y (AU)"),
                "zaxis": scene_axis("Z (AU)"),
                "bgcolor": "rgba(0,0,0,0)",
                "camera": { "eye": { "x": 1.5, "y": 1.5, "z": 1.5 } }
            },
            "margin": { "l": 0, "r": 0, "t": 60, "b": 0 }
        }),
    );
    figure.config["modeBarButtonsToRemove"] = json!(["pan2d", "lasso2d", "select2d"]);
    figure
}

/// Thirty days of jittered magnitude from `start` for the first twenty objects
pub fn animated_timeline<R: Rng + ?Sized>(objects: &[Value], start: NaiveDate, rng: &mut R) -> Figure {
    if objects.is_empty() {
        return empty_plot(NO_DATA);
    }

    let days: Vec<String> = (0..TIMELINE_DAYS)
        .filter_map(|d| start.checked_add_days(Days::new(d)))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .collect();

    let mut dates = Vec::new();
    let mut magnitudes = Vec::new();
    let mut sizes = Vec::new();
    let mut colors = Vec::new();
    let mut names = Vec::new();

    for (i, object) in objects.iter().take(TIMELINE_OBJECTS).enumerate() {
        let name = name_or(object, || format!("Asteroid {}", i + 1));
        let h = magnitude(object);
        for day in &days {
            dates.push(day.clone());
            magnitudes.push(h + rng.gen_range(-0.5..=0.5));
            sizes.push(marker_size(object, 30.0));
            colors.push(hazard_color(object));
            names.push(name.clone());
        }
    }

    Figure::new(
        vec![json!({
            "x": dates,
            "y": magnitudes,
            "mode": "markers+lines",
            "type": "scatter",
            "marker": { "size": sizes, "color": colors, "opacity": 0.8 },
            "line": { "color": PRIMARY, "width": 2 },
            "text": names,
            "hovertemplate": "<b>%{text}</b><br>Date: %{x}<br>Magnitude: %{y:.2f}<br><extra></extra>",
            "name": "Asteroid Timeline"
        })],
        json!({
            "title": title("Animated Asteroid Timeline"),
            "xaxis": axis(Some("Date")),
            "yaxis": axis(Some("Absolute Magnitude")),
            "margin": { "l": 60, "r": 20, "t": 60, "b": 60 }
        }),
    )
}

/// Gaussian density bumps on a 50x50 grid, one per object, weighted by
/// diameter and dimmed by magnitude
pub fn contour_plot<R: Rng + ?Sized>(objects: &[Value], rng: &mut R) -> Figure {
    if objects.is_empty() {
        return empty_plot(NO_DATA);
    }

    let grid: Vec<f64> = (0..CONTOUR_GRID)
        .map(|i| CONTOUR_EXTENT * i as f64 / (CONTOUR_GRID - 1) as f64)
        .collect();
    let mut z = vec![vec![0.0f64; CONTOUR_GRID]; CONTOUR_GRID];

    for object in objects {
        let cx = rng.gen_range(2.0..8.0);
        let cy = rng.gen_range(2.0..8.0);
        let intensity = 1.0 / (1.0 + magnitude(object) / 10.0) * diameter_km(object) * 100.0;

        for (row, y) in z.iter_mut().zip(&grid) {
            for (cell, x) in row.iter_mut().zip(&grid) {
                let d2 = (x - cx).powi(2) + (y - cy).powi(2);
                *cell += intensity * (-d2 / 2.0).exp();
            }
        }
    }

    Figure::new(
        vec![json!({
            "type": "contour",
            "x": grid,
            "y": grid,
            "z": z,
            "colorscale": "Viridis",
            "showscale": true,
            "colorbar": {
                "title": "Density",
                "titlefont": { "color": "white" },
                "tickfont": { "color": "white" }
            }
        })],
        json!({
            "title": title("Asteroid Density Distribution"),
            "xaxis": axis(Some("X Position")),
            "yaxis": axis(Some("Y Position")),
            "margin": { "l": 60, "r": 20, "t": 60, "b": 60 }
        }),
    )
}

/// Counts per magnitude band on a bar-polar chart
pub fn polar_chart(objects: &[Value]) -> Figure {
    if objects.is_empty() {
        return empty_plot(NO_DATA);
    }

    let mut counts = [0u32; REGIONS.len()];
    for object in objects {
        let h = magnitude(object);
        let region = REGIONS.iter().position(|(_, upper)| h < *upper).unwrap_or(REGIONS.len() - 1);
        counts[region] += 1;
    }
    let labels: Vec<&str> = REGIONS.iter().map(|(name, _)| *name).collect();

    Figure::new(
        vec![json!({
            "type": "barpolar",
            "r": counts,
            "theta": labels,
            "marker": {
                "colorscale": "Viridis",
                "colorbar": {
                    "title": "Count",
                    "titlefont": { "color": "white" },
                    "tickfont": { "color": "white" }
                }
            },
            "hovertemplate": "<b>%{theta}</b><br>Count: %{r}<extra></extra>"
        })],
        json!({
            "title": title("Asteroid Distribution by Orbital Region"),
            "polar": {
                "radialaxis": {
                    "visible": true,
                    "tickfont": { "color": "white" },
                    "gridcolor": "rgba(255,255,255,0.1)"
                },
                "angularaxis": {
                    "tickfont": { "color": "white" },
                    "gridcolor": "rgba(255,255,255,0.1)"
                },
                "bgcolor": "rgba(0,0,0,0)"
            },
            "margin": { "l": 60, "r": 60, "t": 60, "b": 60 }
        }),
    )
}
