//! Category breakdowns: hierarchy, flow and multi-attribute comparisons

use serde_json::{json, Value};

use super::{
    band, coarse_size, diameter_km, empty_plot, magnitude, miss_distance_km, title, velocity_km_s, Figure,
    ACCENT, BANDS, BAND_COLORS, COARSE_SIZES, CYAN, DANGER, NO_DATA, PINK, PRIMARY, PURPLE, SECONDARY,
};
use crate::models::asteroid::is_hazardous;

const PARALLEL_LIMIT: usize = 50;

fn margin(side: u32) -> Value {
    json!({ "l": side, "r": side, "t": 60, "b": side })
}

/// Object counts per band (rows) and coarse size (columns)
fn band_size_counts(objects: &[Value]) -> [[u32; 3]; 3] {
    let mut counts = [[0u32; 3]; 3];
    for object in objects {
        counts[band(object)][coarse_size(object)] += 1;
    }
    counts
}

/// Root, one ring per band, one leaf per non-empty size bucket
pub fn sunburst_chart(objects: &[Value]) -> Figure {
    if objects.is_empty() {
        return empty_plot(NO_DATA);
    }

    let counts = band_size_counts(objects);
    let mut ids = vec!["root".to_string()];
    let mut labels = vec!["Asteroids".to_string()];
    let mut parents = vec![String::new()];
    let mut values = vec![objects.len() as u32];
    let mut colors = vec![PRIMARY];

    for (i, band) in BANDS.iter().enumerate() {
        ids.push(format!("{}_risk", band.to_lowercase()));
        labels.push(format!("{} Risk", band));
        parents.push("root".to_string());
        values.push(counts[i].iter().sum());
        colors.push(BAND_COLORS[i]);
    }

    for (i, band) in BANDS.iter().enumerate() {
        let parent = format!("{}_risk", band.to_lowercase());
        for (j, size) in COARSE_SIZES.iter().enumerate() {
            if counts[i][j] == 0 {
                continue;
            }
            ids.push(format!("{}_{}", parent, size.to_lowercase()));
            labels.push(size.to_string());
            parents.push(parent.clone());
            values.push(counts[i][j]);
            colors.push(PURPLE);
        }
    }

    Figure::new(
        vec![json!({
            "type": "sunburst",
            "ids": ids,
            "labels": labels,
            "parents": parents,
            "values": values,
            "marker": { "colors": colors },
            "hovertemplate": "<b>%{label}</b><br>Count: %{value}<extra></extra>"
        })],
        json!({
            "title": title("Hierarchical Risk Analysis"),
            "margin": margin(0)
        }),
    )
}

/// One tile per "size - band" pair seen, in first-seen order
pub fn treemap(objects: &[Value]) -> Figure {
    if objects.is_empty() {
        return empty_plot(NO_DATA);
    }

    let mut tiles: Vec<(usize, usize, u32)> = Vec::new();
    for object in objects {
        let key = (coarse_size(object), band(object));
        match tiles.iter_mut().find(|(s, b, _)| (*s, *b) == key) {
            Some(tile) => tile.2 += 1,
            None => tiles.push((key.0, key.1, 1)),
        }
    }

    let mut labels = vec!["Asteroids".to_string()];
    let mut parents = vec![String::new()];
    let mut values = vec![objects.len() as u32];
    let mut colors = vec![PRIMARY];
    for (size, band, count) in tiles {
        labels.push(format!("{} - {} Risk", COARSE_SIZES[size], BANDS[band]));
        parents.push("Asteroids".to_string());
        values.push(count);
        colors.push(BAND_COLORS[band]);
    }

    Figure::new(
        vec![json!({
            "type": "treemap",
            "labels": labels,
            "parents": parents,
            "values": values,
            "marker": { "colors": colors },
            "hovertemplate": "<b>%{label}</b><br>Count: %{value}<extra></extra>"
        })],
        json!({
            "title": title("Asteroid Size and Risk Categorization"),
            "margin": margin(0)
        }),
    )
}

/// Total fanning out into the three bands and the three size buckets
pub fn sankey_diagram(objects: &[Value]) -> Figure {
    if objects.is_empty() {
        return empty_plot(NO_DATA);
    }

    let mut by_band = [0u32; 3];
    let mut by_size = [0u32; 3];
    for object in objects {
        by_band[band(object)] += 1;
        by_size[coarse_size(object)] += 1;
    }

    let mut labels = vec!["Total Asteroids".to_string()];
    labels.extend(BANDS.iter().map(|b| format!("{} Risk", b)));
    labels.extend(COARSE_SIZES.iter().map(|s| format!("{} Size", s)));
    let colors = [PRIMARY, SECONDARY, ACCENT, DANGER, PURPLE, PINK, CYAN];

    let targets: Vec<usize> = (1..labels.len()).collect();
    let values: Vec<u32> = by_band.iter().chain(by_size.iter()).copied().collect();

    Figure::new(
        vec![json!({
            "type": "sankey",
            "node": { "label": labels, "color": colors },
            "link": {
                "source": vec![0; targets.len()],
                "target": targets,
                "value": values
            }
        })],
        json!({
            "title": title("Asteroid Data Flow Diagram"),
            "margin": margin(0)
        }),
    )
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Mean magnitude, diameter, velocity, miss distance (million km) and the
/// group's share of all objects in percent
fn group_profile(group: &[&Value], total: usize) -> [f64; 5] {
    if group.is_empty() {
        return [0.0; 5];
    }
    [
        mean(group.iter().map(|o| magnitude(o))),
        mean(group.iter().map(|o| diameter_km(o))),
        mean(group.iter().map(|o| velocity_km_s(o))),
        mean(group.iter().map(|o| miss_distance_km(o))) / 1e6,
        group.len() as f64 / total as f64 * 100.0,
    ]
}

/// Hazardous against non-hazardous profiles
pub fn radar_chart(objects: &[Value]) -> Figure {
    if objects.is_empty() {
        return empty_plot(NO_DATA);
    }

    let (hazardous, safe): (Vec<&Value>, Vec<&Value>) = objects.iter().partition(|o| is_hazardous(o));
    let categories = ["Magnitude", "Diameter (km)", "Velocity (km/s)", "Miss Distance (M km)", "Percentage"];

    let trace = |profile: [f64; 5], name: &str, color: &str| {
        json!({
            "type": "scatterpolar",
            "r": profile,
            "theta": categories,
            "fill": "toself",
            "name": name,
            "line": { "color": color },
            "fillcolor": color,
            "opacity": 0.6
        })
    };

    Figure::new(
        vec![
            trace(group_profile(&hazardous, objects.len()), "Hazardous Asteroids", DANGER),
            trace(group_profile(&safe, objects.len()), "Safe Asteroids", SECONDARY),
        ],
        json!({
            "title": title("Multi-Attribute Comparison Radar Chart"),
            "polar": {
                "radialaxis": {
                    "visible": true,
                    "range": [0, 100],
                    "tickfont": { "color": "white" },
                    "gridcolor": "rgba(255,255,255,0.1)"
                },
                "angularaxis": {
                    "tickfont": { "color": "white" },
                    "gridcolor": "rgba(255,255,255,0.1)"
                },
                "bgcolor": "rgba(0,0,0,0)"
            },
            "margin": margin(60)
        }),
    )
}

/// Five axes per object, the first fifty objects only
pub fn parallel_coordinates(objects: &[Value]) -> Figure {
    if objects.is_empty() {
        return empty_plot(NO_DATA);
    }

    let sample = &objects[..objects.len().min(PARALLEL_LIMIT)];
    let column = |f: fn(&Value) -> f64| -> Vec<f64> { sample.iter().map(f).collect() };
    let hazard: Vec<u8> = sample.iter().map(|o| u8::from(is_hazardous(o))).collect();

    let dimensions = json!([
        { "label": "Magnitude", "values": column(magnitude) },
        { "label": "Diameter (km)", "values": column(diameter_km) },
        { "label": "Velocity (km/s)", "values": column(velocity_km_s) },
        { "label": "Miss Distance (M km)", "values": column(|o| miss_distance_km(o) / 1e6) },
        { "label": "Hazardous", "values": hazard }
    ]);

    Figure::new(
        vec![json!({
            "type": "parcoords",
            "dimensions": dimensions,
            "line": {
                "color": hazard,
                "colorscale": [[0, PRIMARY], [1, DANGER]],
                "showscale": true,
                "colorbar": {
                    "title": "Hazardous",
                    "titlefont": { "color": "white" },
                    "tickfont": { "color": "white" }
                }
            }
        })],
        json!({
            "title": title("Multi-Dimensional Asteroid Analysis"),
            "margin": { "l": 60, "r": 20, "t": 60, "b": 60 }
        }),
    )
}
