//! Horizons text output parsing
//!
//! The service answers with a JSON `result` string holding a free-form
//! report. Tabular data sits between `$$SOE` and `$$EOE`; orbital elements
//! appear as `KEY= value` pairs in the object summary.

use super::orbital::AU_KM;
use super::types::{CloseApproach, EphemerisPoint, OrbitalElements};

const START_OF_ENTRIES: &str = "$$SOE";
const END_OF_ENTRIES: &str = "$$EOE";

/// Non-blank lines between `$$SOE` and `$$EOE`
pub fn data_section(text: &str) -> Vec<&str> {
    text.lines()
        .skip_while(|line| !line.contains(START_OF_ENTRIES))
        .skip(1)
        .take_while(|line| !line.contains(END_OF_ENTRIES))
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Split on commas outside double quotes; quotes are dropped
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => parts.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// VECTORS table in CSV form: `JD, date, x, y, z, vx, vy, vz, ...`
pub fn parse_ephemeris(text: &str) -> Vec<EphemerisPoint> {
    let mut points = Vec::new();

    for line in data_section(text) {
        let parts = split_csv_line(line);
        if parts.len() < 8 {
            continue;
        }

        let numbers: Result<Vec<f64>, _> = parts[2..8].iter().map(|p| p.parse::<f64>()).collect();
        match numbers {
            Ok(v) => points.push(EphemerisPoint {
                time: parts[1].clone(),
                x: v[0],
                y: v[1],
                z: v[2],
                vx: v[3],
                vy: v[4],
                vz: v[5],
            }),
            Err(e) => log::warn!("Skipping ephemeris row {:.100}: {}", line, e),
        }
    }

    log::debug!("Parsed {} ephemeris points", points.len());
    points
}

/// Value following `key=` (or `key =`) where `key` starts a token
pub fn field_value(line: &str, key: &str) -> Option<f64> {
    let mut search = 0;
    while let Some(offset) = line[search..].find(key) {
        let at = search + offset;
        search = at + key.len();

        let boundary = line[..at].chars().last().map_or(true, |c| c.is_whitespace());
        let rest = line[search..].trim_start();
        if !boundary || !rest.starts_with('=') {
            continue;
        }

        return rest[1..].split_whitespace().next()?.parse().ok();
    }
    None
}

/// Summary block of an ELEMENTS request:
///
/// ```text
///  EC= .1576750568195881   QR= 1.053475464962478   TP= 2458935.3721054187
///  OM= 7.888534878612053   W=  25.8064955414649    IN= 14.48260268767822
///  A= 1.250675850800302    MA= 71.96665321535392   ADIST= 1.447876236638127
/// ```
///
/// Missing values on the second and third line read as zero.
pub fn parse_orbital_elements(text: &str, epoch: &str) -> Option<OrbitalElements> {
    let lines: Vec<&str> = text.lines().collect();

    let index = lines.iter().position(|line| {
        field_value(line, "EC").is_some() && field_value(line, "QR").is_some() && line.contains("TP")
    })?;

    let first = lines[index];
    let second = lines.get(index + 1).copied().unwrap_or_default();
    let third = lines.get(index + 2).copied().unwrap_or_default();

    let eccentricity = field_value(first, "EC")?;
    let perihelion_distance = field_value(first, "QR")?;
    let semi_major_axis = field_value(third, "A").unwrap_or(0.0);

    Some(OrbitalElements {
        epoch: epoch.to_string(),
        semi_major_axis,
        eccentricity,
        inclination: field_value(second, "IN").unwrap_or(0.0),
        longitude_of_ascending_node: field_value(second, "OM").unwrap_or(0.0),
        argument_of_perihelion: field_value(second, "W").unwrap_or(0.0),
        mean_anomaly: field_value(third, "MA").unwrap_or(0.0),
        perihelion_distance,
        aphelion_distance: semi_major_axis * (1.0 + eccentricity),
    })
}

/// APPROACH table: `date, body, distance(AU), velocity(km/s), unc, unc3s, ...`
pub fn parse_close_approaches(text: &str) -> Vec<CloseApproach> {
    data_section(text)
        .into_iter()
        .filter_map(|line| {
            let values: Vec<&str> = line.split(',').map(str::trim).collect();
            if values.len() < 6 {
                return None;
            }
            Some(CloseApproach {
                date: values[0].to_string(),
                body: values[1].to_string(),
                distance: values[2].parse().ok()?,
                velocity: values[3].parse().ok()?,
                uncertainty: Some(values[4].to_string()),
                uncertainty_3sigma: Some(values[5].to_string()),
            })
        })
        .collect()
}

/// First `X = .. Y = .. Z = ..` line of a planet VECTORS report (km), in AU
pub fn parse_planet_position(text: &str) -> Option<[f64; 3]> {
    data_section(text)
        .into_iter()
        .filter(|line| line.contains("X ="))
        .find_map(|line| {
            let x = field_value(line, "X")?;
            let y = field_value(line, "Y")?;
            let z = field_value(line, "Z")?;
            Some([x / AU_KM, y / AU_KM, z / AU_KM])
        })
}
