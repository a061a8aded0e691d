//! Planet positions for the solar-system view

use serde::Serialize;

/// Static per-planet data; `fallback_position` is used when Horizons
/// cannot provide vectors
#[derive(Debug, Clone, Copy)]
pub struct PlanetInfo {
    pub name: &'static str,
    pub horizons_code: &'static str,
    pub fallback_distance: f64,
    pub orbital_period: u32,
    pub size: f64,
    pub color: &'static str,
}

pub const PLANETS: [PlanetInfo; 8] = [
    PlanetInfo { name: "Mercury", horizons_code: "199", fallback_distance: 0.39, orbital_period: 88, size: 0.05, color: "#8c7853" },
    PlanetInfo { name: "Venus", horizons_code: "299", fallback_distance: 0.72, orbital_period: 225, size: 0.08, color: "#ffc649" },
    PlanetInfo { name: "Earth", horizons_code: "399", fallback_distance: 1.0, orbital_period: 365, size: 0.1, color: "#1e40af" },
    PlanetInfo { name: "Mars", horizons_code: "499", fallback_distance: 1.52, orbital_period: 687, size: 0.08, color: "#cd5c5c" },
    PlanetInfo { name: "Jupiter", horizons_code: "599", fallback_distance: 5.2, orbital_period: 4333, size: 0.3, color: "#d8ca9d" },
    PlanetInfo { name: "Saturn", horizons_code: "699", fallback_distance: 9.5, orbital_period: 10759, size: 0.25, color: "#fad5a5" },
    PlanetInfo { name: "Uranus", horizons_code: "799", fallback_distance: 19.2, orbital_period: 30687, size: 0.15, color: "#4fd0e7" },
    PlanetInfo { name: "Neptune", horizons_code: "899", fallback_distance: 30.1, orbital_period: 60190, size: 0.15, color: "#4b70dd" },
];

#[derive(Debug, Clone, Serialize)]
pub struct Planet {
    pub name: &'static str,
    /// Heliocentric, AU
    pub position: [f64; 3],
    /// From the Sun, AU
    pub distance: f64,
    /// Days
    pub orbital_period: u32,
    pub size: f64,
    pub color: &'static str,
}

impl Planet {
    pub fn at(info: &PlanetInfo, position: [f64; 3]) -> Self {
        let [x, y, z] = position;
        Self {
            name: info.name,
            position,
            distance: (x * x + y * y + z * z).sqrt(),
            orbital_period: info.orbital_period,
            size: info.size,
            color: info.color,
        }
    }

    /// On the x axis at the planet's mean distance
    pub fn fallback(info: &PlanetInfo) -> Self {
        Self::at(info, [info.fallback_distance, 0.0, 0.0])
    }
}

#[derive(Debug, Serialize)]
pub struct PlanetsResponse {
    pub planets: Vec<Planet>,
    pub date: String,
    pub source: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_distance_matches_position() {
        for info in &PLANETS {
            let planet = Planet::fallback(info);
            assert_eq!(planet.distance, info.fallback_distance);
            assert_eq!(planet.position, [info.fallback_distance, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_distance_from_vector() {
        let planet = Planet::at(&PLANETS[2], [0.6, 0.8, 0.0]);
        assert!((planet.distance - 1.0).abs() < 1e-12);
        assert_eq!(planet.color, "#1e40af");
    }
}
