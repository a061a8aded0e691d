//! HTTP handlers

pub mod asteroids;
pub mod charts;
pub mod health;
pub mod horizons;
pub mod planets;
