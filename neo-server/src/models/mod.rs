//! Response and query models

pub mod asteroid;
pub mod chart;
pub mod horizons;
pub mod planet;
