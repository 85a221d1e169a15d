//! Light-curve data: the cleaned input series and a seeded synthetic
//! generator used by tests and `oc simulate`.

pub mod series;
pub mod synthetic;

pub use series::*;
pub use synthetic::*;
