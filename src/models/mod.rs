//! Local brightness models fitted around a single minimum.
//!
//! Every fit strategy produces a [`LocalModel`]; the refiner only ever
//! evaluates it over a vector of times, so the three variants stay
//! interchangeable.

pub mod model;
pub mod template;

pub use model::*;
pub use template::*;
