//! `oc-curves` library crate.
//!
//! Eclipse minima timing: detect each periodic minimum of a light curve,
//! bootstrap its uncertainty and build the O-C diagram against a linear
//! ephemeris.
//!
//! The binary (`oc`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the detection core needs neither a terminal nor a file system

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;

pub use data::Series;
pub use domain::{FitKind, MinimaConfig, MinimaResult, Minimum, OcPoint};
pub use error::OcError;
pub use fit::{fit_minima, fit_minima_observed};
pub use report::calculate_oc;
