//! Input/output helpers.
//!
//! - light-curve and minima table ingest (`ingest`)
//! - O-C and minima text tables (`export`)
//! - JSON run files (`json`)

pub mod export;
pub mod ingest;
pub mod json;

pub use export::*;
pub use ingest::*;
pub use json::*;
