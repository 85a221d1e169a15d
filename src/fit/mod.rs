//! Minimum detection.
//!
//! Responsibilities:
//!
//! - estimate the reference epoch of the first minimum
//! - fit each cycle with the configured strategy and gate the result
//! - bootstrap an uncertainty for every accepted minimum (parallel)

pub mod bootstrap;
pub mod epoch;
pub mod executor;
pub mod refiner;
pub mod strategy;

pub use bootstrap::*;
pub use epoch::*;
pub use executor::*;
pub use refiner::*;
pub use strategy::*;
