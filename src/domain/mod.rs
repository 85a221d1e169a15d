//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - fit configuration (`FitKind`, `DivergencePolicy`, `MinimaConfig`)
//! - detection outputs (`Minimum`, `MinimaResult`)
//! - O-C diagram points (`OcPoint`)

pub mod types;

pub use types::*;
