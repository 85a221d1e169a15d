//! Reporting: O-C residuals and formatted terminal output.

pub mod format;
pub mod oc;

pub use format::*;
pub use oc::*;
