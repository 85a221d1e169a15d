//! Numerical building blocks: least squares, polynomial and kernel
//! regression, scalar/vector minimisation and order statistics.

pub mod kernel;
pub mod ols;
pub mod optimize;
pub mod poly;
pub mod stats;

pub use kernel::*;
pub use ols::*;
pub use optimize::*;
pub use poly::*;
pub use stats::*;
