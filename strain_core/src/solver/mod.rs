//! # Numerical Solvers
//!
//! Physics-free numerical building blocks:
//!
//! - [`linear`] - Gauss-Jordan linear-system solver with pivoting,
//!   optional matrix inverse, and residual reporting
//! - [`newton`] - one-dimensional Newton minimizer with randomized
//!   restart, used to locate the neutral plane

pub mod linear;
pub mod newton;

pub use linear::LinearSystem;
pub use newton::{NewtonMinimizer, Optimum};
