//! # strain_core - Multilayer Thin-Film Strain Engine
//!
//! `strain_core` computes the elastic state of a stack of thin
//! crystalline layers bonded to a substrate: per-layer stress and
//! strain profiles, the wafer bow radius, and the total strain energy,
//! all as functions of temperature. The model balances lattice and
//! thermal mismatch against layer forces and a single shared
//! curvature, valid while the bow radius stays much larger than the
//! stack thickness.
//!
//! ## Design Philosophy
//!
//! - **Stateless solves**: a [`structure::Structure`] is built once
//!   and every sweep returns plain result values
//! - **JSON-First**: inputs and results implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//! - **Explicit temperature**: material properties take the
//!   temperature as an argument, nothing mutates behind the caller
//!
//! ## Quick Start
//!
//! ```rust
//! use strain_core::{parse_script, MaterialDb, SolveConfig, Structure};
//!
//! // 200 nm of GaN grown on a 500 um Si(111) substrate
//! let specs = parse_script("{GaN 200nm, Si111 0.5mm}").unwrap();
//! let mut structure =
//!     Structure::new(&specs, MaterialDb::builtin(), SolveConfig::default()).unwrap();
//!
//! // sweep from the growth temperature down to room temperature
//! let steps = structure.cooldown(10).unwrap();
//! println!("bow radius at 300 K: {} m", steps.last().unwrap().radius_m.0);
//! ```
//!
//! ## Modules
//!
//! - [`structure`] - Layer stack, equilibrium equations, temperature sweeps
//! - [`materials`] - Material database, alloys, composition parsing
//! - [`solver`] - Gauss-Jordan elimination and 1-D Newton minimization
//! - [`script`] - Stack description language parser
//! - [`report`] - CSV output for sweep results
//! - [`table`] - Temperature-dependent property tables
//! - [`units`] - Type-safe unit wrappers and conversion factors
//! - [`errors`] - Structured error types

pub mod errors;
pub mod materials;
pub mod report;
pub mod script;
pub mod solver;
pub mod structure;
pub mod table;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use errors::{StrainError, StrainResult};
pub use materials::{Material, MaterialData, MaterialDb};
pub use script::parse_script;
pub use structure::{Layer, LayerSpec, Sample, SolveConfig, Structure, SweepStep};
