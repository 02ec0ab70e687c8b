//! # Unit Types
//!
//! Type-safe wrappers for the units used throughout the solver. These
//! are simple newtype wrappers rather than a full units library:
//! epitaxy work uses a small, fixed set of units and we want JSON
//! serialization to stay plain numbers.
//!
//! ## Internal Convention
//!
//! The solver core works in a consistent homogeneous system:
//! - Length: nanometers (nm), the natural scale of epitaxial layers
//! - Stress / modulus: gigapascals (GPa)
//! - Force per unit width: GPa·nm
//! - Curvature: 1/nm
//!
//! Reported results convert at the boundary: radius in meters,
//! positions in micrometers, stress in GPa.
//!
//! ## Example
//!
//! ```rust
//! use strain_core::units::{Micrometers, Nanometers};
//!
//! let thickness = Micrometers(1.5);
//! let nm: Nanometers = thickness.into();
//! assert_eq!(nm.0, 1500.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Length Units
// ============================================================================

/// Length in nanometers (internal unit)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nanometers(pub f64);

/// Length in micrometers
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Micrometers(pub f64);

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Nanometers per unit, used for parsing thickness suffixes
pub const NM_PER_UM: f64 = 1.0e3;
/// Nanometers per millimeter
pub const NM_PER_MM: f64 = 1.0e6;
/// Nanometers per centimeter
pub const NM_PER_CM: f64 = 1.0e7;
/// Nanometers per meter
pub const NM_PER_M: f64 = 1.0e9;

impl From<Micrometers> for Nanometers {
    fn from(um: Micrometers) -> Self {
        Nanometers(um.0 * NM_PER_UM)
    }
}

impl From<Nanometers> for Micrometers {
    fn from(nm: Nanometers) -> Self {
        Micrometers(nm.0 / NM_PER_UM)
    }
}

impl From<Millimeters> for Nanometers {
    fn from(mm: Millimeters) -> Self {
        Nanometers(mm.0 * NM_PER_MM)
    }
}

impl From<Nanometers> for Millimeters {
    fn from(nm: Nanometers) -> Self {
        Millimeters(nm.0 / NM_PER_MM)
    }
}

impl From<Meters> for Nanometers {
    fn from(m: Meters) -> Self {
        Nanometers(m.0 * NM_PER_M)
    }
}

impl From<Nanometers> for Meters {
    fn from(nm: Nanometers) -> Self {
        Meters(nm.0 / NM_PER_M)
    }
}

// ============================================================================
// Stress Units
// ============================================================================

/// Stress or modulus in gigapascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gigapascals(pub f64);

/// Temperature in kelvin
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kelvin(pub f64);

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Nanometers);
impl_arithmetic!(Micrometers);
impl_arithmetic!(Millimeters);
impl_arithmetic!(Meters);
impl_arithmetic!(Gigapascals);
impl_arithmetic!(Kelvin);
