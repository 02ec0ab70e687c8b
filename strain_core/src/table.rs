//! # Tabulated Property Curves
//!
//! Temperature-dependent material properties are stored as sorted
//! `(temperature, value)` pairs and evaluated by piecewise-linear
//! interpolation. Queries outside the tabulated range clamp to the
//! nearest endpoint rather than extrapolating.
//!
//! The trapezoid-rule integral over the interpolated curve is what
//! turns a thermal-expansion-coefficient table into an accumulated
//! expansion ratio between two temperatures.

use serde::{Deserialize, Serialize};

use crate::errors::{StrainError, StrainResult};

/// Minimum number of sub-intervals used by [`PropertyTable::integrate`].
const MIN_INTEGRATION_POINTS: usize = 1000;

/// A tabulated `(x, y)` property curve, sorted by `x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyTable {
    points: Vec<(f64, f64)>,
}

impl PropertyTable {
    /// Build a table from `(x, y)` pairs.
    ///
    /// The table must be non-empty and strictly increasing in `x`.
    pub fn new(points: Vec<(f64, f64)>) -> StrainResult<Self> {
        if points.is_empty() {
            return Err(StrainError::invalid_input(
                "points",
                "[]",
                "Property table must not be empty",
            ));
        }
        for pair in points.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(StrainError::invalid_input(
                    "points",
                    format!("{:?}", pair),
                    "Property table must be strictly increasing in x",
                ));
            }
        }
        Ok(PropertyTable { points })
    }

    /// Single-point table: the property is constant over temperature.
    pub fn constant(x: f64, y: f64) -> Self {
        PropertyTable {
            points: vec![(x, y)],
        }
    }

    /// Piecewise-linear interpolation at `x`, clamped to the tabulated
    /// range at both ends.
    pub fn value_at(&self, x: f64) -> f64 {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if x <= first.0 {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }
        // find the gap x resides in
        let mut i = 0;
        while i < self.points.len() && x > self.points[i].0 {
            i += 1;
        }
        let (x1, y1) = self.points[i - 1];
        let (x2, y2) = self.points[i];
        let (d1, d2) = (x - x1, x2 - x);
        (y1 * d2 + y2 * d1) / (d1 + d2)
    }

    /// Trapezoid-rule integral of the interpolated curve from `x0` to
    /// `x1`, over `max(1000, table length)` sample points. The sign
    /// flips when `x1 < x0`; the integral is zero when `x0 == x1`.
    pub fn integrate(&self, x0: f64, x1: f64) -> f64 {
        let num_points = MIN_INTEGRATION_POINTS.max(self.points.len());
        let step = (x1 - x0) / (num_points as f64 - 1.0);
        let mut sum = 0.0;
        let mut y_prev = self.value_at(x0);
        for i in 1..num_points {
            let x = x0 + step * i as f64;
            let y = self.value_at(x);
            sum += step * (y_prev + y) / 2.0;
            y_prev = y;
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_unsorted() {
        assert!(PropertyTable::new(vec![]).is_err());
        assert!(PropertyTable::new(vec![(300.0, 1.0), (200.0, 2.0)]).is_err());
        assert!(PropertyTable::new(vec![(300.0, 1.0), (300.0, 2.0)]).is_err());
    }

    #[test]
    fn test_single_point_is_constant() {
        let table = PropertyTable::constant(300.0, 5.59e-6);
        assert_eq!(table.value_at(100.0), 5.59e-6);
        assert_eq!(table.value_at(300.0), 5.59e-6);
        assert_eq!(table.value_at(1200.0), 5.59e-6);
    }

    #[test]
    fn test_interpolation_and_clamping() {
        let table = PropertyTable::new(vec![(0.0, 0.0), (100.0, 100.0)]).unwrap();
        assert_eq!(table.value_at(-50.0), 0.0);
        assert_eq!(table.value_at(150.0), 100.0);
        assert!((table.value_at(25.0) - 25.0).abs() < 1e-12);
        assert!((table.value_at(80.0) - 80.0).abs() < 1e-12);
    }

    #[test]
    fn test_integrate_constant_curve() {
        // For constant c, the integral over [T0, T1] is c * (T1 - T0).
        let c = 4.2e-6;
        let table = PropertyTable::constant(300.0, c);
        let integral = table.integrate(300.0, 900.0);
        assert!((integral - c * 600.0).abs() < 1e-12);
    }

    #[test]
    fn test_integrate_sign_flip() {
        let table = PropertyTable::constant(300.0, 2.0);
        let forward = table.integrate(0.0, 100.0);
        let backward = table.integrate(100.0, 0.0);
        assert!((forward - 200.0).abs() < 1e-9);
        assert!((forward + backward).abs() < 1e-9);
        assert_eq!(table.integrate(100.0, 100.0), 0.0);
    }

    #[test]
    fn test_integrate_linear_curve() {
        // y = x over [0, 100] integrates to 5000 exactly under trapezoids.
        let table = PropertyTable::new(vec![(0.0, 0.0), (100.0, 100.0)]).unwrap();
        let integral = table.integrate(0.0, 100.0);
        assert!((integral - 5000.0).abs() < 1e-6);
    }
}
