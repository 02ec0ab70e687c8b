//! # Equilibrium Equation Builder
//!
//! Assembles the laminate force/moment/interface-strain balance as a
//! square linear system `M·x = b` with unknowns
//! `x = [f_0, ..., f_{N-1}, kappa]`: one force per layer plus the
//! single shared curvature (the layers are rigidly bonded, so the
//! whole stack bends to one radius).
//!
//! Rows, in order:
//! 1. N−1 interface-continuity equations: the mismatch strain at each
//!    interface equals the force-induced strain difference plus the
//!    curvature-induced strain difference
//! 2. one force balance: net force through the stack is zero
//! 3. one moment balance about a trial neutral-plane position
//!
//! The model is only valid when the radius of curvature is much larger
//! than the total thickness; otherwise the moment balance turns
//! nonlinear in the radius. Reference: doi 10.1063/1.323970.

use crate::errors::{StrainError, StrainResult};

/// Interface `i` between layer `i` and layer `i+1`:
/// `-f_i/(E_i t_i) + f_{i+1}/(E_{i+1} t_{i+1}) - kappa (t_i+t_{i+1})/2 = -mismatch_i`
fn interface_row(
    num_layers: usize,
    i: usize,
    young: &[f64],
    thickness: &[f64],
    mismatch: &[f64],
) -> (Vec<f64>, f64) {
    let mut row = vec![0.0; num_layers + 1];
    row[i] = -1.0 / (young[i] * thickness[i]);
    row[i + 1] = 1.0 / (young[i + 1] * thickness[i + 1]);
    row[num_layers] = -(thickness[i] + thickness[i + 1]) / 2.0;
    (row, -mismatch[i])
}

/// Net force through the stack is zero: `sum f_i = 0`.
fn force_row(num_layers: usize) -> (Vec<f64>, f64) {
    let mut row = vec![1.0; num_layers + 1];
    row[num_layers] = 0.0;
    (row, 0.0)
}

/// Moment balance about the trial neutral plane: each force acts at
/// its layer midpoint, and the curvature carries the area moment of
/// inertia `sum E_i ((top_i - pos)^3 - (bottom_i - pos)^3) / 3`.
fn moment_row(young: &[f64], thickness: &[f64], neutral_plane_pos: f64) -> (Vec<f64>, f64) {
    let num_layers = young.len();
    let mut row = Vec::with_capacity(num_layers + 1);
    let mut bottom = 0.0;
    let mut inertia = 0.0;
    for i in 0..num_layers {
        let top = bottom + thickness[i];
        row.push(bottom + thickness[i] / 2.0 - neutral_plane_pos);
        inertia += young[i]
            * ((top - neutral_plane_pos).powi(3) - (bottom - neutral_plane_pos).powi(3));
        bottom = top;
    }
    row.push(inertia / 3.0);
    (row, 0.0)
}

/// Build the `(N+1)x(N+1)` equilibrium system for `N` layers.
///
/// `young` holds biaxial moduli E' = E/(1−ν), `thickness` the layer
/// thicknesses, `mismatch` one total mismatch strain per interface
/// (length N−1), and `neutral_plane_pos` a position in
/// `[0, total thickness]`.
pub fn build_system(
    young: &[f64],
    thickness: &[f64],
    mismatch: &[f64],
    neutral_plane_pos: f64,
) -> StrainResult<(Vec<Vec<f64>>, Vec<f64>)> {
    let num_layers = young.len();
    if thickness.len() != num_layers {
        return Err(StrainError::DimensionMismatch {
            context: "build_system thickness".to_string(),
            expected: num_layers,
            actual: thickness.len(),
        });
    }
    if num_layers == 0 || mismatch.len() != num_layers - 1 {
        return Err(StrainError::DimensionMismatch {
            context: "build_system mismatch".to_string(),
            expected: num_layers.saturating_sub(1),
            actual: mismatch.len(),
        });
    }
    let total: f64 = thickness.iter().sum();
    if neutral_plane_pos < 0.0 || neutral_plane_pos > total {
        return Err(StrainError::PositionOutOfRange {
            context: "neutral plane".to_string(),
            position: neutral_plane_pos,
            min: 0.0,
            max: total,
        });
    }

    let mut matrix = Vec::with_capacity(num_layers + 1);
    let mut rhs = Vec::with_capacity(num_layers + 1);
    for i in 0..num_layers - 1 {
        let (row, b) = interface_row(num_layers, i, young, thickness, mismatch);
        matrix.push(row);
        rhs.push(b);
    }
    let (row, b) = force_row(num_layers);
    matrix.push(row);
    rhs.push(b);
    let (row, b) = moment_row(young, thickness, neutral_plane_pos);
    matrix.push(row);
    rhs.push(b);
    Ok((matrix, rhs))
}
