//! # Linear System Solver
//!
//! Gauss-Jordan elimination on an augmented matrix `[M | b | I]`,
//! producing the root of `M·x = b`, optionally the inverse of `M`, and
//! a mean-absolute residual for error reporting.
//!
//! ## Algorithm Overview
//!
//! 1. Concatenate the matrix, right-hand side, and (optionally) the
//!    identity into one working matrix
//! 2. Precondition: any near-zero diagonal entry gets the row with the
//!    largest same-column magnitude added onto it
//! 3. For each column in order, scale the pivot row to 1 and zero the
//!    column everywhere else (full Gauss-Jordan, above and below)
//! 4. Read the root from the augmented b column and the inverse from
//!    the trailing block
//!
//! The caller's matrix and vector are never mutated; the solver works
//! on internal copies.

use crate::errors::{StrainError, StrainResult};

/// Default relative pivot tolerance
const DEFAULT_RELATIVE_TOLERANCE: f64 = 1e-8;

/// Multiply matrix by vector (used for residual checks and in tests).
pub fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter()
        .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum())
        .collect()
}

/// Multiply two square matrices (used in tests to verify inverses).
pub fn mat_mat(a: &[Vec<f64>], b: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = b[0].len();
    a.iter()
        .map(|row| {
            (0..n)
                .map(|j| row.iter().enumerate().map(|(k, &v)| v * b[k][j]).sum())
                .collect()
        })
        .collect()
}

/// Square linear system `M·x = b` solved by Gauss-Jordan elimination.
#[derive(Debug, Clone)]
pub struct LinearSystem {
    matrix: Vec<Vec<f64>>,
    vector: Vec<f64>,
    rank: usize,
    abs_tolerance: f64,
    invert: bool,
    work: Vec<Vec<f64>>,
    root: Option<Vec<f64>>,
    inverse: Option<Vec<Vec<f64>>>,
}

impl LinearSystem {
    /// Create a solver for `M·x = b` with the default tolerance,
    /// computing the inverse as well.
    pub fn new(matrix: Vec<Vec<f64>>, vector: Vec<f64>) -> StrainResult<Self> {
        Self::with_options(matrix, vector, true, DEFAULT_RELATIVE_TOLERANCE)
    }

    /// Create a solver with explicit options.
    ///
    /// `invert` controls whether the identity block is carried through
    /// elimination; skipping it roughly halves the row width, which
    /// matters when the solve sits inside a minimizer objective.
    pub fn with_options(
        matrix: Vec<Vec<f64>>,
        vector: Vec<f64>,
        invert: bool,
        relative_tolerance: f64,
    ) -> StrainResult<Self> {
        let rank = matrix.len();
        if rank == 0 {
            return Err(StrainError::DimensionMismatch {
                context: "LinearSystem matrix".to_string(),
                expected: 1,
                actual: 0,
            });
        }
        for row in &matrix {
            if row.len() != rank {
                return Err(StrainError::DimensionMismatch {
                    context: "LinearSystem matrix row".to_string(),
                    expected: rank,
                    actual: row.len(),
                });
            }
        }
        if vector.len() != rank {
            return Err(StrainError::DimensionMismatch {
                context: "LinearSystem vector".to_string(),
                expected: rank,
                actual: vector.len(),
            });
        }

        // Absolute pivot tolerance scales with the largest row-extreme
        // magnitude sum so it tracks the overall magnitude of M.
        let max_row_extent = matrix
            .iter()
            .map(|row| {
                let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let min = row.iter().cloned().fold(f64::INFINITY, f64::min);
                max.abs() + min.abs()
            })
            .fold(0.0, f64::max);
        let abs_tolerance = (relative_tolerance * max_row_extent).abs();

        // Laterally concatenate [M | b | I]
        let mut work = Vec::with_capacity(rank);
        for (i, row) in matrix.iter().enumerate() {
            let mut w = row.clone();
            w.push(vector[i]);
            if invert {
                for j in 0..rank {
                    w.push(if i == j { 1.0 } else { 0.0 });
                }
            }
            work.push(w);
        }

        Ok(LinearSystem {
            matrix,
            vector,
            rank,
            abs_tolerance,
            invert,
            work,
            root: None,
            inverse: None,
        })
    }

    /// Index of the entry with the largest magnitude.
    fn max_abs_position(values: &[f64]) -> usize {
        let mut idx = 0;
        for (i, v) in values.iter().enumerate() {
            if values[idx].abs() < v.abs() {
                idx = i;
            }
        }
        idx
    }

    /// Deal with (near-)zero diagonal entries before elimination: add
    /// onto row `i` the row whose column-`i` entry has the largest
    /// magnitude. A column with no entry above tolerance is singular.
    fn precondition(&mut self) -> StrainResult<()> {
        for i in 0..self.rank {
            if self.work[i][i].abs() > self.abs_tolerance {
                continue;
            }
            let column: Vec<f64> = (0..self.rank).map(|r| self.work[r][i]).collect();
            let row_num = Self::max_abs_position(&column);
            if column[row_num].abs() <= self.abs_tolerance {
                return Err(StrainError::SingularSystem { column: i });
            }
            let donor = self.work[row_num].clone();
            for (w, d) in self.work[i].iter_mut().zip(donor) {
                *w += d;
            }
        }
        Ok(())
    }

    /// Scale the diagonal entry of `col` to 1 and zero the rest of the
    /// column by row operations.
    fn run_column(&mut self, col: usize) -> StrainResult<()> {
        let pivot = self.work[col][col];
        if pivot == 0.0 {
            return Err(StrainError::SingularSystem { column: col });
        }
        let scale = 1.0 / pivot;
        for w in self.work[col].iter_mut() {
            *w *= scale;
        }
        let pivot_row = self.work[col].clone();
        for i in 0..self.rank {
            if i == col {
                continue;
            }
            let factor = self.work[i][col];
            if factor == 0.0 {
                continue;
            }
            for (w, p) in self.work[i].iter_mut().zip(&pivot_row) {
                *w -= factor * p;
            }
        }
        Ok(())
    }

    /// Run elimination column by column and extract the results.
    pub fn solve(&mut self) -> StrainResult<()> {
        self.precondition()?;
        for i in 0..self.rank {
            self.run_column(i)?;
        }
        self.root = Some((0..self.rank).map(|i| self.work[i][self.rank]).collect());
        if self.invert {
            self.inverse = Some(
                (0..self.rank)
                    .map(|i| self.work[i][self.rank + 1..self.rank + 1 + self.rank].to_vec())
                    .collect(),
            );
        }
        Ok(())
    }

    /// The root vector x. Fails if `solve` has not run.
    pub fn root(&self) -> StrainResult<&[f64]> {
        self.root.as_deref().ok_or_else(|| {
            StrainError::invalid_input("root", "None", "solve() has not been called")
        })
    }

    /// The inverse of M, if requested and solved.
    pub fn inverse(&self) -> Option<&Vec<Vec<f64>>> {
        self.inverse.as_ref()
    }

    /// Mean absolute residual of `M·x − b`.
    pub fn residual_error(&self) -> StrainResult<f64> {
        let root = self.root()?;
        let lhs = mat_vec(&self.matrix, root);
        let sum: f64 = lhs
            .iter()
            .zip(&self.vector)
            .map(|(l, r)| (l - r).abs())
            .sum();
        Ok(sum / self.rank as f64)
    }
}
